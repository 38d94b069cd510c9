//! # mapview
//!
//! The core of an interactive static-map viewer: a viewport state machine,
//! the pixel ⇄ coordinate transforms it relies on, and the request layer for
//! the static-map, geocoder and organization-search services.
//!
//! Every user interaction funnels through [`ViewController::dispatch`], which
//! mutates the [`ViewState`], refetches the map image when the view changed,
//! and keeps the previously displayed image whenever a request fails.

pub mod core;
pub mod input;
pub mod services;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    config::ViewerConfig,
    controller::{Outcome, Phase, ViewController},
    geo::{Coordinate, ViewportSize, ZoomBounds, ZoomDirection},
    view_state::{Direction, Layer, ViewState},
};

pub use input::{
    events::{InputEvent, KeyCode, MouseButton},
    handler::{Action, InputHandler},
};

pub use services::{
    geocoder::{GeocodeClient, GeocodeResult},
    search::{OrganizationResult, SearchClient},
    static_map::{MapImage, MapRequestBuilder},
    transport::{HttpResponse, HttpTransport, RequestParams, Transport},
    Lookup,
};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP status {status} ({reason})")]
    Status { status: u16, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl MapError {
    /// True for failures of the request itself: the service could not be
    /// reached or answered with a non-success status.
    pub fn is_transport(&self) -> bool {
        matches!(self, MapError::Network(_) | MapError::Status { .. })
    }
}

/// Error type alias for convenience
pub type Error = MapError;

//! Configuration for the viewer: service endpoints and keys, the initial
//! view, and the geometry of the drawn map.
//!
//! [`ViewerConfig::default`] reproduces the stock viewer; [`ViewerConfig::from_env`]
//! layers `MAPVIEW_*` environment variables on top of it.

use crate::core::constants::{
    DEFAULT_CENTER, DEFAULT_SPAN, SCREEN_SIZE, SEARCH_RADIUS_METERS,
};
use crate::core::geo::{Coordinate, ViewportSize, ZoomBounds};
use crate::{MapError, Result};

pub const ENV_STATIC_MAP_URL: &str = "MAPVIEW_STATIC_MAP_URL";
pub const ENV_GEOCODER_URL: &str = "MAPVIEW_GEOCODER_URL";
pub const ENV_GEOCODER_KEY: &str = "MAPVIEW_GEOCODER_KEY";
pub const ENV_SEARCH_URL: &str = "MAPVIEW_SEARCH_URL";
pub const ENV_SEARCH_KEY: &str = "MAPVIEW_SEARCH_KEY";
pub const ENV_LANG: &str = "MAPVIEW_LANG";

/// Where a remote service lives and how to authenticate with it
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceEndpoint {
    pub url: String,
    pub api_key: Option<String>,
}

impl ServiceEndpoint {
    pub fn new(url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            url: url.into(),
            api_key,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub static_map: ServiceEndpoint,
    pub geocoder: ServiceEndpoint,
    pub search: ServiceEndpoint,
    /// Language passed to organization search
    pub lang: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            static_map: ServiceEndpoint::new("http://static-maps.yandex.ru/1.x/", None),
            // Keys come from MAPVIEW_GEOCODER_KEY / MAPVIEW_SEARCH_KEY
            geocoder: ServiceEndpoint::new("http://geocode-maps.yandex.ru/1.x/", None),
            search: ServiceEndpoint::new("https://search-maps.yandex.ru/v1/", None),
            lang: "ru_RU".to_string(),
            user_agent: "mapview/0.1.0".to_string(),
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewConfig {
    pub center: Coordinate,
    pub zoom_span: f64,
    pub zoom_bounds: ZoomBounds,
    pub viewport: ViewportSize,
    /// Radius of the organization lookup area
    pub search_radius_m: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            center: Coordinate::new(DEFAULT_CENTER.0, DEFAULT_CENTER.1),
            zoom_span: DEFAULT_SPAN,
            zoom_bounds: ZoomBounds::default(),
            viewport: ViewportSize::new(SCREEN_SIZE.0, SCREEN_SIZE.1),
            search_radius_m: SEARCH_RADIUS_METERS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewerConfig {
    pub services: ServiceConfig,
    pub view: ViewConfig,
}

impl ViewerConfig {
    /// Default configuration overridden by `MAPVIEW_*` variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let services = &mut config.services;

        if let Some(url) = lookup(ENV_STATIC_MAP_URL) {
            services.static_map.url = url;
        }
        if let Some(url) = lookup(ENV_GEOCODER_URL) {
            services.geocoder.url = url;
        }
        if let Some(key) = lookup(ENV_GEOCODER_KEY) {
            services.geocoder.api_key = Some(key);
        }
        if let Some(url) = lookup(ENV_SEARCH_URL) {
            services.search.url = url;
        }
        if let Some(key) = lookup(ENV_SEARCH_KEY) {
            services.search.api_key = Some(key);
        }
        if let Some(lang) = lookup(ENV_LANG) {
            services.lang = lang;
        }

        for (name, endpoint) in [
            ("geocoder", &config.services.geocoder),
            ("search", &config.services.search),
        ] {
            if endpoint.api_key.is_none() {
                log::warn!("no {} api key configured; requests will be anonymous", name);
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_zoom_span(mut self, zoom_span: f64) -> Self {
        self.view.zoom_span = zoom_span;
        self
    }

    pub fn with_zoom_bounds(mut self, bounds: ZoomBounds) -> Self {
        self.view.zoom_bounds = bounds;
        self
    }

    /// Rejects settings no view could be built from
    pub fn validate(&self) -> Result<()> {
        let bounds = self.view.zoom_bounds;
        if !(bounds.min.is_finite() && bounds.max.is_finite())
            || bounds.min <= 0.0
            || bounds.min > bounds.max
        {
            return Err(MapError::Config(format!(
                "invalid zoom bounds [{}, {}]",
                bounds.min, bounds.max
            )));
        }
        if !self.view.center.is_valid() {
            return Err(MapError::Config(format!(
                "initial center {} out of range",
                self.view.center.to_param()
            )));
        }
        if self.view.viewport.width == 0 || self.view.viewport.height == 0 {
            return Err(MapError::Config("viewport must not be empty".to_string()));
        }
        for (name, endpoint) in [
            ("static map", &self.services.static_map),
            ("geocoder", &self.services.geocoder),
            ("search", &self.services.search),
        ] {
            if endpoint.url.trim().is_empty() {
                return Err(MapError::Config(format!("{name} url is empty")));
            }
        }
        Ok(())
    }
}

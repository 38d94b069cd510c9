use crate::core::config::ServiceEndpoint;
use crate::core::constants::MARKER_STYLE;
use crate::core::view_state::ViewState;
use crate::services::transport::{RequestParams, Transport};
use crate::{MapError, Result};

/// Image bytes returned by the static-map service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapImage {
    bytes: Vec<u8>,
    content_type: Option<String>,
}

impl MapImage {
    pub fn new(bytes: Vec<u8>, content_type: Option<String>) -> Self {
        Self {
            bytes,
            content_type,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Builds and sends static-map requests for a [`ViewState`]
#[derive(Debug, Clone)]
pub struct MapRequestBuilder {
    endpoint: ServiceEndpoint,
}

impl MapRequestBuilder {
    pub fn new(endpoint: ServiceEndpoint) -> Self {
        Self { endpoint }
    }

    pub fn url(&self) -> &str {
        &self.endpoint.url
    }

    /// Request parameters for the current view. `pt` is only present while a
    /// marker is set.
    pub fn build(&self, state: &ViewState) -> RequestParams {
        let span = state.zoom_span();
        let mut params = RequestParams::new()
            .with("ll", state.center().to_param())
            .with("spn", format!("{span},{span}"))
            .with("l", state.layer().as_param());
        params.push_opt(
            "pt",
            state
                .marker()
                .map(|marker| format!("{},{}", marker.to_param(), MARKER_STYLE)),
        );
        params.push_opt("apikey", self.endpoint.api_key.as_deref());
        params
    }

    /// Fetches the image for `state`. Non-2xx answers surface as
    /// [`MapError::Status`] with the service's status and reason.
    pub fn fetch(&self, transport: &dyn Transport, state: &ViewState) -> Result<MapImage> {
        let params = self.build(state);
        let response = transport.get(&self.endpoint.url, &params)?;
        if !response.is_success() {
            log::error!(
                "map request to {} failed: HTTP {} ({})",
                self.endpoint.url,
                response.status,
                response.reason
            );
        }
        let response = response.error_for_status()?;

        if response.body.is_empty() {
            return Err(MapError::Parse("static map returned an empty image".to_string()));
        }
        log::info!("map image received ({} bytes)", response.body.len());
        Ok(MapImage::new(response.body, response.content_type))
    }
}

pub mod geocoder;
pub mod search;
pub mod static_map;
pub mod transport;

// Re-exports for convenience
pub use geocoder::{GeocodeClient, GeocodeResult};
pub use search::{OrganizationResult, SearchClient};
pub use static_map::{MapImage, MapRequestBuilder};
pub use transport::{HttpResponse, HttpTransport, RequestParams, Transport};

/// Outcome of a lookup that reached the service. An empty result set is a
/// normal answer, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound => None,
        }
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Lookup::NotFound, Lookup::Found)
    }
}

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::core::config::ServiceEndpoint;
use crate::core::geo::Coordinate;
use crate::services::transport::{RequestParams, Transport};
use crate::services::Lookup;
use crate::{MapError, Result};

/// First toponym of a geocoder answer
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeResult {
    /// Full address line as formatted by the geocoder
    pub raw_text: String,
    pub postal_code: Option<String>,
    pub coordinate: Coordinate,
    /// Address components keyed by kind (`country`, `locality`, `street`, ...)
    pub address_fields: BTreeMap<String, String>,
}

impl GeocodeResult {
    /// Text shown to the user: `"<postal code> <address>"` when requested and
    /// known, otherwise the address alone.
    pub fn display_text(&self, show_postal_code: bool) -> String {
        match (&self.postal_code, show_postal_code) {
            (Some(code), true) => format!("{} {}", code, self.raw_text),
            _ => self.raw_text.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeocoderEnvelope {
    response: GeocoderResponse,
}

#[derive(Debug, Deserialize)]
struct GeocoderResponse {
    #[serde(rename = "GeoObjectCollection")]
    collection: GeoObjectCollection,
}

#[derive(Debug, Deserialize)]
struct GeoObjectCollection {
    #[serde(rename = "featureMember", default)]
    feature_member: Vec<FeatureMember>,
}

#[derive(Debug, Deserialize)]
struct FeatureMember {
    #[serde(rename = "GeoObject")]
    geo_object: GeoObject,
}

#[derive(Debug, Deserialize)]
struct GeoObject {
    #[serde(rename = "metaDataProperty")]
    meta_data: MetaDataProperty,
    #[serde(rename = "Point")]
    point: GeoPoint,
}

#[derive(Debug, Deserialize)]
struct MetaDataProperty {
    #[serde(rename = "GeocoderMetaData")]
    geocoder: GeocoderMetaData,
}

#[derive(Debug, Deserialize)]
struct GeocoderMetaData {
    text: String,
    #[serde(rename = "Address", default)]
    address: Option<Address>,
}

#[derive(Debug, Deserialize)]
struct Address {
    postal_code: Option<String>,
    #[serde(rename = "Components", default)]
    components: Vec<AddressComponent>,
}

#[derive(Debug, Deserialize)]
struct AddressComponent {
    kind: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct GeoPoint {
    pos: String,
}

impl TryFrom<GeoObject> for GeocodeResult {
    type Error = MapError;

    fn try_from(object: GeoObject) -> Result<Self> {
        let coordinate = Coordinate::from_pos(&object.point.pos).ok_or_else(|| {
            MapError::Parse(format!("invalid toponym position {:?}", object.point.pos))
        })?;

        let meta = object.meta_data.geocoder;
        let (postal_code, address_fields) = match meta.address {
            Some(address) => {
                // Later components are more specific and win on repeated kinds
                let fields: BTreeMap<String, String> = address
                    .components
                    .into_iter()
                    .map(|c| (c.kind, c.name))
                    .collect();
                (address.postal_code, fields)
            }
            None => (None, BTreeMap::new()),
        };

        Ok(GeocodeResult {
            raw_text: meta.text,
            postal_code: postal_code.filter(|code| !code.trim().is_empty()),
            coordinate,
            address_fields,
        })
    }
}

/// Parses a geocoder JSON body and keeps its first feature member
pub fn parse_geocode_response(body: &[u8]) -> Result<Lookup<GeocodeResult>> {
    let envelope: GeocoderEnvelope = serde_json::from_slice(body)?;
    match envelope.response.collection.feature_member.into_iter().next() {
        Some(member) => GeocodeResult::try_from(member.geo_object).map(Lookup::Found),
        None => Ok(Lookup::NotFound),
    }
}

/// Forward and reverse place lookup
#[derive(Debug, Clone)]
pub struct GeocodeClient {
    endpoint: ServiceEndpoint,
}

impl GeocodeClient {
    pub fn new(endpoint: ServiceEndpoint) -> Self {
        Self { endpoint }
    }

    pub fn url(&self) -> &str {
        &self.endpoint.url
    }

    /// Parameters for a geocode request with the given `geocode` value
    pub fn params(&self, geocode: &str) -> RequestParams {
        let mut params = RequestParams::new();
        params.push_opt("apikey", self.endpoint.api_key.as_deref());
        params.push("geocode", geocode);
        params.push("format", "json");
        params
    }

    /// Looks up a free-text place name
    pub fn lookup_by_text(
        &self,
        transport: &dyn Transport,
        query: &str,
    ) -> Result<Lookup<GeocodeResult>> {
        self.lookup(transport, query)
    }

    /// Reverse geocodes a coordinate
    pub fn lookup_by_coordinate(
        &self,
        transport: &dyn Transport,
        coord: Coordinate,
    ) -> Result<Lookup<GeocodeResult>> {
        self.lookup(transport, &coord.to_param())
    }

    fn lookup(&self, transport: &dyn Transport, geocode: &str) -> Result<Lookup<GeocodeResult>> {
        let response = transport
            .get(&self.endpoint.url, &self.params(geocode))?
            .error_for_status()?;
        let lookup = parse_geocode_response(&response.body)?;
        match &lookup {
            Lookup::Found(result) => log::info!("geocoded {:?} -> {:?}", geocode, result.raw_text),
            Lookup::NotFound => log::warn!("geocoder found nothing for {:?}", geocode),
        }
        Ok(lookup)
    }
}

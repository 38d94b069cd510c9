use serde::Deserialize;

use crate::core::config::ServiceEndpoint;
use crate::core::geo::{search_span, Coordinate};
use crate::services::transport::{RequestParams, Transport};
use crate::services::Lookup;
use crate::Result;

/// Best matching organization near a point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationResult {
    pub name: String,
    pub address: String,
}

impl OrganizationResult {
    pub fn display_text(&self) -> String {
        format!("Name: {}, address: {}", self.name, self.address)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    properties: FeatureProperties,
}

#[derive(Debug, Deserialize)]
struct FeatureProperties {
    #[serde(rename = "CompanyMetaData")]
    company: CompanyMetaData,
}

#[derive(Debug, Deserialize)]
struct CompanyMetaData {
    name: String,
    #[serde(default)]
    address: String,
}

/// Parses a search JSON body and keeps its first feature
pub fn parse_search_response(body: &[u8]) -> Result<Lookup<OrganizationResult>> {
    let response: SearchResponse = serde_json::from_slice(body)?;
    Ok(response
        .features
        .into_iter()
        .next()
        .map(|feature| OrganizationResult {
            name: feature.properties.company.name,
            address: feature.properties.company.address,
        })
        .into())
}

/// Organization lookup around a point
#[derive(Debug, Clone)]
pub struct SearchClient {
    endpoint: ServiceEndpoint,
    lang: String,
    radius_m: f64,
}

impl SearchClient {
    pub fn new(endpoint: ServiceEndpoint, lang: impl Into<String>, radius_m: f64) -> Self {
        Self {
            endpoint,
            lang: lang.into(),
            radius_m,
        }
    }

    pub fn url(&self) -> &str {
        &self.endpoint.url
    }

    /// Parameters asking for the single best business match within the
    /// search radius of `coord`
    pub fn params(&self, coord: Coordinate, query_text: &str) -> RequestParams {
        let (lon_span, lat_span) = search_span(coord, self.radius_m);
        let mut params = RequestParams::new();
        params.push_opt("apikey", self.endpoint.api_key.as_deref());
        params.push("text", query_text);
        params.push("lang", self.lang.as_str());
        params.push("ll", coord.to_param_fixed(6));
        params.push("spn", format!("{lon_span},{lat_span}"));
        params.push("type", "biz");
        params.push("results", "1");
        params
    }

    pub fn find_nearby(
        &self,
        transport: &dyn Transport,
        coord: Coordinate,
        query_text: &str,
    ) -> Result<Lookup<OrganizationResult>> {
        let response = transport
            .get(&self.endpoint.url, &self.params(coord, query_text))?
            .error_for_status()?;
        let lookup = parse_search_response(&response.body)?;
        match &lookup {
            Lookup::Found(org) => log::info!("organization near {}: {}", coord.to_param(), org.name),
            Lookup::NotFound => log::warn!("no organization near {}", coord.to_param()),
        }
        Ok(lookup)
    }
}

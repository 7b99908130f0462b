use async_trait::async_trait;
use serde::Deserialize;

use crate::services::config::ServiceEndpoint;
use crate::services::{ResolveError, HTTP_CLIENT};

/// Seam over the geocoder service.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Looks up the postal code for an address line. `Ok(None)` means the
    /// geocoder answered but knows no postal code for that address.
    async fn postal_code(&self, address_line: &str) -> Result<Option<String>, ResolveError>;
}

// The postal code sits at the bottom of a deeply nested envelope. Every link
// is optional: a hole anywhere along the path is the valid "no postal code"
// answer, never an error.

#[derive(Debug, Default, Deserialize)]
struct GeocoderEnvelope {
    response: Option<GeocoderResponse>,
}

#[derive(Debug, Deserialize)]
struct GeocoderResponse {
    #[serde(rename = "GeoObjectCollection")]
    collection: Option<GeoObjectCollection>,
}

#[derive(Debug, Deserialize)]
struct GeoObjectCollection {
    #[serde(rename = "featureMember", default)]
    members: Vec<FeatureMember>,
}

#[derive(Debug, Deserialize)]
struct FeatureMember {
    #[serde(rename = "GeoObject")]
    geo_object: Option<GeoObject>,
}

#[derive(Debug, Deserialize)]
struct GeoObject {
    #[serde(rename = "metaDataProperty")]
    meta: Option<MetaDataProperty>,
}

#[derive(Debug, Deserialize)]
struct MetaDataProperty {
    #[serde(rename = "GeocoderMetaData")]
    geocoder: Option<GeocoderMetaData>,
}

#[derive(Debug, Deserialize)]
struct GeocoderMetaData {
    #[serde(rename = "Address")]
    address: Option<Address>,
}

#[derive(Debug, Deserialize)]
struct Address {
    postal_code: Option<String>,
}

fn extract_postal_code(envelope: GeocoderEnvelope) -> Option<String> {
    envelope
        .response?
        .collection?
        .members
        .into_iter()
        .next()?
        .geo_object?
        .meta?
        .geocoder?
        .address?
        .postal_code
}

/// Production client for the geocoder service.
#[derive(Debug, Clone)]
pub struct GeocoderClient {
    endpoint: ServiceEndpoint,
    lang: String,
}

impl GeocoderClient {
    pub fn new(endpoint: ServiceEndpoint, lang: impl Into<String>) -> Self {
        Self {
            endpoint,
            lang: lang.into(),
        }
    }
}

#[async_trait]
impl Geocoder for GeocoderClient {
    async fn postal_code(&self, address_line: &str) -> Result<Option<String>, ResolveError> {
        log::debug!("postal code lookup: {:?}", address_line);
        let response = HTTP_CLIENT
            .get(&self.endpoint.base_url)
            .query(&[
                ("apikey", self.endpoint.api_key.as_str()),
                ("geocode", address_line),
                ("lang", self.lang.as_str()),
                ("format", "json"),
            ])
            .send()
            .await
            .map_err(|e| ResolveError::Unreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ResolveError::UpstreamRejected {
                status: response.status().as_u16(),
            });
        }

        let envelope = response
            .json::<GeocoderEnvelope>()
            .await
            .map_err(|_| ResolveError::MalformedResponse("geocoder envelope"))?;
        Ok(extract_postal_code(envelope))
    }
}

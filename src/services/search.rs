use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::constants::{NEAREST_RESULTS, NEAREST_SPAN};
use crate::core::geo::Coordinate;
use crate::services::config::ServiceEndpoint;
use crate::services::{ResolveError, HTTP_CLIENT};

/// Result kind requested from the search service.
const SEARCH_TYPE: &str = "biz";

/// First match of a free-text search: where it is and how it is described.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub coordinate: Coordinate,
    pub address_line: String,
}

/// An organisation resolved near an anchor point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganisationInfo {
    pub name: String,
    pub address: String,
    pub url: Option<String>,
    pub phones: Vec<String>,
    pub coordinate: Coordinate,
}

impl OrganisationInfo {
    /// Multi-line description: name, address, then the URL and the
    /// comma-joined phone numbers when known.
    pub fn describe(&self) -> String {
        let mut lines = vec![self.name.clone(), self.address.clone()];
        if let Some(url) = &self.url {
            lines.push(url.clone());
        }
        if !self.phones.is_empty() {
            lines.push(self.phones.join(","));
        }
        lines.join("\n")
    }
}

/// Seam over the place-search service.
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    /// Free-text search; the first feature wins.
    async fn search_text(&self, query: &str) -> Result<SearchHit, ResolveError>;

    /// One organisation inside the fixed span around `anchor`. With no
    /// `query`, the anchor's own `{lon},{lat}` string is the search text.
    async fn search_nearest(
        &self,
        anchor: Coordinate,
        query: Option<&str>,
    ) -> Result<OrganisationInfo, ResolveError>;
}

// Wire models. Everything below the feature list is optional so that a hole
// in the payload surfaces as a named MalformedResponse, not a decode fault.

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: Properties,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    /// `[lon, lat]`, in service order.
    coordinates: Option<[f64; 2]>,
}

#[derive(Debug, Default, Deserialize)]
struct Properties {
    description: Option<String>,
    #[serde(rename = "CompanyMetaData")]
    company: Option<CompanyMetaData>,
}

#[derive(Debug, Deserialize)]
struct CompanyMetaData {
    name: Option<String>,
    address: Option<String>,
    url: Option<String>,
    #[serde(rename = "Phones", default)]
    phones: Vec<Phone>,
}

#[derive(Debug, Deserialize)]
struct Phone {
    formatted: Option<String>,
}

fn first_feature(response: SearchResponse) -> Result<Feature, ResolveError> {
    response
        .features
        .into_iter()
        .next()
        .ok_or(ResolveError::NoMatch)
}

fn feature_coordinate(feature: &Feature) -> Result<Coordinate, ResolveError> {
    let [lon, lat] = feature
        .geometry
        .as_ref()
        .and_then(|geometry| geometry.coordinates)
        .ok_or(ResolveError::MalformedResponse("geometry coordinates"))?;
    Ok(Coordinate::new(lat, lon))
}

fn text_hit(response: SearchResponse) -> Result<SearchHit, ResolveError> {
    let feature = first_feature(response)?;
    let coordinate = feature_coordinate(&feature)?;
    let address_line = feature
        .properties
        .description
        .ok_or(ResolveError::MalformedResponse("feature description"))?;
    Ok(SearchHit {
        coordinate,
        address_line,
    })
}

fn organisation(response: SearchResponse) -> Result<OrganisationInfo, ResolveError> {
    let feature = first_feature(response)?;
    let coordinate = feature_coordinate(&feature)?;
    let company = feature
        .properties
        .company
        .ok_or(ResolveError::MalformedResponse("company metadata"))?;
    let name = company
        .name
        .ok_or(ResolveError::MalformedResponse("company name"))?;
    let address = company
        .address
        .ok_or(ResolveError::MalformedResponse("company address"))?;
    let phones = company
        .phones
        .into_iter()
        .filter_map(|phone| phone.formatted)
        .collect();
    Ok(OrganisationInfo {
        name,
        address,
        url: company.url,
        phones,
        coordinate,
    })
}

/// Production client for the place-search service.
#[derive(Debug, Clone)]
pub struct PlaceSearchClient {
    endpoint: ServiceEndpoint,
    lang: String,
}

impl PlaceSearchClient {
    pub fn new(endpoint: ServiceEndpoint, lang: impl Into<String>) -> Self {
        Self {
            endpoint,
            lang: lang.into(),
        }
    }

    fn text_params(&self, query: &str) -> Vec<(&'static str, String)> {
        vec![
            ("apikey", self.endpoint.api_key.clone()),
            ("text", query.to_string()),
            ("lang", self.lang.clone()),
            ("type", SEARCH_TYPE.to_string()),
        ]
    }

    fn nearest_params(
        &self,
        anchor: Coordinate,
        query: Option<&str>,
    ) -> Vec<(&'static str, String)> {
        let text = query
            .map(str::to_owned)
            .unwrap_or_else(|| anchor.as_lon_lat());
        vec![
            ("apikey", self.endpoint.api_key.clone()),
            ("text", text),
            ("lang", self.lang.clone()),
            ("ll", anchor.as_lon_lat()),
            ("type", SEARCH_TYPE.to_string()),
            ("spn", NEAREST_SPAN.to_string()),
            ("results", NEAREST_RESULTS.to_string()),
            ("format", "json".to_string()),
        ]
    }

    async fn get(
        &self,
        params: Vec<(&'static str, String)>,
    ) -> Result<SearchResponse, ResolveError> {
        let response = HTTP_CLIENT
            .get(&self.endpoint.base_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| ResolveError::Unreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ResolveError::UpstreamRejected {
                status: response.status().as_u16(),
            });
        }

        response
            .json::<SearchResponse>()
            .await
            .map_err(|_| ResolveError::MalformedResponse("feature collection"))
    }
}

#[async_trait]
impl PlaceSearch for PlaceSearchClient {
    async fn search_text(&self, query: &str) -> Result<SearchHit, ResolveError> {
        log::debug!("place search: {:?}", query);
        text_hit(self.get(self.text_params(query)).await?)
    }

    async fn search_nearest(
        &self,
        anchor: Coordinate,
        query: Option<&str>,
    ) -> Result<OrganisationInfo, ResolveError> {
        log::debug!("nearest search around {}", anchor.as_lon_lat());
        organisation(self.get(self.nearest_params(anchor, query)).await?)
    }
}

use serde::{Deserialize, Serialize};

use crate::core::Coordinate;
use crate::services::{Geocoder, OrganisationInfo, PlaceSearch, ResolveError, SearchHit};

/// Address details remembered for the displayed place.
///
/// The postal code starts out unknown and is filled in lazily by the
/// geocoder, either at resolve time or the first time the shell asks
/// for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressDetails {
    pub address_line: String,
    pub postal_code: Option<String>,
}

impl AddressDetails {
    pub fn new(address_line: impl Into<String>) -> Self {
        Self {
            address_line: address_line.into(),
            postal_code: None,
        }
    }

    /// Status line text, with the postal code appended when it is known
    /// and requested.
    pub fn display_line(&self, with_postal: bool) -> String {
        match (&self.postal_code, with_postal) {
            (Some(code), true) => format!("{}, postal code: {}", self.address_line, code),
            _ => self.address_line.clone(),
        }
    }
}

/// A resolved place: where it is and what to call it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceMatch {
    pub coordinate: Coordinate,
    pub address: AddressDetails,
}

/// Two-stage place resolution: the search service turns text into a
/// coordinate and an address line, then the geocoder optionally adds a
/// postal code for that line.
pub struct ResolutionPipeline {
    search: Box<dyn PlaceSearch>,
    geocoder: Box<dyn Geocoder>,
}

impl ResolutionPipeline {
    pub fn new(search: Box<dyn PlaceSearch>, geocoder: Box<dyn Geocoder>) -> Self {
        Self { search, geocoder }
    }

    /// Resolve free text to a place. With `enrich` set, a successful match
    /// is followed by a postal-code lookup for its address line; a lookup
    /// failure fails the whole resolution.
    ///
    /// Blank queries are rejected before any request goes out.
    pub async fn resolve_by_text(
        &self,
        query: &str,
        enrich: bool,
    ) -> Result<PlaceMatch, ResolveError> {
        if query.trim().is_empty() {
            return Err(ResolveError::NoMatch);
        }
        let SearchHit {
            coordinate,
            address_line,
        } = self.search.search_text(query).await?;
        let mut address = AddressDetails::new(address_line);
        if enrich {
            address.postal_code = self.enrich_postal_code(&address.address_line).await?;
        }
        Ok(PlaceMatch {
            coordinate,
            address,
        })
    }

    /// Postal code for an address line, when the geocoder knows one.
    pub async fn enrich_postal_code(
        &self,
        address_line: &str,
    ) -> Result<Option<String>, ResolveError> {
        self.geocoder.postal_code(address_line).await
    }

    /// One organisation near `anchor`. The stored address line biases the
    /// search when there is one; otherwise the anchor itself is the query.
    pub async fn resolve_nearest(
        &self,
        anchor: Coordinate,
        query: Option<&str>,
    ) -> Result<OrganisationInfo, ResolveError> {
        self.search.search_nearest(anchor, query).await
    }
}

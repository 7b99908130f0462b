use async_trait::async_trait;
use thiserror::Error;

use crate::core::constants::MAP_IMAGE_SIZE_PARAM;
use crate::core::view::ViewState;
use crate::services::config::ServiceEndpoint;
use crate::services::HTTP_CLIENT;

/// Raw image payload returned by the static-map service. The engine never
/// decodes it; rendering is the host's concern.
pub type ImageBytes = Vec<u8>;

/// Failures of a single static-map fetch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// The service answered with a non-success status.
    #[error("map service rejected the request (HTTP {status})")]
    UpstreamRejected { status: u16 },
    /// The service could not be reached at the transport level.
    #[error("map service is unreachable: {0}")]
    Unreachable(String),
}

/// Anything that can turn a view into a rendered map image.
#[async_trait]
pub trait StaticMapSource: Send + Sync {
    /// Fetches the image for `view`. Exactly one request, no retries, no
    /// shared-state mutation.
    async fn fetch(&self, view: &ViewState) -> Result<ImageBytes, FetchError>;
}

/// Production client for the static-map service.
#[derive(Debug, Clone)]
pub struct StaticMapClient {
    endpoint: ServiceEndpoint,
}

impl StaticMapClient {
    pub fn new(endpoint: ServiceEndpoint) -> Self {
        Self { endpoint }
    }

    /// Query parameters for `view`, kept apart from the transport so the
    /// request shape is testable without a server.
    fn query_params(&self, view: &ViewState) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("apikey", self.endpoint.api_key.clone()),
            ("ll", view.center.as_lon_lat()),
            ("z", view.zoom.to_string()),
            ("size", MAP_IMAGE_SIZE_PARAM.to_string()),
        ];
        if let Some(marker) = &view.marker {
            params.push(("pt", marker.as_param()));
        }
        params.push(("theme", view.theme.as_param().to_string()));
        params
    }
}

#[async_trait]
impl StaticMapSource for StaticMapClient {
    async fn fetch(&self, view: &ViewState) -> Result<ImageBytes, FetchError> {
        log::debug!(
            "static map fetch: ll={} z={} theme={}",
            view.center.as_lon_lat(),
            view.zoom,
            view.theme.as_param()
        );
        let response = HTTP_CLIENT
            .get(&self.endpoint.base_url)
            .query(&self.query_params(view))
            .send()
            .await
            .map_err(|e| FetchError::Unreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::UpstreamRejected {
                status: response.status().as_u16(),
            });
        }

        let data = response
            .bytes()
            .await
            .map_err(|e| FetchError::Unreachable(e.to_string()))?
            .to_vec();
        log::debug!("static map fetch done: {} bytes", data.len());
        Ok(data)
    }
}

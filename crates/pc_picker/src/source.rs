use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, COOKIE},
    Client,
};
use shared::{
    domain::RoomId,
    error::ServerRejection,
    protocol::{available_pcs_path, AvailablePcsResponse, PcOption},
};
use tracing::debug;
use url::Url;

use crate::{config::Settings, error::FetchError};

/// Where the synchronizer gets the PCs of a room from.
#[async_trait]
pub trait PcSource: Send + Sync {
    async fn fetch_available_pcs(&self, room_id: &RoomId) -> Result<Vec<PcOption>, FetchError>;
}

#[async_trait]
impl<S: PcSource + ?Sized> PcSource for std::sync::Arc<S> {
    async fn fetch_available_pcs(&self, room_id: &RoomId) -> Result<Vec<PcOption>, FetchError> {
        (**self).fetch_available_pcs(room_id).await
    }
}

/// Fetches `GET /admin/rooms/{room_id}/available_pcs` from the reservation server.
#[derive(Debug, Clone)]
pub struct HttpPcSource {
    http: Client,
    server_url: String,
}

impl HttpPcSource {
    pub fn new(server_url: impl Into<String>) -> Result<Self, FetchError> {
        Self::with_client(Client::new(), server_url)
    }

    pub fn with_client(http: Client, server_url: impl Into<String>) -> Result<Self, FetchError> {
        let server_url = normalize_server_url(server_url.into())?;
        Ok(Self { http, server_url })
    }

    /// Builds the HTTP client from `settings`: optional timeout and session cookie.
    pub fn from_settings(settings: &Settings) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = &settings.cookie {
            let value = HeaderValue::from_str(cookie).map_err(|err| FetchError::Config {
                reason: format!("cookie is not a valid header value: {err}"),
            })?;
            headers.insert(COOKIE, value);
        }

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = settings.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|err| FetchError::Config {
            reason: format!("failed to build http client: {err}"),
        })?;

        Self::with_client(http, settings.server_url.clone())
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn url_for(&self, room_id: &RoomId) -> String {
        format!("{}{}", self.server_url, available_pcs_path(room_id.as_str()))
    }
}

#[async_trait]
impl PcSource for HttpPcSource {
    async fn fetch_available_pcs(&self, room_id: &RoomId) -> Result<Vec<PcOption>, FetchError> {
        let url = self.url_for(room_id);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServerRejection::new(
                status.as_u16(),
                available_pcs_path(room_id.as_str()),
            )
            .into());
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;
        let pcs: AvailablePcsResponse = serde_json::from_slice(&body)?;
        debug!(room_id = %room_id, count = pcs.len(), "fetched available pcs");
        Ok(pcs)
    }
}

fn normalize_server_url(raw: String) -> Result<String, FetchError> {
    let trimmed = raw.trim().trim_end_matches('/').to_string();
    let parsed = Url::parse(&trimmed).map_err(|err| FetchError::InvalidServerUrl {
        url: raw.clone(),
        reason: err.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(FetchError::InvalidServerUrl {
            url: raw,
            reason: "server_url must start with http:// or https://".into(),
        });
    }
    Ok(trimmed)
}

#[cfg(test)]
#[path = "tests/source_tests.rs"]
mod tests;

// HTTP access to the prediction backend.
//
// `Fetcher` builds the endpoint URLs and maps transport failures, non-2xx
// statuses and malformed bodies into `FetchError`. The actual HTTP call goes
// through the `HttpTransport` trait so tests can script responses.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use pronostici_core::config::ApiConfig;
use pronostici_core::model::{ApiStatus, Match};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Fixed user-facing message for any network-level failure.
pub const LOAD_ERROR_MESSAGE: &str = "Errore nel caricamento";

/// User-facing message for a body that could not be decoded.
pub const PARSE_ERROR_MESSAGE: &str = "Risposta non valida dal server";

/// Failure of the transport itself (no HTTP response was obtained).
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{0}")]
pub struct TransportError(pub String);

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    /// Transport failure or non-2xx status. `status` and `body` are kept for
    /// logs only; the user always sees [`LOAD_ERROR_MESSAGE`].
    #[error("Errore nel caricamento (url: {url}, status: {status:?}, detail: {detail})")]
    Network {
        url: String,
        status: Option<u16>,
        detail: String,
    },

    /// Body was not valid JSON or did not match the expected shape.
    #[error("Risposta non valida dal server (url: {url}): {detail}")]
    Parse { url: String, detail: String },
}

impl FetchError {
    /// Message suitable for the board's error state.
    pub fn user_message(&self) -> &'static str {
        match self {
            FetchError::Network { .. } => LOAD_ERROR_MESSAGE,
            FetchError::Parse { .. } => PARSE_ERROR_MESSAGE,
        }
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// A completed HTTP exchange, whatever its status.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Minimal GET capability used by [`Fetcher`].
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

/// `reqwest`-backed transport.
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client. `timeout: None` leaves requests unbounded.
    pub fn new(timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let resp = self
            .http
            .get(url)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| TransportError(format!("failed to read body: {e}")))?;
        Ok(HttpResponse { status, body })
    }
}

// ---------------------------------------------------------------------------
// Fetcher
// ---------------------------------------------------------------------------

/// Issues the backend requests. Holds no view state.
#[derive(Clone)]
pub struct Fetcher {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
}

impl Fetcher {
    pub fn new(transport: Arc<dyn HttpTransport>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            transport,
            base_url,
        }
    }

    /// Build a fetcher with a real HTTP client from the `[api]` config.
    pub fn from_config(api: &ApiConfig) -> anyhow::Result<Self> {
        let transport = ReqwestTransport::new(api.timeout)?;
        Ok(Self::new(Arc::new(transport), api.base_url.clone()))
    }

    pub fn matches_url(&self, date: Option<NaiveDate>) -> String {
        match date {
            Some(d) => format!("{}/api/matches?date={}", self.base_url, d.format("%Y-%m-%d")),
            None => format!("{}/api/matches", self.base_url),
        }
    }

    pub fn status_url(&self) -> String {
        format!("{}/api/status", self.base_url)
    }

    /// Fetch the matches for `date`, or the backend's default set when `None`.
    pub async fn load(&self, date: Option<NaiveDate>) -> Result<Vec<Match>, FetchError> {
        self.get_json(&self.matches_url(date)).await
    }

    /// Fetch request-quota telemetry from the status endpoint.
    pub async fn load_debug_info(&self) -> Result<ApiStatus, FetchError> {
        self.get_json(&self.status_url()).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        debug!("GET {}", url);

        let resp = self
            .transport
            .get(url)
            .await
            .map_err(|e| FetchError::Network {
                url: url.to_string(),
                status: None,
                detail: e.0,
            })?;

        if !resp.is_success() {
            warn!("GET {} returned status {}", url, resp.status);
            return Err(FetchError::Network {
                url: url.to_string(),
                status: Some(resp.status),
                detail: truncate(&resp.body, 200),
            });
        }

        serde_json::from_str(&resp.body).map_err(|e| FetchError::Parse {
            url: url.to_string(),
            detail: e.to_string(),
        })
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

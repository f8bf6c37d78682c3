use crate::config::{ApiSettings, SessionSettings};
use crate::models::{
    EventSummary, EventsResponse, MatchPayload, MatchResponse, ValidationErrors, Volunteer,
    VolunteersResponse,
};
use crate::services::csrf::{CookiePattern, CookieSource, RequestConfig};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to the matching backend
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API returned error status {status}")]
    Api { status: StatusCode },

    #[error("Validation failed ({status}): {errors}")]
    ValidationFailed { status: StatusCode, errors: serde_json::Value },

    #[error("Match request failed with status {status}")]
    MatchFailed { status: StatusCode },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Invalid CSRF cookie name: {0}")]
    CookiePattern(#[from] regex::Error),
}

/// Backend endpoint paths, relative to the base URL
pub mod endpoints {
    pub const EVENTS: &str = "/api/events/";
    pub const VOLUNTEERS: &str = "/api/volunteers/";
    pub const VALIDATE_EVENT: &str = "/api/validate/event/";
    pub const VALIDATE_VOLUNTEER: &str = "/api/validate/volunteer/";
    pub const MATCH: &str = "/api/match/";
}

/// Client for the volunteer matching backend
///
/// Handles all communication with the backend including:
/// - Listing events and volunteers
/// - Submitting events and volunteers for validation
/// - Requesting ranked matches for an event
///
/// Every POST carries the CSRF header derived from the injected cookie source.
pub struct ApiClient {
    base_url: String,
    client: Client,
    cookies: Arc<dyn CookieSource>,
    csrf_cookie: CookiePattern,
    session: SessionSettings,
}

impl ApiClient {
    /// Create a new client
    pub fn new(
        api: &ApiSettings,
        session: SessionSettings,
        cookies: Arc<dyn CookieSource>,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .connect_timeout(Duration::from_secs(api.connect_timeout_secs))
            .build()?;
        let csrf_cookie = CookiePattern::new(&session.csrf_cookie_name)?;

        Ok(Self {
            base_url: api.base_url.trim_end_matches('/').to_string(),
            client,
            cookies,
            csrf_cookie,
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fetch the list of known events
    pub async fn list_events(&self) -> Result<Vec<EventSummary>, ApiError> {
        let body: EventsResponse = self.get_json(endpoints::EVENTS).await?;
        tracing::debug!("Fetched {} events", body.events.len());
        Ok(body.events)
    }

    /// Fetch the list of registered volunteers
    pub async fn list_volunteers(&self) -> Result<Vec<Volunteer>, ApiError> {
        let body: VolunteersResponse = self.get_json(endpoints::VOLUNTEERS).await?;
        tracing::debug!("Fetched {} volunteers", body.volunteers.len());
        Ok(body.volunteers)
    }

    /// Submit an event for validation
    ///
    /// A non-2xx answer is read as `{errors: ...}` and returned as
    /// [`ApiError::ValidationFailed`].
    pub async fn validate_event(&self, payload: &MatchPayload) -> Result<(), ApiError> {
        self.validate(endpoints::VALIDATE_EVENT, payload).await
    }

    /// Submit a volunteer registration for validation
    pub async fn validate_volunteer(&self, payload: &MatchPayload) -> Result<(), ApiError> {
        self.validate(endpoints::VALIDATE_VOLUNTEER, payload).await
    }

    /// Ask the matching service for ranked volunteers
    pub async fn request_matches(&self, payload: &MatchPayload) -> Result<MatchResponse, ApiError> {
        let response = self.post(endpoints::MATCH, payload).await?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!("Match request rejected: {}", status);
            return Err(ApiError::MatchFailed { status });
        }

        let text = response.text().await?;
        let body: MatchResponse = serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse matches: {}", e)))?;

        tracing::debug!("Received {} matches", body.matches.len());

        Ok(body)
    }

    async fn validate(&self, path: &str, payload: &MatchPayload) -> Result<(), ApiError> {
        let response = self.post(path, payload).await?;
        let status = response.status();

        if status.is_success() {
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        let errors = serde_json::from_str::<ValidationErrors>(&text)
            .map(|body| body.errors)
            .unwrap_or(serde_json::Value::Null);

        tracing::info!("Validation rejected by {} ({}): {}", path, status, errors);

        Err(ApiError::ValidationFailed { status, errors })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        tracing::debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!("GET {} failed: {}", url, status);
            return Err(ApiError::Api { status });
        }

        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse {}: {}", path, e)))
    }

    async fn post(&self, path: &str, payload: &MatchPayload) -> Result<reqwest::Response, ApiError> {
        let url = self.url(path);
        let request_config = RequestConfig::build(self.cookies.as_ref(), &self.csrf_cookie, &self.session);

        tracing::debug!(
            "POST {} (csrf: {})",
            url,
            request_config.has_csrf(&self.session)
        );

        let response = self
            .client
            .post(&url)
            .headers(request_config.headers().clone())
            .json(payload)
            .send()
            .await?;

        Ok(response)
    }
}

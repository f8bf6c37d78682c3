use crate::core::{EventOption, FormNormalizer, MatchListView};
use crate::models::{MatchPayload, RawFormEntries};
use crate::services::{ApiClient, ApiError, Renderer};
use std::sync::Arc;
use thiserror::Error;

pub const MATCH_ERROR_ALERT: &str = "Match error";

/// Failures a flow cannot recover from locally
#[derive(Debug, Error)]
pub enum FlowError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Failed to render output: {0}")]
    Render(#[from] std::io::Error),
}

/// How a user action ended when it did not fail outright
#[derive(Debug, Clone, PartialEq)]
pub enum FlowOutcome {
    /// Nothing selected, nothing sent
    Skipped,
    /// Input rejected before any request was sent
    InvalidInput(String),
    /// The validation service refused the submission
    ValidationRejected(serde_json::Value),
    /// The validation service accepted the submission
    Validated,
    /// The matching service answered with an error
    MatchFailed,
    /// Matches were rendered
    Rendered { count: usize },
}

/// The page's user actions as sequential async operations
///
/// Operations take `&mut self`, so one action finishes before the next starts.
pub struct MatchFlow<R: Renderer> {
    api: Arc<ApiClient>,
    renderer: R,
    events: FormNormalizer,
    volunteers: FormNormalizer,
}

impl<R: Renderer> MatchFlow<R> {
    pub fn new(api: Arc<ApiClient>, renderer: R) -> Self {
        Self {
            api,
            renderer,
            events: FormNormalizer::for_events(),
            volunteers: FormNormalizer::for_volunteers(),
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    /// Populate the event picker
    pub async fn load_events(&mut self) -> Result<Vec<EventOption>, FlowError> {
        let events = self.api.list_events().await?;
        let options: Vec<EventOption> = events.iter().map(EventOption::from).collect();

        self.renderer.render_events(&options)?;
        tracing::info!("Loaded {} events", options.len());

        Ok(options)
    }

    /// Match volunteers against an event picked from the list
    ///
    /// `selection` is the raw picker value; an empty selection does nothing.
    pub async fn match_existing(&mut self, selection: &str) -> Result<FlowOutcome, FlowError> {
        let selection = selection.trim();
        if selection.is_empty() {
            return Ok(FlowOutcome::Skipped);
        }

        let event_id: i64 = match selection.parse() {
            Ok(id) => id,
            Err(_) => {
                let message = format!("Invalid event id: {}", selection);
                self.renderer.alert(&message)?;
                return Ok(FlowOutcome::InvalidInput(message));
            }
        };

        tracing::info!("Matching existing event {}", event_id);

        self.run_match(&MatchPayload::Existing { event_id }).await
    }

    /// Validate a new event, then match against it
    ///
    /// Matching is only requested once validation succeeds.
    pub async fn submit_event(&mut self, raw: &RawFormEntries) -> Result<FlowOutcome, FlowError> {
        let request = match self.events.normalize(raw) {
            Ok(request) => request,
            Err(e) => {
                let message = e.to_string();
                self.renderer.alert(&message)?;
                return Ok(FlowOutcome::InvalidInput(message));
            }
        };

        let payload = MatchPayload::from(request);

        match self.api.validate_event(&payload).await {
            Ok(()) => {}
            Err(ApiError::ValidationFailed { errors, .. }) => {
                self.renderer.alert(&format!("Validation errors:\n{}", errors))?;
                return Ok(FlowOutcome::ValidationRejected(errors));
            }
            Err(e) => return Err(e.into()),
        }

        self.run_match(&payload).await
    }

    /// Validate a volunteer registration form
    pub async fn submit_volunteer(&mut self, raw: &RawFormEntries) -> Result<FlowOutcome, FlowError> {
        let request = match self.volunteers.normalize(raw) {
            Ok(request) => request,
            Err(e) => {
                let message = e.to_string();
                self.renderer.alert(&message)?;
                return Ok(FlowOutcome::InvalidInput(message));
            }
        };

        match self.api.validate_volunteer(&MatchPayload::from(request)).await {
            Ok(()) => {
                tracing::info!("Volunteer registration validated");
                Ok(FlowOutcome::Validated)
            }
            Err(ApiError::ValidationFailed { errors, .. }) => {
                self.renderer.alert(&format!("Validation errors:\n{}", errors))?;
                Ok(FlowOutcome::ValidationRejected(errors))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn run_match(&mut self, payload: &MatchPayload) -> Result<FlowOutcome, FlowError> {
        let response = match self.api.request_matches(payload).await {
            Ok(response) => response,
            Err(ApiError::MatchFailed { .. }) => {
                self.renderer.alert(MATCH_ERROR_ALERT)?;
                return Ok(FlowOutcome::MatchFailed);
            }
            Err(e) => return Err(e.into()),
        };

        let view = MatchListView::from_results(&response.matches);
        self.renderer.render_matches(&view)?;

        tracing::info!("Rendered {} matches", view.len());

        Ok(FlowOutcome::Rendered { count: view.len() })
    }
}

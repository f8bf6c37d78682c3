//! Volunteer Match Client - client side of the Volunteers R Us matching service
//!
//! Turns browser-style form submissions into the JSON requests the backend
//! expects, runs the validate-then-match exchange, and builds display models
//! for the returned matches.

pub mod config;
pub mod core;
pub mod flows;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use self::core::{FormNormalizer, FieldSets, NormalizeError, MatchListView, EventOption};
pub use flows::{MatchFlow, FlowOutcome, FlowError};
pub use models::{RawFormEntries, NormalizedRequest, FieldValue, MatchPayload, MatchResult, EventSummary};
pub use services::{ApiClient, ApiError};

// Flow exports
pub mod matches;

pub use matches::{FlowError, FlowOutcome, MatchFlow, MATCH_ERROR_ALERT};

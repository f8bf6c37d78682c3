// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{EventSummary, EventDetail, Volunteer, MatchResult, FieldValue, NormalizedRequest};
pub use requests::{RawFormEntries, MatchPayload};
pub use responses::{EventsResponse, VolunteersResponse, MatchResponse, ValidationErrors};

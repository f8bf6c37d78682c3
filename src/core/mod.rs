// Core transformation exports
pub mod display;
pub mod normalizer;

pub use display::{EventOption, MatchListView, MatchRow};
pub use normalizer::{FieldSets, FormNormalizer, NormalizeError};

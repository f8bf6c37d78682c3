use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use crate::models::domain::{null_as_default, EventSummary, MatchResult, Volunteer};

/// Response for the events list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsResponse {
    pub events: Vec<EventSummary>,
}

/// Response for the volunteers list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolunteersResponse {
    pub volunteers: Vec<Volunteer>,
}

/// Response for the match endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub matches: Vec<MatchResult>,
    /// Event the backend matched against, echoed back; dropped if it does not parse
    #[serde(default, deserialize_with = "lenient_event")]
    pub event: Option<EventSummary>,
}

fn lenient_event<'de, D>(deserializer: D) -> Result<Option<EventSummary>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|v| serde_json::from_value(v).ok()))
}

/// Error body returned by the validation endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrors {
    #[serde(default)]
    pub errors: Value,
}

impl ValidationErrors {
    /// Flatten `{field: [messages]}` or `{field: message}` into `(field, message)` pairs
    ///
    /// Anything that is not an object becomes a single `("__all__", text)` entry.
    pub fn field_messages(&self) -> Vec<(String, String)> {
        match &self.errors {
            Value::Null => Vec::new(),
            Value::Object(map) => map
                .iter()
                .flat_map(|(field, messages)| {
                    let texts: Vec<String> = match messages {
                        Value::Array(items) => items.iter().map(value_text).collect(),
                        other => vec![value_text(other)],
                    };
                    texts.into_iter().map(move |t| (field.clone(), t))
                })
                .collect(),
            other => vec![("__all__".to_string(), value_text(other))],
        }
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

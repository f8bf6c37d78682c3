use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Event as listed by the events endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSummary {
    pub id: i64,
    pub title: String,
    /// Remaining event fields, present when the backend sends the full record
    #[serde(flatten)]
    pub detail: EventDetail,
}

/// Optional requirement fields of an event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventDetail {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slots: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub time_blocks: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_radius_miles: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
}

/// Volunteer as returned inside a match result or by the volunteers endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Volunteer {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(alias = "full_name")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: BTreeSet<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub languages: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub availability: Vec<String>,
    #[serde(default)]
    pub radius_miles: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub certifications: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub constraints: Vec<String>,
}

/// Deserialize a field that the backend may send as `null`, treating it as absent
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Scored volunteer produced by the matching service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub volunteer: Volunteer,
    pub score: f64,
}

/// A normalized form field value
///
/// Serializes untagged, so a request body reads like plain JSON:
/// `{"id": 5, "title": "Beach", "languages": ["en"]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(serde_json::Number),
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn as_number(&self) -> Option<&serde_json::Number> {
        match self {
            FieldValue::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Form data after normalization, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedRequest {
    fields: BTreeMap<String, FieldValue>,
}

impl NormalizedRequest {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    pub(crate) fn insert(&mut self, name: String, value: FieldValue) {
        self.fields.insert(name, value);
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut FieldValue> {
        self.fields.get_mut(name)
    }
}

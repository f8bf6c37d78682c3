use serde::{Deserialize, Serialize};
use crate::models::domain::NormalizedRequest;

/// Raw form submission: ordered `(name, value)` pairs, names may repeat
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFormEntries {
    entries: Vec<(String, String)>,
}

impl RawFormEntries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Parse an `application/x-www-form-urlencoded` body
    ///
    /// `+` decodes to a space, percent escapes are decoded as UTF-8.
    /// Empty segments (`a=1&&b=2`) are skipped; a segment without `=` has an empty value.
    pub fn from_urlencoded(body: &str) -> Result<Self, std::string::FromUtf8Error> {
        let mut entries = Vec::new();

        for segment in body.trim().split('&').filter(|s| !s.is_empty()) {
            let (name, value) = segment.split_once('=').unwrap_or((segment, ""));
            entries.push((decode_component(name)?, decode_component(value)?));
        }

        Ok(Self { entries })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RawFormEntries
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

fn decode_component(raw: &str) -> Result<String, std::string::FromUtf8Error> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).map(|s| s.into_owned())
}

/// Body sent to the validation and matching endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatchPayload {
    /// Match against an event the backend already knows
    Existing { event_id: i64 },
    /// Match against a newly submitted event
    Event(NormalizedRequest),
}

impl From<NormalizedRequest> for MatchPayload {
    fn from(req: NormalizedRequest) -> Self {
        MatchPayload::Event(req)
    }
}

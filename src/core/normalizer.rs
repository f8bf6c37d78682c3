use crate::models::{FieldValue, NormalizedRequest, RawFormEntries};
use thiserror::Error;

/// Errors produced while normalizing a form submission
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    #[error("field `{field}` must be a number, got {value:?}")]
    NotNumeric { field: String, value: String },
}

/// Which fields get numeric coercion and which are always lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSets {
    pub numeric: &'static [&'static str],
    pub lists: &'static [&'static str],
}

impl FieldSets {
    /// Event creation form
    pub const EVENT: FieldSets = FieldSets {
        numeric: &["id", "slots", "max_radius_miles"],
        lists: &["required_skills", "languages", "time_blocks", "requires"],
    };

    /// Volunteer registration form
    pub const VOLUNTEER: FieldSets = FieldSets {
        numeric: &["id", "radius_miles"],
        lists: &["skills", "languages", "availability", "certifications", "constraints"],
    };
}

impl Default for FieldSets {
    fn default() -> Self {
        FieldSets::EVENT
    }
}

/// Converts raw form entries into the JSON request shape the backend expects
///
/// Normalization runs in three passes:
/// 1. Collapse: a name seen once keeps its string, a repeated name becomes a list in encounter order
/// 2. Numeric coercion for the configured numeric fields
/// 3. List normalization: missing list fields become `[]`, scalars become one-element lists
///
/// Every other field passes through as it was collapsed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormNormalizer {
    fields: FieldSets,
}

impl FormNormalizer {
    pub fn new(fields: FieldSets) -> Self {
        Self { fields }
    }

    pub fn for_events() -> Self {
        Self::new(FieldSets::EVENT)
    }

    pub fn for_volunteers() -> Self {
        Self::new(FieldSets::VOLUNTEER)
    }

    pub fn fields(&self) -> FieldSets {
        self.fields
    }

    pub fn normalize(&self, raw: &RawFormEntries) -> Result<NormalizedRequest, NormalizeError> {
        let mut req = collapse(raw);

        for &field in self.fields.numeric {
            if let Some(value) = req.get_mut(field) {
                *value = FieldValue::Number(coerce_number(field, value)?);
            }
        }

        for &field in self.fields.lists {
            match req.get_mut(field) {
                None => req.insert(field.to_string(), FieldValue::List(Vec::new())),
                Some(FieldValue::List(_)) => {}
                Some(value) => {
                    let single = scalar_text(value);
                    *value = FieldValue::List(vec![single]);
                }
            }
        }

        tracing::trace!("Normalized {} raw entries into {} fields", raw.len(), req.len());

        Ok(req)
    }
}

fn collapse(raw: &RawFormEntries) -> NormalizedRequest {
    let mut req = NormalizedRequest::default();

    for (name, value) in raw.iter() {
        match req.get_mut(name) {
            None => req.insert(name.to_string(), FieldValue::Text(value.to_string())),
            Some(FieldValue::List(items)) => items.push(value.to_string()),
            Some(existing) => {
                let first = scalar_text(existing);
                *existing = FieldValue::List(vec![first, value.to_string()]);
            }
        }
    }

    req
}

fn scalar_text(value: &FieldValue) -> String {
    match value {
        FieldValue::Text(s) => s.clone(),
        FieldValue::Number(n) => n.to_string(),
        FieldValue::List(items) => items.join(","),
    }
}

/// Parse a form string as a JSON number
///
/// Whitespace is trimmed; decimal and exponent forms are accepted. Empty strings,
/// non-finite values and repeated entries are rejected instead of becoming NaN.
fn coerce_number(field: &str, value: &FieldValue) -> Result<serde_json::Number, NormalizeError> {
    let not_numeric = || NormalizeError::NotNumeric {
        field: field.to_string(),
        value: scalar_text(value),
    };

    let text = match value {
        FieldValue::Number(n) => return Ok(n.clone()),
        FieldValue::Text(s) => s.trim(),
        FieldValue::List(_) => return Err(not_numeric()),
    };

    // A blank field is an unfilled field, not zero
    if text.is_empty() {
        return Err(not_numeric());
    }

    if let Ok(int) = text.parse::<i64>() {
        return Ok(int.into());
    }

    let float: f64 = text.parse().map_err(|_| not_numeric())?;
    if !float.is_finite() {
        return Err(not_numeric());
    }

    // 5.0 and 1e3 go out as integers, matching what a JS Number would serialize to
    if float.fract() == 0.0 && float.abs() < i64::MAX as f64 {
        return Ok((float as i64).into());
    }

    serde_json::Number::from_f64(float).ok_or_else(not_numeric)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(pairs: &[(&str, &str)]) -> RawFormEntries {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_single_value_stays_scalar() {
        let req = FormNormalizer::for_events()
            .normalize(&raw(&[("title", "Beach")]))
            .unwrap();

        assert_eq!(req.get("title"), Some(&FieldValue::Text("Beach".into())));
    }

    #[test]
    fn test_repeated_plain_field_becomes_list() {
        let req = FormNormalizer::for_events()
            .normalize(&raw(&[("note", "a"), ("note", "b"), ("note", "c")]))
            .unwrap();

        assert_eq!(
            req.get("note"),
            Some(&FieldValue::List(vec!["a".into(), "b".into(), "c".into()]))
        );
    }

    #[test]
    fn test_numeric_coercion() {
        let req = FormNormalizer::for_events()
            .normalize(&raw(&[("id", " 7 "), ("slots", "2"), ("max_radius_miles", "12.5")]))
            .unwrap();

        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["id"], json!(7));
        assert_eq!(value["slots"], json!(2));
        assert_eq!(value["max_radius_miles"], json!(12.5));
    }

    #[test]
    fn test_integral_float_serializes_as_integer() {
        let req = FormNormalizer::for_events()
            .normalize(&raw(&[("slots", "3.0"), ("id", "1e2")]))
            .unwrap();

        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["slots"], json!(3));
        assert_eq!(value["id"], json!(100));
    }

    #[test]
    fn test_non_numeric_rejected() {
        let err = FormNormalizer::for_events()
            .normalize(&raw(&[("slots", "many")]))
            .unwrap_err();

        assert_eq!(
            err,
            NormalizeError::NotNumeric { field: "slots".into(), value: "many".into() }
        );
    }

    #[test]
    fn test_empty_and_infinite_rejected() {
        let normalizer = FormNormalizer::for_events();
        assert!(normalizer.normalize(&raw(&[("id", "")])).is_err());
        assert!(normalizer.normalize(&raw(&[("id", "inf")])).is_err());
        assert!(normalizer.normalize(&raw(&[("id", "NaN")])).is_err());
    }

    #[test]
    fn test_repeated_numeric_rejected() {
        let err = FormNormalizer::for_events()
            .normalize(&raw(&[("id", "1"), ("id", "2")]))
            .unwrap_err();

        assert!(matches!(err, NormalizeError::NotNumeric { ref field, .. } if field == "id"));
    }

    #[test]
    fn test_volunteer_field_sets() {
        let req = FormNormalizer::for_volunteers()
            .normalize(&raw(&[("radius_miles", "10"), ("skills", "CPR")]))
            .unwrap();

        assert_eq!(req.get("skills").and_then(|v| v.as_list()), Some(&["CPR".to_string()][..]));
        assert_eq!(req.get("certifications").and_then(|v| v.as_list()), Some(&[][..]));
        assert!(req.get("radius_miles").and_then(|v| v.as_number()).is_some());
        assert!(!req.contains("required_skills"));
    }
}

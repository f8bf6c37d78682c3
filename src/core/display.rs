use crate::models::{EventSummary, MatchResult};
use std::fmt;

/// One rendered line of the match list
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRow {
    pub name: String,
    pub score: f64,
    pub skills: Vec<String>,
}

impl fmt::Display for MatchRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | score={} | skills=[{}]",
            self.name,
            self.score,
            self.skills.join(", ")
        )
    }
}

/// Display model for a match response
#[derive(Debug, Clone, PartialEq)]
pub enum MatchListView {
    Empty,
    Rows(Vec<MatchRow>),
}

impl MatchListView {
    /// Build the view from match results, keeping the backend's ranking order
    pub fn from_results(results: &[MatchResult]) -> Self {
        if results.is_empty() {
            return MatchListView::Empty;
        }

        let rows = results
            .iter()
            .map(|m| MatchRow {
                name: m.volunteer.name.clone(),
                score: m.score,
                // BTreeSet iteration is already sorted
                skills: m.volunteer.skills.iter().cloned().collect(),
            })
            .collect();

        MatchListView::Rows(rows)
    }

    pub fn len(&self) -> usize {
        match self {
            MatchListView::Empty => 0,
            MatchListView::Rows(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for MatchListView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchListView::Empty => write!(f, "No matches"),
            MatchListView::Rows(rows) => {
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "- {}", row)?;
                }
                Ok(())
            }
        }
    }
}

/// Dropdown entry for an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventOption {
    pub value: i64,
    pub label: String,
}

impl From<&EventSummary> for EventOption {
    fn from(event: &EventSummary) -> Self {
        Self {
            value: event.id,
            label: format!("{} — {}", event.id, event.title),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Volunteer;
    use std::collections::BTreeSet;

    fn result(name: &str, score: f64, skills: &[&str]) -> MatchResult {
        MatchResult {
            volunteer: Volunteer {
                id: None,
                name: name.to_string(),
                skills: skills.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
                languages: vec![],
                availability: vec![],
                radius_miles: None,
                certifications: vec![],
                constraints: vec![],
            },
            score,
        }
    }

    #[test]
    fn test_empty_view() {
        let view = MatchListView::from_results(&[]);
        assert_eq!(view, MatchListView::Empty);
        assert_eq!(view.to_string(), "No matches");
    }

    #[test]
    fn test_rows_keep_order_and_sort_skills() {
        let view = MatchListView::from_results(&[
            result("Bob Tran", 9.0, &["Lifting", "Driving"]),
            result("Allie Nguyen", 3.5, &[]),
        ]);

        assert_eq!(view.len(), 2);
        assert_eq!(
            view.to_string(),
            "- Bob Tran | score=9 | skills=[Driving, Lifting]\n- Allie Nguyen | score=3.5 | skills=[]"
        );
    }

    #[test]
    fn test_event_option_label() {
        let event = EventSummary {
            id: 101,
            title: "Food Pantry Shift".to_string(),
            detail: Default::default(),
        };

        let option = EventOption::from(&event);
        assert_eq!(option.value, 101);
        assert_eq!(option.label, "101 — Food Pantry Shift");
    }
}

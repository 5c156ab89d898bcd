use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::Identified;

pub static THESIS_COLLECTION_NAME: &str = "theses.json";
pub static DEFENSE_COLLECTION_NAME: &str = "defenses.json";
pub static THESIS_ID_PREFIX: &str = "T";

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 20.0;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum ThesisStatus {
    Ongoing,
    Scheduled,
}

impl std::fmt::Display for ThesisStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThesisStatus::Ongoing => write!(f, "Ongoing"),
            ThesisStatus::Scheduled => write!(f, "Scheduled"),
        }
    }
}

/// Evaluation event attached to a thesis once its supervisor schedules it.
/// Scores are keyed by reviewer user id, each within [0, 20].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defense {
    pub date: NaiveDate,
    pub internal_reviewer: String,
    pub external_reviewer: String,
    #[serde(default)]
    pub attendance: Vec<String>,
    #[serde(default)]
    pub scores: BTreeMap<String, f64>,
}

impl Defense {
    pub fn new(
        date: NaiveDate,
        internal_reviewer: impl ToString,
        external_reviewer: impl ToString,
    ) -> Defense {
        Defense {
            date,
            internal_reviewer: internal_reviewer.to_string(),
            external_reviewer: external_reviewer.to_string(),
            attendance: vec![],
            scores: BTreeMap::new(),
        }
    }

    pub fn is_assigned_reviewer(&self, user_id: &str) -> bool {
        self.internal_reviewer == user_id || self.external_reviewer == user_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thesis {
    pub thesis_id: String,
    pub student_id: String,
    pub course_id: String,
    pub supervisor_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub abstract_text: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Attached documents, carried opaquely.
    #[serde(default)]
    pub files: BTreeMap<String, Value>,
    pub ready_for_defense: bool,
    pub status: ThesisStatus,
    pub date_submitted: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defense: Option<Defense>,
}

impl Thesis {
    /// Fresh thesis created when a supervision request is accepted.
    pub fn new(
        thesis_id: impl ToString,
        student_id: impl ToString,
        course_id: impl ToString,
        supervisor_id: impl ToString,
    ) -> Thesis {
        Thesis {
            thesis_id: thesis_id.to_string(),
            student_id: student_id.to_string(),
            course_id: course_id.to_string(),
            supervisor_id: supervisor_id.to_string(),
            title: String::new(),
            abstract_text: String::new(),
            keywords: vec![],
            files: BTreeMap::new(),
            ready_for_defense: false,
            status: ThesisStatus::Ongoing,
            date_submitted: Utc::now(),
            defense: None,
        }
    }

    /// Case-insensitive contains-match over title, abstract and keywords.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.title.to_lowercase().contains(&query)
            || self.abstract_text.to_lowercase().contains(&query)
            || self
                .keywords
                .iter()
                .any(|k| k.to_lowercase().contains(&query))
    }
}

impl Identified for Thesis {
    fn id(&self) -> &str {
        &self.thesis_id
    }
}

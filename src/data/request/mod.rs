use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::Identified;

pub static REQUEST_COLLECTION_NAME: &str = "requests.json";
pub static REQUEST_ID_PREFIX: &str = "R";

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestStatus::Pending => write!(f, "Pending"),
            RequestStatus::Accepted => write!(f, "Accepted"),
            RequestStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub status: RequestStatus,
    pub date: DateTime<Utc>,
    pub note: String,
}

/// A student's application for supervision on a thesis course. The history
/// sequence is append-only; its last entry always mirrors the current status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub request_id: String,
    pub student_id: String,
    pub course_id: String,
    pub proposal: String,
    pub status: RequestStatus,
    pub date_submitted: DateTime<Utc>,
    pub history: Vec<HistoryEntry>,
}

impl Request {
    pub fn new(
        request_id: impl ToString,
        student_id: impl ToString,
        course_id: impl ToString,
        proposal: impl ToString,
    ) -> Request {
        let now = Utc::now();
        Request {
            request_id: request_id.to_string(),
            student_id: student_id.to_string(),
            course_id: course_id.to_string(),
            proposal: proposal.to_string(),
            status: RequestStatus::Pending,
            date_submitted: now,
            history: vec![HistoryEntry {
                status: RequestStatus::Pending,
                date: now,
                note: "Submitted by student".to_string(),
            }],
        }
    }

    /// Move to a new status, recording it in the audit trail. The only way
    /// request status is ever changed.
    pub fn transition(&mut self, status: RequestStatus, note: impl ToString) {
        self.status = status;
        self.history.push(HistoryEntry {
            status,
            date: Utc::now(),
            note: note.to_string(),
        });
    }

    pub fn is_open(&self) -> bool {
        matches!(self.status, RequestStatus::Pending | RequestStatus::Accepted)
    }
}

impl Identified for Request {
    fn id(&self) -> &str {
        &self.request_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_request_starts_pending_with_one_history_entry() {
        let request = Request::new("R1", "S1001", "TH1404-01", "ML survey");

        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.history.len(), 1);
        assert_eq!(request.history[0].status, RequestStatus::Pending);
    }

    #[test]
    fn transition_keeps_history_in_step_with_status() {
        let mut request = Request::new("R1", "S1001", "TH1404-01", "");

        request.transition(RequestStatus::Rejected, "Rejected by supervisor");
        assert_eq!(request.history.last().unwrap().status, request.status);

        request.transition(RequestStatus::Pending, "Re-submitted by student");
        assert_eq!(request.history.len(), 3);
        assert_eq!(request.history.last().unwrap().status, request.status);
    }
}

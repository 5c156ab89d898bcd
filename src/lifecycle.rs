//! Role-gated state transitions over the persisted record collections.
//!
//! Request machine: `Pending -> Accepted` (spawns a thesis), `Pending ->
//! Rejected`, `Rejected -> Pending` (owner re-submission). Thesis machine:
//! `Ongoing -> ready_for_defense -> Scheduled`, then reviewer scoring.
//!
//! Every operation is a full read-modify-write cycle against an injected
//! [`RecordStore`]; all preconditions are checked before anything is written,
//! so a rejected call never leaves partial state behind.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::data::course::{Course, COURSE_COLLECTION_NAME};
use crate::data::request::{Request, RequestStatus, REQUEST_COLLECTION_NAME, REQUEST_ID_PREFIX};
use crate::data::thesis::{
    Defense, Thesis, ThesisStatus, MAX_SCORE, MIN_SCORE, THESIS_COLLECTION_NAME, THESIS_ID_PREFIX,
};
use crate::data::user::{User, USER_COLLECTION_NAME};
use crate::error::LifecycleError;
use crate::store::{find_by_id, find_by_id_mut, RecordStore};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Accept,
    Reject,
}

/// Result of a supervisor reviewing a request; `thesis` is present exactly
/// when the decision was [`ReviewDecision::Accept`].
#[derive(Debug, Clone, Serialize)]
pub struct ReviewOutcome {
    pub request: Request,
    pub thesis: Option<Thesis>,
}

/// Student submits a supervision request for a course.
pub fn submit_request<S: RecordStore>(
    store: &S,
    student_id: &str,
    course_id: &str,
    proposal: &str,
) -> Result<Request, LifecycleError> {
    let courses: Vec<Course> = store.load(COURSE_COLLECTION_NAME);
    let course =
        find_by_id(&courses, course_id).ok_or_else(|| LifecycleError::not_found("course", course_id))?;

    if !course.has_open_slots() {
        return Err(LifecycleError::invalid_state(
            "this course is at full capacity",
        ));
    }

    let mut requests: Vec<Request> = store.load(REQUEST_COLLECTION_NAME);
    if requests.iter().any(|r| r.student_id == student_id && r.is_open()) {
        return Err(LifecycleError::invalid_state(
            "you already have a pending or accepted request",
        ));
    }

    let request_id = store.next_id(REQUEST_ID_PREFIX)?;
    let request = Request::new(request_id, student_id, course_id, proposal);

    requests.push(request.clone());
    store.save(REQUEST_COLLECTION_NAME, &requests)?;

    tracing::info!("Request {} submitted by {}", request.request_id, student_id);
    Ok(request)
}

/// Supervisor accepts or rejects a pending request for one of their courses.
///
/// Accepting atomically creates the student's thesis, bumps the supervisor's
/// `supervise_count` and consumes one slot of the course's capacity.
pub fn review_request<S: RecordStore>(
    store: &S,
    supervisor_id: &str,
    request_id: &str,
    decision: ReviewDecision,
) -> Result<ReviewOutcome, LifecycleError> {
    let mut requests: Vec<Request> = store.load(REQUEST_COLLECTION_NAME);
    let mut courses: Vec<Course> = store.load(COURSE_COLLECTION_NAME);

    let idx = requests
        .iter()
        .position(|r| r.request_id == request_id)
        .ok_or_else(|| LifecycleError::not_found("request", request_id))?;
    let course_id = requests[idx].course_id.clone();

    let course = find_by_id(&courses, &course_id)
        .ok_or_else(|| LifecycleError::not_found("course", &course_id))?;
    if course.supervisor_id != supervisor_id {
        return Err(LifecycleError::forbidden(
            "request is not for one of your courses",
        ));
    }
    if requests[idx].status != RequestStatus::Pending {
        return Err(LifecycleError::invalid_state(
            "only pending requests can be reviewed",
        ));
    }

    let request = &mut requests[idx];

    let thesis = match decision {
        ReviewDecision::Accept => {
            // A slot was open at submission, but earlier accepts may have
            // consumed it since.
            let course = find_by_id_mut(&mut courses, &course_id)
                .ok_or_else(|| LifecycleError::not_found("course", &course_id))?;
            if !course.has_open_slots() {
                return Err(LifecycleError::invalid_state(
                    "this course has no remaining open slots",
                ));
            }
            course.capacity -= 1;

            request.transition(RequestStatus::Accepted, "Approved by supervisor");

            let thesis_id = store.next_id(THESIS_ID_PREFIX)?;
            let thesis = Thesis::new(thesis_id, &request.student_id, &course_id, supervisor_id);

            let mut theses: Vec<Thesis> = store.load(THESIS_COLLECTION_NAME);
            theses.push(thesis.clone());

            let mut users: Vec<User> = store.load(USER_COLLECTION_NAME);
            match find_by_id_mut(&mut users, supervisor_id) {
                Some(supervisor) => supervisor.bump_supervise_count(),
                None => tracing::warn!("Accepting supervisor {} has no user record", supervisor_id),
            }

            store.save(THESIS_COLLECTION_NAME, &theses)?;
            store.save(USER_COLLECTION_NAME, &users)?;
            store.save(COURSE_COLLECTION_NAME, &courses)?;

            tracing::info!(
                "Request {} accepted; thesis {} created",
                request_id,
                thesis.thesis_id
            );
            Some(thesis)
        }
        ReviewDecision::Reject => {
            request.transition(RequestStatus::Rejected, "Rejected by supervisor");
            tracing::info!("Request {} rejected", request_id);
            None
        }
    };

    let request = request.clone();
    store.save(REQUEST_COLLECTION_NAME, &requests)?;

    Ok(ReviewOutcome { request, thesis })
}

/// Student re-submits a rejected request of their own. Allowed any number of
/// times; accepted requests can never re-enter the pipeline.
pub fn resubmit_request<S: RecordStore>(
    store: &S,
    student_id: &str,
    request_id: &str,
) -> Result<Request, LifecycleError> {
    let mut requests: Vec<Request> = store.load(REQUEST_COLLECTION_NAME);
    let request = find_by_id_mut(&mut requests, request_id)
        .ok_or_else(|| LifecycleError::not_found("request", request_id))?;

    if request.student_id != student_id {
        return Err(LifecycleError::forbidden(
            "you can only re-submit your own requests",
        ));
    }
    if request.status != RequestStatus::Rejected {
        return Err(LifecycleError::invalid_state(
            "only rejected requests can be re-submitted",
        ));
    }

    request.transition(RequestStatus::Pending, "Re-submitted by student");
    request.date_submitted = Utc::now();

    let request = request.clone();
    store.save(REQUEST_COLLECTION_NAME, &requests)?;

    tracing::info!("Request {} re-submitted by {}", request_id, student_id);
    Ok(request)
}

/// Student flags their ongoing thesis as ready for defense. The flag itself is
/// the pending-review state; thesis status stays `Ongoing` until the
/// supervisor schedules.
pub fn request_defense<S: RecordStore>(
    store: &S,
    student_id: &str,
) -> Result<Thesis, LifecycleError> {
    let mut theses: Vec<Thesis> = store.load(THESIS_COLLECTION_NAME);
    let thesis = theses
        .iter_mut()
        .find(|t| t.student_id == student_id)
        .ok_or_else(|| LifecycleError::not_found("thesis for student", student_id))?;

    if thesis.status != ThesisStatus::Ongoing {
        return Err(LifecycleError::invalid_state(
            "a defense can only be requested for an ongoing thesis",
        ));
    }
    if thesis.ready_for_defense {
        return Err(LifecycleError::invalid_state(
            "defense already requested and pending supervisor approval",
        ));
    }

    thesis.ready_for_defense = true;

    let thesis = thesis.clone();
    store.save(THESIS_COLLECTION_NAME, &theses)?;

    tracing::info!("Defense requested for thesis {}", thesis.thesis_id);
    Ok(thesis)
}

/// Supervisor schedules the defense of a thesis they supervise, assigning a
/// date and two reviewers (each an existing reviewer or supervisor).
pub fn schedule_defense<S: RecordStore>(
    store: &S,
    supervisor_id: &str,
    thesis_id: &str,
    date: &str,
    internal_reviewer: &str,
    external_reviewer: &str,
) -> Result<Thesis, LifecycleError> {
    let mut theses: Vec<Thesis> = store.load(THESIS_COLLECTION_NAME);
    let thesis = find_by_id_mut(&mut theses, thesis_id)
        .ok_or_else(|| LifecycleError::not_found("thesis", thesis_id))?;

    if thesis.supervisor_id != supervisor_id {
        return Err(LifecycleError::forbidden("thesis is not supervised by you"));
    }
    if !thesis.ready_for_defense {
        return Err(LifecycleError::invalid_state(
            "thesis is not ready for defense",
        ));
    }

    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| LifecycleError::validation("defense date must be formatted YYYY-MM-DD"))?;

    let users: Vec<User> = store.load(USER_COLLECTION_NAME);
    for reviewer_id in [internal_reviewer, external_reviewer] {
        match find_by_id(&users, reviewer_id) {
            Some(user) if user.role().can_review() => {}
            _ => {
                return Err(LifecycleError::validation(format!(
                    "invalid reviewer id: {}",
                    reviewer_id
                )))
            }
        }
    }

    thesis.defense = Some(Defense::new(date, internal_reviewer, external_reviewer));
    thesis.status = ThesisStatus::Scheduled;

    let thesis = thesis.clone();
    store.save(THESIS_COLLECTION_NAME, &theses)?;

    tracing::info!("Defense scheduled for thesis {} on {}", thesis_id, date);
    Ok(thesis)
}

/// Assigned reviewer records (or revises) their score for a scheduled defense.
pub fn record_score<S: RecordStore>(
    store: &S,
    reviewer_id: &str,
    thesis_id: &str,
    score: f64,
) -> Result<Thesis, LifecycleError> {
    let mut theses: Vec<Thesis> = store.load(THESIS_COLLECTION_NAME);
    let thesis = find_by_id_mut(&mut theses, thesis_id)
        .ok_or_else(|| LifecycleError::not_found("thesis", thesis_id))?;

    let defense = thesis.defense.as_mut().ok_or_else(|| {
        LifecycleError::invalid_state("no defense has been scheduled for this thesis")
    })?;
    if !defense.is_assigned_reviewer(reviewer_id) {
        return Err(LifecycleError::forbidden(
            "you are not an assigned reviewer for this defense",
        ));
    }
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(LifecycleError::validation("score must be between 0 and 20"));
    }

    defense.scores.insert(reviewer_id.to_string(), score);

    let thesis = thesis.clone();
    store.save(THESIS_COLLECTION_NAME, &theses)?;

    tracing::info!("Score recorded for thesis {} by {}", thesis_id, reviewer_id);
    Ok(thesis)
}

/// Full-text contains-match over the thesis archive, in storage order.
pub fn search_theses<S: RecordStore>(store: &S, query: &str) -> Vec<Thesis> {
    let theses: Vec<Thesis> = store.load(THESIS_COLLECTION_NAME);
    theses.into_iter().filter(|t| t.matches(query)).collect()
}

pub fn list_courses<S: RecordStore>(store: &S) -> Vec<Course> {
    store.load(COURSE_COLLECTION_NAME)
}

pub fn requests_for_student<S: RecordStore>(store: &S, student_id: &str) -> Vec<Request> {
    let requests: Vec<Request> = store.load(REQUEST_COLLECTION_NAME);
    requests
        .into_iter()
        .filter(|r| r.student_id == student_id)
        .collect()
}

/// Pending requests targeting any course assigned to the supervisor.
pub fn pending_requests_for_supervisor<S: RecordStore>(
    store: &S,
    supervisor_id: &str,
) -> Vec<Request> {
    let requests: Vec<Request> = store.load(REQUEST_COLLECTION_NAME);
    let courses: Vec<Course> = store.load(COURSE_COLLECTION_NAME);

    requests
        .into_iter()
        .filter(|r| {
            r.status == RequestStatus::Pending
                && find_by_id(&courses, &r.course_id)
                    .map(|c| c.supervisor_id == supervisor_id)
                    .unwrap_or(false)
        })
        .collect()
}

pub fn theses_for_supervisor<S: RecordStore>(store: &S, supervisor_id: &str) -> Vec<Thesis> {
    let theses: Vec<Thesis> = store.load(THESIS_COLLECTION_NAME);
    theses
        .into_iter()
        .filter(|t| t.supervisor_id == supervisor_id)
        .collect()
}

/// Supervised theses whose students have requested a defense that is still
/// waiting to be scheduled.
pub fn theses_ready_for_defense<S: RecordStore>(store: &S, supervisor_id: &str) -> Vec<Thesis> {
    let theses: Vec<Thesis> = store.load(THESIS_COLLECTION_NAME);
    theses
        .into_iter()
        .filter(|t| {
            t.supervisor_id == supervisor_id
                && t.ready_for_defense
                && t.status == ThesisStatus::Ongoing
        })
        .collect()
}

/// Scheduled defenses on which the reviewer still sits, whether or not they
/// have already scored.
pub fn defenses_awaiting_reviewer<S: RecordStore>(store: &S, reviewer_id: &str) -> Vec<Thesis> {
    let theses: Vec<Thesis> = store.load(THESIS_COLLECTION_NAME);
    theses
        .into_iter()
        .filter(|t| {
            t.defense
                .as_ref()
                .map(|d| d.is_assigned_reviewer(reviewer_id))
                .unwrap_or(false)
        })
        .collect()
}

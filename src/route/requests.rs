use rocket::serde::json::Json;
use rocket::State;
use serde::Deserialize;

use crate::data::request::Request;
use crate::lifecycle::{self, ReviewDecision, ReviewOutcome};
use crate::resp::jwt::UserRoleToken;
use crate::resp::problem::Problem;
use crate::role::Role;
use crate::route::role_problem;
use crate::store::FileStore;

#[derive(Debug, Clone, Deserialize)]
pub struct RequestCreateData {
    pub course_id: String,
    #[serde(default)]
    pub proposal: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestReviewData {
    pub decision: ReviewDecision,
}

/// Students see their own requests (with history); supervisors see pending
/// requests for their courses.
#[get("/requests")]
#[tracing::instrument(skip(store))]
pub async fn request_list(
    auth: UserRoleToken,
    store: &State<FileStore>,
) -> Result<Json<Vec<Request>>, Problem> {
    let requests = match auth.role {
        Role::Student => lifecycle::requests_for_student(store.inner(), &auth.user),
        Role::Supervisor => lifecycle::pending_requests_for_supervisor(store.inner(), &auth.user),
        Role::Reviewer => return Err(role_problem(Role::Supervisor)),
    };

    Ok(Json(requests))
}

#[post("/requests", format = "application/json", data = "<create>")]
#[tracing::instrument(skip(store))]
pub async fn request_submit(
    create: Json<RequestCreateData>,
    auth: UserRoleToken,
    store: &State<FileStore>,
) -> Result<Json<Request>, Problem> {
    if auth.role != Role::Student {
        return Err(role_problem(Role::Student));
    }

    let request = lifecycle::submit_request(
        store.inner(),
        &auth.user,
        &create.course_id,
        &create.proposal,
    )?;

    Ok(Json(request))
}

#[post("/requests/<id>/review", format = "application/json", data = "<review>")]
#[tracing::instrument(skip(store))]
pub async fn request_review(
    id: &str,
    review: Json<RequestReviewData>,
    auth: UserRoleToken,
    store: &State<FileStore>,
) -> Result<Json<ReviewOutcome>, Problem> {
    if auth.role != Role::Supervisor {
        return Err(role_problem(Role::Supervisor));
    }

    let outcome = lifecycle::review_request(store.inner(), &auth.user, id, review.decision)?;

    Ok(Json(outcome))
}

#[post("/requests/<id>/resubmit")]
#[tracing::instrument(skip(store))]
pub async fn request_resubmit(
    id: &str,
    auth: UserRoleToken,
    store: &State<FileStore>,
) -> Result<Json<Request>, Problem> {
    if auth.role != Role::Student {
        return Err(role_problem(Role::Student));
    }

    let request = lifecycle::resubmit_request(store.inner(), &auth.user, id)?;

    Ok(Json(request))
}

///////////////////////
//       TESTS
///////////////////////

#[cfg(test)]
mod request_endpoints {
    use rocket::http::{ContentType, Status};
    use rocket::local::asynchronous::Client;

    use crate::data::request::Request;
    use crate::test_support::{test_rocket, user_cookie};

    #[rocket::async_test]
    async fn v1_requests_require_auth() {
        let (rocket, _ctx) = test_rocket();
        let client = Client::tracked(rocket).await.expect("invalid backend");

        let response = client.get("/api/v1/requests").dispatch().await;
        assert_eq!(response.status(), Status::Unauthorized);
    }

    #[rocket::async_test]
    async fn v1_request_submit_and_list_work_for_students() {
        let (rocket, ctx) = test_rocket();
        let client = Client::tracked(rocket).await.expect("invalid backend");
        let cookie = user_cookie(&ctx, "S1001");

        let response = client
            .post("/api/v1/requests")
            .header(ContentType::JSON)
            .cookie(cookie.clone())
            .body(r#"{"course_id": "TH1404-01", "proposal": "ML survey"}"#)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let request: Request = response.into_json().await.expect("invalid response json");
        assert_eq!(request.request_id, "R1");

        let response = client
            .get("/api/v1/requests")
            .cookie(cookie)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let listed: Vec<Request> = response.into_json().await.expect("invalid response json");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].request_id, "R1");
    }

    #[rocket::async_test]
    async fn v1_request_review_is_supervisor_only() {
        let (rocket, ctx) = test_rocket();
        let client = Client::tracked(rocket).await.expect("invalid backend");

        let response = client
            .post("/api/v1/requests/R1/review")
            .header(ContentType::JSON)
            .cookie(user_cookie(&ctx, "S1001"))
            .body(r#"{"decision": "accept"}"#)
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Forbidden);
    }

    #[rocket::async_test]
    async fn v1_review_accept_round_trip() {
        let (rocket, ctx) = test_rocket();
        let client = Client::tracked(rocket).await.expect("invalid backend");

        let response = client
            .post("/api/v1/requests")
            .header(ContentType::JSON)
            .cookie(user_cookie(&ctx, "S1001"))
            .body(r#"{"course_id": "TH1404-01"}"#)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        // Supervisor of TH1404-01 accepts; a thesis comes back in the outcome.
        let response = client
            .post("/api/v1/requests/R1/review")
            .header(ContentType::JSON)
            .cookie(user_cookie(&ctx, "T2001"))
            .body(r#"{"decision": "accept"}"#)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let outcome: serde_json::Value = response.into_json().await.expect("invalid json");
        assert_eq!(outcome["request"]["status"], "Accepted");
        assert_eq!(outcome["thesis"]["thesis_id"], "T1");
    }
}

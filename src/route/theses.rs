use rocket::serde::json::Json;
use rocket::State;
use serde::Deserialize;

use crate::data::thesis::Thesis;
use crate::lifecycle;
use crate::resp::jwt::UserRoleToken;
use crate::resp::problem::Problem;
use crate::role::Role;
use crate::route::role_problem;
use crate::store::FileStore;

#[derive(Debug, Clone, Deserialize)]
pub struct DefenseScheduleData {
    pub date: String,
    pub internal_reviewer: String,
    pub external_reviewer: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DefenseScoreData {
    pub score: f64,
}

/// Supervisors see the theses they supervise, narrowed to those awaiting
/// defense scheduling with `?ready=true`; reviewers see the scheduled
/// defenses they sit on.
#[get("/theses?<ready>")]
#[tracing::instrument(skip(store))]
pub async fn thesis_list(
    ready: Option<bool>,
    auth: UserRoleToken,
    store: &State<FileStore>,
) -> Result<Json<Vec<Thesis>>, Problem> {
    let theses = match auth.role {
        Role::Supervisor if ready.unwrap_or(false) => {
            lifecycle::theses_ready_for_defense(store.inner(), &auth.user)
        }
        Role::Supervisor => lifecycle::theses_for_supervisor(store.inner(), &auth.user),
        Role::Reviewer => lifecycle::defenses_awaiting_reviewer(store.inner(), &auth.user),
        Role::Student => return Err(role_problem(Role::Supervisor)),
    };

    Ok(Json(theses))
}

/// Student flags their ongoing thesis as ready; scheduling is then up to the
/// supervisor.
#[post("/theses/defense")]
#[tracing::instrument(skip(store))]
pub async fn defense_request(
    auth: UserRoleToken,
    store: &State<FileStore>,
) -> Result<Json<Thesis>, Problem> {
    if auth.role != Role::Student {
        return Err(role_problem(Role::Student));
    }

    let thesis = lifecycle::request_defense(store.inner(), &auth.user)?;

    Ok(Json(thesis))
}

#[post("/theses/<id>/schedule", format = "application/json", data = "<schedule>")]
#[tracing::instrument(skip(store))]
pub async fn defense_schedule(
    id: &str,
    schedule: Json<DefenseScheduleData>,
    auth: UserRoleToken,
    store: &State<FileStore>,
) -> Result<Json<Thesis>, Problem> {
    if auth.role != Role::Supervisor {
        return Err(role_problem(Role::Supervisor));
    }

    let thesis = lifecycle::schedule_defense(
        store.inner(),
        &auth.user,
        id,
        &schedule.date,
        &schedule.internal_reviewer,
        &schedule.external_reviewer,
    )?;

    Ok(Json(thesis))
}

/// Assigned reviewers may hold a reviewer or supervisor account, so the gate
/// here is "can review"; the engine enforces assignment to this defense.
#[post("/theses/<id>/score", format = "application/json", data = "<score>")]
#[tracing::instrument(skip(store))]
pub async fn defense_score(
    id: &str,
    score: Json<DefenseScoreData>,
    auth: UserRoleToken,
    store: &State<FileStore>,
) -> Result<Json<Thesis>, Problem> {
    if !auth.role.can_review() {
        return Err(role_problem(Role::Reviewer));
    }

    let thesis = lifecycle::record_score(store.inner(), &auth.user, id, score.score)?;

    Ok(Json(thesis))
}

/// Archive search over title, abstract and keywords.
#[get("/theses/search?<q>")]
#[tracing::instrument(skip(store))]
pub async fn thesis_search(
    q: &str,
    _auth: UserRoleToken,
    store: &State<FileStore>,
) -> Result<Json<Vec<Thesis>>, Problem> {
    Ok(Json(lifecycle::search_theses(store.inner(), q)))
}

///////////////////////
//       TESTS
///////////////////////

#[cfg(test)]
mod thesis_endpoints {
    use rocket::http::{ContentType, Status};
    use rocket::local::asynchronous::Client;

    use crate::data::thesis::Thesis;
    use crate::test_support::{test_rocket, user_cookie};

    /// Drive the whole flow through the HTTP surface: submit, accept, ready,
    /// schedule, score.
    #[rocket::async_test]
    async fn v1_defense_flow_round_trip() {
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

        let response = client
            .post("/api/v1/requests/R1/review")
            .header(ContentType::JSON)
            .cookie(user_cookie(&ctx, "T2001"))
            .body(r#"{"decision": "accept"}"#)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let response = client
            .post("/api/v1/theses/defense")
            .cookie(user_cookie(&ctx, "S1001"))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let thesis: Thesis = response.into_json().await.expect("invalid json");
        assert!(thesis.ready_for_defense);

        let response = client
            .post("/api/v1/theses/T1/schedule")
            .header(ContentType::JSON)
            .cookie(user_cookie(&ctx, "T2001"))
            .body(
                r#"{"date": "2026-09-15", "internal_reviewer": "T3001", "external_reviewer": "T2002"}"#,
            )
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let response = client
            .post("/api/v1/theses/T1/score")
            .header(ContentType::JSON)
            .cookie(user_cookie(&ctx, "T3001"))
            .body(r#"{"score": 18.5}"#)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let thesis: Thesis = response.into_json().await.expect("invalid json");
        assert_eq!(
            thesis.defense.unwrap().scores.get("T3001"),
            Some(&18.5)
        );

        // Out-of-range score maps to a 400 problem.
        let response = client
            .post("/api/v1/theses/T1/score")
            .header(ContentType::JSON)
            .cookie(user_cookie(&ctx, "T3001"))
            .body(r#"{"score": 25.0}"#)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);
    }

    #[rocket::async_test]
    async fn v1_thesis_list_ready_flag_narrows_to_unscheduled() {
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

        let response = client
            .post("/api/v1/requests/R1/review")
            .header(ContentType::JSON)
            .cookie(user_cookie(&ctx, "T2001"))
            .body(r#"{"decision": "accept"}"#)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        // The thesis is ongoing but not flagged yet.
        let response = client
            .get("/api/v1/theses?ready=true")
            .cookie(user_cookie(&ctx, "T2001"))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let ready: Vec<Thesis> = response.into_json().await.expect("invalid json");
        assert!(ready.is_empty());

        let response = client
            .post("/api/v1/theses/defense")
            .cookie(user_cookie(&ctx, "S1001"))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let response = client
            .get("/api/v1/theses?ready=true")
            .cookie(user_cookie(&ctx, "T2001"))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let ready: Vec<Thesis> = response.into_json().await.expect("invalid json");
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].thesis_id, "T1");

        // Without the flag the full supervised list comes back.
        let response = client
            .get("/api/v1/theses")
            .cookie(user_cookie(&ctx, "T2001"))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let listed: Vec<Thesis> = response.into_json().await.expect("invalid json");
        assert_eq!(listed.len(), 1);
    }

    #[rocket::async_test]
    async fn v1_thesis_list_is_not_for_students() {
        let (rocket, ctx) = test_rocket();
        let client = Client::tracked(rocket).await.expect("invalid backend");

        let response = client
            .get("/api/v1/theses")
            .cookie(user_cookie(&ctx, "S1001"))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Forbidden);
    }

    #[rocket::async_test]
    async fn v1_search_requires_auth_and_returns_matches() {
        let (rocket, ctx) = test_rocket();
        let client = Client::tracked(rocket).await.expect("invalid backend");

        let response = client.get("/api/v1/theses/search?q=ml").dispatch().await;
        assert_eq!(response.status(), Status::Unauthorized);

        let response = client
            .get("/api/v1/theses/search?q=ml")
            .cookie(user_cookie(&ctx, "S1002"))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let results: Vec<Thesis> = response.into_json().await.expect("invalid json");
        assert!(results.is_empty());
    }
}

use rocket::http::Status;
use rocket::{Build, Rocket, Route};

pub mod courses;
pub mod requests;
pub mod theses;
pub mod users;

use courses::*;
use requests::*;
use theses::*;
use users::*;

use crate::resp::problem::Problem;
use crate::role::Role;

pub fn api_v1() -> Vec<Route> {
    routes![
        login_submit,
        course_list,
        request_list,
        request_submit,
        request_review,
        request_resubmit,
        thesis_list,
        defense_request,
        defense_schedule,
        defense_score,
        thesis_search
    ]
}

pub fn mount_api(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket.mount("/api/v1", api_v1())
}

pub(crate) fn role_problem(required: Role) -> Problem {
    Problem::new_untyped(
        Status::Forbidden,
        format!("Operation is limited to {} accounts.", required),
    )
}

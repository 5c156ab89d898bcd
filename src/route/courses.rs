use rocket::serde::json::Json;
use rocket::State;
use serde::Serialize;

use crate::data::course::Course;
use crate::data::user::{User, USER_COLLECTION_NAME};
use crate::lifecycle;
use crate::resp::jwt::UserRoleToken;
use crate::resp::problem::Problem;
use crate::store::{find_by_id, FileStore, RecordStore};

#[derive(Debug, Serialize)]
pub struct CourseListResponse {
    pub course_id: String,
    pub title: String,
    pub supervisor_id: String,
    pub supervisor_name: String,
    pub capacity: i32,
    pub year: i32,
    pub semester: String,
    pub units: u32,
}

impl CourseListResponse {
    fn new(course: Course, users: &[User]) -> CourseListResponse {
        let supervisor_name = find_by_id(users, &course.supervisor_id)
            .map(|u| u.name.clone())
            .unwrap_or_else(|| "Unknown".to_string());

        CourseListResponse {
            course_id: course.course_id,
            title: course.title,
            supervisor_id: course.supervisor_id,
            supervisor_name,
            capacity: course.capacity,
            year: course.year,
            semester: course.semester,
            units: course.units,
        }
    }
}

/// Course catalogue with supervisor names resolved.
#[get("/courses")]
#[tracing::instrument(skip(store))]
pub async fn course_list(
    _auth: UserRoleToken,
    store: &State<FileStore>,
) -> Result<Json<Vec<CourseListResponse>>, Problem> {
    let users: Vec<User> = store.load(USER_COLLECTION_NAME);
    let courses = lifecycle::list_courses(store.inner());

    Ok(Json(
        courses
            .into_iter()
            .map(|c| CourseListResponse::new(c, &users))
            .collect(),
    ))
}

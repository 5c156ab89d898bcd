use serde::{Deserialize, Serialize};

use crate::store::Identified;

pub static COURSE_COLLECTION_NAME: &str = "courses.json";

/// A thesis course slot offered by a supervisor. Everything past `capacity`
/// is descriptive metadata carried through unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub course_id: String,
    pub title: String,
    pub supervisor_id: String,
    /// Remaining open slots; decremented when a request is accepted.
    pub capacity: i32,
    pub year: i32,
    pub semester: String,
    #[serde(default)]
    pub resources: Vec<String>,
    pub sessions: u32,
    pub units: u32,
}

impl Course {
    pub fn has_open_slots(&self) -> bool {
        self.capacity > 0
    }
}

impl Identified for Course {
    fn id(&self) -> &str {
        &self.course_id
    }
}

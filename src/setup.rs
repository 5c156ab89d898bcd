use std::io;

use crate::data::course::{Course, COURSE_COLLECTION_NAME};
use crate::data::request::{Request, REQUEST_COLLECTION_NAME, REQUEST_ID_PREFIX};
use crate::data::thesis::{Thesis, DEFENSE_COLLECTION_NAME, THESIS_COLLECTION_NAME, THESIS_ID_PREFIX};
use crate::data::user::{User, USER_COLLECTION_NAME};
use crate::role::Role;
use crate::security::Salt;
use crate::store::{max_id_suffix, Identified, RecordStore};

/// Seed demo users and thesis courses into any collection that doesn't exist
/// yet, and bring the id counters in step with whatever records are present.
pub fn initialize_defaults<S: RecordStore>(store: &S, salt: &Salt) -> io::Result<()> {
    if store.read(USER_COLLECTION_NAME).is_none() {
        tracing::info!("Seeding demo users...");
        let users = vec![
            User::new("S1001", "Ali Rezaei", Role::Student, "pass123", salt),
            User::new("S1002", "Sara Mohammadi", Role::Student, "pass123", salt),
            User::new("T2001", "Dr. Ahmadi", Role::Supervisor, "drpass", salt),
            User::new("T2002", "Dr. Hosseini", Role::Supervisor, "drpass", salt),
            User::new("T3001", "Dr. Karimi", Role::Reviewer, "revpass", salt),
        ];
        store.save(USER_COLLECTION_NAME, &users)?;
    }

    if store.read(COURSE_COLLECTION_NAME).is_none() {
        tracing::info!("Seeding demo thesis courses...");
        let courses = vec![
            Course {
                course_id: "TH1404-01".to_string(),
                title: "Thesis - Machine Learning".to_string(),
                supervisor_id: "T2001".to_string(),
                capacity: 2,
                year: 1404,
                semester: "First".to_string(),
                resources: vec!["Ref A".to_string()],
                sessions: 10,
                units: 6,
            },
            Course {
                course_id: "TH1404-02".to_string(),
                title: "Thesis - Computer Vision".to_string(),
                supervisor_id: "T2002".to_string(),
                capacity: 1,
                year: 1404,
                semester: "First".to_string(),
                resources: vec!["Ref B".to_string()],
                sessions: 10,
                units: 6,
            },
        ];
        store.save(COURSE_COLLECTION_NAME, &courses)?;
    }

    for name in [
        REQUEST_COLLECTION_NAME,
        THESIS_COLLECTION_NAME,
        DEFENSE_COLLECTION_NAME,
    ] {
        if store.read(name).is_none() {
            store.save(name, &Vec::<serde_json::Value>::new())?;
        }
    }

    sync_id_counters(store)
}

/// Adopting a pre-existing data directory must not re-issue ids already in
/// use; raise each counter to the largest suffix found.
pub fn sync_id_counters<S: RecordStore>(store: &S) -> io::Result<()> {
    let requests: Vec<Request> = store.load(REQUEST_COLLECTION_NAME);
    store.sync_counter(
        REQUEST_ID_PREFIX,
        max_id_suffix(requests.iter().map(|r| r.id()), REQUEST_ID_PREFIX),
    )?;

    let theses: Vec<Thesis> = store.load(THESIS_COLLECTION_NAME);
    store.sync_counter(
        THESIS_ID_PREFIX,
        max_id_suffix(theses.iter().map(|t| t.id()), THESIS_ID_PREFIX),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemStore;

    #[test]
    fn seeds_missing_collections_only() {
        let store = MemStore::new();
        store.write(USER_COLLECTION_NAME, "[]").unwrap();

        initialize_defaults(&store, &[1u8; 16]).unwrap();

        // Pre-existing users collection is left alone.
        let users: Vec<User> = store.load(USER_COLLECTION_NAME);
        assert!(users.is_empty());

        let courses: Vec<Course> = store.load(COURSE_COLLECTION_NAME);
        assert_eq!(courses.len(), 2);
        assert_eq!(courses[0].course_id, "TH1404-01");

        assert_eq!(store.read(REQUEST_COLLECTION_NAME).as_deref(), Some("[]"));
        assert_eq!(store.read(DEFENSE_COLLECTION_NAME).as_deref(), Some("[]"));
    }

    #[test]
    fn counters_pick_up_existing_ids() {
        let store = MemStore::new();
        let requests = vec![
            Request::new("R4", "S1001", "TH1404-01", ""),
            Request::new("R2", "S1002", "TH1404-01", ""),
        ];
        store.save(REQUEST_COLLECTION_NAME, &requests).unwrap();

        initialize_defaults(&store, &[1u8; 16]).unwrap();

        assert_eq!(store.next_id(REQUEST_ID_PREFIX).unwrap(), "R5");
        assert_eq!(store.next_id(THESIS_ID_PREFIX).unwrap(), "T1");
    }
}

use crate::data::user::{Credential, PasswordHash, User, USER_COLLECTION_NAME};
use crate::security::Salt;
use crate::store::RecordStore;

/// Check a user's credentials, returning the user on success.
///
/// Seed records may still hold a plaintext password; the first successful
/// login replaces it with its hash and rewrites the collection.
pub fn authenticate<S: RecordStore>(
    store: &S,
    salt: &Salt,
    user_id: &str,
    password: &str,
) -> Option<User> {
    let mut users: Vec<User> = store.load(USER_COLLECTION_NAME);
    let idx = users.iter().position(|u| u.id == user_id)?;

    match &users[idx].credential {
        Credential::Hash(hash) => hash.verify(password, salt).then(|| users[idx].clone()),
        Credential::Plain(stored) => {
            if stored != password {
                return None;
            }

            tracing::info!("Migrating plaintext credential for user {}", user_id);
            users[idx].credential = Credential::Hash(PasswordHash::new(password, salt));
            if let Err(e) = store.save(USER_COLLECTION_NAME, &users) {
                tracing::warn!("Unable to persist migrated credential for {}: {}", user_id, e);
            }

            Some(users[idx].clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::Role;
    use crate::store::MemStore;

    fn salt() -> Salt {
        [3u8; 16]
    }

    fn store_with(users: Vec<User>) -> MemStore {
        let store = MemStore::new();
        store.save(USER_COLLECTION_NAME, &users).unwrap();
        store
    }

    #[test]
    fn hashed_credential_accepts_correct_password_only() {
        let store = store_with(vec![User::new(
            "S1001",
            "Ali Rezaei",
            Role::Student,
            "pass123",
            &salt(),
        )]);

        assert!(authenticate(&store, &salt(), "S1001", "pass123").is_some());
        assert!(authenticate(&store, &salt(), "S1001", "wrong").is_none());
        assert!(authenticate(&store, &salt(), "S9999", "pass123").is_none());
    }

    #[test]
    fn plaintext_credential_migrates_on_first_login() {
        let mut user = User::new("S1001", "Ali Rezaei", Role::Student, "ignored", &salt());
        user.credential = Credential::Plain("pass123".to_string());
        let store = store_with(vec![user]);

        assert!(authenticate(&store, &salt(), "S1001", "nope").is_none());
        let migrated = authenticate(&store, &salt(), "S1001", "pass123").unwrap();
        assert!(matches!(migrated.credential, Credential::Hash(_)));

        // Stored record was rewritten; the hashed form still authenticates.
        let users: Vec<User> = store.load(USER_COLLECTION_NAME);
        assert!(matches!(users[0].credential, Credential::Hash(_)));
        assert!(authenticate(&store, &salt(), "S1001", "pass123").is_some());
    }
}

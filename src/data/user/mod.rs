use base64::Engine;
use crypto::bcrypt::bcrypt;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::role::Role;
use crate::security::Salt;
use crate::store::Identified;
use crate::util;

pub static USER_COLLECTION_NAME: &str = "users.json";

const BCRYPT_COST: u32 = 10;

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct PasswordHash([u8; 24]);

impl PasswordHash {
    pub fn new(password: impl AsRef<str>, salt: &Salt) -> PasswordHash {
        let mut pw_hash: [u8; 24] = [0; 24];

        // bcrypt limits input to 72 bytes; pre-digesting removes the limit.
        let mut sha = Sha256::new();
        sha2::Digest::update(&mut sha, password.as_ref().as_bytes());

        bcrypt(BCRYPT_COST, salt, sha.finalize().as_slice(), &mut pw_hash);

        PasswordHash(pw_hash)
    }

    pub fn verify(&self, password: impl AsRef<str>, salt: &Salt) -> bool {
        *self == PasswordHash::new(password, salt)
    }
}

impl Serialize for PasswordHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&util::base64_engine().encode(self.0))
    }
}

impl<'de> Deserialize<'de> for PasswordHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        let bytes = util::base64_engine()
            .decode(text)
            .map_err(D::Error::custom)?;
        let array: [u8; 24] = bytes
            .try_into()
            .map_err(|_| D::Error::custom("password hash must be 24 bytes"))?;
        Ok(PasswordHash(array))
    }
}

/// Stored credential. Seed data may carry a plaintext password which is
/// replaced by its hash on the first successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Credential {
    #[serde(rename = "password")]
    Plain(String),
    #[serde(rename = "password_hash")]
    Hash(PasswordHash),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum UserKind {
    Student,
    Supervisor {
        supervise_count: u32,
        // Defined on the record but never incremented by any operation.
        review_count: u32,
    },
    Reviewer {
        supervise_count: u32,
        review_count: u32,
    },
}

impl UserKind {
    pub fn role(&self) -> Role {
        match self {
            UserKind::Student => Role::Student,
            UserKind::Supervisor { .. } => Role::Supervisor,
            UserKind::Reviewer { .. } => Role::Reviewer,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub kind: UserKind,
    #[serde(flatten)]
    pub credential: Credential,
}

impl User {
    pub fn new(
        id: impl ToString,
        name: impl ToString,
        role: Role,
        password: impl AsRef<str>,
        salt: &Salt,
    ) -> User {
        let kind = match role {
            Role::Student => UserKind::Student,
            Role::Supervisor => UserKind::Supervisor {
                supervise_count: 0,
                review_count: 0,
            },
            Role::Reviewer => UserKind::Reviewer {
                supervise_count: 0,
                review_count: 0,
            },
        };

        User {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            credential: Credential::Hash(PasswordHash::new(password, salt)),
        }
    }

    pub fn role(&self) -> Role {
        self.kind.role()
    }

    /// Advisory counter on supervisor/reviewer records; a no-op for students.
    pub fn bump_supervise_count(&mut self) {
        match &mut self.kind {
            UserKind::Supervisor {
                supervise_count, ..
            }
            | UserKind::Reviewer {
                supervise_count, ..
            } => *supervise_count += 1,
            UserKind::Student => {}
        }
    }

    pub fn response_json(&self) -> String {
        json!({
            "id": self.id.clone(),
            "name": self.name.clone(),
            "role": self.role(),
        })
        .to_string()
    }
}

impl Identified for User {
    fn id(&self) -> &str {
        &self.id
    }
}

impl<'r> rocket::response::Responder<'r, 'static> for User {
    fn respond_to(self, _: &'r rocket::Request<'_>) -> rocket::response::Result<'static> {
        let body: String = self.response_json();

        rocket::Response::build()
            .header(rocket::http::ContentType::JSON)
            .sized_body(body.len(), std::io::Cursor::new(body))
            .ok()
    }
}

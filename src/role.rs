use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Supervisor,
    Reviewer,
}

impl Role {
    /// Indicates whether a user with this role may be assigned as a defense
    /// reviewer (internal or external).
    pub fn can_review(self) -> bool {
        matches!(self, Role::Reviewer | Role::Supervisor)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Student => write!(f, "student"),
            Role::Supervisor => write!(f, "supervisor"),
            Role::Reviewer => write!(f, "reviewer"),
        }
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.to_string()
    }
}

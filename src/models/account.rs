use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Role string granted to every account on creation.
pub const ROLE_USER: &str = "ROLE_USER";
/// Role string for administrative accounts.
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";

/// A local account. The `id` is assigned once and never changes; `email` and
/// `username` are unique across all tenants.
///
/// `password_hash` is `None` only for accounts that have never had a direct
/// credential; federated sign-ups store a random placeholder hash so the
/// column stays populated, but login treats a missing hash the same as a
/// mismatch.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Creates a fresh account with a new id and the default `ROLE_USER` role.
    pub fn new(username: String, email: String, password_hash: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            roles: vec![ROLE_USER.to_string()],
            created_at: now,
            updated_at: now,
        }
    }

    /// The role embedded in session tokens. Accounts always have at least one
    /// role; an empty set falls back to `ROLE_USER`.
    pub fn primary_role(&self) -> &str {
        self.roles.first().map(String::as_str).unwrap_or(ROLE_USER)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn add_role(&mut self, role: &str) {
        if !self.has_role(role) {
            self.roles.push(role.to_string());
        }
    }

    pub fn remove_role(&mut self, role: &str) {
        self.roles.retain(|r| r != role);
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Public view of an account; never exposes the credential hash.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Account> for UserResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            email: account.email.clone(),
            roles: account.roles.clone(),
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

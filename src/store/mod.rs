//!
//! # Persistence Layer
//!
//! The auth core and the todo handlers talk to storage through the
//! `AccountStore` and `TodoStore` traits. Uniqueness violations must surface
//! as `StoreError::Conflict` with the violated field, never as a generic
//! backend failure: the identity reconciler relies on that distinction to
//! retry its lookup path after losing a first-login race.
//!
//! Two implementations ship with the crate: `postgres::PgStore` backed by
//! sqlx, and `memory::MemoryStore`, a mutex-guarded map used by the test
//! suites (and handy for local experiments without a database).

pub mod memory;
pub mod postgres;

use crate::models::{Account, ExternalIdentity, Provider, Todo};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Which uniqueness constraint a write ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    Username,
    Email,
    ProviderSubject,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConflictKind::Username => f.write_str("username"),
            ConflictKind::Email => f.write_str("email"),
            ConflictKind::ProviderSubject => f.write_str("provider/subject"),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write. Callers on the federated
    /// first-login path treat this as a retry signal, not a failure.
    #[error("unique constraint violated: {0}")]
    Conflict(ConflictKind),
    /// Anything else the backend reported.
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }
}

/// Account and external-identity persistence.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;
    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError>;
    async fn exists_by_username(&self, username: &str) -> Result<bool, StoreError>;
    async fn insert(&self, account: &Account) -> Result<(), StoreError>;
    async fn update(&self, account: &Account) -> Result<(), StoreError>;
    /// Deletes the account; owned external identities and todos go with it.
    /// Returns `false` when no row matched.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn find_identity(
        &self,
        provider: Provider,
        subject_id: &str,
    ) -> Result<Option<ExternalIdentity>, StoreError>;
    /// Attaches an identity to an existing account.
    async fn link_identity(&self, identity: &ExternalIdentity) -> Result<(), StoreError>;
    /// Creates the account and its first identity as a single unit: either
    /// both rows exist afterwards or neither does.
    async fn create_with_identity(
        &self,
        account: &Account,
        identity: &ExternalIdentity,
    ) -> Result<(), StoreError>;
}

/// Todo persistence, scoped per owning account.
#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn insert(&self, todo: &Todo) -> Result<(), StoreError>;
    /// All items for one account, newest first.
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Todo>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Todo>, StoreError>;
    async fn update(&self, todo: &Todo) -> Result<(), StoreError>;
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
    /// Case-insensitive title substring search within one account.
    async fn search_by_title(&self, user_id: Uuid, keyword: &str)
        -> Result<Vec<Todo>, StoreError>;
}

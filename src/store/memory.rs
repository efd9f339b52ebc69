//! In-memory store used by the test suites. A single mutex guards all
//! tables, so multi-row writes are atomic exactly like the transactional
//! Postgres paths, and the same uniqueness constraints are enforced.

use crate::models::{Account, ExternalIdentity, Provider, Todo};
use crate::store::{AccountStore, ConflictKind, StoreError, TodoStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct State {
    accounts: HashMap<Uuid, Account>,
    identities: HashMap<Uuid, ExternalIdentity>,
    todos: HashMap<Uuid, Todo>,
}

impl State {
    fn check_account_unique(&self, account: &Account) -> Result<(), StoreError> {
        for other in self.accounts.values() {
            if other.id == account.id {
                continue;
            }
            if other.username == account.username {
                return Err(StoreError::Conflict(ConflictKind::Username));
            }
            if other.email == account.email {
                return Err(StoreError::Conflict(ConflictKind::Email));
            }
        }
        Ok(())
    }

    fn check_identity_unique(&self, identity: &ExternalIdentity) -> Result<(), StoreError> {
        let taken = self.identities.values().any(|other| {
            other.provider == identity.provider
                && other.provider_subject_id == identity.provider_subject_id
        });
        if taken {
            return Err(StoreError::Conflict(ConflictKind::ProviderSubject));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts; test helper.
    pub fn account_count(&self) -> usize {
        self.state.lock().unwrap().accounts.len()
    }

    /// Number of stored external identities; test helper.
    pub fn identity_count(&self) -> usize {
        self.state.lock().unwrap().identities.len()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        Ok(self.state.lock().unwrap().accounts.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.accounts.values().find(|a| a.email == email).cloned())
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.accounts.values().any(|a| a.email == email))
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.accounts.values().any(|a| a.username == username))
    }

    async fn insert(&self, account: &Account) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state.check_account_unique(account)?;
        state.accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn update(&self, account: &Account) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state.check_account_unique(account)?;
        state.accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut state = self.state.lock().unwrap();
        let removed = state.accounts.remove(&id).is_some();
        if removed {
            // Cascade, mirroring the foreign keys.
            state.identities.retain(|_, i| i.account_id != id);
            state.todos.retain(|_, t| t.user_id != id);
        }
        Ok(removed)
    }

    async fn find_identity(
        &self,
        provider: Provider,
        subject_id: &str,
    ) -> Result<Option<ExternalIdentity>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .identities
            .values()
            .find(|i| i.provider == provider && i.provider_subject_id == subject_id)
            .cloned())
    }

    async fn link_identity(&self, identity: &ExternalIdentity) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state.check_identity_unique(identity)?;
        state.identities.insert(identity.id, identity.clone());
        Ok(())
    }

    async fn create_with_identity(
        &self,
        account: &Account,
        identity: &ExternalIdentity,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state.check_account_unique(account)?;
        state.check_identity_unique(identity)?;
        state.accounts.insert(account.id, account.clone());
        state.identities.insert(identity.id, identity.clone());
        Ok(())
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn insert(&self, todo: &Todo) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state.todos.insert(todo.id, todo.clone());
        Ok(())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Todo>, StoreError> {
        let state = self.state.lock().unwrap();
        let mut todos: Vec<Todo> = state
            .todos
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        todos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(todos)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Todo>, StoreError> {
        Ok(self.state.lock().unwrap().todos.get(&id).cloned())
    }

    async fn update(&self, todo: &Todo) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state.todos.insert(todo.id, todo.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.state.lock().unwrap().todos.remove(&id).is_some())
    }

    async fn search_by_title(
        &self,
        user_id: Uuid,
        keyword: &str,
    ) -> Result<Vec<Todo>, StoreError> {
        let needle = keyword.to_lowercase();
        let state = self.state.lock().unwrap();
        let mut todos: Vec<Todo> = state
            .todos
            .values()
            .filter(|t| t.user_id == user_id && t.title.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        todos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(todos)
    }
}

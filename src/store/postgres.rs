//! PostgreSQL-backed store. Uniqueness is enforced by the database
//! constraints created in `migrations/`; violation reports are translated
//! into `StoreError::Conflict` by constraint name.

use crate::models::{Account, ExternalIdentity, Provider, Todo};
use crate::store::{AccountStore, ConflictKind, StoreError, TodoStore};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

const ACCOUNT_COLUMNS: &str =
    "id, username, email, password_hash, roles, created_at, updated_at";
const TODO_COLUMNS: &str = "id, title, description, completed, created_at, updated_at, user_id";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_db_err(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            let kind = match db.constraint() {
                Some("accounts_username_key") => ConflictKind::Username,
                Some("external_identities_provider_subject_key") => ConflictKind::ProviderSubject,
                _ => ConflictKind::Email,
            };
            return StoreError::Conflict(kind);
        }
    }
    StoreError::Backend(err.to_string())
}

#[async_trait]
impl AccountStore for PgStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        sqlx::query_as::<_, Account>(&format!(
            "SELECT {} FROM accounts WHERE id = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        sqlx::query_as::<_, Account>(&format!(
            "SELECT {} FROM accounts WHERE email = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM accounts WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_err)
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM accounts WHERE username = $1)")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_err)
    }

    async fn insert(&self, account: &Account) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO accounts (id, username, email, password_hash, roles, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(account.id)
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.roles)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(())
    }

    async fn update(&self, account: &Account) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE accounts
             SET username = $1, email = $2, password_hash = $3, roles = $4, updated_at = $5
             WHERE id = $6",
        )
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.roles)
        .bind(account.updated_at)
        .bind(account.id)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_identity(
        &self,
        provider: Provider,
        subject_id: &str,
    ) -> Result<Option<ExternalIdentity>, StoreError> {
        sqlx::query_as::<_, ExternalIdentity>(
            "SELECT id, provider, provider_subject_id, account_id
             FROM external_identities
             WHERE provider = $1 AND provider_subject_id = $2",
        )
        .bind(provider)
        .bind(subject_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)
    }

    async fn link_identity(&self, identity: &ExternalIdentity) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO external_identities (id, provider, provider_subject_id, account_id)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(identity.id)
        .bind(identity.provider)
        .bind(&identity.provider_subject_id)
        .bind(identity.account_id)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(())
    }

    async fn create_with_identity(
        &self,
        account: &Account,
        identity: &ExternalIdentity,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;

        sqlx::query(
            "INSERT INTO accounts (id, username, email, password_hash, roles, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(account.id)
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.roles)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_err)?;

        sqlx::query(
            "INSERT INTO external_identities (id, provider, provider_subject_id, account_id)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(identity.id)
        .bind(identity.provider)
        .bind(&identity.provider_subject_id)
        .bind(identity.account_id)
        .execute(&mut *tx)
        .await
        .map_err(map_db_err)?;

        tx.commit().await.map_err(map_db_err)
    }
}

#[async_trait]
impl TodoStore for PgStore {
    async fn insert(&self, todo: &Todo) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO todos (id, title, description, completed, created_at, updated_at, user_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(todo.id)
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(todo.completed)
        .bind(todo.created_at)
        .bind(todo.updated_at)
        .bind(todo.user_id)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Todo>, StoreError> {
        sqlx::query_as::<_, Todo>(&format!(
            "SELECT {} FROM todos WHERE user_id = $1 ORDER BY created_at DESC",
            TODO_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Todo>, StoreError> {
        sqlx::query_as::<_, Todo>(&format!(
            "SELECT {} FROM todos WHERE id = $1",
            TODO_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)
    }

    async fn update(&self, todo: &Todo) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE todos
             SET title = $1, description = $2, completed = $3, updated_at = $4
             WHERE id = $5",
        )
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(todo.completed)
        .bind(todo.updated_at)
        .bind(todo.id)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn search_by_title(
        &self,
        user_id: Uuid,
        keyword: &str,
    ) -> Result<Vec<Todo>, StoreError> {
        sqlx::query_as::<_, Todo>(&format!(
            "SELECT {} FROM todos WHERE user_id = $1 AND title ILIKE $2 ORDER BY created_at DESC",
            TODO_COLUMNS
        ))
        .bind(user_id)
        .bind(format!("%{}%", keyword))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)
    }
}

//! Maps external-provider identities onto local accounts.
//!
//! The resolution order matters: the `(provider, subject)` lookup must win
//! over the email lookup so a returning federated user never gains a second
//! identity row, and both lookups must come before any write so the
//! steady-state path stays read-only.
//!
//! Steps 2 and 3 are a check-then-act sequence, so two concurrent first-time
//! logins for the same identity can both reach the write. The store's
//! uniqueness constraints arbitrate: the loser observes a conflict and
//! re-runs the lookup path, converging on the winner's rows. The reconciler
//! itself holds no locks.

use crate::auth::password::generate_placeholder_hash;
use crate::auth::provider::{generate_username_seed, ProviderClaims};
use crate::error::AppError;
use crate::models::{Account, ExternalIdentity};
use crate::store::{AccountStore, StoreError};
use std::sync::Arc;

pub struct IdentityReconciler {
    store: Arc<dyn AccountStore>,
}

impl IdentityReconciler {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    /// Resolves provider claims to exactly one local account, creating an
    /// account and/or identity link only when no match exists.
    pub async fn resolve(&self, claims: &ProviderClaims) -> Result<Account, AppError> {
        match self.try_resolve(claims, &claims.username_seed).await {
            Err(err) if err.is_conflict() => {
                log::debug!(
                    "lost first-login race for {}:{}, retrying lookup",
                    claims.provider,
                    claims.subject_id
                );
                // A fresh username seed also covers the rare seed collision
                // with an unrelated account.
                let reseeded = generate_username_seed(claims.provider);
                self.try_resolve(claims, &reseeded)
                    .await
                    .map_err(AppError::from)
            }
            other => other.map_err(AppError::from),
        }
    }

    async fn try_resolve(
        &self,
        claims: &ProviderClaims,
        username: &str,
    ) -> Result<Account, StoreError> {
        // 1. Known identity: the steady-state path, no writes.
        if let Some(identity) = self
            .store
            .find_identity(claims.provider, &claims.subject_id)
            .await?
        {
            return self
                .store
                .find_by_id(identity.account_id)
                .await?
                .ok_or_else(|| {
                    StoreError::Backend(format!(
                        "external identity {} has no owning account",
                        identity.id
                    ))
                });
        }

        // 2. Known email: a returning user on a new provider. Attach, don't
        //    create.
        if let Some(account) = self.store.find_by_email(&claims.email).await? {
            let identity =
                ExternalIdentity::new(claims.provider, claims.subject_id.clone(), account.id);
            self.store.link_identity(&identity).await?;
            return Ok(account);
        }

        // 3. First contact: new account plus identity, committed as one unit.
        //    Federated accounts get a placeholder credential; there is no
        //    caller-chosen secret on this path.
        let placeholder = generate_placeholder_hash()
            .map_err(|e| StoreError::Backend(format!("placeholder credential: {}", e)))?;
        let account = Account::new(username.to_string(), claims.email.clone(), Some(placeholder));
        let identity =
            ExternalIdentity::new(claims.provider, claims.subject_id.clone(), account.id);
        self.store.create_with_identity(&account, &identity).await?;
        Ok(account)
    }
}

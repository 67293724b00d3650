//! Session context: current principal, active record, and the viewing target.
//!
//! All ambient "who is editing what" state lives in this explicit context
//! object and is threaded through the operations, instead of implicit shared
//! mutable state. Every local mutation routes through [`Session::edit_day`],
//! which persists afterward; while a supervisor is viewing another principal
//! the surface is read-only and nothing is written for that record.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::category_tree::{combined_forest, CategoryNode};
use crate::directory::{load_seed, DirectorySeed, DirectorySource};
use crate::error::PlannerError;
use crate::persistence::{load_user, save_user, DocumentStore};
use crate::timebox::materialize_day;
use crate::types::{DayRecord, Role, UserRecord};

/// Everything the caller knows about the principal before the directory and
/// document store are consulted.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub display_name: String,
    /// Secret presented at sign-in, checked against the directory seed.
    pub provided_secret: String,
    pub role: Role,
    pub scope_id: String,
    /// Scopes a supervisor may browse. Ignored for owners.
    pub allowed_scopes: Vec<String>,
}

pub struct Session<S: DocumentStore> {
    store: Arc<S>,
    seed: DirectorySeed,
    forest: Vec<CategoryNode>,
    user: UserRecord,
    /// Another principal's record, loaded read-only by a supervisor.
    viewing: Option<UserRecord>,
    degraded: bool,
}

impl<S: DocumentStore> Session<S> {
    /// Open a session: fetch the directory seed once, verify the credential,
    /// and load the principal's document with the merge-safe overlay.
    ///
    /// A credential mismatch (or a missing identity row) degrades the session
    /// with a warning rather than rejecting it; this is not a security
    /// boundary.
    pub async fn open<D: DirectorySource>(
        store: Arc<S>,
        directory: &D,
        config: SessionConfig,
    ) -> Self {
        let scopes: Vec<String> = match config.role {
            Role::Owner => vec![config.scope_id.clone()],
            Role::Supervisor if !config.allowed_scopes.is_empty() => {
                config.allowed_scopes.clone()
            }
            Role::Supervisor => vec![config.scope_id.clone()],
        };
        let seed = load_seed(directory, &scopes).await;

        let mut degraded = false;
        let mut defaults = UserRecord::with_defaults(&config.display_name);
        defaults.role = config.role;
        defaults.scope_id = config.scope_id.clone();
        if config.role == Role::Supervisor {
            defaults.allowed_scopes = Some(scopes.clone());
        }
        match seed.find_identity(&config.display_name) {
            Some((_, row)) => {
                defaults.credential_secret = row.credential_secret.clone();
                if row.credential_secret != config.provided_secret {
                    log::warn!(
                        "credential mismatch for {:?}; continuing degraded",
                        config.display_name
                    );
                    degraded = true;
                }
            }
            None => {
                log::warn!(
                    "no identity row for {:?}; continuing degraded",
                    config.display_name
                );
                degraded = true;
            }
        }

        let user = load_user(store.as_ref(), defaults).await;
        let forest = combined_forest(&scopes, &seed.categories_by_scope);

        Self {
            store,
            seed,
            forest,
            user,
            viewing: None,
            degraded,
        }
    }

    /// Effective category forest for this session: the owner's scope, or the
    /// concatenation across a supervisor's permitted scopes.
    pub fn category_forest(&self) -> &[CategoryNode] {
        &self.forest
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn is_viewing(&self) -> bool {
        self.viewing.is_some()
    }

    /// The record operations currently read: the viewing target while one is
    /// open, the session's own record otherwise.
    pub fn record(&self) -> &UserRecord {
        self.viewing.as_ref().unwrap_or(&self.user)
    }

    /// Mutate one day of the session's own record and persist the result.
    ///
    /// The date is materialized first (creating it and propagating repeating
    /// slots on first access), then `edit` runs, then the merge-write saves.
    /// Fails with [`PlannerError::ReadOnlyView`] while a viewing target is
    /// open; a failed save leaves the local mutation in place and surfaces
    /// the error.
    pub async fn edit_day<F>(&mut self, date: NaiveDate, edit: F) -> Result<(), PlannerError>
    where
        F: FnOnce(&mut DayRecord),
    {
        if self.viewing.is_some() {
            return Err(PlannerError::ReadOnlyView);
        }
        edit(materialize_day(&mut self.user, date));
        save_user(self.store.as_ref(), &self.user).await
    }

    /// Materialize and read a day without editing it. On the session's own
    /// record this persists the materialization; on a viewing target the
    /// materialization stays local and nothing is written.
    pub async fn open_day(&mut self, date: NaiveDate) -> Result<DayRecord, PlannerError> {
        if let Some(target) = self.viewing.as_mut() {
            return Ok(materialize_day(target, date).clone());
        }
        let day = materialize_day(&mut self.user, date).clone();
        save_user(self.store.as_ref(), &self.user).await?;
        Ok(day)
    }

    /// Supervisor employee switch: load `display_name`'s document read-only.
    /// The target must exist in the seeded identity tables and belong to a
    /// permitted scope. The supervisor's own record is untouched.
    pub async fn open_view(&mut self, display_name: &str) -> Result<(), PlannerError> {
        if self.user.role != Role::Supervisor {
            return Err(PlannerError::ScopeNotPermitted(
                "only supervisors may view other principals".into(),
            ));
        }
        let (scope, _row) = self
            .seed
            .find_identity(display_name)
            .ok_or_else(|| PlannerError::UnknownPrincipal(display_name.to_string()))?;

        let mut defaults = UserRecord::with_defaults(display_name);
        defaults.scope_id = scope.to_string();
        let target = load_user(self.store.as_ref(), defaults).await;
        self.viewing = Some(target);
        Ok(())
    }

    /// Return to the session's own record.
    pub fn close_view(&mut self) {
        self.viewing = None;
    }
}

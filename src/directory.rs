//! Identity/category directory source.
//!
//! The directory is a pull-only tabular source with one partition per scope:
//! an identity table (`credentialSecret`, `displayName`) and a category table
//! (`id`, `name`, `parentId`). It is fetched once at session start as a
//! read-only seed. Any fetch failure degrades that scope to empty structures
//! with a warning; the session itself never fails on directory errors.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::category_tree::CategoryRow;
use crate::error::PlannerError;

/// One identity row as delivered by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRow {
    pub display_name: String,
    pub credential_secret: String,
}

impl IdentityRow {
    pub fn new(display_name: impl Into<String>, credential_secret: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            credential_secret: credential_secret.into(),
        }
    }
}

/// Pull-only directory interface, one partition per named scope.
#[async_trait]
pub trait DirectorySource: Send + Sync {
    async fn identities(&self, scope: &str) -> Result<Vec<IdentityRow>, PlannerError>;
    async fn categories(&self, scope: &str) -> Result<Vec<CategoryRow>, PlannerError>;
}

/// The once-per-session snapshot of everything the directory provides for the
/// scopes a session cares about.
#[derive(Debug, Clone, Default)]
pub struct DirectorySeed {
    pub identities_by_scope: HashMap<String, Vec<IdentityRow>>,
    pub categories_by_scope: HashMap<String, Vec<CategoryRow>>,
}

impl DirectorySeed {
    /// Find an identity by display name across all seeded scopes, returning
    /// the row and the scope it belongs to.
    pub fn find_identity(&self, display_name: &str) -> Option<(&str, &IdentityRow)> {
        for (scope, rows) in &self.identities_by_scope {
            if let Some(row) = rows.iter().find(|r| r.display_name == display_name) {
                return Some((scope.as_str(), row));
            }
        }
        None
    }
}

/// Fetch the directory tables for `scopes` once. A failing table degrades to
/// empty for that scope; no refresh is attempted afterward.
pub async fn load_seed<D: DirectorySource>(source: &D, scopes: &[String]) -> DirectorySeed {
    let mut seed = DirectorySeed::default();
    for scope in scopes {
        let identities = match source.identities(scope).await {
            Ok(rows) => rows,
            Err(err) => {
                log::warn!("identity table for scope {scope:?} unavailable: {err}");
                Vec::new()
            }
        };
        let categories = match source.categories(scope).await {
            Ok(rows) => rows,
            Err(err) => {
                log::warn!("category table for scope {scope:?} unavailable: {err}");
                Vec::new()
            }
        };
        seed.identities_by_scope.insert(scope.clone(), identities);
        seed.categories_by_scope.insert(scope.clone(), categories);
    }
    seed
}

/// Directory backed by in-memory tables. Used in tests and small deployments.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    pub identities: HashMap<String, Vec<IdentityRow>>,
    pub categories: HashMap<String, Vec<CategoryRow>>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scope(
        mut self,
        scope: impl Into<String>,
        identities: Vec<IdentityRow>,
        categories: Vec<CategoryRow>,
    ) -> Self {
        let scope = scope.into();
        self.identities.insert(scope.clone(), identities);
        self.categories.insert(scope, categories);
        self
    }
}

#[async_trait]
impl DirectorySource for StaticDirectory {
    async fn identities(&self, scope: &str) -> Result<Vec<IdentityRow>, PlannerError> {
        self.identities
            .get(scope)
            .cloned()
            .ok_or_else(|| PlannerError::SourceFetch(format!("no identity table for {scope:?}")))
    }

    async fn categories(&self, scope: &str) -> Result<Vec<CategoryRow>, PlannerError> {
        self.categories
            .get(scope)
            .cloned()
            .ok_or_else(|| PlannerError::SourceFetch(format!("no category table for {scope:?}")))
    }
}

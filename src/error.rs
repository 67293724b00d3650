//! Error types for planner operations
//!
//! Errors are classified by how the session reacts to them:
//! - Degradable: source/persistence reads fall back to defaults, session continues
//! - Per-operation: the failing call is reported, local state stays
//!   authoritative until the next successful round-trip

use thiserror::Error;

/// Error types for planner operations
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("Directory source fetch failed: {0}")]
    SourceFetch(String),

    #[error("Document read failed: {0}")]
    PersistenceRead(String),

    #[error("Document write failed: {0}")]
    PersistenceWrite(String),

    #[error("Malformed date key: {0}")]
    MalformedDate(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Cannot mutate a record opened in read-only view")]
    ReadOnlyView,

    #[error("Unknown principal: {0}")]
    UnknownPrincipal(String),

    #[error("Scope not permitted: {0}")]
    ScopeNotPermitted(String),
}

impl PlannerError {
    /// Returns true if the session degrades to defaults instead of failing.
    ///
    /// Read-side failures (directory fetch, document load) never terminate a
    /// session; the caller substitutes empty structures or a default record.
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            PlannerError::SourceFetch(_) | PlannerError::PersistenceRead(_)
        )
    }
}

impl From<serde_json::Error> for PlannerError {
    fn from(err: serde_json::Error) -> Self {
        PlannerError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_side_errors_are_degradable() {
        assert!(PlannerError::SourceFetch("timeout".into()).is_degradable());
        assert!(PlannerError::PersistenceRead("offline".into()).is_degradable());
        assert!(!PlannerError::PersistenceWrite("offline".into()).is_degradable());
        assert!(!PlannerError::ReadOnlyView.is_degradable());
    }
}

//! Time-box planner core.
//!
//! Per-principal day planner state stored in a shared remote document store:
//! daily schedules on quarter-hour slots, hierarchical task categories,
//! priority lists, and free-form notes. Owners edit their own days;
//! supervisors browse others read-only within permitted scopes.
//!
//! The interesting machinery is state reconciliation:
//! - [`category_tree`] builds forests from flat parent-pointer rows,
//! - [`recurrence`] copies repeating slots forward on first access to a date,
//! - [`persistence`] merges the local working copy against the remote
//!   document on every save without dropping remotely stored history.
//!
//! Rendering, report ingestion, and access gating are external collaborators;
//! this crate is the state model they drive.

pub mod category_tree;
pub mod directory;
pub mod error;
pub mod path_selector;
pub mod persistence;
pub mod recurrence;
pub mod reporting;
pub mod session;
pub mod timebox;
pub mod types;

pub use category_tree::{build_forest, combined_forest, CategoryNode, CategoryRow};
pub use directory::{DirectorySeed, DirectorySource, IdentityRow, StaticDirectory};
pub use error::PlannerError;
pub use path_selector::{PathSelector, PATH_SEPARATOR};
pub use persistence::{DocumentStore, MemoryStore};
pub use reporting::{ReportRange, TrailingUnit, UsageReport};
pub use session::{Session, SessionConfig};
pub use types::{ChecklistItem, DayRecord, Repeat, Role, ScheduleSlot, UserRecord};

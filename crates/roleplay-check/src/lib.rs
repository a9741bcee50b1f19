//! Validation for role-play story projects.
//!
//! [`validate`] checks a [`Project`](roleplay_core::model::Project) against
//! the structural rules a story must satisfy before it can be played, then
//! sweeps the story graph for scenes the player can never reach. Results
//! are collected into a [`Report`] of [`Diagnostic`]s rather than returned
//! as errors: an invalid project is still a project the author is editing.
//!
//! # Example
//!
//! ```
//! use roleplay_check::validate;
//! use roleplay_core::model::Project;
//!
//! // The default project has a start scene but no ending.
//! let report = validate(&Project::default());
//! assert!(!report.is_playable());
//! assert_eq!(
//!     report.error_messages(),
//!     ["Project must have at least 1 end scene."]
//! );
//! ```

pub mod error;
mod validate;

pub use error::{Diagnostic, ErrorCode, Report, Severity};
pub use validate::{validate, validate_snapshot};

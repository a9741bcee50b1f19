//! Diagnostics produced by the validator.
//!
//! A [`Diagnostic`] is a single error or warning with a code, a message,
//! the scene it concerns and optional help text. A validation pass yields a
//! [`Report`] holding every diagnostic in the order it was found.
//!
//! # Example
//!
//! ```
//! # use roleplay_check::error::{Diagnostic, ErrorCode};
//! # use roleplay_core::identifier::Id;
//!
//! let diag = Diagnostic::error("Scene \"cave\" auto-advances to missing scene \"lake\".")
//!     .with_code(ErrorCode::V205)
//!     .with_scene(Id::new("cave"))
//!     .with_target(Id::new("lake"))
//!     .with_help("pick an existing scene or clear the auto-advance link");
//! assert_eq!(diag.code(), Some(ErrorCode::V205));
//! ```

mod diagnostic;
mod error_code;
mod report;
mod severity;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use report::Report;
pub use severity::Severity;

//! Diagnostic codes for the validator.
//!
//! Codes are organized by the check that emits them:
//! - `V0xx` - Input errors
//! - `V1xx` - Project-wide structure
//! - `V2xx` - Per-scene structure
//! - `V3xx` - Reachability

use std::fmt;

/// Codes for categorizing validation diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Input Errors (V0xx)
    // =========================================================================
    /// Missing project.
    ///
    /// There is no project snapshot to validate.
    V000,

    // =========================================================================
    // Project Structure (V1xx)
    // =========================================================================
    /// Wrong number of start scenes.
    ///
    /// A project needs exactly one start scene.
    V100,

    /// No end scene.
    V101,

    /// Too many end scenes.
    ///
    /// A project can have at most three end scenes.
    V102,

    /// Scene count out of range.
    ///
    /// A project has between 1 and 20 scenes.
    V103,

    // =========================================================================
    // Scene Structure (V2xx)
    // =========================================================================
    /// Too many choices.
    V200,

    /// Choice without a destination.
    V201,

    /// Choice pointing at an unknown scene.
    V202,

    /// End scene with an auto-advance link.
    V203,

    /// Scene with both choices and an auto-advance link.
    V204,

    /// Auto-advance link pointing at an unknown scene.
    V205,

    /// End scene with choices.
    ///
    /// Players never see choices on an end scene. This is a warning.
    V206,

    // =========================================================================
    // Reachability (V3xx)
    // =========================================================================
    /// Scene unreachable from the start scene.
    V300,
}

impl ErrorCode {
    /// Returns the code as a string (e.g., "V100").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::V000 => "V000",
            ErrorCode::V100 => "V100",
            ErrorCode::V101 => "V101",
            ErrorCode::V102 => "V102",
            ErrorCode::V103 => "V103",
            ErrorCode::V200 => "V200",
            ErrorCode::V201 => "V201",
            ErrorCode::V202 => "V202",
            ErrorCode::V203 => "V203",
            ErrorCode::V204 => "V204",
            ErrorCode::V205 => "V205",
            ErrorCode::V206 => "V206",
            ErrorCode::V300 => "V300",
        }
    }

    /// Returns a short description of what this code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::V000 => "missing project",
            ErrorCode::V100 => "wrong number of start scenes",
            ErrorCode::V101 => "no end scene",
            ErrorCode::V102 => "too many end scenes",
            ErrorCode::V103 => "scene count out of range",
            ErrorCode::V200 => "too many choices",
            ErrorCode::V201 => "choice without destination",
            ErrorCode::V202 => "choice points to missing scene",
            ErrorCode::V203 => "end scene auto-advances",
            ErrorCode::V204 => "choices mixed with auto-advance",
            ErrorCode::V205 => "auto-advance to missing scene",
            ErrorCode::V206 => "end scene has choices",
            ErrorCode::V300 => "unreachable scene",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

//! Error types for role-play operations.
//!
//! [`RoleplayError`] wraps every failure the library reports: I/O, JSON,
//! manifest versions, rejected edits, blocked or invalid playback, and
//! projects that fail validation.

use std::io;

use thiserror::Error;

use roleplay_check::Report;

use crate::{edit::EditError, player::PlayError};

/// The main error type for role-play operations.
///
/// # Diagnostic Variants
///
/// `Invalid` carries the full validation [`Report`], so callers can render
/// every diagnostic rather than just the first.
#[derive(Debug, Error)]
pub enum RoleplayError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported manifest version {0}")]
    Manifest(u32),

    #[error("Invalid media path `{0}`")]
    MediaPath(String),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Play(#[from] PlayError),

    #[error("{0}")]
    Invalid(Report),

    #[error("Configuration error: {0}")]
    Config(String),
}

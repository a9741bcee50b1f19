//! The core diagnostic type.

use std::fmt;

use roleplay_core::identifier::Id;

use crate::error::{ErrorCode, Severity};

/// A single validation finding.
///
/// Carries a severity, an optional code, the human-readable message, the
/// scene it concerns (if any), the scene a broken link was aimed at (if
/// any) and optional help text.
///
/// Displays as `error[V100]: message`, or `error: message` without a code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    scene: Option<Id>,
    target: Option<Id>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The scene the diagnostic is about.
    pub fn scene(&self) -> Option<Id> {
        self.scene
    }

    /// The destination of the link the diagnostic is about.
    pub fn target(&self) -> Option<Id> {
        self.target
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Set the code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Set the scene the diagnostic is about.
    pub fn with_scene(mut self, scene: Id) -> Self {
        self.scene = Some(scene);
        self
    }

    /// Set the link destination the diagnostic is about.
    pub fn with_target(mut self, target: Id) -> Self {
        self.target = Some(target);
        self
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            scene: None,
            target: None,
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}

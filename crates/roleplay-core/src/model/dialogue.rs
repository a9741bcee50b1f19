//! Dialogue lines.

use crate::media::MediaRef;

/// One line of dialogue with optional voice audio.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DialogueLine {
    pub text: String,
    pub audio: Option<MediaRef>,
}

impl DialogueLine {
    /// Creates a line without audio.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            audio: None,
        }
    }

    /// Attaches voice audio to the line.
    pub fn with_audio(mut self, audio: MediaRef) -> Self {
        self.audio = Some(audio);
        self
    }
}

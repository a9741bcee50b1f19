//! Choices: labeled links from one scene to another.

use crate::identifier::Id;

/// A labeled, player-selectable link to another scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    /// Unique choice identifier.
    pub id: Id,
    /// Text shown to the player.
    pub label: String,
    /// Destination scene. `None` while the author has not picked one yet.
    pub next: Option<Id>,
}

impl Choice {
    /// Builds a choice, generating an id when none is given.
    pub fn from_options(options: ChoiceOptions) -> Self {
        Self {
            id: options.id.unwrap_or_else(|| Id::fresh("choice")),
            label: options.label.unwrap_or_default(),
            next: options.next,
        }
    }
}

/// Optional inputs for [`Choice::from_options`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChoiceOptions {
    pub id: Option<Id>,
    pub label: Option<String>,
    pub next: Option<Id>,
}

impl ChoiceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: Id) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_next(mut self, next: Id) -> Self {
        self.next = Some(next);
        self
    }
}

impl From<Choice> for ChoiceOptions {
    fn from(choice: Choice) -> Self {
        Self {
            id: Some(choice.id),
            label: Some(choice.label),
            next: choice.next,
        }
    }
}

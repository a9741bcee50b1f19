//! Interactive traversal of a project.
//!
//! A [`Player`] walks the story graph one scene at a time, starting at the
//! Start scene. It keeps a [`history`](Player::history) of visited scenes
//! that can be stepped through with [`back`](Player::back),
//! [`forward`](Player::forward) and [`jump`](Player::jump). Choosing an exit
//! after stepping back replaces the forward entries.
//!
//! # Example
//!
//! ```
//! # use std::sync::Arc;
//! # use roleplay::{config::PlayerConfig, player::{Exits, Player}};
//! # use roleplay_core::{identifier::Id, model::*};
//! let project = Project::from_options(
//!     ProjectOptions::new()
//!         .with_scene(
//!             SceneOptions::new()
//!                 .with_id(Id::new("intro"))
//!                 .with_type(SceneType::Start)
//!                 .with_auto_next(Id::new("finale")),
//!         )
//!         .with_scene(
//!             SceneOptions::new()
//!                 .with_id(Id::new("finale"))
//!                 .with_type(SceneType::End),
//!         ),
//! );
//!
//! let mut player = Player::begin(Arc::new(project), &PlayerConfig::default()).unwrap();
//! player.advance().unwrap();
//! assert_eq!(player.current().id, "finale");
//! assert_eq!(player.exits(), Exits::Ending);
//! ```

mod history;

use std::sync::Arc;

use log::{debug, info};
use thiserror::Error;

use roleplay_check::{Report, validate};
use roleplay_core::{
    identifier::Id,
    model::{Project, Scene},
};

use crate::config::PlayerConfig;
use history::{History, truncate_label};

/// Reasons a play session cannot start or move.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlayError {
    #[error("Project cannot be played: {0}")]
    Blocked(Report),

    #[error("Scene \"{scene}\" has no choice {index}")]
    ChoiceNotFound { scene: Id, index: usize },

    #[error("Choice {index} of scene \"{scene}\" has no destination")]
    MissingDestination { scene: Id, index: usize },

    #[error("Scene \"{0}\" does not auto-advance")]
    NoAutoAdvance(Id),

    #[error("Scene \"{0}\" does not exist")]
    UnknownScene(Id),

    #[error("History has no entry {0}")]
    HistoryOutOfRange(usize),
}

/// A choice offered to the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceExit {
    pub index: usize,
    pub label: String,
    /// `None` when the destination is unset or no longer exists.
    pub target: Option<Id>,
}

impl ChoiceExit {
    pub fn is_enabled(&self) -> bool {
        self.target.is_some()
    }
}

/// The ways out of the current scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exits {
    /// One button per choice. Auto-advance is suppressed.
    Choices(Vec<ChoiceExit>),
    /// A single continue button. `target` is `None` when the destination
    /// is missing, which disables it.
    Continue { target: Option<Id> },
    /// The story is over.
    Ending,
    /// A dead end that is not an End scene.
    None,
}

/// A row of the history panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub scene_id: Id,
    /// Short label, truncated with `…`.
    pub label: String,
    /// Untruncated label.
    pub full_text: String,
    pub current: bool,
}

/// A play session over one project snapshot.
#[derive(Debug, Clone)]
pub struct Player {
    project: Arc<Project>,
    history: History,
    label_length: usize,
}

impl Player {
    /// Starts a session at the Start scene, or the first scene if there is
    /// no Start scene.
    ///
    /// # Errors
    ///
    /// Returns [`PlayError::Blocked`] with the full report if validation
    /// finds any error. Warnings do not block play.
    pub fn begin(project: Arc<Project>, config: &PlayerConfig) -> Result<Self, PlayError> {
        let report = validate(&project);
        if !report.is_playable() {
            info!(errors = report.errors().count(); "Play blocked by validation errors");
            return Err(PlayError::Blocked(report));
        }

        let Some(entry) = project.entry_scene().map(Arc::clone) else {
            return Err(PlayError::Blocked(report));
        };
        debug!(scene:% = entry.id; "Play session started");

        Ok(Self {
            history: History::new(entry),
            label_length: config.history_label_length(),
            project,
        })
    }

    /// Returns the project being played.
    pub fn project(&self) -> &Arc<Project> {
        &self.project
    }

    /// Returns the scene under the history cursor.
    pub fn current(&self) -> &Scene {
        self.history.current()
    }

    pub fn is_finished(&self) -> bool {
        self.current().is_end()
    }

    /// Lists the exits of the current scene.
    pub fn exits(&self) -> Exits {
        let scene = self.current();
        if scene.is_end() {
            return Exits::Ending;
        }
        if !scene.choices.is_empty() {
            let choices = scene
                .choices
                .iter()
                .enumerate()
                .map(|(index, choice)| ChoiceExit {
                    index,
                    label: choice.label.clone(),
                    target: choice.next.filter(|id| self.project.contains(*id)),
                })
                .collect();
            return Exits::Choices(choices);
        }
        match scene.auto_next {
            Some(target) => Exits::Continue {
                target: Some(target).filter(|id| self.project.contains(*id)),
            },
            None => Exits::None,
        }
    }

    /// Follows choice `index` of the current scene.
    pub fn choose(&mut self, index: usize) -> Result<&Scene, PlayError> {
        let scene = self.current();
        let scene_id = scene.id;
        let choice = scene
            .choices
            .get(index)
            .filter(|_| !scene.is_end())
            .ok_or(PlayError::ChoiceNotFound {
                scene: scene_id,
                index,
            })?;
        let target = choice.next.ok_or(PlayError::MissingDestination {
            scene: scene_id,
            index,
        })?;
        if !self.project.contains(target) {
            return Err(PlayError::MissingDestination {
                scene: scene_id,
                index,
            });
        }
        debug!(from:% = scene_id, to:% = target, choice = index; "Choice taken");
        self.enter(target)
    }

    /// Follows the auto-advance link of the current scene.
    pub fn advance(&mut self) -> Result<&Scene, PlayError> {
        let scene_id = self.current().id;
        let target = match self.exits() {
            Exits::Continue {
                target: Some(target),
            } => target,
            Exits::Continue { target: None } => {
                let missing = self.current().auto_next.unwrap_or(scene_id);
                return Err(PlayError::UnknownScene(missing));
            }
            _ => return Err(PlayError::NoAutoAdvance(scene_id)),
        };
        debug!(from:% = scene_id, to:% = target; "Auto-advanced");
        self.enter(target)
    }

    fn enter(&mut self, target: Id) -> Result<&Scene, PlayError> {
        let scene = self
            .project
            .scene(target)
            .map(Arc::clone)
            .ok_or(PlayError::UnknownScene(target))?;
        self.history.visit(scene);
        Ok(self.current())
    }

    pub fn can_go_back(&self) -> bool {
        self.history.can_go_back()
    }

    pub fn can_go_forward(&self) -> bool {
        self.history.can_go_forward()
    }

    /// Moves to the previous history entry. Returns `false` at the start.
    pub fn back(&mut self) -> bool {
        self.history.back()
    }

    /// Moves to the next history entry. Returns `false` at the end.
    pub fn forward(&mut self) -> bool {
        self.history.forward()
    }

    /// Moves the cursor to history entry `index` without trimming.
    pub fn jump(&mut self, index: usize) -> Result<&Scene, PlayError> {
        if !self.history.jump(index) {
            return Err(PlayError::HistoryOutOfRange(index));
        }
        Ok(self.current())
    }

    /// Describes every history entry, oldest first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        let cursor = self.history.cursor();
        self.history
            .entries()
            .iter()
            .enumerate()
            .map(|(position, scene)| {
                let full_text = scene
                    .first_line()
                    .map(|line| line.trim().to_string())
                    .unwrap_or_else(|| scene.id.to_string());
                HistoryEntry {
                    scene_id: scene.id,
                    label: truncate_label(&full_text, self.label_length),
                    full_text,
                    current: position == cursor,
                }
            })
            .collect()
    }
}

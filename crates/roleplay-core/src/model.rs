//! Scene and project model.
//!
//! Factories in this module ([`Project::from_options`], [`Scene::from_options`],
//! [`Choice::from_options`]) never fail: missing values are defaulted and
//! oversized collections are clamped to the limits below. Cross-scene rules
//! (a single start scene, no links out of end scenes, no dangling links after
//! a deletion) are the responsibility of the editing layer and the validator.
//!
//! Projects hold their scenes behind [`Arc`](std::sync::Arc). Editing clones
//! the project and swaps in new scene values, so unchanged scenes stay
//! pointer-equal between snapshots.

mod choice;
mod dialogue;
mod project;
mod scene;

pub use choice::{Choice, ChoiceOptions};
pub use dialogue::DialogueLine;
pub use project::{Asset, DEFAULT_TITLE, Meta, Project, ProjectOptions};
pub use scene::{Scene, SceneOptions, SceneType};

/// Maximum number of scenes in a project.
pub const MAX_SCENES: usize = 20;

/// Maximum number of dialogue lines per scene.
pub const MAX_DIALOGUE_LINES: usize = 2;

/// Maximum number of choices per scene.
pub const MAX_CHOICES: usize = 3;

/// Maximum number of end scenes per project.
pub const MAX_END_SCENES: usize = 3;

//! Scenes: the nodes of a story graph.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{
    MAX_CHOICES, MAX_DIALOGUE_LINES,
    choice::{Choice, ChoiceOptions},
    dialogue::DialogueLine,
};
use crate::{identifier::Id, media::MediaRef};

/// The role a scene plays in the story graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneType {
    /// The entry point. A playable project has exactly one.
    Start,
    /// Any scene between the start and an ending.
    #[default]
    Intermediate,
    /// A terminal scene. It has neither choices nor an auto-advance link.
    End,
}

impl fmt::Display for SceneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneType::Start => write!(f, "start"),
            SceneType::Intermediate => write!(f, "intermediate"),
            SceneType::End => write!(f, "end"),
        }
    }
}

/// A node in the story graph.
///
/// A scene links onward either through its `choices` or through a single
/// `auto_next` link, never both at once.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub id: Id,
    pub scene_type: SceneType,
    pub image: Option<MediaRef>,
    pub background_audio: Option<MediaRef>,
    /// One or two lines.
    pub dialogue: Vec<DialogueLine>,
    /// Up to three choices.
    pub choices: Vec<Choice>,
    /// Scene entered automatically when the player continues.
    pub auto_next: Option<Id>,
    /// Author notes; never shown to the player.
    pub notes: String,
}

impl Scene {
    /// Builds a normalized scene.
    ///
    /// - a missing id is generated with the `scene` prefix;
    /// - a missing type defaults to [`SceneType::Intermediate`];
    /// - missing or empty dialogue becomes a single empty line, longer
    ///   dialogue keeps its first two lines;
    /// - choices keep their first three entries, each passed through
    ///   [`Choice::from_options`];
    /// - `auto_next` is dropped for end scenes.
    pub fn from_options(options: SceneOptions) -> Self {
        let scene_type = options.scene_type.unwrap_or_default();

        let mut dialogue = options.dialogue.unwrap_or_default();
        dialogue.truncate(MAX_DIALOGUE_LINES);
        if dialogue.is_empty() {
            dialogue.push(DialogueLine::default());
        }

        let choices = options
            .choices
            .into_iter()
            .take(MAX_CHOICES)
            .map(Choice::from_options)
            .collect();

        let auto_next = match scene_type {
            SceneType::End => None,
            _ => options.auto_next,
        };

        Self {
            id: options.id.unwrap_or_else(|| Id::fresh("scene")),
            scene_type,
            image: options.image,
            background_audio: options.background_audio,
            dialogue,
            choices,
            auto_next,
            notes: options.notes.unwrap_or_default(),
        }
    }

    pub fn is_start(&self) -> bool {
        self.scene_type == SceneType::Start
    }

    pub fn is_end(&self) -> bool {
        self.scene_type == SceneType::End
    }

    /// Returns every outgoing destination as written: choice destinations in
    /// order, then the auto-advance target. Destinations may be unknown ids.
    pub fn destinations(&self) -> impl Iterator<Item = Id> + '_ {
        self.choices
            .iter()
            .filter_map(|choice| choice.next)
            .chain(self.auto_next)
    }

    /// Returns `true` if any choice or the auto-advance link targets `id`.
    pub fn links_to(&self, id: Id) -> bool {
        self.destinations().any(|target| target == id)
    }

    /// Returns every media reference owned by the scene: image, background
    /// audio, then dialogue audio in line order.
    pub fn media(&self) -> impl Iterator<Item = &MediaRef> {
        self.image
            .iter()
            .chain(self.background_audio.iter())
            .chain(self.dialogue.iter().filter_map(|line| line.audio.as_ref()))
    }

    /// Returns the first non-blank dialogue line, if any.
    pub fn first_line(&self) -> Option<&str> {
        self.dialogue
            .iter()
            .map(|line| line.text.as_str())
            .find(|text| !text.trim().is_empty())
    }
}

/// Optional inputs for [`Scene::from_options`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneOptions {
    pub id: Option<Id>,
    pub scene_type: Option<SceneType>,
    pub image: Option<MediaRef>,
    pub background_audio: Option<MediaRef>,
    pub dialogue: Option<Vec<DialogueLine>>,
    pub choices: Vec<ChoiceOptions>,
    pub auto_next: Option<Id>,
    pub notes: Option<String>,
}

impl SceneOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: Id) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_type(mut self, scene_type: SceneType) -> Self {
        self.scene_type = Some(scene_type);
        self
    }

    pub fn with_image(mut self, image: MediaRef) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_background_audio(mut self, audio: MediaRef) -> Self {
        self.background_audio = Some(audio);
        self
    }

    pub fn with_dialogue(mut self, dialogue: Vec<DialogueLine>) -> Self {
        self.dialogue = Some(dialogue);
        self
    }

    pub fn with_choice(mut self, choice: ChoiceOptions) -> Self {
        self.choices.push(choice);
        self
    }

    pub fn with_auto_next(mut self, target: Id) -> Self {
        self.auto_next = Some(target);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

impl From<Scene> for SceneOptions {
    fn from(scene: Scene) -> Self {
        Self {
            id: Some(scene.id),
            scene_type: Some(scene.scene_type),
            image: scene.image,
            background_audio: scene.background_audio,
            dialogue: Some(scene.dialogue),
            choices: scene.choices.into_iter().map(ChoiceOptions::from).collect(),
            auto_next: scene.auto_next,
            notes: Some(scene.notes),
        }
    }
}

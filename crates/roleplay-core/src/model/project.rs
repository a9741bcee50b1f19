//! Projects: the root of the model.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::scene::{Scene, SceneOptions, SceneType};
use crate::identifier::Id;

/// Title given to projects created without one.
pub const DEFAULT_TITLE: &str = "Untitled Role Play";

/// Project metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Meta {
    pub title: String,
    pub version: u32,
}

impl Default for Meta {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            version: 1,
        }
    }
}

/// An opaque project-level asset record, carried through saves untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Asset(pub serde_json::Value);

/// A branching story: metadata plus an ordered list of scenes.
///
/// Scenes are shared behind [`Arc`]. Clone a project to derive the next
/// snapshot; only the scenes that are replaced stop being pointer-equal.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub meta: Meta,
    pub scenes: Vec<Arc<Scene>>,
    pub assets: Vec<Asset>,
}

impl Project {
    /// Builds a project. Without scenes, a single default start scene is
    /// created.
    pub fn from_options(options: ProjectOptions) -> Self {
        let mut scenes: Vec<Arc<Scene>> = options
            .scenes
            .into_iter()
            .map(|scene| Arc::new(Scene::from_options(scene)))
            .collect();
        if scenes.is_empty() {
            scenes.push(Arc::new(Scene::from_options(
                SceneOptions::new().with_type(SceneType::Start),
            )));
        }

        Self {
            meta: options.meta.unwrap_or_default(),
            scenes,
            assets: options.assets,
        }
    }

    /// Returns the scene with the given id.
    pub fn scene(&self, id: Id) -> Option<&Arc<Scene>> {
        self.scenes.iter().find(|scene| scene.id == id)
    }

    /// Returns the position of the scene with the given id.
    pub fn scene_index(&self, id: Id) -> Option<usize> {
        self.scenes.iter().position(|scene| scene.id == id)
    }

    pub fn contains(&self, id: Id) -> bool {
        self.scene_index(id).is_some()
    }

    /// Returns the first scene marked as start, if any.
    pub fn start_scene(&self) -> Option<&Arc<Scene>> {
        self.scenes.iter().find(|scene| scene.is_start())
    }

    /// Returns the scene play begins at: the start scene, or the first scene
    /// when no start scene exists.
    pub fn entry_scene(&self) -> Option<&Arc<Scene>> {
        self.start_scene().or_else(|| self.scenes.first())
    }

    /// Counts scenes of the given type.
    pub fn count(&self, scene_type: SceneType) -> usize {
        self.scenes
            .iter()
            .filter(|scene| scene.scene_type == scene_type)
            .count()
    }

    /// Returns scene ids in project order.
    pub fn scene_ids(&self) -> impl Iterator<Item = Id> + '_ {
        self.scenes.iter().map(|scene| scene.id)
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::from_options(ProjectOptions::default())
    }
}

/// Optional inputs for [`Project::from_options`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectOptions {
    pub meta: Option<Meta>,
    pub scenes: Vec<SceneOptions>,
    pub assets: Vec<Asset>,
}

impl ProjectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        let meta = self.meta.get_or_insert_with(Meta::default);
        meta.title = title.into();
        self
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn with_scene(mut self, scene: SceneOptions) -> Self {
        self.scenes.push(scene);
        self
    }

    pub fn with_asset(mut self, asset: Asset) -> Self {
        self.assets.push(asset);
        self
    }
}

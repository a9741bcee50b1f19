//! Persisted JSON shape of a project.
//!
//! Documents mirror the in-memory model with camelCase keys. Media are
//! reduced to a name and, when the binary was exported, a bundle-relative
//! path. Every field is defaulted on input so hand-written and legacy files
//! load without ceremony.

use serde::{Deserialize, Serialize};

use roleplay_core::{
    identifier::Id,
    model::{Asset, Meta, SceneType},
};

/// Version written to, and accepted from, the `manifestVersion` field.
pub const MANIFEST_VERSION: u32 = 1;

/// Export envelope: `{ "manifestVersion": 1, "project": { ... } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub manifest_version: u32,
    pub project: ProjectDocument,
}

impl Manifest {
    pub fn new(project: ProjectDocument) -> Self {
        Self {
            manifest_version: MANIFEST_VERSION,
            project,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDocument {
    #[serde(default)]
    pub meta: Meta,
    #[serde(default)]
    pub scenes: Vec<SceneDocument>,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDocument {
    #[serde(default)]
    pub id: Option<Id>,
    #[serde(rename = "type", default)]
    pub scene_type: Option<SceneType>,
    #[serde(default)]
    pub image: Option<MediaDocument>,
    #[serde(default)]
    pub background_audio: Option<MediaDocument>,
    #[serde(default)]
    pub dialogue: Vec<DialogueDocument>,
    #[serde(default)]
    pub choices: Vec<ChoiceDocument>,
    #[serde(rename = "autoNextSceneId", default)]
    pub auto_next: Option<Id>,
    #[serde(default)]
    pub notes: String,
}

impl SceneDocument {
    /// Returns every media document of the scene: image, background audio,
    /// then dialogue audio in line order.
    pub fn media(&self) -> impl Iterator<Item = &MediaDocument> {
        self.image
            .iter()
            .chain(self.background_audio.iter())
            .chain(self.dialogue.iter().filter_map(|line| line.audio.as_ref()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogueDocument {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub audio: Option<MediaDocument>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChoiceDocument {
    #[serde(default)]
    pub id: Option<Id>,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "nextSceneId", default)]
    pub next: Option<Id>,
}

/// A media reference on disk. `path` is absent when no binary was exported;
/// `mime` is absent when the payload carried no MIME type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_keys_are_camel_case() {
        let scene = SceneDocument {
            id: Some(Id::new("scene-1")),
            scene_type: Some(SceneType::Start),
            background_audio: Some(MediaDocument {
                name: "bg.mp3".to_string(),
                path: None,
                mime: None,
            }),
            auto_next: Some(Id::new("scene-2")),
            choices: vec![ChoiceDocument {
                id: Some(Id::new("c1")),
                label: "Go".to_string(),
                next: None,
            }],
            ..SceneDocument::default()
        };

        let json = serde_json::to_value(&scene).unwrap();

        assert_eq!(json["type"], "start");
        assert_eq!(json["autoNextSceneId"], "scene-2");
        assert_eq!(json["backgroundAudio"]["name"], "bg.mp3");
        assert!(json["backgroundAudio"].get("path").is_none());
        assert!(json["choices"][0]["nextSceneId"].is_null());
        assert!(json["image"].is_null());
    }

    #[test]
    fn test_sparse_scene_parses() {
        let scene: SceneDocument = serde_json::from_str(r#"{"id":"lone"}"#).unwrap();

        assert_eq!(scene.id, Some(Id::new("lone")));
        assert_eq!(scene.scene_type, None);
        assert!(scene.dialogue.is_empty());
    }

    #[test]
    fn test_manifest_envelope() {
        let manifest = Manifest::new(ProjectDocument::default());

        let json = serde_json::to_value(&manifest).unwrap();

        assert_eq!(json["manifestVersion"], 1);
        assert_eq!(json["project"]["meta"]["title"], "Untitled Role Play");
    }
}

//! Saving and loading projects.
//!
//! A saved project is a *bundle*: a `project.json` manifest plus one file per
//! media payload, laid out as
//!
//! ```text
//! project.json
//! media/<scene>/image-<name>
//! media/<scene>/background-<name>
//! media/<scene>/dialogue-<line>-<name>
//! ```
//!
//! `<scene>` is the scene id made safe as a single path segment. Ids that
//! map to the same segment get a numeric suffix (`a_b`, `a_b-2`), so every
//! scene owns its own folder.
//!
//! Display handles are never written. [`hydrate`] releases the handles of
//! the project it replaces and issues fresh ones for every media payload it
//! restores.

mod document;

use std::{
    collections::{HashMap, HashSet},
    fs,
    path::{Component, Path, PathBuf},
};

use log::{debug, info, warn};

use roleplay_core::{
    media::{Blob, DisplayHandles, MediaRef},
    model::{
        ChoiceOptions, DialogueLine, MAX_DIALOGUE_LINES, Project, ProjectOptions, Scene,
        SceneOptions,
    },
};

use crate::{config::StorageConfig, error::RoleplayError};

pub use document::{
    ChoiceDocument, DialogueDocument, MANIFEST_VERSION, Manifest, MediaDocument,
    ProjectDocument, SceneDocument,
};

/// File name of the manifest inside a bundle directory.
pub const PROJECT_FILE: &str = "project.json";

/// A media payload and its bundle-relative path.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaEntry {
    pub path: String,
    pub blob: Blob,
}

/// A serialized project: the manifest and every exported payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Bundle {
    pub manifest: Manifest,
    pub media: Vec<MediaEntry>,
}

impl Bundle {
    /// Returns the payload stored at `path`.
    pub fn resolve(&self, path: &str) -> Option<Blob> {
        self.media
            .iter()
            .find(|entry| entry.path == path)
            .map(|entry| entry.blob.clone())
    }

    /// Renders the manifest as JSON.
    pub fn to_json(&self, pretty: bool) -> Result<String, RoleplayError> {
        let json = if pretty {
            serde_json::to_string_pretty(&self.manifest)?
        } else {
            serde_json::to_string(&self.manifest)?
        };
        Ok(json)
    }
}

/// Turns a project into a manifest and its media payloads.
///
/// Only media with a payload get a `path`; blob-less media keep just their
/// name.
pub fn serialize(project: &Project, config: &StorageConfig) -> Bundle {
    let mut media = Vec::new();
    let mut folders = HashSet::new();
    let scenes = project
        .scenes
        .iter()
        .map(|scene| {
            let folder = unique_segment(&mut folders, path_segment(&scene.id.to_string()));
            let folder = format!("{}/{folder}", config.media_dir());
            scene_document(scene, &folder, &mut media)
        })
        .collect();

    let document = ProjectDocument {
        meta: project.meta.clone(),
        scenes,
        assets: project.assets.clone(),
    };
    debug!(scenes = project.len(), media = media.len(); "Project serialized");

    Bundle {
        manifest: Manifest::new(document),
        media,
    }
}

fn scene_document(scene: &Scene, folder: &str, media: &mut Vec<MediaEntry>) -> SceneDocument {
    let mut export = |media_ref: &MediaRef, prefix: &str| {
        let path = media_ref.blob.as_ref().map(|blob| {
            let path = format!("{folder}/{prefix}-{}", path_segment(&media_ref.name));
            media.push(MediaEntry {
                path: path.clone(),
                blob: blob.clone(),
            });
            path
        });
        MediaDocument {
            name: media_ref.name.clone(),
            path,
            mime: media_ref
                .blob
                .as_ref()
                .and_then(|blob| blob.mime())
                .map(str::to_string),
        }
    };

    let image = scene.image.as_ref().map(|image| export(image, "image"));
    let background_audio = scene
        .background_audio
        .as_ref()
        .map(|audio| export(audio, "background"));
    let dialogue = scene
        .dialogue
        .iter()
        .enumerate()
        .map(|(index, line)| DialogueDocument {
            text: line.text.clone(),
            audio: line
                .audio
                .as_ref()
                .map(|audio| export(audio, &format!("dialogue-{}", index + 1))),
        })
        .collect();

    SceneDocument {
        id: Some(scene.id),
        scene_type: Some(scene.scene_type),
        image,
        background_audio,
        dialogue,
        choices: scene
            .choices
            .iter()
            .map(|choice| ChoiceDocument {
                id: Some(choice.id),
                label: choice.label.clone(),
                next: choice.next,
            })
            .collect(),
        auto_next: scene.auto_next,
        notes: scene.notes.clone(),
    }
}

/// Replaces path separators so a name stays a single path segment.
fn path_segment(name: &str) -> String {
    let segment: String = name
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    match segment.trim() {
        "" | "." | ".." => "untitled".to_string(),
        _ => segment,
    }
}

/// Claims `segment` in `taken`, appending `-2`, `-3`, ... until it is unused.
fn unique_segment(taken: &mut HashSet<String>, segment: String) -> String {
    let mut candidate = segment.clone();
    let mut suffix = 2;
    while !taken.insert(candidate.clone()) {
        candidate = format!("{segment}-{suffix}");
        suffix += 1;
    }
    candidate
}

/// Rebuilds a project from a document.
///
/// The handles of `previous` are released first. Scenes pass through the
/// model factories, so the result is normalized; media whose `path`
/// resolves to a payload get a fresh display handle, all others stay
/// blob-less.
pub fn hydrate(
    document: ProjectDocument,
    resolve: &dyn Fn(&str) -> Option<Blob>,
    previous: Option<&Project>,
    handles: &mut dyn DisplayHandles,
) -> Project {
    if let Some(previous) = previous {
        release_project_handles(previous, handles);
    }

    let mut attach = |media: MediaDocument| {
        match media.path.as_deref().and_then(resolve) {
            Some(blob) => MediaRef::attach(media.name, blob, handles),
            None => MediaRef::new(media.name),
        }
    };

    let mut options = ProjectOptions::new().with_meta(document.meta);
    options.assets = document.assets;
    for scene in document.scenes {
        let mut scene_options = SceneOptions {
            id: scene.id,
            scene_type: scene.scene_type,
            image: scene.image.map(&mut attach),
            background_audio: scene.background_audio.map(&mut attach),
            auto_next: scene.auto_next,
            notes: Some(scene.notes),
            ..SceneOptions::default()
        };
        let dialogue = scene
            .dialogue
            .into_iter()
            .take(MAX_DIALOGUE_LINES)
            .map(|line| DialogueLine {
                text: line.text,
                audio: line.audio.map(&mut attach),
            })
            .collect();
        scene_options.dialogue = Some(dialogue);
        scene_options.choices = scene
            .choices
            .into_iter()
            .map(|choice| ChoiceOptions {
                id: choice.id,
                label: Some(choice.label),
                next: choice.next,
            })
            .collect();
        options = options.with_scene(scene_options);
    }

    let project = Project::from_options(options);
    debug!(title = project.meta.title.as_str(), scenes = project.len(); "Project hydrated");
    project
}

/// Releases every display handle held by `project`.
pub fn release_project_handles(project: &Project, handles: &mut dyn DisplayHandles) {
    for scene in &project.scenes {
        for media in scene.media() {
            media.release(handles);
        }
    }
}

/// Parses a manifest or a legacy bare project document.
///
/// # Errors
///
/// Returns [`RoleplayError::Json`] for malformed input and
/// [`RoleplayError::Manifest`] for a manifest version other than
/// [`MANIFEST_VERSION`].
pub fn parse_snapshot(text: &str) -> Result<ProjectDocument, RoleplayError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    if value.get("manifestVersion").is_none() {
        debug!("Reading legacy project document");
        return Ok(serde_json::from_value(value)?);
    }

    let manifest: Manifest = serde_json::from_value(value)?;
    if manifest.manifest_version != MANIFEST_VERSION {
        return Err(RoleplayError::Manifest(manifest.manifest_version));
    }
    Ok(manifest.project)
}

/// Writes `project` as a bundle into `dir`, creating it if needed.
pub fn save_bundle(
    dir: impl AsRef<Path>,
    project: &Project,
    config: &StorageConfig,
) -> Result<Bundle, RoleplayError> {
    let dir = dir.as_ref();
    let bundle = serialize(project, config);

    fs::create_dir_all(dir)?;
    for entry in &bundle.media {
        let target = bundle_path(dir, &entry.path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, entry.blob.bytes())?;
    }
    fs::write(dir.join(PROJECT_FILE), bundle.to_json(config.pretty())?)?;

    info!(
        path:? = dir,
        scenes = project.len(),
        media = bundle.media.len();
        "Project saved"
    );
    Ok(bundle)
}

/// Loads a project from a bundle directory, a manifest file, or a legacy
/// project file.
///
/// Media paths are resolved against the bundle directory (or the file's
/// parent directory). Missing media files leave the reference blob-less.
/// The handles of `previous` are released only once the input has been
/// read and parsed successfully.
pub fn load(
    path: impl AsRef<Path>,
    previous: Option<&Project>,
    handles: &mut dyn DisplayHandles,
) -> Result<Project, RoleplayError> {
    let path = path.as_ref();
    let (base, file) = if path.is_dir() {
        (path.to_path_buf(), path.join(PROJECT_FILE))
    } else {
        let base = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        (base, path.to_path_buf())
    };

    let text = fs::read_to_string(&file)?;
    let document = parse_snapshot(&text)?;

    let mut blobs: HashMap<String, Blob> = HashMap::new();
    for media in document.scenes.iter().flat_map(SceneDocument::media) {
        let Some(relative) = media.path.as_deref() else {
            continue;
        };
        let target = bundle_path(&base, relative)?;
        match fs::read(&target) {
            Ok(bytes) => {
                let blob = match &media.mime {
                    Some(mime) => Blob::new(bytes).with_mime(mime.as_str()),
                    None => Blob::new(bytes),
                };
                blobs.insert(relative.to_string(), blob);
            }
            Err(err) => {
                warn!(path = relative, err:% = err; "Media file could not be read");
            }
        }
    }

    let project = hydrate(
        document,
        &|path| blobs.get(path).cloned(),
        previous,
        handles,
    );
    info!(path:? = path, scenes = project.len(); "Project loaded");
    Ok(project)
}

/// Joins a bundle-relative path onto `base`, rejecting paths that escape it.
fn bundle_path(base: &Path, relative: &str) -> Result<PathBuf, RoleplayError> {
    let escapes = Path::new(relative).components().any(|component| {
        matches!(
            component,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes || relative.is_empty() {
        return Err(RoleplayError::MediaPath(relative.to_string()));
    }
    Ok(base.join(relative))
}

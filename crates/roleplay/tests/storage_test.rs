use std::fs;

use tempfile::tempdir;

use roleplay::{
    RoleplayError, Studio,
    config::StorageConfig,
    identifier::Id,
    media::{Blob, DisplayHandles, HandleRegistry, MediaRef, MediaSource},
    model::{ChoiceOptions, DialogueLine, Project, ProjectOptions, SceneOptions, SceneType},
    storage::{self, PROJECT_FILE},
};

fn persistent_adventure(handles: &mut dyn DisplayHandles) -> Project {
    let image = Blob::new(b"image-data".to_vec()).with_mime("text/plain");
    let audio = Blob::new(b"audio-data".to_vec()).with_mime("audio/mpeg");
    Project::from_options(
        ProjectOptions::new()
            .with_title("Persistent Adventure")
            .with_scene(
                SceneOptions::new()
                    .with_id(Id::new("scene-1"))
                    .with_type(SceneType::Start)
                    .with_image(MediaSource::new("cover.png", image).attach(handles))
                    .with_background_audio(MediaSource::new("bg.mp3", audio.clone()).attach(handles))
                    .with_dialogue(vec![
                        DialogueLine::new("Welcome!")
                            .with_audio(MediaSource::new("line.mp3", audio).attach(handles)),
                    ])
                    .with_choice(
                        ChoiceOptions::new()
                            .with_id(Id::new("c1"))
                            .with_label("Leave")
                            .with_next(Id::new("scene-2")),
                    ),
            )
            .with_scene(
                SceneOptions::new()
                    .with_id(Id::new("scene-2"))
                    .with_type(SceneType::End)
                    .with_dialogue(vec![DialogueLine::new("Goodbye.")])
                    .with_notes("Keep it short."),
            ),
    )
}

#[test]
fn test_hydrate_serialize_round_trip() {
    let mut handles = HandleRegistry::new();
    let project = persistent_adventure(&mut handles);

    let bundle = storage::serialize(&project, &StorageConfig::default());
    let hydrated = storage::hydrate(
        bundle.manifest.project.clone(),
        &|path| bundle.resolve(path),
        None,
        &mut handles,
    );

    // MediaRef equality ignores display handles.
    assert_eq!(hydrated, project);
    assert_eq!(hydrated.meta.title, "Persistent Adventure");
    assert_eq!(hydrated.scenes[0].choices[0].next, Some(Id::new("scene-2")));
}

#[test]
fn test_save_and_load_bundle() {
    let dir = tempdir().expect("Failed to create temp directory");
    let mut studio = Studio::default();
    let mut handles = HandleRegistry::new();
    let project = persistent_adventure(&mut handles);

    let bundle = studio.save(dir.path(), &project).expect("save succeeds");

    assert_eq!(bundle.media.len(), 3);
    assert!(dir.path().join(PROJECT_FILE).is_file());
    for entry in &bundle.media {
        assert!(dir.path().join(&entry.path).is_file(), "{} missing", entry.path);
    }
    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join(PROJECT_FILE)).unwrap()).unwrap();
    assert_eq!(manifest["manifestVersion"], 1);
    assert_eq!(
        manifest["project"]["scenes"][0]["image"]["path"],
        "media/scene-1/image-cover.png"
    );

    let loaded = studio.load(dir.path(), None).expect("load succeeds");

    assert_eq!(loaded.meta.title, "Persistent Adventure");
    let scene = &loaded.scenes[0];
    let bytes = |media: Option<&MediaRef>| media.and_then(|m| m.blob.as_ref()).map(|b| b.bytes().to_vec());
    assert_eq!(bytes(scene.image.as_ref()), Some(b"image-data".to_vec()));
    assert_eq!(bytes(scene.background_audio.as_ref()), Some(b"audio-data".to_vec()));
    assert_eq!(
        bytes(scene.dialogue[0].audio.as_ref()),
        Some(b"audio-data".to_vec())
    );
    assert!(scene.image.as_ref().and_then(|m| m.display.as_ref()).is_some());
    assert_eq!(studio.handles().live_count(), 3);
    assert_eq!(loaded.scenes[1].notes, "Keep it short.");
}

#[test]
fn test_save_and_load_keeps_mime_types() {
    let dir = tempdir().expect("Failed to create temp directory");
    let mut studio = Studio::default();
    let mut handles = HandleRegistry::new();
    let project = persistent_adventure(&mut handles);

    studio.save(dir.path(), &project).expect("save succeeds");
    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join(PROJECT_FILE)).unwrap()).unwrap();
    let loaded = studio.load(dir.path(), None).expect("load succeeds");

    assert_eq!(manifest["project"]["scenes"][0]["image"]["mime"], "text/plain");
    let mime = |media: Option<&MediaRef>| {
        media
            .and_then(|m| m.blob.as_ref())
            .and_then(|b| b.mime().map(str::to_string))
    };
    let scene = &loaded.scenes[0];
    assert_eq!(mime(scene.image.as_ref()).as_deref(), Some("text/plain"));
    assert_eq!(mime(scene.background_audio.as_ref()).as_deref(), Some("audio/mpeg"));
    assert_eq!(loaded, project);
}

#[test]
fn test_scenes_with_clashing_folder_names_keep_their_media() {
    let dir = tempdir().expect("Failed to create temp directory");
    let mut studio = Studio::default();
    let mut handles = HandleRegistry::new();
    let scene = |id: &str, payload: &[u8], handles: &mut HandleRegistry| {
        SceneOptions::new()
            .with_id(Id::new(id))
            .with_image(MediaSource::new("x.png", Blob::new(payload.to_vec())).attach(handles))
    };
    let project = Project::from_options(
        ProjectOptions::new()
            .with_scene(scene("a/b", b"FIRST", &mut handles))
            .with_scene(scene("a_b", b"SECOND", &mut handles))
            .with_scene(scene("..", b"THIRD", &mut handles))
            .with_scene(scene("untitled", b"FOURTH", &mut handles)),
    );

    let bundle = studio.save(dir.path(), &project).expect("save succeeds");
    let loaded = studio.load(dir.path(), None).expect("load succeeds");

    let mut paths: Vec<&str> = bundle.media.iter().map(|entry| entry.path.as_str()).collect();
    paths.sort_unstable();
    paths.dedup();
    assert_eq!(paths.len(), 4, "{paths:?}");
    let image = |id: &str| {
        loaded
            .scene(Id::new(id))
            .and_then(|scene| scene.image.as_ref())
            .and_then(|image| image.blob.as_ref())
            .map(|blob| blob.bytes().to_vec())
    };
    assert_eq!(image("a/b"), Some(b"FIRST".to_vec()));
    assert_eq!(image("a_b"), Some(b"SECOND".to_vec()));
    assert_eq!(image(".."), Some(b"THIRD".to_vec()));
    assert_eq!(image("untitled"), Some(b"FOURTH".to_vec()));
}

#[test]
fn test_load_releases_previous_project() {
    let dir = tempdir().expect("Failed to create temp directory");
    let mut studio = Studio::default();
    let mut handles = HandleRegistry::new();
    studio
        .save(dir.path(), &persistent_adventure(&mut handles))
        .unwrap();

    let first = studio.load(dir.path(), None).unwrap();
    let second = studio.load(dir.path(), Some(&first)).unwrap();

    assert_eq!(studio.handles().live_count(), 3);
    assert_eq!(studio.handles().released_count(), 3);
    let old = first.scenes[0].image.as_ref().and_then(|m| m.display.clone()).unwrap();
    let new = second.scenes[0].image.as_ref().and_then(|m| m.display.clone()).unwrap();
    assert_ne!(old, new);
    assert!(!studio.handles().is_live(&old));
}

#[test]
fn test_legacy_import_leaves_media_blobless() {
    let dir = tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("legacy.json");
    fs::write(
        &path,
        r#"{
            "meta": { "title": "Legacy Project", "version": 1 },
            "scenes": [{
                "id": "scene-legacy",
                "type": "start",
                "image": { "name": "legacy.png" },
                "backgroundAudio": null,
                "dialogue": [{ "text": "Hi there", "audio": { "name": "legacy.mp3" } }],
                "choices": [],
                "autoNextSceneId": null,
                "notes": ""
            }],
            "assets": []
        }"#,
    )
    .unwrap();
    let mut studio = Studio::default();

    let project = studio.load(&path, None).expect("legacy file loads");

    assert_eq!(project.meta.title, "Legacy Project");
    let scene = &project.scenes[0];
    let image = scene.image.as_ref().unwrap();
    assert_eq!(image.name, "legacy.png");
    assert!(image.blob.is_none());
    assert!(scene.dialogue[0].audio.as_ref().unwrap().blob.is_none());
    assert_eq!(studio.handles().live_count(), 0);
}

#[test]
fn test_missing_media_file_stays_blobless() {
    let dir = tempdir().expect("Failed to create temp directory");
    let mut studio = Studio::default();
    let mut handles = HandleRegistry::new();
    studio
        .save(dir.path(), &persistent_adventure(&mut handles))
        .unwrap();
    fs::remove_file(dir.path().join("media/scene-1/image-cover.png")).unwrap();

    let project = studio.load(dir.path(), None).unwrap();

    assert!(project.scenes[0].image.as_ref().unwrap().blob.is_none());
    assert_eq!(studio.handles().live_count(), 2);
}

#[test]
fn test_load_rejects_escaping_media_paths() {
    let dir = tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("project.json");
    fs::write(
        &path,
        r#"{"manifestVersion":1,"project":{"scenes":[{"image":{"name":"x","path":"../x.png"}}]}}"#,
    )
    .unwrap();

    let err = Studio::default().load(&path, None).unwrap_err();

    assert!(matches!(err, RoleplayError::MediaPath(path) if path == "../x.png"));
}

#[test]
fn test_load_missing_file() {
    let dir = tempdir().expect("Failed to create temp directory");

    let err = Studio::default()
        .load(dir.path().join("nope.json"), None)
        .unwrap_err();

    assert!(matches!(err, RoleplayError::Io(_)));
}

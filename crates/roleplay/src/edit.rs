//! Copy-on-write editing operations.
//!
//! Every operation takes the current project by reference and returns the
//! next project, leaving the input untouched. Only the scenes an operation
//! actually changes are replaced; all other scenes keep sharing their
//! [`Arc`] with the previous snapshot.
//!
//! These operations enforce the cross-scene rules the model factories leave
//! open:
//!
//! - at most [`MAX_SCENES`] scenes, [`MAX_DIALOGUE_LINES`] dialogue lines and
//!   [`MAX_CHOICES`] choices;
//! - marking a scene as start demotes every other start scene;
//! - end scenes have neither choices nor an auto-advance link;
//! - a scene has choices or an auto-advance link, not both;
//! - deleting a scene clears every link pointing at it.
//!
//! Operations that replace or drop media release the old display handle
//! before acquiring a new one.

use std::sync::Arc;

use log::{debug, trace};
use thiserror::Error;

use roleplay_core::{
    identifier::Id,
    media::{DisplayHandles, MediaRef, MediaSource},
    model::{
        Choice, ChoiceOptions, DialogueLine, MAX_CHOICES, MAX_DIALOGUE_LINES, MAX_SCENES,
        Project, Scene, SceneOptions, SceneType,
    },
};

/// A rejected edit. The project is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("Scene `{0}` does not exist")]
    SceneNotFound(Id),

    #[error("A project can have at most {0} scenes")]
    SceneLimit(usize),

    #[error("The last remaining scene cannot be deleted")]
    LastScene,

    #[error("Scene `{0}` is the only start scene and cannot be deleted")]
    SoleStart(Id),

    #[error("Scene `{0}` already has {MAX_DIALOGUE_LINES} dialogue lines")]
    DialogueLimit(Id),

    #[error("Scene `{0}` must keep at least one dialogue line")]
    LastDialogueLine(Id),

    #[error("Scene `{scene}` has no dialogue line {index}")]
    DialogueNotFound { scene: Id, index: usize },

    #[error("Scene `{0}` already has {MAX_CHOICES} choices")]
    ChoiceLimit(Id),

    #[error("Scene `{scene}` has no choice {index}")]
    ChoiceNotFound { scene: Id, index: usize },

    #[error("End scene `{0}` cannot have choices")]
    ChoiceOnEndScene(Id),

    #[error("End scene `{0}` cannot auto-advance")]
    AutoNextOnEndScene(Id),

    #[error("Scene `{0}` has choices; remove them before setting an auto-advance target")]
    AutoNextWithChoices(Id),
}

/// Changes to apply to an existing choice. `None` fields are left as they
/// are.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChoiceUpdate {
    pub label: Option<String>,
    /// `Some(None)` clears the destination.
    pub next: Option<Option<Id>>,
}

impl ChoiceUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_next(mut self, next: Option<Id>) -> Self {
        self.next = Some(next);
        self
    }
}

/// Replaces the scene `id` with the result of `f` applied to a copy.
fn modify_scene(
    project: &Project,
    id: Id,
    f: impl FnOnce(&mut Scene) -> Result<(), EditError>,
) -> Result<Project, EditError> {
    let index = project
        .scene_index(id)
        .ok_or(EditError::SceneNotFound(id))?;
    let mut scene = Scene::clone(&project.scenes[index]);
    f(&mut scene)?;

    let mut next = project.clone();
    next.scenes[index] = Arc::new(scene);
    Ok(next)
}

/// Turns every start scene other than `keep` into an intermediate scene.
fn demote_other_starts(scenes: &mut [Arc<Scene>], keep: Id) {
    for scene in scenes.iter_mut() {
        if scene.is_start() && scene.id != keep {
            trace!(scene:% = scene.id; "Demoting start scene");
            Arc::make_mut(scene).scene_type = SceneType::Intermediate;
        }
    }
}

/// Swaps `slot` to `source`, releasing the old handle first.
fn replace_media(
    slot: &mut Option<MediaRef>,
    source: Option<MediaSource>,
    handles: &mut dyn DisplayHandles,
) {
    if let Some(old) = slot.take() {
        old.release(handles);
    }
    *slot = source.map(|source| source.attach(handles));
}

/// Appends a new scene of the given type and returns its id.
///
/// The id is generated with the `scene` prefix, skipping ids already used by
/// the project.
pub fn add_scene(project: &Project, scene_type: SceneType) -> Result<(Project, Id), EditError> {
    if project.len() >= MAX_SCENES {
        return Err(EditError::SceneLimit(MAX_SCENES));
    }

    let id = loop {
        let candidate = Id::fresh("scene");
        if !project.contains(candidate) {
            break candidate;
        }
    };

    let mut next = project.clone();
    next.scenes.push(Arc::new(Scene::from_options(
        SceneOptions::new().with_id(id).with_type(scene_type),
    )));
    if scene_type == SceneType::Start {
        demote_other_starts(&mut next.scenes, id);
    }

    debug!(scene:% = id, scene_type:% = scene_type; "Scene added");
    Ok((next, id))
}

/// Returns `true` if [`delete_scene`] would accept deleting `id`.
pub fn can_delete_scene(project: &Project, id: Id) -> bool {
    check_delete(project, id).is_ok()
}

fn check_delete(project: &Project, id: Id) -> Result<usize, EditError> {
    let index = project
        .scene_index(id)
        .ok_or(EditError::SceneNotFound(id))?;
    if project.len() <= 1 {
        return Err(EditError::LastScene);
    }
    if project.scenes[index].is_start() && project.count(SceneType::Start) == 1 {
        return Err(EditError::SoleStart(id));
    }
    Ok(index)
}

/// Removes scene `id`, clears every choice and auto-advance link pointing at
/// it and releases its media handles.
///
/// The last remaining scene and the only start scene cannot be deleted.
pub fn delete_scene(
    project: &Project,
    id: Id,
    handles: &mut dyn DisplayHandles,
) -> Result<Project, EditError> {
    let index = check_delete(project, id)?;

    let mut next = project.clone();
    let removed = next.scenes.remove(index);
    for media in removed.media() {
        media.release(handles);
    }

    for scene in next.scenes.iter_mut() {
        if !scene.links_to(id) {
            continue;
        }
        let scene = Arc::make_mut(scene);
        for choice in &mut scene.choices {
            if choice.next == Some(id) {
                choice.next = None;
            }
        }
        if scene.auto_next == Some(id) {
            scene.auto_next = None;
        }
    }

    debug!(scene:% = id; "Scene deleted");
    Ok(next)
}

/// Changes the type of scene `id`.
///
/// A new start scene demotes the previous one. An end scene loses its
/// choices and auto-advance link.
pub fn set_scene_type(
    project: &Project,
    id: Id,
    scene_type: SceneType,
) -> Result<Project, EditError> {
    let mut next = modify_scene(project, id, |scene| {
        scene.scene_type = scene_type;
        if scene_type == SceneType::End {
            scene.choices.clear();
            scene.auto_next = None;
        }
        Ok(())
    })?;
    if scene_type == SceneType::Start {
        demote_other_starts(&mut next.scenes, id);
    }
    Ok(next)
}

/// Appends a dialogue line to scene `id`.
pub fn add_dialogue(
    project: &Project,
    id: Id,
    text: impl Into<String>,
) -> Result<Project, EditError> {
    modify_scene(project, id, |scene| {
        if scene.dialogue.len() >= MAX_DIALOGUE_LINES {
            return Err(EditError::DialogueLimit(id));
        }
        scene.dialogue.push(DialogueLine::new(text));
        Ok(())
    })
}

/// Removes dialogue line `index` from scene `id`, releasing its audio.
pub fn remove_dialogue(
    project: &Project,
    id: Id,
    index: usize,
    handles: &mut dyn DisplayHandles,
) -> Result<Project, EditError> {
    modify_scene(project, id, |scene| {
        if index >= scene.dialogue.len() {
            return Err(EditError::DialogueNotFound { scene: id, index });
        }
        if scene.dialogue.len() <= 1 {
            return Err(EditError::LastDialogueLine(id));
        }
        let line = scene.dialogue.remove(index);
        if let Some(audio) = line.audio {
            audio.release(handles);
        }
        Ok(())
    })
}

pub fn update_dialogue_text(
    project: &Project,
    id: Id,
    index: usize,
    text: impl Into<String>,
) -> Result<Project, EditError> {
    modify_scene(project, id, |scene| {
        let line = scene
            .dialogue
            .get_mut(index)
            .ok_or(EditError::DialogueNotFound { scene: id, index })?;
        line.text = text.into();
        Ok(())
    })
}

/// Sets or clears the voice audio of dialogue line `index`.
pub fn set_dialogue_audio(
    project: &Project,
    id: Id,
    index: usize,
    audio: Option<MediaSource>,
    handles: &mut dyn DisplayHandles,
) -> Result<Project, EditError> {
    modify_scene(project, id, |scene| {
        let line = scene
            .dialogue
            .get_mut(index)
            .ok_or(EditError::DialogueNotFound { scene: id, index })?;
        replace_media(&mut line.audio, audio, handles);
        Ok(())
    })
}

/// Sets or clears the image of scene `id`.
pub fn set_scene_image(
    project: &Project,
    id: Id,
    image: Option<MediaSource>,
    handles: &mut dyn DisplayHandles,
) -> Result<Project, EditError> {
    modify_scene(project, id, |scene| {
        replace_media(&mut scene.image, image, handles);
        Ok(())
    })
}

/// Sets or clears the background audio of scene `id`.
pub fn set_background_audio(
    project: &Project,
    id: Id,
    audio: Option<MediaSource>,
    handles: &mut dyn DisplayHandles,
) -> Result<Project, EditError> {
    modify_scene(project, id, |scene| {
        replace_media(&mut scene.background_audio, audio, handles);
        Ok(())
    })
}

/// Appends a choice to scene `id`. Clears the scene's auto-advance link.
pub fn add_choice(
    project: &Project,
    id: Id,
    choice: ChoiceOptions,
) -> Result<Project, EditError> {
    modify_scene(project, id, |scene| {
        if scene.is_end() {
            return Err(EditError::ChoiceOnEndScene(id));
        }
        if scene.choices.len() >= MAX_CHOICES {
            return Err(EditError::ChoiceLimit(id));
        }
        scene.choices.push(Choice::from_options(choice));
        scene.auto_next = None;
        Ok(())
    })
}

pub fn update_choice(
    project: &Project,
    id: Id,
    index: usize,
    update: ChoiceUpdate,
) -> Result<Project, EditError> {
    modify_scene(project, id, |scene| {
        let choice = scene
            .choices
            .get_mut(index)
            .ok_or(EditError::ChoiceNotFound { scene: id, index })?;
        if let Some(label) = update.label {
            choice.label = label;
        }
        if let Some(next) = update.next {
            choice.next = next;
        }
        Ok(())
    })
}

pub fn remove_choice(project: &Project, id: Id, index: usize) -> Result<Project, EditError> {
    modify_scene(project, id, |scene| {
        if index >= scene.choices.len() {
            return Err(EditError::ChoiceNotFound { scene: id, index });
        }
        scene.choices.remove(index);
        Ok(())
    })
}

/// Sets or clears the auto-advance target of scene `id`.
///
/// Setting a target is rejected on end scenes and on scenes with choices;
/// clearing is always accepted.
pub fn set_auto_next(
    project: &Project,
    id: Id,
    target: Option<Id>,
) -> Result<Project, EditError> {
    modify_scene(project, id, |scene| {
        if target.is_some() {
            if scene.is_end() {
                return Err(EditError::AutoNextOnEndScene(id));
            }
            if !scene.choices.is_empty() {
                return Err(EditError::AutoNextWithChoices(id));
            }
        }
        scene.auto_next = target;
        Ok(())
    })
}

pub fn set_title(project: &Project, title: impl Into<String>) -> Result<Project, EditError> {
    let mut next = project.clone();
    next.meta.title = title.into();
    Ok(next)
}

pub fn set_notes(
    project: &Project,
    id: Id,
    notes: impl Into<String>,
) -> Result<Project, EditError> {
    modify_scene(project, id, |scene| {
        scene.notes = notes.into();
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use roleplay_core::{
        media::{Blob, HandleRegistry},
        model::ProjectOptions,
    };

    use super::*;

    fn scene(id: &str, scene_type: SceneType) -> SceneOptions {
        SceneOptions::new().with_id(Id::new(id)).with_type(scene_type)
    }

    fn to(target: &str) -> ChoiceOptions {
        ChoiceOptions::new().with_next(Id::new(target))
    }

    /// start -> hall -> end, start -> end
    fn story() -> Project {
        Project::from_options(
            ProjectOptions::new()
                .with_scene(
                    scene("start", SceneType::Start)
                        .with_choice(to("hall"))
                        .with_choice(to("end")),
                )
                .with_scene(scene("hall", SceneType::Intermediate).with_auto_next(Id::new("end")))
                .with_scene(scene("end", SceneType::End)),
        )
    }

    fn get(project: &Project, id: &str) -> Arc<Scene> {
        project.scene(Id::new(id)).cloned().expect("scene exists")
    }

    fn source(name: &str) -> MediaSource {
        MediaSource::new(name, Blob::new(name.as_bytes().to_vec()))
    }

    #[test]
    fn test_untouched_scenes_are_shared() {
        let project = story();

        let next = set_notes(&project, Id::new("hall"), "dusty").unwrap();

        assert!(Arc::ptr_eq(&project.scenes[0], &next.scenes[0]));
        assert!(!Arc::ptr_eq(&project.scenes[1], &next.scenes[1]));
        assert!(Arc::ptr_eq(&project.scenes[2], &next.scenes[2]));
        assert_eq!(get(&project, "hall").notes, "");
        assert_eq!(get(&next, "hall").notes, "dusty");
    }

    #[test]
    fn test_unknown_scene() {
        let err = set_notes(&story(), Id::new("nope"), "x").unwrap_err();

        assert_eq!(err, EditError::SceneNotFound(Id::new("nope")));
    }

    #[test]
    fn test_add_scene() {
        let project = story();

        let (next, id) = add_scene(&project, SceneType::Intermediate).unwrap();

        assert_eq!(next.len(), 4);
        assert!(id.to_string().starts_with("scene-"));
        assert_eq!(get(&next, &id.to_string()).scene_type, SceneType::Intermediate);
    }

    #[test]
    fn test_add_scene_skips_taken_ids() {
        // Generate the next id, then add a scene that already uses the one after it.
        let probe = Id::fresh("scene").to_string();
        let seq: u32 = probe.trim_start_matches("scene-").parse().unwrap();
        let taken = Id::new(&format!("scene-{:04}", seq + 1));
        let project = Project::from_options(
            ProjectOptions::new()
                .with_scene(scene("start", SceneType::Start))
                .with_scene(SceneOptions::new().with_id(taken)),
        );

        let (_, id) = add_scene(&project, SceneType::Intermediate).unwrap();

        assert_ne!(id, taken);
    }

    #[test]
    fn test_add_scene_limit() {
        let options = (0..MAX_SCENES).fold(ProjectOptions::new(), |options, i| {
            options.with_scene(scene(&format!("limit-{i}"), SceneType::Intermediate))
        });
        let project = Project::from_options(options);

        let err = add_scene(&project, SceneType::End).unwrap_err();

        assert_eq!(err, EditError::SceneLimit(MAX_SCENES));
    }

    #[test]
    fn test_add_start_scene_demotes_previous_start() {
        let (next, id) = add_scene(&story(), SceneType::Start).unwrap();

        assert_eq!(next.count(SceneType::Start), 1);
        assert_eq!(next.start_scene().map(|s| s.id), Some(id));
        assert_eq!(get(&next, "start").scene_type, SceneType::Intermediate);
    }

    #[test]
    fn test_delete_scene_clears_inbound_links() {
        let mut handles = HandleRegistry::new();

        let next = delete_scene(&story(), Id::new("end"), &mut handles).unwrap();

        assert_eq!(next.len(), 2);
        assert!(!next.contains(Id::new("end")));
        for scene in &next.scenes {
            assert!(!scene.links_to(Id::new("end")));
        }
        let start = get(&next, "start");
        assert_eq!(start.choices.len(), 2);
        assert_eq!(start.choices[1].next, None);
        assert_eq!(get(&next, "hall").auto_next, None);
    }

    #[test]
    fn test_delete_scene_releases_media() {
        let mut handles = HandleRegistry::new();
        let project = set_scene_image(&story(), Id::new("hall"), Some(source("hall.png")), &mut handles)
            .unwrap();
        let project = set_dialogue_audio(&project, Id::new("hall"), 0, Some(source("hi.ogg")), &mut handles)
            .unwrap();
        assert_eq!(handles.live_count(), 2);

        delete_scene(&project, Id::new("hall"), &mut handles).unwrap();

        assert_eq!(handles.live_count(), 0);
    }

    #[test]
    fn test_delete_sole_start_is_rejected() {
        let mut handles = HandleRegistry::new();
        let project = story();

        let err = delete_scene(&project, Id::new("start"), &mut handles).unwrap_err();

        assert_eq!(err, EditError::SoleStart(Id::new("start")));
        assert!(!can_delete_scene(&project, Id::new("start")));
        assert!(can_delete_scene(&project, Id::new("hall")));
    }

    #[test]
    fn test_delete_last_scene_is_rejected() {
        let mut handles = HandleRegistry::new();
        let project = Project::default();
        let id = project.scenes[0].id;

        let err = delete_scene(&project, id, &mut handles).unwrap_err();

        assert_eq!(err, EditError::LastScene);
    }

    #[test]
    fn test_set_scene_type_end_clears_links() {
        let next = set_scene_type(&story(), Id::new("start"), SceneType::End).unwrap();

        let start = get(&next, "start");
        assert!(start.choices.is_empty());
        assert_eq!(start.auto_next, None);
    }

    #[test]
    fn test_set_scene_type_start_demotes() {
        let next = set_scene_type(&story(), Id::new("hall"), SceneType::Start).unwrap();

        assert_eq!(next.count(SceneType::Start), 1);
        assert!(get(&next, "hall").is_start());
    }

    #[test]
    fn test_dialogue_limits() {
        let project = add_dialogue(&story(), Id::new("hall"), "Second line").unwrap();
        assert_eq!(get(&project, "hall").dialogue.len(), 2);

        let err = add_dialogue(&project, Id::new("hall"), "Third").unwrap_err();
        assert_eq!(err, EditError::DialogueLimit(Id::new("hall")));

        let mut handles = HandleRegistry::new();
        let project = remove_dialogue(&project, Id::new("hall"), 0, &mut handles).unwrap();
        assert_eq!(get(&project, "hall").dialogue[0].text, "Second line");

        let err = remove_dialogue(&project, Id::new("hall"), 0, &mut handles).unwrap_err();
        assert_eq!(err, EditError::LastDialogueLine(Id::new("hall")));
    }

    #[test]
    fn test_remove_dialogue_releases_audio() {
        let mut handles = HandleRegistry::new();
        let project = add_dialogue(&story(), Id::new("hall"), "Echo").unwrap();
        let project =
            set_dialogue_audio(&project, Id::new("hall"), 1, Some(source("echo.ogg")), &mut handles)
                .unwrap();

        remove_dialogue(&project, Id::new("hall"), 1, &mut handles).unwrap();

        assert_eq!(handles.live_count(), 0);
        assert_eq!(handles.released_count(), 1);
    }

    #[test]
    fn test_update_dialogue_text() {
        let next = update_dialogue_text(&story(), Id::new("start"), 0, "Hello").unwrap();
        assert_eq!(get(&next, "start").dialogue[0].text, "Hello");

        let err = update_dialogue_text(&story(), Id::new("start"), 3, "x").unwrap_err();
        assert_eq!(
            err,
            EditError::DialogueNotFound {
                scene: Id::new("start"),
                index: 3
            }
        );
    }

    #[test]
    fn test_replacing_media_releases_old_handle() {
        let mut handles = HandleRegistry::new();
        let project =
            set_scene_image(&story(), Id::new("start"), Some(source("a.png")), &mut handles)
                .unwrap();
        let first = get(&project, "start").image.clone().unwrap();

        let project =
            set_scene_image(&project, Id::new("start"), Some(source("b.png")), &mut handles)
                .unwrap();

        let first_handle = first.display.unwrap();
        assert!(!handles.is_live(&first_handle));
        assert_eq!(handles.live_count(), 1);
        assert_eq!(get(&project, "start").image.as_ref().map(|m| m.name.as_str()), Some("b.png"));

        let project = set_background_audio(&project, Id::new("start"), Some(source("bg.ogg")), &mut handles)
            .unwrap();
        let project = set_background_audio(&project, Id::new("start"), None, &mut handles).unwrap();
        assert_eq!(get(&project, "start").background_audio, None);
        assert_eq!(handles.live_count(), 1);
    }

    #[test]
    fn test_add_choice_clears_auto_next() {
        let next = add_choice(&story(), Id::new("hall"), to("start")).unwrap();

        let hall = get(&next, "hall");
        assert_eq!(hall.choices.len(), 1);
        assert_eq!(hall.auto_next, None);
    }

    #[test]
    fn test_add_choice_limits() {
        let project = add_choice(&story(), Id::new("start"), to("start")).unwrap();

        let err = add_choice(&project, Id::new("start"), to("hall")).unwrap_err();
        assert_eq!(err, EditError::ChoiceLimit(Id::new("start")));

        let err = add_choice(&project, Id::new("end"), to("hall")).unwrap_err();
        assert_eq!(err, EditError::ChoiceOnEndScene(Id::new("end")));
    }

    #[test]
    fn test_update_and_remove_choice() {
        let next = update_choice(
            &story(),
            Id::new("start"),
            1,
            ChoiceUpdate::new().with_label("Run").with_next(None),
        )
        .unwrap();
        let choice = &get(&next, "start").choices[1];
        assert_eq!(choice.label, "Run");
        assert_eq!(choice.next, None);

        let next = remove_choice(&next, Id::new("start"), 0).unwrap();
        assert_eq!(get(&next, "start").choices.len(), 1);

        let err = remove_choice(&next, Id::new("start"), 5).unwrap_err();
        assert_eq!(
            err,
            EditError::ChoiceNotFound {
                scene: Id::new("start"),
                index: 5
            }
        );
    }

    #[test]
    fn test_set_auto_next_rules() {
        let project = story();

        let err = set_auto_next(&project, Id::new("start"), Some(Id::new("end"))).unwrap_err();
        assert_eq!(err, EditError::AutoNextWithChoices(Id::new("start")));

        let err = set_auto_next(&project, Id::new("end"), Some(Id::new("start"))).unwrap_err();
        assert_eq!(err, EditError::AutoNextOnEndScene(Id::new("end")));

        let next = set_auto_next(&project, Id::new("hall"), None).unwrap();
        assert_eq!(get(&next, "hall").auto_next, None);

        let next = set_auto_next(&next, Id::new("hall"), Some(Id::new("start"))).unwrap();
        assert_eq!(get(&next, "hall").auto_next, Some(Id::new("start")));
    }

    #[test]
    fn test_set_title() {
        let next = set_title(&story(), "Night Shift").unwrap();

        assert_eq!(next.meta.title, "Night Shift");
    }
}

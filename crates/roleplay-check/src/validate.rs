//! The validation pass.
//!
//! ## Checks Performed
//!
//! - **Project structure**: exactly one start scene, one to three end scenes,
//!   one to twenty scenes
//! - **Scene structure**: choice limits, choice and auto-advance destinations,
//!   end scenes that link onward, choices mixed with auto-advance
//! - **Reachability**: every scene can be reached from the start scene. Only
//!   checked when the project has exactly one start scene.
//!
//! Structural diagnostics always precede reachability diagnostics.

use log::debug;
use roleplay_core::{
    graph::StoryGraph,
    identifier::Id,
    model::{MAX_CHOICES, MAX_END_SCENES, MAX_SCENES, Project, Scene, SceneType},
};

use crate::error::{Diagnostic, ErrorCode, Report};

/// Collects diagnostics while walking a project.
struct Validator<'a> {
    project: &'a Project,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Validator<'a> {
    fn new(project: &'a Project) -> Self {
        Self {
            project,
            diagnostics: Vec::new(),
        }
    }

    fn check_project(&mut self) {
        let start_count = self.project.count(SceneType::Start);
        if start_count != 1 {
            self.diagnostics.push(
                Diagnostic::error(format!(
                    "Project must have exactly 1 start scene (found {start_count})."
                ))
                .with_code(ErrorCode::V100)
                .with_help("mark one scene as the start scene"),
            );
        }

        let end_count = self.project.count(SceneType::End);
        if end_count == 0 {
            self.diagnostics.push(
                Diagnostic::error("Project must have at least 1 end scene.")
                    .with_code(ErrorCode::V101)
                    .with_help("mark a scene as an end scene"),
            );
        } else if end_count > MAX_END_SCENES {
            self.diagnostics.push(
                Diagnostic::error(format!(
                    "Project can have at most {MAX_END_SCENES} end scenes (found {end_count})."
                ))
                .with_code(ErrorCode::V102),
            );
        }

        let scene_count = self.project.len();
        if !(1..=MAX_SCENES).contains(&scene_count) {
            self.diagnostics.push(
                Diagnostic::error(format!(
                    "Project must have 1–{MAX_SCENES} scenes (found {scene_count})."
                ))
                .with_code(ErrorCode::V103),
            );
        }
    }

    fn check_scene(&mut self, scene: &Scene) {
        if scene.choices.len() > MAX_CHOICES {
            self.diagnostics.push(
                Diagnostic::error(format!(
                    "Scene \"{}\" has more than {MAX_CHOICES} choices (found {}).",
                    scene.id,
                    scene.choices.len()
                ))
                .with_code(ErrorCode::V200)
                .with_scene(scene.id),
            );
        }

        for (index, choice) in scene.choices.iter().enumerate() {
            let Some(target) = choice.next else {
                self.diagnostics.push(
                    Diagnostic::error(format!(
                        "Choice {} in scene \"{}\" is missing a destination.",
                        index + 1,
                        scene.id
                    ))
                    .with_code(ErrorCode::V201)
                    .with_scene(scene.id)
                    .with_help("pick the scene this choice leads to"),
                );
                continue;
            };

            if !self.project.contains(target) {
                let label = if choice.label.trim().is_empty() {
                    format!("#{}", index + 1)
                } else {
                    choice.label.clone()
                };
                self.diagnostics.push(
                    Diagnostic::error(format!(
                        "Choice \"{label}\" in scene \"{}\" points to missing scene \"{target}\".",
                        scene.id
                    ))
                    .with_code(ErrorCode::V202)
                    .with_scene(scene.id)
                    .with_target(target),
                );
            }
        }

        if let Some(target) = scene.auto_next {
            self.check_auto_next(scene, target);
        }

        if scene.is_end() && !scene.choices.is_empty() {
            self.diagnostics.push(
                Diagnostic::warning(format!(
                    "End scene \"{}\" has choices that will be ignored.",
                    scene.id
                ))
                .with_code(ErrorCode::V206)
                .with_scene(scene.id)
                .with_help("remove the choices or change the scene type"),
            );
        }
    }

    fn check_auto_next(&mut self, scene: &Scene, target: Id) {
        if scene.is_end() {
            self.diagnostics.push(
                Diagnostic::error(format!(
                    "End scene \"{}\" cannot auto-advance to \"{target}\".",
                    scene.id
                ))
                .with_code(ErrorCode::V203)
                .with_scene(scene.id)
                .with_target(target),
            );
        }

        if !scene.choices.is_empty() {
            self.diagnostics.push(
                Diagnostic::error(format!(
                    "Scene \"{}\" cannot have both choices and an auto-advance target.",
                    scene.id
                ))
                .with_code(ErrorCode::V204)
                .with_scene(scene.id)
                .with_help("remove the choices or clear the auto-advance link"),
            );
        }

        if !self.project.contains(target) {
            self.diagnostics.push(
                Diagnostic::error(format!(
                    "Scene \"{}\" auto-advances to missing scene \"{target}\".",
                    scene.id
                ))
                .with_code(ErrorCode::V205)
                .with_scene(scene.id)
                .with_target(target),
            );
        }
    }

    fn check_reachability(&mut self) {
        let starts: Vec<Id> = self
            .project
            .scenes
            .iter()
            .filter(|scene| scene.is_start())
            .map(|scene| scene.id)
            .collect();
        let [start] = starts.as_slice() else {
            return;
        };

        let graph = StoryGraph::from_project(self.project);
        let reachable = graph.reachable_from(*start);
        for id in self.project.scene_ids() {
            if !reachable.contains(&id) {
                self.diagnostics.push(
                    Diagnostic::error(format!(
                        "Scene \"{id}\" is unreachable from the Start scene."
                    ))
                    .with_code(ErrorCode::V300)
                    .with_scene(id)
                    .with_help("link to it from a choice or an auto-advance target"),
                );
            }
        }
    }

    fn finish(self) -> Report {
        Report::new(self.diagnostics)
    }
}

/// Validates a project.
///
/// Never fails and never panics: every problem becomes a diagnostic.
pub fn validate(project: &Project) -> Report {
    let mut validator = Validator::new(project);

    validator.check_project();
    for scene in &project.scenes {
        validator.check_scene(scene);
    }
    validator.check_reachability();

    let report = validator.finish();
    debug!(
        scenes = project.len(),
        errors = report.errors().count(),
        warnings = report.warnings().count();
        "Project validated"
    );
    report
}

/// Validates a project snapshot that may be absent.
///
/// A missing snapshot yields a single [`ErrorCode::V000`] error.
pub fn validate_snapshot(project: Option<&Project>) -> Report {
    match project {
        Some(project) => validate(project),
        None => Diagnostic::error("Project data is missing.")
            .with_code(ErrorCode::V000)
            .into(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use roleplay_core::model::{ChoiceOptions, ProjectOptions, SceneOptions};

    use super::*;

    fn scene(id: &str, scene_type: SceneType) -> SceneOptions {
        SceneOptions::new().with_id(Id::new(id)).with_type(scene_type)
    }

    fn choice(label: &str, target: &str) -> ChoiceOptions {
        ChoiceOptions::new()
            .with_label(label)
            .with_next(Id::new(target))
    }

    fn codes(report: &Report) -> Vec<ErrorCode> {
        report.diagnostics().iter().filter_map(|d| d.code()).collect()
    }

    /// start -(choice)-> end
    fn minimal() -> Project {
        Project::from_options(
            ProjectOptions::new()
                .with_scene(scene("start", SceneType::Start).with_choice(choice("Go", "end")))
                .with_scene(scene("end", SceneType::End)),
        )
    }

    #[test]
    fn test_minimal_project_is_clean() {
        let report = validate(&minimal());

        assert!(report.is_empty(), "unexpected: {report}");
        assert!(report.is_playable());
    }

    #[test]
    fn test_missing_snapshot() {
        let report = validate_snapshot(None);

        assert_eq!(report.error_messages(), ["Project data is missing."]);
        assert_eq!(codes(&report), [ErrorCode::V000]);
    }

    #[test]
    fn test_present_snapshot_is_validated() {
        let project = minimal();

        assert_eq!(validate_snapshot(Some(&project)), validate(&project));
    }

    #[test]
    fn test_no_start_scene() {
        let project = Project::from_options(
            ProjectOptions::new()
                .with_scene(scene("a", SceneType::Intermediate).with_auto_next(Id::new("end")))
                .with_scene(scene("end", SceneType::End)),
        );

        let report = validate(&project);

        assert_eq!(
            report.error_messages(),
            ["Project must have exactly 1 start scene (found 0)."]
        );
    }

    #[test]
    fn test_two_start_scenes_skip_reachability() {
        let project = Project::from_options(
            ProjectOptions::new()
                .with_scene(scene("s1", SceneType::Start))
                .with_scene(scene("s2", SceneType::Start))
                .with_scene(scene("island", SceneType::Intermediate))
                .with_scene(scene("end", SceneType::End)),
        );

        let report = validate(&project);

        assert_eq!(codes(&report), [ErrorCode::V100]);
        assert!(report.error_messages()[0].contains("(found 2)"));
    }

    #[test]
    fn test_no_end_scene() {
        let project = Project::from_options(
            ProjectOptions::new().with_scene(scene("start", SceneType::Start)),
        );

        assert_eq!(codes(&validate(&project)), [ErrorCode::V101]);
    }

    #[test]
    fn test_too_many_end_scenes() {
        let options = ["e1", "e2", "e3", "e4"].into_iter().fold(
            ProjectOptions::new().with_scene(scene("start", SceneType::Start)),
            |options, id| options.with_scene(scene(id, SceneType::End)),
        );

        let report = validate(&Project::from_options(options));

        assert_eq!(
            report.error_messages()[0],
            "Project can have at most 3 end scenes (found 4)."
        );
    }

    #[test]
    fn test_scene_count_out_of_range() {
        let empty = Project {
            scenes: Vec::new(),
            ..Project::default()
        };

        let report = validate(&empty);

        assert_eq!(
            report.error_messages(),
            [
                "Project must have exactly 1 start scene (found 0).",
                "Project must have at least 1 end scene.",
                "Project must have 1–20 scenes (found 0).",
            ]
        );
    }

    #[test]
    fn test_too_many_choices() {
        let mut project = minimal();
        let mut start = (*project.scenes[0]).clone();
        let extra = start.choices[0].clone();
        start.choices.extend(std::iter::repeat_n(extra, 3));
        project.scenes[0] = Arc::new(start);

        let report = validate(&project);

        assert_eq!(
            report.error_messages(),
            ["Scene \"start\" has more than 3 choices (found 4)."]
        );
    }

    #[test]
    fn test_choice_without_destination() {
        let project = Project::from_options(
            ProjectOptions::new()
                .with_scene(
                    scene("start", SceneType::Start)
                        .with_choice(choice("Go", "end"))
                        .with_choice(ChoiceOptions::new().with_label("Wait")),
                )
                .with_scene(scene("end", SceneType::End)),
        );

        let report = validate(&project);

        assert_eq!(
            report.error_messages(),
            ["Choice 2 in scene \"start\" is missing a destination."]
        );
    }

    #[test]
    fn test_choice_to_unknown_scene() {
        let project = Project::from_options(
            ProjectOptions::new()
                .with_scene(
                    scene("start", SceneType::Start)
                        .with_choice(choice("Go", "end"))
                        .with_choice(choice("Fly", "sky")),
                )
                .with_scene(scene("end", SceneType::End)),
        );

        let report = validate(&project);

        let diag = &report.diagnostics()[0];
        assert_eq!(
            diag.message(),
            "Choice \"Fly\" in scene \"start\" points to missing scene \"sky\"."
        );
        assert_eq!(diag.scene(), Some(Id::new("start")));
        assert_eq!(diag.target(), Some(Id::new("sky")));
    }

    #[test]
    fn test_blank_choice_label_falls_back_to_position() {
        let project = Project::from_options(
            ProjectOptions::new()
                .with_scene(
                    scene("start", SceneType::Start)
                        .with_choice(choice("Go", "end"))
                        .with_choice(choice("  ", "sky")),
                )
                .with_scene(scene("end", SceneType::End)),
        );

        let report = validate(&project);

        assert_eq!(
            report.error_messages(),
            ["Choice \"#2\" in scene \"start\" points to missing scene \"sky\"."]
        );
    }

    #[test]
    fn test_end_scene_auto_advance() {
        let mut project = minimal();
        let mut end = (*project.scenes[1]).clone();
        end.auto_next = Some(Id::new("start"));
        project.scenes[1] = Arc::new(end);

        let report = validate(&project);

        assert_eq!(
            report.error_messages(),
            ["End scene \"end\" cannot auto-advance to \"start\"."]
        );
    }

    #[test]
    fn test_choices_mixed_with_auto_advance() {
        let mut project = minimal();
        let mut start = (*project.scenes[0]).clone();
        start.auto_next = Some(Id::new("end"));
        project.scenes[0] = Arc::new(start);

        let report = validate(&project);

        assert_eq!(
            report.error_messages(),
            ["Scene \"start\" cannot have both choices and an auto-advance target."]
        );
    }

    #[test]
    fn test_auto_advance_to_unknown_scene() {
        let project = Project::from_options(
            ProjectOptions::new()
                .with_scene(scene("start", SceneType::Start).with_auto_next(Id::new("void")))
                .with_scene(scene("end", SceneType::End)),
        );

        let report = validate(&project);

        assert_eq!(
            report.error_messages(),
            [
                "Scene \"start\" auto-advances to missing scene \"void\".",
                "Scene \"end\" is unreachable from the Start scene.",
            ]
        );
    }

    #[test]
    fn test_end_scene_with_choices_is_a_warning() {
        let mut project = minimal();
        let mut end = (*project.scenes[1]).clone();
        end.choices.push(project.scenes[0].choices[0].clone());
        project.scenes[1] = Arc::new(end);

        let report = validate(&project);

        assert!(report.is_playable());
        assert_eq!(
            report.warning_messages(),
            ["End scene \"end\" has choices that will be ignored."]
        );
    }

    #[test]
    fn test_unreachable_scenes_in_project_order() {
        let project = Project::from_options(
            ProjectOptions::new()
                .with_scene(scene("orphan-b", SceneType::Intermediate))
                .with_scene(scene("start", SceneType::Start).with_choice(choice("Go", "end")))
                .with_scene(scene("end", SceneType::End))
                .with_scene(scene("orphan-a", SceneType::Intermediate)),
        );

        let report = validate(&project);

        assert_eq!(
            report.error_messages(),
            [
                "Scene \"orphan-b\" is unreachable from the Start scene.",
                "Scene \"orphan-a\" is unreachable from the Start scene.",
            ]
        );
    }

    #[test]
    fn test_structural_before_reachability() {
        let project = Project::from_options(
            ProjectOptions::new()
                .with_scene(scene("island", SceneType::Intermediate))
                .with_scene(
                    scene("start", SceneType::Start)
                        .with_choice(choice("Go", "end"))
                        .with_choice(ChoiceOptions::new()),
                )
                .with_scene(scene("end", SceneType::End)),
        );

        let report = validate(&project);

        assert_eq!(codes(&report), [ErrorCode::V201, ErrorCode::V300]);
    }
}

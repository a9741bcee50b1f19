//! Roleplay - authoring and playing short branching stories.
//!
//! Editing, validation, layout, playback and storage for projects built
//! from the [`roleplay_core`] scene model. The [`Studio`] facade ties these
//! together for callers that just want to load, check, lay out, play and
//! save a project.

pub mod config;
pub mod edit;
pub mod editor;
pub mod layout;
pub mod player;
pub mod storage;
pub mod store;

mod error;

pub use roleplay_check::{Diagnostic, ErrorCode, Report, Severity, validate};
pub use roleplay_core::{graph, identifier, media, model};

pub use error::RoleplayError;

use std::{path::Path, sync::Arc};

use log::{debug, info};

use config::AppConfig;
use identifier::Id;
use layout::GraphLayout;
use media::HandleRegistry;
use model::{DialogueLine, Project, ProjectOptions, SceneOptions, SceneType};
use player::Player;
use storage::Bundle;

/// Facade over loading, checking, laying out, playing and saving projects.
///
/// A studio owns the [`HandleRegistry`] that issues display handles for the
/// media of every project it loads.
///
/// # Examples
///
/// ```rust
/// use roleplay::{Studio, config::AppConfig};
///
/// let studio = Studio::new(AppConfig::default());
/// let project = studio.scaffold("The Lighthouse");
///
/// let report = studio.check(&project).expect("scaffold is playable");
/// assert!(report.is_empty());
///
/// let layout = studio.layout(&project);
/// assert_eq!(layout.row_count(), 2);
/// ```
#[derive(Debug, Default)]
pub struct Studio {
    config: AppConfig,
    handles: HandleRegistry,
}

impl Studio {
    /// Create a studio with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            handles: HandleRegistry::new(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Returns the registry that issued the handles of loaded media.
    pub fn handles(&self) -> &HandleRegistry {
        &self.handles
    }

    /// Creates a minimal playable project: a start scene that continues to
    /// an end scene.
    pub fn scaffold(&self, title: &str) -> Project {
        let start = Id::fresh("scene");
        let end = Id::fresh("scene");
        let project = Project::from_options(
            ProjectOptions::new()
                .with_title(title)
                .with_scene(
                    SceneOptions::new()
                        .with_id(start)
                        .with_type(SceneType::Start)
                        .with_dialogue(vec![DialogueLine::new("Your story begins here.")])
                        .with_auto_next(end),
                )
                .with_scene(
                    SceneOptions::new()
                        .with_id(end)
                        .with_type(SceneType::End)
                        .with_dialogue(vec![DialogueLine::new("The end.")]),
                ),
        );
        debug!(title; "Project scaffolded");
        project
    }

    /// Load a project from a bundle directory or a JSON file.
    ///
    /// When `previous` is given, its display handles are released once the
    /// new project has been read.
    ///
    /// # Errors
    ///
    /// Returns `RoleplayError` for I/O failures, malformed JSON, unsupported
    /// manifest versions and media paths that escape the bundle.
    pub fn load(
        &mut self,
        path: impl AsRef<Path>,
        previous: Option<&Project>,
    ) -> Result<Project, RoleplayError> {
        let path = path.as_ref();
        info!(path:? = path; "Loading project");
        storage::load(path, previous, &mut self.handles)
    }

    /// Save `project` as a bundle directory.
    pub fn save(&self, dir: impl AsRef<Path>, project: &Project) -> Result<Bundle, RoleplayError> {
        storage::save_bundle(dir, project, self.config.storage())
    }

    /// Validate `project`.
    ///
    /// # Errors
    ///
    /// Returns [`RoleplayError::Invalid`] with the full report when it
    /// contains errors, or warnings while `validation.deny_warnings` is set.
    pub fn check(&self, project: &Project) -> Result<Report, RoleplayError> {
        let report = validate(project);
        info!(
            errors = report.errors().count(),
            warnings = report.warnings().count();
            "Project checked"
        );

        let denied = self.config.validation().deny_warnings() && report.has_warnings();
        if !report.is_playable() || denied {
            return Err(RoleplayError::Invalid(report));
        }
        Ok(report)
    }

    /// Compute the grid layout of `project`.
    pub fn layout(&self, project: &Project) -> GraphLayout {
        let layout = layout::layout(project);
        debug!(rows = layout.row_count(), columns = layout.column_count(); "Layout computed");
        layout
    }

    /// Start a play session.
    ///
    /// # Errors
    ///
    /// Returns [`player::PlayError::Blocked`] (wrapped) when the project has
    /// validation errors.
    pub fn play(&self, project: Arc<Project>) -> Result<Player, RoleplayError> {
        Ok(Player::begin(project, self.config.player())?)
    }
}

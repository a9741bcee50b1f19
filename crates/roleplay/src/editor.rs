//! Editing session bound to a [`Store`].
//!
//! An [`Editor`] owns the display handle source and runs the operations of
//! [`crate::edit`] against the store's current project. Each accepted edit
//! is published with [`Store::set`]; a rejected edit leaves the store
//! untouched and notifies nobody.

use std::{path::Path, sync::Arc};

use log::{debug, warn};

use roleplay_core::{
    identifier::Id,
    media::{Blob, DisplayHandles},
    model::{Project, SceneType},
};

use crate::{
    edit::{self, EditError},
    error::RoleplayError,
    storage::{self, ProjectDocument},
    store::{StatePatch, Store},
};

/// Applies edits to the project held by a [`Store`].
#[derive(Debug)]
pub struct Editor<H: DisplayHandles> {
    store: Store,
    handles: H,
}

impl<H: DisplayHandles> Editor<H> {
    pub fn new(store: Store, handles: H) -> Self {
        Self { store, handles }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn handles(&self) -> &H {
        &self.handles
    }

    /// Returns the project currently held by the store.
    pub fn project(&self) -> Arc<Project> {
        self.store.project()
    }

    /// Runs `operation` on the current project and publishes the result.
    ///
    /// `action` names the operation in log output.
    pub fn apply<T>(
        &mut self,
        action: &str,
        operation: impl FnOnce(&Project, &mut dyn DisplayHandles) -> Result<(Project, T), EditError>,
    ) -> Result<T, EditError> {
        let current = self.store.project();
        match operation(&current, &mut self.handles) {
            Ok((next, value)) => {
                debug!(action = action; "Edit applied");
                self.store.set(StatePatch::project(next));
                Ok(value)
            }
            Err(err) => {
                warn!(action = action, err:% = err; "Edit rejected");
                Err(err)
            }
        }
    }

    /// Like [`apply`](Self::apply), for operations that only produce a
    /// project.
    pub fn edit(
        &mut self,
        action: &str,
        operation: impl FnOnce(&Project, &mut dyn DisplayHandles) -> Result<Project, EditError>,
    ) -> Result<(), EditError> {
        self.apply(action, |project, handles| {
            operation(project, handles).map(|next| (next, ()))
        })
    }

    /// Appends a scene and returns its id.
    pub fn add_scene(&mut self, scene_type: SceneType) -> Result<Id, EditError> {
        self.apply("add_scene", |project, _| edit::add_scene(project, scene_type))
    }

    /// Deletes a scene, releasing its media handles.
    pub fn delete_scene(&mut self, id: Id) -> Result<(), EditError> {
        self.edit("delete_scene", |project, handles| {
            edit::delete_scene(project, id, handles)
        })
    }

    /// Replaces the current project with one rebuilt from `document`.
    ///
    /// The handles of the current project are released first.
    pub fn load_document(
        &mut self,
        document: ProjectDocument,
        resolve: &dyn Fn(&str) -> Option<Blob>,
    ) {
        let current = self.store.project();
        let project = storage::hydrate(document, resolve, Some(&current), &mut self.handles);
        self.store.set(StatePatch::project(project));
    }

    /// Loads a project from disk into the store.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<(), RoleplayError> {
        let current = self.store.project();
        let project = storage::load(path, Some(&current), &mut self.handles)?;
        self.store.set(StatePatch::project(project));
        Ok(())
    }
}

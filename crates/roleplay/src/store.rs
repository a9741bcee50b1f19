//! Synchronous publish/subscribe state container.
//!
//! The [`Store`] holds the current [`State`]: the project snapshot being
//! edited or played, and whether audio playback has been unlocked by the
//! user. [`Store::set`] merges a [`StatePatch`] and notifies every listener,
//! in registration order, before returning.
//!
//! The store is single-threaded. Clones share the same state and listeners.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::{Rc, Weak},
    sync::Arc,
};

use log::{debug, trace};

use roleplay_core::model::Project;

/// Snapshot of the application state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct State {
    pub project: Arc<Project>,
    /// Set once the user has interacted, allowing audio playback.
    pub audio_gate: bool,
}

/// Partial update for [`Store::set`]. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct StatePatch {
    pub project: Option<Arc<Project>>,
    pub audio_gate: Option<bool>,
}

impl StatePatch {
    pub fn project(project: impl Into<Arc<Project>>) -> Self {
        Self {
            project: Some(project.into()),
            audio_gate: None,
        }
    }

    pub fn audio_gate(open: bool) -> Self {
        Self {
            project: None,
            audio_gate: Some(open),
        }
    }
}

type Listener = Rc<RefCell<dyn FnMut(&State)>>;

#[derive(Default)]
struct Inner {
    state: RefCell<State>,
    listeners: RefCell<Vec<(u64, Listener)>>,
    next_id: Cell<u64>,
}

impl Inner {
    fn is_subscribed(&self, id: u64) -> bool {
        self.listeners.borrow().iter().any(|(lid, _)| *lid == id)
    }

    fn remove(&self, id: u64) {
        self.listeners.borrow_mut().retain(|(lid, _)| *lid != id);
    }
}

/// Shared, observable application state.
#[derive(Clone, Default)]
pub struct Store {
    inner: Rc<Inner>,
}

impl Store {
    /// Creates a store holding `state`.
    pub fn new(state: State) -> Self {
        Self {
            inner: Rc::new(Inner {
                state: RefCell::new(state),
                ..Inner::default()
            }),
        }
    }

    /// Returns the current state.
    pub fn get(&self) -> State {
        self.inner.state.borrow().clone()
    }

    /// Returns the current project snapshot.
    pub fn project(&self) -> Arc<Project> {
        Arc::clone(&self.inner.state.borrow().project)
    }

    /// Merges `patch` into the state and notifies every listener.
    ///
    /// Listeners run synchronously in registration order. A listener that
    /// unsubscribes another listener during a notification prevents it from
    /// being called for that notification. A listener is never re-entered:
    /// if it calls `set` itself, it is skipped for the nested notification.
    pub fn set(&self, patch: StatePatch) {
        let state = {
            let mut state = self.inner.state.borrow_mut();
            if let Some(project) = patch.project {
                state.project = project;
            }
            if let Some(audio_gate) = patch.audio_gate {
                state.audio_gate = audio_gate;
            }
            state.clone()
        };

        let listeners: Vec<(u64, Listener)> = self.inner.listeners.borrow().clone();
        trace!(listeners = listeners.len(); "Notifying store listeners");
        for (id, listener) in listeners {
            if !self.inner.is_subscribed(id) {
                continue;
            }
            match listener.try_borrow_mut() {
                Ok(mut listener) => (&mut *listener)(&state),
                Err(_) => trace!(listener = id; "Skipping re-entrant store listener"),
            }
        }
    }

    /// Registers `listener`. It is called on every [`set`](Self::set) until
    /// the returned [`Subscription`] is unsubscribed.
    pub fn subscribe(&self, listener: impl FnMut(&State) + 'static) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        let listener: Listener = Rc::new(RefCell::new(listener));
        self.inner.listeners.borrow_mut().push((id, listener));
        Subscription {
            id,
            store: Rc::downgrade(&self.inner),
        }
    }

    /// Opens the audio gate. Does nothing, and notifies nobody, if it is
    /// already open.
    pub fn unlock_audio(&self) {
        if self.inner.state.borrow().audio_gate {
            return;
        }
        debug!("Audio unlocked");
        self.set(StatePatch::audio_gate(true));
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.inner.state.borrow())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Handle returned by [`Store::subscribe`].
///
/// Dropping a subscription does not unsubscribe; call
/// [`unsubscribe`](Subscription::unsubscribe).
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    store: Weak<Inner>,
}

impl Subscription {
    /// Removes the listener. Safe to call from inside a notification, and
    /// after the store itself is gone.
    pub fn unsubscribe(self) {
        if let Some(inner) = self.store.upgrade() {
            inner.remove(self.id);
        }
    }
}

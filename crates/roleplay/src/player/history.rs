//! Visited-scene history with a movable cursor.

use std::sync::Arc;

use roleplay_core::model::Scene;

/// Ordered list of visited scenes and the position of the current one.
///
/// Moving back or jumping only moves the cursor. Visiting a new scene drops
/// every entry after the cursor first, like a browser history.
#[derive(Debug, Clone)]
pub(crate) struct History {
    entries: Vec<Arc<Scene>>,
    cursor: usize,
}

impl History {
    pub(crate) fn new(first: Arc<Scene>) -> Self {
        Self {
            entries: vec![first],
            cursor: 0,
        }
    }

    pub(crate) fn current(&self) -> &Arc<Scene> {
        &self.entries[self.cursor]
    }

    pub(crate) fn entries(&self) -> &[Arc<Scene>] {
        &self.entries
    }

    pub(crate) fn cursor(&self) -> usize {
        self.cursor
    }

    /// Records a visit to `scene` after the current entry.
    pub(crate) fn visit(&mut self, scene: Arc<Scene>) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(scene);
        self.cursor = self.entries.len() - 1;
    }

    pub(crate) fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub(crate) fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub(crate) fn back(&mut self) -> bool {
        if !self.can_go_back() {
            return false;
        }
        self.cursor -= 1;
        true
    }

    pub(crate) fn forward(&mut self) -> bool {
        if !self.can_go_forward() {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Moves the cursor to `index`. Returns `false` if out of range.
    pub(crate) fn jump(&mut self, index: usize) -> bool {
        if index >= self.entries.len() {
            return false;
        }
        self.cursor = index;
        true
    }
}

/// Shortens `text` to at most `max` glyphs, ending with `…` when cut.
pub(crate) fn truncate_label(text: &str, max: usize) -> String {
    let max = max.max(1);
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut label: String = text.chars().take(max - 1).collect();
    label.push('…');
    label
}

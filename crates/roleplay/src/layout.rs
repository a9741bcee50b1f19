//! Layered grid layout for the story graph.
//!
//! Scenes are placed on a grid of rows and columns:
//!
//! - rows follow breadth-first depth from the start scene (or the first scene
//!   when there is no start scene), first visit wins;
//! - all end scenes share a single ending row, which is always the last row;
//! - scenes the traversal never reaches get one row each, in project order,
//!   just above the ending row;
//! - within a row, columns follow discovery order.
//!
//! The result only depends on the project value, so equal projects always
//! lay out identically.

use std::collections::{BTreeSet, HashMap};

use indexmap::IndexMap;
use log::{debug, trace};
use serde::Serialize;

use roleplay_core::{
    graph::StoryGraph,
    identifier::Id,
    model::{Project, SceneType},
};

/// Grid cell of a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GridPosition {
    pub row: usize,
    pub column: usize,
}

impl GridPosition {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

/// Grid placement of every scene of a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphLayout {
    positions: IndexMap<Id, GridPosition>,
    ordered_ids: Vec<Id>,
    row_count: usize,
    column_count: usize,
}

impl GraphLayout {
    /// Positions keyed by scene id, in [`ordered_ids`](Self::ordered_ids)
    /// order.
    pub fn positions(&self) -> &IndexMap<Id, GridPosition> {
        &self.positions
    }

    pub fn position(&self, id: Id) -> Option<GridPosition> {
        self.positions.get(&id).copied()
    }

    /// Scene ids in traversal order, followed by unvisited end scenes, then
    /// unreachable scenes.
    pub fn ordered_ids(&self) -> &[Id] {
        &self.ordered_ids
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    /// Scene ids grouped by row, each row ordered by column.
    pub fn rows(&self) -> Vec<Vec<Id>> {
        let mut rows = vec![Vec::new(); self.row_count];
        for (id, position) in &self.positions {
            rows[position.row].push(*id);
        }
        rows
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Computes the grid layout of `project`.
pub fn layout(project: &Project) -> GraphLayout {
    let Some(root) = project.entry_scene().map(|scene| scene.id) else {
        return GraphLayout::default();
    };

    let graph = StoryGraph::from_project(project);

    // Raw rows in assignment order; the key order becomes `ordered_ids`.
    let mut rows: IndexMap<Id, usize> = graph.depths_from(root);
    let max_row = rows.values().copied().max().unwrap_or(0);

    let ending_row = pin_end_scenes(project, &graph, &mut rows, max_row);

    let mut next_row = rows.values().copied().max().map_or(0, |row| row + 1);
    for id in graph.scene_ids() {
        if !rows.contains_key(&id) {
            trace!(scene:% = id, row = next_row; "Placing unreachable scene");
            rows.insert(id, next_row);
            next_row += 1;
        }
    }

    let renumber = compact_rows(rows.values().copied(), ending_row);

    let mut columns = vec![0usize; renumber.len()];
    let mut positions = IndexMap::with_capacity(rows.len());
    for (id, raw_row) in &rows {
        let row = renumber[raw_row];
        positions.insert(*id, GridPosition::new(row, columns[row]));
        columns[row] += 1;
    }

    let layout = GraphLayout {
        ordered_ids: rows.keys().copied().collect(),
        row_count: renumber.len(),
        column_count: columns.into_iter().max().unwrap_or(0),
        positions,
    };
    debug!(
        rows = layout.row_count,
        columns = layout.column_count;
        "Layout computed"
    );
    layout
}

/// Moves every end scene onto one shared ending row and returns that row.
///
/// Returns `None` when the project has no end scenes.
fn pin_end_scenes(
    project: &Project,
    graph: &StoryGraph,
    rows: &mut IndexMap<Id, usize>,
    max_row: usize,
) -> Option<usize> {
    let is_end = |id: Id| graph.scene_type(id) == Some(SceneType::End);
    if !graph.scene_ids().any(is_end) {
        return None;
    }

    let visited_end_row = rows
        .iter()
        .filter(|(id, _)| is_end(**id))
        .map(|(_, row)| *row)
        .max();
    let ending_row = match visited_end_row {
        Some(row) => max_row.max(row),
        None => max_row + 1,
    };

    for (id, row) in rows.iter_mut() {
        if is_end(*id) {
            *row = ending_row;
        }
    }
    for scene in project.scenes.iter().filter(|scene| is_end(scene.id)) {
        rows.entry(scene.id).or_insert(ending_row);
    }

    Some(ending_row)
}

/// Maps raw row numbers to dense 0-based indices, ascending, with the ending
/// row (if any) last.
fn compact_rows(
    raw: impl Iterator<Item = usize>,
    ending_row: Option<usize>,
) -> HashMap<usize, usize> {
    let mut distinct: BTreeSet<usize> = raw.collect();
    let mut order: Vec<usize> = Vec::with_capacity(distinct.len());
    if let Some(ending_row) = ending_row {
        distinct.remove(&ending_row);
        order.extend(distinct);
        order.push(ending_row);
    } else {
        order.extend(distinct);
    }
    order
        .into_iter()
        .enumerate()
        .map(|(index, raw)| (raw, index))
        .collect()
}

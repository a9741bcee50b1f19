//! Directed story graph derived from a project.
//!
//! One node per scene, one link per choice or auto-advance whose destination
//! exists. Links to unknown scenes are not materialized; they are only
//! counted, so traversal never has to deal with them.
//!
//! The graph is shared by the validator's reachability sweep and the layout
//! engine. It is rebuilt from scratch for every snapshot.

use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::IndexMap;
use log::trace;

use crate::{
    identifier::Id,
    model::{Project, SceneType},
};

/// Index of a link in a [`StoryGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkIndex(usize);

/// How a link leaves its source scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// The choice at `index` in the source scene.
    Choice { index: usize },
    /// The scene's auto-advance target.
    AutoAdvance,
}

/// A directed link between two existing scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub source: Id,
    pub target: Id,
    pub kind: LinkKind,
}

/// Directed graph over a project's scenes.
///
/// Self-loops and repeated links between the same pair of scenes are kept.
#[derive(Debug, Default)]
pub struct StoryGraph {
    nodes: HashMap<Id, SceneType>,
    order: Vec<Id>,
    links: Vec<Link>,
    incoming: HashMap<Id, Vec<LinkIndex>>,
    outgoing: HashMap<Id, Vec<LinkIndex>>,
    dangling: usize,
}

impl StoryGraph {
    /// Builds the graph for `project`.
    ///
    /// If two scenes share an id, the later one wins and the id keeps the
    /// position of its first occurrence.
    pub fn from_project(project: &Project) -> Self {
        let mut graph = Self::default();

        for scene in &project.scenes {
            graph.add_node(scene.id, scene.scene_type);
        }

        for scene in &project.scenes {
            for (index, choice) in scene.choices.iter().enumerate() {
                if let Some(target) = choice.next {
                    graph.add_link(scene.id, target, LinkKind::Choice { index });
                }
            }
            if let Some(target) = scene.auto_next {
                graph.add_link(scene.id, target, LinkKind::AutoAdvance);
            }
        }

        trace!(
            nodes = graph.order.len(),
            links = graph.links.len(),
            dangling = graph.dangling;
            "Story graph built"
        );
        graph
    }

    fn add_node(&mut self, id: Id, scene_type: SceneType) {
        if self.nodes.insert(id, scene_type).is_none() {
            self.order.push(id);
        }
    }

    fn add_link(&mut self, source: Id, target: Id, kind: LinkKind) {
        if !self.nodes.contains_key(&target) {
            self.dangling += 1;
            return;
        }

        self.links.push(Link {
            source,
            target,
            kind,
        });
        let idx = LinkIndex(self.links.len() - 1);
        self.outgoing.entry(source).or_default().push(idx);
        self.incoming.entry(target).or_default().push(idx);
    }

    /// Returns the number of scenes.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: Id) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn scene_type(&self, id: Id) -> Option<SceneType> {
        self.nodes.get(&id).copied()
    }

    /// Returns scene ids in project order.
    pub fn scene_ids(&self) -> impl Iterator<Item = Id> + '_ {
        self.order.iter().copied()
    }

    /// Returns every materialized link in insertion order.
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.iter()
    }

    pub fn link(&self, idx: LinkIndex) -> Option<&Link> {
        self.links.get(idx.0)
    }

    /// Returns the links leaving `id`: choices in order, then auto-advance.
    pub fn outgoing(&self, id: Id) -> impl Iterator<Item = &Link> {
        self.outgoing
            .get(&id)
            .into_iter()
            .flatten()
            .map(|idx| &self.links[idx.0])
    }

    /// Returns the links arriving at `id`.
    pub fn incoming(&self, id: Id) -> impl Iterator<Item = &Link> {
        self.incoming
            .get(&id)
            .into_iter()
            .flatten()
            .map(|idx| &self.links[idx.0])
    }

    /// Returns the distinct scenes directly reachable from `id`, in
    /// first-seen order.
    pub fn outgoing_targets(&self, id: Id) -> Vec<Id> {
        let mut seen = HashSet::new();
        self.outgoing(id)
            .map(|link| link.target)
            .filter(|target| seen.insert(*target))
            .collect()
    }

    /// Returns the number of choices and auto-advance links whose
    /// destination does not exist.
    pub fn dangling_count(&self) -> usize {
        self.dangling
    }

    /// Returns scenes without incoming links, in project order.
    pub fn roots(&self) -> impl Iterator<Item = Id> + '_ {
        self.order
            .iter()
            .copied()
            .filter(|id| !self.incoming.contains_key(id))
    }

    /// Breadth-first depths from `root`.
    ///
    /// The first visit of a scene fixes its depth. The returned map is in
    /// visitation order. An unknown root yields an empty map.
    pub fn depths_from(&self, root: Id) -> IndexMap<Id, usize> {
        let mut depths = IndexMap::new();
        if !self.contains(root) {
            return depths;
        }

        let mut queue = VecDeque::from([(root, 0)]);
        depths.insert(root, 0);
        while let Some((id, depth)) = queue.pop_front() {
            for target in self.outgoing_targets(id) {
                if !depths.contains_key(&target) {
                    depths.insert(target, depth + 1);
                    queue.push_back((target, depth + 1));
                }
            }
        }
        depths
    }

    /// Returns every scene reachable from `root`, including `root` itself.
    pub fn reachable_from(&self, root: Id) -> HashSet<Id> {
        self.depths_from(root).into_keys().collect()
    }
}

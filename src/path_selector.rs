//! Hierarchical path selector.
//!
//! A small per-field state machine over the category forest. State is either
//! a chain of chosen names at increasing depth, or a committed freeform value.
//! Stored values round-trip through [`PathSelector::load`], which downgrades
//! to freeform whenever the full chain no longer matches the tree.

use crate::category_tree::{node_at, CategoryNode};

/// Separator between path segments in the committed value.
pub const PATH_SEPARATOR: &str = " / ";

#[derive(Debug, Clone, PartialEq, Eq)]
enum SelectorState {
    /// Chosen names by depth; may be a partial selection.
    Path(Vec<String>),
    /// "Other" was chosen; the committed value is the raw text.
    Freeform(String),
}

#[derive(Debug, Clone)]
pub struct PathSelector<'f> {
    forest: &'f [CategoryNode],
    state: SelectorState,
}

impl<'f> PathSelector<'f> {
    pub fn new(forest: &'f [CategoryNode]) -> Self {
        Self {
            forest,
            state: SelectorState::Path(Vec::new()),
        }
    }

    /// Candidate names at `depth`, given the choices above it. Depth 0 lists
    /// the forest roots. `None` when the chain above `depth` is incomplete
    /// or freeform mode is committed.
    pub fn options_at(&self, depth: usize) -> Option<Vec<&'f str>> {
        let chosen = match &self.state {
            SelectorState::Path(chosen) => chosen,
            SelectorState::Freeform(_) => return None,
        };
        if depth > chosen.len() {
            return None;
        }
        if depth == 0 {
            return Some(self.forest.iter().map(|n| n.name.as_str()).collect());
        }
        let node = node_at(self.forest, &chosen[..depth])?;
        Some(node.children.iter().map(|n| n.name.as_str()).collect())
    }

    /// Choose a concrete node at `depth`. Any deeper selection is discarded.
    /// Returns true while the chosen node has children (selection continues),
    /// false when it is a leaf (selection terminates).
    pub fn choose(&mut self, depth: usize, name: &str) -> bool {
        let Some(options) = self.options_at(depth) else {
            return false;
        };
        if !options.contains(&name) {
            return false;
        }

        // options_at only yields options in path state.
        if let SelectorState::Path(chosen) = &mut self.state {
            chosen.truncate(depth);
            chosen.push(name.to_string());
            return node_at(self.forest, chosen)
                .map(|node| !node.children.is_empty())
                .unwrap_or(false);
        }
        false
    }

    /// Choose "other" at `depth`: discard deeper choices and commit the raw
    /// text as the value.
    pub fn choose_other(&mut self, text: impl Into<String>) {
        self.state = SelectorState::Freeform(text.into());
    }

    /// Re-derive state from a stored value by walking the tree name-by-name.
    /// A chain that does not fully match is kept as freeform text.
    pub fn load(&mut self, value: &str) {
        if value.is_empty() {
            self.state = SelectorState::Path(Vec::new());
            return;
        }

        let names: Vec<String> = value.split(PATH_SEPARATOR).map(str::to_string).collect();
        for depth in 1..=names.len() {
            if node_at(self.forest, &names[..depth]).is_none() {
                self.state = SelectorState::Freeform(value.to_string());
                return;
            }
        }
        self.state = SelectorState::Path(names);
    }

    /// Selection is done: either freeform was committed, or the deepest chosen
    /// node is a leaf.
    pub fn is_complete(&self) -> bool {
        match &self.state {
            SelectorState::Freeform(_) => true,
            SelectorState::Path(chosen) if chosen.is_empty() => false,
            SelectorState::Path(chosen) => node_at(self.forest, chosen)
                .map(|node| node.children.is_empty())
                .unwrap_or(false),
        }
    }

    pub fn is_freeform(&self) -> bool {
        matches!(self.state, SelectorState::Freeform(_))
    }

    /// The committed value: chosen names joined by [`PATH_SEPARATOR`], or the
    /// raw freeform text.
    pub fn value(&self) -> String {
        match &self.state {
            SelectorState::Path(chosen) => chosen.join(PATH_SEPARATOR),
            SelectorState::Freeform(text) => text.clone(),
        }
    }
}

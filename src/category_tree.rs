//! Flat-row to category-forest builder.
//!
//! The directory source hands us flat `{id, name, parentId}` rows per scope.
//! Building is a two-pass arena walk: index every row by id, then attach each
//! node to its parent's child list in source order. Rows whose parent chain
//! does not resolve to a root are excluded entirely: they become neither a
//! root nor a child. That covers both dangling parent ids and parent cycles;
//! the source data is never auto-repaired.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One flat category row as delivered by the directory source.
/// `parent_id == 0` (or absent in the source) marks a root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRow {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub parent_id: u32,
}

impl CategoryRow {
    pub fn new(id: u32, name: impl Into<String>, parent_id: u32) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id,
        }
    }
}

/// A node in the built forest. Built once per session, read-only afterward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryNode {
    pub name: String,
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }
}

/// Build the category forest for one scope.
pub fn build_forest(rows: &[CategoryRow]) -> Vec<CategoryNode> {
    // Pass 1: index rows by id. A duplicate id keeps the first occurrence,
    // matching source order everywhere else in the build.
    let mut index: HashMap<u32, usize> = HashMap::new();
    for (pos, row) in rows.iter().enumerate() {
        index.entry(row.id).or_insert(pos);
    }

    // Pass 2: attach children in source order, skipping rows whose parent
    // chain never reaches a root.
    let mut children_of: Vec<Vec<usize>> = vec![Vec::new(); rows.len()];
    let mut roots: Vec<usize> = Vec::new();

    for (pos, row) in rows.iter().enumerate() {
        if !resolves_to_root(rows, &index, pos) {
            log::warn!(
                "category row {} ({:?}) has an unresolvable parent chain; excluding",
                row.id,
                row.name
            );
            continue;
        }
        if row.parent_id == 0 {
            roots.push(pos);
        } else if let Some(&parent_pos) = index.get(&row.parent_id) {
            children_of[parent_pos].push(pos);
        }
    }

    roots
        .into_iter()
        .map(|pos| materialize(rows, &children_of, pos))
        .collect()
}

/// Concatenate per-scope forests in scope order. This is the effective tree a
/// supervisor sees across all permitted scopes; an owner passes a single scope.
pub fn combined_forest(
    scopes: &[String],
    rows_by_scope: &HashMap<String, Vec<CategoryRow>>,
) -> Vec<CategoryNode> {
    let mut forest = Vec::new();
    for scope in scopes {
        if let Some(rows) = rows_by_scope.get(scope) {
            forest.extend(build_forest(rows));
        }
    }
    forest
}

/// Walk the parent chain with a visited set. Returns true only when the chain
/// terminates at a root (`parent_id == 0`). A dangling id or a cycle fails.
fn resolves_to_root(rows: &[CategoryRow], index: &HashMap<u32, usize>, start: usize) -> bool {
    let mut visited: Vec<u32> = Vec::new();
    let mut current = start;
    loop {
        let row = &rows[current];
        if visited.contains(&row.id) {
            return false; // parent cycle
        }
        visited.push(row.id);

        if row.parent_id == 0 {
            return true;
        }
        match index.get(&row.parent_id) {
            Some(&parent_pos) => current = parent_pos,
            None => return false, // dangling parent id
        }
    }
}

fn materialize(rows: &[CategoryRow], children_of: &[Vec<usize>], pos: usize) -> CategoryNode {
    CategoryNode {
        name: rows[pos].name.clone(),
        children: children_of[pos]
            .iter()
            .map(|&child| materialize(rows, children_of, child))
            .collect(),
    }
}

/// Find the node reached by following `names` from the forest roots.
pub fn node_at<'f>(forest: &'f [CategoryNode], names: &[String]) -> Option<&'f CategoryNode> {
    let (first, rest) = names.split_first()?;
    let mut node = forest.iter().find(|n| &n.name == first)?;
    for name in rest {
        node = node.children.iter().find(|n| &n.name == name)?;
    }
    Some(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<CategoryRow> {
        vec![
            CategoryRow::new(1, "Work", 0),
            CategoryRow::new(2, "Projects", 1),
            CategoryRow::new(3, "Admin", 1),
            CategoryRow::new(4, "Alpha", 2),
            CategoryRow::new(5, "Personal", 0),
        ]
    }

    #[test]
    fn test_two_trees_built_in_source_order() {
        let forest = build_forest(&rows());
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].name, "Work");
        assert_eq!(forest[1].name, "Personal");
        assert_eq!(forest[0].children[0].name, "Projects");
        assert_eq!(forest[0].children[1].name, "Admin");
        assert_eq!(forest[0].children[0].children[0].name, "Alpha");
    }

    #[test]
    fn test_dangling_parent_excluded_everywhere() {
        let mut data = rows();
        data.push(CategoryRow::new(6, "Orphan", 99));
        let forest = build_forest(&data);

        fn contains(nodes: &[CategoryNode], name: &str) -> bool {
            nodes
                .iter()
                .any(|n| n.name == name || contains(&n.children, name))
        }
        assert!(!contains(&forest, "Orphan"));
        assert_eq!(forest.len(), 2); // never promoted to root either
    }

    #[test]
    fn test_descendant_of_dangling_parent_also_excluded() {
        let data = vec![
            CategoryRow::new(1, "Root", 0),
            CategoryRow::new(2, "Floating", 99),
            CategoryRow::new(3, "Child of floating", 2),
        ];
        let forest = build_forest(&data);
        assert_eq!(forest.len(), 1);
        assert!(forest[0].children.is_empty());
    }

    #[test]
    fn test_parent_cycle_does_not_loop_and_is_excluded() {
        let data = vec![
            CategoryRow::new(1, "A", 2),
            CategoryRow::new(2, "B", 1),
            CategoryRow::new(3, "Root", 0),
        ];
        let forest = build_forest(&data);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].name, "Root");
    }

    #[test]
    fn test_combined_forest_concatenates_scopes_in_order() {
        let mut by_scope = HashMap::new();
        by_scope.insert("east".to_string(), vec![CategoryRow::new(1, "Sales", 0)]);
        by_scope.insert("west".to_string(), vec![CategoryRow::new(1, "Support", 0)]);

        let scopes = vec!["west".to_string(), "east".to_string()];
        let forest = combined_forest(&scopes, &by_scope);
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].name, "Support");
        assert_eq!(forest[1].name, "Sales");
    }

    #[test]
    fn test_node_at_walks_names() {
        let forest = build_forest(&rows());
        let names = vec!["Work".to_string(), "Projects".to_string()];
        let node = node_at(&forest, &names).unwrap();
        assert_eq!(node.children[0].name, "Alpha");
        assert!(node_at(&forest, &["Nope".to_string()]).is_none());
    }
}

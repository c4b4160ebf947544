//! Category tree built from the flat list the API returns.

use std::collections::{HashMap, HashSet};

use crate::models::Category;
use crate::types::CategoryId;

/// A category with its child categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryNode {
    pub category: Category,
    pub children: Vec<CategoryNode>,
}

/// One line of the flattened tree, in depth-first order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub category: Category,
    pub depth: usize,
    pub has_children: bool,
}

/// Categories arranged as a forest.
///
/// Every input category appears exactly once. A category whose parent is
/// missing from the input (or is itself) is a root. Categories caught in a
/// parent cycle are unreachable from the roots; each such cycle is broken at
/// its first category in input order, which becomes a root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTree {
    roots: Vec<CategoryNode>,
    len: usize,
}

impl CategoryTree {
    /// Build the tree. Siblings keep their input order.
    #[must_use]
    pub fn build(categories: &[Category]) -> Self {
        // Pass 1: index ids.
        let known: HashSet<&CategoryId> = categories.iter().map(|c| &c.id).collect();

        // Pass 2: attach each category to its parent or to the roots.
        let mut children: HashMap<&CategoryId, Vec<usize>> = HashMap::new();
        let mut root_indices = Vec::new();
        for (index, category) in categories.iter().enumerate() {
            match &category.parent {
                Some(parent) if parent != &category.id && known.contains(parent) => {
                    children.entry(parent).or_default().push(index);
                }
                _ => root_indices.push(index),
            }
        }

        let mut visited = vec![false; categories.len()];
        let mut roots: Vec<CategoryNode> = root_indices
            .into_iter()
            .filter_map(|index| assemble(categories, &children, index, &mut visited))
            .collect();

        // Anything left over sits on a parent cycle.
        for index in 0..categories.len() {
            if !visited.get(index).copied().unwrap_or(true)
                && let Some(node) = assemble(categories, &children, index, &mut visited)
            {
                roots.push(node);
            }
        }

        Self {
            roots,
            len: categories.len(),
        }
    }

    /// Top-level categories.
    #[must_use]
    pub fn roots(&self) -> &[CategoryNode] {
        &self.roots
    }

    /// Number of categories in the tree.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no categories.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Find a node by id.
    #[must_use]
    pub fn find(&self, id: &CategoryId) -> Option<&CategoryNode> {
        fn search<'a>(nodes: &'a [CategoryNode], id: &CategoryId) -> Option<&'a CategoryNode> {
            nodes.iter().find_map(|node| {
                if &node.category.id == id {
                    Some(node)
                } else {
                    search(&node.children, id)
                }
            })
        }
        search(&self.roots, id)
    }

    /// Depth-first rows for rendering.
    #[must_use]
    pub fn rows(&self) -> Vec<TreeRow> {
        fn walk(nodes: &[CategoryNode], depth: usize, out: &mut Vec<TreeRow>) {
            for node in nodes {
                out.push(TreeRow {
                    category: node.category.clone(),
                    depth,
                    has_children: !node.children.is_empty(),
                });
                walk(&node.children, depth + 1, out);
            }
        }

        let mut out = Vec::with_capacity(self.len);
        walk(&self.roots, 0, &mut out);
        out
    }

    /// Ids of every category below `id`.
    #[must_use]
    pub fn descendant_ids(&self, id: &CategoryId) -> HashSet<CategoryId> {
        fn collect(node: &CategoryNode, out: &mut HashSet<CategoryId>) {
            for child in &node.children {
                out.insert(child.category.id.clone());
                collect(child, out);
            }
        }

        let mut out = HashSet::new();
        if let Some(node) = self.find(id) {
            collect(node, &mut out);
        }
        out
    }

    /// Categories that may become the new parent of `id` without creating a
    /// cycle: everything except `id` itself and its descendants.
    #[must_use]
    pub fn parent_options(&self, id: &CategoryId) -> Vec<TreeRow> {
        let excluded = self.descendant_ids(id);
        self.rows()
            .into_iter()
            .filter(|row| &row.category.id != id && !excluded.contains(&row.category.id))
            .collect()
    }
}

fn assemble(
    categories: &[Category],
    children: &HashMap<&CategoryId, Vec<usize>>,
    index: usize,
    visited: &mut [bool],
) -> Option<CategoryNode> {
    let category = categories.get(index)?.clone();
    if let Some(seen) = visited.get_mut(index) {
        *seen = true;
    }

    let mut children_nodes = Vec::new();
    for &child in children.get(&category.id).into_iter().flatten() {
        if visited.get(child).copied().unwrap_or(true) {
            continue;
        }
        if let Some(node) = assemble(categories, children, child, visited) {
            children_nodes.push(node);
        }
    }

    Some(CategoryNode {
        category,
        children: children_nodes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: &str, parent: Option<&str>) -> Category {
        Category {
            id: CategoryId::new(id),
            name: id.to_uppercase(),
            description: String::new(),
            parent: parent.map(CategoryId::new),
            is_active: true,
            images: Vec::new(),
        }
    }

    fn flat() -> Vec<Category> {
        vec![
            category("roses", Some("flowers")),
            category("flowers", None),
            category("plants", None),
            category("red-roses", Some("roses")),
            category("tulips", Some("flowers")),
        ]
    }

    fn row_ids(tree: &CategoryTree) -> Vec<(String, usize)> {
        tree.rows()
            .into_iter()
            .map(|r| (r.category.id.to_string(), r.depth))
            .collect()
    }

    #[test]
    fn test_build_nests_children_in_input_order() {
        let tree = CategoryTree::build(&flat());
        assert_eq!(
            row_ids(&tree),
            vec![
                ("flowers".to_string(), 0),
                ("roses".to_string(), 1),
                ("red-roses".to_string(), 2),
                ("tulips".to_string(), 1),
                ("plants".to_string(), 0),
            ]
        );
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.roots().len(), 2);
    }

    #[test]
    fn test_build_is_deterministic() {
        assert_eq!(CategoryTree::build(&flat()), CategoryTree::build(&flat()));
    }

    #[test]
    fn test_missing_parent_becomes_root() {
        let tree = CategoryTree::build(&[category("orphan", Some("gone")), category("a", None)]);
        assert_eq!(
            row_ids(&tree),
            vec![("orphan".to_string(), 0), ("a".to_string(), 0)]
        );
    }

    #[test]
    fn test_self_parent_becomes_root() {
        let tree = CategoryTree::build(&[category("loop", Some("loop"))]);
        assert_eq!(row_ids(&tree), vec![("loop".to_string(), 0)]);
    }

    #[test]
    fn test_cycle_is_broken_without_losing_categories() {
        let tree = CategoryTree::build(&[
            category("a", Some("b")),
            category("b", Some("a")),
            category("c", None),
        ]);
        assert_eq!(
            row_ids(&tree),
            vec![
                ("c".to_string(), 0),
                ("a".to_string(), 0),
                ("b".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_has_children_flag() {
        let rows = CategoryTree::build(&flat()).rows();
        let flags: Vec<bool> = rows.iter().map(|r| r.has_children).collect();
        assert_eq!(flags, vec![true, true, false, false, false]);
    }

    #[test]
    fn test_descendants_and_parent_options() {
        let tree = CategoryTree::build(&flat());
        let below = tree.descendant_ids(&CategoryId::new("flowers"));
        assert_eq!(below.len(), 3);
        assert!(below.contains(&CategoryId::new("red-roses")));

        let options: Vec<String> = tree
            .parent_options(&CategoryId::new("roses"))
            .into_iter()
            .map(|r| r.category.id.to_string())
            .collect();
        assert_eq!(options, vec!["flowers", "tulips", "plants"]);
    }

    #[test]
    fn test_find_and_empty() {
        let tree = CategoryTree::build(&flat());
        assert!(tree.find(&CategoryId::new("tulips")).is_some());
        assert!(tree.find(&CategoryId::new("cacti")).is_none());
        assert!(CategoryTree::build(&[]).is_empty());
    }
}

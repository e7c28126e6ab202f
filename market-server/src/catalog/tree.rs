//! Category subtree resolution
//!
//! Categories link to their parent; resolving a subtree walks the reverse
//! edges breadth-first. A visited set makes the walk terminate even when
//! stored parent links form a cycle.

use std::collections::{BTreeMap, HashSet, VecDeque};

use shared::models::Category;

/// Parent → children index over a category snapshot
#[derive(Debug, Default, Clone)]
pub struct CategoryTree {
    known: HashSet<i64>,
    children: BTreeMap<i64, Vec<i64>>,
}

impl CategoryTree {
    pub fn new(categories: &[Category]) -> Self {
        let mut tree = Self::default();
        for category in categories {
            tree.known.insert(category.id);
            if let Some(parent) = category.parent_id {
                tree.children.entry(parent).or_default().push(category.id);
            }
        }
        for ids in tree.children.values_mut() {
            ids.sort_unstable();
            ids.dedup();
        }
        tree
    }

    pub fn contains(&self, id: i64) -> bool {
        self.known.contains(&id)
    }

    /// `root` followed by every transitive descendant, each exactly once
    ///
    /// Returns `None` when `root` is not a known category.
    pub fn subtree(&self, root: i64) -> Option<Vec<i64>> {
        if !self.contains(root) {
            return None;
        }

        let mut visited = HashSet::from([root]);
        let mut ordered = vec![root];
        let mut queue = VecDeque::from([root]);

        while let Some(id) = queue.pop_front() {
            for &child in self.children.get(&id).map(Vec::as_slice).unwrap_or_default() {
                if visited.insert(child) {
                    ordered.push(child);
                    queue.push_back(child);
                }
            }
        }

        Some(ordered)
    }
}

/// Resolve a subtree from a flat category list
pub fn resolve_subtree(categories: &[Category], root: i64) -> Option<Vec<i64>> {
    CategoryTree::new(categories).subtree(root)
}

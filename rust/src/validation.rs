//! Validation and debugging utilities for BPlusTreeMap.
//!
//! This module contains invariant checking over the node structure, the
//! per-level sibling chains and the arenas, plus debugging helpers used by
//! tests.

use crate::error::{BPlusTreeError, TreeResult};
use crate::types::{BPlusTreeMap, InnerNode, LeafNode, NodeId, NodeRef, LEAF_ORDER, NULL_NODE};
use log::debug;
use std::fmt::{Debug, Write};

// ============================================================================
// VALIDATION METHODS
// ============================================================================

impl<K: Ord, V> BPlusTreeMap<K, V> {
    /// Check if the tree maintains B+ tree invariants.
    /// Returns true if all invariants are satisfied.
    pub fn check_invariants(&self) -> bool {
        self.check_invariants_detailed().is_ok()
    }

    /// Check invariants with detailed error reporting.
    pub fn check_invariants_detailed(&self) -> Result<(), String> {
        let root_links = self.links_of(self.root).map_err(|e| e.to_string())?;
        if root_links.parent != NULL_NODE {
            return Err(format!("Root {} has parent {}", self.root.id(), root_links.parent));
        }
        if let NodeRef::Inner(id, _) = self.root {
            if self.get_inner(id).map_or(false, InnerNode::is_empty) {
                return Err(format!("Root inner {} has no separators", id));
            }
        }

        // Node contents, separator bounds and parent links
        let mut leaf_depth = None;
        self.check_node_invariants(self.root, None, None, NULL_NODE, 0, &mut leaf_depth)?;

        // Sibling chains of every level, including the leaf chain
        self.check_linked_list_invariants()?;

        // Arena-tree consistency
        self.check_arena_tree_consistency()
            .map_err(|e| e.to_string())?;
        Ok(())
    }

    /// Alias for check_invariants_detailed (for test compatibility).
    pub fn validate(&self) -> Result<(), String> {
        self.check_invariants_detailed()
    }

    /// Recursively check a node and its subtree against the key range
    /// `[min_key, max_key)` handed down by its ancestors.
    fn check_node_invariants(
        &self,
        node: NodeRef<K, V>,
        min_key: Option<&K>,
        max_key: Option<&K>,
        expected_parent: NodeId,
        depth: usize,
        leaf_depth: &mut Option<usize>,
    ) -> Result<(), String> {
        let is_root = expected_parent == NULL_NODE;
        let links = self.links_of(node).map_err(|e| e.to_string())?;
        if links.parent != expected_parent {
            return Err(format!(
                "{} {} has parent {} but is a child of {}",
                node.kind(),
                node.id(),
                links.parent,
                expected_parent
            ));
        }

        match node {
            NodeRef::Leaf(id, _) => {
                let leaf = self
                    .get_leaf(id)
                    .ok_or_else(|| format!("Missing leaf {}", id))?;
                if leaf.keys.len() != leaf.values.len() {
                    return Err(format!("Leaf {} has mismatched keys and values", id));
                }
                check_sorted(&leaf.keys).map_err(|i| format!("Leaf {} unsorted at {}", id, i))?;
                if leaf.is_overflow() {
                    return Err(format!("Leaf {} exceeds {} keys", id, LEAF_ORDER));
                }
                if !is_root && leaf.is_underflow() {
                    return Err(format!(
                        "Leaf {} holds {} keys, below the minimum {}",
                        id,
                        leaf.len(),
                        LeafNode::<K, V>::min_keys()
                    ));
                }
                if !within_bounds(&leaf.keys, min_key, max_key) {
                    return Err(format!("Leaf {} has keys outside its separators", id));
                }

                let expected = *leaf_depth.get_or_insert(depth);
                if expected != depth {
                    return Err(format!(
                        "Leaf {} at depth {} but other leaves at depth {}",
                        id, depth, expected
                    ));
                }
                Ok(())
            }
            NodeRef::Inner(id, _) => {
                let inner = self
                    .get_inner(id)
                    .ok_or_else(|| format!("Missing inner {}", id))?;
                if inner.keys.len() + 1 != inner.children.len() {
                    return Err(format!(
                        "Inner {} has {} keys and {} children",
                        id,
                        inner.keys.len(),
                        inner.children.len()
                    ));
                }
                check_sorted(&inner.keys).map_err(|i| format!("Inner {} unsorted at {}", id, i))?;
                if inner.is_overflow() {
                    return Err(format!("Inner {} exceeds its order", id));
                }
                if !is_root && inner.is_underflow() {
                    return Err(format!(
                        "Inner {} holds {} keys, below the minimum {}",
                        id,
                        inner.len(),
                        InnerNode::<K, V>::min_keys()
                    ));
                }
                if !within_bounds(&inner.keys, min_key, max_key) {
                    return Err(format!("Inner {} has keys outside its separators", id));
                }
                if let Some(kind) = inner.children.first().map(NodeRef::kind) {
                    if inner.children.iter().any(|child| child.kind() != kind) {
                        return Err(format!("Inner {} mixes leaf and inner children", id));
                    }
                }

                for (i, child) in inner.children.iter().enumerate() {
                    let child_min = if i == 0 {
                        min_key
                    } else {
                        Some(&inner.keys[i - 1])
                    };
                    let child_max = inner.keys.get(i).or(max_key);
                    self.check_node_invariants(
                        *child,
                        child_min,
                        child_max,
                        id,
                        depth + 1,
                        leaf_depth,
                    )?;
                }
                Ok(())
            }
        }
    }

    /// Check that each level's sibling chain visits that level's nodes in
    /// tree order, with mirrored left links, and that leaf keys increase
    /// strictly along the leaf chain.
    fn check_linked_list_invariants(&self) -> Result<(), String> {
        for level in self.levels() {
            let first = match level.first() {
                Some(first) => *first,
                None => continue,
            };
            let mut chain = Vec::with_capacity(level.len());
            let mut previous = NULL_NODE;
            let mut current = Some(first);
            while let Some(node) = current {
                if chain.len() > level.len() {
                    return Err(format!("Sibling chain starting at {} loops", first.id()));
                }
                let links = self.links_of(node).map_err(|e| e.to_string())?;
                if links.left != previous {
                    return Err(format!(
                        "{} {} has left link {} but follows {}",
                        node.kind(),
                        node.id(),
                        links.left,
                        previous
                    ));
                }
                chain.push(node);
                previous = node.id();
                current = node.same_kind(links.right);
            }
            if chain != level {
                return Err(format!(
                    "Sibling chain {:?} differs from tree order {:?}",
                    chain.iter().map(NodeRef::id).collect::<Vec<_>>(),
                    level.iter().map(NodeRef::id).collect::<Vec<_>>()
                ));
            }
        }

        let keys = self.leaf_chain_keys();
        check_sorted(&keys).map_err(|i| format!("Leaf chain unsorted at key {}", i))?;
        if keys.len() != self.len() {
            return Err(format!(
                "Leaf chain returned {} keys but tree has {} items",
                keys.len(),
                self.len()
            ));
        }
        Ok(())
    }

    /// Check that arena allocation matches tree structure
    fn check_arena_tree_consistency(&self) -> TreeResult<()> {
        let (tree_leaf_count, tree_inner_count) = self.count_nodes_in_tree();
        let leaf_stats = self.leaf_arena_stats();
        let inner_stats = self.inner_arena_stats();

        if tree_leaf_count != leaf_stats.allocated_count {
            return Err(BPlusTreeError::arena_error(
                "Leaf consistency check",
                &format!(
                    "{} in tree vs {} in arena",
                    tree_leaf_count, leaf_stats.allocated_count
                ),
            ));
        }

        if tree_inner_count != inner_stats.allocated_count {
            return Err(BPlusTreeError::arena_error(
                "Inner consistency check",
                &format!(
                    "{} in tree vs {} in arena",
                    tree_inner_count, inner_stats.allocated_count
                ),
            ));
        }

        Ok(())
    }

    // ============================================================================
    // DEBUGGING AND TESTING UTILITIES
    // ============================================================================

    /// Nodes of every level in left-to-right tree order, root level first.
    fn levels(&self) -> Vec<Vec<NodeRef<K, V>>> {
        let mut levels = Vec::new();
        let mut level = vec![self.root];
        while !level.is_empty() {
            let next: Vec<NodeRef<K, V>> = level
                .iter()
                .filter_map(|node| match node {
                    NodeRef::Inner(id, _) => self.get_inner(*id),
                    NodeRef::Leaf(_, _) => None,
                })
                .flat_map(|inner| inner.children.iter().copied())
                .collect();
            levels.push(level);
            level = next;
        }
        levels
    }

    fn leftmost_leaf(&self) -> Option<NodeId> {
        let mut current = self.root;
        loop {
            match current {
                NodeRef::Leaf(id, _) => return Some(id),
                NodeRef::Inner(id, _) => current = *self.get_inner(id)?.children.first()?,
            }
        }
    }

    /// All keys in leaf-chain order, following right links from the
    /// leftmost leaf.
    pub(crate) fn leaf_chain_keys(&self) -> Vec<&K> {
        let mut keys = Vec::new();
        let mut current = self.leftmost_leaf();
        // Bounded by the arena so a cyclic chain cannot spin forever
        let mut remaining = self.leaf_arena_stats().allocated_count;
        while let Some(id) = current {
            let leaf = match self.get_leaf(id) {
                Some(leaf) if remaining > 0 => leaf,
                _ => break,
            };
            remaining -= 1;
            keys.extend(leaf.keys.iter());
            current = if leaf.links.right == NULL_NODE {
                None
            } else {
                Some(leaf.links.right)
            };
        }
        keys
    }

    /// Returns the sizes of all leaf nodes (for testing/debugging).
    pub fn leaf_sizes(&self) -> Vec<usize> {
        self.levels()
            .last()
            .map(|leaves| {
                leaves
                    .iter()
                    .filter_map(|leaf| self.get_leaf(leaf.id()))
                    .map(LeafNode::len)
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl<K: Ord + Debug, V> BPlusTreeMap<K, V> {
    /// Indented dump of the tree, one node per line.
    pub fn render_structure(&self) -> String {
        let mut out = String::new();
        self.render_node(self.root, 0, &mut out);
        out
    }

    /// Logs the tree structure at debug level.
    pub fn print_node_chain(&self) {
        debug!("Tree structure:\n{}", self.render_structure());
    }

    fn render_node(&self, node: NodeRef<K, V>, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        match node {
            NodeRef::Leaf(id, _) => match self.get_leaf(id) {
                Some(leaf) => {
                    let _ = writeln!(out, "{}Leaf[id={}]: {:?}", indent, id, leaf.keys);
                }
                None => {
                    let _ = writeln!(out, "{}Leaf[id={}]: <missing>", indent, id);
                }
            },
            NodeRef::Inner(id, _) => match self.get_inner(id) {
                Some(inner) => {
                    let _ = writeln!(out, "{}Inner[id={}]: {:?}", indent, id, inner.keys);
                    for child in &inner.children {
                        self.render_node(*child, depth + 1, out);
                    }
                }
                None => {
                    let _ = writeln!(out, "{}Inner[id={}]: <missing>", indent, id);
                }
            },
        }
    }
}

/// Index of the first key not strictly greater than its predecessor.
fn check_sorted<T: Ord>(keys: &[T]) -> Result<(), usize> {
    match keys.windows(2).position(|pair| pair[0] >= pair[1]) {
        Some(i) => Err(i + 1),
        None => Ok(()),
    }
}

/// Whether `keys` lie in `[min_key, max_key)`.
fn within_bounds<K: Ord>(keys: &[K], min_key: Option<&K>, max_key: Option<&K>) -> bool {
    let below = matches!((keys.first(), min_key), (Some(first), Some(min)) if first < min);
    let above = matches!((keys.last(), max_key), (Some(last), Some(max)) if last >= max);
    !below && !above
}

//! Construction and initialization logic for BPlusTreeMap and nodes.
//!
//! A new tree owns a single empty leaf as its root. Fan-out is fixed by
//! `LEAF_ORDER` and `INNER_ORDER`, so construction takes no parameters.

use crate::arena::NodeArena;
use crate::types::{
    BPlusTreeMap, InnerNode, LeafNode, NodeLinks, NodeRef, INNER_ORDER, LEAF_ORDER, ROOT_NODE,
};

impl<K, V> BPlusTreeMap<K, V> {
    /// Create an empty B+ tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplustree_index::BPlusTreeMap;
    ///
    /// let tree = BPlusTreeMap::<i32, String>::new();
    /// assert!(tree.is_empty());
    /// assert!(tree.is_leaf_root());
    /// ```
    pub fn new() -> Self {
        Self {
            root: NodeRef::leaf(ROOT_NODE),
            leaf_arena: NodeArena::with_first(LeafNode::new()),
            inner_arena: NodeArena::new(),
        }
    }
}

impl<K, V> LeafNode<K, V> {
    /// Creates a new detached, empty leaf node.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplustree_index::LeafNode;
    ///
    /// let leaf: LeafNode<i32, String> = LeafNode::new();
    /// assert!(leaf.is_empty());
    /// ```
    pub fn new() -> Self {
        // One slot past the order so an overflowing insert never reallocates
        Self {
            keys: Vec::with_capacity(LEAF_ORDER + 1),
            values: Vec::with_capacity(LEAF_ORDER + 1),
            links: NodeLinks::detached(),
        }
    }
}

impl<K, V> InnerNode<K, V> {
    /// Creates a new detached inner node with no keys or children.
    pub fn new() -> Self {
        Self {
            keys: Vec::with_capacity(INNER_ORDER + 1),
            children: Vec::with_capacity(INNER_ORDER + 2),
            links: NodeLinks::detached(),
        }
    }
}

// Default implementations
impl<K, V> Default for BPlusTreeMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Default for LeafNode<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Default for InnerNode<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_construction() {
        let tree = BPlusTreeMap::<i32, String>::new();
        assert_eq!(tree.root, NodeRef::leaf(ROOT_NODE));
        assert_eq!(tree.leaf_arena.len(), 1);
        assert!(tree.inner_arena.is_empty());
    }

    #[test]
    fn test_tree_default_matches_new() {
        let tree = BPlusTreeMap::<i32, String>::default();
        assert!(tree.is_leaf_root());
        assert_eq!(tree.len(), 0);
    }

    #[test]
    fn test_leaf_construction() {
        let leaf = LeafNode::<i32, String>::new();
        assert!(leaf.keys.is_empty());
        assert!(leaf.links.is_root());
        assert!(leaf.keys.capacity() > LEAF_ORDER);
    }

    #[test]
    fn test_inner_construction() {
        let inner = InnerNode::<i32, String>::new();
        assert!(inner.keys.is_empty());
        assert!(inner.children.is_empty());
        assert!(inner.children.capacity() >= INNER_ORDER + 2);
    }
}

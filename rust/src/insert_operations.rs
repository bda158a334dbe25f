//! INSERT operations for BPlusTreeMap.
//!
//! This module contains the insertion path of the B+ tree: sorted insertion
//! into the owning leaf, then overflow resolution. A full node is split, the
//! new right half is linked into its level's chain, and the middle key is
//! pushed up into the parent, growing a new root when there is none.

use crate::error::{BPlusTreeError, ModifyResult, TreeResult};
use crate::types::{BPlusTreeMap, InnerNode, NodeRef};
use log::{debug, trace};

impl<K: Ord + Clone, V> BPlusTreeMap<K, V> {
    /// Insert a key-value pair into the tree.
    ///
    /// If the key already exists its value is replaced and the old value is
    /// returned; the tree never holds two entries with equal keys.
    ///
    /// # Panics
    ///
    /// Panics if the tree structure was found corrupt while rebalancing.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplustree_index::BPlusTreeMap;
    ///
    /// let mut tree = BPlusTreeMap::new();
    /// assert_eq!(tree.insert(1, "one"), None);
    /// assert_eq!(tree.insert(1, "uno"), Some("one"));
    /// assert_eq!(tree.search(&1), Some(&"uno"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.insert_entry(key, value) {
            Ok(old_value) => old_value,
            Err(e) => panic!("B+ tree insert failed: {}", e),
        }
    }

    /// Insert with invariant validation before and after the operation.
    pub fn try_insert(&mut self, key: K, value: V) -> ModifyResult<Option<V>> {
        self.check_invariants_detailed()
            .map_err(|e| BPlusTreeError::data_integrity("Before insert", &e))?;

        let old_value = self.insert_entry(key, value)?;

        self.check_invariants_detailed()
            .map_err(|e| BPlusTreeError::data_integrity("After insert", &e))?;

        Ok(old_value)
    }

    pub(crate) fn insert_entry(&mut self, key: K, value: V) -> TreeResult<Option<V>> {
        let leaf_id = self.find_leaf(&key)?;
        let leaf = self.leaf_node_mut(leaf_id)?;
        let old_value = leaf.insert_key(key, value);

        if leaf.is_overflow() {
            if let Some(new_root) = self.deal_overflow(NodeRef::leaf(leaf_id))? {
                self.root = new_root;
            }
        }

        Ok(old_value)
    }

    // ============================================================================
    // OVERFLOW RESOLUTION
    // ============================================================================

    /// Split `node` and propagate push-ups toward the root.
    ///
    /// Returns the top of the tree when the last parent touched has no parent
    /// of its own, `None` otherwise.
    pub(crate) fn deal_overflow(&mut self, node: NodeRef<K, V>) -> TreeResult<Option<NodeRef<K, V>>> {
        let mut current = node;
        loop {
            let (up_key, right) = self.split_node(current)?;

            let parent = match self.parent_of(current)? {
                Some(parent) => parent,
                None => {
                    let root_id = self.allocate_inner(InnerNode::new())?;
                    debug!(
                        "tree grew: new root inner {} above {} {}",
                        root_id,
                        current.kind(),
                        current.id()
                    );
                    NodeRef::inner(root_id)
                }
            };
            self.link_split_sibling(current, right)?;

            self.push_up_key(parent, up_key, current, right)?;

            let parent_node = self.expect_inner(parent, "resolve overflow")?;
            if parent_node.is_overflow() {
                current = parent;
                continue;
            }
            return Ok(if parent_node.links.is_root() {
                Some(parent)
            } else {
                None
            });
        }
    }

    /// Split `node` into itself and a newly allocated right node.
    ///
    /// Returns the key to push up and the new right node. Children moved
    /// into a new inner node are re-parented before returning; the new node's
    /// own parent and sibling links are left for the caller.
    fn split_node(&mut self, node: NodeRef<K, V>) -> TreeResult<(K, NodeRef<K, V>)> {
        match node {
            NodeRef::Leaf(id, _) => {
                let right = self.leaf_node_mut(id)?.split();
                let up_key = right.keys.first().cloned().ok_or_else(|| {
                    BPlusTreeError::corrupted_tree("Leaf split", &format!("leaf {} split empty", id))
                })?;
                let right_id = self.allocate_leaf(right)?;
                trace!("split leaf {} -> right leaf {}", id, right_id);
                Ok((up_key, NodeRef::leaf(right_id)))
            }
            NodeRef::Inner(id, _) => {
                let (right, up_key) = self.inner_node_mut(id)?.split().ok_or_else(|| {
                    BPlusTreeError::corrupted_tree("Inner split", &format!("inner {} has no keys", id))
                })?;
                let moved: Vec<NodeRef<K, V>> = right.children.clone();
                let right_id = self.allocate_inner(right)?;
                for child in moved {
                    self.set_parent(child, right_id)?;
                }
                trace!("split inner {} -> right inner {}", id, right_id);
                Ok((up_key, NodeRef::inner(right_id)))
            }
        }
    }

    /// Insert `right` into the level chain directly after `left`.
    fn link_split_sibling(&mut self, left: NodeRef<K, V>, right: NodeRef<K, V>) -> TreeResult<()> {
        let old_right = left.same_kind(self.links_of(left)?.right);
        self.join_siblings(Some(right), old_right)?;
        self.join_siblings(Some(left), Some(right))
    }

    /// Insert separator `key` into `parent` between `left` and `right`.
    ///
    /// Fails with `InvalidNodeKind` if `parent` is a leaf.
    pub(crate) fn push_up_key(
        &mut self,
        parent: NodeRef<K, V>,
        key: K,
        left: NodeRef<K, V>,
        right: NodeRef<K, V>,
    ) -> TreeResult<()> {
        let parent_id = parent.id();
        self.expect_inner_mut(parent, "push up key")?
            .insert_separator(key, left, right);
        self.set_parent(left, parent_id)?;
        self.set_parent(right, parent_id)?;
        trace!("pushed separator into inner {}", parent_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NodeKind, NULL_NODE};

    #[test]
    fn test_insert_without_split() {
        let mut tree = BPlusTreeMap::new();
        for i in [4, 1, 3, 2] {
            assert_eq!(tree.insert(i, i * 10), None);
        }
        assert!(tree.is_leaf_root());
        assert_eq!(tree.root_keys(), vec![&1, &2, &3, &4]);
    }

    #[test]
    fn test_fifth_insert_splits_root_leaf() {
        let mut tree = BPlusTreeMap::new();
        for i in 1..=5 {
            tree.insert(i, i);
        }
        assert_eq!(tree.root_kind(), NodeKind::Inner);
        assert_eq!(tree.root_keys(), vec![&3]);

        let root = tree.expect_inner(tree.root, "test").unwrap();
        assert_eq!(root.children.len(), 2);
        let left = tree.get_leaf(root.children[0].id()).unwrap();
        let right = tree.get_leaf(root.children[1].id()).unwrap();
        assert_eq!(left.keys(), &[1, 2]);
        assert_eq!(right.keys(), &[3, 4, 5]);
        assert_eq!(left.links.parent, tree.root.id());
        assert_eq!(right.links.parent, tree.root.id());
        assert_eq!(left.links.right, root.children[1].id());
        assert_eq!(right.links.left, root.children[0].id());
        assert_eq!(left.links.left, NULL_NODE);
        assert_eq!(right.links.right, NULL_NODE);
    }

    #[test]
    fn test_split_links_new_leaf_into_middle_of_chain() {
        let mut tree = BPlusTreeMap::new();
        for i in [10, 20, 30, 40, 50, 11, 12, 13] {
            tree.insert(i, ());
        }
        // [10, 11] [12, 13, 20] [30, 40, 50]
        assert_eq!(tree.leaf_sizes(), vec![2, 3, 3]);
        assert_eq!(tree.root_keys(), vec![&12, &30]);
        tree.check_invariants_detailed().unwrap();
    }

    #[test]
    fn test_inner_split_grows_tree() {
        let mut tree = BPlusTreeMap::new();
        for i in 0..17 {
            tree.insert(i, i);
        }
        assert_eq!(tree.height(), 3);
        let root = tree.expect_inner(tree.root, "test").unwrap();
        assert_eq!(root.keys.len(), 1);
        for child in &root.children {
            assert_eq!(child.kind(), NodeKind::Inner);
            assert_eq!(tree.links_of(*child).unwrap().parent, tree.root.id());
        }
        tree.check_invariants_detailed().unwrap();
    }

    #[test]
    fn test_insert_replaces_existing_value() {
        let mut tree = BPlusTreeMap::new();
        for i in 0..12 {
            tree.insert(i, format!("v{}", i));
        }
        assert_eq!(tree.insert(7, "seven".to_string()), Some("v7".to_string()));
        assert_eq!(tree.len(), 12);
        assert_eq!(tree.search(&7), Some(&"seven".to_string()));
    }

    #[test]
    fn test_push_up_key_rejects_leaf_parent() {
        let mut tree = BPlusTreeMap::<i32, i32>::new();
        let leaf = tree.root;
        let err = tree
            .push_up_key(leaf, 5, NodeRef::leaf(1), NodeRef::leaf(2))
            .unwrap_err();
        assert_eq!(err, BPlusTreeError::invalid_node_kind("push up key", NodeKind::Leaf));
        assert!(tree.is_empty());
        assert!(tree.check_invariants());
    }

    #[test]
    fn test_try_insert_validates() {
        let mut tree = BPlusTreeMap::new();
        for i in 0..25 {
            assert_eq!(tree.try_insert(i, i), Ok(None));
        }
        assert_eq!(tree.try_insert(3, 33), Ok(Some(3)));
    }
}

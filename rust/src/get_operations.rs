//! GET operations for BPlusTreeMap.
//!
//! This module contains the read operations for the B+ tree: the shared
//! leaf-lookup descent, key lookup and value retrieval, and the generated
//! arena access methods.

use crate::error::{BPlusTreeError, KeyResult, TreeResult};
use crate::types::{BPlusTreeMap, NodeId, NodeRef};

arena_accessors!(leaf, LeafNode, leaf_arena);
arena_accessors!(inner, InnerNode, inner_arena);

impl<K: Ord, V> BPlusTreeMap<K, V> {
    // ============================================================================
    // PUBLIC GET OPERATIONS
    // ============================================================================

    /// Get a reference to the value associated with a key.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplustree_index::BPlusTreeMap;
    ///
    /// let mut tree = BPlusTreeMap::new();
    /// tree.insert(1, "one");
    /// assert_eq!(tree.search(&1), Some(&"one"));
    /// assert_eq!(tree.search(&2), None);
    /// ```
    pub fn search(&self, key: &K) -> Option<&V> {
        let leaf_id = self.find_leaf(key).ok()?;
        self.get_leaf(leaf_id)?.get(key)
    }

    /// Check if key exists in the tree.
    pub fn contains_key(&self, key: &K) -> bool {
        self.search(key).is_some()
    }

    /// Get value for a key, returning an error if the key doesn't exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplustree_index::{BPlusTreeError, BPlusTreeMap};
    ///
    /// let mut tree = BPlusTreeMap::new();
    /// tree.insert(1, "one");
    /// assert_eq!(tree.get_item(&1).unwrap(), &"one");
    /// assert_eq!(tree.get_item(&2), Err(BPlusTreeError::KeyNotFound));
    /// ```
    pub fn get_item(&self, key: &K) -> KeyResult<&V> {
        self.search(key).ok_or(BPlusTreeError::KeyNotFound)
    }

    /// Get a mutable reference to the value for a key.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplustree_index::BPlusTreeMap;
    ///
    /// let mut tree = BPlusTreeMap::new();
    /// tree.insert(1, "one");
    /// if let Some(value) = tree.get_mut(&1) {
    ///     *value = "ONE";
    /// }
    /// assert_eq!(tree.search(&1), Some(&"ONE"));
    /// ```
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let leaf_id = self.find_leaf(key).ok()?;
        self.get_leaf_mut(leaf_id)?.get_mut(key)
    }

    // ============================================================================
    // DESCENT
    // ============================================================================

    /// Walk from the root to the leaf whose key range covers `key`.
    pub(crate) fn find_leaf(&self, key: &K) -> TreeResult<NodeId> {
        let mut current = self.root;
        loop {
            match current {
                NodeRef::Leaf(id, _) => return Ok(id),
                NodeRef::Inner(id, _) => {
                    let inner = self.inner_node(id)?;
                    current = inner.child_for(key).ok_or_else(|| {
                        BPlusTreeError::corrupted_tree(
                            "Inner node",
                            &format!("node {} has no child for the searched key", id),
                        )
                    })?;
                }
            }
        }
    }
}

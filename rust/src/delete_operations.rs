//! DELETE operations for BPlusTreeMap.
//!
//! This module contains the deletion path of the B+ tree: removal from the
//! owning leaf and underflow resolution. An underfull node first tries to
//! borrow one entry from a sibling under the same parent; failing that it is
//! fused with a sibling, which may underflow the parent in turn or collapse
//! an emptied root.

use crate::error::{BPlusTreeError, ModifyResult, TreeResult};
use crate::types::{BPlusTreeMap, NodeId, NodeRef, NULL_NODE};
use log::{debug, trace};

impl<K: Ord + Clone, V> BPlusTreeMap<K, V> {
    /// Remove a key from the tree and return its associated value.
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
    /// tree.insert(1, "one");
    /// assert_eq!(tree.remove(&1), Some("one"));
    /// assert_eq!(tree.remove(&1), None);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        match self.remove_entry(key) {
            Ok(removed) => removed,
            Err(e) => panic!("B+ tree delete failed: {}", e),
        }
    }

    /// Delete `key`, returning true if it was present.
    ///
    /// An absent key leaves the tree untouched.
    pub fn delete(&mut self, key: &K) -> bool {
        self.remove(key).is_some()
    }

    /// Remove a key with invariant validation, returning `KeyNotFound` if absent.
    pub fn try_remove(&mut self, key: &K) -> ModifyResult<V> {
        self.check_invariants_detailed()
            .map_err(|e| BPlusTreeError::data_integrity("Before delete", &e))?;

        let removed = self
            .remove_entry(key)?
            .ok_or(BPlusTreeError::KeyNotFound)?;

        self.check_invariants_detailed()
            .map_err(|e| BPlusTreeError::data_integrity("After delete", &e))?;

        Ok(removed)
    }

    pub(crate) fn remove_entry(&mut self, key: &K) -> TreeResult<Option<V>> {
        let leaf_id = self.find_leaf(key)?;
        let leaf = self.leaf_node_mut(leaf_id)?;
        let removed = match leaf.delete(key) {
            Some(value) => value,
            None => return Ok(None),
        };

        if leaf.is_underflow() {
            if let Some(new_root) = self.deal_underflow(NodeRef::leaf(leaf_id))? {
                self.root = new_root;
            }
        }

        Ok(Some(removed))
    }

    // ============================================================================
    // UNDERFLOW RESOLUTION
    // ============================================================================

    /// Restore minimum occupancy of `node`, walking up while fusions
    /// underflow the parent. Returns the new root after a root collapse.
    pub(crate) fn deal_underflow(
        &mut self,
        node: NodeRef<K, V>,
    ) -> TreeResult<Option<NodeRef<K, V>>> {
        let mut current = node;
        loop {
            let parent = match self.parent_of(current)? {
                Some(parent) => parent,
                None => return Ok(None),
            };

            let left = self.left_sibling(current)?;
            if let Some(lender) = left {
                if self.can_lend_a_key(lender)? {
                    self.process_children_transfer(parent, current, lender, true)?;
                    return Ok(None);
                }
            }
            let right = self.right_sibling(current)?;
            if let Some(lender) = right {
                if self.can_lend_a_key(lender)? {
                    self.process_children_transfer(parent, current, lender, false)?;
                    return Ok(None);
                }
            }

            let (survivor, absorbed) = match (left, right) {
                (Some(left), _) => (left, current),
                (None, Some(right)) => (current, right),
                (None, None) => {
                    return Err(BPlusTreeError::corrupted_tree(
                        "Sibling links",
                        &format!(
                            "{} {} has no sibling under inner {}",
                            current.kind(),
                            current.id(),
                            parent.id()
                        ),
                    ))
                }
            };
            self.process_children_fusion(parent, survivor, absorbed)?;

            let parent_node = self.expect_inner(parent, "resolve underflow")?;
            if parent_node.links.is_root() {
                if parent_node.is_empty() {
                    return self.collapse_root(parent, survivor).map(Some);
                }
                return Ok(None);
            }
            if !parent_node.is_underflow() {
                return Ok(None);
            }
            current = parent;
        }
    }

    /// Drop an emptied root and promote its only child.
    fn collapse_root(
        &mut self,
        root: NodeRef<K, V>,
        child: NodeRef<K, V>,
    ) -> TreeResult<NodeRef<K, V>> {
        self.set_parent(child, NULL_NODE)?;
        self.deallocate_inner(root.id());
        debug!(
            "tree shrank: {} {} replaces root inner {}",
            child.kind(),
            child.id(),
            root.id()
        );
        Ok(child)
    }

    // ============================================================================
    // SIBLING TRANSFER
    // ============================================================================

    /// Move one entry from `lender` into `borrower` through `parent`.
    ///
    /// `from_left` says which side of `borrower` the lender sits on. Leaves
    /// copy their new boundary key into the parent separator; inner nodes
    /// rotate it: the lender's boundary key goes up and the old separator
    /// comes down into the borrower together with the moved child.
    pub(crate) fn process_children_transfer(
        &mut self,
        parent: NodeRef<K, V>,
        borrower: NodeRef<K, V>,
        lender: NodeRef<K, V>,
        from_left: bool,
    ) -> TreeResult<()> {
        self.expect_inner(parent, "transfer entry")?;
        let borrower_index = self.child_position(parent, borrower)?;
        let separator_index = if from_left {
            borrower_index.checked_sub(1).ok_or_else(|| {
                BPlusTreeError::corrupted_tree(
                    "Sibling links",
                    &format!("left lender of first child {}", borrower.id()),
                )
            })?
        } else {
            borrower_index
        };

        match (borrower, lender) {
            (NodeRef::Leaf(b, _), NodeRef::Leaf(l, _)) => {
                self.transfer_leaf_entry(parent.id(), separator_index, b, l, from_left)?
            }
            (NodeRef::Inner(b, _), NodeRef::Inner(l, _)) => {
                self.transfer_inner_entry(parent.id(), separator_index, b, l, from_left)?
            }
            _ => {
                return Err(BPlusTreeError::invalid_node_kind(
                    "transfer entry",
                    lender.kind(),
                ))
            }
        }
        trace!(
            "{} {} borrowed from {} sibling {}",
            borrower.kind(),
            borrower.id(),
            if from_left { "left" } else { "right" },
            lender.id()
        );
        Ok(())
    }

    fn transfer_leaf_entry(
        &mut self,
        parent: NodeId,
        separator_index: usize,
        borrower: NodeId,
        lender: NodeId,
        from_left: bool,
    ) -> TreeResult<()> {
        let separator = if from_left {
            let (key, value) = self
                .leaf_node_mut(lender)?
                .pop_last()
                .ok_or_else(|| empty_lender(lender))?;
            let separator = key.clone();
            self.leaf_node_mut(borrower)?.push_front(key, value);
            separator
        } else {
            let (key, value) = self
                .leaf_node_mut(lender)?
                .pop_first()
                .ok_or_else(|| empty_lender(lender))?;
            self.leaf_node_mut(borrower)?.push_back(key, value);
            self.leaf_node(lender)?
                .keys
                .first()
                .cloned()
                .ok_or_else(|| empty_lender(lender))?
        };
        *self.separator_mut(parent, separator_index)? = separator;
        Ok(())
    }

    fn transfer_inner_entry(
        &mut self,
        parent: NodeId,
        separator_index: usize,
        borrower: NodeId,
        lender: NodeId,
        from_left: bool,
    ) -> TreeResult<()> {
        let lender_node = self.inner_node_mut(lender)?;
        let taken = if from_left {
            lender_node.pop_last()
        } else {
            lender_node.pop_first()
        };
        let (up_key, child) = taken.ok_or_else(|| empty_lender(lender))?;

        let sink_key = std::mem::replace(self.separator_mut(parent, separator_index)?, up_key);

        let borrower_node = self.inner_node_mut(borrower)?;
        if from_left {
            borrower_node.push_front(sink_key, child);
        } else {
            borrower_node.push_back(sink_key, child);
        }
        self.set_parent(child, borrower)
    }

    fn separator_mut(&mut self, parent: NodeId, index: usize) -> TreeResult<&mut K> {
        self.inner_node_mut(parent)?
            .keys
            .get_mut(index)
            .ok_or_else(|| {
                BPlusTreeError::corrupted_tree(
                    "Inner node",
                    &format!("inner {} has no separator {}", parent, index),
                )
            })
    }

    // ============================================================================
    // FUSION
    // ============================================================================

    /// Fuse adjacent children `left` and `right` of `parent` into `left`.
    ///
    /// The separator between them and `right` leave the parent. Leaves drop
    /// the separator; inner nodes pull it down between the two key runs and
    /// re-parent the absorbed children. `right` is unlinked from its level's
    /// chain before it is deallocated.
    pub(crate) fn process_children_fusion(
        &mut self,
        parent: NodeRef<K, V>,
        left: NodeRef<K, V>,
        right: NodeRef<K, V>,
    ) -> TreeResult<()> {
        self.expect_inner(parent, "fuse children")?;
        if left.kind() != right.kind() {
            return Err(BPlusTreeError::invalid_node_kind("fuse children", right.kind()));
        }
        let left_index = self.child_position(parent, left)?;
        if self.child_position(parent, right)? != left_index + 1 {
            return Err(BPlusTreeError::corrupted_tree(
                "Sibling links",
                &format!("{} and {} are not adjacent children", left.id(), right.id()),
            ));
        }

        let (separator, _) = self
            .expect_inner_mut(parent, "fuse children")?
            .delete_at(left_index);

        let far_right = right.same_kind(self.links_of(right)?.right);
        self.join_siblings(Some(left), far_right)?;

        match (left, right) {
            (NodeRef::Leaf(l, _), NodeRef::Leaf(r, _)) => {
                let absorbed = self
                    .deallocate_leaf(r)
                    .ok_or_else(|| missing_node("leaf", r))?;
                self.leaf_node_mut(l)?.fusion_with(absorbed);
            }
            (NodeRef::Inner(l, _), NodeRef::Inner(r, _)) => {
                let absorbed = self
                    .deallocate_inner(r)
                    .ok_or_else(|| missing_node("inner", r))?;
                let moved = self.inner_node_mut(l)?.fusion_with(separator, absorbed);
                for child in moved {
                    self.set_parent(child, l)?;
                }
            }
            _ => unreachable!("node kinds checked above"),
        }
        trace!(
            "fused {} {} into {} under inner {}",
            right.kind(),
            right.id(),
            left.id(),
            parent.id()
        );
        Ok(())
    }
}

fn empty_lender(id: NodeId) -> BPlusTreeError {
    BPlusTreeError::corrupted_tree("Sibling transfer", &format!("lender {} is empty", id))
}

fn missing_node(kind: &str, id: NodeId) -> BPlusTreeError {
    BPlusTreeError::arena_error(
        &format!("{} deallocation", kind),
        &format!("node {} is not allocated", id),
    )
}

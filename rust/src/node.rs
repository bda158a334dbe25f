//! Node implementations for BPlusTreeMap.
//!
//! Node-local operations for `LeafNode` and `InnerNode`: search, sorted
//! insertion, deletion, splitting, fusion and the single-entry moves used by
//! sibling transfers. Nothing here touches the arenas; rewiring parent and
//! sibling links across nodes is done by the tree in `insert_operations` and
//! `delete_operations`.

use crate::types::{InnerNode, LeafNode, NodeLinks, NodeRef, INNER_ORDER, LEAF_ORDER};

// ============================================================================
// LEAF NODE IMPLEMENTATION
// ============================================================================

impl<K: Ord, V> LeafNode<K, V> {
    // ============================================================================
    // GET OPERATIONS
    // ============================================================================

    /// Index of the entry equal to `key`, if present.
    pub fn search(&self, key: &K) -> Option<usize> {
        self.keys.binary_search(key).ok()
    }

    /// Get a value by key from this leaf node.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.search(key).map(|index| &self.values[index])
    }

    /// Get a mutable reference to a value by key from this leaf node.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let index = self.search(key)?;
        Some(&mut self.values[index])
    }

    /// Returns the number of key-value pairs in this leaf.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Get a reference to the keys in this leaf node.
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    /// Get a reference to the values in this leaf node.
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// Parent and sibling links of this leaf.
    pub fn links(&self) -> NodeLinks {
        self.links
    }

    // ============================================================================
    // INSERT OPERATIONS
    // ============================================================================

    /// Insert a pair in sorted position, replacing the value of an equal key.
    /// Returns the replaced value.
    pub fn insert_key(&mut self, key: K, value: V) -> Option<V> {
        match self.keys.binary_search(&key) {
            Ok(index) => Some(std::mem::replace(&mut self.values[index], value)),
            Err(index) => {
                self.keys.insert(index, key);
                self.values.insert(index, value);
                None
            }
        }
    }

    /// Split off the upper half into a new detached leaf.
    ///
    /// The key at `len / 2` moves to the right leaf and stays there as data;
    /// the caller pushes a copy of it to the parent.
    pub fn split(&mut self) -> LeafNode<K, V> {
        let mid = self.keys.len() / 2;
        LeafNode {
            keys: self.keys.split_off(mid),
            values: self.values.split_off(mid),
            links: NodeLinks::detached(),
        }
    }

    // ============================================================================
    // DELETE OPERATIONS
    // ============================================================================

    /// Remove the pair stored under `key`.
    pub fn delete(&mut self, key: &K) -> Option<V> {
        let index = self.search(key)?;
        Some(self.delete_at(index).1)
    }

    fn delete_at(&mut self, index: usize) -> (K, V) {
        (self.keys.remove(index), self.values.remove(index))
    }

    // ============================================================================
    // STATUS CHECKS
    // ============================================================================

    /// Returns true if this leaf node is empty.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns true if this leaf holds `LEAF_ORDER + 1` keys and must split.
    pub fn is_overflow(&self) -> bool {
        self.keys.len() > LEAF_ORDER
    }

    /// Returns true if this leaf is below minimum occupancy.
    pub fn is_underflow(&self) -> bool {
        self.keys.len() < Self::min_keys()
    }

    /// Returns true if this leaf can give a pair to a sibling and stay full enough.
    pub fn can_lend_a_key(&self) -> bool {
        self.keys.len() > Self::min_keys()
    }

    /// Minimum number of keys of a non-root leaf.
    pub const fn min_keys() -> usize {
        LEAF_ORDER / 2
    }

    // ============================================================================
    // BORROWING AND MERGING HELPERS
    // ============================================================================

    /// Take the last pair (this leaf is the left lender).
    pub(crate) fn pop_last(&mut self) -> Option<(K, V)> {
        let key = self.keys.pop()?;
        let value = self.values.pop()?;
        Some((key, value))
    }

    /// Take the first pair (this leaf is the right lender).
    pub(crate) fn pop_first(&mut self) -> Option<(K, V)> {
        if self.keys.is_empty() {
            return None;
        }
        Some(self.delete_at(0))
    }

    /// Accept a pair borrowed from the left sibling.
    pub(crate) fn push_front(&mut self, key: K, value: V) {
        self.keys.insert(0, key);
        self.values.insert(0, value);
    }

    /// Accept a pair borrowed from the right sibling.
    pub(crate) fn push_back(&mut self, key: K, value: V) {
        self.keys.push(key);
        self.values.push(value);
    }

    /// Append every pair of the right sibling. The parent separator is not
    /// needed: leaves carry no router keys.
    pub(crate) fn fusion_with(&mut self, right: LeafNode<K, V>) {
        let LeafNode {
            mut keys,
            mut values,
            ..
        } = right;
        self.keys.append(&mut keys);
        self.values.append(&mut values);
    }
}

// ============================================================================
// INNER NODE IMPLEMENTATION
// ============================================================================

impl<K: Ord, V> InnerNode<K, V> {
    /// Index of the child whose subtree should contain `key`.
    ///
    /// An exact match on a separator routes to the right of it.
    pub fn search(&self, key: &K) -> usize {
        match self.keys.binary_search(key) {
            Ok(index) => index + 1,
            Err(index) => index,
        }
    }

    /// Child covering `key`.
    pub fn child_for(&self, key: &K) -> Option<NodeRef<K, V>> {
        self.children.get(self.search(key)).copied()
    }

    /// Position of `child` among this node's children.
    pub fn child_index(&self, child: NodeRef<K, V>) -> Option<usize> {
        self.children.iter().position(|c| *c == child)
    }

    /// Returns the number of keys in this inner node.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if this inner node holds no separators.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Get a reference to the separator keys.
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    /// Get a reference to the child references.
    pub fn children(&self) -> &[NodeRef<K, V>] {
        &self.children
    }

    /// Parent and sibling links of this node.
    pub fn links(&self) -> NodeLinks {
        self.links
    }

    // ============================================================================
    // INSERT OPERATIONS
    // ============================================================================

    /// Insert separator `key` with `left` and `right` as the children around it.
    ///
    /// On an empty node (a freshly grown root) this installs both children.
    /// Otherwise `left` already sits at the insertion index and `right` is
    /// placed after it.
    pub(crate) fn insert_separator(&mut self, key: K, left: NodeRef<K, V>, right: NodeRef<K, V>) {
        let index = self.search(&key);
        self.keys.insert(index, key);
        if self.children.is_empty() {
            self.children.push(left);
        } else {
            self.children[index] = left;
        }
        self.children.insert(index + 1, right);
    }

    /// Split off the upper half into a new detached inner node.
    ///
    /// Returns the right node and the middle key, which belongs to neither
    /// half and must be pushed to the parent.
    pub fn split(&mut self) -> Option<(InnerNode<K, V>, K)> {
        if self.keys.is_empty() {
            return None;
        }
        let mid = self.keys.len() / 2;
        let right_keys = self.keys.split_off(mid + 1);
        let up_key = self.keys.pop()?;
        let right_children = self.children.split_off(mid + 1);
        let right = InnerNode {
            keys: right_keys,
            children: right_children,
            links: NodeLinks::detached(),
        };
        Some((right, up_key))
    }

    // ============================================================================
    // DELETE OPERATIONS
    // ============================================================================

    /// Remove the separator at `index` together with the child to its right.
    pub(crate) fn delete_at(&mut self, index: usize) -> (K, NodeRef<K, V>) {
        let key = self.keys.remove(index);
        let child = self.children.remove(index + 1);
        (key, child)
    }

    // ============================================================================
    // STATUS CHECKS
    // ============================================================================

    /// Returns true if this node holds `INNER_ORDER + 1` keys and must split.
    pub fn is_overflow(&self) -> bool {
        self.keys.len() > INNER_ORDER
    }

    /// Returns true if this node is below minimum occupancy.
    pub fn is_underflow(&self) -> bool {
        self.keys.len() < Self::min_keys()
    }

    /// Returns true if this node can give a key to a sibling.
    pub fn can_lend_a_key(&self) -> bool {
        self.keys.len() > Self::min_keys()
    }

    /// Minimum number of keys of a non-root inner node.
    pub const fn min_keys() -> usize {
        INNER_ORDER / 2
    }

    // ============================================================================
    // BORROWING AND MERGING HELPERS
    // ============================================================================

    /// Take the last key and last child (this node is the left lender).
    pub(crate) fn pop_last(&mut self) -> Option<(K, NodeRef<K, V>)> {
        let key = self.keys.pop()?;
        let child = self.children.pop()?;
        Some((key, child))
    }

    /// Take the first key and first child (this node is the right lender).
    pub(crate) fn pop_first(&mut self) -> Option<(K, NodeRef<K, V>)> {
        if self.keys.is_empty() || self.children.is_empty() {
            return None;
        }
        Some((self.keys.remove(0), self.children.remove(0)))
    }

    /// Accept the parent separator and a child borrowed from the left sibling.
    pub(crate) fn push_front(&mut self, separator: K, child: NodeRef<K, V>) {
        self.keys.insert(0, separator);
        self.children.insert(0, child);
    }

    /// Accept the parent separator and a child borrowed from the right sibling.
    pub(crate) fn push_back(&mut self, separator: K, child: NodeRef<K, V>) {
        self.keys.push(separator);
        self.children.push(child);
    }

    /// Absorb the right sibling, pulling the parent separator down between
    /// the two key runs. Returns the absorbed children so the caller can
    /// re-parent them.
    pub(crate) fn fusion_with(
        &mut self,
        sink_key: K,
        right: InnerNode<K, V>,
    ) -> Vec<NodeRef<K, V>> {
        let InnerNode {
            mut keys,
            children,
            ..
        } = right;
        self.keys.push(sink_key);
        self.keys.append(&mut keys);
        self.children.extend(children.iter().copied());
        children
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeId;

    fn leaf_with(keys: &[i32]) -> LeafNode<i32, String> {
        let mut leaf = LeafNode::new();
        for &k in keys {
            leaf.insert_key(k, format!("v{}", k));
        }
        leaf
    }

    fn inner_with(keys: &[i32]) -> InnerNode<i32, String> {
        let mut inner = InnerNode::new();
        inner.keys = keys.to_vec();
        inner.children = (0..=keys.len() as NodeId).map(NodeRef::leaf).collect();
        inner
    }

    #[test]
    fn test_leaf_search_and_sorted_insert() {
        let leaf = leaf_with(&[20, 5, 10]);
        assert_eq!(leaf.keys(), &[5, 10, 20]);
        assert_eq!(leaf.search(&10), Some(1));
        assert_eq!(leaf.search(&7), None);
        assert_eq!(leaf.search(&25), None);
        assert_eq!(leaf.get(&20), Some(&"v20".to_string()));
    }

    #[test]
    fn test_leaf_insert_existing_key_replaces_value() {
        let mut leaf = leaf_with(&[1, 2]);
        let old = leaf.insert_key(2, "two".to_string());
        assert_eq!(old, Some("v2".to_string()));
        assert_eq!(leaf.len(), 2);
        assert_eq!(leaf.get(&2), Some(&"two".to_string()));
    }

    #[test]
    fn test_leaf_split_keeps_middle_key_on_the_right() {
        let mut leaf = leaf_with(&[1, 2, 3, 4, 5]);
        assert!(leaf.is_overflow());
        let right = leaf.split();
        assert_eq!(leaf.keys(), &[1, 2]);
        assert_eq!(right.keys(), &[3, 4, 5]);
        assert_eq!(right.values()[0], "v3");
        assert!(!leaf.is_underflow());
    }

    #[test]
    fn test_leaf_thresholds() {
        assert_eq!(LeafNode::<i32, i32>::min_keys(), 2);
        let leaf = leaf_with(&[1]);
        assert!(leaf.is_underflow());
        assert!(!leaf_with(&[1, 2]).can_lend_a_key());
        assert!(leaf_with(&[1, 2, 3]).can_lend_a_key());
        assert!(!leaf_with(&[1, 2, 3, 4]).is_overflow());
    }

    #[test]
    fn test_leaf_delete_and_fusion() {
        let mut left = leaf_with(&[1, 2]);
        assert_eq!(left.delete(&2), Some("v2".to_string()));
        assert_eq!(left.delete(&2), None);
        left.fusion_with(leaf_with(&[7, 8]));
        assert_eq!(left.keys(), &[1, 7, 8]);
        assert_eq!(left.values(), &["v1", "v7", "v8"]);
    }

    #[test]
    fn test_inner_search_routes_exact_match_right() {
        let inner = inner_with(&[5, 10]);
        assert_eq!(inner.search(&3), 0);
        assert_eq!(inner.search(&5), 1);
        assert_eq!(inner.search(&7), 1);
        assert_eq!(inner.search(&10), 2);
        assert_eq!(inner.search(&15), 2);
        assert_eq!(inner.child_for(&15), Some(NodeRef::leaf(2)));
    }

    #[test]
    fn test_inner_split_discards_middle_key() {
        let mut inner = inner_with(&[10, 20, 30, 40, 50]);
        assert!(inner.is_overflow());
        let (right, up_key) = inner.split().unwrap();
        assert_eq!(up_key, 30);
        assert_eq!(inner.keys(), &[10, 20]);
        assert_eq!(right.keys(), &[40, 50]);
        let left_ids: Vec<NodeId> = inner.children().iter().map(NodeRef::id).collect();
        let right_ids: Vec<NodeId> = right.children().iter().map(NodeRef::id).collect();
        assert_eq!(left_ids, vec![0, 1, 2]);
        assert_eq!(right_ids, vec![3, 4, 5]);
    }

    #[test]
    fn test_inner_insert_separator_into_empty_root() {
        let mut root: InnerNode<i32, String> = InnerNode::new();
        root.insert_separator(3, NodeRef::leaf(0), NodeRef::leaf(1));
        assert_eq!(root.keys(), &[3]);
        assert_eq!(root.children(), &[NodeRef::leaf(0), NodeRef::leaf(1)]);
    }

    #[test]
    fn test_inner_insert_separator_after_left_child() {
        let mut inner = inner_with(&[10, 30]);
        inner.insert_separator(20, NodeRef::leaf(1), NodeRef::leaf(9));
        assert_eq!(inner.keys(), &[10, 20, 30]);
        let ids: Vec<NodeId> = inner.children().iter().map(NodeRef::id).collect();
        assert_eq!(ids, vec![0, 1, 9, 2]);
    }

    #[test]
    fn test_inner_delete_at_removes_right_child() {
        let mut inner = inner_with(&[10, 20, 30]);
        let (key, child) = inner.delete_at(1);
        assert_eq!(key, 20);
        assert_eq!(child, NodeRef::leaf(2));
        assert_eq!(inner.keys(), &[10, 30]);
        assert_eq!(inner.children().len(), 3);
    }

    #[test]
    fn test_inner_pop_first_takes_first_child() {
        let mut inner = inner_with(&[10, 20, 30]);
        let (key, child) = inner.pop_first().unwrap();
        assert_eq!(key, 10);
        assert_eq!(child, NodeRef::leaf(0));
        assert_eq!(inner.children()[0], NodeRef::leaf(1));
        assert_eq!(inner.keys().len() + 1, inner.children().len());
    }

    #[test]
    fn test_inner_fusion_pulls_separator_down() {
        let mut left = inner_with(&[10]);
        let mut right = inner_with(&[30, 40]);
        right.children = vec![NodeRef::leaf(7), NodeRef::leaf(8), NodeRef::leaf(9)];
        let moved = left.fusion_with(20, right);
        let moved_ids: Vec<NodeId> = moved.iter().map(NodeRef::id).collect();
        assert_eq!(moved_ids, vec![7, 8, 9]);
        assert_eq!(left.keys(), &[10, 20, 30, 40]);
        assert_eq!(left.children().len(), 5);
        assert!(!left.is_overflow());
    }
}

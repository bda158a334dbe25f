//! Tree structure management operations for BPlusTreeMap.
//!
//! Size queries, clearing and node counting, plus the shared link
//! bookkeeping both node kinds go through: parent and sibling lookups,
//! parent-scoped sibling resolution, and kind-checked node access.

use crate::arena::NodeArena;
use crate::error::{BPlusTreeError, TreeResult};
use crate::types::{
    BPlusTreeMap, InnerNode, LeafNode, NodeId, NodeKind, NodeLinks, NodeRef, NULL_NODE, ROOT_NODE,
};

// ============================================================================
// TREE STRUCTURE OPERATIONS
// ============================================================================

impl<K: Ord, V> BPlusTreeMap<K, V> {
    /// Returns the number of elements in the tree.
    pub fn len(&self) -> usize {
        self.len_recursive(&self.root)
    }

    /// Recursively count elements with proper arena access.
    fn len_recursive(&self, node: &NodeRef<K, V>) -> usize {
        match node {
            NodeRef::Leaf(id, _) => self.get_leaf(*id).map(|leaf| leaf.len()).unwrap_or(0),
            NodeRef::Inner(id, _) => self
                .get_inner(*id)
                .map(|inner| {
                    inner
                        .children
                        .iter()
                        .map(|child| self.len_recursive(child))
                        .sum()
                })
                .unwrap_or(0),
        }
    }

    /// Returns true if the tree is empty.
    pub fn is_empty(&self) -> bool {
        match self.root {
            NodeRef::Leaf(id, _) => self.get_leaf(id).map_or(true, |leaf| leaf.is_empty()),
            NodeRef::Inner(_, _) => false,
        }
    }

    /// Returns true if the root is a leaf node.
    pub fn is_leaf_root(&self) -> bool {
        self.root.is_leaf()
    }

    /// Kind of the current root node.
    pub fn root_kind(&self) -> NodeKind {
        self.root.kind()
    }

    /// Separator keys of the root, or the keys of a leaf root.
    pub fn root_keys(&self) -> Vec<&K> {
        match self.root {
            NodeRef::Leaf(id, _) => self
                .get_leaf(id)
                .map(|leaf| leaf.keys.iter().collect())
                .unwrap_or_default(),
            NodeRef::Inner(id, _) => self
                .get_inner(id)
                .map(|inner| inner.keys.iter().collect())
                .unwrap_or_default(),
        }
    }

    /// Number of levels, counting the leaf level. An empty tree has height 1.
    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut current = self.root;
        while let NodeRef::Inner(id, _) = current {
            match self.get_inner(id).and_then(|inner| inner.children.first()) {
                Some(child) => current = *child,
                None => break,
            }
            height += 1;
        }
        height
    }

    /// Returns the number of leaf nodes in the tree.
    pub fn leaf_count(&self) -> usize {
        self.count_nodes_in_tree().0
    }

    /// Count the leaf and inner nodes reachable from the root.
    pub fn count_nodes_in_tree(&self) -> (usize, usize) {
        self.count_nodes_recursive(&self.root)
    }

    fn count_nodes_recursive(&self, node: &NodeRef<K, V>) -> (usize, usize) {
        match node {
            NodeRef::Leaf(_, _) => (1, 0),
            NodeRef::Inner(id, _) => match self.get_inner(*id) {
                Some(inner) => inner.children.iter().fold((0, 1), |(leaves, inners), child| {
                    let (child_leaves, child_inners) = self.count_nodes_recursive(child);
                    (leaves + child_leaves, inners + child_inners)
                }),
                // Invalid inner reference
                None => (0, 0),
            },
        }
    }

    /// Clear all items from the tree.
    pub fn clear(&mut self) {
        self.inner_arena.clear();
        self.leaf_arena = NodeArena::with_first(LeafNode::new());
        self.root = NodeRef::leaf(ROOT_NODE);
    }
}

// ============================================================================
// NODE LINK BOOKKEEPING
// ============================================================================

impl<K: Ord, V> BPlusTreeMap<K, V> {
    /// Parent and sibling links of either node kind.
    pub(crate) fn links_of(&self, node: NodeRef<K, V>) -> TreeResult<NodeLinks> {
        match node {
            NodeRef::Leaf(id, _) => Ok(self.leaf_node(id)?.links),
            NodeRef::Inner(id, _) => Ok(self.inner_node(id)?.links),
        }
    }

    pub(crate) fn links_mut(&mut self, node: NodeRef<K, V>) -> TreeResult<&mut NodeLinks> {
        match node {
            NodeRef::Leaf(id, _) => Ok(&mut self.leaf_node_mut(id)?.links),
            NodeRef::Inner(id, _) => Ok(&mut self.inner_node_mut(id)?.links),
        }
    }

    pub(crate) fn set_parent(&mut self, node: NodeRef<K, V>, parent: NodeId) -> TreeResult<()> {
        self.links_mut(node)?.parent = parent;
        Ok(())
    }

    /// Parent of `node` as a reference, `None` for the root.
    pub(crate) fn parent_of(&self, node: NodeRef<K, V>) -> TreeResult<Option<NodeRef<K, V>>> {
        let parent = self.links_of(node)?.parent;
        if parent == NULL_NODE {
            Ok(None)
        } else {
            Ok(Some(NodeRef::inner(parent)))
        }
    }

    /// Left sibling of `node`, honoured only while it shares `node`'s parent.
    pub(crate) fn left_sibling(&self, node: NodeRef<K, V>) -> TreeResult<Option<NodeRef<K, V>>> {
        let links = self.links_of(node)?;
        self.scoped_sibling(node, links.left, links.parent)
    }

    /// Right sibling of `node`, honoured only while it shares `node`'s parent.
    pub(crate) fn right_sibling(&self, node: NodeRef<K, V>) -> TreeResult<Option<NodeRef<K, V>>> {
        let links = self.links_of(node)?;
        self.scoped_sibling(node, links.right, links.parent)
    }

    fn scoped_sibling(
        &self,
        node: NodeRef<K, V>,
        sibling: NodeId,
        parent: NodeId,
    ) -> TreeResult<Option<NodeRef<K, V>>> {
        let sibling = match node.same_kind(sibling) {
            Some(sibling) => sibling,
            None => return Ok(None),
        };
        if self.links_of(sibling)?.parent == parent {
            Ok(Some(sibling))
        } else {
            Ok(None)
        }
    }

    /// Make `left` and `right` neighbours in their level's chain. A `None`
    /// side is not written; the other side then records an absent link.
    pub(crate) fn join_siblings(
        &mut self,
        left: Option<NodeRef<K, V>>,
        right: Option<NodeRef<K, V>>,
    ) -> TreeResult<()> {
        let left_id = left.map_or(NULL_NODE, |n| n.id());
        let right_id = right.map_or(NULL_NODE, |n| n.id());
        if let Some(left) = left {
            self.links_mut(left)?.right = right_id;
        }
        if let Some(right) = right {
            self.links_mut(right)?.left = left_id;
        }
        Ok(())
    }

    pub(crate) fn can_lend_a_key(&self, node: NodeRef<K, V>) -> TreeResult<bool> {
        match node {
            NodeRef::Leaf(id, _) => Ok(self.leaf_node(id)?.can_lend_a_key()),
            NodeRef::Inner(id, _) => Ok(self.inner_node(id)?.can_lend_a_key()),
        }
    }

    /// Inner node behind `node`, or `InvalidNodeKind` naming `operation`.
    pub(crate) fn expect_inner(
        &self,
        node: NodeRef<K, V>,
        operation: &'static str,
    ) -> TreeResult<&InnerNode<K, V>> {
        match node {
            NodeRef::Inner(id, _) => self.inner_node(id),
            NodeRef::Leaf(_, _) => Err(BPlusTreeError::invalid_node_kind(operation, NodeKind::Leaf)),
        }
    }

    pub(crate) fn expect_inner_mut(
        &mut self,
        node: NodeRef<K, V>,
        operation: &'static str,
    ) -> TreeResult<&mut InnerNode<K, V>> {
        match node {
            NodeRef::Inner(id, _) => self.inner_node_mut(id),
            NodeRef::Leaf(_, _) => Err(BPlusTreeError::invalid_node_kind(operation, NodeKind::Leaf)),
        }
    }

    /// Index of `child` in `parent`, or a corruption error if it is missing.
    pub(crate) fn child_position(
        &self,
        parent: NodeRef<K, V>,
        child: NodeRef<K, V>,
    ) -> TreeResult<usize> {
        self.expect_inner(parent, "locate child")?
            .child_index(child)
            .ok_or_else(|| {
                BPlusTreeError::corrupted_tree(
                    "Parent link",
                    &format!("node {} is not a child of inner {}", child.id(), parent.id()),
                )
            })
    }
}

//! Core types and data structures for BPlusTreeMap.
//!
//! This module contains the fundamental data structures, type definitions,
//! and constants used throughout the B+ tree implementation.

use crate::arena::NodeArena;
use std::fmt;
use std::marker::PhantomData;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Fan-out of leaf nodes. A leaf overflows at `LEAF_ORDER + 1` keys.
pub const LEAF_ORDER: usize = 4;

/// Fan-out of inner nodes. An inner node overflows at `INNER_ORDER + 1` keys.
pub const INNER_ORDER: usize = 4;

// ============================================================================
// TYPE DEFINITIONS
// ============================================================================

/// Node ID type for arena-based allocation
pub type NodeId = u32;

/// Marks an absent parent or sibling link.
pub const NULL_NODE: NodeId = u32::MAX;

/// Id of the leaf a freshly constructed tree starts with.
pub const ROOT_NODE: NodeId = 0;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// B+ tree index with parent and sibling links.
///
/// All values live in leaves, which form a doubly linked chain in key order.
/// Inner nodes hold separator keys and one more child than keys. Both node
/// kinds are stored in arenas and addressed by [`NodeId`]; children and the
/// root are owning references, parent and sibling links are plain ids.
///
/// # Examples
///
/// ```
/// use bplustree_index::BPlusTreeMap;
///
/// let mut tree = BPlusTreeMap::new();
/// tree.insert(1, "one");
/// tree.insert(2, "two");
/// tree.insert(3, "three");
///
/// assert_eq!(tree.search(&2), Some(&"two"));
/// assert!(tree.delete(&2));
/// assert!(!tree.delete(&2));
/// assert_eq!(tree.len(), 2);
/// ```
///
/// # Performance Characteristics
///
/// - **Insertion**: O(log n)
/// - **Lookup**: O(log n)
/// - **Deletion**: O(log n)
#[derive(Debug)]
pub struct BPlusTreeMap<K, V> {
    /// The root node of the tree.
    pub(crate) root: NodeRef<K, V>,
    /// Arena storage for leaf nodes.
    pub(crate) leaf_arena: NodeArena<LeafNode<K, V>>,
    /// Arena storage for inner nodes.
    pub(crate) inner_arena: NodeArena<InnerNode<K, V>>,
}

/// Non-owning back-references shared by both node kinds.
///
/// `parent` is always an inner node id. `left` and `right` point at nodes of
/// the same kind and are only meaningful while that node has the same parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeLinks {
    pub parent: NodeId,
    pub left: NodeId,
    pub right: NodeId,
}

impl NodeLinks {
    /// Links of a detached node.
    pub const fn detached() -> Self {
        Self {
            parent: NULL_NODE,
            left: NULL_NODE,
            right: NULL_NODE,
        }
    }

    /// Returns true if this node currently has no parent (it is the root).
    pub fn is_root(&self) -> bool {
        self.parent == NULL_NODE
    }
}

/// Leaf node containing key-value pairs.
#[derive(Debug, Clone)]
pub struct LeafNode<K, V> {
    /// Sorted list of keys.
    pub(crate) keys: Vec<K>,
    /// Values index-aligned with `keys`.
    pub(crate) values: Vec<V>,
    /// Parent and position in the leaf chain.
    pub(crate) links: NodeLinks,
}

/// Inner node containing separator keys and child references.
#[derive(Debug, Clone)]
pub struct InnerNode<K, V> {
    /// Sorted list of separator keys.
    pub(crate) keys: Vec<K>,
    /// Child nodes; `keys.len() + 1` entries once populated.
    pub(crate) children: Vec<NodeRef<K, V>>,
    /// Parent and position among inner nodes of the same level.
    pub(crate) links: NodeLinks,
}

// ============================================================================
// ENUMS AND RESULT TYPES
// ============================================================================

/// Kind tag used for dispatch and error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Leaf,
    Inner,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Leaf => write!(f, "leaf"),
            NodeKind::Inner => write!(f, "inner"),
        }
    }
}

/// Node reference that can be either a leaf or inner node
#[derive(Debug)]
pub enum NodeRef<K, V> {
    Leaf(NodeId, PhantomData<(K, V)>),
    Inner(NodeId, PhantomData<(K, V)>),
}

impl<K, V> Clone for NodeRef<K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for NodeRef<K, V> {}

impl<K, V> PartialEq for NodeRef<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.id() == other.id()
    }
}

impl<K, V> Eq for NodeRef<K, V> {}

impl<K, V> NodeRef<K, V> {
    /// Reference to the leaf with the given id.
    pub fn leaf(id: NodeId) -> Self {
        NodeRef::Leaf(id, PhantomData)
    }

    /// Reference to the inner node with the given id.
    pub fn inner(id: NodeId) -> Self {
        NodeRef::Inner(id, PhantomData)
    }

    /// Return the raw node ID.
    pub fn id(&self) -> NodeId {
        match *self {
            NodeRef::Leaf(id, _) => id,
            NodeRef::Inner(id, _) => id,
        }
    }

    /// Return the kind tag of the referenced node.
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeRef::Leaf(_, _) => NodeKind::Leaf,
            NodeRef::Inner(_, _) => NodeKind::Inner,
        }
    }

    /// Returns true if this reference points to a leaf node.
    pub fn is_leaf(&self) -> bool {
        matches!(self, NodeRef::Leaf(_, _))
    }

    /// A reference of the same kind to `id`, or `None` for [`NULL_NODE`].
    /// Sibling links always join nodes of one kind.
    pub fn same_kind(&self, id: NodeId) -> Option<Self> {
        if id == NULL_NODE {
            return None;
        }
        Some(match self {
            NodeRef::Leaf(_, _) => NodeRef::leaf(id),
            NodeRef::Inner(_, _) => NodeRef::inner(id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_ref_equality_uses_kind_and_id() {
        let leaf: NodeRef<i32, String> = NodeRef::leaf(3);
        assert_eq!(leaf, NodeRef::leaf(3));
        assert_ne!(leaf, NodeRef::inner(3));
        assert_ne!(leaf, NodeRef::leaf(4));
    }

    #[test]
    fn test_same_kind_respects_null() {
        let inner: NodeRef<i32, i32> = NodeRef::inner(1);
        assert_eq!(inner.same_kind(NULL_NODE), None);
        assert_eq!(inner.same_kind(9), Some(NodeRef::inner(9)));
        assert_eq!(inner.same_kind(9).map(|r| r.kind()), Some(NodeKind::Inner));
    }

    #[test]
    fn test_detached_links() {
        let links = NodeLinks::detached();
        assert!(links.is_root());
        assert_eq!(links.left, NULL_NODE);
        assert_eq!(links.right, NULL_NODE);
    }
}

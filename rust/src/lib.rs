//! B+ Tree index in Rust with parent and sibling links.
//!
//! This crate provides an in-memory B+ tree of fixed order 4. Values live in
//! leaves chained left to right; inner nodes route lookups by separator keys.
//! Inserts split full nodes and push the middle key up, deletes rebalance
//! underfull nodes by borrowing from or fusing with a sibling.
//!
//! Nodes live in per-kind arenas and refer to each other by [`NodeId`]:
//! children are owning references, parent and sibling links are plain ids.

#[macro_use]
mod macros;

mod arena;
mod construction;
mod delete_operations;
mod error;
mod get_operations;
mod insert_operations;
mod node;
mod tree_structure;
mod types;
mod validation;

pub use arena::{ArenaStats, NodeArena};
pub use error::{
    BPlusTreeError, BTreeResult, BTreeResultExt, InitResult, KeyResult, ModifyResult,
};
pub use types::{
    BPlusTreeMap, InnerNode, LeafNode, NodeId, NodeKind, NodeLinks, NodeRef, INNER_ORDER,
    LEAF_ORDER, NULL_NODE, ROOT_NODE,
};

//! Error handling and result types for BPlusTreeMap operations.
//!
//! Absence of a key is never an error for `search`/`delete`; these types cover
//! the fallible `try_*` surface and the structural failures that internal
//! rebalancing helpers propagate with `?`.

use crate::types::NodeKind;
use thiserror::Error;

/// Error type for B+ tree operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BPlusTreeError {
    /// Key not found in the tree.
    #[error("Key not found in tree")]
    KeyNotFound,
    /// A leaf-only or inner-only operation was invoked on the wrong node kind.
    #[error("Invalid operation for node kind: {operation} on {kind} node")]
    InvalidNodeKind {
        operation: &'static str,
        kind: NodeKind,
    },
    /// Internal data structure integrity violation.
    #[error("Data integrity error: {0}")]
    DataIntegrityError(String),
    /// Arena operation failed.
    #[error("Arena error: {0}")]
    ArenaError(String),
    /// Tree corruption detected.
    #[error("Corrupted tree: {0}")]
    CorruptedTree(String),
    /// Memory allocation failed.
    #[error("Allocation error: {0}")]
    AllocationError(String),
}

impl BPlusTreeError {
    /// Create an InvalidNodeKind error for `operation` attempted on `kind`.
    pub fn invalid_node_kind(operation: &'static str, kind: NodeKind) -> Self {
        Self::InvalidNodeKind { operation, kind }
    }

    /// Create a DataIntegrityError with context
    pub fn data_integrity(context: &str, details: &str) -> Self {
        Self::DataIntegrityError(format!("{}: {}", context, details))
    }

    /// Create an ArenaError with context
    pub fn arena_error(operation: &str, details: &str) -> Self {
        Self::ArenaError(format!("{} failed: {}", operation, details))
    }

    /// Create a CorruptedTree error with context
    pub fn corrupted_tree(component: &str, details: &str) -> Self {
        Self::CorruptedTree(format!("{} corruption: {}", component, details))
    }

    /// Create an AllocationError with context
    pub fn allocation_error(resource: &str, reason: &str) -> Self {
        Self::AllocationError(format!("Failed to allocate {}: {}", resource, reason))
    }

    /// Check if this error reports a node kind misuse
    pub fn is_node_kind_error(&self) -> bool {
        matches!(self, Self::InvalidNodeKind { .. })
    }

    /// Check if this error is an arena error
    pub fn is_arena_error(&self) -> bool {
        matches!(self, Self::ArenaError(_))
    }
}

/// Internal result type for tree operations
pub(crate) type TreeResult<T> = Result<T, BPlusTreeError>;

/// Public result type for tree operations that may fail
pub type BTreeResult<T> = Result<T, BPlusTreeError>;

/// Result type for key lookup operations
pub type KeyResult<T> = Result<T, BPlusTreeError>;

/// Result type for tree modification operations
pub type ModifyResult<T> = Result<T, BPlusTreeError>;

/// Result type for tree construction and validation
pub type InitResult<T> = Result<T, BPlusTreeError>;

/// Result extension trait for attaching operation context to errors.
pub trait BTreeResultExt<T> {
    /// Convert to a BTreeResult with additional context
    fn with_context(self, context: &str) -> BTreeResult<T>;

    /// Convert to a BTreeResult with operation context
    fn with_operation(self, operation: &str) -> BTreeResult<T>;
}

impl<T> BTreeResultExt<T> for Result<T, BPlusTreeError> {
    fn with_context(self, context: &str) -> BTreeResult<T> {
        self.map_err(|e| match e {
            BPlusTreeError::KeyNotFound => BPlusTreeError::KeyNotFound,
            kind @ BPlusTreeError::InvalidNodeKind { .. } => kind,
            BPlusTreeError::DataIntegrityError(msg) => {
                BPlusTreeError::data_integrity(context, &msg)
            }
            BPlusTreeError::ArenaError(msg) => BPlusTreeError::arena_error(context, &msg),
            BPlusTreeError::CorruptedTree(msg) => BPlusTreeError::corrupted_tree(context, &msg),
            BPlusTreeError::AllocationError(msg) => BPlusTreeError::allocation_error(context, &msg),
        })
    }

    fn with_operation(self, operation: &str) -> BTreeResult<T> {
        self.with_context(&format!("Operation '{}'", operation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_node_kind_message() {
        let err = BPlusTreeError::invalid_node_kind("push up key", NodeKind::Leaf);
        assert!(err.is_node_kind_error());
        assert_eq!(
            err.to_string(),
            "Invalid operation for node kind: push up key on leaf node"
        );
    }

    #[test]
    fn test_with_context_wraps_message() {
        let result: BTreeResult<()> = Err(BPlusTreeError::arena_error("lookup", "node 7 missing"));
        let err = result.with_operation("delete").unwrap_err();
        assert!(err.is_arena_error());
        assert_eq!(
            err.to_string(),
            "Arena error: Operation 'delete' failed: lookup failed: node 7 missing"
        );
    }

    #[test]
    fn test_with_context_keeps_key_not_found() {
        let result: KeyResult<()> = Err(BPlusTreeError::KeyNotFound);
        assert_eq!(result.with_context("get"), Err(BPlusTreeError::KeyNotFound));
    }
}

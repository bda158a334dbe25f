//! Slot arena backing the leaf and inner node storage.
//!
//! Freed slots are recycled through a free list. Ids handed out stay valid
//! until the slot is deallocated; the tree rewires every link pointing at a
//! node before it deallocates that node, so a recycled id is never reached
//! through a stale link.

use crate::error::{BPlusTreeError, BTreeResult};
use crate::types::{NodeId, NULL_NODE, ROOT_NODE};

/// Statistics for a node arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaStats {
    pub total_slots: usize,
    pub allocated_count: usize,
    pub free_count: usize,
}

/// Arena of optional slots addressed by [`NodeId`].
#[derive(Debug)]
pub struct NodeArena<T> {
    slots: Vec<Option<T>>,
    free_list: Vec<usize>,
    allocated: usize,
}

impl<T> NodeArena<T> {
    /// Create a new empty arena
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            allocated: 0,
        }
    }

    /// Create an arena holding `item` in slot [`ROOT_NODE`].
    pub fn with_first(item: T) -> Self {
        Self {
            slots: vec![Some(item)],
            free_list: Vec::new(),
            allocated: 1,
        }
    }

    /// Store `item` and return its id, reusing a free slot when one exists.
    pub fn allocate(&mut self, item: T) -> BTreeResult<NodeId> {
        let index = match self.free_list.pop() {
            Some(free_index) => {
                self.slots[free_index] = Some(item);
                free_index
            }
            None => {
                let index = self.slots.len();
                // NULL_NODE is reserved as the absent-link sentinel
                if index >= NULL_NODE as usize {
                    return Err(BPlusTreeError::allocation_error(
                        "node slot",
                        "arena exhausted the NodeId space",
                    ));
                }
                self.slots.push(Some(item));
                index
            }
        };
        self.allocated += 1;

        NodeId::try_from(index)
            .map_err(|_| BPlusTreeError::allocation_error("node slot", "index exceeds NodeId"))
    }

    /// Remove an item from the arena and return it.
    pub fn deallocate(&mut self, id: NodeId) -> Option<T> {
        let index = Self::index_of(id)?;
        let item = self.slots.get_mut(index)?.take()?;
        self.free_list.push(index);
        self.allocated -= 1;
        Some(item)
    }

    /// Get a reference to an item in the arena
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&T> {
        let index = Self::index_of(id)?;
        self.slots.get(index)?.as_ref()
    }

    /// Get a mutable reference to an item in the arena
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        let index = Self::index_of(id)?;
        self.slots.get_mut(index)?.as_mut()
    }

    /// Check if an ID is valid and allocated
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Get the number of allocated items
    pub fn len(&self) -> usize {
        self.allocated
    }

    /// Check if the arena is empty
    pub fn is_empty(&self) -> bool {
        self.allocated == 0
    }

    /// Get the number of free slots
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    /// Clear all items from the arena
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
        self.allocated = 0;
    }

    /// Get arena statistics
    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            total_slots: self.slots.len(),
            allocated_count: self.allocated,
            free_count: self.free_list.len(),
        }
    }

    fn index_of(id: NodeId) -> Option<usize> {
        if id == NULL_NODE {
            return None;
        }
        usize::try_from(id).ok()
    }
}

impl<T> Default for NodeArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

//! Macros generating the per-kind arena accessors of `BPlusTreeMap`.

/// Generates `get_<kind>`, `get_<kind>_mut`, `allocate_<kind>`,
/// `deallocate_<kind>` and the error-reporting `<kind>_node` /
/// `<kind>_node_mut` lookups for one node arena.
macro_rules! arena_accessors {
    ($kind:ident, $node:ident, $arena:ident) => {
        paste::paste! {
            impl<K, V> $crate::types::BPlusTreeMap<K, V> {
                #[doc = "Get a reference to a " $kind " node in the arena."]
                pub fn [<get_ $kind>](
                    &self,
                    id: $crate::types::NodeId,
                ) -> Option<&$crate::types::$node<K, V>> {
                    self.$arena.get(id)
                }

                #[doc = "Get a mutable reference to a " $kind " node in the arena."]
                pub fn [<get_ $kind _mut>](
                    &mut self,
                    id: $crate::types::NodeId,
                ) -> Option<&mut $crate::types::$node<K, V>> {
                    self.$arena.get_mut(id)
                }

                #[doc = "Allocate a new " $kind " node in the arena and return its ID."]
                pub(crate) fn [<allocate_ $kind>](
                    &mut self,
                    node: $crate::types::$node<K, V>,
                ) -> $crate::error::TreeResult<$crate::types::NodeId> {
                    self.$arena.allocate(node)
                }

                #[doc = "Deallocate a " $kind " node from the arena."]
                pub(crate) fn [<deallocate_ $kind>](
                    &mut self,
                    id: $crate::types::NodeId,
                ) -> Option<$crate::types::$node<K, V>> {
                    self.$arena.deallocate(id)
                }

                pub(crate) fn [<$kind _node>](
                    &self,
                    id: $crate::types::NodeId,
                ) -> $crate::error::TreeResult<&$crate::types::$node<K, V>> {
                    self.$arena.get(id).ok_or_else(|| {
                        $crate::error::BPlusTreeError::arena_error(
                            concat!(stringify!($kind), " lookup"),
                            &format!("node {} is not allocated", id),
                        )
                    })
                }

                pub(crate) fn [<$kind _node_mut>](
                    &mut self,
                    id: $crate::types::NodeId,
                ) -> $crate::error::TreeResult<&mut $crate::types::$node<K, V>> {
                    self.$arena.get_mut(id).ok_or_else(|| {
                        $crate::error::BPlusTreeError::arena_error(
                            concat!(stringify!($kind), " lookup"),
                            &format!("node {} is not allocated", id),
                        )
                    })
                }

                #[doc = "Statistics for the " $kind " node arena."]
                pub fn [<$kind _arena_stats>](&self) -> $crate::arena::ArenaStats {
                    self.$arena.stats()
                }
            }
        }
    };
}

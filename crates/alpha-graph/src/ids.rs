use alpha_core::NodeId;

const INDEX_BITS: u32 = 32;
const INDEX_MASK: u64 = (1 << INDEX_BITS) - 1;

/// Converts a [`NodeId`] into its slot index within the arena.
pub(crate) fn node_index(id: NodeId) -> usize {
    (id.as_raw() & INDEX_MASK) as usize
}

/// Returns the slot generation encoded in a [`NodeId`].
pub(crate) fn node_generation(id: NodeId) -> u32 {
    (id.as_raw() >> INDEX_BITS) as u32
}

/// Creates a [`NodeId`] from a slot index and the slot's current generation.
///
/// A recycled slot bumps its generation, so handles to the previous occupant
/// stop resolving.
pub(crate) fn make_node(index: usize, generation: u32) -> NodeId {
    NodeId::from_raw(((generation as u64) << INDEX_BITS) | (index as u64 & INDEX_MASK))
}

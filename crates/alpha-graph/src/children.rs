use alpha_core::errors::{AlphaError, ErrorInfo};
use alpha_core::NodeId;

/// Unordered collection of child handles owned by a container node.
///
/// The logical capacity doubles when a push would overflow it and halves once
/// occupancy drops to half, never going below the configured floor. Removal
/// swaps the last entry into the vacated slot; nothing else is reordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildList {
    items: Vec<NodeId>,
    capacity: usize,
    floor: usize,
}

impl ChildList {
    /// Creates an empty list whose capacity never drops below `floor`.
    ///
    /// Storage is not allocated until the first push.
    pub fn new(floor: usize) -> Self {
        let floor = floor.max(1);
        Self {
            items: Vec::new(),
            capacity: floor,
            floor,
        }
    }

    /// Number of children currently stored.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list holds no children.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Current logical capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Read-only view of the stored handles, in storage order.
    pub fn as_slice(&self) -> &[NodeId] {
        &self.items
    }

    /// Whether `node` is stored in this list (identity comparison).
    pub fn contains(&self, node: NodeId) -> bool {
        self.items.contains(&node)
    }

    /// Appends a child, doubling the capacity when it would overflow.
    ///
    /// On allocation failure the list is left exactly as it was.
    pub fn push(&mut self, node: NodeId) -> Result<(), AlphaError> {
        self.reserve(1)?;
        self.items.push(node);
        Ok(())
    }

    /// Ensures room for `additional` more children without further allocation.
    pub fn reserve(&mut self, additional: usize) -> Result<(), AlphaError> {
        let needed = self.items.len().saturating_add(additional);
        let mut capacity = self.capacity;
        while capacity < needed {
            capacity = capacity.saturating_mul(2);
        }
        if self.items.capacity() < capacity {
            self.items.try_reserve_exact(capacity - self.items.len())?;
        }
        self.capacity = capacity;
        Ok(())
    }

    /// Removes `node` by identity, moving the last entry into its slot.
    pub fn remove(&mut self, node: NodeId) -> Result<(), AlphaError> {
        let position = self
            .items
            .iter()
            .position(|candidate| *candidate == node)
            .ok_or_else(|| {
                AlphaError::NotFound(
                    ErrorInfo::new("child-missing", "node is not stored in this child list")
                        .with_context("node", node.to_string()),
                )
            })?;
        self.items.swap_remove(position);
        self.shrink();
        Ok(())
    }

    /// Empties the list, returning the former children and resetting capacity.
    pub(crate) fn take(&mut self) -> Vec<NodeId> {
        self.capacity = self.floor;
        std::mem::take(&mut self.items)
    }

    fn shrink(&mut self) {
        let half = self.capacity / 2;
        if self.items.len() <= half && half >= self.floor {
            self.capacity = half;
            self.items.shrink_to(half);
        }
    }
}

use alpha_core::errors::{AlphaError, ErrorInfo};
use alpha_core::{Digest, ExistentialGraph, NodeId, NodeKind};

use crate::children::ChildList;
use crate::flags::GraphConfig;
use crate::ids::{make_node, node_generation, node_index};

#[derive(Debug, Clone)]
pub(crate) struct NodeRecord {
    pub(crate) kind: NodeKind,
    pub(crate) name: Option<String>,
    pub(crate) children: ChildList,
    pub(crate) parent: Option<NodeId>,
    pub(crate) depth: usize,
    pub(crate) digest: Digest,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    record: Option<NodeRecord>,
}

/// Arena-backed existential graph.
///
/// Nodes are owned by the arena and addressed through copyable [`NodeId`]
/// handles. The parent link is a plain handle, so ownership only flows from a
/// node to its children. Freed slots are recycled with a bumped generation,
/// which makes stale handles fail lookups instead of aliasing a new node.
#[derive(Debug, Clone)]
pub struct AlphaGraph {
    config: GraphConfig,
    slots: Vec<Slot>,
    free: Vec<usize>,
    root: Option<NodeId>,
    live: usize,
    #[cfg(test)]
    alloc_budget: Option<usize>,
    #[cfg(test)]
    reserve_budget: Option<usize>,
}

impl AlphaGraph {
    /// Creates an empty graph without a root.
    pub fn new(config: GraphConfig) -> Self {
        Self {
            config,
            slots: Vec::new(),
            free: Vec::new(),
            root: None,
            live: 0,
            #[cfg(test)]
            alloc_budget: None,
            #[cfg(test)]
            reserve_budget: None,
        }
    }

    /// Creates a graph holding only an empty sheet of assertion.
    pub fn with_sheet(config: GraphConfig) -> Result<Self, AlphaError> {
        let mut graph = Self::new(config);
        graph.create_node(None, NodeKind::And, None)?;
        Ok(graph)
    }

    /// Returns the configuration used by this graph.
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Number of live nodes, root included.
    pub fn node_count(&self) -> usize {
        self.live
    }

    /// Whether `node` names a live node of this graph.
    pub fn contains(&self, node: NodeId) -> bool {
        self.record(node).is_ok()
    }

    /// Returns the child list of a node, including its capacity bookkeeping.
    pub fn child_list(&self, node: NodeId) -> Result<&ChildList, AlphaError> {
        Ok(&self.record(node)?.children)
    }

    /// Returns the strict ancestors of `node`, nearest first.
    pub fn ancestors(&self, node: NodeId) -> Result<Vec<NodeId>, AlphaError> {
        let mut chain = Vec::new();
        let mut cursor = self.record(node)?.parent;
        while let Some(current) = cursor {
            chain.push(current);
            cursor = self.record(current)?.parent;
        }
        Ok(chain)
    }

    /// Whether `ancestor` is `node` itself or lies on its parent chain.
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> Result<bool, AlphaError> {
        self.record(ancestor)?;
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return Ok(true);
            }
            cursor = self.record(current)?.parent;
        }
        Ok(false)
    }

    /// Returns every node of the subtree rooted at `node`, in pre-order.
    pub fn subtree(&self, node: NodeId) -> Result<Vec<NodeId>, AlphaError> {
        self.record(node)?;
        let mut order = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            order.push(current);
            let record = self.record(current)?;
            stack.extend(record.children.as_slice().iter().rev().copied());
        }
        Ok(order)
    }

    /// Checks every structural invariant of the graph.
    ///
    /// Intended for tests and drivers that want to assert well-formedness
    /// after a batch of edits. Reports the first violation found.
    pub fn verify_invariants(&self) -> Result<(), AlphaError> {
        let Some(root) = self.root else {
            if self.live == 0 {
                return Ok(());
            }
            return Err(invariant_error("orphaned-nodes", "live nodes exist without a root")
                .with_context("live", self.live));
        };
        let record = self.record(root)?;
        if record.kind != NodeKind::And || record.parent.is_some() || record.depth != 0 {
            return Err(invariant_error("bad-root", "root must be a parentless depth-0 and")
                .with_context("node", root));
        }
        let reachable = self.subtree(root)?;
        if reachable.len() != self.live {
            return Err(invariant_error("unreachable-nodes", "live nodes not reachable from root")
                .with_context("reachable", reachable.len())
                .with_context("live", self.live));
        }
        for node in reachable {
            let record = self.record(node)?;
            let expected_digest = self.local_digest(record)?;
            if expected_digest != record.digest {
                return Err(invariant_error("stale-digest", "digest does not match children")
                    .with_context("node", node));
            }
            match record.kind {
                NodeKind::Prop => {
                    let named = record
                        .name
                        .as_deref()
                        .is_some_and(|name| self.config.accepts_name(name));
                    if !named || !record.children.is_empty() {
                        return Err(invariant_error("bad-prop", "malformed proposition")
                            .with_context("node", node));
                    }
                }
                NodeKind::And if node != root => {
                    return Err(invariant_error("nested-and", "and node below the root")
                        .with_context("node", node));
                }
                _ => {}
            }
            for child in record.children.as_slice() {
                let child_record = self.record(*child)?;
                if child_record.parent != Some(node) {
                    return Err(invariant_error("bad-parent", "child points at another parent")
                        .with_context("node", *child));
                }
                if child_record.depth != depth_under(child_record.kind, record.depth) {
                    return Err(invariant_error("bad-depth", "depth disagrees with parent")
                        .with_context("node", *child));
                }
            }
        }
        Ok(())
    }

    pub(crate) fn record(&self, id: NodeId) -> Result<&NodeRecord, AlphaError> {
        self.slots
            .get(node_index(id))
            .filter(|slot| slot.generation == node_generation(id))
            .and_then(|slot| slot.record.as_ref())
            .ok_or_else(|| unknown_node(id))
    }

    pub(crate) fn record_mut(&mut self, id: NodeId) -> Result<&mut NodeRecord, AlphaError> {
        self.slots
            .get_mut(node_index(id))
            .filter(|slot| slot.generation == node_generation(id))
            .and_then(|slot| slot.record.as_mut())
            .ok_or_else(|| unknown_node(id))
    }

    pub(crate) fn set_root(&mut self, root: Option<NodeId>) {
        self.root = root;
    }

    /// Stores a record in a free slot and returns its handle.
    pub(crate) fn alloc(&mut self, record: NodeRecord) -> Result<NodeId, AlphaError> {
        #[cfg(test)]
        charge(&mut self.alloc_budget)?;
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.record = Some(record);
                make_node(index, slot.generation)
            }
            None => {
                self.slots.try_reserve(1)?;
                let index = self.slots.len();
                self.slots.push(Slot {
                    generation: 0,
                    record: Some(record),
                });
                make_node(index, 0)
            }
        };
        self.live += 1;
        Ok(id)
    }

    /// Makes room for `additional` more children of `parent` without moving anything.
    pub(crate) fn reserve_children(
        &mut self,
        parent: NodeId,
        additional: usize,
    ) -> Result<(), AlphaError> {
        #[cfg(test)]
        charge(&mut self.reserve_budget)?;
        self.record_mut(parent)?.children.reserve(additional)
    }

    /// Releases the slot held by `id`. The node must already be unlinked.
    pub(crate) fn release(&mut self, id: NodeId) -> Option<NodeRecord> {
        let index = node_index(id);
        let slot = self
            .slots
            .get_mut(index)
            .filter(|slot| slot.generation == node_generation(id))?;
        let record = slot.record.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        self.live -= 1;
        if self.root == Some(id) {
            self.root = None;
        }
        Some(record)
    }
}

#[cfg(test)]
impl AlphaGraph {
    /// Lets the next `budget` node allocations succeed and fails every later one.
    pub(crate) fn limit_allocations(&mut self, budget: usize) {
        self.alloc_budget = Some(budget);
    }

    /// Same as [`limit_allocations`](Self::limit_allocations) for up-front
    /// child-list reservations.
    pub(crate) fn limit_reservations(&mut self, budget: usize) {
        self.reserve_budget = Some(budget);
    }
}

#[cfg(test)]
fn charge(budget: &mut Option<usize>) -> Result<(), AlphaError> {
    let Some(left) = budget.as_mut() else {
        return Ok(());
    };
    if *left == 0 {
        return Err(AlphaError::OutOfMemory(ErrorInfo::new(
            "alloc-failed",
            "test allocation budget exhausted",
        )));
    }
    *left -= 1;
    Ok(())
}

impl Default for AlphaGraph {
    fn default() -> Self {
        Self::new(GraphConfig::default())
    }
}

impl ExistentialGraph for AlphaGraph {
    fn root(&self) -> Option<NodeId> {
        self.root
    }

    fn nodes(&self) -> Box<dyn ExactSizeIterator<Item = NodeId> + '_> {
        let ids: Vec<NodeId> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.record.is_some())
            .map(|(index, slot)| make_node(index, slot.generation))
            .collect();
        Box::new(ids.into_iter())
    }

    fn kind(&self, node: NodeId) -> Result<NodeKind, AlphaError> {
        Ok(self.record(node)?.kind)
    }

    fn name(&self, node: NodeId) -> Result<Option<&str>, AlphaError> {
        Ok(self.record(node)?.name.as_deref())
    }

    fn depth(&self, node: NodeId) -> Result<usize, AlphaError> {
        Ok(self.record(node)?.depth)
    }

    fn digest(&self, node: NodeId) -> Result<Digest, AlphaError> {
        Ok(self.record(node)?.digest)
    }

    fn parent(&self, node: NodeId) -> Result<Option<NodeId>, AlphaError> {
        Ok(self.record(node)?.parent)
    }

    fn children(&self, node: NodeId) -> Result<&[NodeId], AlphaError> {
        Ok(self.record(node)?.children.as_slice())
    }
}

/// Depth of a node of `kind` placed under a parent at `parent_depth`.
pub(crate) fn depth_under(kind: NodeKind, parent_depth: usize) -> usize {
    match kind {
        NodeKind::Cut => parent_depth + 1,
        NodeKind::And | NodeKind::Prop => parent_depth,
    }
}

pub(crate) fn unknown_node(id: NodeId) -> AlphaError {
    AlphaError::invalid("unknown-node", "node does not exist").with_context("node", id)
}

fn invariant_error(code: &str, message: &str) -> AlphaError {
    AlphaError::Fatal(ErrorInfo::new(code, message))
}

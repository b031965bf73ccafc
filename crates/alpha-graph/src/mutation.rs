use alpha_core::errors::{AlphaError, ErrorInfo};
use alpha_core::{Digest, NodeId, NodeKind};

use crate::children::ChildList;
use crate::graph::{depth_under, AlphaGraph, NodeRecord};

/// One node of a snapshotted subtree, in pre-order.
#[derive(Debug, Clone)]
struct CopyStep {
    /// Index of the parent step, or `None` for nodes attached to the target.
    parent: Option<usize>,
    kind: NodeKind,
    name: Option<String>,
    digest: Digest,
}

impl AlphaGraph {
    /// Creates a node under `parent`, or the root when `parent` is `None`.
    ///
    /// Propositions need a non-empty name within the configured length and
    /// are the only nodes that may carry one. The root must be an `And`, and
    /// `And` is never created anywhere else. Nothing may be created under a
    /// proposition.
    pub fn create_node(
        &mut self,
        parent: Option<NodeId>,
        kind: NodeKind,
        name: Option<&str>,
    ) -> Result<NodeId, AlphaError> {
        self.validate_name(kind, name)?;
        let depth = match parent {
            None => {
                if kind != NodeKind::And {
                    return Err(AlphaError::invalid(
                        "parentless-node",
                        "only the and root may be created without a parent",
                    )
                    .with_context("kind", kind));
                }
                if let Some(root) = self.root_id() {
                    return Err(AlphaError::invalid("root-exists", "graph already has a root")
                        .with_context("root", root));
                }
                0
            }
            Some(parent) => {
                if kind == NodeKind::And {
                    return Err(AlphaError::invalid(
                        "nested-and",
                        "and nodes may only appear as the root",
                    )
                    .with_context("parent", parent));
                }
                let record = self.record(parent)?;
                ensure_container(parent, record.kind)?;
                depth_under(kind, record.depth)
            }
        };
        let name = match name.filter(|_| kind == NodeKind::Prop) {
            Some(name) => {
                let mut owned = String::new();
                owned.try_reserve_exact(name.len())?;
                owned.push_str(name);
                Some(owned)
            }
            None => None,
        };
        let record = NodeRecord {
            kind,
            name,
            children: ChildList::new(self.config().min_child_capacity),
            parent,
            depth,
            digest: 0,
        };
        let id = self.link_new(parent, record)?;
        self.rehash(id);
        Ok(id)
    }

    /// Detaches `node` from its parent and frees its whole subtree.
    ///
    /// The former parent chain is rehashed. Deleting the root empties the
    /// graph.
    pub fn delete_node(&mut self, node: NodeId) -> Result<(), AlphaError> {
        let parent = self.detach(node)?;
        self.free_subtree(node);
        if let Some(parent) = parent {
            self.rehash(parent);
        }
        Ok(())
    }

    /// Pastes an independent copy of `content` under `target`.
    ///
    /// An `And` is never duplicated: copying the root pastes its children.
    /// Returns the handles of the nodes attached directly to `target`. If
    /// storage runs out midway, every node created so far is removed again
    /// and the error is reported as [`AlphaError::Fatal`].
    pub fn copy_subtree(
        &mut self,
        target: NodeId,
        content: NodeId,
    ) -> Result<Vec<NodeId>, AlphaError> {
        let plan = plan_copy(self, content)?;
        self.build_copy(target, plan)
    }

    /// Pastes a copy of `content`, taken from another graph, under `target`.
    pub fn copy_subtree_from(
        &mut self,
        target: NodeId,
        source: &AlphaGraph,
        content: NodeId,
    ) -> Result<Vec<NodeId>, AlphaError> {
        let plan = plan_copy(source, content)?;
        self.build_copy(target, plan)
    }

    /// Relocates the subtree rooted at `content` under `target`.
    pub fn move_subtree(&mut self, target: NodeId, content: NodeId) -> Result<(), AlphaError> {
        let target_record = self.record(target)?;
        ensure_container(target, target_record.kind)?;
        let target_depth = target_record.depth;
        let Some(old_parent) = self.record(content)?.parent else {
            return Err(AlphaError::invalid("root-move", "the root cannot be relocated")
                .with_context("node", content));
        };
        if self.is_ancestor_or_self(content, target)? {
            return Err(AlphaError::invalid(
                "would-create-cycle",
                "target lies inside the subtree being moved",
            )
            .with_context("target", target)
            .with_context("content", content));
        }
        if old_parent == target {
            return Ok(());
        }
        self.reserve_children(target, 1)?;
        self.detach(content)?;
        if let Err(err) = self.attach(target, content) {
            tracing::warn!(target = %target, content = %content, "move left subtree detached");
            return Err(err.into_fatal());
        }
        self.redepth(content, target_depth);
        self.rehash(old_parent);
        self.rehash(target);
        Ok(())
    }

    /// Moves every child of `content` under `target`, then deletes `content`.
    ///
    /// Capacity for all children is reserved on `target` first, so running
    /// out of storage is reported before anything moves.
    pub fn reparent_children(
        &mut self,
        target: NodeId,
        content: NodeId,
    ) -> Result<Vec<NodeId>, AlphaError> {
        let target_record = self.record(target)?;
        ensure_container(target, target_record.kind)?;
        let target_depth = target_record.depth;
        let count = self.record(content)?.children.len();
        if self.is_ancestor_or_self(content, target)? {
            return Err(AlphaError::invalid(
                "would-create-cycle",
                "target lies inside the node being dissolved",
            )
            .with_context("target", target)
            .with_context("content", content));
        }
        self.reserve_children(target, count)?;
        let moved = self.record_mut(content)?.children.take();
        for child in &moved {
            if let Err(err) = self.attach(target, *child) {
                tracing::warn!(target = %target, content = %content, "reparent stopped partway");
                return Err(err.into_fatal().with_context("child", *child));
            }
            self.redepth(*child, target_depth);
        }
        let old_parent = self.detach(content).map_err(AlphaError::into_fatal)?;
        self.free_subtree(content);
        self.rehash(target);
        if let Some(old_parent) = old_parent {
            self.rehash(old_parent);
        }
        Ok(moved)
    }

    fn validate_name(&self, kind: NodeKind, name: Option<&str>) -> Result<(), AlphaError> {
        match (kind, name) {
            (NodeKind::Prop, None) => Err(AlphaError::invalid(
                "missing-name",
                "propositions require a name",
            )),
            (NodeKind::Prop, Some(name)) if !self.config().accepts_name(name) => {
                Err(AlphaError::invalid("bad-name", "proposition name is empty or too long")
                    .with_context("len", name.len())
                    .with_context("max", self.config().max_name_len))
            }
            (NodeKind::Cut | NodeKind::And, Some(_)) => Err(AlphaError::invalid(
                "unexpected-name",
                "only propositions carry a name",
            )
            .with_context("kind", kind)),
            _ => Ok(()),
        }
    }

    fn root_id(&self) -> Option<NodeId> {
        alpha_core::ExistentialGraph::root(self)
    }

    /// Allocates `record` and links it under `parent`, or installs it as root.
    fn link_new(
        &mut self,
        parent: Option<NodeId>,
        record: NodeRecord,
    ) -> Result<NodeId, AlphaError> {
        let id = self.alloc(record)?;
        match parent {
            Some(parent) => {
                if let Err(err) = self.attach(parent, id) {
                    self.release(id);
                    return Err(err);
                }
            }
            None => self.set_root(Some(id)),
        }
        Ok(id)
    }

    /// Pushes `child` onto `parent`'s list and points it back at `parent`.
    fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<(), AlphaError> {
        self.record_mut(parent)?.children.push(child)?;
        self.record_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Unlinks `node` from its parent's child list, returning the old parent.
    fn detach(&mut self, node: NodeId) -> Result<Option<NodeId>, AlphaError> {
        let Some(parent) = self.record(node)?.parent else {
            return Ok(None);
        };
        self.record_mut(parent)?.children.remove(node)?;
        self.record_mut(node)?.parent = None;
        Ok(Some(parent))
    }

    /// Releases `node` and every descendant. `node` must already be unlinked.
    fn free_subtree(&mut self, node: NodeId) {
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if let Some(record) = self.release(current) {
                stack.extend_from_slice(record.children.as_slice());
            }
        }
    }

    fn build_copy(&mut self, target: NodeId, plan: Vec<CopyStep>) -> Result<Vec<NodeId>, AlphaError> {
        ensure_container(target, self.record(target)?.kind)?;
        for step in &plan {
            if let Some(name) = step.name.as_deref() {
                if !self.config().accepts_name(name) {
                    return Err(AlphaError::invalid(
                        "bad-name",
                        "copied proposition name is not accepted by this graph",
                    )
                    .with_context("len", name.len()));
                }
            }
        }
        let floor = self.config().min_child_capacity;
        let mut created: Vec<NodeId> = Vec::with_capacity(plan.len());
        let mut attached = Vec::new();
        for step in plan {
            let parent = step.parent.map_or(target, |index| created[index]);
            let parent_depth = self.record(parent)?.depth;
            let record = NodeRecord {
                kind: step.kind,
                name: step.name,
                children: ChildList::new(floor),
                parent: Some(parent),
                depth: depth_under(step.kind, parent_depth),
                digest: step.digest,
            };
            match self.link_new(Some(parent), record) {
                Ok(id) => {
                    created.push(id);
                    if step.parent.is_none() {
                        attached.push(id);
                    }
                }
                Err(err) => {
                    tracing::warn!(
                        target = %target,
                        created = created.len(),
                        "copy failed midway, rolling back"
                    );
                    for top in attached.iter().rev() {
                        if self.detach(*top).is_ok() {
                            self.free_subtree(*top);
                        }
                    }
                    return Err(err
                        .into_fatal()
                        .with_context("target", target)
                        .with_context("rolled_back", created.len()));
                }
            }
        }
        self.rehash(target);
        Ok(attached)
    }
}

/// Snapshots the subtree of `content` so it can be pasted anywhere, even
/// inside itself.
fn plan_copy(source: &AlphaGraph, content: NodeId) -> Result<Vec<CopyStep>, AlphaError> {
    let record = source.record(content)?;
    let mut stack: Vec<(NodeId, Option<usize>)> = match record.kind {
        NodeKind::And => record
            .children
            .as_slice()
            .iter()
            .rev()
            .map(|child| (*child, None))
            .collect(),
        NodeKind::Cut | NodeKind::Prop => vec![(content, None)],
    };
    let mut plan = Vec::new();
    while let Some((node, parent)) = stack.pop() {
        let record = source.record(node)?;
        let index = plan.len();
        plan.push(CopyStep {
            parent,
            kind: record.kind,
            name: record.name.clone(),
            digest: record.digest,
        });
        stack.extend(
            record
                .children
                .as_slice()
                .iter()
                .rev()
                .map(|child| (*child, Some(index))),
        );
    }
    Ok(plan)
}

fn ensure_container(node: NodeId, kind: NodeKind) -> Result<(), AlphaError> {
    if kind.is_container() {
        return Ok(());
    }
    Err(AlphaError::InvalidArgument(
        ErrorInfo::new("prop-parent", "propositions cannot hold children")
            .with_context("node", node.to_string()),
    ))
}

#[cfg(test)]
mod tests {
    use alpha_core::errors::ErrorKind;

    use super::*;
    use crate::flags::GraphConfig;

    fn sheet() -> (AlphaGraph, NodeId) {
        let graph = AlphaGraph::with_sheet(GraphConfig::default()).unwrap();
        let root = graph.root_id().unwrap();
        (graph, root)
    }

    fn rolled_back(err: &AlphaError) -> Option<&str> {
        err.info().context.get("rolled_back").map(String::as_str)
    }

    #[test]
    fn failed_copy_removes_partial_paste() {
        let (mut graph, root) = sheet();
        let source = graph.create_node(Some(root), NodeKind::Cut, None).unwrap();
        for name in ["x", "y", "z"] {
            graph.create_node(Some(source), NodeKind::Prop, Some(name)).unwrap();
        }
        let target = graph.create_node(Some(root), NodeKind::Cut, None).unwrap();
        let count = graph.node_count();
        let target_digest = graph.record(target).unwrap().digest;
        let root_digest = graph.record(root).unwrap().digest;

        graph.limit_allocations(2);
        let err = graph.copy_subtree(target, source).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Fatal);
        assert_eq!(err.info().code, "alloc-failed");
        assert_eq!(rolled_back(&err), Some("2"));

        assert_eq!(graph.node_count(), count);
        assert!(graph.record(target).unwrap().children.is_empty());
        assert_eq!(graph.record(target).unwrap().digest, target_digest);
        assert_eq!(graph.record(root).unwrap().digest, root_digest);
        graph.verify_invariants().unwrap();
    }

    #[test]
    fn failed_sheet_copy_removes_every_pasted_top() {
        let (mut graph, root) = sheet();
        graph.create_node(Some(root), NodeKind::Prop, Some("p")).unwrap();
        let cut = graph.create_node(Some(root), NodeKind::Cut, None).unwrap();
        graph.create_node(Some(cut), NodeKind::Prop, Some("q")).unwrap();
        let target = graph.create_node(Some(root), NodeKind::Cut, None).unwrap();
        let count = graph.node_count();

        graph.limit_allocations(3);
        let err = graph.copy_subtree(target, root).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Fatal);
        assert_eq!(rolled_back(&err), Some("3"));
        assert_eq!(graph.node_count(), count);
        assert!(graph.record(target).unwrap().children.is_empty());
        graph.verify_invariants().unwrap();
    }

    #[test]
    fn reparent_reports_exhaustion_before_moving() {
        let (mut graph, root) = sheet();
        let outer = graph.create_node(Some(root), NodeKind::Cut, None).unwrap();
        let inner = graph.create_node(Some(outer), NodeKind::Cut, None).unwrap();
        let a = graph.create_node(Some(inner), NodeKind::Prop, Some("a")).unwrap();
        graph.create_node(Some(inner), NodeKind::Prop, Some("b")).unwrap();

        graph.limit_reservations(0);
        let err = graph.remove_double_cut(outer).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfMemory);
        assert_eq!(graph.node_count(), 5);
        assert_eq!(graph.record(inner).unwrap().children.len(), 2);
        assert_eq!(graph.record(a).unwrap().parent, Some(inner));
        graph.verify_invariants().unwrap();
    }

    #[test]
    fn move_reports_exhaustion_before_detaching() {
        let (mut graph, root) = sheet();
        let c1 = graph.create_node(Some(root), NodeKind::Cut, None).unwrap();
        let p = graph.create_node(Some(root), NodeKind::Prop, Some("p")).unwrap();

        graph.limit_reservations(0);
        let err = graph.move_subtree(c1, p).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfMemory);
        assert_eq!(graph.record(p).unwrap().parent, Some(root));
        assert_eq!(graph.record(p).unwrap().depth, 0);
        graph.verify_invariants().unwrap();
    }

    #[test]
    fn double_cut_introduction_undoes_outer_cut() {
        let (mut graph, root) = sheet();
        let p = graph.create_node(Some(root), NodeKind::Prop, Some("p")).unwrap();

        graph.limit_allocations(1);
        let err = graph.add_double_cut(p).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfMemory);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.record(root).unwrap().children.as_slice(), &[p]);
        graph.verify_invariants().unwrap();
    }
}

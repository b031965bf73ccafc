//! Inference rules of the Alpha calculus.
//!
//! Every rule comes as a `check_*` validator that never mutates the graph and
//! an applying method that runs the validator first. Legality depends only on
//! the current shape of the tree, chiefly the parity of depths: even depths
//! are positive areas, odd depths negative ones.

use alpha_core::errors::AlphaError;
use alpha_core::{NodeId, NodeKind};

use crate::flags::DeiterationScope;
use crate::graph::AlphaGraph;

/// Outcome of running a rule validator without mutating the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleDryRun {
    /// The rule may be applied.
    Valid,
    /// The rule would be rejected with the provided error.
    Invalid(AlphaError),
}

impl RuleDryRun {
    /// Whether the rule may be applied.
    pub fn is_valid(&self) -> bool {
        matches!(self, RuleDryRun::Valid)
    }
}

impl From<Result<(), AlphaError>> for RuleDryRun {
    fn from(result: Result<(), AlphaError>) -> Self {
        match result {
            Ok(()) => RuleDryRun::Valid,
            Err(err) => RuleDryRun::Invalid(err),
        }
    }
}

impl AlphaGraph {
    /// Validator for [`insert`](Self::insert): the target must sit at odd depth.
    pub fn check_insert(&self, target: NodeId, content: NodeId) -> Result<(), AlphaError> {
        self.record(content)?;
        self.ensure_parity(target, Parity::Odd)
    }

    /// Insertion: pastes a copy of `content` into a negative area.
    pub fn insert(&mut self, target: NodeId, content: NodeId) -> Result<Vec<NodeId>, AlphaError> {
        self.check_insert(target, content)?;
        let pasted = self.copy_subtree(target, content)?;
        tracing::debug!(
            rule = "insert",
            target = %target,
            content = %content,
            pasted = pasted.len(),
            "applied rule"
        );
        Ok(pasted)
    }

    /// Insertion of a subgraph built in another graph, such as a scratch sheet.
    pub fn insert_from(
        &mut self,
        target: NodeId,
        source: &AlphaGraph,
        content: NodeId,
    ) -> Result<Vec<NodeId>, AlphaError> {
        source.record(content)?;
        self.ensure_parity(target, Parity::Odd)?;
        let pasted = self.copy_subtree_from(target, source, content)?;
        tracing::debug!(
            rule = "insert",
            target = %target,
            pasted = pasted.len(),
            "applied rule from foreign graph"
        );
        Ok(pasted)
    }

    /// Validator for [`erase`](Self::erase): the target must sit at even depth
    /// and must not be the sheet itself.
    pub fn check_erase(&self, target: NodeId) -> Result<(), AlphaError> {
        if self.record(target)?.parent.is_none() {
            return Err(AlphaError::invalid("root-erase", "the sheet of assertion cannot be erased")
                .with_context("node", target));
        }
        self.ensure_parity(target, Parity::Even)
    }

    /// Erasure: removes a subgraph from a positive area.
    pub fn erase(&mut self, target: NodeId) -> Result<(), AlphaError> {
        self.check_erase(target)?;
        self.delete_node(target)?;
        tracing::debug!(rule = "erase", target = %target, "applied rule");
        Ok(())
    }

    /// Validator for [`iterate`](Self::iterate).
    ///
    /// A copy of `content` may be pasted at `target` when `target` is the
    /// parent of `content` or lies anywhere beneath that parent. A node is
    /// never iterated into itself.
    pub fn check_iterate(&self, target: NodeId, content: NodeId) -> Result<(), AlphaError> {
        let target_kind = self.record(target)?.kind;
        let Some(area) = self.record(content)?.parent else {
            return Err(AlphaError::invalid("no-parent", "the sheet cannot be iterated")
                .with_context("content", content));
        };
        if target == content {
            return Err(AlphaError::invalid("self-iteration", "a graph cannot be iterated into itself")
                .with_context("node", content));
        }
        if target_kind == NodeKind::Prop {
            return Err(AlphaError::invalid("prop-parent", "propositions cannot hold children")
                .with_context("node", target));
        }
        if !self.is_ancestor_or_self(area, target)? {
            return Err(AlphaError::invalid(
                "not-ancestor",
                "target is outside the area enclosing the content",
            )
            .with_context("target", target)
            .with_context("area", area)
            .with_hint("paste into the content's own area or a cut nested inside it"));
        }
        Ok(())
    }

    /// Whether [`iterate`](Self::iterate) would be accepted.
    pub fn can_iterate(&self, target: NodeId, content: NodeId) -> bool {
        self.check_iterate(target, content).is_ok()
    }

    /// Iteration: pastes a copy of `content` into its own area or a nested one.
    pub fn iterate(&mut self, target: NodeId, content: NodeId) -> Result<Vec<NodeId>, AlphaError> {
        self.check_iterate(target, content)?;
        let pasted = self.copy_subtree(target, content)?;
        tracing::debug!(rule = "iterate", target = %target, content = %content, "applied rule");
        Ok(pasted)
    }

    /// Validator for [`deiterate`](Self::deiterate).
    ///
    /// `node` may be removed when another node equal to it exists within the
    /// configured [`DeiterationScope`].
    pub fn check_deiterate(&self, node: NodeId) -> Result<(), AlphaError> {
        let Some(parent) = self.record(node)?.parent else {
            return Err(AlphaError::invalid("no-parent", "the sheet cannot be deiterated")
                .with_context("node", node));
        };
        let found = match self.config().deiteration_scope {
            DeiterationScope::Area => self.area_has_duplicate(node, parent)?,
            DeiterationScope::Enclosing => self.enclosing_has_duplicate(node, parent)?,
        };
        if !found {
            return Err(AlphaError::invalid("no-duplicate", "no equal subgraph authorizes removal")
                .with_context("node", node));
        }
        Ok(())
    }

    /// Whether [`deiterate`](Self::deiterate) would be accepted.
    pub fn can_deiterate(&self, node: NodeId) -> bool {
        self.check_deiterate(node).is_ok()
    }

    /// Deiteration: removes a subgraph duplicated elsewhere.
    pub fn deiterate(&mut self, node: NodeId) -> Result<(), AlphaError> {
        self.check_deiterate(node)?;
        self.delete_node(node)?;
        tracing::debug!(rule = "deiterate", node = %node, "applied rule");
        Ok(())
    }

    /// Validator for [`remove_double_cut`](Self::remove_double_cut). Returns
    /// the inner cut on success.
    pub fn check_remove_double_cut(&self, outer: NodeId) -> Result<NodeId, AlphaError> {
        let record = self.record(outer)?;
        if record.kind != NodeKind::Cut {
            return Err(AlphaError::invalid("not-a-cut", "double cut must start at a cut")
                .with_context("node", outer)
                .with_context("kind", record.kind));
        }
        if record.parent.is_none() {
            return Err(AlphaError::invalid("no-parent", "outer cut has no parent")
                .with_context("node", outer));
        }
        let [inner] = record.children.as_slice() else {
            return Err(AlphaError::invalid("not-double-cut", "outer cut must hold exactly one child")
                .with_context("node", outer)
                .with_context("children", record.children.len()));
        };
        if self.record(*inner)?.kind != NodeKind::Cut {
            return Err(AlphaError::invalid("not-double-cut", "inner node is not a cut")
                .with_context("node", *inner));
        }
        Ok(*inner)
    }

    /// Double-cut elimination: both cuts vanish and the inner cut's children
    /// land in the outer cut's former area. Returns those children.
    pub fn remove_double_cut(&mut self, outer: NodeId) -> Result<Vec<NodeId>, AlphaError> {
        let inner = self.check_remove_double_cut(outer)?;
        let Some(area) = self.record(outer)?.parent else {
            return Err(AlphaError::invalid("no-parent", "outer cut has no parent"));
        };
        let moved = self.reparent_children(area, inner)?;
        self.delete_node(outer).map_err(AlphaError::into_fatal)?;
        tracing::debug!(
            rule = "remove-double-cut",
            outer = %outer,
            moved = moved.len(),
            "applied rule"
        );
        Ok(moved)
    }

    /// Validator for [`add_double_cut`](Self::add_double_cut).
    pub fn check_add_double_cut(&self, node: NodeId) -> Result<(), AlphaError> {
        if self.record(node)?.parent.is_none() {
            return Err(AlphaError::invalid("no-parent", "the sheet cannot be wrapped")
                .with_context("node", node));
        }
        Ok(())
    }

    /// Double-cut introduction: wraps `node` in two nested cuts placed where
    /// `node` used to be. Returns the outer cut.
    pub fn add_double_cut(&mut self, node: NodeId) -> Result<NodeId, AlphaError> {
        self.check_add_double_cut(node)?;
        let Some(area) = self.record(node)?.parent else {
            return Err(AlphaError::invalid("no-parent", "the sheet cannot be wrapped"));
        };
        let outer = self.create_node(Some(area), NodeKind::Cut, None)?;
        let wrapped = match self.create_node(Some(outer), NodeKind::Cut, None) {
            Ok(inner) => self.move_subtree(inner, node),
            Err(err) => Err(err),
        };
        if let Err(err) = wrapped {
            if self.record(node)?.parent == Some(area) {
                self.delete_node(outer)?;
                return Err(err);
            }
            return Err(err.into_fatal());
        }
        tracing::debug!(rule = "add-double-cut", node = %node, outer = %outer, "applied rule");
        Ok(outer)
    }

    /// Dry-run summary of every rule that could be applied to `node` alone.
    pub fn dry_run_unary(&self, node: NodeId) -> Vec<(&'static str, RuleDryRun)> {
        vec![
            ("erase", self.check_erase(node).into()),
            ("deiterate", self.check_deiterate(node).into()),
            (
                "remove-double-cut",
                self.check_remove_double_cut(node).map(|_| ()).into(),
            ),
            ("add-double-cut", self.check_add_double_cut(node).into()),
        ]
    }

    fn ensure_parity(&self, target: NodeId, parity: Parity) -> Result<(), AlphaError> {
        let depth = self.record(target)?.depth;
        let odd = depth % 2 == 1;
        if odd == matches!(parity, Parity::Odd) {
            return Ok(());
        }
        Err(AlphaError::invalid("depth-parity", parity.message())
            .with_context("node", target)
            .with_context("depth", depth)
            .with_hint(parity.hint()))
    }

    /// Searches the parent's subtree, then the direct children of every
    /// enclosing area, never looking inside `node` itself.
    fn area_has_duplicate(&self, node: NodeId, parent: NodeId) -> Result<bool, AlphaError> {
        if self.find_equal_excluding(parent, node, node)? {
            return Ok(true);
        }
        let mut cursor = self.record(parent)?.parent;
        while let Some(area) = cursor {
            if self.child_equal_excluding(area, node, node)? {
                return Ok(true);
            }
            cursor = self.record(area)?.parent;
        }
        Ok(false)
    }

    /// Checks the candidate's own area and every enclosing area.
    fn enclosing_has_duplicate(&self, node: NodeId, parent: NodeId) -> Result<bool, AlphaError> {
        let mut cursor = Some(parent);
        while let Some(area) = cursor {
            if self.child_equal_excluding(area, node, node)? {
                return Ok(true);
            }
            cursor = self.record(area)?.parent;
        }
        Ok(false)
    }
}

#[derive(Clone, Copy)]
enum Parity {
    Odd,
    Even,
}

impl Parity {
    fn message(self) -> &'static str {
        match self {
            Parity::Odd => "insertion requires a negative (odd depth) area",
            Parity::Even => "erasure requires a positive (even depth) area",
        }
    }

    fn hint(self) -> &'static str {
        match self {
            Parity::Odd => "wrap the target in a cut, or pick an area inside an odd number of cuts",
            Parity::Even => "only subgraphs on the sheet or inside an even number of cuts can be erased",
        }
    }
}

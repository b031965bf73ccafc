//! Structural equality between subtrees, with siblings compared as multisets.

use alpha_core::errors::AlphaError;
use alpha_core::{NodeId, NodeKind};

use crate::flags::ChildMatching;
use crate::graph::AlphaGraph;
use crate::hash::canonical_encoding;

/// Decides whether two subtrees, possibly living in different graphs, denote
/// the same existential graph.
///
/// Two absent nodes are equal; one absent node is unequal to anything. The
/// child pairing strategy is taken from the configuration of `left`.
pub fn subtrees_equal(
    left: &AlphaGraph,
    a: Option<NodeId>,
    right: &AlphaGraph,
    b: Option<NodeId>,
) -> Result<bool, AlphaError> {
    match (a, b) {
        (None, None) => Ok(true),
        (Some(a), Some(b)) => Comparison::new(left, right).nodes(a, b),
        _ => Ok(false),
    }
}

impl AlphaGraph {
    /// Decides whether the subtrees rooted at `a` and `b` are structurally equal.
    pub fn nodes_equal(&self, a: Option<NodeId>, b: Option<NodeId>) -> Result<bool, AlphaError> {
        subtrees_equal(self, a, self, b)
    }

    /// Whether `root` or any of its descendants is structurally equal to `target`.
    pub fn find_equal_in_subtree(&self, root: NodeId, target: NodeId) -> Result<bool, AlphaError> {
        self.record(target)?;
        Comparison::new(self, self).search(root, target, None)
    }

    /// Like [`find_equal_in_subtree`](Self::find_equal_in_subtree), never
    /// descending into `exclude` or reporting it as a match.
    pub(crate) fn find_equal_excluding(
        &self,
        root: NodeId,
        target: NodeId,
        exclude: NodeId,
    ) -> Result<bool, AlphaError> {
        Comparison::new(self, self).search(root, target, Some(exclude))
    }

    /// Whether some child of `parent` other than `exclude` equals `target`.
    pub(crate) fn child_equal_excluding(
        &self,
        parent: NodeId,
        target: NodeId,
        exclude: NodeId,
    ) -> Result<bool, AlphaError> {
        let comparison = Comparison::new(self, self);
        for child in self.record(parent)?.children.as_slice() {
            if *child != exclude && comparison.nodes(*child, target)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

struct Comparison<'a> {
    left: &'a AlphaGraph,
    right: &'a AlphaGraph,
    matching: ChildMatching,
}

/// Outcome of inspecting one pair of nodes without looking at their children.
enum Step<'a> {
    Done(bool),
    Descend(Pairing<'a>),
}

/// Next action requested by a pairing in progress.
enum Next {
    Finished(bool),
    Compare(NodeId, NodeId),
}

/// Greedy multiset pairing between the children of two containers.
///
/// `row` indexes the child of the left container being placed and `col` the
/// right candidate currently under comparison.
struct Pairing<'a> {
    mine: &'a [NodeId],
    theirs: &'a [NodeId],
    consumed: Vec<bool>,
    row: usize,
    col: usize,
}

impl<'a> Pairing<'a> {
    fn new(mine: &'a [NodeId], theirs: &'a [NodeId]) -> Self {
        Self {
            mine,
            theirs,
            consumed: vec![false; theirs.len()],
            row: 0,
            col: 0,
        }
    }

    /// Records the verdict for the pair last handed out by [`Self::advance`].
    fn settle(&mut self, equal: bool) {
        if equal {
            self.consumed[self.col] = true;
            self.row += 1;
            self.col = 0;
        } else {
            self.col += 1;
        }
    }

    /// Skips to the next unclaimed, digest-equal candidate for the current row.
    fn advance(&mut self, comparison: &Comparison<'a>) -> Result<Next, AlphaError> {
        let Some(mine) = self.mine.get(self.row).copied() else {
            return Ok(Next::Finished(true));
        };
        let digest = comparison.left.record(mine)?.digest;
        while let Some(candidate) = self.theirs.get(self.col).copied() {
            if !self.consumed[self.col] && comparison.right.record(candidate)?.digest == digest {
                return Ok(Next::Compare(mine, candidate));
            }
            self.col += 1;
        }
        Ok(Next::Finished(false))
    }
}

impl<'a> Comparison<'a> {
    fn new(left: &'a AlphaGraph, right: &'a AlphaGraph) -> Self {
        Self {
            left,
            right,
            matching: left.config().matching,
        }
    }

    /// Structural comparison driven by an explicit stack of pairings, one per
    /// nesting level under comparison.
    fn nodes(&self, a: NodeId, b: NodeId) -> Result<bool, AlphaError> {
        let mut stack = match self.open(a, b)? {
            Step::Done(equal) => return Ok(equal),
            Step::Descend(pairing) => vec![pairing],
        };
        let mut verdict = None;
        while let Some(top) = stack.last_mut() {
            if let Some(equal) = verdict.take() {
                top.settle(equal);
            }
            match top.advance(self)? {
                Next::Finished(equal) => {
                    stack.pop();
                    verdict = Some(equal);
                }
                Next::Compare(mine, theirs) => match self.open(mine, theirs)? {
                    Step::Done(equal) => verdict = Some(equal),
                    Step::Descend(pairing) => stack.push(pairing),
                },
            }
        }
        Ok(verdict.unwrap_or(false))
    }

    fn open(&self, a: NodeId, b: NodeId) -> Result<Step<'a>, AlphaError> {
        let (left, right) = (self.left, self.right);
        let first = left.record(a)?;
        let second = right.record(b)?;
        if first.kind != second.kind || first.digest != second.digest {
            return Ok(Step::Done(false));
        }
        if first.kind == NodeKind::Prop {
            return Ok(Step::Done(first.name == second.name));
        }
        if first.children.len() != second.children.len() {
            return Ok(Step::Done(false));
        }
        match self.matching {
            ChildMatching::Greedy => Ok(Step::Descend(Pairing::new(
                first.children.as_slice(),
                second.children.as_slice(),
            ))),
            ChildMatching::Canonical => Ok(Step::Done(
                canonical_encoding(left, a)? == canonical_encoding(right, b)?,
            )),
        }
    }

    /// Visits `root` and its descendants, skipping the subtree of `exclude`.
    fn search(
        &self,
        root: NodeId,
        target: NodeId,
        exclude: Option<NodeId>,
    ) -> Result<bool, AlphaError> {
        let mut pending = vec![root];
        while let Some(current) = pending.pop() {
            if Some(current) == exclude {
                continue;
            }
            if self.nodes(current, target)? {
                return Ok(true);
            }
            pending.extend_from_slice(self.left.record(current)?.children.as_slice());
        }
        Ok(false)
    }
}

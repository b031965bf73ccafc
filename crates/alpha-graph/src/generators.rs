use alpha_core::errors::{AlphaError, ErrorInfo};
use alpha_core::rng::RngHandle;
use alpha_core::{ExistentialGraph, NodeId, NodeKind};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::flags::GraphConfig;
use crate::graph::AlphaGraph;

/// Shape parameters for [`gen_random_sheet`].
#[derive(Debug, Clone)]
pub struct TreeShape {
    /// Maximum number of nested cuts below the sheet.
    pub max_depth: usize,
    /// Maximum number of children per container.
    pub max_children: usize,
    /// Proposition names drawn from uniformly.
    pub atoms: Vec<String>,
    /// Probability that a generated child is a cut rather than a proposition.
    pub cut_ratio: f64,
}

impl Default for TreeShape {
    fn default() -> Self {
        Self {
            max_depth: 4,
            max_children: 4,
            atoms: ["p", "q", "r", "s"].iter().map(|atom| atom.to_string()).collect(),
            cut_ratio: 0.4,
        }
    }
}

/// Generates a random sheet with deterministic randomness.
pub fn gen_random_sheet(
    config: GraphConfig,
    shape: &TreeShape,
    rng: &mut RngHandle,
) -> Result<AlphaGraph, AlphaError> {
    if shape.atoms.is_empty() {
        return Err(AlphaError::invalid(
            "empty-alphabet",
            "random sheets require at least one proposition name",
        ));
    }
    if !(0.0..=1.0).contains(&shape.cut_ratio) {
        return Err(AlphaError::invalid("bad-ratio", "cut ratio must lie in [0, 1]")
            .with_context("cut_ratio", shape.cut_ratio));
    }
    let mut graph = AlphaGraph::with_sheet(config)?;
    let root = sheet_root(&graph)?;
    let width = rng.gen_range(1..=shape.max_children.max(1));
    fill(&mut graph, root, width, 0, shape, rng)?;
    Ok(graph)
}

/// Rebuilds `source` into a fresh graph, creating every node's children in a
/// shuffled order. The result is structurally equal to `source`.
pub fn gen_permuted_copy(
    source: &AlphaGraph,
    rng: &mut RngHandle,
) -> Result<AlphaGraph, AlphaError> {
    let mut graph = AlphaGraph::with_sheet(source.config().clone())?;
    let root = sheet_root(&graph)?;
    let source_root = sheet_root(source)?;
    let mut stack = vec![(source_root, root)];
    while let Some((from, into)) = stack.pop() {
        let mut children = source.children(from)?.to_vec();
        children.shuffle(rng);
        for child in children {
            let kind = source.kind(child)?;
            let created = graph.create_node(Some(into), kind, source.name(child)?)?;
            if kind == NodeKind::Cut {
                stack.push((child, created));
            }
        }
    }
    Ok(graph)
}

fn fill(
    graph: &mut AlphaGraph,
    parent: NodeId,
    width: usize,
    level: usize,
    shape: &TreeShape,
    rng: &mut RngHandle,
) -> Result<(), AlphaError> {
    for _ in 0..width {
        if level < shape.max_depth && rng.gen_bool(shape.cut_ratio) {
            let cut = graph.create_node(Some(parent), NodeKind::Cut, None)?;
            let inner = rng.gen_range(0..=shape.max_children);
            fill(graph, cut, inner, level + 1, shape, rng)?;
        } else if let Some(atom) = shape.atoms.choose(rng) {
            graph.create_node(Some(parent), NodeKind::Prop, Some(atom.as_str()))?;
        }
    }
    Ok(())
}

fn sheet_root(graph: &AlphaGraph) -> Result<NodeId, AlphaError> {
    graph
        .root()
        .ok_or_else(|| AlphaError::InvalidArgument(ErrorInfo::new("empty-graph", "graph has no sheet")))
}

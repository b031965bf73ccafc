#![deny(missing_docs)]
#![doc = "Core identifiers, error types and the read-only graph contract shared by the Alpha crates."]

use std::fmt;
use std::iter::ExactSizeIterator;

use serde::{Deserialize, Serialize};

pub mod errors;
pub mod rng;
pub mod version;

pub use errors::{AlphaError, ErrorInfo, ErrorKind};
pub use rng::RngHandle;
pub use version::SchemaVersion;

/// Structural digest carried by every node.
pub type Digest = u64;

/// Identifier for a node within an [`ExistentialGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    /// Creates a new identifier from its raw integer representation.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw integer representation of the identifier.
    pub fn as_raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// The three node kinds of an Alpha graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Negation of the conjunction of the children.
    Cut,
    /// The sheet of assertion. Only ever the root.
    And,
    /// A named atomic proposition. Never has children.
    Prop,
}

impl NodeKind {
    /// Returns a short lowercase label, used in error context and logs.
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Cut => "cut",
            NodeKind::And => "and",
            NodeKind::Prop => "prop",
        }
    }

    /// Whether nodes of this kind may own children.
    pub fn is_container(&self) -> bool {
        !matches!(self, NodeKind::Prop)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Read-only contract over an existential graph.
///
/// This is the surface consumed by drivers, printers and proof-script
/// interpreters. Every accessor fails with [`AlphaError::InvalidArgument`]
/// when handed a handle that does not name a live node.
pub trait ExistentialGraph {
    /// Returns the root of the graph, if one has been created.
    fn root(&self) -> Option<NodeId>;

    /// Returns an iterator over all live node identifiers.
    fn nodes(&self) -> Box<dyn ExactSizeIterator<Item = NodeId> + '_>;

    /// Returns the kind of a node.
    fn kind(&self, node: NodeId) -> Result<NodeKind, AlphaError>;

    /// Returns the proposition name, present only for [`NodeKind::Prop`].
    fn name(&self, node: NodeId) -> Result<Option<&str>, AlphaError>;

    /// Returns the number of enclosing cuts, inclusive of the node itself.
    fn depth(&self, node: NodeId) -> Result<usize, AlphaError>;

    /// Returns the current structural digest of the subtree rooted at `node`.
    fn digest(&self, node: NodeId) -> Result<Digest, AlphaError>;

    /// Returns the enclosing node, or `None` for the root.
    fn parent(&self, node: NodeId) -> Result<Option<NodeId>, AlphaError>;

    /// Returns the children of a node. Storage order carries no meaning.
    fn children(&self, node: NodeId) -> Result<&[NodeId], AlphaError>;
}

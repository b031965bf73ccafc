use alpha_core::SchemaVersion;
use serde::{Deserialize, Serialize};

/// Configuration options that control the behaviour of [`AlphaGraph`](crate::AlphaGraph).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Longest accepted proposition name, in bytes.
    pub max_name_len: usize,
    /// Capacity floor below which child lists never shrink.
    pub min_child_capacity: usize,
    /// Strategy used to pair children during structural equality.
    pub matching: ChildMatching,
    /// Where deiteration looks for a duplicate of the candidate.
    pub deiteration_scope: DeiterationScope,
    /// Schema version mixed into canonical hashes.
    pub schema_version: SchemaVersion,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_name_len: 49,
            min_child_capacity: 16,
            matching: ChildMatching::Greedy,
            deiteration_scope: DeiterationScope::Area,
            schema_version: SchemaVersion::new(1, 0, 0),
        }
    }
}

/// How the children of two containers are paired when comparing them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChildMatching {
    /// First-fit pairing on digest and structure, no backtracking.
    ///
    /// Structural equality is an equivalence, so any child claimed early is
    /// interchangeable with the one a later child would have needed.
    Greedy,
    /// Compare order-independent canonical encodings. Exact, but allocates
    /// an encoding per compared subtree.
    Canonical,
}

/// Search region used to authorize deiteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeiterationScope {
    /// Any node in the subtree of the candidate's parent, or a direct child
    /// of an enclosing area. Sibling branches of ancestors are never
    /// searched.
    Area,
    /// Only children of the candidate's parent or of one of its ancestors:
    /// the same area or an enclosing one.
    Enclosing,
}

impl GraphConfig {
    /// Checks that a proposition name is acceptable under this configuration.
    pub fn accepts_name(&self, name: &str) -> bool {
        !name.is_empty() && name.len() <= self.max_name_len
    }
}

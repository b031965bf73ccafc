#![deny(missing_docs)]

//! Existential graph engine for Peirce's Alpha system.
//!
//! An [`AlphaGraph`] is a tree of cuts and propositions hanging from a single
//! `And` sheet. Every edit keeps two pieces of bookkeeping current: each
//! node's depth (number of enclosing cuts) and an incremental structural
//! digest used to reject unequal subtrees quickly. On top of the raw edits sit
//! the inference rules of the calculus, each with a non-mutating validator.
//!
//! The engine is single threaded and synchronous. Callers that share a graph
//! across threads must serialize access themselves.

mod children;
mod digest;
mod equality;
mod flags;
mod generators;
mod graph;
mod hash;
mod ids;
mod mutation;
mod rules;

pub use alpha_core::{AlphaError, Digest, ErrorInfo, ErrorKind, ExistentialGraph, NodeId, NodeKind};
pub use children::ChildList;
pub use digest::{container_digest, name_digest};
pub use equality::subtrees_equal;
pub use flags::{ChildMatching, DeiterationScope, GraphConfig};
pub use generators::{gen_permuted_copy, gen_random_sheet, TreeShape};
pub use graph::AlphaGraph;
pub use hash::{canonical_encoding, canonical_hash};
pub use rules::RuleDryRun;

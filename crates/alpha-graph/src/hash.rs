use alpha_core::errors::{AlphaError, ErrorInfo};
use alpha_core::{NodeId, NodeKind, SchemaVersion};
use sha2::{Digest, Sha256};

use crate::graph::AlphaGraph;

/// Computes the canonical structural hash of the subtree rooted at `node`.
///
/// Unlike the incremental digest this is collision resistant: it hashes an
/// order-independent encoding of the whole subtree, salted with the schema
/// version of the graph's configuration.
pub fn canonical_hash(graph: &AlphaGraph, node: NodeId) -> Result<String, AlphaError> {
    let encoding = canonical_encoding(graph, node)?;
    let mut hasher = Sha256::new();
    encode_version(graph.config().schema_version, &mut hasher);
    hasher.update((encoding.len() as u64).to_le_bytes());
    hasher.update(&encoding);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Serializes the subtree rooted at `node` into a canonical byte string.
///
/// Encodings are read back to front. A proposition is its name followed by
/// the name length and the tag `P`. A container is the encodings of its
/// children, sorted bytewise and each followed by its own length, then the
/// child count and the kind tag. Two subtrees are structurally equal exactly
/// when their encodings are equal.
pub fn canonical_encoding(graph: &AlphaGraph, node: NodeId) -> Result<Vec<u8>, AlphaError> {
    let mut pending = vec![(node, false)];
    let mut finished: Vec<Vec<u8>> = Vec::new();
    while let Some((current, expanded)) = pending.pop() {
        let record = graph.record(current)?;
        match record.kind {
            NodeKind::Prop => {
                let mut out = Vec::new();
                let name = record.name.as_deref().unwrap_or_default();
                append_framed(name.as_bytes(), &mut out);
                out.push(kind_tag(record.kind));
                finished.push(out);
            }
            NodeKind::Cut | NodeKind::And if !expanded => {
                pending.push((current, true));
                pending.extend(record.children.as_slice().iter().map(|child| (*child, false)));
            }
            NodeKind::Cut | NodeKind::And => {
                let count = record.children.len();
                let mut encoded = finished.split_off(finished.len().saturating_sub(count));
                encoded.sort();
                let mut encoded = encoded.into_iter();
                // Reusing the first buffer keeps single-child chains linear.
                let mut out = match encoded.next() {
                    Some(mut first) => {
                        let len = first.len() as u64;
                        first.extend_from_slice(&len.to_le_bytes());
                        first
                    }
                    None => Vec::new(),
                };
                for child in encoded {
                    append_framed(&child, &mut out);
                }
                out.extend_from_slice(&(count as u64).to_le_bytes());
                out.push(kind_tag(record.kind));
                finished.push(out);
            }
        }
    }
    finished.pop().ok_or_else(|| {
        AlphaError::Fatal(ErrorInfo::new("encoding-empty", "no encoding was produced"))
            .with_context("node", node)
    })
}

fn kind_tag(kind: NodeKind) -> u8 {
    match kind {
        NodeKind::Cut => b'C',
        NodeKind::And => b'A',
        NodeKind::Prop => b'P',
    }
}

fn encode_version(version: SchemaVersion, hasher: &mut Sha256) {
    hasher.update(b"alpha-graph");
    hasher.update(version.major.to_le_bytes());
    hasher.update(version.minor.to_le_bytes());
    hasher.update(version.patch.to_le_bytes());
}

fn append_framed(bytes: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(bytes);
    out.extend_from_slice(&(bytes.len() as u64).to_le_bytes());
}

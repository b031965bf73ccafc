//! Incremental structural digests and nesting depths.
//!
//! Digests flow bottom-up: a proposition hashes its name, a container takes
//! the XOR of its children's digests multiplied by the child count. XOR keeps
//! the result independent of sibling order; the multiplier perturbs it by
//! arity. Digests only reject fast: two identical siblings still cancel to
//! zero, so equal digests always fall through to a full comparison.
//! Depths flow top-down from the parent each time a subtree is attached.

use alpha_core::errors::AlphaError;
use alpha_core::{Digest, NodeId, NodeKind};

use crate::graph::{depth_under, AlphaGraph, NodeRecord};

const DJB2_SEED: Digest = 5381;

/// djb2 string hash: seed 5381, `h = h * 33 + byte`, wrapping on overflow.
pub fn name_digest(name: &str) -> Digest {
    name.bytes().fold(DJB2_SEED, |hash, byte| {
        hash.wrapping_mul(33).wrapping_add(Digest::from(byte))
    })
}

/// Folds child digests into the digest of a container holding them.
pub fn container_digest(children: impl IntoIterator<Item = Digest>) -> Digest {
    let (xor, count) = children
        .into_iter()
        .fold((0 as Digest, 0 as Digest), |(xor, count), digest| {
            (xor ^ digest, count + 1)
        });
    xor.wrapping_mul(count)
}

impl AlphaGraph {
    /// Digest `record` should carry given its children's current digests.
    pub(crate) fn local_digest(&self, record: &NodeRecord) -> Result<Digest, AlphaError> {
        match record.kind {
            NodeKind::Prop => Ok(record.name.as_deref().map(name_digest).unwrap_or(DJB2_SEED)),
            NodeKind::Cut | NodeKind::And => {
                let mut missing = None;
                let digest = container_digest(record.children.as_slice().iter().map_while(
                    |child| match self.record(*child) {
                        Ok(child) => Some(child.digest),
                        Err(err) => {
                            missing = Some(err);
                            None
                        }
                    },
                ));
                match missing {
                    Some(err) => Err(err),
                    None => Ok(digest),
                }
            }
        }
    }

    /// Recomputes the digest of `start` and of every ancestor up to the root.
    ///
    /// A handle that no longer resolves ends the walk; callers hand in nodes
    /// they have just linked or unlinked.
    pub(crate) fn rehash(&mut self, start: NodeId) {
        let mut cursor = Some(start);
        let mut visited = 0usize;
        while let Some(current) = cursor {
            let Ok(record) = self.record(current) else {
                break;
            };
            let Ok(digest) = self.local_digest(record) else {
                break;
            };
            let parent = record.parent;
            if let Ok(record) = self.record_mut(current) {
                record.digest = digest;
            }
            visited += 1;
            cursor = parent;
        }
        tracing::trace!(start = %start, visited, "rehashed ancestor chain");
    }

    /// Re-derives the depth of `node` and its descendants from `parent_depth`.
    pub(crate) fn redepth(&mut self, node: NodeId, parent_depth: usize) {
        let mut stack = vec![(node, parent_depth)];
        while let Some((current, above)) = stack.pop() {
            let Ok(record) = self.record_mut(current) else {
                continue;
            };
            record.depth = depth_under(record.kind, above);
            let depth = record.depth;
            stack.extend(
                record
                    .children
                    .as_slice()
                    .iter()
                    .map(|child| (*child, depth)),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use alpha_core::ExistentialGraph;

    use super::*;
    use crate::flags::GraphConfig;

    #[test]
    fn local_digest_reads_live_children() {
        let mut graph = AlphaGraph::with_sheet(GraphConfig::default()).unwrap();
        let root = graph.root().unwrap();
        let cut = graph.create_node(Some(root), NodeKind::Cut, None).unwrap();
        graph.create_node(Some(cut), NodeKind::Prop, Some("a")).unwrap();
        let b = graph.create_node(Some(cut), NodeKind::Prop, Some("b")).unwrap();

        let record = graph.record(cut).unwrap();
        assert_eq!(
            graph.local_digest(record).unwrap(),
            container_digest([name_digest("a"), name_digest("b")])
        );

        assert!(graph.release(b).is_some());
        let record = graph.record(cut).unwrap();
        let err = graph.local_digest(record).unwrap_err();
        assert_eq!(err.info().code, "unknown-node");
    }

    #[test]
    fn djb2_matches_reference_values() {
        assert_eq!(name_digest(""), 5381);
        assert_eq!(name_digest("a"), 5381 * 33 + 97);
        assert_eq!(name_digest("ab"), (5381 * 33 + 97) * 33 + 98);
    }

    #[test]
    fn container_digest_ignores_order() {
        let forward = container_digest([3, 9, 27]);
        let backward = container_digest([27, 9, 3]);
        assert_eq!(forward, backward);
        assert_eq!(forward, (3 ^ 9 ^ 27) * 3);
    }

    #[test]
    fn identical_pair_differs_from_single() {
        let digest = name_digest("p");
        assert_eq!(container_digest([digest, digest]), 0);
        assert_eq!(container_digest(std::iter::empty()), 0);
        assert_ne!(container_digest([digest]), container_digest([digest, digest]));
    }
}

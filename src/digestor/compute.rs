//! Digest computer: fold a dependency tree into one digest string.
//!
//! A template's digest is the SHA-256 of its source joined to the composed
//! digests of its children:
//!
//! ```text
//! digest(node)       = hexdigest(source + "-" + dependency_digest(node))
//! dependency_digest  = child digests joined with "-", in child order
//! ```
//!
//! Missing nodes digest to the empty string and injected nodes to their own
//! name. Child digests are memoized in the digest cache under the child's
//! name, so a partial shared across the tree is hashed once.
//!
//! The caller passes an explicit stack of nodes whose digest is being
//! computed. A child already on the stack contributes the literal `false`
//! instead of recursing, which terminates composition on cyclic trees.

use sha2::{Digest, Sha256};

use super::cache::DigestCache;
use super::node::{DependencyTree, NodeId, NodeKind};
use crate::constants::{CYCLE_MARKER, DIGEST_SEPARATOR};

/// Lowercase hex SHA-256 of `input`.
///
/// Stable across processes and platforms, so digests can be compared between
/// runs.
pub fn hexdigest(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Computes digests over one tree, memoizing child digests in `cache`.
pub(crate) struct DigestComputer<'a> {
    tree: &'a DependencyTree,
    cache: &'a DigestCache,
}

impl<'a> DigestComputer<'a> {
    pub(crate) fn new(tree: &'a DependencyTree, cache: &'a DigestCache) -> Self {
        Self {
            tree,
            cache,
        }
    }

    /// Digest of the node `id`.
    pub(crate) fn digest(&self, id: NodeId, stack: &mut Vec<NodeId>) -> String {
        let node = self.tree.node(id);
        match &node.kind {
            NodeKind::Missing => String::new(),
            NodeKind::Injected => node.name.clone(),
            NodeKind::Template(template) | NodeKind::Partial(template) => {
                let composite = self.dependency_digest(id, stack);
                let mut hasher = Sha256::new();
                hasher.update(template.source.as_bytes());
                hasher.update(DIGEST_SEPARATOR.as_bytes());
                hasher.update(composite.as_bytes());
                hex::encode(hasher.finalize())
            }
        }
    }

    /// Child digests of `id` joined in child order.
    pub(crate) fn dependency_digest(&self, id: NodeId, stack: &mut Vec<NodeId>) -> String {
        let mut parts = Vec::with_capacity(self.tree.children(id).len());
        for &child in self.tree.children(id) {
            if stack.contains(&child) {
                parts.push(CYCLE_MARKER.to_string());
                continue;
            }

            let name = &self.tree.node(child).name;
            let digest = match self.cache.get(name) {
                Some(cached) => cached,
                None => {
                    stack.push(child);
                    let digest = self.digest(child, stack);
                    stack.pop();
                    self.cache.insert(name.clone(), digest.clone());
                    digest
                }
            };
            parts.push(digest);
        }
        parts.join(DIGEST_SEPARATOR)
    }
}

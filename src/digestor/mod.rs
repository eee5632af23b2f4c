//! Dependency-tree digest engine.
//!
//! Computes a stable digest for a template and everything it renders, so a
//! fragment cache keyed by that digest goes stale whenever any template in
//! the chain changes.
//!
//! # Control Flow
//!
//! ```text
//! digest(name, format, finder, dependencies)
//!   ├─ cache hit? ──────────────────────────────► return (no locking)
//!   └─ lock stripe for key
//!        ├─ cache hit? (another thread won) ────► return
//!        └─ build tree ─► inject tokens ─► compute ─► store ─► return
//! ```
//!
//! # Modules
//!
//! - [`node`] - [`Node`], [`NodeKind`], and the [`DependencyTree`] arena
//! - [`tree`] - Cycle-safe tree building
//! - [`compute`] - Digest composition over a built tree
//! - [`cache`] - [`DigestCache`] and the per-details [`DigestCacheRegistry`]
//! - [`guard`] - [`StripedLock`] serializing cache-miss computation
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use viewdigest::digestor::Digestor;
//! use viewdigest::finder::{Details, FileSystemResolver, LookupContext, Resolver};
//!
//! # fn example() -> anyhow::Result<()> {
//! let views: Arc<dyn Resolver> = Arc::new(FileSystemResolver::new("app/views"));
//! let context = LookupContext::new(vec![views], Details::new(["html"], ["erb"]));
//!
//! let digest = Digestor::global().digest("articles/show", "html", &context, &[])?;
//! println!("cache key suffix: {digest}");
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod compute;
pub mod guard;
pub mod node;
pub mod tree;

pub use cache::{DigestCache, DigestCacheRegistry};
pub use compute::hexdigest;
pub use guard::StripedLock;
pub use node::{DependencyTree, Node, NodeId, NodeKind};
pub use tree::logical_name;

use std::sync::{Arc, OnceLock};

use crate::constants::{CACHE_KEY_SEPARATOR, DEFAULT_LOCK_STRIPES, PARTIAL_MARKER};
use crate::core::DigestError;
use crate::diagnostics::{DiagnosticsSink, TracingSink, null_sink};
use crate::finder::TemplateFinder;
use crate::tracker::TrackerRegistry;
use compute::DigestComputer;
use tree::TreeBuilder;

/// Digest engine: trackers, diagnostics, and the computation lock.
///
/// The caches live in the finders; one `Digestor` serves any number of
/// lookup contexts.
#[derive(Debug)]
pub struct Digestor {
    locks: StripedLock,
    trackers: Arc<TrackerRegistry>,
    sink: Arc<dyn DiagnosticsSink>,
}

impl Default for Digestor {
    fn default() -> Self {
        Self::new()
    }
}

impl Digestor {
    /// Create a digestor with the default trackers and no diagnostics.
    pub fn new() -> Self {
        Self {
            locks: StripedLock::new(DEFAULT_LOCK_STRIPES),
            trackers: Arc::new(TrackerRegistry::with_defaults()),
            sink: null_sink(),
        }
    }

    /// The process-wide digestor.
    ///
    /// Shares [`TrackerRegistry::global`] and reports missing templates through
    /// `tracing`.
    pub fn global() -> &'static Digestor {
        static GLOBAL: OnceLock<Digestor> = OnceLock::new();
        GLOBAL.get_or_init(|| Digestor {
            locks: StripedLock::new(DEFAULT_LOCK_STRIPES),
            trackers: Arc::clone(TrackerRegistry::global()),
            sink: Arc::new(TracingSink),
        })
    }

    /// Use `trackers` for dependency extraction.
    #[must_use]
    pub fn with_trackers(mut self, trackers: Arc<TrackerRegistry>) -> Self {
        self.trackers = trackers;
        self
    }

    /// Report diagnostics to `sink`.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Use `stripes` lock stripes (rounded up to a power of two).
    #[must_use]
    pub fn with_lock_stripes(mut self, stripes: usize) -> Self {
        self.locks = StripedLock::new(stripes);
        self
    }

    /// The tracker registry used for dependency extraction.
    pub fn trackers(&self) -> &TrackerRegistry {
        &self.trackers
    }

    /// Top-level cache key for a digest request.
    ///
    /// `name.format` without dependencies, otherwise every part joined with
    /// `.`. Parts are not escaped.
    pub fn cache_key(name: &str, format: &str, dependencies: &[String]) -> String {
        if dependencies.is_empty() {
            format!("{name}{CACHE_KEY_SEPARATOR}{format}")
        } else {
            let mut parts = Vec::with_capacity(dependencies.len() + 2);
            parts.push(name);
            parts.push(format);
            parts.extend(dependencies.iter().map(String::as_str));
            parts.join(CACHE_KEY_SEPARATOR)
        }
    }

    /// Digest of the template `name` and everything it renders.
    ///
    /// `dependencies` are opaque cache-busting tokens appended to the root as
    /// injected nodes.
    ///
    /// # Returns
    ///
    /// A 64-character hex digest, or the empty string when `name` itself
    /// cannot be resolved.
    ///
    /// # Errors
    ///
    /// Returns an error only when a collaborator fails (template lookup or
    /// dependency extraction). Nothing is cached for the key in that case.
    pub fn digest(
        &self,
        name: &str,
        format: &str,
        finder: &dyn TemplateFinder,
        dependencies: &[String],
    ) -> Result<String, DigestError> {
        let cache_key = Self::cache_key(name, format, dependencies);
        let cache = finder.digest_cache();

        if let Some(digest) = cache.get(&cache_key) {
            tracing::trace!("Digest cache HIT for '{cache_key}'");
            return Ok(digest);
        }

        let _guard = self.locks.lock(&cache_key);
        if let Some(digest) = cache.get(&cache_key) {
            tracing::trace!("Digest for '{cache_key}' computed while waiting");
            return Ok(digest);
        }

        tracing::debug!("Digest cache MISS for '{cache_key}', building dependency tree");
        let partial = name.contains(PARTIAL_MARKER);
        let mut tree = self.tree(name, finder, partial)?;

        let root = tree.root();
        for dependency in dependencies {
            let injected = tree.push(Node::injected(dependency.as_str()));
            tree.add_child(root, injected);
        }

        let digest = DigestComputer::new(&tree, cache).digest(root, &mut Vec::new());
        tracing::debug!("Computed digest for '{cache_key}' over {} nodes", tree.len());
        cache.insert(cache_key, digest.clone());
        Ok(digest)
    }

    /// Build the dependency tree rooted at `name` without computing a digest.
    pub fn tree(
        &self,
        name: &str,
        finder: &dyn TemplateFinder,
        partial: bool,
    ) -> Result<DependencyTree, DigestError> {
        TreeBuilder::new(finder, &self.trackers, self.sink.as_ref()).build(name, partial)
    }
}

/// Digest `name` with the process-wide [`Digestor`].
pub fn digest(
    name: &str,
    format: &str,
    finder: &dyn TemplateFinder,
    dependencies: &[String],
) -> Result<String, DigestError> {
    Digestor::global().digest(name, format, finder, dependencies)
}

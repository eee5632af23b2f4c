//! Template lookup for the digest engine.
//!
//! The engine never touches the filesystem directly. It resolves names
//! through a [`TemplateFinder`], which also owns the digest cache for its
//! lookup context.
//!
//! - [`template`] - Resolved [`Template`]s and virtual [`TemplatePath`]s
//! - [`resolver`] - Template sources ([`FileSystemResolver`], [`MemoryResolver`])
//! - [`lookup`] - [`LookupContext`], the standard finder over a list of resolvers

pub mod lookup;
pub mod resolver;
pub mod template;

pub use lookup::{Details, LookupContext};
pub use resolver::{FileSystemResolver, MemoryResolver, Resolver};
pub use template::{Template, TemplatePath};

use anyhow::Result;
use std::sync::Arc;

use crate::digestor::DigestCache;

/// The lookup capability consumed by the digest engine.
///
/// # Contract
///
/// - `find_all` may memoize results for the current unit of work.
/// - `find_all_uncached` must consult the resolvers every time; the tree
///   builder uses it so a digest always reflects current sources.
/// - `digest_cache` is the shared cache the engine reads and writes directly.
pub trait TemplateFinder: Send + Sync {
    /// Find templates named `name` under any of `prefixes`.
    ///
    /// `keys` are the local variable names the caller will render with; they
    /// take part in memoization only.
    fn find_all(
        &self,
        name: &str,
        prefixes: &[String],
        partial: bool,
        keys: &[String],
    ) -> Result<Vec<Arc<Template>>>;

    /// Same as [`find_all`](Self::find_all) with any lookup cache bypassed.
    fn find_all_uncached(
        &self,
        name: &str,
        prefixes: &[String],
        partial: bool,
        keys: &[String],
    ) -> Result<Vec<Arc<Template>>> {
        self.find_all(name, prefixes, partial, keys)
    }

    /// The searchable template sources, in lookup order.
    fn view_paths(&self) -> &[Arc<dyn Resolver>];

    /// The digest cache of this lookup context.
    fn digest_cache(&self) -> &DigestCache;
}

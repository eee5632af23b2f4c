//! viewdigest - cache digests for server-rendered templates
//!
//! A fragment cache keyed only by the template that wrote the fragment goes
//! stale when a partial it renders changes. viewdigest computes a digest over
//! the template *and* every template it transitively renders, so the cache
//! key changes whenever any of them does.
//!
//! # Architecture Overview
//!
//! - A [`finder::TemplateFinder`] resolves names to [`finder::Template`]s and owns
//!   the digest cache of its lookup context
//! - A [`tracker::DependencyTracker`] reads a template and lists the names it
//!   renders
//! - The [`digestor::Digestor`] builds a cycle-safe [`digestor::DependencyTree`]
//!   from those two and folds it into a SHA-256 digest, computing each cache
//!   key at most once
//!
//! Unresolvable templates and dependency cycles are not errors: they digest
//! to fixed values, so a broken reference never breaks rendering.
//!
//! # Core Modules
//!
//! - [`digestor`] - Tree building, digest composition, caches, and locking
//! - [`finder`] - Templates, resolvers, and the lookup context
//! - [`tracker`] - Dependency trackers and their registry
//! - [`diagnostics`] - Where missing-template messages go
//!
//! ## Supporting Modules
//!
//! - [`cli`] - The `viewdigest` command line
//! - [`config`] - `viewdigest.toml` loading and validation
//! - [`core`] - Error types and user-facing error reporting
//! - [`constants`] - Separators, markers, and defaults shared across modules
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use viewdigest::finder::{Details, LookupContext, MemoryResolver, Resolver};
//!
//! # fn example() -> anyhow::Result<()> {
//! let views: Arc<dyn Resolver> = Arc::new(MemoryResolver::new([
//!     ("articles/show.html.erb", "<%= render 'comment' %>"),
//!     ("articles/_comment.html.erb", "<p><%= comment.body %></p>"),
//! ]));
//! let context = LookupContext::new(vec![views], Details::new(["html"], ["erb"]));
//!
//! let digest = viewdigest::digest("articles/show", "html", &context, &[])?;
//! assert_eq!(digest.len(), 64);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod diagnostics;
pub mod digestor;
pub mod finder;
pub mod tracker;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use digestor::{Digestor, digest};

//! Dependency trackers: which templates does a template render?
//!
//! The digest engine delegates dependency extraction to a
//! [`DependencyTracker`] chosen by the template's handler through a
//! [`TrackerRegistry`]. Templates whose handler has no tracker have no
//! dependencies.
//!
//! The built-in [`RenderTracker`] understands ERB-style render calls and
//! explicit `Template Dependency:` comments; it is registered for `erb` by
//! [`TrackerRegistry::with_defaults`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use viewdigest::tracker::{RenderTracker, TrackerRegistry};
//!
//! let registry = TrackerRegistry::with_defaults();
//! registry.register("html", Arc::new(RenderTracker::new()));
//! assert!(registry.tracker_for("html").is_some());
//! ```

mod render;

pub use render::RenderTracker;

use anyhow::Result;
use dashmap::DashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::constants::DEFAULT_TRACKED_HANDLER;
use crate::finder::{Resolver, Template};

/// Extracts the names of templates a template depends on.
///
/// Returned names are references as a render call would spell them
/// (`comments/comment`), not resolved identities. They may repeat or be
/// unresolvable; the tree builder handles both.
pub trait DependencyTracker: Send + Sync {
    /// Dependency names of `template`, rendered under the name `name`.
    ///
    /// `view_paths` are the resolvers of the current lookup context, used to
    /// expand wildcard declarations.
    fn find_dependencies(
        &self,
        name: &str,
        template: &Template,
        view_paths: &[Arc<dyn Resolver>],
    ) -> Result<Vec<String>>;
}

impl<F> DependencyTracker for F
where
    F: Fn(&str, &Template, &[Arc<dyn Resolver>]) -> Result<Vec<String>> + Send + Sync,
{
    fn find_dependencies(
        &self,
        name: &str,
        template: &Template,
        view_paths: &[Arc<dyn Resolver>],
    ) -> Result<Vec<String>> {
        self(name, template, view_paths)
    }
}

/// Maps template handlers to their dependency trackers.
#[derive(Default)]
pub struct TrackerRegistry {
    trackers: DashMap<String, Arc<dyn DependencyTracker>>,
}

impl fmt::Debug for TrackerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut handlers: Vec<String> = self.trackers.iter().map(|e| e.key().clone()).collect();
        handlers.sort();
        f.debug_struct("TrackerRegistry").field("handlers", &handlers).finish()
    }
}

impl TrackerRegistry {
    /// Create a registry with no trackers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the render tracker registered for `erb`.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register(DEFAULT_TRACKED_HANDLER, Arc::new(RenderTracker::new()));
        registry
    }

    /// The process-wide registry, initialized with the defaults.
    ///
    /// Shared by [`Digestor::global`](crate::Digestor::global), so trackers
    /// registered here apply to the crate-level [`digest`](crate::digest).
    pub fn global() -> &'static Arc<TrackerRegistry> {
        static GLOBAL: OnceLock<Arc<TrackerRegistry>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(TrackerRegistry::with_defaults()))
    }

    /// Register `tracker` for templates with `handler`, replacing any previous one.
    pub fn register(&self, handler: impl Into<String>, tracker: Arc<dyn DependencyTracker>) {
        self.trackers.insert(handler.into(), tracker);
    }

    /// Remove the tracker for `handler`. Returns whether one was registered.
    pub fn unregister(&self, handler: &str) -> bool {
        self.trackers.remove(handler).is_some()
    }

    /// The tracker for `handler`, if any.
    pub fn tracker_for(&self, handler: &str) -> Option<Arc<dyn DependencyTracker>> {
        self.trackers.get(handler).map(|entry| entry.value().clone())
    }

    /// Dependency names of `template`; empty when its handler is untracked.
    pub fn find_dependencies(
        &self,
        name: &str,
        template: &Template,
        view_paths: &[Arc<dyn Resolver>],
    ) -> Result<Vec<String>> {
        match self.tracker_for(&template.handler) {
            Some(tracker) => tracker.find_dependencies(name, template, view_paths),
            None => {
                tracing::trace!("No dependency tracker for handler '{}'", template.handler);
                Ok(Vec::new())
            }
        }
    }
}

//! Test utilities for viewdigest
//!
//! Available to unit tests and, through the `test-utils` feature, to the
//! integration suite.
//!
//! - [`init_test_logging`] - one-time tracing setup for tests
//! - [`CountingFinder`] - wraps a finder and counts uncached lookups per name
//! - [`CountingTracker`] - wraps a tracker and counts scans per name
//! - [`fixtures`] - temporary view directories and canned template sets

pub mod fixtures;

pub use fixtures::{ViewFixture, ViewSet};

use anyhow::Result;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::digestor::DigestCache;
use crate::finder::{Resolver, Template, TemplateFinder};
use crate::tracker::DependencyTracker;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` if given, otherwise `RUST_LOG` if set, otherwise leaves
/// logging off. Only the first call has any effect.
///
/// ```bash
/// RUST_LOG=viewdigest=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// Finder wrapper counting uncached lookups per logical name.
///
/// An optional delay before each lookup widens race windows in concurrency
/// tests.
pub struct CountingFinder<F> {
    inner: F,
    lookups: DashMap<String, usize>,
    total: AtomicUsize,
    delay: Option<Duration>,
}

impl<F: TemplateFinder> CountingFinder<F> {
    /// Wrap `inner`.
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            lookups: DashMap::new(),
            total: AtomicUsize::new(0),
            delay: None,
        }
    }

    /// Sleep for `delay` before every lookup.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of uncached lookups for `name`.
    pub fn lookups(&self, name: &str) -> usize {
        self.lookups.get(name).map(|count| *count).unwrap_or(0)
    }

    /// Number of uncached lookups for any name.
    pub fn total_lookups(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    /// The wrapped finder.
    pub fn inner(&self) -> &F {
        &self.inner
    }
}

impl<F: TemplateFinder> TemplateFinder for CountingFinder<F> {
    fn find_all(
        &self,
        name: &str,
        prefixes: &[String],
        partial: bool,
        keys: &[String],
    ) -> Result<Vec<Arc<Template>>> {
        self.inner.find_all(name, prefixes, partial, keys)
    }

    fn find_all_uncached(
        &self,
        name: &str,
        prefixes: &[String],
        partial: bool,
        keys: &[String],
    ) -> Result<Vec<Arc<Template>>> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        *self.lookups.entry(name.to_string()).or_insert(0) += 1;
        self.total.fetch_add(1, Ordering::SeqCst);
        self.inner.find_all_uncached(name, prefixes, partial, keys)
    }

    fn view_paths(&self) -> &[Arc<dyn Resolver>] {
        self.inner.view_paths()
    }

    fn digest_cache(&self) -> &DigestCache {
        self.inner.digest_cache()
    }
}

/// Tracker wrapper counting scans per template name.
pub struct CountingTracker {
    inner: Arc<dyn DependencyTracker>,
    scans: DashMap<String, usize>,
}

impl CountingTracker {
    /// Wrap `inner`.
    pub fn new(inner: Arc<dyn DependencyTracker>) -> Self {
        Self {
            inner,
            scans: DashMap::new(),
        }
    }

    /// Number of times `name` was scanned.
    pub fn scans(&self, name: &str) -> usize {
        self.scans.get(name).map(|count| *count).unwrap_or(0)
    }
}

impl DependencyTracker for CountingTracker {
    fn find_dependencies(
        &self,
        name: &str,
        template: &Template,
        view_paths: &[Arc<dyn Resolver>],
    ) -> Result<Vec<String>> {
        *self.scans.entry(name.to_string()).or_insert(0) += 1;
        self.inner.find_dependencies(name, template, view_paths)
    }
}

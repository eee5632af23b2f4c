//! Lookup context: the finder the digest engine talks to.
//!
//! A [`LookupContext`] combines an ordered list of resolvers (the view paths),
//! the lookup [`Details`] (which formats and handlers are acceptable), a memo
//! of previous lookups, and the digest cache shared by every context with the
//! same details.
//!
//! # Units of work
//!
//! The lookup memo lives for one unit of work (for example one request).
//! Call [`LookupContext::clear_lookup_cache`] before the next one so lookups
//! observe template changes. The digest cache is *not* cleared by that hook;
//! it is dropped by the context-reset event,
//! [`DigestCacheRegistry::reset`].

use anyhow::Result;
use dashmap::DashMap;
use std::sync::Arc;

use super::TemplateFinder;
use super::resolver::Resolver;
use super::template::{Template, TemplatePath};
use crate::digestor::{DigestCache, DigestCacheRegistry};

/// Formats and handlers acceptable for a lookup.
///
/// An empty list accepts everything. A template without a format matches any
/// requested format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Details {
    /// Acceptable formats, e.g. `["html"]`
    pub formats: Vec<String>,
    /// Acceptable handlers, e.g. `["erb"]`
    pub handlers: Vec<String>,
}

impl Details {
    /// Create lookup details.
    pub fn new<F, H>(formats: F, handlers: H) -> Self
    where
        F: IntoIterator,
        F::Item: Into<String>,
        H: IntoIterator,
        H::Item: Into<String>,
    {
        Self {
            formats: formats.into_iter().map(Into::into).collect(),
            handlers: handlers.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether a template with this format and handler is acceptable.
    pub fn accepts(&self, format: Option<&str>, handler: &str) -> bool {
        let format_ok = match format {
            None => true,
            Some(format) => self.formats.is_empty() || self.formats.iter().any(|f| f == format),
        };
        let handler_ok = self.handlers.is_empty() || self.handlers.iter().any(|h| h == handler);
        format_ok && handler_ok
    }

    /// Key identifying these details, e.g. `html,json|erb`.
    pub fn cache_key(&self) -> String {
        format!("{}|{}", self.formats.join(","), self.handlers.join(","))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LookupKey {
    name: String,
    prefixes: Vec<String>,
    partial: bool,
    keys: Vec<String>,
}

/// Template finder over a list of resolvers.
#[derive(Debug)]
pub struct LookupContext {
    view_paths: Vec<Arc<dyn Resolver>>,
    details: Details,
    lookup_cache: DashMap<LookupKey, Vec<Arc<Template>>>,
    digest_cache: Arc<DigestCache>,
}

impl LookupContext {
    /// Create a context whose digest cache comes from the global registry.
    pub fn new(view_paths: Vec<Arc<dyn Resolver>>, details: Details) -> Self {
        Self::with_registry(view_paths, details, DigestCacheRegistry::global())
    }

    /// Create a context whose digest cache comes from `registry`.
    pub fn with_registry(
        view_paths: Vec<Arc<dyn Resolver>>,
        details: Details,
        registry: &DigestCacheRegistry,
    ) -> Self {
        let digest_cache = registry.cache_for(&details.cache_key());
        Self::with_digest_cache(view_paths, details, digest_cache)
    }

    /// Create a context with an explicit digest cache.
    pub fn with_digest_cache(
        view_paths: Vec<Arc<dyn Resolver>>,
        details: Details,
        digest_cache: Arc<DigestCache>,
    ) -> Self {
        Self {
            view_paths,
            details,
            lookup_cache: DashMap::new(),
            digest_cache,
        }
    }

    /// The lookup details of this context.
    pub fn details(&self) -> &Details {
        &self.details
    }

    /// Unit-of-work hook: forget memoized lookups.
    pub fn clear_lookup_cache(&self) {
        self.lookup_cache.clear();
    }

    /// Number of memoized lookups.
    pub fn lookup_cache_len(&self) -> usize {
        self.lookup_cache.len()
    }

    fn lookup(&self, name: &str, prefixes: &[String], partial: bool) -> Result<Vec<Arc<Template>>> {
        let root_prefix = [String::new()];
        let prefixes = if prefixes.is_empty() {
            &root_prefix[..]
        } else {
            prefixes
        };

        let mut found = Vec::new();
        for resolver in &self.view_paths {
            for prefix in prefixes {
                let path = TemplatePath::build(name, prefix, partial);
                found.extend(resolver.find_all(&path, &self.details)?);
            }
        }
        Ok(found)
    }
}

impl TemplateFinder for LookupContext {
    fn find_all(
        &self,
        name: &str,
        prefixes: &[String],
        partial: bool,
        keys: &[String],
    ) -> Result<Vec<Arc<Template>>> {
        let key = LookupKey {
            name: name.to_string(),
            prefixes: prefixes.to_vec(),
            partial,
            keys: keys.to_vec(),
        };
        if let Some(cached) = self.lookup_cache.get(&key) {
            return Ok(cached.value().clone());
        }

        let found = self.lookup(name, prefixes, partial)?;
        self.lookup_cache.insert(key, found.clone());
        Ok(found)
    }

    fn find_all_uncached(
        &self,
        name: &str,
        prefixes: &[String],
        partial: bool,
        _keys: &[String],
    ) -> Result<Vec<Arc<Template>>> {
        self.lookup(name, prefixes, partial)
    }

    fn view_paths(&self) -> &[Arc<dyn Resolver>] {
        &self.view_paths
    }

    fn digest_cache(&self) -> &DigestCache {
        &self.digest_cache
    }
}

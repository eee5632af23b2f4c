//! Shared state for CLI commands.

use std::sync::Arc;

use crate::config::DigestConfig;
use crate::core::DigestError;
use crate::diagnostics::TracingSink;
use crate::digestor::{DigestCacheRegistry, Digestor};
use crate::finder::LookupContext;

/// Configuration, digest engine, and digest caches of one invocation.
#[derive(Debug)]
pub struct CommandContext {
    config: DigestConfig,
    digestor: Digestor,
    caches: DigestCacheRegistry,
}

impl CommandContext {
    /// Build the digest engine described by `config`.
    pub fn new(config: DigestConfig) -> Self {
        let digestor = Digestor::new()
            .with_trackers(Arc::new(config.tracker_registry()))
            .with_sink(Arc::new(TracingSink))
            .with_lock_stripes(config.lock_stripes);
        Self {
            config,
            digestor,
            caches: DigestCacheRegistry::new(),
        }
    }

    /// The effective configuration.
    pub fn config(&self) -> &DigestConfig {
        &self.config
    }

    /// The digest engine.
    pub fn digestor(&self) -> &Digestor {
        &self.digestor
    }

    /// Lookup context over the configured view paths for requests in `format`.
    pub fn lookup_context(&self, format: &str) -> Result<LookupContext, DigestError> {
        let resolvers = self.config.resolvers()?;
        Ok(LookupContext::with_registry(resolvers, self.config.details_for(format), &self.caches))
    }
}

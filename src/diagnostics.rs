//! Diagnostics sink for the digest engine.
//!
//! The tree builder reports templates it cannot resolve through a
//! [`DiagnosticsSink`] rather than a global logger, so embedders decide where
//! those messages go. [`NullSink`] drops everything; [`TracingSink`] forwards
//! to `tracing` under the `viewdigest::digestor` target.

use std::fmt;
use std::sync::Arc;

/// Receiver of messages emitted while building dependency trees.
pub trait DiagnosticsSink: Send + Sync + fmt::Debug {
    /// A referenced template could not be resolved.
    fn error(&self, message: &str);

    /// Progress information (cache misses, tree sizes).
    fn debug(&self, message: &str);
}

/// Sink that discards every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticsSink for NullSink {
    fn error(&self, _message: &str) {}

    fn debug(&self, _message: &str) {}
}

/// Sink that forwards messages to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn error(&self, message: &str) {
        tracing::error!(target: "viewdigest::digestor", "{message}");
    }

    fn debug(&self, message: &str) {
        tracing::debug!(target: "viewdigest::digestor", "{message}");
    }
}

/// Default sink used when none is configured.
pub fn null_sink() -> Arc<dyn DiagnosticsSink> {
    Arc::new(NullSink)
}

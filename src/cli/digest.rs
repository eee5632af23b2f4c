//! `digest` command.

use anyhow::Result;
use clap::Args;

use super::CommandContext;
use crate::constants::DEFAULT_FORMAT;

/// Print the digest of a template and everything it renders.
///
/// An unresolvable template digests to the empty string; a warning is logged
/// and an empty line printed.
#[derive(Args, Debug)]
pub struct DigestCommand {
    /// Template name, e.g. `articles/show` or `articles/_comment`
    pub name: String,

    /// Request format, part of the cache key
    #[arg(short, long, default_value = DEFAULT_FORMAT)]
    pub format: String,

    /// Extra cache-busting token (repeatable, order matters)
    #[arg(short = 'd', long = "dependency", value_name = "TOKEN")]
    pub dependencies: Vec<String>,
}

impl DigestCommand {
    /// Compute the digest.
    pub fn run(&self, context: &CommandContext) -> Result<String> {
        let finder = context.lookup_context(&self.format)?;
        let digest =
            context.digestor().digest(&self.name, &self.format, &finder, &self.dependencies)?;
        if digest.is_empty() {
            tracing::warn!("Template '{}' not found in any view path", self.name);
        }
        Ok(digest)
    }
}

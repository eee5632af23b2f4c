//! Test fixtures for view directories
//!
//! [`ViewFixture`] writes template files into a temporary directory and hands
//! out lookup contexts over it. [`ViewSet`] holds canned template sets used
//! across tests.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use crate::digestor::DigestCache;
use crate::finder::{Details, FileSystemResolver, LookupContext, Resolver};

/// A temporary view directory.
///
/// The directory is removed when the fixture is dropped.
#[derive(Debug)]
pub struct ViewFixture {
    temp: TempDir,
}

impl ViewFixture {
    /// Create an empty view directory.
    pub fn new() -> Result<Self> {
        let temp = TempDir::new().context("Failed to create temp view directory")?;
        Ok(Self {
            temp,
        })
    }

    /// Create a view directory holding `templates` (relative filename, source).
    pub fn with_templates<'a>(templates: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Self> {
        let fixture = Self::new()?;
        for (filename, source) in templates {
            fixture.write(filename, source)?;
        }
        Ok(fixture)
    }

    /// Root of the view directory.
    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    /// Write (or overwrite) the template at `filename`, creating directories.
    pub fn write(&self, filename: &str, source: &str) -> Result<PathBuf> {
        let path = self.temp.path().join(filename);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, source).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Delete the template at `filename`.
    pub fn remove(&self, filename: &str) -> Result<()> {
        let path = self.temp.path().join(filename);
        fs::remove_file(&path).with_context(|| format!("Failed to remove {}", path.display()))
    }

    /// A resolver over this directory.
    pub fn resolver(&self) -> Arc<dyn Resolver> {
        Arc::new(FileSystemResolver::new(self.temp.path()))
    }

    /// A lookup context over this directory with its own digest cache.
    pub fn context(&self, details: Details) -> LookupContext {
        LookupContext::with_digest_cache(vec![self.resolver()], details, Arc::new(DigestCache::new()))
    }
}

/// Canned template sets.
pub struct ViewSet;

impl ViewSet {
    /// An article page rendering a comment partial that renders a missing author.
    pub fn articles() -> Vec<(&'static str, &'static str)> {
        vec![
            ("articles/show.html.erb", "<h1><%= @article.title %></h1>\n<%= render @comments %>\n"),
            ("comments/_comment.html.erb", "<p><%= comment.body %></p>\n<%= render 'authors/author' %>\n"),
            ("articles/index.html.erb", "<%= render partial: 'articles/article' %>\n"),
            ("articles/_article.html.erb", "<%= link_to article.title, article %>\n"),
        ]
    }

    /// Two partials that render each other.
    pub fn cycle() -> Vec<(&'static str, &'static str)> {
        vec![
            ("loops/_a.html.erb", "A<%= render 'loops/b' %>"),
            ("loops/_b.html.erb", "B<%= render 'loops/a' %>"),
        ]
    }
}

//! Configuration for the viewdigest CLI and embedders.
//!
//! Configuration lives in a TOML file, `viewdigest.toml` in the working
//! directory by default. The `VIEWDIGEST_CONFIG` environment variable or the
//! `--config` flag point elsewhere. A missing file is not an error: every
//! setting has a default.
//!
//! # File Format
//!
//! ```toml
//! # Directories searched for templates, in lookup order
//! view_paths = ["app/views", "vendor/views"]
//!
//! # Acceptable template formats and handlers (empty accepts everything)
//! formats = ["html"]
//! handlers = ["erb"]
//!
//! # Stripes of the digest computation lock (power of two)
//! lock_stripes = 64
//!
//! # Default log filter when neither --verbose nor RUST_LOG is given
//! log_level = "warn"
//!
//! # Dependency tracker per template handler
//! [trackers]
//! erb = "render"
//! builder = "none"
//! ```
//!
//! Relative view paths are resolved against the working directory.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

use crate::constants::{CONFIG_FILE_NAME, CONFIG_PATH_ENV, DEFAULT_LOCK_STRIPES, DEFAULT_TRACKED_HANDLER};
use crate::core::DigestError;
use crate::finder::{Details, FileSystemResolver, Resolver};
use crate::tracker::{RenderTracker, TrackerRegistry};

/// Dependency tracker assigned to a handler in the `[trackers]` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackerKind {
    /// The built-in render-call tracker
    Render,
    /// No tracking: templates with this handler have no dependencies
    None,
}

/// Parsed `viewdigest.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestConfig {
    /// Template roots, searched in order.
    pub view_paths: Vec<PathBuf>,

    /// Acceptable template formats. Empty accepts every format.
    pub formats: Vec<String>,

    /// Acceptable template handlers. Empty accepts every handler.
    pub handlers: Vec<String>,

    /// Number of digest lock stripes. Must be a non-zero power of two.
    pub lock_stripes: usize,

    /// Default log filter (e.g. `warn`, `viewdigest=debug`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Tracker per handler. Handlers not listed keep the default trackers.
    pub trackers: BTreeMap<String, TrackerKind>,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            view_paths: Vec::new(),
            formats: Vec::new(),
            handlers: Vec::new(),
            lock_stripes: DEFAULT_LOCK_STRIPES,
            log_level: None,
            trackers: BTreeMap::new(),
        }
    }
}

impl DigestConfig {
    /// Location of the configuration file when none is given explicitly.
    ///
    /// `VIEWDIGEST_CONFIG` if set, otherwise `./viewdigest.toml`.
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
    }

    /// Load from the default location, or defaults when no file exists.
    pub async fn load() -> Result<Self> {
        Self::load_with_optional(None).await
    }

    /// Load from `path` if given, otherwise from [`default_path`](Self::default_path).
    ///
    /// An explicitly given path must exist. The default location may be absent,
    /// in which case defaults are returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// fails [`validate`](Self::validate).
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(&path).await,
            None => Self::load_or_default(&Self::default_path()).await,
        }
    }

    /// Load from `path` if it exists, otherwise return defaults.
    pub async fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from(path).await
        } else {
            tracing::debug!("No configuration at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load and validate the configuration file at `path`.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use viewdigest::config::DigestConfig;
    /// use std::path::Path;
    ///
    /// # async fn example() -> anyhow::Result<()> {
    /// let config = DigestConfig::load_from(Path::new("viewdigest.toml")).await?;
    /// println!("{} view paths", config.view_paths.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Self = toml::from_str(&content).map_err(|e| DigestError::ConfigParse {
            file: path.display().to_string(),
            reason: e.message().to_string(),
        })?;
        config.validate()?;

        tracing::debug!(
            "Loaded config from {} ({} view paths)",
            path.display(),
            config.view_paths.len()
        );
        Ok(config)
    }

    /// Write the configuration to `path` as pretty TOML.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    /// Check values the TOML schema cannot express.
    pub fn validate(&self) -> Result<(), DigestError> {
        if self.lock_stripes == 0 || !self.lock_stripes.is_power_of_two() {
            return Err(DigestError::InvalidConfig {
                reason: format!(
                    "lock_stripes must be a non-zero power of two, got {}",
                    self.lock_stripes
                ),
            });
        }
        if let Some(empty) = self.trackers.keys().find(|handler| handler.trim().is_empty()) {
            return Err(DigestError::InvalidConfig {
                reason: format!("tracker handler names must not be empty, got '{empty}'"),
            });
        }
        Ok(())
    }

    /// Add view paths given on the command line after the configured ones.
    pub fn merge_view_paths(&mut self, extra: impl IntoIterator<Item = PathBuf>) {
        for path in extra {
            if !self.view_paths.contains(&path) {
                self.view_paths.push(path);
            }
        }
    }

    /// Lookup details for a request in `format`.
    ///
    /// Uses the configured formats, or just `format` when none are configured.
    pub fn details_for(&self, format: &str) -> Details {
        let formats = if self.formats.is_empty() {
            vec![format.to_string()]
        } else {
            self.formats.clone()
        };
        Details {
            formats,
            handlers: self.handlers.clone(),
        }
    }

    /// One filesystem resolver per view path.
    ///
    /// # Errors
    ///
    /// Returns [`DigestError::NoViewPaths`] when no view path is configured.
    pub fn resolvers(&self) -> Result<Vec<Arc<dyn Resolver>>, DigestError> {
        if self.view_paths.is_empty() {
            return Err(DigestError::NoViewPaths);
        }
        Ok(self
            .view_paths
            .iter()
            .map(|path| Arc::new(FileSystemResolver::new(path.clone())) as Arc<dyn Resolver>)
            .collect())
    }

    /// Tracker registry for this configuration.
    ///
    /// Starts from [`TrackerRegistry::with_defaults`] and applies the
    /// `[trackers]` table on top.
    pub fn tracker_registry(&self) -> TrackerRegistry {
        let registry = TrackerRegistry::with_defaults();
        for (handler, kind) in &self.trackers {
            match kind {
                TrackerKind::Render => {
                    registry.register(handler.clone(), Arc::new(RenderTracker::new()));
                }
                TrackerKind::None => {
                    registry.unregister(handler);
                }
            }
        }
        registry
    }

    /// An example configuration for new projects.
    pub fn init_example() -> Self {
        let mut trackers = BTreeMap::new();
        trackers.insert(DEFAULT_TRACKED_HANDLER.to_string(), TrackerKind::Render);
        Self {
            view_paths: vec![PathBuf::from("app/views")],
            formats: vec!["html".to_string()],
            handlers: vec![DEFAULT_TRACKED_HANDLER.to_string()],
            log_level: Some("warn".to_string()),
            trackers,
            ..Self::default()
        }
    }
}

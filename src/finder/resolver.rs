//! Template resolvers: where template sources come from.
//!
//! A [`Resolver`] answers two questions: which templates match a virtual
//! path under the current lookup details, and which template paths exist at
//! all (used to expand wildcard dependency declarations).
//!
//! - [`FileSystemResolver`] reads templates from a view directory laid out as
//!   `<prefix>/<[_]name>[.<format>].<handler>`.
//! - [`MemoryResolver`] serves templates from an in-memory map of the same
//!   filenames, for tests and embedding.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use walkdir::WalkDir;

use super::lookup::Details;
use super::template::{ParsedFilename, Template, TemplatePath, parse_filename};

/// A source of templates.
pub trait Resolver: Send + Sync + fmt::Debug {
    /// Find every template matching `path` that `details` accepts.
    ///
    /// Returns an empty vector when nothing matches; errors are reserved for
    /// resolvers that cannot complete the lookup.
    fn find_all(&self, path: &TemplatePath, details: &Details) -> Result<Vec<Arc<Template>>>;

    /// Every template path this resolver can serve, sorted and deduplicated.
    fn all_template_paths(&self) -> Result<Vec<TemplatePath>>;
}

/// Order matches: templates with an explicit format first, then by identifier.
fn sort_matches(matches: &mut [Arc<Template>]) {
    matches.sort_by(|a, b| {
        a.format.is_none().cmp(&b.format.is_none()).then_with(|| a.identifier.cmp(&b.identifier))
    });
}

fn accepts(parsed: &ParsedFilename, path: &TemplatePath, details: &Details) -> bool {
    parsed.path == *path && details.accepts(parsed.format.as_deref(), &parsed.handler)
}

/// Resolver over a view directory on disk.
#[derive(Debug, Clone)]
pub struct FileSystemResolver {
    root: PathBuf,
}

impl FileSystemResolver {
    /// Create a resolver rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }

    /// The view directory this resolver reads from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn relative_name(&self, file: &Path) -> Option<String> {
        let relative = file.strip_prefix(&self.root).ok()?;
        let parts: Vec<&str> =
            relative.components().map(|c| c.as_os_str().to_str()).collect::<Option<_>>()?;
        Some(parts.join("/"))
    }
}

impl Resolver for FileSystemResolver {
    fn find_all(&self, path: &TemplatePath, details: &Details) -> Result<Vec<Arc<Template>>> {
        if !path.is_confined() {
            tracing::debug!("Refusing template path outside {}: {}", self.root.display(), path);
            return Ok(Vec::new());
        }
        let mut dir = self.root.clone();
        for segment in path.prefix.split('/').filter(|s| !s.is_empty()) {
            dir.push(segment);
        }
        let pattern = format!(
            "{}/{}.*",
            glob::Pattern::escape(&dir.to_string_lossy()),
            glob::Pattern::escape(&path.file_stem())
        );

        let mut matches = Vec::new();
        let entries = glob::glob(&pattern)
            .with_context(|| format!("Invalid template lookup pattern: {pattern}"))?;
        for entry in entries {
            let file = entry.with_context(|| {
                format!("Failed to read view directory entry under {}", dir.display())
            })?;
            if !file.is_file() {
                continue;
            }
            let Some(relative) = self.relative_name(&file) else {
                continue;
            };
            let Some(parsed) = parse_filename(&relative) else {
                continue;
            };
            if !accepts(&parsed, path, details) {
                continue;
            }

            let source = std::fs::read_to_string(&file)
                .with_context(|| format!("Cannot read template source: {}", file.display()))?;
            matches.push(Arc::new(Template {
                identifier: file.to_string_lossy().into_owned(),
                virtual_path: parsed.path.virtual_path(),
                source,
                handler: parsed.handler,
                format: parsed.format,
            }));
        }

        sort_matches(&mut matches);
        tracing::trace!("{} template(s) matched {} in {}", matches.len(), path, self.root.display());
        Ok(matches)
    }

    fn all_template_paths(&self) -> Result<Vec<TemplatePath>> {
        let mut paths = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(false) {
            let entry = entry.with_context(|| {
                format!("Failed to read view directory: {}", self.root.display())
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(parsed) = self.relative_name(entry.path()).as_deref().and_then(parse_filename)
            {
                paths.push(parsed.path);
            }
        }
        paths.sort();
        paths.dedup();
        Ok(paths)
    }
}

/// Resolver over an in-memory set of templates.
///
/// Keys are view-relative filenames (`articles/_comment.html.erb`). Sources can
/// be replaced at runtime with [`insert`](Self::insert).
#[derive(Debug, Default)]
pub struct MemoryResolver {
    templates: RwLock<BTreeMap<String, String>>,
}

impl MemoryResolver {
    /// Create a resolver serving the given `(filename, source)` pairs.
    pub fn new<I, K, V>(templates: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            templates: RwLock::new(
                templates.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            ),
        }
    }

    /// Add or replace a template source.
    pub fn insert(&self, filename: impl Into<String>, source: impl Into<String>) {
        self.templates
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(filename.into(), source.into());
    }

    /// Remove a template.
    pub fn remove(&self, filename: &str) -> bool {
        self.templates.write().unwrap_or_else(PoisonError::into_inner).remove(filename).is_some()
    }
}

impl Resolver for MemoryResolver {
    fn find_all(&self, path: &TemplatePath, details: &Details) -> Result<Vec<Arc<Template>>> {
        let templates = self.templates.read().unwrap_or_else(PoisonError::into_inner);
        let mut matches: Vec<Arc<Template>> = templates
            .iter()
            .filter_map(|(filename, source)| {
                let parsed = parse_filename(filename)?;
                accepts(&parsed, path, details).then(|| {
                    Arc::new(Template {
                        identifier: format!("memory://{filename}"),
                        virtual_path: parsed.path.virtual_path(),
                        source: source.clone(),
                        handler: parsed.handler,
                        format: parsed.format,
                    })
                })
            })
            .collect();
        sort_matches(&mut matches);
        Ok(matches)
    }

    fn all_template_paths(&self) -> Result<Vec<TemplatePath>> {
        let templates = self.templates.read().unwrap_or_else(PoisonError::into_inner);
        let mut paths: Vec<TemplatePath> =
            templates.keys().filter_map(|f| parse_filename(f)).map(|p| p.path).collect();
        paths.sort();
        paths.dedup();
        Ok(paths)
    }
}

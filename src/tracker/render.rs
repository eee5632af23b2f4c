//! ERB-style render-call tracker.
//!
//! Recognized dependency declarations:
//!
//! - `render "comment"`, `render("comment")`, `render partial: "comment"`,
//!   `render :partial => "comment"`, `render layout: "boxed"`
//! - `render @comments` / `render @comment` → `comments/comment`
//! - `render @article.comments` / `render comment` → `comments/comment`, from
//!   the last identifier of the chain
//! - `<%# Template Dependency: shared/footer %>`
//! - `<%# Template Dependency: messages/* %>` → every template under `messages`
//!
//! Names without a `/` are relative to the directory of the template being
//! scanned. Double-quoted names containing `#{` are interpolated at render
//! time and are returned verbatim; they can never be resolved.

use anyhow::Result;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;

use super::DependencyTracker;
use crate::finder::{Resolver, Template};

const RENDER_CALL: &str = r#"\brender\s*\(?\s*(?:(?::(?:partial|layout)\s*=>|(?:partial|layout):)\s*)?(?P<quote>["'])(?P<name>[^"'\n]+)["']"#;
const RENDER_OBJECT: &str = r"\brender\s*\(?\s*(?P<receiver>@?[a-z_][a-z0-9_]*(?:\.[a-z_][a-z0-9_]*)*)(?P<option>\s*:)?";
const EXPLICIT_DEPENDENCY: &str = r"#\s*Template Dependency:\s*(?P<name>\S+)";

/// Tracker for templates that render partials with ERB render calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct RenderTracker;

impl RenderTracker {
    /// Create a render tracker
    pub fn new() -> Self {
        Self
    }

    fn render_dependencies(directory: &str, source: &str) -> Vec<String> {
        let mut dependencies = Vec::new();

        if let Ok(render_regex) = Regex::new(RENDER_CALL) {
            for cap in render_regex.captures_iter(source) {
                let (Some(quote), Some(name)) = (cap.name("quote"), cap.name("name")) else {
                    continue;
                };
                let name = name.as_str();
                if quote.as_str() == "\"" && name.contains("#{") {
                    dependencies.push(name.to_string());
                } else {
                    dependencies.push(qualify(directory, name));
                }
            }
        }

        if let Ok(object_regex) = Regex::new(RENDER_OBJECT) {
            for cap in object_regex.captures_iter(source) {
                // `render partial: ...` and friends are keyword options, not objects
                if cap.name("option").is_some() {
                    continue;
                }
                let Some(receiver) = cap.name("receiver") else {
                    continue;
                };
                // The partial comes from the last call in the chain
                let last = receiver.as_str().rsplit('.').next().unwrap_or_default();
                let singular = singularize(last.trim_start_matches('@'));
                dependencies.push(format!("{}/{}", pluralize(&singular), singular));
            }
        }

        dependencies
    }

    fn explicit_dependencies(
        source: &str,
        view_paths: &[Arc<dyn Resolver>],
    ) -> Result<Vec<String>> {
        let mut explicits = Vec::new();
        let mut wildcards = Vec::new();

        if let Ok(explicit_regex) = Regex::new(EXPLICIT_DEPENDENCY) {
            for cap in explicit_regex.captures_iter(source) {
                if let Some(name) = cap.name("name") {
                    match name.as_str().strip_suffix('*') {
                        Some(prefix) => wildcards.push(prefix.trim_end_matches('/').to_string()),
                        None => explicits.push(name.as_str().to_string()),
                    }
                }
            }
        }

        explicits.extend(resolve_wildcards(&wildcards, view_paths)?);
        Ok(explicits)
    }
}

impl DependencyTracker for RenderTracker {
    fn find_dependencies(
        &self,
        name: &str,
        template: &Template,
        view_paths: &[Arc<dyn Resolver>],
    ) -> Result<Vec<String>> {
        let directory = name.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");

        let mut dependencies = Self::render_dependencies(directory, &template.source);
        dependencies.extend(Self::explicit_dependencies(&template.source, view_paths)?);

        // Deduplicate while preserving order
        let mut seen = HashSet::new();
        dependencies.retain(|d| seen.insert(d.clone()));

        tracing::trace!("Found {} dependencies in '{}'", dependencies.len(), name);
        Ok(dependencies)
    }
}

/// Every template path under one of `prefixes`, sorted.
fn resolve_wildcards(prefixes: &[String], view_paths: &[Arc<dyn Resolver>]) -> Result<Vec<String>> {
    if prefixes.is_empty() {
        return Ok(Vec::new());
    }

    let mut resolved = Vec::new();
    for resolver in view_paths {
        for path in resolver.all_template_paths()? {
            if prefixes.iter().any(|prefix| *prefix == path.prefix) {
                resolved.push(path.virtual_path());
            }
        }
    }
    resolved.sort();
    resolved.dedup();
    Ok(resolved)
}

fn qualify(directory: &str, name: &str) -> String {
    if name.contains('/') || directory.is_empty() {
        name.to_string()
    } else {
        format!("{directory}/{name}")
    }
}

fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        format!("{stem}y")
    } else if let Some(stem) = word.strip_suffix('s').filter(|s| !s.ends_with('s')) {
        stem.to_string()
    } else {
        word.to_string()
    }
}

fn pluralize(word: &str) -> String {
    match word.strip_suffix('y') {
        Some(stem) if !stem.ends_with(['a', 'e', 'i', 'o', 'u']) => format!("{stem}ies"),
        _ if word.ends_with('s') => format!("{word}es"),
        _ => format!("{word}s"),
    }
}

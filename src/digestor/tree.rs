//! Tree builder: resolve a template name into a [`DependencyTree`].
//!
//! # Cycle handling
//!
//! Templates may render each other. The builder keeps a `seen` map from
//! template identity to node for the duration of one build and registers a
//! node *before* exploring its dependencies, so a dependency that leads back
//! to a template under construction receives the existing node instead of
//! recursing again. Identity rather than name is the key because two
//! spellings (`articles/comment`, `articles/_comment`) can resolve to the
//! same file.
//!
//! Unresolvable names become missing nodes, deduplicated by name.

use std::collections::{HashMap, HashSet};

use super::node::{DependencyTree, Node, NodeId, NodeKind};
use crate::constants::{DYNAMIC_NAME_TOKEN, PARTIAL_MARKER};
use crate::core::DigestError;
use crate::diagnostics::DiagnosticsSink;
use crate::finder::TemplateFinder;
use crate::tracker::TrackerRegistry;

/// Strip partial markers from a reference: `articles/_comment` → `articles/comment`.
pub fn logical_name(name: &str) -> String {
    name.replace(PARTIAL_MARKER, "/")
}

#[derive(Debug, Default)]
struct Seen {
    /// Resolved templates by identifier
    templates: HashMap<String, NodeId>,
    /// Missing nodes by name
    missing: HashMap<String, NodeId>,
}

/// Builds one dependency tree. Create one builder per build.
pub(crate) struct TreeBuilder<'a> {
    finder: &'a dyn TemplateFinder,
    trackers: &'a TrackerRegistry,
    sink: &'a dyn DiagnosticsSink,
    arena: DependencyTree,
    seen: Seen,
}

impl<'a> TreeBuilder<'a> {
    pub(crate) fn new(
        finder: &'a dyn TemplateFinder,
        trackers: &'a TrackerRegistry,
        sink: &'a dyn DiagnosticsSink,
    ) -> Self {
        Self {
            finder,
            trackers,
            sink,
            arena: DependencyTree::new(Vec::new(), NodeId(0)),
            seen: Seen::default(),
        }
    }

    /// Build the tree rooted at `name`.
    pub(crate) fn build(mut self, name: &str, partial: bool) -> Result<DependencyTree, DigestError> {
        let root = self.tree(name, partial)?;
        self.arena.set_root(root);
        Ok(self.arena)
    }

    fn tree(&mut self, name: &str, partial: bool) -> Result<NodeId, DigestError> {
        let logical_name = logical_name(name);

        let template = self
            .finder
            .find_all_uncached(&logical_name, &[], partial, &[])
            .map_err(|source| DigestError::TemplateLookup {
                name: logical_name.clone(),
                source,
            })?
            .into_iter()
            .next();

        let Some(template) = template else {
            // Dynamic template partial names can never be tracked
            if !name.contains(DYNAMIC_NAME_TOKEN) {
                self.sink.error(&format!("  Couldn't find template for digesting: {name}"));
            }
            return Ok(self.missing(name, logical_name));
        };

        if let Some(&existing) = self.seen.templates.get(&template.identifier) {
            return Ok(existing);
        }

        let kind = if partial {
            NodeKind::Partial(template.clone())
        } else {
            NodeKind::Template(template.clone())
        };
        let id = self.arena.push(Node {
            name: name.to_string(),
            logical_name,
            kind,
            children: Vec::new(),
        });
        self.seen.templates.insert(template.identifier.clone(), id);

        let dependencies = self
            .trackers
            .find_dependencies(name, &template, self.finder.view_paths())
            .map_err(|source| DigestError::DependencyExtraction {
                name: name.to_string(),
                source,
            })?;
        self.sink.debug(&format!(
            "  Digesting {name} ({}) with {} dependencies",
            template.identifier,
            dependencies.len()
        ));

        let mut logical_names = HashSet::new();
        for dependency in dependencies {
            if !logical_names.insert(self::logical_name(&dependency)) {
                continue;
            }
            let child = self.tree(&dependency, true)?;
            self.arena.add_child(id, child);
        }

        Ok(id)
    }

    fn missing(&mut self, name: &str, logical_name: String) -> NodeId {
        if let Some(&existing) = self.seen.missing.get(name) {
            return existing;
        }
        let id = self.arena.push(Node {
            name: name.to_string(),
            logical_name,
            kind: NodeKind::Missing,
            children: Vec::new(),
        });
        self.seen.missing.insert(name.to_string(), id);
        id
    }
}

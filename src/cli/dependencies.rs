//! `dependencies` and `nested-dependencies` commands.
//!
//! Both build the dependency tree of a template without digesting it.
//!
//! # Tree Output
//!
//! ```text
//! articles/show
//! ├── articles/comment
//! │   └── authors/author (missing)
//! └── shared/footer
//!     └── articles/comment (*)
//!
//! (*) = already shown above
//! ```

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use std::collections::HashSet;
use std::fmt::Write;

use super::CommandContext;
use crate::constants::{DEFAULT_FORMAT, PARTIAL_MARKER};
use crate::digestor::{DependencyTree, NodeId};

/// Output format of `nested-dependencies`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Nested JSON: `{ name: [children...] }`, bare names for leaves
    Json,
    /// Box-drawing tree for terminals
    Tree,
}

/// Print the names a template renders directly, as a JSON array.
#[derive(Args, Debug)]
pub struct DependenciesCommand {
    /// Template name
    pub name: String,

    /// Request format used for lookup
    #[arg(short, long, default_value = DEFAULT_FORMAT)]
    pub format: String,
}

impl DependenciesCommand {
    /// Build the tree and list the root's children.
    pub fn run(&self, context: &CommandContext) -> Result<String> {
        let tree = build_tree(context, &self.name, &self.format)?;
        serde_json::to_string_pretty(&tree.direct_dependencies())
            .context("Failed to serialize dependencies")
    }
}

/// Print the full dependency tree of a template.
#[derive(Args, Debug)]
pub struct NestedDependenciesCommand {
    /// Template name
    pub name: String,

    /// Request format used for lookup
    #[arg(short, long, default_value = DEFAULT_FORMAT)]
    pub format: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,

    /// Maximum depth shown in tree output (unlimited if not given)
    #[arg(long)]
    pub depth: Option<usize>,
}

impl NestedDependenciesCommand {
    /// Build the tree and export it.
    pub fn run(&self, context: &CommandContext) -> Result<String> {
        let tree = build_tree(context, &self.name, &self.format)?;
        match self.output {
            OutputFormat::Json => serde_json::to_string_pretty(&tree.to_dependency_map(tree.root()))
                .context("Failed to serialize dependency tree"),
            OutputFormat::Tree => Ok(render_tree(&tree, self.depth)),
        }
    }
}

fn build_tree(context: &CommandContext, name: &str, format: &str) -> Result<DependencyTree> {
    let finder = context.lookup_context(format)?;
    let tree = context.digestor().tree(name, &finder, name.contains(PARTIAL_MARKER))?;
    Ok(tree)
}

/// Render `tree` with box-drawing connectors.
///
/// Nodes are expanded once; later occurrences (including cycles) are marked
/// `(*)`.
pub(crate) fn render_tree(tree: &DependencyTree, depth: Option<usize>) -> String {
    let mut out = String::new();
    let root = tree.node(tree.root());
    let _ = writeln!(out, "{}{}", root.name.cyan().bold(), missing_marker(tree, tree.root()));

    let mut displayed = HashSet::from([tree.root()]);
    let mut repeated = false;
    let children = tree.children(tree.root());
    for (i, &child) in children.iter().enumerate() {
        render_node(
            tree,
            child,
            "",
            i == children.len() - 1,
            1,
            depth,
            &mut displayed,
            &mut repeated,
            &mut out,
        );
    }

    if repeated {
        let _ = writeln!(out, "\n{}", "(*) = already shown above".bright_black());
    }
    out.trim_end().to_string()
}

#[allow(clippy::too_many_arguments)]
fn render_node(
    tree: &DependencyTree,
    id: NodeId,
    prefix: &str,
    is_last: bool,
    level: usize,
    depth: Option<usize>,
    displayed: &mut HashSet<NodeId>,
    repeated: &mut bool,
    out: &mut String,
) {
    if let Some(max_depth) = depth
        && level > max_depth
    {
        return;
    }

    let node = tree.node(id);
    let connector = if is_last { "└── " } else { "├── " };
    let duplicate = !node.children().is_empty() && !displayed.insert(id);
    let dup_marker = if duplicate {
        *repeated = true;
        " (*)".bright_black().to_string()
    } else {
        String::new()
    };
    let _ = writeln!(
        out,
        "{prefix}{connector}{}{}{dup_marker}",
        node.name.cyan(),
        missing_marker(tree, id)
    );

    if duplicate {
        return;
    }

    let child_prefix = if is_last { format!("{prefix}    ") } else { format!("{prefix}│   ") };
    let children = node.children();
    for (i, &child) in children.iter().enumerate() {
        render_node(
            tree,
            child,
            &child_prefix,
            i == children.len() - 1,
            level + 1,
            depth,
            displayed,
            repeated,
            out,
        );
    }
}

fn missing_marker(tree: &DependencyTree, id: NodeId) -> String {
    if tree.node(id).is_missing() {
        " (missing)".yellow().to_string()
    } else {
        String::new()
    }
}

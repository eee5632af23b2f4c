//! Dependency tree nodes.
//!
//! A [`DependencyTree`] is an arena of [`Node`]s addressed by [`NodeId`].
//! Children are stored as ids, so two nodes may list each other as children
//! when the underlying templates render each other. Nothing in the tree
//! changes after the builder hands it out.

use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

use crate::finder::Template;

/// Index of a node within its [`DependencyTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// The four kinds of node and the data each one carries.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// A template resolved as a top-level (non-partial) name.
    Template(Arc<Template>),
    /// A template resolved as a partial reference.
    Partial(Arc<Template>),
    /// A reference that could not be resolved. Digests to the empty string.
    Missing,
    /// A cache-busting token supplied by the caller. Digests to itself.
    Injected,
}

/// A node of the dependency tree.
#[derive(Debug, Clone)]
pub struct Node {
    /// Reference as spelled by the parent, e.g. `articles/_comment`
    pub name: String,
    /// `name` with partial markers stripped, e.g. `articles/comment`
    pub logical_name: String,
    /// What this node is
    pub kind: NodeKind,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    /// A caller-supplied token, named exactly as given.
    pub fn injected(token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            logical_name: token.clone(),
            name: token,
            kind: NodeKind::Injected,
            children: Vec::new(),
        }
    }

    /// The resolved template, absent for missing and injected nodes.
    pub fn template(&self) -> Option<&Arc<Template>> {
        match &self.kind {
            NodeKind::Template(template) | NodeKind::Partial(template) => Some(template),
            NodeKind::Missing | NodeKind::Injected => None,
        }
    }

    /// Children in discovery order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Whether this node stands for a partial template.
    pub fn is_partial(&self) -> bool {
        matches!(self.kind, NodeKind::Partial(_))
    }

    /// Whether this node stands for an unresolvable reference.
    pub fn is_missing(&self) -> bool {
        matches!(self.kind, NodeKind::Missing)
    }

    /// Whether this node is a caller-supplied token.
    pub fn is_injected(&self) -> bool {
        matches!(self.kind, NodeKind::Injected)
    }
}

/// Arena holding every node of one dependency tree.
#[derive(Debug, Clone)]
pub struct DependencyTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl DependencyTree {
    pub(crate) fn new(nodes: Vec<Node>, root: NodeId) -> Self {
        Self {
            nodes,
            root,
        }
    }

    /// The node the tree was built for.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Look a node up by id.
    ///
    /// Ids are only meaningful for the tree that produced them.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Children of `id` in discovery order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Number of distinct nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes (never true for a built tree).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over every node with its id.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(index, node)| (NodeId(index), node))
    }

    /// Names of the root's direct dependencies.
    pub fn direct_dependencies(&self) -> Vec<String> {
        self.children(self.root).iter().map(|&child| self.node(child).name.clone()).collect()
    }

    /// Export the subtree at `id` as nested JSON.
    ///
    /// A node with children becomes `{ name: [child exports...] }`; a childless
    /// node is its bare name. A node already being exported higher up the
    /// current path is emitted as its bare name, so cyclic trees terminate.
    pub fn to_dependency_map(&self, id: NodeId) -> Value {
        let mut path = HashSet::new();
        self.export(id, &mut path)
    }

    fn export(&self, id: NodeId, path: &mut HashSet<NodeId>) -> Value {
        let node = self.node(id);
        if node.children.is_empty() || !path.insert(id) {
            return Value::String(node.name.clone());
        }

        let children = node.children.iter().map(|&child| self.export(child, path)).collect();
        path.remove(&id);

        let mut map = serde_json::Map::new();
        map.insert(node.name.clone(), Value::Array(children));
        Value::Object(map)
    }

    pub(crate) fn set_root(&mut self, root: NodeId) {
        self.root = root;
    }

    pub(crate) fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub(crate) fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0].children.push(child);
    }
}

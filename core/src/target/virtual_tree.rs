//! In-memory render target.

use super::markup::{self, Markup};
use super::{EventKind, Listener, NodeId, RenderTarget};
use std::collections::HashMap;

#[derive(Debug, Clone)]
enum NodeKind {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    generation: u64,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed element tree. Node 0 is the container.
#[derive(Debug, Clone)]
pub struct VirtualTree {
    nodes: Vec<Node>,
    generation: u64,
    listeners: HashMap<(NodeId, EventKind), Vec<Listener>>,
}

impl Default for VirtualTree {
    fn default() -> Self {
        Self::new("div")
    }
}

impl VirtualTree {
    /// Creates an empty container with the given tag.
    pub fn new(container_tag: &str) -> Self {
        let root = Node {
            kind: NodeKind::Element {
                tag: container_tag.to_string(),
                attrs: Vec::new(),
            },
            generation: 0,
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![root],
            generation: 0,
            listeners: HashMap::new(),
        }
    }

    /// Number of `set_content` calls so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of nodes held by the arena, the container included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Serializes the container's content (not the container itself).
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for child in &self.nodes[0].children {
            self.write_node(*child, &mut out);
        }
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        match &node.kind {
            NodeKind::Text(text) => out.push_str(&markup::escape_text(text)),
            NodeKind::Element { tag, attrs } => {
                markup::write_open_tag(out, tag, attrs.iter().map(|(n, v)| (n.as_str(), v.as_str())));
                if markup::is_void(tag) {
                    return;
                }
                for child in &node.children {
                    self.write_node(*child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes
            .get(id.index)
            .filter(|node| node.generation == id.generation)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes
            .get_mut(id.index)
            .filter(|node| node.generation == id.generation)
    }

    fn push(&mut self, kind: NodeKind, parent: NodeId) -> NodeId {
        let id = NodeId::new(self.nodes.len(), self.generation);
        self.nodes.push(Node {
            kind,
            generation: self.generation,
            parent: Some(parent),
            children: Vec::new(),
        });
        if let Some(parent) = self.node_mut(parent) {
            parent.children.push(id);
        }
        id
    }

    fn install(&mut self, markup: Markup, parent: NodeId) {
        match markup {
            Markup::Text(text) => {
                self.push(NodeKind::Text(text), parent);
            }
            Markup::Element(el) => {
                let id = self.push(
                    NodeKind::Element {
                        tag: el.tag,
                        attrs: el.attrs,
                    },
                    parent,
                );
                for child in el.children {
                    self.install(child, id);
                }
            }
        }
    }

    fn is_element(&self, id: NodeId) -> bool {
        matches!(
            self.node(id),
            Some(Node {
                kind: NodeKind::Element { .. },
                ..
            })
        )
    }

    fn sole_text_child(&self, id: NodeId) -> Option<NodeId> {
        match self.node(id)?.children.as_slice() {
            [only] => match self.node(*only)?.kind {
                NodeKind::Text(_) => Some(*only),
                NodeKind::Element { .. } => None,
            },
            _ => None,
        }
    }

    /// Element siblings of `id`, with the position of `id` among them.
    fn element_siblings(&self, id: NodeId) -> Option<(Vec<NodeId>, usize)> {
        let parent = self.node(id)?.parent?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|s| *s == id)?;
        Some((siblings, pos))
    }
}

impl RenderTarget for VirtualTree {
    fn root(&self) -> NodeId {
        NodeId::new(0, 0)
    }

    fn set_content(&mut self, content: Vec<Markup>) {
        self.nodes.truncate(1);
        self.nodes[0].children.clear();
        self.listeners.clear();
        self.generation += 1;

        let root = self.root();
        for node in content {
            self.install(node, root);
        }
    }

    fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.node(node)?.kind {
            NodeKind::Element { tag, .. } => Some(tag.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    fn get_attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.node(node)?.kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(Node {
            kind: NodeKind::Element { attrs, .. },
            ..
        }) = self.node_mut(node)
        {
            match attrs.iter_mut().find(|(n, _)| n == name) {
                Some(slot) => slot.1 = value.to_string(),
                None => attrs.push((name.to_string(), value.to_string())),
            }
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(Node {
            kind: NodeKind::Element { attrs, .. },
            ..
        }) = self.node_mut(node)
        {
            attrs.retain(|(n, _)| n != name);
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)?.parent
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        match self.node(node) {
            Some(n) => n
                .children
                .iter()
                .copied()
                .filter(|c| self.is_element(*c))
                .collect(),
            None => Vec::new(),
        }
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let (siblings, pos) = self.element_siblings(node)?;
        siblings.get(pos + 1).copied()
    }

    fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        let (siblings, pos) = self.element_siblings(node)?;
        pos.checked_sub(1).and_then(|p| siblings.get(p).copied())
    }

    fn text(&self, node: NodeId) -> String {
        let Some(n) = self.node(node) else {
            return String::new();
        };
        match &n.kind {
            NodeKind::Text(text) => text.clone(),
            NodeKind::Element { .. } => n.children.iter().map(|c| self.text(*c)).collect(),
        }
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if !self.is_element(node) {
            return;
        }
        // A lone text child is rewritten in place so repeated marker
        // refreshes do not grow the arena.
        if let Some(only) = self.sole_text_child(node) {
            if let Some(Node {
                kind: NodeKind::Text(existing),
                ..
            }) = self.node_mut(only)
            {
                existing.clear();
                existing.push_str(text);
            }
            return;
        }
        // Detached children stay in the arena until the next set_content.
        let detached = match self.node_mut(node) {
            Some(n) => std::mem::take(&mut n.children),
            None => return,
        };
        for child in detached {
            if let Some(c) = self.node_mut(child) {
                c.parent = None;
            }
        }
        self.push(NodeKind::Text(text.to_string()), node);
    }

    fn on(&mut self, node: NodeId, event: EventKind, listener: Listener) {
        if self.node(node).is_some() {
            self.listeners.entry((node, event)).or_default().push(listener);
        }
    }

    fn listeners(&self, node: NodeId, event: EventKind) -> Vec<Listener> {
        self.listeners
            .get(&(node, event))
            .cloned()
            .unwrap_or_default()
    }
}

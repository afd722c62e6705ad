//! Render target abstraction.
//!
//! A form never talks to a browser document directly. It renders into any
//! [`RenderTarget`]: something that accepts a whole [`Markup`] payload,
//! answers descendant queries, stores attributes and records listeners.
//! [`VirtualTree`] is the in-memory implementation; a browser host adapts
//! the real document at its own boundary.

pub mod markup;
pub mod virtual_tree;


pub use markup::{to_html, Markup, MarkupElement};
pub use virtual_tree::VirtualTree;

use serde::{Deserialize, Serialize};

/// Handle to a node in a render target.
///
/// Handles carry the content generation they were issued for, so a handle
/// kept across a re-render no longer resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub index: usize,
    pub generation: u64,
}

impl NodeId {
    pub fn new(index: usize, generation: u64) -> Self {
        Self { index, generation }
    }
}

/// Events a host can deliver to a rendered control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Continuous interaction tick (keystroke, slider drag).
    Input,
    /// Commit of a finished edit (blur, enter, release).
    Change,
    Click,
}

/// Behavior attached to a node. Interpreted by the form on dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Listener {
    /// Refresh the info marker; notify immediately for live controls.
    InputTick,
    /// Schedule a debounced notification.
    Commit,
    /// Collapse or expand a group span.
    GroupToggle,
}

/// Descendant query: tag list, optional attribute equality, optional ancestor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    tags: Vec<String>,
    attr: Option<(String, String)>,
    ancestor: Option<Box<Selector>>,
}

impl Selector {
    pub fn tag(tag: &str) -> Self {
        Self::tags(&[tag])
    }

    pub fn tags(tags: &[&str]) -> Self {
        Self {
            tags: tags.iter().map(|t| t.to_ascii_lowercase()).collect(),
            attr: None,
            ancestor: None,
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attr = Some((name.to_string(), value.to_string()));
        self
    }

    /// Restricts matches to descendants of nodes matching `ancestor`.
    pub fn within(mut self, ancestor: Selector) -> Self {
        self.ancestor = Some(Box::new(ancestor));
        self
    }

    /// Matches `node` itself, ignoring the ancestor constraint.
    fn matches_self<T: RenderTarget + ?Sized>(&self, target: &T, node: NodeId) -> bool {
        let Some(tag) = target.tag(node) else {
            return false;
        };
        if !self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            return false;
        }
        match &self.attr {
            Some((name, value)) => target.get_attribute(node, name) == Some(value.as_str()),
            None => true,
        }
    }

    pub fn matches<T: RenderTarget + ?Sized>(&self, target: &T, node: NodeId) -> bool {
        if !self.matches_self(target, node) {
            return false;
        }
        let Some(ancestor) = &self.ancestor else {
            return true;
        };
        let mut current = target.parent(node);
        while let Some(candidate) = current {
            if ancestor.matches(target, candidate) {
                return true;
            }
            current = target.parent(candidate);
        }
        false
    }
}

/// Capability interface of anything a form can render into.
pub trait RenderTarget {
    /// The container node. Survives content replacement.
    fn root(&self) -> NodeId;

    /// Replaces the container's entire content in one step. All previously
    /// issued handles and attached listeners are discarded.
    fn set_content(&mut self, content: Vec<Markup>);

    /// Tag name of an element node; `None` for text nodes and stale handles.
    fn tag(&self, node: NodeId) -> Option<&str>;

    fn get_attribute(&self, node: NodeId, name: &str) -> Option<&str>;
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);
    fn remove_attribute(&mut self, node: NodeId, name: &str);

    fn parent(&self, node: NodeId) -> Option<NodeId>;
    /// Element children in document order.
    fn children(&self, node: NodeId) -> Vec<NodeId>;
    fn next_sibling(&self, node: NodeId) -> Option<NodeId>;
    fn previous_sibling(&self, node: NodeId) -> Option<NodeId>;

    /// Concatenated text of all descendants.
    fn text(&self, node: NodeId) -> String;
    /// Replaces the children of `node` with a single text node.
    fn set_text(&mut self, node: NodeId, text: &str);

    fn on(&mut self, node: NodeId, event: EventKind, listener: Listener);
    fn listeners(&self, node: NodeId, event: EventKind) -> Vec<Listener>;

    /// All descendants of the container matching `selector`, in document order.
    fn query_all(&self, selector: &Selector) -> Vec<NodeId> {
        self.query_all_within(self.root(), selector)
    }

    /// All descendants of `scope` (excluding `scope`) matching `selector`.
    fn query_all_within(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            if selector.matches(self, node) {
                found.push(node);
            }
            stack.extend(self.children(node).into_iter().rev());
        }
        found
    }

    fn query_first_within(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.query_all_within(scope, selector).into_iter().next()
    }

    fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.get_attribute(node, name).is_some()
    }
}

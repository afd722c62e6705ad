//! Parameter form synchronizer.
//!
//! Renders an ordered list of [`ParameterDefinition`]s into a
//! [`RenderTarget`], keeps the rendered controls as the source of truth for
//! current values, and reports changes through a single callback:
//! - Live controls notify on every input tick
//! - Other controls notify once their commits have settled (debounced)
//! - Group labels collapse/expand their span and notify as a layout change

pub mod builder;
pub mod config;
pub mod controls;
pub mod debounce;
pub mod extract;

#[cfg(test)]
mod tests_render;
#[cfg(test)]
mod tests_groups;

pub use config::FormConfig;
pub use controls::{find_control, find_group_label, read_control, write_control};
pub use debounce::Debouncer;
pub use extract::{extract_values, extract_values_from};

use crate::params::{
    resolve_definitions, ButtonSpec, ParamValue, ParameterDefinition,
    StoredParams, ValueMapping,
};
use crate::target::{EventKind, Listener, NodeId, RenderTarget};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("Node {0:?} is not part of the current form")]
    UnknownNode(NodeId),

    #[error("Node {0:?} is not an input or select")]
    NotAControl(NodeId),

    #[error("No control named '{0}'")]
    UnknownControl(String),

    #[error("No group named '{0}'")]
    UnknownGroup(String),
}

/// Identifies one form instance in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormId(pub Uuid);

impl FormId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FormId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why the change callback fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    /// A control's value changed.
    Value,
    /// Only the collapsed/expanded state of a group changed.
    Layout,
}

impl ChangeKind {
    pub fn is_layout_only(&self) -> bool {
        matches!(self, Self::Layout)
    }
}

pub type ChangeCallback = Box<dyn FnMut(&ValueMapping, ChangeKind) + Send>;

/// Outcome of one render pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderReport {
    pub form: FormId,
    pub rows: usize,
    /// Kind names that had no renderer and were shown as labels only.
    pub missing: BTreeSet<String>,
}

/// Owns the per-form state threaded between renders and events: the change
/// callback and the commit debounce slot. The container itself stays with
/// the caller and is handed in on every call.
pub struct FormSynchronizer {
    id: FormId,
    config: FormConfig,
    on_change: Option<ChangeCallback>,
    debounce: Debouncer,
}

impl fmt::Debug for FormSynchronizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormSynchronizer")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("has_callback", &self.on_change.is_some())
            .field("debounce", &self.debounce)
            .finish()
    }
}

impl Default for FormSynchronizer {
    fn default() -> Self {
        Self::new(FormConfig::default())
    }
}

impl FormSynchronizer {
    pub fn new(config: FormConfig) -> Self {
        let debounce = Debouncer::new(config.commit_settle());
        Self {
            id: FormId::new(),
            config,
            on_change: None,
            debounce,
        }
    }

    pub fn with_on_change<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&ValueMapping, ChangeKind) + Send + 'static,
    {
        self.set_on_change(callback);
        self
    }

    pub fn set_on_change<F>(&mut self, callback: F)
    where
        F: FnMut(&ValueMapping, ChangeKind) + Send + 'static,
    {
        self.on_change = Some(Box::new(callback));
    }

    pub fn clear_on_change(&mut self) {
        self.on_change = None;
    }

    pub fn id(&self) -> FormId {
        self.id
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    /// Regenerates the whole form inside `target`.
    ///
    /// Writes the resolved `value`/`closed` into each definition, replaces the
    /// container content in one step and wires listeners onto the new
    /// controls. `buttons` falls back to the configured default row. Any
    /// pending debounced notification belongs to the old content and is
    /// dropped.
    pub fn render<T: RenderTarget + ?Sized>(
        &mut self,
        defs: &mut [ParameterDefinition],
        target: &mut T,
        stored: &StoredParams,
        buttons: Option<&[ButtonSpec]>,
    ) -> RenderReport {
        resolve_definitions(defs, stored);

        let buttons = buttons.unwrap_or(self.config.default_buttons.as_slice());
        let (content, missing) = builder::build_form(defs, buttons);
        if !missing.is_empty() {
            warn!(form = %self.id, kinds = ?missing, "Missing parameter renderer");
        }

        target.set_content(content);
        self.debounce.cancel();
        self.wire(target);

        debug!(form = %self.id, rows = defs.len(), "Rendered parameter form");
        RenderReport {
            form: self.id,
            rows: defs.len(),
            missing,
        }
    }

    fn wire<T: RenderTarget + ?Sized>(&self, target: &mut T) {
        for control in target.query_all(&controls::control_selector()) {
            target.on(control, EventKind::Input, Listener::InputTick);
            if !controls::is_live(&*target, control) {
                target.on(control, EventKind::Change, Listener::Commit);
            }
        }
        for label in target.query_all(&controls::group_label_selector()) {
            target.on(label, EventKind::Click, Listener::GroupToggle);
        }
    }

    /// Delivers a host event to a rendered node and runs its listeners.
    pub fn dispatch<T: RenderTarget + ?Sized>(
        &mut self,
        target: &mut T,
        node: NodeId,
        event: EventKind,
        now: Instant,
    ) -> Result<(), FormError> {
        if target.tag(node).is_none() {
            return Err(FormError::UnknownNode(node));
        }

        for listener in target.listeners(node, event) {
            match listener {
                Listener::InputTick => {
                    if controls::is_range(&*target, node) {
                        controls::apply_range(target, node);
                    }
                    if controls::is_live(&*target, node) {
                        self.notify(target, ChangeKind::Value);
                    }
                }
                Listener::Commit => {
                    let deadline = self.debounce.schedule(now);
                    debug!(form = %self.id, ?deadline, "Commit scheduled");
                }
                Listener::GroupToggle => {
                    let closed = controls::toggle_group(target, node);
                    debug!(
                        form = %self.id,
                        group = target.get_attribute(node, "name").unwrap_or_default(),
                        closed,
                        "Group toggled"
                    );
                    self.notify(target, ChangeKind::Layout);
                }
            }
        }
        Ok(())
    }

    /// Sets a control's value as a user edit would, then fires `Input`.
    pub fn input<T: RenderTarget + ?Sized>(
        &mut self,
        target: &mut T,
        node: NodeId,
        value: &ParamValue,
        now: Instant,
    ) -> Result<(), FormError> {
        if target.tag(node).is_none() {
            return Err(FormError::UnknownNode(node));
        }
        if !controls::is_control(&*target, node) {
            return Err(FormError::NotAControl(node));
        }
        write_control(target, node, value);
        self.dispatch(target, node, EventKind::Input, now)
    }

    /// Deadline of the pending debounced notification, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    /// Fires the debounced notification once its settle delay has elapsed.
    /// Values are read at fire time, so the most recent edit wins.
    pub fn poll<T: RenderTarget + ?Sized>(&mut self, target: &mut T, now: Instant) -> bool {
        if self.debounce.fire_if_due(now) {
            self.notify(target, ChangeKind::Value);
            true
        } else {
            false
        }
    }

    /// Fires the pending notification immediately, if there is one.
    pub fn flush<T: RenderTarget + ?Sized>(&mut self, target: &mut T) -> bool {
        if self.debounce.cancel() {
            self.notify(target, ChangeKind::Value);
            true
        } else {
            false
        }
    }

    /// Current values of the rendered form.
    pub fn values<T: RenderTarget + ?Sized>(&self, target: &mut T) -> ValueMapping {
        extract_values(target)
    }

    fn notify<T: RenderTarget + ?Sized>(&mut self, target: &mut T, kind: ChangeKind) {
        let values = extract_values(target);
        if let Some(callback) = self.on_change.as_mut() {
            callback(&values, kind);
        }
    }
}

//! One browser session: a form, its virtual container and the frame protocol.

use paramform_core::form::{find_control, find_group_label};
use paramform_core::params::{ButtonSpec, ParamValue, ParameterDefinition, StoredParams, ValueMapping};
use paramform_core::target::EventKind;
use paramform_core::{FormConfig, FormError, FormSynchronizer, VirtualTree};
use serde::Deserialize;
use serde_json::json;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

/// Inbound command frames.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `RENDER:{"definitions"|"parameters": [...], "stored": {...}, "buttons": [...]}`
    Render(RenderRequest),
    /// `INPUT:{"name": "...", "value": ...}`
    Input { name: String, value: ParamValue },
    /// `COMMIT:{"name": "..."}`
    Commit { name: String },
    /// `TOGGLE_GROUP:<name>`
    ToggleGroup(String),
    GetParams,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RenderRequest {
    #[serde(alias = "parameters")]
    pub definitions: Vec<ParameterDefinition>,
    #[serde(default)]
    pub stored: StoredParams,
    #[serde(default)]
    pub buttons: Option<Vec<ButtonSpec>>,
}

#[derive(Deserialize)]
struct InputCmd {
    name: String,
    value: ParamValue,
}

#[derive(Deserialize)]
struct CommitCmd {
    name: String,
}

pub fn parse_command(text: &str) -> Result<Command, String> {
    if text == "GET_PARAMS" {
        return Ok(Command::GetParams);
    }
    if let Some(json_str) = text.strip_prefix("RENDER:") {
        return serde_json::from_str::<RenderRequest>(json_str)
            .map(Command::Render)
            .map_err(|e| format!("Invalid RENDER payload: {}", e));
    }
    if let Some(json_str) = text.strip_prefix("INPUT:") {
        return serde_json::from_str::<InputCmd>(json_str)
            .map(|cmd| Command::Input {
                name: cmd.name,
                value: cmd.value,
            })
            .map_err(|e| format!("Invalid INPUT payload: {}", e));
    }
    if let Some(json_str) = text.strip_prefix("COMMIT:") {
        return serde_json::from_str::<CommitCmd>(json_str)
            .map(|cmd| Command::Commit { name: cmd.name })
            .map_err(|e| format!("Invalid COMMIT payload: {}", e));
    }
    if let Some(name) = text.strip_prefix("TOGGLE_GROUP:") {
        if name.is_empty() {
            return Err("Empty group name provided".to_string());
        }
        return Ok(Command::ToggleGroup(name.to_string()));
    }
    Err(format!("Unknown command: {}", text))
}

/// Outbound frames.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    FormUpdate(String),
    ParamsUpdate { values: ValueMapping, layout_only: bool },
    MissingKinds(Vec<String>),
    Error { code: String, message: String },
}

impl Reply {
    fn error(code: &str, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub fn to_frame(&self) -> String {
        match self {
            Self::FormUpdate(html) => format!("FORM_UPDATE:{}", html),
            Self::ParamsUpdate { values, layout_only } => format!(
                "PARAMS_UPDATE:{}",
                json!({ "values": values, "layout_only": layout_only })
            ),
            Self::MissingKinds(kinds) => format!("MISSING_KINDS:{}", json!(kinds)),
            Self::Error { code, message } => format!(
                "ERROR_UPDATE:{}",
                json!({ "code": code, "message": message, "severity": "error" })
            ),
        }
    }
}

/// Holds the form state of one connection. Every outbound frame, including
/// change notifications raised from inside the form, goes through `outbox`.
pub struct Session {
    form: FormSynchronizer,
    tree: VirtualTree,
    definitions: Vec<ParameterDefinition>,
    outbox: UnboundedSender<Reply>,
}

impl Session {
    pub fn new(config: FormConfig, outbox: UnboundedSender<Reply>) -> Self {
        let notify = outbox.clone();
        let form = FormSynchronizer::new(config).with_on_change(move |values, kind| {
            let _ = notify.send(Reply::ParamsUpdate {
                values: values.clone(),
                layout_only: kind.is_layout_only(),
            });
        });
        Self {
            form,
            tree: VirtualTree::default(),
            definitions: Vec::new(),
            outbox,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.form.next_deadline()
    }

    pub fn poll(&mut self, now: Instant) -> bool {
        self.form.poll(&mut self.tree, now)
    }

    /// Parses and applies one text frame. Failures become `ERROR_UPDATE` frames.
    pub fn handle_frame(&mut self, text: &str, now: Instant) {
        debug!(form = %self.form.id(), "Received frame: {}", text);
        let command = match parse_command(text) {
            Ok(command) => command,
            Err(message) => {
                warn!("{}", message);
                self.send(Reply::error("BAD_COMMAND", message));
                return;
            }
        };
        if let Err(e) = self.apply(command, now) {
            warn!(form = %self.form.id(), "Command failed: {}", e);
            self.send(Reply::error("FORM_ERROR", e.to_string()));
        }
    }

    pub fn apply(&mut self, command: Command, now: Instant) -> Result<(), FormError> {
        match command {
            Command::Render(request) => {
                self.definitions = request.definitions;
                let report = self.form.render(
                    &mut self.definitions,
                    &mut self.tree,
                    &request.stored,
                    request.buttons.as_deref(),
                );
                info!(form = %report.form, rows = report.rows, "Form rendered");
                self.send(Reply::FormUpdate(self.tree.to_html()));
                if !report.missing.is_empty() {
                    self.send(Reply::MissingKinds(report.missing.into_iter().collect()));
                }
            }
            Command::Input { name, value } => {
                let node = find_control(&self.tree, &name).ok_or(FormError::UnknownControl(name))?;
                self.form.input(&mut self.tree, node, &value, now)?;
            }
            Command::Commit { name } => {
                let node = find_control(&self.tree, &name).ok_or(FormError::UnknownControl(name))?;
                self.form.dispatch(&mut self.tree, node, EventKind::Change, now)?;
            }
            Command::ToggleGroup(name) => {
                let label = find_group_label(&self.tree, &name).ok_or(FormError::UnknownGroup(name))?;
                self.form.dispatch(&mut self.tree, label, EventKind::Click, now)?;
                self.send(Reply::FormUpdate(self.tree.to_html()));
            }
            Command::GetParams => {
                let values = self.form.values(&mut self.tree);
                self.send(Reply::ParamsUpdate {
                    values,
                    layout_only: false,
                });
            }
        }
        Ok(())
    }

    fn send(&self, reply: Reply) {
        if self.outbox.send(reply).is_err() {
            debug!("Outbox closed, dropping reply");
        }
    }
}

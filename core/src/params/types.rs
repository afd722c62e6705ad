//! Core types for parameter definitions and their values.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// A single parameter value as stored by the caller or read back from a control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl ParamValue {
    /// Text form used for markup attributes.
    pub fn to_attr(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => format_number(*n),
            Self::Text(s) => s.clone(),
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    /// Equality after both sides are printed, so `5` matches `"5"`.
    pub fn loosely_equals(&self, other: &ParamValue) -> bool {
        self == other || self.to_attr() == other.to_attr()
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for ParamValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_attr())
    }
}

/// Prints a number the way a browser would put it into an attribute
/// (`5.0` -> `"5"`, `-0.0` -> `"0"`).
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }
    n.to_string()
}

/// Parses the longest numeric prefix of `raw`, falling back to `0`.
///
/// Mirrors how a form control's text is coerced into a number: leading
/// whitespace is skipped, trailing garbage is ignored, and anything that
/// does not start with a number becomes `0`.
pub fn parse_number(raw: &str) -> f64 {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return 0.0;
    }
    // Exponent only counts when followed by at least one digit.
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().unwrap_or(0.0)
}

/// The closed set of parameter kinds a form knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    Group,
    Choice,
    Float,
    Range,
    Slider,
    Int,
    Text,
    Url,
    Email,
    Date,
    Password,
    Color,
    Checkbox,
    Number,
}

impl ParamKind {
    pub const ALL: [ParamKind; 14] = [
        Self::Group,
        Self::Choice,
        Self::Float,
        Self::Range,
        Self::Slider,
        Self::Int,
        Self::Text,
        Self::Url,
        Self::Email,
        Self::Date,
        Self::Password,
        Self::Color,
        Self::Checkbox,
        Self::Number,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Choice => "choice",
            Self::Float => "float",
            Self::Range => "range",
            Self::Slider => "slider",
            Self::Int => "int",
            Self::Text => "text",
            Self::Url => "url",
            Self::Email => "email",
            Self::Date => "date",
            Self::Password => "password",
            Self::Color => "color",
            Self::Checkbox => "checkbox",
            Self::Number => "number",
        }
    }

    /// Kinds whose values are extracted as numbers and default to `0`.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Number | Self::Float | Self::Int | Self::Range | Self::Slider
        )
    }

    /// The `type` attribute of the generated `<input>`.
    pub fn input_type(&self) -> &'static str {
        match self {
            Self::Int | Self::Float => "number",
            Self::Range | Self::Slider => "range",
            other => other.as_str(),
        }
    }

    /// Value used when neither the caller nor the definition provides one.
    pub fn default_value(&self) -> ParamValue {
        if self.is_numeric() {
            ParamValue::Number(0.0)
        } else {
            ParamValue::Text(String::new())
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKind(pub String);

impl FromStr for ParamKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// Declarative description of one user-editable control.
///
/// `value` and `closed` are written by every render pass; everything else
/// comes from the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterDefinition {
    pub name: String,
    /// Raw kind name. Kept as text so definitions with unsupported kinds
    /// still parse and render as label-only rows.
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<ParamValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captions: Option<Vec<ParamValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<ParamValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<ParamValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<ParamValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(deserialize_with = "de_flag", skip_serializing_if = "Option::is_none")]
    pub live: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial: Option<ParamValue>,
    #[serde(rename = "default", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<ParamValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<ParamValue>,
    /// Resolved value of the last render pass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<ParamValue>,
    /// Whether the row sat under a collapsed group in the last render pass.
    pub closed: bool,
}

impl ParameterDefinition {
    pub fn new(name: &str, kind: ParamKind) -> Self {
        Self {
            name: name.to_string(),
            type_name: kind.as_str().to_string(),
            ..Default::default()
        }
    }

    pub fn with_caption(mut self, caption: &str) -> Self {
        self.caption = Some(caption.to_string());
        self
    }

    pub fn with_initial(mut self, value: impl Into<ParamValue>) -> Self {
        self.initial = Some(value.into());
        self
    }

    pub fn with_values(mut self, values: Vec<ParamValue>) -> Self {
        self.values = values;
        self
    }

    pub fn with_live(mut self, live: bool) -> Self {
        self.live = Some(live);
        self
    }

    /// The kind this definition renders as, if it is a supported one.
    pub fn kind(&self) -> Option<ParamKind> {
        self.type_name.parse().ok()
    }

    /// Label text; falls back to the name when no caption is given.
    pub fn label(&self) -> &str {
        self.caption.as_deref().unwrap_or(&self.name)
    }
}

/// Accepts `true`/`false`, `1`/`0` or `"1"`/`"0"` for flag attributes.
fn de_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Number(f64),
        Text(String),
    }

    Ok(Option::<Flag>::deserialize(deserializer)?.map(|flag| match flag {
        Flag::Bool(b) => b,
        Flag::Number(n) => n != 0.0,
        Flag::Text(s) => !(s.is_empty() || s == "0" || s == "false"),
    }))
}

/// An action button in the trailing row. Its action is opaque to the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ButtonRepr")]
pub struct ButtonSpec {
    pub id: String,
    pub name: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ButtonRepr {
    Id(String),
    Full { id: String, name: Option<String> },
}

impl From<ButtonRepr> for ButtonSpec {
    fn from(repr: ButtonRepr) -> Self {
        match repr {
            ButtonRepr::Id(id) => ButtonSpec::new(&id),
            ButtonRepr::Full { id, name } => {
                let name = name.unwrap_or_else(|| id.clone());
                ButtonSpec { id, name }
            }
        }
    }
}

impl ButtonSpec {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
        }
    }

    /// `reset, save, load, edit, link`
    pub fn default_row() -> Vec<ButtonSpec> {
        ["reset", "save", "load", "edit", "link"]
            .iter()
            .map(|id| ButtonSpec::new(id))
            .collect()
    }
}

/// Last-known values supplied (and persisted) by the caller.
pub type StoredParams = HashMap<String, ParamValue>;

/// Flat name -> value mapping read back from a rendered form.
pub type ValueMapping = HashMap<String, ParamValue>;

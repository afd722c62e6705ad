//! Definition -> markup renderer table.

use crate::params::{ButtonSpec, ParamKind, ParamValue, ParameterDefinition};
use crate::target::{Markup, MarkupElement};
use std::collections::BTreeSet;

pub const ROW_CLASS: &str = "form-line";
pub const BUTTON_ROW_CLASS: &str = "param-buttons";
/// Attribute carrying the parameter kind on generated controls.
pub const KIND_ATTR: &str = "data-kind";

/// Builds the full form payload from already-resolved definitions.
///
/// Returns the markup and the set of kind names that had no renderer.
pub fn build_form(defs: &[ParameterDefinition], buttons: &[ButtonSpec]) -> (Vec<Markup>, BTreeSet<String>) {
    let mut content = Vec::with_capacity(defs.len() + 1);
    let mut missing = BTreeSet::new();

    for def in defs {
        let kind = def.kind();
        if kind.is_none() {
            missing.insert(def.type_name.clone());
        }
        content.push(build_row(def, kind).into());
    }
    content.push(build_buttons(buttons).into());

    (content, missing)
}

fn build_row(def: &ParameterDefinition, kind: Option<ParamKind>) -> MarkupElement {
    let value = def.value.clone().unwrap_or_else(|| match kind {
        Some(k) => k.default_value(),
        None => ParamValue::Text(String::new()),
    });
    let control = kind.and_then(|k| build_control(def, k, &value));
    let is_group = kind == Some(ParamKind::Group);
    let is_checkbox = kind == Some(ParamKind::Checkbox);

    let mut label = Markup::element("label");
    if is_group {
        label = label.attr("name", def.name.as_str());
    }
    // Checkboxes sit in front of their caption; every other control follows the label.
    let (inline, trailing) = if is_checkbox { (control, None) } else { (None, control) };
    if let Some(control) = inline {
        label = label.child(control);
    }
    label = label.text(def.label()).child(Markup::element("i"));

    let mut row = Markup::element("div")
        .attr("class", ROW_CLASS)
        .attr("type", def.type_name.as_str())
        .attr("closed", if def.closed { "1" } else { "0" })
        .child(label);
    if let Some(control) = trailing {
        row = row.child(control);
    }
    row
}

fn build_control(def: &ParameterDefinition, kind: ParamKind, value: &ParamValue) -> Option<MarkupElement> {
    match kind {
        ParamKind::Group => None,
        ParamKind::Choice => Some(choice(def, value)),
        ParamKind::Checkbox => Some(checkbox(def, value)),
        ParamKind::Float
        | ParamKind::Range
        | ParamKind::Slider
        | ParamKind::Int
        | ParamKind::Text
        | ParamKind::Url
        | ParamKind::Email
        | ParamKind::Date
        | ParamKind::Password
        | ParamKind::Color
        | ParamKind::Number => Some(input(def, kind, value)),
    }
}

fn choice(def: &ParameterDefinition, value: &ParamValue) -> MarkupElement {
    let numeric = def.values.first().map(ParamValue::is_number).unwrap_or(false);
    let captions = def.captions.as_ref().unwrap_or(&def.values);

    let mut select = Markup::element("select")
        .attr(KIND_ATTR, ParamKind::Choice.as_str())
        .attr("name", def.name.as_str())
        .attr("numeric", if numeric { "1" } else { "0" });

    let caption_of = |i: usize| captions.get(i).unwrap_or(&def.values[i]);
    // One option at most; a value match beats a caption match.
    let chosen = def
        .values
        .iter()
        .position(|v| value.loosely_equals(v))
        .or_else(|| (0..def.values.len()).find(|i| value.loosely_equals(caption_of(*i))));

    for (i, option_value) in def.values.iter().enumerate() {
        let caption = caption_of(i);
        let selected = chosen == Some(i);
        select = select.child(
            Markup::element("option")
                .attr("value", option_value.to_attr())
                .flag("selected", selected)
                .text(&caption.to_attr()),
        );
    }
    select
}

fn checkbox(def: &ParameterDefinition, value: &ParamValue) -> MarkupElement {
    let checked = matches!(value, ParamValue::Bool(true)) || value.as_text() == Some("checked");
    Markup::element("input")
        .attr("type", "checkbox")
        .attr(KIND_ATTR, ParamKind::Checkbox.as_str())
        .attr("name", def.name.as_str())
        .flag("checked", checked)
}

fn input(def: &ParameterDefinition, kind: ParamKind, value: &ParamValue) -> MarkupElement {
    let mut el = Markup::element("input")
        .attr(KIND_ATTR, kind.as_str())
        .attr("type", kind.input_type())
        .attr("name", def.name.as_str());

    if let Some(step) = &def.step {
        el = el.attr("step", step.to_attr());
    }
    if let Some(min) = &def.min {
        el = el.attr("min", min.to_attr());
    }
    if let Some(max) = &def.max {
        el = el.attr("max", max.to_attr());
    }
    el = el.attr("value", value.to_attr());
    if let Some(live) = def.live {
        el = el.attr("live", if live { "1" } else { "0" });
    }
    if let Some(placeholder) = &def.placeholder {
        el = el.attr("placeholder", placeholder.as_str());
    }
    el
}

fn build_buttons(buttons: &[ButtonSpec]) -> MarkupElement {
    let inner = buttons.iter().fold(Markup::element("div"), |row, button| {
        row.child(
            Markup::element("button")
                .attr("action", button.id.as_str())
                .child(Markup::element("b").text(&button.name)),
        )
    });
    Markup::element("div").attr("class", BUTTON_ROW_CLASS).child(inner)
}

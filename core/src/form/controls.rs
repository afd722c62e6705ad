//! Reading and writing rendered controls.

use super::builder::{KIND_ATTR, ROW_CLASS};
use crate::params::{parse_number, ParamKind, ParamValue};
use crate::target::{NodeId, RenderTarget, Selector};

pub fn control_selector() -> Selector {
    Selector::tags(&["input", "select"])
}

pub fn group_label_selector() -> Selector {
    Selector::tag("label").within(Selector::tag("div").with_attr("type", ParamKind::Group.as_str()))
}

pub fn is_control<T: RenderTarget + ?Sized>(target: &T, node: NodeId) -> bool {
    matches!(target.tag(node), Some(tag) if tag.eq_ignore_ascii_case("input") || tag.eq_ignore_ascii_case("select"))
}

fn is_select<T: RenderTarget + ?Sized>(target: &T, node: NodeId) -> bool {
    matches!(target.tag(node), Some(tag) if tag.eq_ignore_ascii_case("select"))
}

fn input_type<'a, T: RenderTarget + ?Sized>(target: &'a T, node: NodeId) -> Option<&'a str> {
    if is_select(target, node) {
        None
    } else {
        target.get_attribute(node, "type")
    }
}

pub fn is_checkbox<T: RenderTarget + ?Sized>(target: &T, node: NodeId) -> bool {
    input_type(target, node) == Some("checkbox")
}

/// Range and slider inputs.
pub fn is_range<T: RenderTarget + ?Sized>(target: &T, node: NodeId) -> bool {
    input_type(target, node) == Some("range")
}

pub fn is_live<T: RenderTarget + ?Sized>(target: &T, node: NodeId) -> bool {
    target.get_attribute(node, "live") == Some("1")
}

/// Whether a control's value is read back as a number.
pub fn is_numeric<T: RenderTarget + ?Sized>(target: &T, node: NodeId) -> bool {
    let by_kind = target
        .get_attribute(node, KIND_ATTR)
        .and_then(|k| k.parse::<ParamKind>().ok())
        .map(|k| k.is_numeric())
        .unwrap_or(false);
    by_kind || target.get_attribute(node, "numeric") == Some("1")
}

/// Current raw text of an input, or the selected option's value of a select.
pub fn raw_value<T: RenderTarget + ?Sized>(target: &T, node: NodeId) -> String {
    if is_select(target, node) {
        let options = target.query_all_within(node, &Selector::tag("option"));
        let chosen = options
            .iter()
            .find(|o| target.has_attribute(**o, "selected"))
            .or(options.first());
        return match chosen {
            Some(option) => target
                .get_attribute(*option, "value")
                .map(str::to_string)
                .unwrap_or_else(|| target.text(*option)),
            None => String::new(),
        };
    }
    target.get_attribute(node, "value").unwrap_or_default().to_string()
}

/// Value of a control as the form reports it.
pub fn read_control<T: RenderTarget + ?Sized>(target: &T, node: NodeId) -> ParamValue {
    if is_checkbox(target, node) {
        return ParamValue::Bool(target.has_attribute(node, "checked"));
    }
    let raw = raw_value(target, node);
    if is_numeric(target, node) {
        ParamValue::Number(parse_number(&raw))
    } else {
        ParamValue::Text(raw)
    }
}

/// Applies a user edit to a control without firing any event.
///
/// Checkboxes take the truthiness of `value`; selects pick the option whose
/// value matches; every other control stores the printed value.
pub fn write_control<T: RenderTarget + ?Sized>(target: &mut T, node: NodeId, value: &ParamValue) {
    if is_checkbox(&*target, node) {
        let checked = match value {
            ParamValue::Bool(b) => *b,
            ParamValue::Number(n) => *n != 0.0,
            ParamValue::Text(s) => s == "checked" || s == "true",
        };
        if checked {
            target.set_attribute(node, "checked", "");
        } else {
            target.remove_attribute(node, "checked");
        }
        return;
    }
    if is_select(&*target, node) {
        for option in target.query_all_within(node, &Selector::tag("option")) {
            let matches = target
                .get_attribute(option, "value")
                .map(|v| ParamValue::Text(v.to_string()).loosely_equals(value))
                .unwrap_or(false);
            if matches {
                target.set_attribute(option, "selected", "");
            } else {
                target.remove_attribute(option, "selected");
            }
        }
        return;
    }
    target.set_attribute(node, "value", &value.to_attr());
}

/// Writes `(value)` into the info marker of the label preceding `input`.
pub fn apply_range<T: RenderTarget + ?Sized>(target: &mut T, input: NodeId) {
    let Some(label) = target.previous_sibling(input) else {
        return;
    };
    if !matches!(target.tag(label), Some(tag) if tag.eq_ignore_ascii_case("label")) {
        return;
    }
    if let Some(info) = target.query_first_within(label, &Selector::tag("i")) {
        let text = format!("({})", raw_value(&*target, input));
        target.set_text(info, &text);
    }
}

/// First control carrying `name`.
pub fn find_control<T: RenderTarget + ?Sized>(target: &T, name: &str) -> Option<NodeId> {
    target
        .query_all(&control_selector())
        .into_iter()
        .find(|node| target.get_attribute(*node, "name") == Some(name))
}

pub fn find_group_label<T: RenderTarget + ?Sized>(target: &T, name: &str) -> Option<NodeId> {
    target
        .query_all(&group_label_selector())
        .into_iter()
        .find(|node| target.get_attribute(*node, "name") == Some(name))
}

/// Whether the row holding a group label is collapsed.
pub fn group_closed<T: RenderTarget + ?Sized>(target: &T, label: NodeId) -> bool {
    target
        .parent(label)
        .and_then(|row| target.get_attribute(row, "closed"))
        == Some("1")
}

fn is_row<T: RenderTarget + ?Sized>(target: &T, node: NodeId) -> bool {
    target.get_attribute(node, "class") == Some(ROW_CLASS)
}

/// Flips the collapsed state of the group owning `label` and carries it
/// forward to every following row up to the next group. Returns the new state.
pub fn toggle_group<T: RenderTarget + ?Sized>(target: &mut T, label: NodeId) -> bool {
    let Some(group_row) = target.parent(label) else {
        return false;
    };
    let closed = target.get_attribute(group_row, "closed") != Some("1");
    let flag = if closed { "1" } else { "0" };

    let mut row = Some(group_row);
    while let Some(current) = row {
        target.set_attribute(current, "closed", flag);
        row = match target.next_sibling(current) {
            Some(next)
                if is_row(&*target, next)
                    && target.get_attribute(next, "type") != Some(ParamKind::Group.as_str()) =>
            {
                Some(next)
            }
            _ => None,
        };
    }
    closed
}

//! Reading a rendered form back into a flat value mapping.

use super::controls::{
    apply_range, control_selector, group_closed, group_label_selector, is_range, read_control,
};
use crate::params::{ParamValue, ValueMapping};
use crate::target::RenderTarget;

/// Re-derives the value mapping from a rendered container.
///
/// Groups report `"closed"` or `""` from their own row. Range and color
/// inputs refresh their info marker as a side effect.
pub fn extract_values<T: RenderTarget + ?Sized>(target: &mut T) -> ValueMapping {
    let mut params = ValueMapping::new();

    for label in target.query_all(&group_label_selector()) {
        let name = target.get_attribute(label, "name").unwrap_or_default().to_string();
        let state = if group_closed(&*target, label) { "closed" } else { "" };
        params.insert(name, ParamValue::Text(state.to_string()));
    }

    for control in target.query_all(&control_selector()) {
        let Some(name) = target.get_attribute(control, "name").map(str::to_string) else {
            continue;
        };
        let refresh = is_range(&*target, control) || target.get_attribute(control, "type") == Some("color");
        if refresh {
            apply_range(target, control);
        }
        params.insert(name, read_control(&*target, control));
    }

    params
}

/// Like [`extract_values`], but an absent container yields an empty mapping.
pub fn extract_values_from<T: RenderTarget + ?Sized>(target: Option<&mut T>) -> ValueMapping {
    match target {
        Some(target) => extract_values(target),
        None => ValueMapping::new(),
    }
}

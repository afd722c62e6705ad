//! Value resolution and group span propagation.

use super::types::{ParamKind, ParamValue, ParameterDefinition, StoredParams};

/// Resolves the initial value of one definition.
///
/// Stored values always win; then `initial`, `default` and `checked` in that
/// order; then the kind's own default (`0` for numeric kinds, `""` otherwise).
pub fn resolve_value(def: &ParameterDefinition, stored: &StoredParams) -> ParamValue {
    stored
        .get(&def.name)
        .or(def.initial.as_ref())
        .or(def.default_value.as_ref())
        .or(def.checked.as_ref())
        .cloned()
        .unwrap_or_else(|| match def.kind() {
            Some(kind) => kind.default_value(),
            None => ParamValue::Text(String::new()),
        })
}

/// Whether a group value means "collapsed".
pub fn is_closed_marker(value: &ParamValue) -> bool {
    value.as_text() == Some("closed")
}

/// Single left-to-right pass writing `value` and `closed` into each definition.
///
/// A group resets the running closed flag from its own value; every row,
/// the group row included, records the flag as it stands when visited.
pub fn resolve_definitions(defs: &mut [ParameterDefinition], stored: &StoredParams) {
    let mut closed = false;
    for def in defs.iter_mut() {
        let value = resolve_value(def, stored);
        if def.kind() == Some(ParamKind::Group) {
            closed = is_closed_marker(&value);
        }
        def.value = Some(value);
        def.closed = closed;
    }
}

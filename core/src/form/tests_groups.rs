//! Group span tests: collapse state, toggling and extraction.

use super::*;
use crate::params::{ParamKind, ParamValue, ParameterDefinition, StoredParams};
use crate::target::{EventKind, RenderTarget, Selector, VirtualTree};
use std::sync::{Arc, Mutex};
use std::time::Instant;

fn rows(tree: &VirtualTree) -> Vec<(String, String)> {
    tree.query_all(&Selector::tag("div").with_attr("class", "form-line"))
        .into_iter()
        .map(|row| {
            let text = tree.text(row);
            let closed = tree.get_attribute(row, "closed").unwrap_or_default().to_string();
            (text, closed)
        })
        .collect()
}

fn two_groups() -> Vec<ParameterDefinition> {
    vec![
        ParameterDefinition::new("g1", ParamKind::Group).with_caption("First").with_initial("closed"),
        ParameterDefinition::new("a", ParamKind::Float).with_caption("A"),
        ParameterDefinition::new("b", ParamKind::Text).with_caption("B"),
        ParameterDefinition::new("g2", ParamKind::Group).with_caption("Second").with_initial("open"),
        ParameterDefinition::new("c", ParamKind::Int).with_caption("C"),
    ]
}

#[test]
fn test_closed_group_span_renders_closed() {
    let mut defs = two_groups();
    let mut tree = VirtualTree::default();
    FormSynchronizer::default().render(&mut defs, &mut tree, &StoredParams::new(), None);

    let closed: Vec<_> = rows(&tree).into_iter().map(|(_, c)| c).collect();
    assert_eq!(closed, vec!["1", "1", "1", "0", "0"]);
    assert_eq!(
        defs.iter().map(|d| d.closed).collect::<Vec<_>>(),
        vec![true, true, true, false, false]
    );
}

#[test]
fn test_group_label_carries_name() {
    let mut defs = two_groups();
    let mut tree = VirtualTree::default();
    FormSynchronizer::default().render(&mut defs, &mut tree, &StoredParams::new(), None);

    let label = find_group_label(&tree, "g2").unwrap();
    assert_eq!(tree.text(label), "Second");
    assert!(find_group_label(&tree, "a").is_none());
}

#[test]
fn test_click_toggles_and_propagates_until_next_group() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let mut form = FormSynchronizer::default().with_on_change(move |values, kind| {
        sink.lock().unwrap().push((values.clone(), kind));
    });

    let mut defs = vec![
        ParameterDefinition::new("g", ParamKind::Group),
        ParameterDefinition::new("x", ParamKind::Float).with_initial(1.0),
        ParameterDefinition::new("h", ParamKind::Group),
        ParameterDefinition::new("y", ParamKind::Float),
    ];
    let stored: StoredParams = [("g".to_string(), ParamValue::from("closed"))].into_iter().collect();
    let mut tree = VirtualTree::default();
    form.render(&mut defs, &mut tree, &stored, None);
    assert!(defs[1].closed);

    let label = find_group_label(&tree, "g").unwrap();
    form.dispatch(&mut tree, label, EventKind::Click, Instant::now()).unwrap();

    let closed: Vec<_> = rows(&tree).into_iter().map(|(_, c)| c).collect();
    assert_eq!(closed, vec!["0", "0", "0", "0"]);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (values, kind) = &seen[0];
    assert_eq!(*kind, ChangeKind::Layout);
    assert!(kind.is_layout_only());
    assert_eq!(values["g"], ParamValue::from(""));
    assert_eq!(values["x"], ParamValue::Number(1.0));
}

#[test]
fn test_toggle_stops_at_next_group_and_button_row() {
    let mut defs = two_groups();
    let mut form = FormSynchronizer::default();
    let mut tree = VirtualTree::default();
    form.render(&mut defs, &mut tree, &StoredParams::new(), None);

    let label = find_group_label(&tree, "g2").unwrap();
    form.dispatch(&mut tree, label, EventKind::Click, Instant::now()).unwrap();

    let closed: Vec<_> = rows(&tree).into_iter().map(|(_, c)| c).collect();
    assert_eq!(closed, vec!["1", "1", "1", "1", "1"]);

    let buttons = tree.query_all(&Selector::tag("div").with_attr("class", "param-buttons"));
    assert!(!tree.has_attribute(buttons[0], "closed"));
}

#[test]
fn test_toggle_twice_restores() {
    let mut defs = two_groups();
    let mut form = FormSynchronizer::default();
    let mut tree = VirtualTree::default();
    form.render(&mut defs, &mut tree, &StoredParams::new(), None);
    let before = rows(&tree);

    let label = find_group_label(&tree, "g1").unwrap();
    form.dispatch(&mut tree, label, EventKind::Click, Instant::now()).unwrap();
    assert_ne!(rows(&tree), before);
    form.dispatch(&mut tree, label, EventKind::Click, Instant::now()).unwrap();
    assert_eq!(rows(&tree), before);
}

#[test]
fn test_extraction_reads_each_groups_own_state() {
    // Regression: every group must report the state of its own row, not the
    // state of whichever group row was looked at last.
    let mut defs = vec![
        ParameterDefinition::new("open_first", ParamKind::Group),
        ParameterDefinition::new("x", ParamKind::Int),
        ParameterDefinition::new("closed_last", ParamKind::Group).with_initial("closed"),
        ParameterDefinition::new("y", ParamKind::Int),
    ];
    let mut tree = VirtualTree::default();
    FormSynchronizer::default().render(&mut defs, &mut tree, &StoredParams::new(), None);

    let values = extract_values(&mut tree);
    assert_eq!(values["open_first"], ParamValue::from(""));
    assert_eq!(values["closed_last"], ParamValue::from("closed"));

    let mut reversed = vec![
        ParameterDefinition::new("closed_first", ParamKind::Group).with_initial("closed"),
        ParameterDefinition::new("open_last", ParamKind::Group),
    ];
    FormSynchronizer::default().render(&mut reversed, &mut tree, &StoredParams::new(), None);
    let values = extract_values(&mut tree);
    assert_eq!(values["closed_first"], ParamValue::from("closed"));
    assert_eq!(values["open_last"], ParamValue::from(""));
}

#[test]
fn test_group_state_survives_render_extract_cycle() {
    let mut defs = two_groups();
    let mut form = FormSynchronizer::default();
    let mut tree = VirtualTree::default();
    form.render(&mut defs, &mut tree, &StoredParams::new(), None);

    let label = find_group_label(&tree, "g2").unwrap();
    form.dispatch(&mut tree, label, EventKind::Click, Instant::now()).unwrap();
    let stored = extract_values(&mut tree);
    assert_eq!(stored["g2"], ParamValue::from("closed"));

    form.render(&mut defs, &mut tree, &stored, None);
    assert!(defs[4].closed);
}

//! Rendering and extraction tests.

use super::*;
use crate::params::{ParamKind, ParamValue, ParameterDefinition, StoredParams};
use crate::target::{RenderTarget, Selector, VirtualTree};

fn render(defs: &mut [ParameterDefinition], stored: &StoredParams) -> (FormSynchronizer, VirtualTree, RenderReport) {
    let mut form = FormSynchronizer::default();
    let mut tree = VirtualTree::default();
    let report = form.render(defs, &mut tree, stored, None);
    (form, tree, report)
}

#[test]
fn test_int_initial_value_extracts_as_number() {
    let mut defs = vec![ParameterDefinition::new("w", ParamKind::Int).with_initial(5.0)];
    let (_, mut tree, _) = render(&mut defs, &StoredParams::new());

    let input = find_control(&tree, "w").unwrap();
    assert_eq!(tree.get_attribute(input, "value"), Some("5"));
    assert_eq!(tree.get_attribute(input, "type"), Some("number"));

    let values = extract_values(&mut tree);
    assert_eq!(values.len(), 1);
    assert_eq!(values["w"], ParamValue::Number(5.0));
}

#[test]
fn test_definitions_record_resolved_value() {
    let mut defs = vec![
        ParameterDefinition::new("a", ParamKind::Float),
        ParameterDefinition::new("b", ParamKind::Text),
    ];
    let stored: StoredParams = [("b".to_string(), ParamValue::from("kept"))].into_iter().collect();
    render(&mut defs, &stored);

    assert_eq!(defs[0].value, Some(ParamValue::Number(0.0)));
    assert_eq!(defs[1].value, Some(ParamValue::from("kept")));
}

#[test]
fn test_checkbox_checked_only_for_true_or_checked() {
    let cases = [
        (ParamValue::Bool(true), true),
        (ParamValue::from("checked"), true),
        (ParamValue::Bool(false), false),
        (ParamValue::from("yes"), false),
        (ParamValue::Number(1.0), false),
    ];
    for (stored_value, expected) in cases {
        let mut defs = vec![ParameterDefinition::new("c", ParamKind::Checkbox)];
        let stored: StoredParams = [("c".to_string(), stored_value.clone())].into_iter().collect();
        let (_, mut tree, _) = render(&mut defs, &stored);

        let input = find_control(&tree, "c").unwrap();
        assert_eq!(tree.has_attribute(input, "checked"), expected, "stored {:?}", stored_value);
        assert_eq!(extract_values(&mut tree)["c"], ParamValue::Bool(expected));
    }
}

#[test]
fn test_checkbox_control_precedes_caption() {
    let mut defs = vec![
        ParameterDefinition::new("c", ParamKind::Checkbox).with_caption("Hollow"),
        ParameterDefinition::new("t", ParamKind::Text).with_caption("Label"),
    ];
    let (_, tree, _) = render(&mut defs, &StoredParams::new());
    let html = tree.to_html();

    assert!(html.contains(r#"<label><input type="checkbox" data-kind="checkbox" name="c"/>Hollow<i></i></label>"#));
    assert!(html.contains(r#"<label>Label<i></i></label><input data-kind="text" type="text" name="t" value=""/>"#));
}

#[test]
fn test_choice_selects_by_value_or_caption() {
    let mut by_value = vec![ParameterDefinition::new("m", ParamKind::Choice)
        .with_values(vec![1.0.into(), 2.0.into(), 3.0.into()])
        .with_initial(2.0)];
    by_value[0].captions = Some(vec!["one".into(), "two".into(), "three".into()]);
    let (_, mut tree, _) = render(&mut by_value, &StoredParams::new());

    let select = find_control(&tree, "m").unwrap();
    assert_eq!(tree.get_attribute(select, "numeric"), Some("1"));
    assert_eq!(extract_values(&mut tree)["m"], ParamValue::Number(2.0));

    let mut by_caption = by_value.clone();
    by_caption[0].initial = Some("three".into());
    let (_, mut tree, _) = render(&mut by_caption, &StoredParams::new());
    assert_eq!(extract_values(&mut tree)["m"], ParamValue::Number(3.0));
}

#[test]
fn test_choice_captions_default_to_values() {
    let mut defs = vec![ParameterDefinition::new("shape", ParamKind::Choice)
        .with_values(vec!["cube".into(), "sphere".into()])
        .with_initial("sphere")];
    let (_, mut tree, _) = render(&mut defs, &StoredParams::new());

    let select = find_control(&tree, "shape").unwrap();
    assert_eq!(tree.get_attribute(select, "numeric"), Some("0"));
    let options = tree.query_all_within(select, &Selector::tag("option"));
    assert_eq!(tree.text(options[0]), "cube");
    assert!(tree.has_attribute(options[1], "selected"));
    assert_eq!(extract_values(&mut tree)["shape"], ParamValue::from("sphere"));
}

#[test]
fn test_choice_without_match_reports_first_option() {
    let mut defs = vec![ParameterDefinition::new("m", ParamKind::Choice)
        .with_values(vec!["a".into(), "b".into()])];
    let (_, mut tree, _) = render(&mut defs, &StoredParams::new());
    assert_eq!(extract_values(&mut tree)["m"], ParamValue::from("a"));
}

#[test]
fn test_input_attributes_pass_through() {
    let mut def = ParameterDefinition::new("r", ParamKind::Slider).with_live(true);
    def.min = Some(0.0.into());
    def.max = Some(10.0.into());
    def.step = Some(0.5.into());
    def.placeholder = Some("radius".into());
    let mut defs = vec![def];
    let (_, tree, _) = render(&mut defs, &StoredParams::new());

    let input = find_control(&tree, "r").unwrap();
    assert_eq!(tree.get_attribute(input, "type"), Some("range"));
    assert_eq!(tree.get_attribute(input, "min"), Some("0"));
    assert_eq!(tree.get_attribute(input, "max"), Some("10"));
    assert_eq!(tree.get_attribute(input, "step"), Some("0.5"));
    assert_eq!(tree.get_attribute(input, "live"), Some("1"));
    assert_eq!(tree.get_attribute(input, "placeholder"), Some("radius"));
    assert_eq!(tree.get_attribute(input, "value"), Some("0"));
}

#[test]
fn test_optional_attributes_omitted_when_undefined() {
    let mut defs = vec![ParameterDefinition::new("n", ParamKind::Number)];
    let (_, tree, _) = render(&mut defs, &StoredParams::new());
    let input = find_control(&tree, "n").unwrap();
    for attr in ["min", "max", "step", "live", "placeholder"] {
        assert!(!tree.has_attribute(input, attr), "{} should be absent", attr);
    }
}

#[test]
fn test_unknown_kinds_are_aggregated() {
    let mut defs = vec![
        ParameterDefinition { name: "r1".into(), type_name: "radio".into(), ..Default::default() },
        ParameterDefinition { name: "r2".into(), type_name: "radio".into(), ..Default::default() },
        ParameterDefinition { name: "f".into(), type_name: "file".into(), caption: Some("Upload".into()), ..Default::default() },
        ParameterDefinition::new("ok", ParamKind::Int),
    ];
    let (_, mut tree, report) = render(&mut defs, &StoredParams::new());

    assert_eq!(report.rows, 4);
    assert_eq!(report.missing.iter().collect::<Vec<_>>(), vec!["file", "radio"]);

    // Label-only rows: still present, no control.
    let rows = tree.query_all(&Selector::tag("div").with_attr("class", "form-line"));
    assert_eq!(rows.len(), 4);
    assert!(tree.text(rows[2]).contains("Upload"));
    assert_eq!(extract_values(&mut tree).keys().collect::<Vec<_>>(), vec!["ok"]);
}

#[test]
fn test_button_row_trails_the_form() {
    let mut defs = vec![ParameterDefinition::new("w", ParamKind::Int)];
    let mut form = FormSynchronizer::default();
    let mut tree = VirtualTree::default();
    let buttons = vec![ButtonSpec::new("reset"), ButtonSpec { id: "save".into(), name: "Save".into() }];
    form.render(&mut defs, &mut tree, &StoredParams::new(), Some(buttons.as_slice()));

    let top = tree.children(tree.root());
    let last = *top.last().unwrap();
    assert_eq!(tree.get_attribute(last, "class"), Some("param-buttons"));
    let rendered = tree.query_all_within(last, &Selector::tag("button"));
    assert_eq!(rendered.len(), 2);
    assert_eq!(tree.get_attribute(rendered[1], "action"), Some("save"));
    assert_eq!(tree.text(rendered[1]), "Save");
    // Buttons carry no listeners of their own.
    assert!(tree.listeners(rendered[0], crate::target::EventKind::Click).is_empty());
}

#[test]
fn test_default_button_row() {
    let mut defs: Vec<ParameterDefinition> = Vec::new();
    let (_, tree, _) = render(&mut defs, &StoredParams::new());
    let actions: Vec<_> = tree
        .query_all(&Selector::tag("button"))
        .into_iter()
        .map(|b| tree.get_attribute(b, "action").unwrap().to_string())
        .collect();
    assert_eq!(actions, vec!["reset", "save", "load", "edit", "link"]);
}

#[test]
fn test_rerender_is_full_rebuild() {
    let mut defs = vec![ParameterDefinition::new("w", ParamKind::Int).with_initial(1.0)];
    let mut form = FormSynchronizer::default();
    let mut tree = VirtualTree::default();
    form.render(&mut defs, &mut tree, &StoredParams::new(), None);
    let old = find_control(&tree, "w").unwrap();

    let stored: StoredParams = [("w".to_string(), ParamValue::Number(2.0))].into_iter().collect();
    form.render(&mut defs, &mut tree, &stored, None);
    let new = find_control(&tree, "w").unwrap();

    assert_ne!(old, new);
    assert_eq!(tree.get_attribute(old, "value"), None);
    assert_eq!(tree.query_all(&Selector::tag("input")).len(), 1);
    assert_eq!(extract_values(&mut tree)["w"], ParamValue::Number(2.0));
}

#[test]
fn test_malformed_numeric_input_coerces_to_zero() {
    let mut defs = vec![ParameterDefinition::new("f", ParamKind::Float)];
    let stored: StoredParams = [("f".to_string(), ParamValue::from("not a number"))].into_iter().collect();
    let (_, mut tree, _) = render(&mut defs, &stored);
    assert_eq!(extract_values(&mut tree)["f"], ParamValue::Number(0.0));
}

#[test]
fn test_extract_from_absent_container() {
    assert!(extract_values_from::<VirtualTree>(None).is_empty());
}

#[test]
fn test_extract_refreshes_color_marker() {
    let mut defs = vec![ParameterDefinition::new("tint", ParamKind::Color).with_initial("#ff0000")];
    let (_, mut tree, _) = render(&mut defs, &StoredParams::new());
    let info = tree.query_all(&Selector::tag("i"))[0];
    assert_eq!(tree.text(info), "");

    let values = extract_values(&mut tree);
    assert_eq!(values["tint"], ParamValue::from("#ff0000"));
    assert_eq!(tree.text(info), "(#ff0000)");
}

#[test]
fn test_repeated_extracts_keep_tree_size() {
    let mut defs = vec![
        ParameterDefinition::new("r", ParamKind::Slider).with_initial(3.0),
        ParameterDefinition::new("tint", ParamKind::Color).with_initial("#00ff00"),
    ];
    let (_, mut tree, _) = render(&mut defs, &StoredParams::new());
    extract_values(&mut tree);
    let settled = tree.len();

    for _ in 0..1000 {
        extract_values(&mut tree);
    }
    assert_eq!(tree.len(), settled);
}

#[test]
fn test_choice_prefers_value_match_over_caption_match() {
    let mut defs = vec![ParameterDefinition::new("m", ParamKind::Choice)
        .with_values(vec![1.0.into(), 2.0.into()])];
    defs[0].captions = Some(vec!["2".into(), "1".into()]);
    let stored: StoredParams = [("m".to_string(), ParamValue::Number(2.0))].into_iter().collect();
    let (_, mut tree, _) = render(&mut defs, &stored);

    let select = find_control(&tree, "m").unwrap();
    let options = tree.query_all_within(select, &Selector::tag("option"));
    let selected: Vec<_> = options.iter().map(|o| tree.has_attribute(*o, "selected")).collect();
    assert_eq!(selected, vec![false, true]);
    assert_eq!(extract_values(&mut tree)["m"], ParamValue::Number(2.0));
}

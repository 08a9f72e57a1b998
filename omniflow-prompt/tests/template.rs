use std::collections::HashMap;

use omniflow_core::OmniflowError;
use omniflow_prompt::PromptTemplate;
use serde_json::{json, Value};

#[test]
fn renders_template_with_vars() {
    let tmpl = PromptTemplate::new("Trip to {{ destination }}");
    let mut vars = HashMap::new();
    vars.insert("destination".to_string(), Value::from("Boston"));
    let rendered = tmpl.render(&vars).expect("render");
    assert_eq!(rendered, "Trip to Boston");
}

#[test]
fn does_not_confuse_overlapping_keys() {
    let tmpl = PromptTemplate::new("{{name}} {{fullname}}");
    let mut vars = HashMap::new();
    vars.insert("name".to_string(), Value::from("X"));
    vars.insert("fullname".to_string(), Value::from("Y"));
    assert_eq!(tmpl.render(&vars).expect("render"), "X Y");
}

#[test]
fn non_string_values_render_as_json() {
    let tmpl = PromptTemplate::new("{{hours}} / {{count}}");
    let mut vars = HashMap::new();
    vars.insert("hours".to_string(), json!(["07:00", "08:00"]));
    vars.insert("count".to_string(), json!(5));
    assert_eq!(tmpl.render(&vars).expect("render"), r#"["07:00","08:00"] / 5"#);
}

#[test]
fn values_are_not_rescanned_for_placeholders() {
    let tmpl = PromptTemplate::new("From {{origin}}");
    let mut vars = HashMap::new();
    vars.insert("origin".to_string(), Value::from("{{destination}}"));
    assert_eq!(tmpl.render(&vars).expect("render"), "From {{destination}}");
}

#[test]
fn missing_variable_is_an_error() {
    let tmpl = PromptTemplate::new("{{a}} {{b}}");
    let mut vars = HashMap::new();
    vars.insert("a".to_string(), Value::from("1"));
    let err = tmpl.render(&vars).unwrap_err();
    assert!(matches!(err, OmniflowError::InvalidInput(ref msg) if msg.contains("'b'")));
}

#[test]
fn placeholders_are_listed_once() {
    let tmpl = PromptTemplate::new("{{a}} {{ b }} {{a}} {single}");
    let names: Vec<String> = tmpl.placeholders().into_iter().collect();
    assert_eq!(names, ["a", "b"]);
}

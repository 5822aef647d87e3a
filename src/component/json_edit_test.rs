use super::*;

use serde_json::json;
use uuid::Uuid;

fn schema() -> Value {
    json!({
        "type": "object",
        "properties": { "a": { "type": "integer" } }
    })
}

fn render_to_string(editor: &JsonEdit) -> String {
    let mut out = String::new();
    editor.render(&mut out, &RenderContext::new(Uuid::nil())).unwrap();
    out
}

/// Parse the config block that follows the container.
fn config_of(html: &str) -> Value {
    let marker = html.find("class=\"sui-config\"").unwrap();
    let start = marker + html[marker..].find('>').unwrap() + 1;
    let end = html.rfind("</script>").unwrap();
    serde_json::from_str(&html[start..end]).unwrap()
}

#[test]
fn change_stores_value_verbatim_and_keeps_schema() {
    let mut editor = JsonEdit::new(ComponentId::from_raw(5), schema());
    assert_eq!(editor.value(), "");

    editor.apply(Update::Text(r#"{"a":1}"#.into())).unwrap();
    assert_eq!(editor.value(), r#"{"a":1}"#);
    assert_eq!(editor.schema(), &schema());
}

#[test]
fn malformed_value_is_still_stored() {
    let mut editor = JsonEdit::new(ComponentId::from_raw(5), schema());
    editor.apply(Update::Text("{not json".into())).unwrap();
    assert_eq!(editor.text(), "{not json");
}

#[test]
fn always_synchronizes() {
    let editor = JsonEdit::new(ComponentId::from_raw(5), schema());
    assert_eq!(editor.sync_policy(), SyncPolicy::Always);
}

#[test]
fn renders_container_and_config() {
    let editor = JsonEdit::new(ComponentId::from_raw(5), schema()).with_value(r#"{"a":1}"#);
    let html = render_to_string(&editor);

    assert!(html.starts_with("<div id=\"5\" class=\"sui-JsonEdit\"></div>"));
    let config = config_of(&html);
    assert_eq!(config["widget"], "jsonEdit");
    assert_eq!(config["schema"], schema());
    assert_eq!(config["value"], r#"{"a":1}"#);
    assert_eq!(config["options"]["theme"], "bootstrap4");
    assert_eq!(config["options"]["iconlib"], "bootstrap3");
    assert_eq!(config["options"]["show_errors"], "change");
    assert_eq!(config["options"]["disable_edit_json"], true);
}

#[test]
fn empty_value_is_omitted() {
    let editor = JsonEdit::new(ComponentId::from_raw(5), schema());
    let config = config_of(&render_to_string(&editor));
    assert!(config.get("value").is_none());
}

#[test]
fn script_breaking_value_is_escaped() {
    let editor = JsonEdit::new(ComponentId::from_raw(5), schema()).with_value(r#"{"a":"</script><script>x()"}"#);
    let html = render_to_string(&editor);

    assert_eq!(html.matches("</script>").count(), 1);
    assert_eq!(config_of(&html)["value"], r#"{"a":"</script><script>x()"}"#);
}

#[test]
fn read_only_reaches_config() {
    let mut editor = JsonEdit::new(ComponentId::from_raw(5), schema());
    editor.set_read_only(true);
    let html = render_to_string(&editor);
    assert_eq!(config_of(&html)["readOnly"], true);
    assert!(html.contains("readonly=\"readonly\""));
}

#[test]
fn options_are_configurable() {
    let mut editor = JsonEdit::new(ComponentId::from_raw(5), schema());
    editor.options_mut().theme = "html".into();
    editor.options_mut().disable_collapse = false;
    let config = config_of(&render_to_string(&editor));
    assert_eq!(config["options"]["theme"], "html");
    assert_eq!(config["options"]["disable_collapse"], false);
}

#[test]
fn disabled_editor_is_flagged_in_config() {
    let mut editor = JsonEdit::new(ComponentId::from_raw(5), schema());
    assert!(config_of(&render_to_string(&editor)).get("disabled").is_none());

    HasEnabled::set_enabled(&mut editor, false);
    let config = config_of(&render_to_string(&editor));
    assert_eq!(config["disabled"], true);
    assert!(config.get("readOnly").is_none());
}

use super::*;

#[test]
fn number_coercion_follows_the_decimal_point() {
    assert_eq!(Number::from_text("3"), Number::Integer(3));
    assert_eq!(Number::from_text("3.5"), Number::Float(3.5));
    assert_eq!(Number::from_text("-12"), Number::Integer(-12));
    assert_eq!(Number::from_text("4.0"), Number::Float(4.0));
}

#[test]
fn number_coercion_reads_only_the_leading_prefix() {
    assert_eq!(Number::from_text("12abc"), Number::Integer(12));
    assert_eq!(Number::from_text("abc"), Number::Integer(0));
    assert_eq!(Number::from_text(""), Number::Integer(0));
    assert_eq!(Number::from_text("1.5kg"), Number::Float(1.5));
    assert_eq!(Number::from_text("x.y"), Number::Float(0.0));
}

#[test]
fn whole_floats_keep_their_decimal_point_as_text() {
    let value = WidgetValue::Float(3.0);
    assert_eq!(value.as_text(), "3.0");
    assert_eq!(Number::from_text(&value.as_text()), Number::Float(3.0));
}

#[test]
fn widget_values_decode_from_loose_json() {
    let decoded: Vec<WidgetValue> =
        serde_json::from_str(r#"[true, 3, 3.5, "text", ["a", "b"]]"#).expect("json");
    assert_eq!(
        decoded,
        vec![
            WidgetValue::Bool(true),
            WidgetValue::Integer(3),
            WidgetValue::Float(3.5),
            WidgetValue::Text("text".into()),
            WidgetValue::List(vec!["a".into(), "b".into()]),
        ]
    );
}

#[test]
fn list_view_splits_comma_joined_text() {
    assert_eq!(
        WidgetValue::from("Alice,Bob").as_list(),
        vec!["Alice".to_string(), "Bob".to_string()]
    );
    assert!(WidgetValue::from("").as_list().is_empty());
}

#[test]
fn bool_view_accepts_checkbox_shapes() {
    assert!(WidgetValue::Bool(true).as_bool());
    assert!(WidgetValue::from("true").as_bool());
    assert!(!WidgetValue::from("false").as_bool());
    assert!(!WidgetValue::Integer(0).as_bool());
}

#[test]
fn session_ids_render_as_simple_hex() {
    let id = SessionId::generate();
    let text = id.to_string();
    assert_eq!(text.len(), 32);
    assert!(text.chars().all(|c| c.is_ascii_hexdigit()));
}

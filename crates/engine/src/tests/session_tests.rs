use serde_json::json;
use shared::domain::WidgetValue;

use super::*;

#[test]
fn read_or_leaves_state_untouched() {
    let page = PageState::default();
    assert_eq!(page.read_or("name", WidgetValue::from("anon")), WidgetValue::from("anon"));
    assert!(!page.contains("name"));
    assert!(page.is_empty());
}

#[test]
fn writes_are_last_write_wins() {
    let mut page = PageState::default();
    page.write("name", WidgetValue::from("ada"));
    page.write("name", WidgetValue::from("grace"));
    assert_eq!(page.get("name"), Some(&WidgetValue::from("grace")));
    assert_eq!(page.len(), 1);
}

#[test]
fn memoize_stores_under_prefixed_key() {
    let mut page = PageState::default();
    let mut calls = 0;
    let first: Vec<i64> = page
        .memoize("series", || {
            calls += 1;
            vec![1, 2, 3]
        })
        .unwrap();
    let second: Vec<i64> = page
        .memoize("series", || {
            calls += 1;
            vec![9]
        })
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(calls, 1);
    assert_eq!(PageState::cache_key("series"), "cache_series");
    assert_eq!(page.cached("series"), Some(&json!([1, 2, 3])));
    assert!(!page.contains("series"));
}

#[test]
fn memoize_reports_shape_mismatch() {
    let mut page = PageState::default();
    let _: String = page.memoize("label", || "text".to_string()).unwrap();
    let err = page.memoize::<Vec<i64>, _>("label", Vec::new).unwrap_err();
    assert!(matches!(err, EngineError::Cache { ref key, .. } if key == "label"));
}

#[test]
fn pages_are_created_lazily_and_isolated() {
    let mut session = Session::default();
    assert!(session.existing_page("/").is_none());
    session.page("/").write("x", WidgetValue::Integer(1));
    session.page("/other").write("x", WidgetValue::Integer(2));

    assert_eq!(session.existing_page("/").unwrap().get("x"), Some(&WidgetValue::Integer(1)));
    assert_eq!(session.existing_page("/other").unwrap().get("x"), Some(&WidgetValue::Integer(2)));
}

#[test]
fn store_hands_out_shared_handles() {
    let mut store = SessionStore::default();
    let id = store.create();
    let handle = store.handle(id).unwrap();
    handle.lock().unwrap().page("/").write("k", WidgetValue::Bool(true));

    let again = store.handle(id).unwrap();
    assert!(again.lock().unwrap().page("/").contains("k"));
    assert!(store.remove(id));
    assert!(!store.contains(id));
    assert!(matches!(store.handle(id), Err(EngineError::UnknownSession(missing)) if missing == id));
}

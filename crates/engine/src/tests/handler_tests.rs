use std::sync::Mutex;

use serde_json::{json, Value};
use shared::domain::{Number, WidgetValue};

use super::*;
use crate::PageRegistry;

#[derive(Clone, Default)]
struct RecordingSink {
    frames: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
    fn frames(&self) -> Vec<Value> {
        self.frames
            .lock()
            .unwrap()
            .iter()
            .map(|text| serde_json::from_str(text).unwrap())
            .collect()
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn send_text(&mut self, text: String) -> anyhow::Result<()> {
        self.frames.lock().unwrap().push(text);
        Ok(())
    }
}

struct ClosedSink;

#[async_trait]
impl MessageSink for ClosedSink {
    async fn send_text(&mut self, _text: String) -> anyhow::Result<()> {
        anyhow::bail!("socket closed")
    }
}

fn engine() -> Arc<Engine> {
    let pages = PageRegistry::new()
        .interactive("/", |ui| {
            let name = ui.text_input("name", "Name", "anon");
            ui.paragraph(&format!("hi {name}"));
            if ui.button("boom", "Break") {
                anyhow::bail!("button broke the page");
            }
            Ok(())
        })
        .interactive("/other", |ui| {
            ui.paragraph("other");
            Ok(())
        })
        .interactive("/qty", |ui| {
            let described = match ui.number_input("qty", "Quantity", Number::Integer(1)) {
                Number::Integer(n) => format!("integer {n}"),
                Number::Float(f) => format!("float {f}"),
            };
            ui.paragraph(&described);
            Ok(())
        });
    Arc::new(Engine::new(pages))
}

#[tokio::test]
async fn client_ready_binds_and_renders() {
    let engine = engine();
    let sink = RecordingSink::default();
    let mut handler = ConnectionHandler::open(engine.clone(), sink.clone());
    assert_eq!(handler.state(), &ConnectionState::Opened);

    let outcome = handler
        .handle_text(r#"{"type":"client_ready","path":"/"}"#)
        .await;
    assert_eq!(outcome, Outcome::Rendered);
    assert_eq!(handler.state(), &ConnectionState::Bound("/".to_string()));

    let frames = sink.frames();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0]["type"], "render");
    assert_eq!(frames[0]["elements"][1]["text"], "hi anon");
    assert_eq!(frames[0]["sidebar_elements"], json!([]));
    assert_eq!(frames[0]["navbar"], Value::Null);
}

#[tokio::test]
async fn updates_apply_in_arrival_order() {
    let engine = engine();
    let sink = RecordingSink::default();
    let mut handler = ConnectionHandler::open(engine.clone(), sink.clone());

    for name in ["a", "ab", "abc"] {
        let message = json!({"type": "update", "path": "/", "widget_id": "name", "value": name});
        handler.handle_text(&message.to_string()).await;
    }

    let texts: Vec<Value> = sink
        .frames()
        .into_iter()
        .map(|frame| frame["elements"][1]["text"].clone())
        .collect();
    assert_eq!(texts, [json!("hi a"), json!("hi ab"), json!("hi abc")]);
    assert_eq!(
        engine.read_value(handler.session(), "/", "name").unwrap(),
        Some(WidgetValue::from("abc"))
    );
}

#[tokio::test]
async fn number_updates_switch_variant_by_content() {
    let engine = engine();
    let sink = RecordingSink::default();
    let mut handler = ConnectionHandler::open(engine.clone(), sink.clone());

    for value in ["3", "3.5"] {
        let message = json!({"type": "update", "path": "/qty", "widget_id": "qty", "value": value});
        assert_eq!(handler.handle_text(&message.to_string()).await, Outcome::Rendered);
    }

    let frames = sink.frames();
    assert_eq!(frames[0]["elements"][0]["value"], "3");
    assert_eq!(frames[0]["elements"][1]["text"], "integer 3");
    assert_eq!(frames[1]["elements"][0]["value"], "3.5");
    assert_eq!(frames[1]["elements"][1]["text"], "float 3.5");
}

#[tokio::test]
async fn later_paths_do_not_rebind() {
    let engine = engine();
    let sink = RecordingSink::default();
    let mut handler = ConnectionHandler::open(engine.clone(), sink.clone());
    handler
        .handle_text(r#"{"type":"client_ready","path":"/"}"#)
        .await;
    handler
        .handle_text(r#"{"type":"navigate","path":"/other"}"#)
        .await;

    assert_eq!(handler.state(), &ConnectionState::Bound("/".to_string()));
    assert_eq!(sink.frames()[1]["elements"][1]["text"], "hi anon");
}

#[tokio::test]
async fn malformed_messages_are_dropped() {
    let engine = engine();
    let sink = RecordingSink::default();
    let mut handler = ConnectionHandler::open(engine.clone(), sink.clone());

    assert_eq!(handler.handle_text("not json").await, Outcome::Dropped);
    assert_eq!(
        handler.handle_text(r#"{"type":"update","path":"/"}"#).await,
        Outcome::Dropped
    );
    assert_eq!(
        handler.handle_text(r#"{"type":"teleport","path":"/"}"#).await,
        Outcome::Dropped
    );
    assert!(sink.frames().is_empty());
    assert_eq!(handler.state(), &ConnectionState::Opened);

    assert_eq!(
        handler
            .handle_text(r#"{"type":"client_ready","path":"/"}"#)
            .await,
        Outcome::Rendered
    );
}

#[tokio::test]
async fn unknown_page_gets_no_reply() {
    let engine = engine();
    let sink = RecordingSink::default();
    let mut handler = ConnectionHandler::open(engine.clone(), sink.clone());
    let outcome = handler
        .handle_text(r#"{"type":"client_ready","path":"/missing"}"#)
        .await;
    assert_eq!(outcome, Outcome::NoPage);
    assert!(sink.frames().is_empty());
}

#[tokio::test]
async fn build_failure_is_sent_as_error_frame() {
    let engine = engine();
    let sink = RecordingSink::default();
    let mut handler = ConnectionHandler::open(engine.clone(), sink.clone());
    handler
        .handle_text(r#"{"type":"button_press","path":"/","widget_id":"boom"}"#)
        .await;
    handler
        .handle_text(r#"{"type":"client_ready","path":"/"}"#)
        .await;

    let frames = sink.frames();
    assert_eq!(frames[0]["error"]["type"], "error_display");
    assert!(frames[0]["error"]["message"]
        .as_str()
        .unwrap()
        .contains("button broke the page"));
    assert!(frames[0].get("elements").is_none());
    assert_eq!(frames[1]["type"], "render");
}

#[tokio::test]
async fn closed_transport_is_a_quiet_no_op() {
    let engine = engine();
    let mut handler = ConnectionHandler::open(engine.clone(), ClosedSink);
    let outcome = handler
        .handle_text(r#"{"type":"client_ready","path":"/"}"#)
        .await;
    assert_eq!(outcome, Outcome::Rendered);

    handler.close();
    assert_eq!(handler.state(), &ConnectionState::Closed);
    assert_eq!(
        handler
            .handle_text(r#"{"type":"client_ready","path":"/"}"#)
            .await,
        Outcome::Closed
    );
    assert_eq!(engine.session_count(), 0);
}

#[tokio::test]
async fn dropping_handler_releases_session() {
    let engine = engine();
    {
        let _handler = ConnectionHandler::open(engine.clone(), RecordingSink::default());
        assert_eq!(engine.connection_count(), 1);
    }
    assert_eq!(engine.connection_count(), 0);
    assert_eq!(engine.session_count(), 0);
    assert_eq!(engine.pending_set_count(), 0);
}

use super::*;
use axum::{body, body::Body, http::Request};
use engine::PageRegistry;
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tower::ServiceExt;

fn test_engine() -> Arc<Engine> {
    let pages = PageRegistry::new()
        .interactive("/", |ui| {
            ui.navbar(|nav| {
                nav.brand("Test").link("Home", "/");
            });
            let name = ui.text_input("name", "Name", "world");
            ui.heading(1, &format!("Hello {name}"));
            if ui.button("go", "Go") {
                ui.paragraph("pressed");
            }
            Ok(())
        })
        .static_page("/about", |ui| {
            ui.paragraph("static");
            Ok(())
        });
    Arc::new(Engine::new(pages))
}

fn test_app() -> (Router, Arc<Engine>) {
    let engine = test_engine();
    let app = build_router(AppState::new(engine.clone(), Settings::default()));
    (app, engine)
}

async fn body_text(response: Response) -> String {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf8")
}

#[tokio::test]
async fn healthz_reports_ok() {
    let (app, _) = test_app();
    let request = Request::get("/healthz").body(Body::empty()).expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn registered_page_gets_first_paint() {
    let (app, engine) = test_app();
    let request = Request::get("/").body(Body::empty()).expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("<h1>Hello world</h1>"));
    assert!(html.contains("\"interactive\":true"));
    assert!(html.contains("<title>Trellis</title>"));
    assert!(html.contains("/assets/reconciler.js"));
    assert_eq!(engine.session_count(), 0);
}

#[tokio::test]
async fn static_page_is_not_interactive() {
    let (app, _) = test_app();
    let request = Request::get("/about").body(Body::empty()).expect("request");
    let html = body_text(app.oneshot(request).await.expect("response")).await;
    assert!(html.contains("<p>static</p>"));
    assert!(html.contains("\"interactive\":false"));
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let (app, _) = test_app();
    let request = Request::get("/nope").body(Body::empty()).expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reconciler_script_is_served() {
    let (app, _) = test_app();
    let request = Request::get("/assets/reconciler.js")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/javascript; charset=utf-8"
    );
    assert!(body_text(response).await.contains("client_ready"));
}

async fn next_json<S>(socket: &mut S) -> Value
where
    S: futures::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        match socket.next().await.expect("frame").expect("ws frame") {
            Message::Text(text) => return serde_json::from_str(&text).expect("json"),
            _ => continue,
        }
    }
}

#[tokio::test]
async fn websocket_round_trip_renders_after_each_message() {
    let (app, engine) = test_app();
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    let (mut socket, _) = connect_async(format!("ws://{addr}/websocket"))
        .await
        .expect("connect");

    socket
        .send(Message::Text(json!({"type": "client_ready", "path": "/"}).to_string()))
        .await
        .expect("send");
    let frame = next_json(&mut socket).await;
    assert_eq!(frame["type"], "render");
    assert_eq!(frame["elements"][1]["text"], "Hello world");
    assert_eq!(frame["navbar"]["title"], "Test");

    socket
        .send(Message::Text("{broken".to_string()))
        .await
        .expect("send");
    socket
        .send(Message::Text(
            json!({"type": "update", "path": "/", "widget_id": "name", "value": "ws"}).to_string(),
        ))
        .await
        .expect("send");
    let frame = next_json(&mut socket).await;
    assert_eq!(frame["elements"][1]["text"], "Hello ws");

    socket
        .send(Message::Text(
            json!({"type": "button_press", "path": "/", "widget_id": "go"}).to_string(),
        ))
        .await
        .expect("send");
    let frame = next_json(&mut socket).await;
    assert_eq!(frame["elements"][3]["text"], "pressed");

    socket
        .send(Message::Text(json!({"type": "navigate", "path": "/"}).to_string()))
        .await
        .expect("send");
    let frame = next_json(&mut socket).await;
    assert_eq!(frame["elements"].as_array().expect("elements").len(), 3);

    assert_eq!(engine.connection_count(), 1);
    socket.close(None).await.expect("close");
    for _ in 0..50 {
        if engine.connection_count() == 0 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    assert_eq!(engine.connection_count(), 0);
    assert_eq!(engine.session_count(), 0);
}

//! End-to-end flow between the editor-side dispatcher and a sandboxed
//! visualization widget: connect, forward content changes, receive render
//! notifications, round-trip a request, tear down.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use tokio::time::sleep;
use vizpad_bridge::{
    BridgeConfig, BridgeError, BridgeState, EmbedBridge, EmbedHandle, InboundEnvelope, WireMessage,
};
use vizpad_errors::ErrorReporter;
use vizpad_events::EventDispatcher;

const WIDGET_ORIGIN: &str = "https://widgets.example";

/// Simulates the third-party widget inside the sandboxed embed context:
/// renders on source updates and answers export requests.
fn spawn_widget(
    mut inbox: tokio::sync::mpsc::UnboundedReceiver<WireMessage>,
    inbound: tokio::sync::mpsc::UnboundedSender<InboundEnvelope>,
) {
    tokio::spawn(async move {
        let mut revision = 0u32;
        while let Some(message) = inbox.recv().await {
            let reply = match (message.message_type.as_str(), message.correlation_id) {
                ("source-update", _) => {
                    revision += 1;
                    Some(WireMessage::embed_event(
                        "rendered",
                        json!({"revision": revision}),
                    ))
                }
                ("export-png", Some(id)) => Some(WireMessage::embed_response(
                    json!({"png": "iVBORw0KGgo", "revision": revision}),
                    id,
                )),
                _ => None,
            };
            if let Some(reply) = reply {
                let _ = inbound.send(InboundEnvelope {
                    origin: WIDGET_ORIGIN.to_string(),
                    embed_id: "chart-1".to_string(),
                    message: reply,
                });
            }
        }
    });
}

#[tokio::test]
async fn editor_session_round_trip() {
    let dispatcher = Arc::new(EventDispatcher::new());
    let reporter = Arc::new(ErrorReporter::new().with_dispatcher(dispatcher.clone()));
    reporter.attach_to(&dispatcher);
    let bridge = Arc::new(EmbedBridge::new(
        dispatcher.clone(),
        reporter.clone(),
        BridgeConfig::default(),
    ));
    bridge.add_allowed_origin(WIDGET_ORIGIN);

    let (chart, inbox) = EmbedHandle::new("chart-1", WIDGET_ORIGIN);
    bridge.connect(&chart).await.unwrap();
    spawn_widget(inbox, bridge.inbound_sender());

    // Forward mapped editor events across the boundary.
    {
        let bridge = bridge.clone();
        let chart = chart.clone();
        dispatcher.subscribe("editor:content-changed", move |payload| {
            bridge.send_event(&chart, "editor:content-changed", payload.clone());
            Ok(())
        });
    }

    let rendered: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
    {
        let rendered = rendered.clone();
        dispatcher.subscribe("embed:rendered", move |payload| {
            rendered.lock().unwrap().push(payload.clone());
            Ok(())
        });
    }

    dispatcher.publish("editor:content-changed", json!({"text": "bar chart of temps"}));
    dispatcher.publish("editor:content-changed", json!({"text": "line chart of temps"}));
    sleep(Duration::from_millis(100)).await;

    {
        let rendered = rendered.lock().unwrap();
        assert_eq!(rendered.len(), 2);
        assert_eq!(rendered[0]["revision"], 1);
        assert_eq!(rendered[1]["revision"], 2);
    }

    let export = bridge
        .request(
            &chart,
            "export-png",
            json!({"scale": 2}),
            Some(Duration::from_millis(500)),
        )
        .await
        .unwrap();
    assert_eq!(export["png"], "iVBORw0KGgo");
    assert_eq!(export["revision"], 2);

    // No failures along the way.
    assert!(reporter.recent_records().is_empty());

    bridge.dispose().await;
    assert_eq!(bridge.state(), BridgeState::Disposed);
    assert!(matches!(
        bridge.connect(&chart).await,
        Err(BridgeError::Disposed)
    ));
}

//! Failure propagation across the core: listener containment, error events,
//! recovery announcements, and security silence, all through real wiring.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use tokio::time::sleep;
use vizpad_bridge::{BridgeConfig, EmbedBridge, EmbedHandle, InboundEnvelope, WireMessage};
use vizpad_errors::{topics, ErrorKind, ErrorReporter};
use vizpad_events::EventDispatcher;

const WIDGET_ORIGIN: &str = "https://widgets.example";

type CapturedEvents = Arc<Mutex<Vec<(String, Value)>>>;

fn wiring() -> (
    Arc<EventDispatcher>,
    Arc<ErrorReporter>,
    Arc<EmbedBridge>,
    CapturedEvents,
) {
    let dispatcher = Arc::new(EventDispatcher::new());
    let events: CapturedEvents = Arc::new(Mutex::new(Vec::new()));
    let captured = events.clone();
    dispatcher.subscribe_all(move |event, payload| {
        captured
            .lock()
            .unwrap()
            .push((event.to_string(), payload.clone()));
        Ok(())
    });
    let reporter = Arc::new(ErrorReporter::new().with_dispatcher(dispatcher.clone()));
    reporter.attach_to(&dispatcher);
    let bridge = Arc::new(EmbedBridge::new(
        dispatcher.clone(),
        reporter.clone(),
        BridgeConfig::default(),
    ));
    (dispatcher, reporter, bridge, events)
}

fn event_names(events: &CapturedEvents) -> Vec<String> {
    events
        .lock()
        .unwrap()
        .iter()
        .map(|(name, _)| name.clone())
        .collect()
}

#[tokio::test]
async fn failing_listener_becomes_a_runtime_error_event() {
    let (dispatcher, reporter, _bridge, events) = wiring();

    dispatcher.subscribe("preview:rendered", |_| Err("renderer choked".into()));
    dispatcher.publish("preview:rendered", json!({}));

    let names = event_names(&events);
    assert!(names.contains(&topics::ERROR_OCCURRED.to_string()));
    let records = reporter.recent_records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind, ErrorKind::Runtime);
    assert!(records[0].message.contains("preview:rendered"));
}

#[tokio::test]
async fn comm_failure_drives_a_recovery_announcement() {
    let (dispatcher, reporter, bridge, events) = wiring();

    // A recovery coordinator outside the core reacts to comm failures.
    {
        let reporter = reporter.clone();
        dispatcher.subscribe(topics::ERROR_COMM, move |_| {
            reporter.attempt_recovery(ErrorKind::Comm, "reconnect embed");
            Ok(())
        });
    }

    let (chart, inbox) = EmbedHandle::new("chart-1", WIDGET_ORIGIN);
    bridge.connect(&chart).await.unwrap();
    drop(inbox);
    bridge.send_event(&chart, "editor:content-changed", json!({}));

    // The coordinator runs as a named listener of `error:comm`, so its
    // re-entrant recovery publish reaches the wildcard collector before the
    // `error:comm` publish finishes.
    let names = event_names(&events);
    assert_eq!(
        names,
        vec![
            topics::ERROR_OCCURRED.to_string(),
            topics::RECOVERY_ATTEMPT.to_string(),
            topics::ERROR_COMM.to_string(),
        ]
    );
    let events = events.lock().unwrap();
    let (_, recovery) = &events[1];
    assert_eq!(recovery["kind"], "comm");
    assert_eq!(recovery["context"], "reconnect embed");
}

#[tokio::test]
async fn widget_crash_reports_surface_as_embed_errors() {
    let (_dispatcher, reporter, _bridge, events) = wiring();

    reporter.handle_embed_error(
        "chart-1",
        "widget script threw",
        Some(json!({"stack": "render@widget.js:10"})),
    );

    let names = event_names(&events);
    assert_eq!(
        names,
        vec![
            topics::ERROR_OCCURRED.to_string(),
            topics::ERROR_EMBED.to_string(),
        ]
    );
    let events = events.lock().unwrap();
    assert_eq!(events[1].1["details"]["embedId"], "chart-1");
}

#[tokio::test]
async fn rejected_origins_stay_invisible_to_listeners() {
    let (_dispatcher, reporter, bridge, events) = wiring();
    let (chart, _inbox) = EmbedHandle::new("chart-1", WIDGET_ORIGIN);
    bridge.connect(&chart).await.unwrap();

    bridge
        .inbound_sender()
        .send(InboundEnvelope {
            origin: "https://evil.example".to_string(),
            embed_id: "chart-1".to_string(),
            message: WireMessage::embed_event("rendered", json!({"probe": true})),
        })
        .unwrap();
    sleep(Duration::from_millis(50)).await;

    assert!(events.lock().unwrap().is_empty());
    let records = reporter.recent_records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind, ErrorKind::Security);
}

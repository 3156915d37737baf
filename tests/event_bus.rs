use std::time::Duration;

use mendrun::event_bus::{ChannelSink, EventBus, LogEvent, MemorySink};

#[tokio::test]
async fn stop_listener_flushes_pending_events() {
    let sink = MemorySink::new();
    let snapshot = sink.clone();
    let bus = EventBus::with_sink(sink);

    bus.listen_for_events();

    let emitter = bus.emitter();
    emitter.emit(LogEvent::step_output(1, "Sweep", "payload")).unwrap();

    tokio::time::sleep(Duration::from_millis(10)).await;
    bus.stop_listener().await;

    let entries = snapshot.snapshot();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].message(), "payload");
    assert_eq!(entries[0].to_string(), "[1 Sweep] payload");
}

#[tokio::test]
async fn stopping_without_events_is_noop() {
    let bus = EventBus::with_sink(MemorySink::new());
    bus.listen_for_events();
    bus.stop_listener().await;
}

#[tokio::test]
async fn listener_start_is_idempotent() {
    let sink = MemorySink::new();
    let snapshot = sink.clone();
    let bus = EventBus::with_sink(sink);

    bus.listen_for_events();
    bus.listen_for_events();

    bus.emitter().append("once");
    tokio::time::sleep(Duration::from_millis(10)).await;
    bus.stop_listener().await;

    assert_eq!(snapshot.messages(), vec!["once".to_string()]);
}

#[tokio::test]
async fn events_arrive_in_emission_order() {
    let sink = MemorySink::new();
    let snapshot = sink.clone();
    let bus = EventBus::with_sink(sink);
    bus.listen_for_events();

    let emitter = bus.emitter();
    for i in 0..100 {
        emitter.append(format!("line-{i}"));
    }

    tokio::time::sleep(Duration::from_millis(20)).await;
    bus.stop_listener().await;

    let messages = snapshot.messages();
    assert_eq!(messages.len(), 100);
    for (i, message) in messages.iter().enumerate() {
        assert_eq!(message, &format!("line-{i}"));
    }
}

#[tokio::test]
async fn every_attached_sink_receives_each_event() {
    let first = MemorySink::new();
    let second = MemorySink::new();
    let bus = EventBus::with_sinks(vec![Box::new(first.clone())]);
    bus.add_sink(second.clone());
    bus.listen_for_events();

    bus.emitter().append("broadcast");
    tokio::time::sleep(Duration::from_millis(10)).await;
    bus.stop_listener().await;

    assert_eq!(first.messages(), vec!["broadcast".to_string()]);
    assert_eq!(second.messages(), vec!["broadcast".to_string()]);
}

#[tokio::test]
async fn channel_sink_bridges_to_async_consumers() {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let bus = EventBus::with_sink(ChannelSink::new(tx));
    bus.listen_for_events();

    bus.emitter().diagnostic("orchestrator", "starting run");

    let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("event within deadline")
        .expect("channel open");
    assert_eq!(event.message(), "starting run");
    assert_eq!(event.scope_label(), Some("orchestrator"));
}

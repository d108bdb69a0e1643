mod support;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use dashboard_engine::{EngineEvent, EngineHandle, ItemQueryParams};
use support::FakeApi;

const WAIT: Duration = Duration::from_secs(5);

#[test]
fn one_shot_calls_report_back() {
    let (engine, events) = EngineHandle::spawn(Arc::new(FakeApi::default()));

    engine.load_sources();
    match events.recv_timeout(WAIT).expect("sources event") {
        EngineEvent::SourcesLoaded(Ok(sources)) => assert_eq!(sources[0].name, "Sernageomin"),
        other => panic!("unexpected {other:?}"),
    }

    engine.query_items(
        7,
        ItemQueryParams {
            skip: 30,
            limit: 10,
            ..ItemQueryParams::default()
        },
    );
    match events.recv_timeout(WAIT).expect("items event") {
        EngineEvent::ItemsLoaded { token, result } => {
            assert_eq!(token, 7);
            assert_eq!(result.unwrap().total, 30);
        }
        other => panic!("unexpected {other:?}"),
    }

    engine.create_keyword(1, "litio");
    match events.recv_timeout(WAIT).expect("keyword event") {
        EngineEvent::KeywordCreated { word, result } => {
            assert_eq!(word, "litio");
            assert_eq!(result.unwrap().id, 42);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn stop_polling_ignores_other_loops() {
    let api = FakeApi::running();
    let (engine, events) = EngineHandle::spawn(api.clone());

    engine.start_polling(2, Duration::from_millis(20));
    match events.recv_timeout(WAIT).expect("first status") {
        EngineEvent::StatusPolled { loop_id, .. } => assert_eq!(loop_id, 2),
        other => panic!("unexpected {other:?}"),
    }

    engine.stop_polling(1);
    assert!(matches!(
        events.recv_timeout(WAIT),
        Ok(EngineEvent::StatusPolled { loop_id: 2, .. })
    ));

    engine.stop_polling(2);
    thread::sleep(Duration::from_millis(200));
    while events.try_recv().is_ok() {}
    let calls = api.status_calls();
    thread::sleep(Duration::from_millis(200));
    assert_eq!(api.status_calls(), calls);
    assert!(events.try_recv().is_err());
}

#[test]
fn dropping_the_handle_stops_a_running_loop() {
    let api = FakeApi::running();
    let (engine, events) = EngineHandle::spawn(api.clone());

    engine.start_polling(4, Duration::from_millis(20));
    assert!(matches!(
        events.recv_timeout(WAIT),
        Ok(EngineEvent::StatusPolled { loop_id: 4, .. })
    ));

    drop(engine);
    thread::sleep(Duration::from_millis(200));
    let calls = api.status_calls();
    thread::sleep(Duration::from_millis(200));
    assert_eq!(api.status_calls(), calls);
}

#[test]
fn new_loop_replaces_the_previous_one() {
    let api = FakeApi::running();
    let (engine, events) = EngineHandle::spawn(api);

    engine.start_polling(1, Duration::from_secs(1));
    engine.start_polling(2, Duration::from_millis(20));
    thread::sleep(Duration::from_millis(200));

    let loops: Vec<_> = events
        .try_iter()
        .filter_map(|event| match event {
            EngineEvent::StatusPolled { loop_id, .. } => Some(loop_id),
            _ => None,
        })
        .collect();
    assert!(!loops.is_empty());
    assert!(loops.iter().all(|id| *id == 2));
}

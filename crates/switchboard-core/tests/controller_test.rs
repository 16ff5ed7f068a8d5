#![allow(clippy::unwrap_used)]
// Integration tests for `Controller` against a wiremock device.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use switchboard_core::{
    ActuatorId, ActuatorState, AutoConfirm, Command, CommandResult, ConfirmFn, ConnectionState,
    Controller, ControllerEvent, CoreError, Decline, DeviceConfig, DeviceEndpoint, ProbeStrategy,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn config_for(server: &MockServer) -> DeviceConfig {
    DeviceConfig {
        endpoint: DeviceEndpoint::new(server.uri()).unwrap(),
        timeout: Duration::from_secs(2),
        poll_interval: None,
        settle_delay: None,
        probe_chain: vec![ProbeStrategy::Direct, ProbeStrategy::CacheBusted],
    }
}

async fn mount_reachable(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(server)
        .await;
}

async fn mount_command(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Controller that has already probed the server as `Connected`.
async fn connected(server: &MockServer, config: DeviceConfig) -> Controller {
    mount_reachable(server).await;
    let controller = Controller::new(config).unwrap();
    assert_eq!(controller.probe().await, ConnectionState::Connected);
    controller
}

async fn wait_for_state(controller: &Controller, expected: ActuatorState) {
    tokio::time::timeout(Duration::from_secs(3), async {
        while controller.state() != expected {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("state never became {expected:?}, last {:?}", controller.state()));
}

fn closed_port_endpoint() -> DeviceEndpoint {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    DeviceEndpoint::with_port("127.0.0.1", port).unwrap()
}

// ── Probing ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_probe_connected_on_any_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let controller = Controller::new(config_for(&server)).unwrap();
    assert_eq!(controller.connection(), ConnectionState::Unknown);

    let report = controller.probe_report().await;
    assert_eq!(report.state, ConnectionState::Connected);
    assert_eq!(report.decided_by, Some(ProbeStrategy::Direct));
    assert_eq!(report.attempted, vec![ProbeStrategy::Direct]);
    assert_eq!(controller.connection(), ConnectionState::Connected);
}

#[tokio::test]
async fn test_probe_falls_back_to_cache_busted_after_timeout() {
    let server = MockServer::start().await;

    // Plain `GET /` hangs past the timeout.
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param_is_missing("t"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    // Only the nonce-carrying request reaches this one.
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.timeout = Duration::from_millis(200);
    let controller = Controller::new(config).unwrap();

    let report = controller.probe_report().await;
    assert_eq!(report.state, ConnectionState::Connected);
    assert_eq!(report.decided_by, Some(ProbeStrategy::CacheBusted));
    assert_eq!(
        report.attempted,
        vec![ProbeStrategy::Direct, ProbeStrategy::CacheBusted]
    );
}

#[tokio::test]
async fn test_probe_unreachable_device_is_disconnected() {
    let mut config = DeviceConfig::for_endpoint(closed_port_endpoint());
    config.poll_interval = None;
    config.settle_delay = None;
    config.timeout = Duration::from_millis(500);

    let controller = Controller::new(config).unwrap();
    let report = controller.probe_report().await;

    assert_eq!(report.state, ConnectionState::Disconnected);
    assert_eq!(report.attempted.len(), 2);
    assert!(report.error.is_some());
    assert_eq!(controller.connection(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_newer_probe_supersedes_pending_one() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
        .mount(&server)
        .await;

    let controller = Controller::new(config_for(&server)).unwrap();
    let first = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.probe_report().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let second = controller.probe_report().await;
    let first = first.await.unwrap();

    assert_eq!(first.state, ConnectionState::Unknown);
    assert!(first.attempted.is_empty());
    assert_eq!(first.error.as_deref(), Some("superseded by a newer probe"));
    assert_eq!(second.state, ConnectionState::Connected);
}

#[tokio::test]
async fn test_probe_after_shutdown_is_superseded() {
    let server = MockServer::start().await;
    mount_reachable(&server).await;

    let controller = Controller::new(config_for(&server)).unwrap();
    controller.shutdown().await;

    let report = controller.probe_report().await;
    assert!(report.error.is_some());
    assert_eq!(controller.connection(), ConnectionState::Unknown);
}

// ── Status sync ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_sync_applies_status_line() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("LightRoom1:1,LightRoom2:0,Pump:1"))
        .mount(&server)
        .await;

    let controller = connected(&server, config_for(&server)).await;
    let snapshot = controller.sync(&Decline).await.unwrap();

    assert!(snapshot.actuator(ActuatorId::Pump));
    let state = controller.state();
    assert!(state.get(ActuatorId::LightRoom1));
    assert!(!state.get(ActuatorId::LightRoom2));
    assert!(state.get(ActuatorId::Pump));
    assert!(!state.all());
    assert!(controller.store().last_sync().is_some());
}

#[tokio::test]
async fn test_state_stream_yields_synced_flags() {
    use futures_util::StreamExt;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("LightRoom2:1"))
        .mount(&server)
        .await;

    let controller = connected(&server, config_for(&server)).await;
    let stream = controller.subscribe_state();
    assert_eq!(stream.current(), ActuatorState::default());

    let mut stream = stream.into_stream();
    controller.sync(&Decline).await.unwrap();

    let expected = ActuatorState::default().with(ActuatorId::LightRoom2, true);
    let seen = tokio::time::timeout(Duration::from_secs(2), async {
        while let Some(state) = stream.next().await {
            if state == expected {
                return true;
            }
        }
        false
    })
    .await
    .unwrap();
    assert!(seen);
}

#[tokio::test]
async fn test_sync_absent_keys_turn_off() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("LightRoom1:1,LightRoom2:1,Pump:1"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Pump:1"))
        .mount(&server)
        .await;

    let controller = connected(&server, config_for(&server)).await;

    controller.sync(&Decline).await.unwrap();
    assert!(controller.state().all());

    controller.sync(&Decline).await.unwrap();
    let state = controller.state();
    assert!(!state.get(ActuatorId::LightRoom1));
    assert!(!state.get(ActuatorId::LightRoom2));
    assert!(state.get(ActuatorId::Pump));
    assert!(!state.all());
}

#[tokio::test]
async fn test_sync_unrelated_keys_leave_actuators_off() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Fan:1,Light:0,Pump:1"))
        .mount(&server)
        .await;

    let controller = connected(&server, config_for(&server)).await;
    let snapshot = controller.sync(&Decline).await.unwrap();

    assert!(snapshot.get("fan"));
    assert_eq!(
        controller.state(),
        ActuatorState::default().with(ActuatorId::Pump, true)
    );
}

#[tokio::test]
async fn test_sync_malformed_line_keeps_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Pump:yes"))
        .mount(&server)
        .await;
    mount_command(&server, "/pump/on", 200).await;

    let controller = connected(&server, config_for(&server)).await;
    controller.set(ActuatorId::Pump, true, &Decline).await.unwrap();

    let mut events = controller.events();
    let err = controller.sync(&Decline).await.unwrap_err();

    assert!(matches!(err, CoreError::Decode { .. }), "got: {err:?}");
    assert!(controller.state().get(ActuatorId::Pump));
    // A garbled body still proves the device answered.
    assert_eq!(controller.connection(), ConnectionState::Connected);

    let event = events.recv().await.unwrap();
    assert!(matches!(&*event, ControllerEvent::SyncFailed { .. }));
}

#[tokio::test]
async fn test_sync_while_unknown_declined_does_no_io() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Pump:1"))
        .expect(0)
        .mount(&server)
        .await;

    let controller = Controller::new(config_for(&server)).unwrap();
    let err = controller.sync(&Decline).await.unwrap_err();

    assert!(matches!(err, CoreError::UserDeclined { .. }), "got: {err:?}");
    assert_eq!(controller.state(), ActuatorState::default());
}

#[tokio::test]
async fn test_sync_while_disconnected_asks_once_and_proceeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("LightRoom2:1"))
        .expect(1)
        .mount(&server)
        .await;

    let asked = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&asked);
    let confirm = ConfirmFn(move |prompt: &str| {
        assert!(prompt.contains("status sync"));
        counter.fetch_add(1, Ordering::SeqCst);
        true
    });

    let controller = Controller::new(config_for(&server)).unwrap();
    controller.sync(&confirm).await.unwrap();

    assert_eq!(asked.load(Ordering::SeqCst), 1);
    assert!(controller.state().get(ActuatorId::LightRoom2));
}

#[tokio::test]
async fn test_sync_transport_failure_marks_disconnected() {
    let server = MockServer::start().await;
    let controller = connected(&server, config_for(&server)).await;

    controller.set_endpoint(closed_port_endpoint()).unwrap();
    let err = controller.sync(&AutoConfirm).await.unwrap_err();

    assert!(err.is_transport_level(), "got: {err:?}");
    assert_eq!(controller.connection(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_deferred_sync_after_connect() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("LightRoom1:1,LightRoom2:1,Pump:0"))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.settle_delay = Some(Duration::from_millis(50));
    let controller = connected(&server, config).await;

    let expected = ActuatorState::default()
        .with(ActuatorId::LightRoom1, true)
        .with(ActuatorId::LightRoom2, true);
    wait_for_state(&controller, expected).await;

    // Staying connected does not schedule another pull.
    assert_eq!(controller.probe().await, ConnectionState::Connected);
    tokio::time::sleep(Duration::from_millis(150)).await;
}

// ── Commands ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_toggle_failure_rolls_back() {
    let server = MockServer::start().await;
    mount_command(&server, "/pump/on", 500).await;

    let controller = connected(&server, config_for(&server)).await;
    let mut events = controller.events();

    let err = controller.toggle(ActuatorId::Pump, &Decline).await.unwrap_err();

    assert_eq!(err.actuator(), Some(ActuatorId::Pump));
    assert!(err.to_string().contains("pump"), "got: {err}");
    assert!(!controller.state().get(ActuatorId::Pump));
    assert!(!controller.store().is_in_flight(ActuatorId::Pump));
    // HTTP errors prove reachability.
    assert_eq!(controller.connection(), ConnectionState::Connected);

    let event = events.recv().await.unwrap();
    match &*event {
        ControllerEvent::CommandFailed {
            actuator, state, ..
        } => {
            assert_eq!(*actuator, ActuatorId::Pump);
            assert!(!state.get(ActuatorId::Pump));
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn test_double_toggle_restores_original() {
    let server = MockServer::start().await;
    mount_command(&server, "/lightroom1/on", 200).await;
    mount_command(&server, "/lightroom1/off", 200).await;
    mount_command(&server, "/lightroom2/on", 200).await;
    mount_command(&server, "/pump/on", 200).await;

    let controller = connected(&server, config_for(&server)).await;
    controller.set(ActuatorId::LightRoom2, true, &Decline).await.unwrap();
    controller.set(ActuatorId::Pump, true, &Decline).await.unwrap();
    let original = controller.state();
    assert!(!original.all());

    assert!(controller.toggle(ActuatorId::LightRoom1, &Decline).await.unwrap());
    assert!(controller.state().all());

    assert!(!controller.toggle(ActuatorId::LightRoom1, &Decline).await.unwrap());
    assert_eq!(controller.state(), original);
    assert!(!controller.state().all());
}

#[tokio::test]
async fn test_command_transport_failure_marks_disconnected() {
    let server = MockServer::start().await;
    let controller = connected(&server, config_for(&server)).await;
    controller.set_endpoint(closed_port_endpoint()).unwrap();

    let err = controller
        .toggle(ActuatorId::LightRoom2, &AutoConfirm)
        .await
        .unwrap_err();

    assert!(err.is_transport_level(), "got: {err:?}");
    assert!(!controller.state().get(ActuatorId::LightRoom2));
    assert_eq!(controller.connection(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_command_while_disconnected_declined_does_no_io() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pump/on"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let controller = Controller::new(config_for(&server)).unwrap();
    let err = controller.toggle(ActuatorId::Pump, &Decline).await.unwrap_err();

    assert!(matches!(err, CoreError::UserDeclined { .. }), "got: {err:?}");
    assert!(!controller.state().get(ActuatorId::Pump));
}

#[tokio::test]
async fn test_concurrent_toggles_are_serialized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pump/on"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(100)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pump/off"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(100)))
        .expect(1)
        .mount(&server)
        .await;

    let controller = connected(&server, config_for(&server)).await;

    let a = controller.clone();
    let b = controller.clone();
    let (first, second) = tokio::join!(
        async move { a.toggle(ActuatorId::Pump, &Decline).await },
        async move { b.toggle(ActuatorId::Pump, &Decline).await },
    );

    // Whichever ran second observed the first one's confirmed value.
    assert_ne!(first.unwrap(), second.unwrap());
    assert!(!controller.state().get(ActuatorId::Pump));
}

#[tokio::test]
async fn test_stale_sync_does_not_clobber_command() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("LightRoom1:0,LightRoom2:1,Pump:0")
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;
    mount_command(&server, "/lightroom1/on", 200).await;

    let controller = connected(&server, config_for(&server)).await;
    let mut events = controller.events();

    let syncing = controller.clone();
    let pull = tokio::spawn(async move { syncing.sync(&Decline).await });

    tokio::time::sleep(Duration::from_millis(100)).await;
    controller.toggle(ActuatorId::LightRoom1, &Decline).await.unwrap();

    pull.await.unwrap().unwrap();
    let state = controller.state();
    assert!(state.get(ActuatorId::LightRoom1));
    assert!(state.get(ActuatorId::LightRoom2));

    let mut skipped = None;
    while let Ok(event) = events.try_recv() {
        if let ControllerEvent::StateReconciled { skipped: s, .. } = &*event {
            skipped = Some(s.clone());
        }
    }
    assert_eq!(skipped, Some(vec![ActuatorId::LightRoom1]));
}

// ── Endpoint changes ────────────────────────────────────────────────

#[tokio::test]
async fn test_set_endpoint_resets_state() {
    let server = MockServer::start().await;
    mount_command(&server, "/pump/on", 200).await;
    let other = MockServer::start().await;

    let controller = connected(&server, config_for(&server)).await;
    controller.set(ActuatorId::Pump, true, &Decline).await.unwrap();

    let mut events = controller.events();
    let endpoint = DeviceEndpoint::new(other.uri()).unwrap();
    controller.set_endpoint(endpoint.clone()).unwrap();

    assert_eq!(controller.endpoint(), endpoint);
    assert_eq!(controller.state(), ActuatorState::default());
    assert_eq!(controller.connection(), ConnectionState::Unknown);

    let first = events.recv().await.unwrap();
    assert!(matches!(
        &*first,
        ControllerEvent::ConnectionChanged {
            state: ConnectionState::Unknown
        }
    ));
    let second = events.recv().await.unwrap();
    assert!(matches!(&*second, ControllerEvent::EndpointChanged { .. }));
}

#[tokio::test]
async fn test_set_same_endpoint_is_noop() {
    let server = MockServer::start().await;
    let controller = connected(&server, config_for(&server)).await;

    controller.set_endpoint(controller.endpoint()).unwrap();
    assert_eq!(controller.connection(), ConnectionState::Connected);
}

// ── Command routing / lifecycle ─────────────────────────────────────

#[tokio::test]
async fn test_execute_routes_commands() {
    let server = MockServer::start().await;
    mount_command(&server, "/lightroom2/on", 200).await;

    let controller = connected(&server, config_for(&server)).await;

    let result = controller.execute(Command::Probe, &Decline).await.unwrap();
    assert_eq!(result.connection(), Some(ConnectionState::Connected));

    let result = controller
        .execute(
            Command::Set {
                actuator: ActuatorId::LightRoom2,
                on: true,
            },
            &Decline,
        )
        .await
        .unwrap();
    assert!(matches!(
        result,
        CommandResult::Actuator {
            actuator: ActuatorId::LightRoom2,
            on: true
        }
    ));
}

#[tokio::test]
async fn test_oneshot_runs_closure() {
    let server = MockServer::start().await;
    mount_reachable(&server).await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Pump:1"))
        .mount(&server)
        .await;

    let state = Controller::oneshot(config_for(&server), |ctrl| async move {
        ctrl.probe().await;
        ctrl.sync(&Decline).await?;
        Ok(ctrl.state())
    })
    .await
    .unwrap();

    assert!(state.get(ActuatorId::Pump));
}

#[tokio::test]
async fn test_start_polls_while_connected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("LightRoom1:1"))
        .mount(&server)
        .await;
    mount_reachable(&server).await;

    let mut config = config_for(&server);
    config.poll_interval = Some(Duration::from_millis(100));
    let controller = Controller::new(config).unwrap();

    assert_eq!(controller.start().await, ConnectionState::Connected);
    wait_for_state(
        &controller,
        ActuatorState::default().with(ActuatorId::LightRoom1, true),
    )
    .await;

    controller.shutdown().await;
}

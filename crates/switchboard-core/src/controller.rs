// ── Controller abstraction ──
//
// Owns everything about one device: the HTTP client, the connection state,
// the actuator store, and the background poll. Probing, status sync and
// actuator commands all go through here so that the reconciliation rules
// live in a single place.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use switchboard_api::{DeviceClient, TransportConfig};

use crate::command::{Command, CommandResult};
use crate::config::DeviceConfig;
use crate::confirm::Confirm;
use crate::error::CoreError;
use crate::event::ControllerEvent;
use crate::model::{ActuatorId, ActuatorState, ConnectionState, DeviceEndpoint, StatusSnapshot};
use crate::probe::{ProbeReport, Prober};
use crate::store::{ActuatorStore, SyncTicket};
use crate::stream::StateStream;

const EVENT_CHANNEL_SIZE: usize = 256;

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Does no I/O until asked:
/// call [`start()`](Self::start) for the probe + poll lifecycle, or drive
/// [`probe()`](Self::probe), [`sync()`](Self::sync) and
/// [`toggle()`](Self::toggle) directly.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: DeviceConfig,
    device: RwLock<DeviceHandle>,
    store: Arc<ActuatorStore>,
    prober: Prober,
    connection_state: watch::Sender<ConnectionState>,
    event_tx: broadcast::Sender<Arc<ControllerEvent>>,
    cancel: CancellationToken,
    probe_slot: Mutex<Option<CancellationToken>>,
    sync_slot: Mutex<Option<CancellationToken>>,
    deferred_sync: Mutex<Option<JoinHandle<()>>>,
    task_handles: tokio::sync::Mutex<Vec<JoinHandle<()>>>,
}

struct DeviceHandle {
    endpoint: DeviceEndpoint,
    client: DeviceClient,
}

impl Controller {
    /// Create a new Controller from configuration. Does NOT probe.
    pub fn new(config: DeviceConfig) -> Result<Self, CoreError> {
        let client = build_client(&config.endpoint, config.timeout)?;
        let (connection_state, _) = watch::channel(ConnectionState::Unknown);
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        let prober = Prober::new(config.probe_chain.clone());

        Ok(Self {
            inner: Arc::new(ControllerInner {
                device: RwLock::new(DeviceHandle {
                    endpoint: config.endpoint.clone(),
                    client,
                }),
                config,
                store: Arc::new(ActuatorStore::new()),
                prober,
                connection_state,
                event_tx,
                cancel: CancellationToken::new(),
                probe_slot: Mutex::new(None),
                sync_slot: Mutex::new(None),
                deferred_sync: Mutex::new(None),
                task_handles: tokio::sync::Mutex::new(Vec::new()),
            }),
        })
    }

    /// Access the configuration the controller was built with.
    pub fn config(&self) -> &DeviceConfig {
        &self.inner.config
    }

    /// Access the underlying store.
    pub fn store(&self) -> &Arc<ActuatorStore> {
        &self.inner.store
    }

    /// Current device endpoint.
    pub fn endpoint(&self) -> DeviceEndpoint {
        read(&self.inner.device).endpoint.clone()
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Spawn the status poll task and run the initial probe.
    pub async fn start(&self) -> ConnectionState {
        let mut handles = self.inner.task_handles.lock().await;
        if handles.is_empty() {
            if let Some(period) = self.inner.config.poll_interval {
                let ctrl = self.clone();
                let cancel = self.inner.cancel.clone();
                handles.push(tokio::spawn(poll_task(ctrl, period, cancel)));
            }
        }
        drop(handles);

        self.probe().await
    }

    /// Stop background work and wait for it to finish.
    ///
    /// The controller is inert afterwards: later probes and pulls report
    /// themselves as superseded.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        if let Some(handle) = lock(&self.inner.deferred_sync).take() {
            handle.abort();
        }

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("controller stopped");
    }

    /// One-shot: build a controller without background work, run the
    /// closure, shut down. Suited to CLI request-response commands.
    pub async fn oneshot<F, Fut, T>(config: DeviceConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.poll_interval = None;
        cfg.settle_delay = None;

        let controller = Controller::new(cfg)?;
        let result = f(controller.clone()).await;
        controller.shutdown().await;
        result
    }

    /// Point the controller at another device.
    ///
    /// Pending probes and pulls are cancelled, actuator state is cleared,
    /// and the connection goes back to `Unknown` until the next probe.
    pub fn set_endpoint(&self, endpoint: DeviceEndpoint) -> Result<(), CoreError> {
        let client = build_client(&endpoint, self.inner.config.timeout)?;
        {
            let mut device = write(&self.inner.device);
            if device.endpoint == endpoint {
                return Ok(());
            }
            *device = DeviceHandle {
                endpoint: endpoint.clone(),
                client,
            };
        }

        cancel_slot(&self.inner.probe_slot);
        cancel_slot(&self.inner.sync_slot);
        if let Some(handle) = lock(&self.inner.deferred_sync).take() {
            handle.abort();
        }
        self.inner.store.reset();

        let previous = self
            .inner
            .connection_state
            .send_replace(ConnectionState::Unknown);
        if previous != ConnectionState::Unknown {
            self.emit(ControllerEvent::ConnectionChanged {
                state: ConnectionState::Unknown,
            });
        }

        info!(%endpoint, "device endpoint changed");
        self.emit(ControllerEvent::EndpointChanged { endpoint });
        Ok(())
    }

    // ── Connectivity ─────────────────────────────────────────────

    /// Probe the device and publish the resulting connection state.
    ///
    /// Never fails: unreachable devices resolve to `Disconnected`.
    pub async fn probe(&self) -> ConnectionState {
        self.probe_report().await.state
    }

    /// Like [`probe()`](Self::probe), with details on which strategies ran.
    pub async fn probe_report(&self) -> ProbeReport {
        let token = self.supersede(&self.inner.probe_slot);
        let client = self.client();

        let report = tokio::select! {
            biased;
            () = token.cancelled() => None,
            report = self.inner.prober.run(&client) => Some(report),
        };

        match report {
            Some(report) if !token.is_cancelled() => {
                self.publish_connection(report.state);
                report
            }
            _ => {
                debug!("probe superseded");
                ProbeReport {
                    state: self.connection(),
                    decided_by: None,
                    attempted: Vec::new(),
                    error: Some("superseded by a newer probe".into()),
                }
            }
        }
    }

    // ── Status sync ──────────────────────────────────────────────

    /// Pull the device status and reconcile actuator state.
    ///
    /// When the device is not known to be connected, `confirm` is asked
    /// first; declining returns [`CoreError::UserDeclined`] without I/O.
    pub async fn sync(&self, confirm: &dyn Confirm) -> Result<StatusSnapshot, CoreError> {
        self.ensure_connected_or_confirmed("status sync", confirm)?;
        self.pull().await
    }

    async fn pull(&self) -> Result<StatusSnapshot, CoreError> {
        let token = self.supersede(&self.inner.sync_slot);
        let ticket = self.inner.store.sync_ticket();
        let client = self.client();

        let line = tokio::select! {
            biased;
            () = token.cancelled() => {
                return Err(CoreError::Cancelled { operation: "status sync" });
            }
            line = client.get_status_line() => line,
        };

        self.finish_pull(&token, &ticket, line)
    }

    /// Apply the outcome of a status request unless a newer pull took over.
    fn finish_pull(
        &self,
        token: &CancellationToken,
        ticket: &SyncTicket,
        line: Result<String, switchboard_api::Error>,
    ) -> Result<StatusSnapshot, CoreError> {
        if token.is_cancelled() {
            debug!("status sync superseded");
            return Err(CoreError::Cancelled {
                operation: "status sync",
            });
        }

        let snapshot = match line
            .map_err(CoreError::from)
            .and_then(|raw| StatusSnapshot::parse(&raw))
        {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.sync_failed(&e);
                return Err(e);
            }
        };

        let report = self.inner.store.apply_snapshot(ticket, &snapshot);
        debug!(applied = ?report.applied, skipped = ?report.skipped, "status reconciled");
        self.emit(ControllerEvent::StateReconciled {
            state: self.inner.store.state(),
            skipped: report.skipped,
        });

        Ok(snapshot)
    }

    fn sync_failed(&self, err: &CoreError) {
        warn!(error = %err, "status sync failed");
        if err.is_transport_level() {
            self.publish_connection(ConnectionState::Disconnected);
        }
        self.emit(ControllerEvent::SyncFailed {
            reason: err.to_string(),
        });
    }

    // ── Actuator commands ────────────────────────────────────────

    /// Flip an actuator. Returns the new, device-confirmed value.
    ///
    /// The flag flips immediately and is restored exactly if the device
    /// does not confirm.
    pub async fn toggle(&self, actuator: ActuatorId, confirm: &dyn Confirm) -> Result<bool, CoreError> {
        self.command(actuator, None, confirm).await
    }

    /// Drive an actuator to `on`, with the same rollback rules as
    /// [`toggle()`](Self::toggle).
    pub async fn set(
        &self,
        actuator: ActuatorId,
        on: bool,
        confirm: &dyn Confirm,
    ) -> Result<bool, CoreError> {
        self.command(actuator, Some(on), confirm).await
    }

    async fn command(
        &self,
        actuator: ActuatorId,
        target: Option<bool>,
        confirm: &dyn Confirm,
    ) -> Result<bool, CoreError> {
        self.ensure_connected_or_confirmed(&format!("{actuator} command"), confirm)?;

        let store = &self.inner.store;
        let _lease = store.command_lock(actuator).await;

        let target = target.unwrap_or_else(|| !store.get(actuator));
        let ticket = store.begin_command(actuator, target);
        let client = self.client();

        match client.set_actuator(actuator.as_str(), target).await {
            Ok(()) => {
                store.confirm_command(ticket);
                info!(%actuator, on = target, "actuator switched");
                self.emit(ControllerEvent::CommandSucceeded {
                    actuator,
                    on: target,
                    state: store.state(),
                });
                Ok(target)
            }
            Err(e) => {
                store.rollback_command(ticket);
                let err = CoreError::CommandFailed {
                    actuator,
                    source: Box::new(e.into()),
                };
                warn!(error = %err, "actuator command rolled back");
                if err.is_transport_level() {
                    self.publish_connection(ConnectionState::Disconnected);
                }
                self.emit(ControllerEvent::CommandFailed {
                    actuator,
                    reason: err.to_string(),
                    state: store.state(),
                });
                Err(err)
            }
        }
    }

    /// Execute a [`Command`], routing it to the matching operation.
    pub async fn execute(
        &self,
        cmd: Command,
        confirm: &dyn Confirm,
    ) -> Result<CommandResult, CoreError> {
        match cmd {
            Command::Probe => Ok(CommandResult::Probe(self.probe_report().await)),
            Command::Sync => self.sync(confirm).await.map(CommandResult::Snapshot),
            Command::Toggle { actuator } => {
                let on = self.toggle(actuator, confirm).await?;
                Ok(CommandResult::Actuator { actuator, on })
            }
            Command::Set { actuator, on } => {
                let on = self.set(actuator, on, confirm).await?;
                Ok(CommandResult::Actuator { actuator, on })
            }
        }
    }

    // ── State observation ────────────────────────────────────────

    /// Current connection state.
    pub fn connection(&self) -> ConnectionState {
        *self.inner.connection_state.borrow()
    }

    /// Subscribe to connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    /// Subscribe to the event broadcast stream.
    pub fn events(&self) -> broadcast::Receiver<Arc<ControllerEvent>> {
        self.inner.event_tx.subscribe()
    }

    /// Current actuator flags.
    pub fn state(&self) -> ActuatorState {
        self.inner.store.state()
    }

    /// Subscribe to actuator flag changes.
    pub fn subscribe_state(&self) -> StateStream {
        self.inner.store.subscribe()
    }

    // ── Internals ────────────────────────────────────────────────

    fn client(&self) -> DeviceClient {
        read(&self.inner.device).client.clone()
    }

    fn emit(&self, event: ControllerEvent) {
        let _ = self.inner.event_tx.send(Arc::new(event));
    }

    /// Single writer for the connection state. Schedules the post-connect
    /// pull on every transition into `Connected`.
    fn publish_connection(&self, state: ConnectionState) {
        let previous = self.inner.connection_state.send_replace(state);
        if previous == state {
            return;
        }

        info!(from = %previous, to = %state, "connection state changed");
        self.emit(ControllerEvent::ConnectionChanged { state });

        if state == ConnectionState::Connected {
            self.schedule_deferred_sync();
        }
    }

    fn schedule_deferred_sync(&self) {
        let Some(delay) = self.inner.config.settle_delay else {
            return;
        };

        let ctrl = self.clone();
        let cancel = self.inner.cancel.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {}
                () = tokio::time::sleep(delay) => {
                    if !ctrl.connection().is_connected() {
                        debug!("skipping post-connect sync: no longer connected");
                        return;
                    }
                    if let Err(e) = ctrl.pull().await {
                        debug!(error = %e, "post-connect sync failed");
                    }
                }
            }
        });

        if let Some(previous) = lock(&self.inner.deferred_sync).replace(handle) {
            previous.abort();
        }
    }

    fn ensure_connected_or_confirmed(
        &self,
        operation: &str,
        confirm: &dyn Confirm,
    ) -> Result<(), CoreError> {
        if self.connection().is_connected() {
            return Ok(());
        }

        let prompt = format!(
            "Not connected to {}. Attempt {operation} anyway?",
            self.endpoint()
        );
        if confirm.confirm(&prompt) {
            debug!(operation, "proceeding while not connected");
            Ok(())
        } else {
            Err(CoreError::UserDeclined {
                operation: operation.to_owned(),
            })
        }
    }

    /// Cancel whatever occupies `slot` and install a fresh token.
    fn supersede(&self, slot: &Mutex<Option<CancellationToken>>) -> CancellationToken {
        let token = self.inner.cancel.child_token();
        if let Some(previous) = lock(slot).replace(token.clone()) {
            previous.cancel();
        }
        token
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Periodically pull status while the device is connected.
async fn poll_task(controller: Controller, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick
    let mut paused = false;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if !controller.connection().is_connected() {
                    if !paused {
                        info!("status polling paused until the device is reachable again");
                        paused = true;
                    }
                    continue;
                }
                if paused {
                    info!("status polling resumed");
                    paused = false;
                }
                if let Err(e) = controller.pull().await {
                    debug!(error = %e, "periodic status poll failed");
                }
            }
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────

fn build_client(endpoint: &DeviceEndpoint, timeout: Duration) -> Result<DeviceClient, CoreError> {
    let base_url = endpoint.base_url()?;
    Ok(DeviceClient::new(
        base_url,
        &TransportConfig::with_timeout(timeout),
    )?)
}

fn cancel_slot(slot: &Mutex<Option<CancellationToken>>) {
    if let Some(token) = lock(slot).take() {
        token.cancel();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read(device: &RwLock<DeviceHandle>) -> std::sync::RwLockReadGuard<'_, DeviceHandle> {
    device.read().unwrap_or_else(PoisonError::into_inner)
}

fn write(device: &RwLock<DeviceHandle>) -> std::sync::RwLockWriteGuard<'_, DeviceHandle> {
    device.write().unwrap_or_else(PoisonError::into_inner)
}

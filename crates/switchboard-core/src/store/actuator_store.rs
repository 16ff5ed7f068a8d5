// ── Central actuator store ──
//
// Every mutation of `ActuatorState` happens inside one short critical
// section and is then broadcast to subscribers through a `watch` channel.
//
// Two writers compete for each flag: commands (optimistic flip, then
// confirm or roll back) and status pulls (wholesale replace). Commands on
// the same actuator are serialized by a per-actuator async lock. Pulls are
// guarded by a per-actuator generation counter: a pull records the
// generations before its request goes out and, when it lands, leaves alone
// any actuator whose generation moved or whose command is still in flight.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::model::{ActuatorId, ActuatorState, StatusSnapshot};
use crate::stream::StateStream;

const ACTUATOR_COUNT: usize = ActuatorId::ALL.len();

/// Proof that a command's optimistic flip was applied.
///
/// Hand it back to [`ActuatorStore::confirm_command`] or
/// [`ActuatorStore::rollback_command`] exactly once.
#[derive(Debug)]
#[must_use = "a command ticket must be confirmed or rolled back"]
pub struct CommandTicket {
    actuator: ActuatorId,
    previous: bool,
    target: bool,
    epoch: u64,
}

impl CommandTicket {
    pub fn actuator(&self) -> ActuatorId {
        self.actuator
    }

    /// Value before the optimistic flip.
    pub fn previous(&self) -> bool {
        self.previous
    }

    pub fn target(&self) -> bool {
        self.target
    }
}

/// Generations observed when a status pull was issued.
#[derive(Debug, Clone, Copy)]
pub struct SyncTicket {
    generations: [u64; ACTUATOR_COUNT],
    epoch: u64,
}

/// What a snapshot application actually changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Actuators overwritten from the snapshot.
    pub applied: Vec<ActuatorId>,
    /// Actuators left alone because a command raced the pull.
    pub skipped: Vec<ActuatorId>,
}

#[derive(Debug, Default)]
struct Ledger {
    generations: [u64; ACTUATOR_COUNT],
    in_flight: [bool; ACTUATOR_COUNT],
    /// Bumped by `reset`; tickets from an older epoch are stale.
    epoch: u64,
}

/// Reactive store for actuator flags.
pub struct ActuatorStore {
    ledger: Mutex<Ledger>,
    state: watch::Sender<ActuatorState>,
    command_locks: [tokio::sync::Mutex<()>; ACTUATOR_COUNT],
    last_sync: watch::Sender<Option<DateTime<Utc>>>,
}

impl ActuatorStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ActuatorState::default());
        let (last_sync, _) = watch::channel(None);

        Self {
            ledger: Mutex::new(Ledger::default()),
            state,
            command_locks: std::array::from_fn(|_| tokio::sync::Mutex::new(())),
            last_sync,
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn state(&self) -> ActuatorState {
        *self.state.borrow()
    }

    pub fn get(&self, id: ActuatorId) -> bool {
        self.state.borrow().get(id)
    }

    pub fn subscribe(&self) -> StateStream {
        StateStream::new(self.state.subscribe())
    }

    pub fn last_sync(&self) -> Option<DateTime<Utc>> {
        *self.last_sync.borrow()
    }

    /// Whether a command for `id` is between its flip and its resolution.
    pub fn is_in_flight(&self, id: ActuatorId) -> bool {
        self.ledger().in_flight[id.index()]
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Acquire the per-actuator command lock. Hold the guard across the
    /// whole flip / request / resolve sequence.
    pub async fn command_lock(&self, id: ActuatorId) -> tokio::sync::MutexGuard<'_, ()> {
        self.command_locks[id.index()].lock().await
    }

    /// Optimistically set `id` to `target`.
    pub fn begin_command(&self, id: ActuatorId, target: bool) -> CommandTicket {
        let mut ledger = self.ledger();
        let i = id.index();
        ledger.generations[i] += 1;
        ledger.in_flight[i] = true;

        let mut previous = false;
        self.state.send_modify(|state| {
            previous = state.get(id);
            state.set(id, target);
        });

        CommandTicket {
            actuator: id,
            previous,
            target,
            epoch: ledger.epoch,
        }
    }

    /// Keep the optimistic value: the device confirmed it.
    pub fn confirm_command(&self, ticket: CommandTicket) {
        self.resolve(&ticket, ticket.target);
    }

    /// Restore the pre-command value: the device did not confirm.
    pub fn rollback_command(&self, ticket: CommandTicket) {
        self.resolve(&ticket, ticket.previous);
    }

    fn resolve(&self, ticket: &CommandTicket, value: bool) {
        let mut ledger = self.ledger();
        let i = ticket.actuator.index();
        ledger.generations[i] += 1;
        ledger.in_flight[i] = false;

        // The endpoint changed under this command; its answer belongs to
        // another device.
        if ledger.epoch != ticket.epoch {
            return;
        }

        self.state.send_if_modified(|state| {
            if state.get(ticket.actuator) == value {
                false
            } else {
                state.set(ticket.actuator, value);
                true
            }
        });
    }

    // ── Status pulls ─────────────────────────────────────────────────

    /// Record generations before issuing a status request.
    pub fn sync_ticket(&self) -> SyncTicket {
        let ledger = self.ledger();
        SyncTicket {
            generations: ledger.generations,
            epoch: ledger.epoch,
        }
    }

    /// Replace actuator flags from a decoded snapshot, skipping any
    /// actuator a command touched since `ticket` was taken.
    pub fn apply_snapshot(&self, ticket: &SyncTicket, snapshot: &StatusSnapshot) -> ApplyReport {
        let ledger = self.ledger();
        let mut report = ApplyReport::default();

        if ledger.epoch != ticket.epoch {
            report.skipped.extend(ActuatorId::ALL);
            return report;
        }

        for id in ActuatorId::ALL {
            let i = id.index();
            if ledger.in_flight[i] || ledger.generations[i] != ticket.generations[i] {
                report.skipped.push(id);
            } else {
                report.applied.push(id);
            }
        }

        self.state.send_modify(|state| {
            for id in &report.applied {
                state.set(*id, snapshot.actuator(*id));
            }
        });
        self.last_sync.send_replace(Some(snapshot.received_at()));

        report
    }

    /// Forget everything: used when the controller is pointed at a
    /// different device. Outstanding tickets become stale.
    pub fn reset(&self) {
        let mut ledger = self.ledger();
        ledger.epoch += 1;
        for generation in &mut ledger.generations {
            *generation += 1;
        }
        self.state.send_replace(ActuatorState::default());
        self.last_sync.send_replace(None);
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ActuatorStore {
    fn default() -> Self {
        Self::new()
    }
}

// ── Connectivity probing ──
//
// A probe is an ordered chain of strategies. Each strategy is consulted only
// when the one before it failed at the transport level; the last strategy
// consulted decides the outcome. The default chain tries a plain `GET /`
// and falls back to a cache-busted request, which gets past intermediaries
// that answer (or fail) on the device's behalf.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::{debug, warn};

use switchboard_api::DeviceClient;

use crate::model::ConnectionState;

/// One way of asking "is the device there?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProbeStrategy {
    /// `GET /`; any HTTP response proves reachability.
    Direct,
    /// `GET /?t=<nonce>`; requires a 2xx.
    CacheBusted,
}

/// Outcome of a probe run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    pub state: ConnectionState,
    /// Strategy whose result was reported, `None` for an empty chain.
    pub decided_by: Option<ProbeStrategy>,
    /// Strategies consulted, in order.
    pub attempted: Vec<ProbeStrategy>,
    /// Failure reason of the deciding strategy.
    pub error: Option<String>,
}

/// Runs a probe strategy chain against a device.
#[derive(Debug)]
pub struct Prober {
    chain: Vec<ProbeStrategy>,
    last_nonce: AtomicU64,
}

impl Prober {
    pub fn new(chain: Vec<ProbeStrategy>) -> Self {
        Self {
            chain,
            last_nonce: AtomicU64::new(0),
        }
    }

    pub fn chain(&self) -> &[ProbeStrategy] {
        &self.chain
    }

    /// Run the chain. Never fails: every error path ends in `Disconnected`.
    pub async fn run(&self, client: &DeviceClient) -> ProbeReport {
        let mut report = ProbeReport {
            state: ConnectionState::Disconnected,
            decided_by: None,
            attempted: Vec::with_capacity(self.chain.len()),
            error: None,
        };

        for (i, strategy) in self.chain.iter().copied().enumerate() {
            report.attempted.push(strategy);
            report.decided_by = Some(strategy);

            let result = match strategy {
                ProbeStrategy::Direct => client.ping().await,
                ProbeStrategy::CacheBusted => client.ping_cache_busted(self.next_nonce()).await,
            };

            match result {
                Ok(resp) => {
                    debug!(%strategy, status = resp.status, "device reachable");
                    report.state = ConnectionState::Connected;
                    report.error = None;
                    return report;
                }
                Err(e) => {
                    let has_fallback = i + 1 < self.chain.len();
                    report.error = Some(e.to_string());
                    if e.is_transport_level() && has_fallback {
                        warn!(%strategy, error = %e, "probe failed, trying next strategy");
                        continue;
                    }
                    debug!(%strategy, error = %e, "device unreachable");
                    return report;
                }
            }
        }

        report
    }

    /// Unix millis, bumped past the previous nonce so two probes in the
    /// same millisecond still differ.
    fn next_nonce(&self) -> u64 {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
        let prev = self
            .last_nonce
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or(now);
        now.max(prev + 1)
    }
}

impl Default for Prober {
    fn default() -> Self {
        Self::new(vec![ProbeStrategy::Direct, ProbeStrategy::CacheBusted])
    }
}

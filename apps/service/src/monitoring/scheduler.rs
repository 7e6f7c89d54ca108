use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use futures::future::join_all;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info, warn};

use super::evaluator::{alert_message, evaluate};
use super::probe::ProbeExecutor;
use super::validation::validate_check;
use crate::notifier::Notifier;
use crate::store::{CHECKS, Store};

/// The check-scheduling engine.
///
/// Owns its configuration and handles to the store and notifier; built once
/// at process start and driven by its own clock. Every cycle lists all
/// registered checks, probes the valid ones concurrently, and persists each
/// outcome. No failure in here is fatal: a bad record, an unreachable
/// target or a store fault costs at most one check one cycle.
pub struct Engine {
    store: Arc<dyn Store>,
    notifier: Arc<dyn Notifier>,
    executor: ProbeExecutor,
    cycle_interval: Duration,
}

impl Engine {
    pub fn new(
        store: Arc<dyn Store>,
        notifier: Arc<dyn Notifier>,
        cycle_interval_seconds: u64,
        max_probe_timeout_seconds: u64,
    ) -> Result<Self> {
        Ok(Self {
            store,
            notifier,
            executor: ProbeExecutor::new(max_probe_timeout_seconds)?,
            // tokio intervals reject a zero period
            cycle_interval: Duration::from_secs(cycle_interval_seconds.max(1)),
        })
    }

    /// Run cycles forever. The first tick fires immediately, so checks are
    /// probed at startup rather than after a full interval. A cycle that
    /// overruns the interval delays the next one; cycles never overlap.
    pub async fn run(self) {
        info!(interval = ?self.cycle_interval, "monitoring engine started");

        let mut timer = interval(self.cycle_interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            timer.tick().await;
            self.run_cycle().await;
        }
    }

    /// One complete cycle: list, then probe every valid check concurrently
    /// and wait for all of them before returning.
    pub async fn run_cycle(&self) {
        let ids = match self.store.list(CHECKS).await {
            Ok(ids) => ids,
            Err(e) => {
                error!(error = %e, "could not list checks, skipping cycle");
                return;
            }
        };

        if ids.is_empty() {
            debug!("no checks registered this cycle");
            return;
        }

        debug!(count = ids.len(), "dispatching probes");
        join_all(ids.iter().map(|id| self.process_check(id))).await;
    }

    /// Read, validate, probe, persist and possibly alert for one check.
    /// Every failure path logs and returns; other checks are unaffected.
    async fn process_check(&self, id: &str) {
        let raw = match self.store.read(CHECKS, id).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(check = %id, error = %e, "could not read check, skipping this cycle");
                return;
            }
        };

        let check = match validate_check(&raw) {
            Ok(check) => check,
            Err(e) => {
                warn!(check = %id, error = %e, "invalid check record, not scheduling");
                return;
            }
        };

        let outcome = self.executor.probe(&check).await;
        let (updated, transitioned) = evaluate(&check, &outcome, Utc::now());

        match serde_json::to_value(&updated) {
            Ok(record) => {
                // A failed update loses this cycle's state; the next cycle
                // recomputes it.
                if let Err(e) = self.store.update(CHECKS, id, &record).await {
                    error!(check = %id, error = %e, "could not persist check state");
                }
            }
            Err(e) => error!(check = %id, error = %e, "could not serialize check state"),
        }

        if transitioned {
            let message = alert_message(&updated);
            info!(check = %id, state = %updated.state, "check state transition");
            if let Err(e) = self.notifier.notify(&updated.phone, &message).await {
                warn!(check = %id, error = %e, "alert delivery failed");
            }
        } else {
            debug!(check = %id, state = %updated.state, "no state change");
        }
    }
}

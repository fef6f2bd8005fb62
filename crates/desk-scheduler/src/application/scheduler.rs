//! Scheduler Controller
//!
//! Two entry points share one piece of state:
//!
//! - `request_agent`: the synchronous fast path. Rejected with `SchedulerBusy`
//!   while a drain cycle is active; on a failed match it starts a drain.
//! - the drain loop: fetches the whole `new` backlog, drains it, and repeats
//!   after `schedule_delay` until a cycle succeeds with no request having
//!   arrived in the meantime. Retries are unbounded.
//!
//! At most one drain loop exists at a time. `scheduling` is set before the
//! loop task is spawned and cleared only by that task.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;

use crate::application::drainer::QueueDrainer;
use crate::application::matcher::MatchEngine;
use crate::domain::{Assignment, SupportRequest};
use crate::error::SchedulerError;
use crate::ports::outbound::RequestStore;

#[derive(Debug, Default)]
struct SchedulerState {
    /// A drain loop is running or waiting out its backoff
    scheduling: bool,
    /// A request arrived while draining; the drain must run again
    pending_more: bool,
}

/// Point-in-time view of the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerSnapshot {
    pub scheduling: bool,
    pub pending_more: bool,
    pub cycles_run: u64,
}

pub struct SchedulerController {
    state: Mutex<SchedulerState>,
    engine: Arc<MatchEngine>,
    drainer: QueueDrainer,
    store: Arc<dyn RequestStore>,
    schedule_delay: Duration,
    cycles: AtomicU64,
}

impl SchedulerController {
    pub fn new(
        engine: Arc<MatchEngine>,
        store: Arc<dyn RequestStore>,
        schedule_delay: Duration,
        item_budget: Duration,
    ) -> Self {
        Self {
            state: Mutex::new(SchedulerState::default()),
            drainer: QueueDrainer::new(Arc::clone(&engine), item_budget),
            engine,
            store,
            schedule_delay,
            cycles: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> SchedulerSnapshot {
        let state = self.state.lock();
        SchedulerSnapshot {
            scheduling: state.scheduling,
            pending_more: state.pending_more,
            cycles_run: self.cycles.load(Ordering::SeqCst),
        }
    }

    pub fn is_scheduling(&self) -> bool {
        self.state.lock().scheduling
    }

    /// Bind an agent to `request` right now, or fail and leave it to the drain
    pub async fn request_agent(
        self: &Arc<Self>,
        request: &SupportRequest,
    ) -> Result<Assignment, SchedulerError> {
        {
            let mut state = self.state.lock();
            if state.scheduling {
                state.pending_more = true;
                tracing::debug!(req_id = %request.req_id, "drain in progress, rejecting");
                return Err(SchedulerError::SchedulerBusy);
            }
        }

        match self.engine.match_one(request).await {
            Ok(assignment) => Ok(assignment),
            Err(e) => {
                tracing::warn!(req_id = %request.req_id, error = %e, "immediate match failed");
                self.start_drain();
                Err(e)
            }
        }
    }

    /// Spawn the drain loop unless one is already running.
    ///
    /// Returns `true` when a new loop was started.
    pub fn start_drain(self: &Arc<Self>) -> bool {
        {
            let mut state = self.state.lock();
            if state.scheduling {
                state.pending_more = true;
                return false;
            }
            state.scheduling = true;
            state.pending_more = false;
        }

        let this = Arc::clone(self);
        tokio::spawn(async move { this.drain_loop().await });
        true
    }

    async fn drain_loop(self: Arc<Self>) {
        loop {
            self.state.lock().pending_more = false;
            let cycle = self.cycles.fetch_add(1, Ordering::SeqCst) + 1;

            let outcome = self.run_cycle().await;

            let quiescent = {
                let mut state = self.state.lock();
                let done = outcome.is_ok() && !state.pending_more;
                if done {
                    state.scheduling = false;
                }
                done
            };

            match outcome {
                Ok(matched) if quiescent => {
                    tracing::info!(cycle, matched, "backlog drained");
                    return;
                }
                Ok(matched) => {
                    tracing::info!(cycle, matched, "requests arrived during drain, rescheduling");
                }
                Err(e) => {
                    tracing::warn!(
                        cycle,
                        error = %e,
                        delay = ?self.schedule_delay,
                        "drain cycle failed, rescheduling"
                    );
                }
            }

            tokio::time::sleep(self.schedule_delay).await;
        }
    }

    async fn run_cycle(&self) -> Result<usize, SchedulerError> {
        let backlog = self.store.fetch_new().await.map_err(SchedulerError::BacklogUnavailable)?;
        if backlog.is_empty() {
            return Ok(0);
        }

        match self.drainer.drain(backlog).await {
            Ok(matched) => Ok(matched.len()),
            Err(e) => {
                tracing::info!(
                    matched = e.matched.len(),
                    failed_req_id = %e.failed_req_id,
                    "drain partially completed"
                );
                Err(e.source)
            }
        }
    }
}

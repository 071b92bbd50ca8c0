//! Async planner service: owns the state, drives the controller.
//!
//! One tokio task holds the authoritative [`EngineState`] and the only
//! [`PlannerEngine`]. Collaborators talk to it through a bounded mpsc
//! channel of [`MutationEvent`]s and read results from a watch channel
//! of [`PlanResult`] snapshots (single-writer, many readers).
//!
//! The select loop has three arms: receive a mutation, wake at the
//! debounce deadline, or reap the in-flight pass. Passes run on the
//! blocking pool with a cloned snapshot, so a long scoring pass never
//! stalls mutation intake — which is exactly what lets the controller
//! observe the Running→Stale transition.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::config::EngineConfig;
use crate::error::ServiceError;
use crate::events::MutationEvent;

use super::controller::RecomputeController;
use super::{EngineState, PlanResult, PlannerEngine};

/// Client side of the planner service.
#[derive(Debug, Clone)]
pub struct PlannerHandle {
    tx: mpsc::Sender<MutationEvent>,
    results: watch::Receiver<Option<Arc<PlanResult>>>,
}

impl PlannerHandle {
    /// Send one mutation.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::ChannelClosed`] when the service task has
    /// stopped.
    pub async fn send(&self, event: MutationEvent) -> Result<(), ServiceError> {
        self.tx
            .send(event)
            .await
            .map_err(|_| ServiceError::ChannelClosed)
    }

    /// Latest published plan, if any pass has completed yet.
    pub fn latest(&self) -> Option<Arc<PlanResult>> {
        self.results.borrow().clone()
    }

    /// Wait for the next published plan.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::ChannelClosed`] when the service task has
    /// stopped.
    pub async fn next_result(&mut self) -> Result<Arc<PlanResult>, ServiceError> {
        loop {
            self.results
                .changed()
                .await
                .map_err(|_| ServiceError::ChannelClosed)?;
            if let Some(result) = self.results.borrow().clone() {
                return Ok(result);
            }
        }
    }
}

/// Spawns and addresses the planner task.
pub struct PlannerService;

impl PlannerService {
    /// Start the service over `initial` state. The task runs until every
    /// handle is dropped; an in-flight pass is awaited and published
    /// before it exits.
    pub fn spawn(config: EngineConfig, initial: EngineState) -> PlannerHandle {
        let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
        let (result_tx, result_rx) = watch::channel(None);
        tokio::spawn(run(config, initial, rx, result_tx));
        PlannerHandle {
            tx,
            results: result_rx,
        }
    }
}

type PassHandle = JoinHandle<(PlannerEngine, PlanResult)>;

async fn run(
    config: EngineConfig,
    mut state: EngineState,
    mut rx: mpsc::Receiver<MutationEvent>,
    result_tx: watch::Sender<Option<Arc<PlanResult>>>,
) {
    let mut controller = RecomputeController::from_config(&config);
    // The engine travels into the blocking pass and back; `None` while a
    // pass is in flight.
    let mut engine_slot: Option<PlannerEngine> = Some(PlannerEngine::new(config.clone()));
    let mut inflight: Option<PassHandle> = None;

    loop {
        tokio::select! {
            maybe_event = rx.recv() => {
                match maybe_event {
                    Some(event) => {
                        tracing::debug!(kind = event.kind(), "mutation received");
                        state.apply(event);
                        controller.note_mutation(Utc::now());
                    }
                    None => break,
                }
            }
            _ = tokio::time::sleep(wait_for_deadline(&controller)),
                if controller.deadline().is_some() && engine_slot.is_some() =>
            {
                if controller.poll_start(Utc::now()) {
                    if let Some(mut engine) = engine_slot.take() {
                        let snapshot = state.clone();
                        inflight = Some(tokio::task::spawn_blocking(move || {
                            let result = engine.recompute(&snapshot, Utc::now());
                            (engine, result)
                        }));
                    }
                }
            }
            joined = join_pass(&mut inflight) => {
                inflight = None;
                match joined {
                    Ok((engine, result)) => {
                        engine_slot = Some(engine);
                        publish(&result_tx, result);
                    }
                    Err(err) => {
                        // The engine was lost with the panicked task;
                        // rebuild one and keep serving. Snapshot history
                        // is diagnostic and survives being reset.
                        tracing::warn!(error = %err, "recompute pass aborted, rebuilding engine");
                        engine_slot = Some(PlannerEngine::new(config.clone()));
                    }
                }
                controller.finish(Utc::now());
            }
        }
    }

    // All handles dropped. An in-flight pass still completes and
    // publishes so the last mutation is never silently dropped.
    if let Some(handle) = inflight {
        match handle.await {
            Ok((_, result)) => publish(&result_tx, result),
            Err(err) => tracing::warn!(error = %err, "in-flight pass aborted during shutdown"),
        }
    }
    tracing::debug!("planner service stopped");
}

/// Await the in-flight pass, or park forever when there is none (the
/// select arm is then effectively disabled without borrowing `inflight`
/// in a guard).
async fn join_pass(
    inflight: &mut Option<PassHandle>,
) -> Result<(PlannerEngine, PlanResult), tokio::task::JoinError> {
    match inflight.as_mut() {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

fn wait_for_deadline(controller: &RecomputeController) -> std::time::Duration {
    match controller.deadline() {
        Some(deadline) => (deadline - Utc::now())
            .to_std()
            .unwrap_or(std::time::Duration::ZERO),
        None => std::time::Duration::ZERO,
    }
}

fn publish(result_tx: &watch::Sender<Option<Arc<PlanResult>>>, result: PlanResult) {
    tracing::info!(
        revision = result.revision,
        suggestions = result.suggestions.len(),
        candidates = result.candidates.len(),
        "plan published"
    );
    // Send only fails when every receiver is gone, which also ends the
    // mutation channel; nothing to do about it here.
    let _ = result_tx.send(Some(Arc::new(result)));
}

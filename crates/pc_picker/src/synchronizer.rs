//! Keeps the equipment control in step with the room control.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, MutexGuard,
};

use shared::domain::RoomId;
use tokio::{
    sync::{broadcast, mpsc},
    task::{JoinError, JoinSet},
};
use tracing::{debug, error, info};

use crate::{
    control::{EquipmentControl, RoomControl, EQUIPMENT_CONTROL_ID, ROOM_CONTROL_ID},
    render::{EquipmentState, RenderedKind},
    source::PcSource,
};

const OUTCOME_CHANNEL_CAPACITY: usize = 64;

/// What happened to one room change once its request settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Rendered(RenderedKind),
    /// A newer change was issued while this one was in flight; its result was dropped.
    Superseded { sequence: u64, latest: u64 },
}

/// A room change whose Loading state is already on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChange {
    pub room_id: RoomId,
    pub sequence: u64,
}

pub struct DropdownSynchronizer<S, R, E> {
    source: S,
    room: R,
    equipment: E,
    // Only bumped while `render` is held, so a check-then-render under `render` is atomic.
    latest: AtomicU64,
    render: Mutex<()>,
    outcomes: broadcast::Sender<SyncOutcome>,
}

impl<S, R, E> DropdownSynchronizer<S, R, E>
where
    S: PcSource,
    R: RoomControl,
    E: EquipmentControl,
{
    pub fn new(source: S, room: R, equipment: E) -> Self {
        let (outcomes, _) = broadcast::channel(OUTCOME_CHANNEL_CAPACITY);
        Self {
            source,
            room,
            equipment,
            latest: AtomicU64::new(0),
            render: Mutex::new(()),
            outcomes,
        }
    }

    pub fn latest_sequence(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    pub fn equipment(&self) -> &E {
        &self.equipment
    }

    /// Every settled change, as soon as it settles.
    pub fn subscribe_outcomes(&self) -> broadcast::Receiver<SyncOutcome> {
        self.outcomes.subscribe()
    }

    /// Handles one change signal of the room control.
    pub async fn on_room_changed(&self) -> SyncOutcome {
        let pending = self.begin_change();
        self.complete_change(pending).await
    }

    /// Reads the room and shows Loading. Never suspends.
    pub fn begin_change(&self) -> PendingChange {
        let room_id = self.room.value();
        let sequence = {
            let _render = self.lock_render();
            let sequence = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
            self.equipment
                .replace_options(EquipmentState::Loading.entries());
            sequence
        };
        debug!(
            room_id = %room_id,
            sequence,
            control = ROOM_CONTROL_ID,
            "room changed"
        );
        PendingChange { room_id, sequence }
    }

    /// Fetches the PCs for `pending` and renders the terminal state, unless a
    /// newer change has been issued in the meantime.
    pub async fn complete_change(&self, pending: PendingChange) -> SyncOutcome {
        let PendingChange { room_id, sequence } = pending;
        let result = self.source.fetch_available_pcs(&room_id).await;
        if let Err(err) = &result {
            error!(
                room_id = %room_id,
                sequence,
                kind = err.kind(),
                error = %err,
                "error fetching PCs"
            );
        }

        let state = EquipmentState::from_fetch(&result);
        let outcome = {
            let _render = self.lock_render();
            let latest = self.latest.load(Ordering::SeqCst);
            if latest == sequence {
                self.equipment.replace_options(state.entries());
                SyncOutcome::Rendered(state.kind())
            } else {
                SyncOutcome::Superseded { sequence, latest }
            }
        };

        match outcome {
            SyncOutcome::Rendered(kind) => info!(
                room_id = %room_id,
                sequence,
                control = EQUIPMENT_CONTROL_ID,
                rendered = ?kind,
                "equipment options updated"
            ),
            SyncOutcome::Superseded { latest, .. } => debug!(
                room_id = %room_id,
                sequence,
                latest,
                "dropping stale available_pcs response"
            ),
        }
        // Nobody listening is fine.
        let _ = self.outcomes.send(outcome);
        outcome
    }

    fn lock_render(&self) -> MutexGuard<'_, ()> {
        self.render
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<S, R, E> DropdownSynchronizer<S, R, E>
where
    S: PcSource + 'static,
    R: RoomControl + 'static,
    E: EquipmentControl + 'static,
{
    /// Wires the synchronizer to a stream of room change signals.
    ///
    /// Each signal is handled in its own task, so a slow response never holds
    /// up the next change. Settled tasks are reaped while the stream is open;
    /// their outcomes go to [`Self::subscribe_outcomes`]. The returned task
    /// finishes once `changes` is closed and every in-flight change has settled.
    pub fn bind(self: Arc<Self>, mut changes: mpsc::Receiver<()>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut inflight = JoinSet::new();
            loop {
                tokio::select! {
                    change = changes.recv() => match change {
                        Some(()) => {
                            let pending = self.begin_change();
                            let sync = Arc::clone(&self);
                            inflight.spawn(async move { sync.complete_change(pending).await });
                        }
                        None => break,
                    },
                    Some(joined) = inflight.join_next(), if !inflight.is_empty() => {
                        log_aborted(joined);
                    }
                }
            }

            while let Some(joined) = inflight.join_next().await {
                log_aborted(joined);
            }
            debug!("room change stream closed");
        })
    }
}

fn log_aborted(joined: Result<SyncOutcome, JoinError>) {
    if let Err(err) = joined {
        error!(error = %err, "room change handler aborted");
    }
}

#[cfg(test)]
#[path = "tests/synchronizer_tests.rs"]
mod tests;

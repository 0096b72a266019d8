//! Rendezvous coordinator: pairs two submissions per round
//!
//! ## Round lifecycle
//!
//! ```text
//! BothFree --submit--> OneFilled --submit--> (compute, reset) --> BothFree
//!                          |
//!                          +--third submit while partner ingests--> Busy
//! ```
//!
//! Every transition happens under one mutex: finding a free slot, claiming
//! it, checking the partner and computing plus resetting are a single
//! critical section. The second submission to become ready receives the
//! intersection; the first only ever sees `Waiting`.
//!
//! Submissions either go through [`RendezvousCoordinator::submit`] with a
//! fully ingested list, or reserve a slot first with
//! [`RendezvousCoordinator::reserve`] and fill it once the payload has been
//! read. An unfilled [`Reservation`] frees its slot when dropped.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::constants::SLOT_COUNT;
use crate::slot::{Slot, SlotId};
use crate::wire;
use crate::DigestList;

/// Coordinator tuning
#[derive(Debug, Clone, Default)]
pub struct CoordinatorConfig {
    /// Clear a ready slot whose partner has not arrived within this long.
    ///
    /// `None` keeps a pending round open indefinitely.
    pub stale_after: Option<Duration>,
}

/// Result of handing a submission to the coordinator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Both slots are occupied; nothing was stored
    Busy,
    /// Stored in `slot`; the partner has not arrived yet
    Waiting { slot: SlotId },
    /// This submission completed round `round`
    Computed {
        round: u64,
        result: DigestList,
        /// How long the first party's data waited for this one
        partner_waited: Duration,
    },
}

impl SubmitOutcome {
    /// Outcome name as sent in the outcome header
    pub fn label(&self) -> &'static str {
        match self {
            SubmitOutcome::Busy => wire::OUTCOME_BUSY,
            SubmitOutcome::Waiting { .. } => wire::OUTCOME_WAITING,
            SubmitOutcome::Computed { .. } => wire::OUTCOME_RESULT,
        }
    }
}

/// Coarse state of the current round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    BothFree,
    /// Exactly one slot occupied, ready or still ingesting
    OneFilled,
    /// Both slots occupied; at least one is still ingesting
    BothOccupied,
}

/// Observable state of one slot. Never includes submitted data.
#[derive(Debug, Clone, Serialize)]
pub struct SlotStatus {
    pub slot: SlotId,
    pub occupied: bool,
    pub ready: bool,
    /// Time since the slot was reserved, including ingestion
    pub held_ms: Option<u64>,
    /// Wall-clock time the slot was reserved, ms since the Unix epoch
    pub reserved_since_unix_ms: Option<u64>,
    /// Time since the data became ready
    pub waiting_ms: Option<u64>,
    /// Wall-clock time the data became ready, ms since the Unix epoch
    pub ready_since_unix_ms: Option<u64>,
    /// Would be cleared by the next submission
    pub stale: bool,
}

/// Snapshot returned by [`RendezvousCoordinator::status`]
#[derive(Debug, Clone, Serialize)]
pub struct RoundStatus {
    pub phase: RoundPhase,
    pub slots: Vec<SlotStatus>,
    pub rounds_completed: u64,
    pub abandoned_rounds: u64,
    pub stale_after_ms: Option<u64>,
}

impl RoundStatus {
    /// The slot holding ready data that is waiting on a partner
    pub fn pending(&self) -> Option<&SlotStatus> {
        self.slots.iter().find(|s| s.ready)
    }
}

#[derive(Debug, Default)]
struct Round {
    slots: [Slot; SLOT_COUNT],
    next_ticket: u64,
    rounds_completed: u64,
    abandoned_rounds: u64,
}

impl Round {
    fn slot(&self, id: SlotId) -> &Slot {
        &self.slots[id.index()]
    }

    fn slot_mut(&mut self, id: SlotId) -> &mut Slot {
        &mut self.slots[id.index()]
    }

    /// Lowest-indexed free slot
    fn first_free(&self) -> Option<SlotId> {
        SlotId::ALL.into_iter().find(|id| self.slot(*id).is_free())
    }

    fn issue_ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    fn is_stale(&self, id: SlotId, stale_after: Option<Duration>) -> bool {
        let slot = self.slot(id);
        match (stale_after, slot.ready_for()) {
            (Some(ttl), Some(waited)) => {
                // A partner that is still uploading keeps the round alive
                slot.is_ready() && !self.slot(id.other()).is_occupied() && waited >= ttl
            }
            _ => false,
        }
    }

    fn evict_stale(&mut self, stale_after: Option<Duration>) {
        for id in SlotId::ALL {
            if self.is_stale(id, stale_after) {
                tracing::warn!(
                    slot = %id,
                    waited_ms = self.slot(id).ready_for().map(|d| d.as_millis() as u64),
                    "Partner never arrived, clearing abandoned slot"
                );
                self.slot_mut(id).clear();
                self.abandoned_rounds += 1;
            }
        }
    }

    /// Claim the lowest free slot for a new submission
    fn reserve(&mut self, stale_after: Option<Duration>) -> Option<(SlotId, u64)> {
        self.evict_stale(stale_after);
        let Some(id) = self.first_free() else {
            tracing::debug!("Both slots occupied, rejecting submission");
            return None;
        };
        let ticket = self.issue_ticket();
        self.slot_mut(id).reserve(ticket);
        tracing::debug!(slot = %id, ticket, "Slot reserved");
        Some((id, ticket))
    }

    /// Called once `filled` is ready: wait for the partner or finish the round
    fn settle(&mut self, filled: SlotId) -> SubmitOutcome {
        let partner = self.slot(filled.other());
        if !partner.is_ready() {
            tracing::info!(slot = %filled, "First submission stored, waiting for partner");
            return SubmitOutcome::Waiting { slot: filled };
        }
        let partner_waited = partner.ready_for().unwrap_or_default();

        let start = Instant::now();
        let first = self.slot_mut(SlotId::First).take_data().unwrap_or_default();
        let second = self.slot_mut(SlotId::Second).take_data().unwrap_or_default();
        let result = first.intersect(&second);

        for slot in &mut self.slots {
            slot.clear();
        }
        self.rounds_completed += 1;

        tracing::info!(
            round = self.rounds_completed,
            first_len = first.len(),
            second_len = second.len(),
            matches = result.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Intersection computed"
        );

        SubmitOutcome::Computed {
            round: self.rounds_completed,
            result,
            partner_waited,
        }
    }

    fn phase(&self) -> RoundPhase {
        match self.slots.iter().filter(|s| s.is_occupied()).count() {
            0 => RoundPhase::BothFree,
            1 => RoundPhase::OneFilled,
            _ => RoundPhase::BothOccupied,
        }
    }
}

/// Owns the two slots of a rendezvous.
///
/// Cloning yields another handle to the same slots. Separately constructed
/// coordinators share nothing.
#[derive(Debug, Clone, Default)]
pub struct RendezvousCoordinator {
    round: Arc<Mutex<Round>>,
    config: CoordinatorConfig,
}

impl RendezvousCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CoordinatorConfig) -> Self {
        Self {
            round: Arc::default(),
            config,
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    // The critical section never leaves a slot half-updated, so a poisoned
    // lock still guards consistent state.
    fn lock(&self) -> MutexGuard<'_, Round> {
        self.round.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store an already ingested submission and finish the round if possible
    pub fn submit(&self, data: DigestList) -> SubmitOutcome {
        let mut round = self.lock();
        match round.reserve(self.config.stale_after) {
            Some((id, _ticket)) => {
                round.slot_mut(id).fill(data);
                round.settle(id)
            }
            None => SubmitOutcome::Busy,
        }
    }

    /// Claim a slot before the payload is ingested. `None` means busy.
    pub fn reserve(&self) -> Option<Reservation> {
        let (slot, ticket) = self.lock().reserve(self.config.stale_after)?;
        Some(Reservation {
            coordinator: self.clone(),
            slot,
            ticket,
            filled: false,
        })
    }

    /// Snapshot of the round for monitoring
    pub fn status(&self) -> RoundStatus {
        let round = self.lock();
        let stale_after = self.config.stale_after;

        let slots = SlotId::ALL
            .into_iter()
            .map(|id| {
                let slot = round.slot(id);
                SlotStatus {
                    slot: id,
                    occupied: slot.is_occupied(),
                    ready: slot.is_ready(),
                    held_ms: slot.held_for().map(|d| d.as_millis() as u64),
                    reserved_since_unix_ms: slot.reserved_since().and_then(unix_ms),
                    waiting_ms: slot.ready_for().map(|d| d.as_millis() as u64),
                    ready_since_unix_ms: slot.ready_since().and_then(unix_ms),
                    stale: round.is_stale(id, stale_after),
                }
            })
            .collect();

        RoundStatus {
            phase: round.phase(),
            slots,
            rounds_completed: round.rounds_completed,
            abandoned_rounds: round.abandoned_rounds,
            stale_after_ms: stale_after.map(|d| d.as_millis() as u64),
        }
    }
}

fn unix_ms(time: SystemTime) -> Option<u64> {
    time.duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_millis() as u64)
}

/// Exclusive write handle to a reserved slot
///
/// Dropping it without calling [`Reservation::fill`] frees the slot.
#[derive(Debug)]
pub struct Reservation {
    coordinator: RendezvousCoordinator,
    slot: SlotId,
    ticket: u64,
    filled: bool,
}

impl Reservation {
    pub fn slot(&self) -> SlotId {
        self.slot
    }

    /// Store the ingested payload and finish the round if the partner is ready
    pub fn fill(mut self, data: DigestList) -> SubmitOutcome {
        self.filled = true;
        let mut round = self.coordinator.lock();
        round.slot_mut(self.slot).fill(data);
        round.settle(self.slot)
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        if self.filled {
            return;
        }
        let mut round = self.coordinator.lock();
        let slot = round.slot_mut(self.slot);
        if slot.is_held_by(self.ticket) && !slot.is_ready() {
            slot.clear();
            tracing::debug!(slot = %self.slot, ticket = self.ticket, "Reservation released");
        }
    }
}

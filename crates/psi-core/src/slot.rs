//! Slot: storage for one party's submission within a round
//!
//! A slot moves through `free -> reserved -> ready -> free`. Reserved means a
//! submission owns the slot but its payload is still being ingested. All
//! synchronization is the coordinator's job.

use std::fmt;
use std::time::{Duration, Instant, SystemTime};

use serde::Serialize;

use crate::DigestList;

/// Which of the two slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotId {
    First,
    Second,
}

impl SlotId {
    /// Slots in claim-preference order
    pub const ALL: [SlotId; 2] = [SlotId::First, SlotId::Second];

    pub fn index(self) -> usize {
        match self {
            SlotId::First => 0,
            SlotId::Second => 1,
        }
    }

    pub fn other(self) -> SlotId {
        match self {
            SlotId::First => SlotId::Second,
            SlotId::Second => SlotId::First,
        }
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotId::First => write!(f, "first"),
            SlotId::Second => write!(f, "second"),
        }
    }
}

/// Monotonic plus wall-clock time of a slot transition
#[derive(Debug, Clone, Copy)]
struct Stamp {
    instant: Instant,
    wall: SystemTime,
}

impl Stamp {
    fn now() -> Self {
        Self {
            instant: Instant::now(),
            wall: SystemTime::now(),
        }
    }
}

/// One party's submission plus its occupancy flags
#[derive(Debug, Default)]
pub struct Slot {
    data: Option<DigestList>,
    occupied: bool,
    ready: bool,
    /// Ticket of the submission holding this slot
    ticket: Option<u64>,
    reserved_at: Option<Stamp>,
    ready_at: Option<Stamp>,
}

impl Slot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the slot occupied by `ticket`, payload not yet ingested
    pub fn reserve(&mut self, ticket: u64) {
        debug_assert!(self.is_free(), "reserving an occupied slot");
        self.occupied = true;
        self.ready = false;
        self.ticket = Some(ticket);
        self.reserved_at = Some(Stamp::now());
    }

    /// Store the ingested payload and mark the slot ready
    pub fn fill(&mut self, data: DigestList) {
        debug_assert!(self.occupied, "filling an unreserved slot");
        self.data = Some(data);
        self.ready = true;
        self.ready_at = Some(Stamp::now());
    }

    /// Reserve and fill in one step
    pub fn claim(&mut self, ticket: u64, data: DigestList) {
        self.reserve(ticket);
        self.fill(data);
    }

    /// Return to the free state, dropping any data
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Take the data out, leaving the flags untouched
    pub fn take_data(&mut self) -> Option<DigestList> {
        self.data.take()
    }

    pub fn data(&self) -> Option<&DigestList> {
        self.data.as_ref()
    }

    pub fn is_free(&self) -> bool {
        !self.occupied
    }

    pub fn is_occupied(&self) -> bool {
        self.occupied
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_held_by(&self, ticket: u64) -> bool {
        self.ticket == Some(ticket)
    }

    /// How long the slot has been held, ingesting or ready
    pub fn held_for(&self) -> Option<Duration> {
        self.reserved_at.map(|at| at.instant.elapsed())
    }

    /// Wall-clock time the slot was reserved
    pub fn reserved_since(&self) -> Option<SystemTime> {
        self.reserved_at.map(|at| at.wall)
    }

    /// How long the data has been waiting, if ready
    pub fn ready_for(&self) -> Option<Duration> {
        self.ready_at.map(|at| at.instant.elapsed())
    }

    /// Wall-clock time the data became ready
    pub fn ready_since(&self) -> Option<SystemTime> {
        self.ready_at.map(|at| at.wall)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_lifecycle() {
        let mut slot = Slot::new();
        assert!(slot.is_free());
        assert!(!slot.is_ready());

        slot.reserve(1);
        assert!(slot.is_occupied());
        assert!(!slot.is_ready());
        assert!(slot.is_held_by(1));
        assert!(slot.ready_for().is_none());
        assert!(slot.reserved_since().is_some());
        assert!(slot.held_for().is_some());

        slot.fill(DigestList::new());
        assert!(slot.is_ready());
        assert!(slot.ready_since().is_some());

        slot.clear();
        assert!(slot.is_free());
        assert!(!slot.is_ready());
        assert!(slot.data().is_none());
        assert!(!slot.is_held_by(1));
        assert!(slot.held_for().is_none());
    }

    #[test]
    fn test_claim_reserves_and_fills() {
        let mut slot = Slot::new();
        slot.claim(7, DigestList::new());
        assert!(slot.is_occupied());
        assert!(slot.is_ready());
        assert!(slot.is_held_by(7));
        assert_eq!(slot.take_data(), Some(DigestList::new()));
        assert!(slot.is_ready());
    }

    #[test]
    fn test_slot_ids() {
        assert_eq!(SlotId::First.other(), SlotId::Second);
        assert_eq!(SlotId::Second.other(), SlotId::First);
        assert_eq!(SlotId::ALL.map(SlotId::index), [0, 1]);
        assert_eq!(SlotId::Second.to_string(), "second");
    }
}

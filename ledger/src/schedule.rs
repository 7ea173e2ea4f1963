//! Daily interaction slots.
//!
//! Each UTC day is split into two fixed windows, `[00:00, 12:00)` and
//! `[12:00, 24:00)`. An account may interact once per window. The per-account
//! state is the last day it interacted on plus a bitmask of the windows it
//! used that day; moving to a new day clears the mask.

use bela_types::time::SECS_PER_DAY;
use bela_types::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Slots per scheduling day.
pub const SLOTS_PER_DAY: u8 = 2;

/// Length of one slot window.
pub const SLOT_SECS: u64 = SECS_PER_DAY / SLOTS_PER_DAY as u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    /// `[00:00, 12:00)` UTC.
    First,
    /// `[12:00, 24:00)` UTC.
    Second,
}

impl Slot {
    /// The slot containing `now`.
    pub fn at(now: Timestamp) -> Self {
        if now.secs_into_day() < SLOT_SECS {
            Slot::First
        } else {
            Slot::Second
        }
    }

    pub fn bit(self) -> u8 {
        match self {
            Slot::First => 0b01,
            Slot::Second => 0b10,
        }
    }

    /// Offset of the slot's window from the start of the day.
    pub fn start_offset(self) -> u64 {
        match self {
            Slot::First => 0,
            Slot::Second => SLOT_SECS,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::First => write!(f, "first"),
            Slot::Second => write!(f, "second"),
        }
    }
}

/// Coarse per-day progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotPhase {
    Idle,
    OneDone,
    Done,
}

/// Slot usage for one scheduling day.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotState {
    pub day: u64,
    pub consumed: u8,
}

impl SlotState {
    /// Bring a stored `(last_day, consumed)` pair forward to `now`.
    ///
    /// A stored day different from the current one means nothing has been
    /// used today.
    pub fn advance(last_day: u64, consumed: u8, now: Timestamp) -> Self {
        let today = now.day_index();
        if last_day == today {
            Self { day: today, consumed }
        } else {
            Self { day: today, consumed: 0 }
        }
    }

    pub fn is_consumed(&self, slot: Slot) -> bool {
        self.consumed & slot.bit() != 0
    }

    /// The state after using `slot`.
    pub fn consume(self, slot: Slot) -> Self {
        Self {
            day: self.day,
            consumed: self.consumed | slot.bit(),
        }
    }

    pub fn today_count(&self) -> u8 {
        self.consumed.count_ones() as u8
    }

    pub fn phase(&self) -> SlotPhase {
        match self.today_count() {
            0 => SlotPhase::Idle,
            1 => SlotPhase::OneDone,
            _ => SlotPhase::Done,
        }
    }

    /// Whether `slot` can still be used: unused today and its window not over.
    pub fn is_available(&self, slot: Slot, now: Timestamp) -> bool {
        let window_end = slot.start_offset() + SLOT_SECS;
        !self.is_consumed(slot) && now.secs_into_day() < window_end
    }

    /// When the account can next interact. `now` itself if the current slot is free.
    pub fn next_slot_time(&self, now: Timestamp) -> Timestamp {
        let current = Slot::at(now);
        if !self.is_consumed(current) {
            return now;
        }
        let day_start = now.day_index() * SECS_PER_DAY;
        match current {
            Slot::First if !self.is_consumed(Slot::Second) => {
                Timestamp::new(day_start + Slot::Second.start_offset())
            }
            _ => Timestamp::new(day_start + SECS_PER_DAY),
        }
    }
}

/// Slot view of an account, as returned by `check_interaction_status`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionStatus {
    pub can_interact: bool,
    pub next_slot_time: Timestamp,
    pub today_count: u8,
    pub current_slot: Slot,
    pub slot_one_available: bool,
    pub slot_two_available: bool,
}

impl InteractionStatus {
    pub fn from_state(state: SlotState, now: Timestamp, allowed: bool) -> Self {
        let current = Slot::at(now);
        Self {
            can_interact: allowed && !state.is_consumed(current),
            next_slot_time: state.next_slot_time(now),
            today_count: state.today_count(),
            current_slot: current,
            slot_one_available: state.is_available(Slot::First, now),
            slot_two_available: state.is_available(Slot::Second, now),
        }
    }
}

use std::collections::{HashMap, HashSet};

use crate::data::{Room, RoomId, SlotIndex, Teacher, TeacherId};
use crate::space::AssignmentKey;

/// Slot occupancy accumulated across sequential solves.
///
/// Input entities stay untouched; declared unavailability is copied in
/// once by [`SlotLedger::seed`] and commitments from solved sections are
/// layered on top with [`SlotLedger::commit`].
#[derive(Debug, Default, Clone)]
pub struct SlotLedger {
    teacher_slots: HashMap<TeacherId, HashSet<SlotIndex>>,
    room_slots: HashMap<RoomId, HashSet<SlotIndex>>,
}

impl SlotLedger {
    /// A ledger pre-loaded with the unavailability the entities declare.
    pub fn seed(teachers: &[Teacher], rooms: &[Room]) -> Self {
        let mut ledger = Self::default();
        for teacher in teachers {
            ledger
                .teacher_slots
                .entry(teacher.id)
                .or_default()
                .extend(teacher.unavailable_slots.iter().copied());
        }
        for room in rooms {
            ledger
                .room_slots
                .entry(room.id)
                .or_default()
                .extend(room.unavailable_slots.iter().copied());
        }
        ledger
    }

    pub fn teacher_unavailable(&self, teacher: TeacherId, slot: SlotIndex) -> bool {
        self.teacher_slots
            .get(&teacher)
            .is_some_and(|slots| slots.contains(&slot))
    }

    pub fn room_unavailable(&self, room: RoomId, slot: SlotIndex) -> bool {
        self.room_slots
            .get(&room)
            .is_some_and(|slots| slots.contains(&slot))
    }

    /// Records a solved section's assignments so later sections cannot
    /// reuse the same teacher or room at the same time.
    pub fn commit(&mut self, assignments: &[AssignmentKey]) {
        for key in assignments {
            self.teacher_slots
                .entry(key.teacher)
                .or_default()
                .insert(key.slot);
            self.room_slots.entry(key.room).or_default().insert(key.slot);
        }
    }
}

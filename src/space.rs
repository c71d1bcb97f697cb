use good_lp::{Expression, Variable};
use log::trace;
use std::collections::HashMap;

use crate::data::{Catalog, RoomId, SectionId, SlotIndex, SubjectId, TeacherId};
use crate::ledger::SlotLedger;
use crate::model::BoolModel;

/// Identity of one candidate decision: a section attends a subject with a
/// teacher in a room during a slot. Field order doubles as the decode
/// sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssignmentKey {
    pub section: SectionId,
    pub slot: SlotIndex,
    pub subject: SubjectId,
    pub teacher: TeacherId,
    pub room: RoomId,
}

/// Every admissible assignment variable plus the groupings the constraint
/// families iterate over.
///
/// A key absent from the space means "structurally impossible" and reads
/// as a constant false, never as an error. Variables are grouped by axis
/// once at build time so constraint emission walks short vectors instead
/// of rescanning the whole map per row.
pub struct VariableSpace {
    vars: HashMap<AssignmentKey, Variable>,
    by_section_subject: HashMap<(SectionId, SubjectId), Vec<AssignmentKey>>,
    by_slot_teacher: HashMap<(SlotIndex, TeacherId), Vec<Variable>>,
    by_slot_room: HashMap<(SlotIndex, RoomId), Vec<Variable>>,
}

impl VariableSpace {
    /// Declares one 0/1 variable per combination that passes every static
    /// eligibility rule. An empty space is valid output; whether it dooms
    /// the schedule is for the quota constraints to decide.
    pub fn build(model: &mut BoolModel, catalog: &Catalog, ledger: &SlotLedger) -> Self {
        let mut space = Self {
            vars: HashMap::new(),
            by_section_subject: HashMap::new(),
            by_slot_teacher: HashMap::new(),
            by_slot_room: HashMap::new(),
        };

        // x_(s,i,u,t,r) = 1 if section s takes subject u with teacher t
        //                   in room r during slot i
        //                 0 otherwise
        for section in catalog.sections {
            for slot in 0..catalog.slots.len() {
                for &subject_id in &section.subject_ids {
                    // referenced subjects exist once validation has passed
                    let subject = catalog.subject(subject_id).unwrap();
                    for teacher in catalog.teachers {
                        if !teacher.subject_ids.contains(&subject_id) {
                            continue;
                        }
                        if ledger.teacher_unavailable(teacher.id, slot) {
                            continue;
                        }
                        for room in catalog.rooms {
                            if ledger.room_unavailable(room.id, slot) {
                                continue;
                            }
                            if subject.requires_lab && !room.is_lab {
                                continue;
                            }
                            let key = AssignmentKey {
                                section: section.id,
                                slot,
                                subject: subject_id,
                                teacher: teacher.id,
                                room: room.id,
                            };
                            let var = model.bool_var();
                            space.vars.insert(key, var);
                            space
                                .by_section_subject
                                .entry((section.id, subject_id))
                                .or_default()
                                .push(key);
                            space
                                .by_slot_teacher
                                .entry((slot, teacher.id))
                                .or_default()
                                .push(var);
                            space.by_slot_room.entry((slot, room.id)).or_default().push(var);
                        }
                    }
                }
            }
        }

        let subject_refs: usize = catalog.sections.iter().map(|s| s.subject_ids.len()).sum();
        trace!(
            "Generated {} assignment variables out of a theoretical maximum of {}.",
            space.vars.len(),
            subject_refs * catalog.slots.len() * catalog.teachers.len() * catalog.rooms.len()
        );
        space
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// All (key, variable) pairs in unspecified order; decoders sort.
    pub fn iter(&self) -> impl Iterator<Item = (&AssignmentKey, &Variable)> + '_ {
        self.vars.iter()
    }

    /// Sum of every variable for this (section, subject); zero expression
    /// when no combination survived pruning.
    pub fn subject_total(&self, section: SectionId, subject: SubjectId) -> Expression {
        self.by_section_subject
            .get(&(section, subject))
            .into_iter()
            .flatten()
            .map(|key| self.vars[key])
            .sum()
    }

    /// Sum restricted to one teacher, with the term count for use as a
    /// reification cap.
    pub fn subject_taught_by(
        &self,
        section: SectionId,
        subject: SubjectId,
        teacher: TeacherId,
    ) -> (Expression, usize) {
        let mut total: Expression = 0.into();
        let mut count = 0;
        for key in self
            .by_section_subject
            .get(&(section, subject))
            .into_iter()
            .flatten()
        {
            if key.teacher == teacher {
                total += self.vars[key];
                count += 1;
            }
        }
        (total, count)
    }

    /// Sum of every variable placing this teacher at this slot, across
    /// all sections, subjects and rooms.
    pub fn teacher_slot_total(&self, slot: SlotIndex, teacher: TeacherId) -> Expression {
        self.by_slot_teacher
            .get(&(slot, teacher))
            .into_iter()
            .flatten()
            .copied()
            .sum()
    }

    /// Whether any variable could place this teacher at this slot.
    pub fn teacher_has_candidates(&self, slot: SlotIndex, teacher: TeacherId) -> bool {
        self.by_slot_teacher.contains_key(&(slot, teacher))
    }

    /// Sum of every variable placing something in this room at this slot.
    pub fn room_slot_total(&self, slot: SlotIndex, room: RoomId) -> Expression {
        self.by_slot_room
            .get(&(slot, room))
            .into_iter()
            .flatten()
            .copied()
            .sum()
    }
}

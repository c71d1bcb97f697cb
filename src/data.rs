use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::error::ScheduleError;

// Type aliases for clarity
pub type TeacherId = u32;
pub type SectionId = u32;
pub type RoomId = u32;
pub type SubjectId = u32;
pub type SlotId = u32;
/// Zero-based position of a lecture slot in the fixed weekly sequence;
/// "same time" and "adjacent time" comparisons use this, never `SlotId`.
pub type SlotIndex = usize;

/// A teacher, the subjects they are qualified to teach, and the slot
/// indices they cannot take.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Teacher {
    pub id: TeacherId,
    pub name: String,
    pub subject_ids: Vec<SubjectId>,
    #[serde(default)]
    pub unavailable_slots: Vec<SlotIndex>,
}

/// A class section and the subjects it must receive lectures in.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Section {
    pub id: SectionId,
    pub name: String,
    pub subject_ids: Vec<SubjectId>,
}

/// A physical room; `is_lab` marks it as equipped for lab subjects.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub is_lab: bool,
    #[serde(default)]
    pub unavailable_slots: Vec<SlotIndex>,
}

/// A subject with its weekly lecture quota.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub lec_per_week: u32,
    pub requires_lab: bool,
}

/// One position in the weekly grid of lecture slots shared by all sections.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LectureSlot {
    pub id: SlotId,
    pub day: String,
    pub start_time: String,
    pub end_time: String,
}

/// A single decoded lecture, projected to display names and times.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TimetableEntry {
    pub section: String,
    pub subject: String,
    pub teacher: String,
    pub room: String,
    pub day: String,
    pub start_time: String,
    pub end_time: String,
}

/// The complete problem instance for joint scheduling.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableRequest {
    pub teachers: Vec<Teacher>,
    pub sections: Vec<Section>,
    pub rooms: Vec<Room>,
    pub subjects: Vec<Subject>,
    pub lecture_slots: Vec<LectureSlot>,
}

/// A single-section instance for sequential scheduling. Teacher and room
/// unavailability here is expected to already include the slots claimed
/// by previously scheduled sections.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionRequest {
    pub teachers: Vec<Teacher>,
    pub section: Section,
    pub rooms: Vec<Room>,
    pub subjects: Vec<Subject>,
    pub lecture_slots: Vec<LectureSlot>,
}

impl TimetableRequest {
    /// Checks the instance before any model is built.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        validate(
            &self.teachers,
            &self.sections,
            &self.rooms,
            &self.subjects,
            &self.lecture_slots,
        )
    }
}

impl SectionRequest {
    /// Checks the instance before any model is built.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        validate(
            &self.teachers,
            std::slice::from_ref(&self.section),
            &self.rooms,
            &self.subjects,
            &self.lecture_slots,
        )
    }
}

/// Borrowed id → entity lookups plus the original entity slices.
///
/// Model building iterates the slices so that variable creation follows
/// input order (deterministic models); cross-references go through the
/// maps.
pub struct Catalog<'a> {
    pub sections: &'a [Section],
    pub teachers: &'a [Teacher],
    pub rooms: &'a [Room],
    pub slots: &'a [LectureSlot],
    subjects_by_id: HashMap<SubjectId, &'a Subject>,
    sections_by_id: HashMap<SectionId, &'a Section>,
    teachers_by_id: HashMap<TeacherId, &'a Teacher>,
    rooms_by_id: HashMap<RoomId, &'a Room>,
}

impl<'a> Catalog<'a> {
    pub fn new(
        sections: &'a [Section],
        teachers: &'a [Teacher],
        rooms: &'a [Room],
        subjects: &'a [Subject],
        slots: &'a [LectureSlot],
    ) -> Self {
        Self {
            sections,
            teachers,
            rooms,
            slots,
            subjects_by_id: subjects.iter().map(|s| (s.id, s)).collect(),
            sections_by_id: sections.iter().map(|s| (s.id, s)).collect(),
            teachers_by_id: teachers.iter().map(|t| (t.id, t)).collect(),
            rooms_by_id: rooms.iter().map(|r| (r.id, r)).collect(),
        }
    }

    pub fn subject(&self, id: SubjectId) -> Option<&'a Subject> {
        self.subjects_by_id.get(&id).copied()
    }

    pub fn section(&self, id: SectionId) -> Option<&'a Section> {
        self.sections_by_id.get(&id).copied()
    }

    pub fn teacher(&self, id: TeacherId) -> Option<&'a Teacher> {
        self.teachers_by_id.get(&id).copied()
    }

    pub fn room(&self, id: RoomId) -> Option<&'a Room> {
        self.rooms_by_id.get(&id).copied()
    }
}

/// Validates an entity set shared by both scheduling modes. All problems
/// are collected into one message so the caller sees everything at once.
///
/// Having no legal (teacher, room, slot) combination for some subject is
/// deliberately *not* checked here; that situation must flow through the
/// solver and surface as an infeasible outcome.
pub fn validate(
    teachers: &[Teacher],
    sections: &[Section],
    rooms: &[Room],
    subjects: &[Subject],
    lecture_slots: &[LectureSlot],
) -> Result<(), ScheduleError> {
    let mut problems: Vec<String> = Vec::new();

    for id in teachers.iter().map(|t| t.id).duplicates() {
        problems.push(format!("duplicate teacher id {id}"));
    }
    for id in sections.iter().map(|s| s.id).duplicates() {
        problems.push(format!("duplicate section id {id}"));
    }
    for id in rooms.iter().map(|r| r.id).duplicates() {
        problems.push(format!("duplicate room id {id}"));
    }
    for id in subjects.iter().map(|s| s.id).duplicates() {
        problems.push(format!("duplicate subject id {id}"));
    }
    for id in lecture_slots.iter().map(|s| s.id).duplicates() {
        problems.push(format!("duplicate lecture slot id {id}"));
    }

    let known: HashSet<SubjectId> = subjects.iter().map(|s| s.id).collect();
    for section in sections {
        for id in section.subject_ids.iter().copied().duplicates() {
            problems.push(format!(
                "section '{}' lists subject {id} more than once",
                section.name
            ));
        }
        for id in &section.subject_ids {
            if !known.contains(id) {
                problems.push(format!(
                    "section '{}' references unknown subject {id}",
                    section.name
                ));
            }
        }
    }

    for subject in subjects {
        if subject.lec_per_week == 0 {
            problems.push(format!(
                "subject '{}' must require at least one lecture per week",
                subject.name
            ));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ScheduleError::InvalidInput(problems.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn subject(id: SubjectId, name: &str, lec_per_week: u32, requires_lab: bool) -> Subject {
        Subject {
            id,
            name: name.to_string(),
            lec_per_week,
            requires_lab,
        }
    }

    fn teacher(id: TeacherId, name: &str, subject_ids: &[SubjectId]) -> Teacher {
        Teacher {
            id,
            name: name.to_string(),
            subject_ids: subject_ids.to_vec(),
            unavailable_slots: Vec::new(),
        }
    }

    fn section(id: SectionId, name: &str, subject_ids: &[SubjectId]) -> Section {
        Section {
            id,
            name: name.to_string(),
            subject_ids: subject_ids.to_vec(),
        }
    }

    fn room(id: RoomId, name: &str, is_lab: bool) -> Room {
        Room {
            id,
            name: name.to_string(),
            is_lab,
            unavailable_slots: Vec::new(),
        }
    }

    fn slot(id: SlotId, day: &str, start_time: &str, end_time: &str) -> LectureSlot {
        LectureSlot {
            id,
            day: day.to_string(),
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
        }
    }

    #[test]
    fn test_valid_instance_passes() {
        let result = validate(
            &[teacher(1, "Ada", &[10])],
            &[section(1, "10A", &[10])],
            &[room(1, "R1", false)],
            &[subject(10, "Math", 2, false)],
            &[slot(0, "Monday", "09:00", "10:00")],
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_unknown_subject_reference_rejected() {
        let err = validate(
            &[teacher(1, "Ada", &[10])],
            &[section(1, "10A", &[10, 99])],
            &[room(1, "R1", false)],
            &[subject(10, "Math", 2, false)],
            &[slot(0, "Monday", "09:00", "10:00")],
        )
        .unwrap_err();
        match err {
            ScheduleError::InvalidInput(msg) => {
                assert!(msg.contains("unknown subject 99"), "got: {msg}");
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_all_problems_reported_together() {
        let err = validate(
            &[teacher(1, "Ada", &[10]), teacher(1, "Bea", &[10])],
            &[section(1, "10A", &[99])],
            &[room(1, "R1", false)],
            &[subject(10, "Math", 0, false)],
            &[slot(0, "Monday", "09:00", "10:00")],
        )
        .unwrap_err();
        let ScheduleError::InvalidInput(msg) = err else {
            panic!("expected InvalidInput");
        };
        assert!(msg.contains("duplicate teacher id 1"));
        assert!(msg.contains("unknown subject 99"));
        assert!(msg.contains("at least one lecture per week"));
    }

    #[test]
    fn test_duplicate_subject_in_section_rejected() {
        let err = validate(
            &[teacher(1, "Ada", &[10])],
            &[section(1, "10A", &[10, 10])],
            &[room(1, "R1", false)],
            &[subject(10, "Math", 2, false)],
            &[slot(0, "Monday", "09:00", "10:00")],
        )
        .unwrap_err();
        let ScheduleError::InvalidInput(msg) = err else {
            panic!("expected InvalidInput");
        };
        assert!(msg.contains("more than once"));
    }

    #[test]
    fn test_joint_request_wire_shape() {
        let payload = json!({
            "teachers": [
                {"id": 1, "name": "Ada", "subject_ids": [10], "unavailable_slots": [1]}
            ],
            "sections": [{"id": 1, "name": "10A", "subject_ids": [10]}],
            "rooms": [{"id": 1, "name": "R1", "is_lab": false}],
            "subjects": [
                {"id": 10, "name": "Math", "lec_per_week": 2, "requires_lab": false}
            ],
            "lectureSlots": [
                {"id": 0, "day": "Monday", "start_time": "09:00", "end_time": "10:00"}
            ]
        });
        let request: TimetableRequest = serde_json::from_value(payload).unwrap();
        assert_eq!(request.lecture_slots.len(), 1);
        assert_eq!(request.teachers[0].unavailable_slots, vec![1]);
        // Rooms may omit unavailable_slots entirely.
        assert!(request.rooms[0].unavailable_slots.is_empty());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_section_request_wire_shape() {
        let payload = json!({
            "teachers": [{"id": 1, "name": "Ada", "subject_ids": [10]}],
            "section": {"id": 7, "name": "10B", "subject_ids": [10]},
            "rooms": [{"id": 1, "name": "R1", "is_lab": true, "unavailable_slots": [0]}],
            "subjects": [
                {"id": 10, "name": "Chemistry", "lec_per_week": 1, "requires_lab": true}
            ],
            "lectureSlots": [
                {"id": 0, "day": "Monday", "start_time": "09:00", "end_time": "10:00"},
                {"id": 1, "day": "Monday", "start_time": "10:00", "end_time": "11:00"}
            ]
        });
        let request: SectionRequest = serde_json::from_value(payload).unwrap();
        assert_eq!(request.section.name, "10B");
        assert_eq!(request.rooms[0].unavailable_slots, vec![0]);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_timetable_entry_wire_keys() {
        let entry = TimetableEntry {
            section: "10A".into(),
            subject: "Math".into(),
            teacher: "Ada".into(),
            room: "R1".into(),
            day: "Monday".into(),
            start_time: "09:00".into(),
            end_time: "10:00".into(),
        };
        let value = serde_json::to_value(&entry).unwrap();
        let object = value.as_object().unwrap();
        for key in [
            "section",
            "subject",
            "teacher",
            "room",
            "day",
            "start_time",
            "end_time",
        ] {
            assert!(object.contains_key(key), "missing key {key}");
        }
        assert_eq!(object.len(), 7);
    }

    #[test]
    fn test_catalog_lookups() {
        let teachers = [teacher(1, "Ada", &[10])];
        let sections = [section(1, "10A", &[10])];
        let rooms = [room(2, "Lab", true)];
        let subjects = [subject(10, "Math", 2, false)];
        let slots = [slot(0, "Monday", "09:00", "10:00")];
        let catalog = Catalog::new(&sections, &teachers, &rooms, &subjects, &slots);

        assert_eq!(catalog.subject(10).unwrap().name, "Math");
        assert_eq!(catalog.teacher(1).unwrap().name, "Ada");
        assert_eq!(catalog.room(2).unwrap().name, "Lab");
        assert_eq!(catalog.section(1).unwrap().name, "10A");
        assert!(catalog.subject(99).is_none());
    }
}

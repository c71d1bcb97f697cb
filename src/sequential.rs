use log::info;

use crate::data::{
    Catalog, LectureSlot, Room, Section, Subject, Teacher, TimetableEntry, validate,
};
use crate::error::ScheduleError;
use crate::ledger::SlotLedger;
use crate::model::SolveOptions;
use crate::solver::{project, solve_assignments};

/// Schedules sections one at a time in the given order, carrying consumed
/// teacher and room slots forward through an owned ledger.
///
/// Each model only ranges over one section's subjects, so solves stay
/// small, but earlier sections claim slots greedily: a later section can
/// come out infeasible even when a joint model would have placed
/// everyone. Such a failure names the section and aborts the run instead
/// of skipping it or returning a partial timetable for it.
pub fn schedule_sections(
    sections: &[Section],
    teachers: &[Teacher],
    rooms: &[Room],
    subjects: &[Subject],
    lecture_slots: &[LectureSlot],
    options: SolveOptions,
) -> Result<Vec<TimetableEntry>, ScheduleError> {
    validate(teachers, sections, rooms, subjects, lecture_slots)?;

    let mut ledger = SlotLedger::seed(teachers, rooms);
    let mut timetable = Vec::new();
    for section in sections {
        info!("Scheduling section '{}'...", section.name);
        let catalog = Catalog::new(
            std::slice::from_ref(section),
            teachers,
            rooms,
            subjects,
            lecture_slots,
        );
        let assignments = solve_assignments(&catalog, &ledger, options).map_err(|err| match err {
            ScheduleError::Infeasible(_) => {
                ScheduleError::SectionInfeasible(section.name.clone())
            }
            other => other,
        })?;
        // committed strictly between solves; the next build reads it
        ledger.commit(&assignments);
        timetable.extend(project(&assignments, &catalog));
    }
    Ok(timetable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SlotIndex;
    use itertools::Itertools;

    fn subject(id: u32, name: &str, lec_per_week: u32) -> Subject {
        Subject {
            id,
            name: name.to_string(),
            lec_per_week,
            requires_lab: false,
        }
    }

    fn teacher(id: u32, name: &str, subject_ids: &[u32], unavailable: &[SlotIndex]) -> Teacher {
        Teacher {
            id,
            name: name.to_string(),
            subject_ids: subject_ids.to_vec(),
            unavailable_slots: unavailable.to_vec(),
        }
    }

    fn section(id: u32, name: &str, subject_ids: &[u32]) -> Section {
        Section {
            id,
            name: name.to_string(),
            subject_ids: subject_ids.to_vec(),
        }
    }

    fn room(id: u32, name: &str) -> Room {
        Room {
            id,
            name: name.to_string(),
            is_lab: false,
            unavailable_slots: Vec::new(),
        }
    }

    fn week(n: usize) -> Vec<LectureSlot> {
        (0..n)
            .map(|i| LectureSlot {
                id: i as u32,
                day: "Monday".to_string(),
                start_time: format!("{:02}:00", 9 + i),
                end_time: format!("{:02}:00", 10 + i),
            })
            .collect()
    }

    #[test]
    fn test_shared_resources_never_collide_across_sections() {
        let sections = [section(1, "10A", &[10]), section(2, "10B", &[10])];
        let teachers = [teacher(1, "Ada", &[10], &[])];
        let rooms = [room(1, "R1")];
        let subjects = [subject(10, "Math", 2)];
        let slots = week(5);

        let timetable = schedule_sections(
            &sections,
            &teachers,
            &rooms,
            &subjects,
            &slots,
            SolveOptions::default(),
        )
        .unwrap();

        assert_eq!(timetable.len(), 4);
        // one teacher and one room, so every lecture needs its own slot
        let distinct_starts = timetable
            .iter()
            .map(|e| e.start_time.as_str())
            .unique()
            .count();
        assert_eq!(distinct_starts, 4);
    }

    #[test]
    fn test_entries_follow_section_processing_order() {
        let sections = [section(1, "10A", &[10]), section(2, "10B", &[10])];
        let teachers = [teacher(1, "Ada", &[10], &[]), teacher(2, "Bea", &[10], &[])];
        let rooms = [room(1, "R1"), room(2, "R2")];
        let subjects = [subject(10, "Math", 1)];
        let slots = week(2);

        let timetable = schedule_sections(
            &sections,
            &teachers,
            &rooms,
            &subjects,
            &slots,
            SolveOptions::default(),
        )
        .unwrap();

        let order: Vec<&str> = timetable.iter().map(|e| e.section.as_str()).collect();
        assert_eq!(order, vec!["10A", "10B"]);
    }

    #[test]
    fn test_starved_section_fails_by_name() {
        // 10A's two lectures exhaust the 2-slot week before 10B runs
        let sections = [section(1, "10A", &[10]), section(2, "10B", &[10])];
        let teachers = [teacher(1, "Ada", &[10], &[])];
        let rooms = [room(1, "R1")];
        let subjects = [subject(10, "Math", 2)];
        let slots = week(2);

        let err = schedule_sections(
            &sections,
            &teachers,
            &rooms,
            &subjects,
            &slots,
            SolveOptions::default(),
        )
        .unwrap_err();

        assert_eq!(err, ScheduleError::SectionInfeasible("10B".to_string()));
    }

    #[test]
    fn test_declared_unavailability_still_binds_later_sections() {
        // Ada is away in slot 0; after 10A takes slot 1, 10B has nothing left
        let sections = [section(1, "10A", &[10]), section(2, "10B", &[10])];
        let teachers = [teacher(1, "Ada", &[10], &[0])];
        let rooms = [room(1, "R1")];
        let subjects = [subject(10, "Math", 1)];
        let slots = week(2);

        let err = schedule_sections(
            &sections,
            &teachers,
            &rooms,
            &subjects,
            &slots,
            SolveOptions::default(),
        )
        .unwrap_err();

        assert_eq!(err, ScheduleError::SectionInfeasible("10B".to_string()));
    }

    #[test]
    fn test_validation_runs_before_any_solve() {
        let sections = [section(1, "10A", &[77])];
        let teachers = [teacher(1, "Ada", &[10], &[])];
        let rooms = [room(1, "R1")];
        let subjects = [subject(10, "Math", 1)];
        let slots = week(2);

        let err = schedule_sections(
            &sections,
            &teachers,
            &rooms,
            &subjects,
            &slots,
            SolveOptions::default(),
        )
        .unwrap_err();

        assert!(matches!(err, ScheduleError::InvalidInput(_)), "got {err:?}");
    }

    #[test]
    fn test_no_sections_is_an_empty_success() {
        let teachers = [teacher(1, "Ada", &[10], &[])];
        let rooms = [room(1, "R1")];
        let subjects = [subject(10, "Math", 1)];
        let slots = week(2);

        let timetable = schedule_sections(
            &[],
            &teachers,
            &rooms,
            &subjects,
            &slots,
            SolveOptions::default(),
        )
        .unwrap();
        assert!(timetable.is_empty());
    }
}

use good_lp::Expression;
use log::info;
use std::time::Instant;

use crate::data::{Catalog, TimetableEntry, TimetableRequest};
use crate::error::ScheduleError;
use crate::ledger::SlotLedger;
use crate::model::{BoolModel, SolveOptions, SolveStatus};
use crate::space::{AssignmentKey, VariableSpace};

/// Builds and solves the joint model covering every section at once.
///
/// The joint model is what guarantees conflict-freedom across sections:
/// the exclusivity constraints range over all of them together.
pub fn build_timetable(
    request: &TimetableRequest,
    options: SolveOptions,
) -> Result<Vec<TimetableEntry>, ScheduleError> {
    request.validate()?;
    let catalog = Catalog::new(
        &request.sections,
        &request.teachers,
        &request.rooms,
        &request.subjects,
        &request.lecture_slots,
    );
    let ledger = SlotLedger::seed(&request.teachers, &request.rooms);
    let assignments = solve_assignments(&catalog, &ledger, options)?;
    Ok(project(&assignments, &catalog))
}

/// Formulates and solves one model over whatever the catalog and ledger
/// admit, returning the chosen assignment keys in their fixed order.
/// Joint mode calls this once with every section; sequential mode calls
/// it once per section with the ledger accumulated so far.
pub(crate) fn solve_assignments(
    catalog: &Catalog,
    ledger: &SlotLedger,
    options: SolveOptions,
) -> Result<Vec<AssignmentKey>, ScheduleError> {
    let start_time = Instant::now();
    info!(
        "Setting up 0/1 model with {} sections, {} teachers, {} rooms, and {} lecture slots...",
        catalog.sections.len(),
        catalog.teachers.len(),
        catalog.rooms.len(),
        catalog.slots.len()
    );

    let mut model = BoolModel::new();
    let space = VariableSpace::build(&mut model, catalog, ledger);

    if space.is_empty() {
        // nothing demanded and nothing possible look the same to the
        // backend, so tell them apart before handing over an empty model
        let demanded: u32 = catalog
            .sections
            .iter()
            .flat_map(|section| &section.subject_ids)
            .filter_map(|&id| catalog.subject(id))
            .map(|subject| subject.lec_per_week)
            .sum();
        return if demanded == 0 {
            Ok(Vec::new())
        } else {
            Err(ScheduleError::Infeasible(
                "no admissible (teacher, room, slot) combination exists for the requested lectures"
                    .to_string(),
            ))
        };
    }

    add_quota_constraints(&mut model, &space, catalog);
    add_continuity_constraints(&mut model, &space, catalog);
    add_teacher_exclusivity(&mut model, &space, catalog);
    add_room_exclusivity(&mut model, &space, catalog);

    let penalties = spread_objective(&mut model, &space, catalog);
    model.minimize(penalties);
    if let Some(seconds) = options.time_limit {
        model.set_time_limit(seconds);
    }

    info!("Starting solver...");
    let outcome = model.solve();
    let duration = start_time.elapsed();

    let reason = outcome
        .message
        .unwrap_or_else(|| "no reason given".to_string());
    let valuation = match (outcome.status, outcome.valuation) {
        (SolveStatus::Optimal | SolveStatus::Feasible, Some(valuation)) => valuation,
        (SolveStatus::Infeasible, _) => {
            return Err(ScheduleError::Infeasible(
                "the hard constraints cannot all be satisfied at once".to_string(),
            ));
        }
        (SolveStatus::Unknown, _) => return Err(ScheduleError::Unresolved(reason)),
        _ => return Err(ScheduleError::Backend(reason)),
    };
    info!("Solution found in {:.2?}", duration);

    let mut chosen: Vec<AssignmentKey> = space
        .iter()
        .filter(|(_, var)| valuation.is_true(**var))
        .map(|(key, _)| *key)
        .collect();
    chosen.sort();
    Ok(chosen)
}

// Family 1: each (section, subject) gets exactly its weekly lecture count.
// When pruning left no candidate variables the sum is empty and a positive
// quota turns into an unsatisfiable 0 == n, which is exactly how structural
// impossibility is meant to surface.
fn add_quota_constraints(model: &mut BoolModel, space: &VariableSpace, catalog: &Catalog) {
    info!("Adding 'weekly lecture quota' constraints...");
    for section in catalog.sections {
        for &subject_id in &section.subject_ids {
            let subject = catalog.subject(subject_id).unwrap();
            let total = space.subject_total(section.id, subject_id);
            model.add_eq(total, f64::from(subject.lec_per_week));
        }
    }
}

// Family 2: all lectures of a (section, subject) share one teacher. One
// indicator per qualified teacher with candidates, tied to that teacher's
// variable sum in both directions, and exactly one indicator true. The
// reification must be two-sided: with only sum > 0 => indicator, the
// solver is free to raise extra indicators and the exactly-one count
// stops meaning anything.
fn add_continuity_constraints(model: &mut BoolModel, space: &VariableSpace, catalog: &Catalog) {
    info!("Adding 'single teacher per subject' constraints...");
    for section in catalog.sections {
        for &subject_id in &section.subject_ids {
            let mut indicators: Expression = 0.into();
            for teacher in catalog.teachers {
                if !teacher.subject_ids.contains(&subject_id) {
                    continue;
                }
                let (taught, terms) = space.subject_taught_by(section.id, subject_id, teacher.id);
                if terms == 0 {
                    continue;
                }
                let indicator = model.bool_var();
                model.reify_nonzero(indicator, taught, terms);
                indicators += indicator;
            }
            model.add_eq(indicators, 1.0);
        }
    }
}

// Family 3: a teacher gives at most one lecture per slot, across every
// section. Together with family 4 this is what couples sections in the
// joint model; rows with no candidates stay as a vacuous 0 <= 1.
fn add_teacher_exclusivity(model: &mut BoolModel, space: &VariableSpace, catalog: &Catalog) {
    info!("Adding 'no teacher double-booking' constraints...");
    for teacher in catalog.teachers {
        for slot in 0..catalog.slots.len() {
            let busy = space.teacher_slot_total(slot, teacher.id);
            model.add_le(busy, 1.0);
        }
    }
}

// Family 4: a room hosts at most one lecture per slot.
fn add_room_exclusivity(model: &mut BoolModel, space: &VariableSpace, catalog: &Catalog) {
    info!("Adding 'no room double-booking' constraints...");
    for room in catalog.rooms {
        for slot in 0..catalog.slots.len() {
            let occupied = space.room_slot_total(slot, room.id);
            model.add_le(occupied, 1.0);
        }
    }
}

// Spread preference: one penalty indicator per (teacher, adjacent slot
// pair), true exactly when the teacher lectures in both slots, counted
// and minimized. Family 3 caps each slot sum at one, so the sums are
// themselves 0/1-valued and no extra OR gadget is needed.
fn spread_objective(model: &mut BoolModel, space: &VariableSpace, catalog: &Catalog) -> Expression {
    let mut penalties: Expression = 0.into();
    let mut pair_count = 0;
    if catalog.slots.len() > 1 {
        for teacher in catalog.teachers {
            for slot in 0..catalog.slots.len() - 1 {
                if !space.teacher_has_candidates(slot, teacher.id)
                    || !space.teacher_has_candidates(slot + 1, teacher.id)
                {
                    continue;
                }
                let here = space.teacher_slot_total(slot, teacher.id);
                let next = space.teacher_slot_total(slot + 1, teacher.id);
                let back_to_back = model.bool_var();
                model.reify_and(back_to_back, here, next);
                penalties += back_to_back;
                pair_count += 1;
            }
        }
    }
    info!("Objective minimizes {pair_count} potential back-to-back teacher pairs.");
    penalties
}

/// Projects chosen assignment keys to display entries through the catalog
/// lookups. Input order is preserved, so sorted keys decode to a sorted
/// timetable.
pub(crate) fn project(assignments: &[AssignmentKey], catalog: &Catalog) -> Vec<TimetableEntry> {
    assignments
        .iter()
        .map(|key| {
            // every key was minted from catalog entries
            let section = catalog.section(key.section).unwrap();
            let subject = catalog.subject(key.subject).unwrap();
            let teacher = catalog.teacher(key.teacher).unwrap();
            let room = catalog.room(key.room).unwrap();
            let slot = &catalog.slots[key.slot];
            TimetableEntry {
                section: section.name.clone(),
                subject: subject.name.clone(),
                teacher: teacher.name.clone(),
                room: room.name.clone(),
                day: slot.day.clone(),
                start_time: slot.start_time.clone(),
                end_time: slot.end_time.clone(),
            }
        })
        .collect()
}

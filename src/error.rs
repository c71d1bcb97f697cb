use thiserror::Error;

/// Everything that can go wrong between receiving a problem instance and
/// handing back a timetable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// The input payload failed validation; no model was built.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The constraint model has no solution.
    #[error("no feasible timetable: {0}")]
    Infeasible(String),

    /// Sequential mode: the named section could not be scheduled against
    /// the slots already committed by earlier sections.
    #[error("no feasible timetable for section '{0}'")]
    SectionInfeasible(String),

    /// The solver stopped without proving feasibility or infeasibility,
    /// e.g. because a wall-clock limit was hit.
    #[error("solver gave up without an answer: {0}")]
    Unresolved(String),

    /// The solver backend itself failed.
    #[error("solver backend failure: {0}")]
    Backend(String),
}

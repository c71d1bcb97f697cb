//! Lecture timetabling over a 0/1 integer programming backend.
//!
//! The crate turns a scheduling instance (teachers, sections, rooms,
//! subjects, weekly lecture slots) into a boolean assignment model,
//! solves it with HiGHS, and decodes the chosen variables back into a
//! timetable. Sections can be scheduled jointly in one model or one at a
//! time with resource claims carried forward between solves.

pub mod data;
pub mod error;
pub mod ledger;
pub mod model;
pub mod sequential;
pub mod server;
pub mod solver;
pub mod space;

pub use data::{SectionRequest, TimetableEntry, TimetableRequest};
pub use error::ScheduleError;
pub use model::SolveOptions;
pub use sequential::schedule_sections;
pub use solver::build_timetable;

//! # Commit Scheduling
//!
//! Pure, synchronous planning of commit batches: the planner turns a date
//! window and activity constraints into a sequence of dated batch skeletons,
//! and the assigner fills those skeletons with grouped work items. Both are
//! fully deterministic when given a seed.

mod assign;
mod planner;

pub use assign::assign;
pub use planner::{schedule, ActiveHours, ScheduleConstraints};

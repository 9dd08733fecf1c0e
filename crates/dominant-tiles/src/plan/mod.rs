//! Section planning
//!
//! This module turns image dimensions, a [`Factor`] and the available
//! hardware concurrency into a [`SectionPlan`]: the worker count and the
//! geometry of the rectangular sections that are scheduled as tasks.

mod error;
mod factor;
mod planner;

pub use error::{Axis, PlanError};
pub use factor::Factor;
pub use planner::{Remainder, Section, SectionPlan};

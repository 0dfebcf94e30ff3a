//! Prep-task inference and generation.
//!
//! [`infer_prep_tasks`] is the pure two-pass analysis of a single recipe;
//! [`generate::PrepTaskGenerator`] drives it against the stores for every
//! chosen option of a finalized plan.

pub mod generate;
mod infer;

pub use infer::{STORAGE_EXPLANATION, infer_prep_tasks};

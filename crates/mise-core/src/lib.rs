//! Core of the mise meal-planning back-end.
//!
//! Four cooperating components:
//! - [`graph`]: lifts a recipe into a DAG of steps with edges for
//!   product-to-ingredient and product-to-instrument flow.
//! - [`prep`]: infers which steps can be performed ahead of a meal event
//!   and derives per-task completion windows.
//! - [`tally`]: aggregates ranked votes per (day, meal-slot) into a winning
//!   option with deterministic tie-breaking.
//! - [`finalizer`]: the periodic control loop that resolves voting on meal
//!   plans whose deadline has passed, commits selections, and publishes
//!   change events.
//!
//! Persistence, HTTP, and delivery infrastructure live behind the traits in
//! [`store`], [`events`], and [`clock`].

pub mod clock;
pub mod config;
pub mod events;
pub mod finalizer;
pub mod graph;
pub mod model;
pub mod prep;
pub mod store;
pub mod tally;

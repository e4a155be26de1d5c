//! # Batch Pipeline
//!
//! The deterministic, resumable part of dataset generation:
//!
//! - [`seed`] - Reproducible per-unit seeds from a unit's identity
//! - [`planner`] - Seeded rotation sequences and their frame-name encoding
//! - [`enumerate`] - Work units from a model manifest or a parametric sweep
//! - [`resume`] - Idempotent skip of units whose output already exists
//! - [`driver`] - Per-unit state machine calling out to the scene collaborators
//!
//! Data flows enumerate → resume → driver, with the driver running
//! seed → planner → pivot rotation for every rendered frame.

pub mod driver;
pub mod enumerate;
pub mod planner;
pub mod resume;
pub mod seed;

//! # Workflows Module
//!
//! High-level entry points tying the engine together into complete
//! procedures.
//!
//! - **Superposition Workflow** ([`superpose`]) - load two structures, build
//!   the correspondence, seed and run the optimizer, and report (optionally
//!   write) the result.

pub mod superpose;

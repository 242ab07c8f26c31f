//! # tmscoring
//!
//! A library for computing the optimal rigid-body superposition between two
//! protein structures and scoring it with either a TM-score or an RMSD
//! objective.
//!
//! ## Architectural Philosophy
//!
//! The library is split into three layers with a strict dependency direction:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Structure`,
//!   `Chain`, `Residue`, `Atom`) and fixed-column PDB I/O.
//!
//! - **[`engine`]: The Logic Core.** Rigid-transform parameterization,
//!   atom-correspondence building, the TM-score/RMSD scoring object, and the
//!   adapter around an injected numerical minimizer.
//!
//! - **[`workflows`]: The Public API.** The end-to-end superposition
//!   procedure: load two structures, establish correspondence, seed and run
//!   the optimizer, and report (or write out) the result.

pub mod core;
pub mod engine;
pub mod workflows;

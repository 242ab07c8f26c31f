//! # Core Models Module
//!
//! Data structures representing a parsed protein structure. The model is
//! deliberately read-only after construction: superposition never edits a
//! structure, it only reads marker-atom coordinates and writes a transformed
//! copy of the source file.
//!
//! ## Key Components
//!
//! - [`atom`] - Individual atom representation (name + coordinates).
//! - [`residue`] - Residue with source-file sequence number, atom lookup by
//!   name, and the one-letter amino-acid projection.
//! - [`structure`] - Chains in native file order and the whole structure.

pub mod atom;
pub mod residue;
pub mod structure;

//! # Core Module
//!
//! Fundamental building blocks for structure superposition: the molecular
//! data model and fixed-column structure-file I/O.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Atoms, residues, chains and
//!   whole structures, read-only after parsing.
//! - **File I/O** ([`io`]) - PDB `ATOM` record parsing and the
//!   byte-column-preserving transformed writer.

pub mod io;
pub mod models;

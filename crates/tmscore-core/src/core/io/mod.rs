//! # File I/O Module
//!
//! Reading structure files into the core data model and writing transformed
//! copies. Parsing is fixed-column: each field lives in a known byte range of
//! the record, and the transformed writer preserves every byte it does not
//! explicitly replace.

pub mod pdb;
pub mod traits;

//! # Engine Module
//!
//! The computational core of superposition: parameterizing rigid transforms,
//! building atom correspondence between two structures, evaluating the
//! TM-score and RMSD objectives, and driving an injected numerical minimizer
//! over the 6-parameter transform space.
//!
//! ## Architecture
//!
//! - **Transforms** ([`transform`]) - 6 scalar parameters to a 4x4
//!   homogeneous matrix, plus the Euler extraction used by the seed guess.
//! - **Correspondence** ([`correspondence`]) - matched homogeneous coordinate
//!   sets from two chains, by shared residue id or by sequence alignment.
//! - **Scoring** ([`scoring`]) - the `Aligning` object owning matched
//!   coordinates, the `d0` scale, and the current-best parameters.
//! - **Minimization** ([`minimizer`]) - the abstract minimizer capability and
//!   its Nelder-Mead production implementation.
//! - **Error Handling** ([`error`]) - engine-specific error types.

pub mod correspondence;
pub mod error;
pub mod minimizer;
pub mod scoring;
pub mod transform;

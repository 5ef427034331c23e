//! tally_core — Core types for the proposal tally engine.
//!
//! This crate is **I/O-free**. It defines the stable types/APIs used across the
//! engine (`tally_algo`, `tally_io`, `tally_pipeline`, `tally_report`, `tally_cli`).
//!
//! - Method tokens: `MethodKind` (single-choice, approval, weighted, quadratic)
//! - Votes and selection shapes: `Vote<S>`, `WeightMap`, `Proposal<S>`, `Ballots`
//! - Output IDs: `TLY:` result ids, 64-hex digests
//! - Ordered summation and matrix helpers
//! - The shared normalization utility (epsilon `1e-7`)
//!
//! Serialization derives are gated behind the `serde` feature.

#![forbid(unsafe_code)]

pub mod errors {
    use core::fmt;

    /// Minimal error set for core-domain parsing.
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub enum CoreError {
        InvalidId,
        InvalidHex,
        UnknownMethod(String),
        InvalidChoiceKey(String),
    }

    impl fmt::Display for CoreError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                CoreError::InvalidId => write!(f, "invalid id"),
                CoreError::InvalidHex => write!(f, "invalid hex"),
                CoreError::UnknownMethod(t) => write!(f, "unknown voting method: {t}"),
                CoreError::InvalidChoiceKey(k) => write!(f, "choice key is not an integer: {k:?}"),
            }
        }
    }

    impl std::error::Error for CoreError {}
}

pub mod ballot;
pub mod determinism;
pub mod ids;
pub mod method;
pub mod normalize;

pub use ballot::{Ballots, Proposal, Vote, WeightMap};
pub use errors::CoreError;
pub use method::MethodKind;

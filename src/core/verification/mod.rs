//! Post-export verification
//!
//! Reads a finalized output directory back and checks that every key a row
//! references was actually written.

pub mod integrity;
pub mod report;

pub use integrity::IntegrityVerifier;
pub use report::{CheckKind, IntegrityFailure, VerificationReport};

//! Canonical forms and hashes of logic functions.
//!
//! An expression is bit-blasted into a reduced ordered BDD ([`Bdd`]) over a
//! sorted variable order, rendered as a canonical `ite(...)` string, and
//! hashed with SHA-256 ([`logic_hash`]). Golden records ([`Golden`]) store
//! those hashes on disk for regression checks.

#![warn(missing_docs)]

pub mod bdd;
pub mod error;
pub mod golden;
pub mod hash;

pub use bdd::{bit_name, Bdd, BddRef};
pub use error::{HashError, HashResult};
pub use golden::{Golden, GoldenInputs, GoldenVerdict};
pub use hash::{
    bit_variables, canonical_string, explain_logic_hash, explain_logic_hash_with_order,
    logic_hash, HashExplanation,
};

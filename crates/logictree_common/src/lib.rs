//! Foundational types shared by every logictree crate.
//!
//! Signal and module names are interned through [`Interner`], source text is
//! fingerprinted with [`ContentHash`], and canonical logic functions are
//! identified by a SHA-256 [`LogicHash`].

#![warn(missing_docs)]

pub mod hash;
pub mod ident;

pub use hash::{ContentHash, LogicHash, ParseHashError};
pub use ident::{Ident, Interner};

//! Rewrites over the logictree IR.
//!
//! The rewrites fall in two groups:
//! 1. **Algebraic**: [`simplify`] and [`to_primitives`] map an expression to
//!    an equivalent one.
//! 2. **Structural**: [`case_to_if`], [`if_to_mux`] and
//!    [`resolve_signal_vars`] change the statement shape or inline
//!    intermediate signals. They check their preconditions and report
//!    [`RewriteError`] when one fails.
//!
//! Expression rewrites can be chained with [`run_passes`] or a
//! [`Pipeline`] built from `[transform]` settings.

#![warn(missing_docs)]

mod rebuild;

pub mod case_to_if;
pub mod error;
pub mod if_to_mux;
pub mod pass;
pub mod primitives;
pub mod resolve;
pub mod simplify;

pub use case_to_if::{case_to_if, case_to_if_map, case_to_if_module, case_to_if_with};
pub use case_to_if::{CaseToIfOptions, Lowered};
pub use error::{RewriteError, RewriteResult};
pub use if_to_mux::if_to_mux;
pub use logictree_config::CaseMode;
pub use pass::{run_passes, ExprPass, Pipeline, PrimitivesPass, ResolvePass, SimplifyPass};
pub use primitives::{to_primitives, to_primitives_stmt};
pub use resolve::{resolve_module, resolve_signal_vars};
pub use simplify::{simplify, simplify_stmt};

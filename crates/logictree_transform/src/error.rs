//! Rewrite preconditions that were not met.

use logictree_ir::IrError;

/// Why a structural rewrite could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RewriteError {
    /// `if_to_mux` needs both branches.
    #[error("`if ({cond})` has no else branch")]
    MissingElse {
        /// The condition, as text.
        cond: String,
    },

    /// Branches or arms assign different left-hand sides.
    #[error("branches assign different targets: `{first}` and `{second}`")]
    MismatchedTargets {
        /// Target of the first branch.
        first: String,
        /// The differing target.
        second: String,
    },

    /// A branch is not a single assignment.
    #[error("expected a single assignment, found {kind}")]
    NotSingleAssign {
        /// Kind of the statement found instead.
        kind: &'static str,
    },

    /// The input is not the statement kind the rewrite works on.
    #[error("expected {expected}, found {found}")]
    WrongKind {
        /// Statement kind the rewrite needs.
        expected: &'static str,
        /// Statement kind received.
        found: &'static str,
    },

    /// `case` with no arms at all.
    #[error("case ({selector}) has no arms")]
    EmptyCase {
        /// The selector, as text.
        selector: String,
    },

    /// Signal definitions refer to each other in a loop.
    #[error("combinational cycle through `{signal}`")]
    Cycle {
        /// One signal on the cycle.
        signal: String,
    },

    /// A definition's width differs from the variable it replaces.
    #[error("`{signal}` is {declared} bits but its definition is {actual} bits")]
    WidthMismatch {
        /// The signal.
        signal: String,
        /// Declared width.
        declared: u32,
        /// Width of the definition.
        actual: u32,
    },

    /// A rebuilt node failed its constructor check.
    #[error(transparent)]
    Ir(#[from] IrError),
}

/// Result alias for rewrites.
pub type RewriteResult<T> = Result<T, RewriteError>;

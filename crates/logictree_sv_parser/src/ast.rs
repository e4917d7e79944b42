//! AST node types for the HDL subset.
//!
//! Every node carries a [`Span`]. Recovery after a syntax error leaves an
//! `Error(Span)` node in place of the broken item, statement or expression,
//! so later passes still see the surrounding structure.
//!
//! Literal text is not copied into the tree: a [`Expr::Literal`] records its
//! [`LiteralKind`] and span, and consumers read the digits back from the
//! source.

use logictree_common::Ident;
use logictree_source::Span;
use serde::{Deserialize, Serialize};

// ============================================================================
// Top-level
// ============================================================================

/// A parsed source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SvSourceFile {
    /// Top-level items in source order.
    pub items: Vec<SvItem>,
    /// Span of the whole file.
    pub span: Span,
}

impl SvSourceFile {
    /// Module declarations in source order.
    pub fn modules(&self) -> impl Iterator<Item = &SvModuleDecl> {
        self.items.iter().filter_map(|item| match item {
            SvItem::Module(m) => Some(m),
            SvItem::Error(_) => None,
        })
    }
}

/// A top-level item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SvItem {
    /// `module ... endmodule`
    Module(SvModuleDecl),
    /// Recovery placeholder.
    Error(Span),
}

// ============================================================================
// Module and ports
// ============================================================================

/// A module declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SvModuleDecl {
    /// Module name.
    pub name: Ident,
    /// How the header lists its ports.
    pub port_style: PortStyle,
    /// ANSI port declarations from the header.
    pub ports: Vec<SvPortDecl>,
    /// Non-ANSI port names from the header.
    pub port_names: Vec<Ident>,
    /// Body items.
    pub items: Vec<ModuleItem>,
    /// Source span.
    pub span: Span,
}

/// Header port list style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortStyle {
    /// `module m(input a, output y);`
    Ansi,
    /// `module m(a, y);` with directions declared in the body.
    NonAnsi,
    /// `module m;` or `module m();`
    Empty,
}

/// Port direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// `input`
    Input,
    /// `output`
    Output,
    /// `inout`
    Inout,
}

/// Net or variable keyword of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetKind {
    /// `wire`
    Wire,
    /// `logic`
    Logic,
    /// `reg`
    Reg,
    /// No keyword given.
    Implicit,
}

/// A port declaration, in the header or in the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SvPortDecl {
    /// Direction.
    pub direction: Direction,
    /// Net keyword.
    pub net: NetKind,
    /// `signed` was given.
    pub signed: bool,
    /// Packed range, if any.
    pub range: Option<Range>,
    /// Names declared.
    pub names: Vec<Ident>,
    /// Source span.
    pub span: Span,
}

/// Packed range `[msb:lsb]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Range {
    /// Left bound.
    pub msb: Expr,
    /// Right bound.
    pub lsb: Expr,
    /// Source span.
    pub span: Span,
}

// ============================================================================
// Module items
// ============================================================================

/// An item in a module body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ModuleItem {
    /// `wire`/`logic`/`reg` declaration.
    NetDecl(NetDecl),
    /// Non-ANSI port declaration.
    PortDecl(SvPortDecl),
    /// `assign target = value;`
    ContinuousAssign(ContinuousAssign),
    /// `always` followed by a statement, usually an event control.
    AlwaysBlock(AlwaysBlock),
    /// `always_comb`
    AlwaysComb(AlwaysBlock),
    /// `always_ff @(...)`
    AlwaysFf(AlwaysFfBlock),
    /// `always_latch`
    AlwaysLatch(AlwaysBlock),
    /// Recovery placeholder.
    Error(Span),
}

impl ModuleItem {
    /// Source span.
    pub fn span(&self) -> Span {
        match self {
            ModuleItem::NetDecl(d) => d.span,
            ModuleItem::PortDecl(d) => d.span,
            ModuleItem::ContinuousAssign(a) => a.span,
            ModuleItem::AlwaysBlock(b) | ModuleItem::AlwaysComb(b) | ModuleItem::AlwaysLatch(b) => {
                b.span
            }
            ModuleItem::AlwaysFf(b) => b.span,
            ModuleItem::Error(span) => *span,
        }
    }
}

/// `wire [3:0] a, b = x;`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetDecl {
    /// Net keyword.
    pub net: NetKind,
    /// `signed` was given.
    pub signed: bool,
    /// Packed range, if any.
    pub range: Option<Range>,
    /// Declared names, each with an optional initializer.
    pub names: Vec<DeclName>,
    /// Source span.
    pub span: Span,
}

/// One name of a [`NetDecl`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeclName {
    /// Declared name.
    pub name: Ident,
    /// `= expr` net declaration assignment.
    pub init: Option<Expr>,
    /// Source span.
    pub span: Span,
}

/// `assign target = value;`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinuousAssign {
    /// Left-hand side.
    pub target: Expr,
    /// Right-hand side.
    pub value: Expr,
    /// Source span.
    pub span: Span,
}

/// An `always`, `always_comb` or `always_latch` block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlwaysBlock {
    /// Body.
    pub body: Statement,
    /// Source span.
    pub span: Span,
}

/// An `always_ff` block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlwaysFfBlock {
    /// Sensitivity list after `@`.
    pub sensitivity: SensitivityList,
    /// Body.
    pub body: Statement,
    /// Source span.
    pub span: Span,
}

/// Sensitivity list of an event control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SensitivityList {
    /// `@*` or `@(*)`
    Star,
    /// `@(a or posedge clk, b)`
    List(Vec<SensitivityItem>),
}

impl SensitivityList {
    /// `true` when no entry carries an edge.
    pub fn is_combinational(&self) -> bool {
        match self {
            SensitivityList::Star => true,
            SensitivityList::List(items) => items.iter().all(|i| i.edge.is_none()),
        }
    }
}

/// One entry of a sensitivity list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityItem {
    /// Edge qualifier.
    pub edge: Option<EdgeKind>,
    /// Signal.
    pub signal: Expr,
    /// Source span.
    pub span: Span,
}

/// `posedge` or `negedge`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeKind {
    /// `posedge`
    Posedge,
    /// `negedge`
    Negedge,
}

// ============================================================================
// Statements
// ============================================================================

/// A procedural statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Statement {
    /// `target = value;`
    Blocking {
        /// Left-hand side.
        target: Expr,
        /// Right-hand side.
        value: Expr,
        /// Source span.
        span: Span,
    },
    /// `target <= value;`
    NonBlocking {
        /// Left-hand side.
        target: Expr,
        /// Right-hand side.
        value: Expr,
        /// Source span.
        span: Span,
    },
    /// `begin [: label] ... end`
    Block {
        /// Block label.
        label: Option<Ident>,
        /// Statements in order.
        stmts: Vec<Statement>,
        /// Source span.
        span: Span,
    },
    /// `if (condition) then_stmt [else else_stmt]`
    If {
        /// Condition.
        condition: Expr,
        /// Taken branch.
        then_stmt: Box<Statement>,
        /// Other branch.
        else_stmt: Option<Box<Statement>>,
        /// Source span.
        span: Span,
    },
    /// `case (expr) arms endcase`
    Case {
        /// `case`, `casez` or `casex`.
        kind: CaseKind,
        /// Selector.
        expr: Expr,
        /// Arms in source order.
        arms: Vec<CaseArm>,
        /// Source span.
        span: Span,
    },
    /// `@(...) body`
    EventControl {
        /// Sensitivity list.
        sensitivity: SensitivityList,
        /// Controlled statement.
        body: Box<Statement>,
        /// Source span.
        span: Span,
    },
    /// `;`
    Null(Span),
    /// Recovery placeholder.
    Error(Span),
}

impl Statement {
    /// Source span.
    pub fn span(&self) -> Span {
        match self {
            Statement::Blocking { span, .. }
            | Statement::NonBlocking { span, .. }
            | Statement::Block { span, .. }
            | Statement::If { span, .. }
            | Statement::Case { span, .. }
            | Statement::EventControl { span, .. } => *span,
            Statement::Null(span) | Statement::Error(span) => *span,
        }
    }
}

/// Flavor of case statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaseKind {
    /// `case`
    Case,
    /// `casez`
    Casez,
    /// `casex`
    Casex,
}

/// One arm of a case statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseArm {
    /// Labels; empty for `default`.
    pub patterns: Vec<Expr>,
    /// `default` arm.
    pub is_default: bool,
    /// Arm body.
    pub body: Statement,
    /// Source span.
    pub span: Span,
}

// ============================================================================
// Expressions
// ============================================================================

/// Literal forms, distinguished by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiteralKind {
    /// Bare decimal.
    Int,
    /// Sized or unsized based literal.
    Based,
    /// `'0`, `'1`, `'x`, `'z`
    Fill,
}

/// An expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expr {
    /// A name.
    Identifier {
        /// The name.
        name: Ident,
        /// Source span.
        span: Span,
    },
    /// A literal; the text is at `span`.
    Literal {
        /// Literal form.
        kind: LiteralKind,
        /// Source span.
        span: Span,
    },
    /// `base[index]`
    Index {
        /// Indexed expression.
        base: Box<Expr>,
        /// Bit index.
        index: Box<Expr>,
        /// Source span.
        span: Span,
    },
    /// `base[msb:lsb]`
    RangeSelect {
        /// Selected expression.
        base: Box<Expr>,
        /// Left bound.
        msb: Box<Expr>,
        /// Right bound.
        lsb: Box<Expr>,
        /// Source span.
        span: Span,
    },
    /// `{a, b, c}`
    Concat {
        /// Parts, most significant first.
        elements: Vec<Expr>,
        /// Source span.
        span: Span,
    },
    /// `{count{a, b}}`
    Repeat {
        /// Replication count.
        count: Box<Expr>,
        /// Replicated parts.
        elements: Vec<Expr>,
        /// Source span.
        span: Span,
    },
    /// Prefix operator.
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        operand: Box<Expr>,
        /// Source span.
        span: Span,
    },
    /// Infix operator.
    Binary {
        /// Left operand.
        left: Box<Expr>,
        /// Operator.
        op: BinaryOp,
        /// Right operand.
        right: Box<Expr>,
        /// Source span.
        span: Span,
    },
    /// `condition ? then_expr : else_expr`
    Ternary {
        /// Selector.
        condition: Box<Expr>,
        /// Value when true.
        then_expr: Box<Expr>,
        /// Value when false.
        else_expr: Box<Expr>,
        /// Source span.
        span: Span,
    },
    /// `(inner)`
    Paren {
        /// Wrapped expression.
        inner: Box<Expr>,
        /// Source span.
        span: Span,
    },
    /// Recovery placeholder.
    Error(Span),
}

impl Expr {
    /// Source span.
    pub fn span(&self) -> Span {
        match self {
            Expr::Identifier { span, .. }
            | Expr::Literal { span, .. }
            | Expr::Index { span, .. }
            | Expr::RangeSelect { span, .. }
            | Expr::Concat { span, .. }
            | Expr::Repeat { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Ternary { span, .. }
            | Expr::Paren { span, .. } => *span,
            Expr::Error(span) => *span,
        }
    }

    /// Strips any number of enclosing parentheses.
    pub fn unparen(&self) -> &Expr {
        let mut e = self;
        while let Expr::Paren { inner, .. } = e {
            e = inner;
        }
        e
    }
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `!`
    LogNot,
    /// `~`
    BitNot,
    /// `&` (reduction)
    RedAnd,
    /// `~&` (reduction)
    RedNand,
    /// `|` (reduction)
    RedOr,
    /// `~|` (reduction)
    RedNor,
    /// `^` (reduction)
    RedXor,
    /// `~^` (reduction)
    RedXnor,
}

impl UnaryOp {
    /// `true` for the reduction operators.
    pub fn is_reduction(self) -> bool {
        !matches!(self, UnaryOp::LogNot | UnaryOp::BitNot)
    }

    /// Source spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::LogNot => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::RedAnd => "&",
            UnaryOp::RedNand => "~&",
            UnaryOp::RedOr => "|",
            UnaryOp::RedNor => "~|",
            UnaryOp::RedXor => "^",
            UnaryOp::RedXnor => "~^",
        }
    }
}

/// Infix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    /// `==`
    Eq,
    /// `!=`
    Neq,
    /// `&&`
    LogAnd,
    /// `||`
    LogOr,
    /// `&`
    BitAnd,
    /// `|`
    BitOr,
    /// `^`
    BitXor,
    /// `~^` or `^~`
    BitXnor,
}

impl BinaryOp {
    /// Source spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Eq => "==",
            BinaryOp::Neq => "!=",
            BinaryOp::LogAnd => "&&",
            BinaryOp::LogOr => "||",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::BitXnor => "~^",
        }
    }
}

//! Lowering of one module declaration.
//!
//! Declarations are bound first, in source order, so assignments may read
//! signals declared further down. Continuous assignments, net initializers
//! and combinational processes are then lowered in order.

use crate::context::LoweringCtx;
use crate::error::{LowerError, LowerResult};
use crate::stmt::{field_of, Flattener};
use logictree_ir::build::{konst, splice, var_ref};
use logictree_ir::{
    Analyzer, Assign, Direction, Module, NodeRef, Port, Stmt, StmtRef, Var, MAX_WIDTH,
};
use logictree_source::Span;
use logictree_sv_parser::ast::{
    self, ModuleItem, NetKind, PortStyle, Range, Statement, SvModuleDecl, SvPortDecl,
};
use logictree_transform::simplify;
use std::collections::{BTreeMap, BTreeSet};

pub(crate) struct ModuleLowerer<'c, 'a> {
    ctx: &'c mut LoweringCtx<'a>,
    module: Module,
    /// Driven bit fields of each signal, with the item driving them.
    driven_at: BTreeMap<String, Vec<(std::ops::Range<u32>, Span)>>,
}

impl<'c, 'a> ModuleLowerer<'c, 'a> {
    pub(crate) fn new(ctx: &'c mut LoweringCtx<'a>, name: &str) -> Self {
        Self {
            ctx,
            module: Module::new(name),
            driven_at: BTreeMap::new(),
        }
    }

    pub(crate) fn lower(mut self, decl: &SvModuleDecl) -> LowerResult<Module> {
        self.bind_declarations(decl)?;
        for item in &decl.items {
            self.lower_item(item)?;
        }
        let ctx = self.ctx;
        let mut module = self.module;
        module.signal_map = std::mem::take(&mut ctx.signal_map);
        module.vector_widths = std::mem::take(&mut ctx.vector_widths);
        module.overlay = std::mem::take(&mut ctx.overlay);
        log::debug!(
            "lowered module `{}`: {} port(s), {} assignment(s), {} process(es)",
            module.name,
            module.ports.len(),
            module.assignments.len(),
            module.processes.len()
        );
        Ok(module)
    }

    // ------------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------------

    fn bind_declarations(&mut self, decl: &SvModuleDecl) -> LowerResult<()> {
        for pd in &decl.ports {
            for name in &pd.names {
                let name = self.ctx.name(*name);
                let port = self.declare_port(pd, name)?;
                self.module.ports.push(port);
            }
        }

        let mut body_ports: BTreeMap<String, Port> = BTreeMap::new();
        // Ports declared without a net type may be given one by a later
        // `wire`/`reg` declaration of the same width.
        let mut untyped: BTreeSet<String> = BTreeSet::new();
        for item in &decl.items {
            match item {
                ModuleItem::PortDecl(pd) => {
                    for name in &pd.names {
                        let name = self.ctx.name(*name);
                        let listed = decl.port_style != PortStyle::Ansi
                            && decl.port_names.iter().any(|p| self.ctx.name(*p) == name);
                        if !listed {
                            return Err(LowerError::Unsupported {
                                what: format!("`{name}` is declared as a port but is not in the port list"),
                                span: pd.span,
                            });
                        }
                        let port = self.declare_port(pd, name)?;
                        if pd.net == NetKind::Implicit {
                            untyped.insert(name.to_string());
                        }
                        body_ports.insert(name.to_string(), port);
                    }
                }
                ModuleItem::NetDecl(nd) => {
                    let (width, range) = self.resolve_range(nd.range.as_ref())?;
                    for dn in &nd.names {
                        let name = self.ctx.name(dn.name);
                        let existing = self.ctx.signal_map.get(name).map(|v| v.width);
                        if existing == Some(width) && untyped.remove(name) {
                            continue;
                        }
                        let var = Var::new(name, width)?.with_signed(nd.signed);
                        self.ctx.declare(var, range, dn.span)?;
                    }
                }
                _ => {}
            }
        }

        for name in &decl.port_names {
            let name = self.ctx.name(*name);
            match body_ports.remove(name) {
                Some(port) => self.module.ports.push(port),
                None => {
                    return Err(LowerError::Unsupported {
                        what: format!("port `{name}` has no direction declaration"),
                        span: decl.span,
                    })
                }
            }
        }
        Ok(())
    }

    fn declare_port(&mut self, pd: &SvPortDecl, name: &str) -> LowerResult<Port> {
        let (width, range) = self.resolve_range(pd.range.as_ref())?;
        let direction = match pd.direction {
            ast::Direction::Input => Direction::Input,
            ast::Direction::Output => Direction::Output,
            ast::Direction::Inout => Direction::Inout,
        };
        let var = Var::new(name, width)?.with_signed(pd.signed);
        self.ctx.declare(var, range, pd.span)?;
        if direction == Direction::Output {
            self.ctx.output_signals.insert(name.to_string());
        }
        Ok(Port {
            name: name.to_string(),
            direction,
            width,
            range,
            signed: pd.signed,
        })
    }

    /// Width and `(msb, lsb)` of an optional packed range.
    fn resolve_range(&self, range: Option<&Range>) -> LowerResult<(u32, Option<(i64, i64)>)> {
        let Some(range) = range else {
            return Ok((1, None));
        };
        let bound = |e: &ast::Expr| -> LowerResult<i64> {
            match self.ctx.constant(e)? {
                Some(v) => Ok(i64::try_from(v).unwrap_or(i64::MAX)),
                None => Err(LowerError::Unsupported {
                    what: format!("range bound `{}` is not a constant", self.ctx.text(e.span())),
                    span: e.span(),
                }),
            }
        };
        let (msb, lsb) = (bound(&range.msb)?, bound(&range.lsb)?);
        let width = msb.abs_diff(lsb).saturating_add(1);
        if width > u64::from(MAX_WIDTH) {
            return Err(LowerError::Unsupported {
                what: format!("vector of {width} bits; at most {MAX_WIDTH} are supported"),
                span: range.span,
            });
        }
        Ok((width as u32, Some((msb, lsb))))
    }

    // ------------------------------------------------------------------------
    // Items
    // ------------------------------------------------------------------------

    fn lower_item(&mut self, item: &ModuleItem) -> LowerResult<()> {
        match item {
            ModuleItem::PortDecl(_) => Ok(()),
            ModuleItem::NetDecl(nd) => {
                for dn in &nd.names {
                    if let Some(init) = &dn.init {
                        let target = ast::Expr::Identifier {
                            name: dn.name,
                            span: dn.span,
                        };
                        self.continuous(&target, init, dn.span)?;
                    }
                }
                Ok(())
            }
            ModuleItem::ContinuousAssign(ca) => self.continuous(&ca.target, &ca.value, ca.span),
            ModuleItem::AlwaysComb(block) => self.process(&block.body),
            ModuleItem::AlwaysBlock(block) => match &block.body {
                Statement::EventControl {
                    sensitivity, body, ..
                } if sensitivity.is_combinational() => self.process(body),
                Statement::EventControl { span, .. } => Err(LowerError::Unsupported {
                    what: "edge-sensitive `always` block".into(),
                    span: *span,
                }),
                other => Err(LowerError::Unsupported {
                    what: "`always` block without a sensitivity list".into(),
                    span: other.span(),
                }),
            },
            ModuleItem::AlwaysFf(block) => Err(LowerError::Unsupported {
                what: "`always_ff` block".into(),
                span: block.span,
            }),
            ModuleItem::AlwaysLatch(block) => Err(LowerError::Unsupported {
                what: "`always_latch` block".into(),
                span: block.span,
            }),
            ModuleItem::Error(span) => Err(LowerError::Unsupported {
                what: "malformed module item".into(),
                span: *span,
            }),
        }
    }

    fn continuous(&mut self, target: &ast::Expr, value: &ast::Expr, span: Span) -> LowerResult<()> {
        let lhs = self.ctx.lower_lvalue(target)?;
        let rhs = self.ctx.lower_expr_to(value, lhs.width())?;
        let written = Assign::new(lhs.clone(), rhs.clone())?;
        let var = written.target().clone();
        let mut driver = Stmt::Assign(written).into_ref();
        let source = self.ctx.text(span).trim().to_string();
        self.ctx.overlay.set_stmt_source(&driver, source.as_str());

        let low = field_of(&lhs);
        let start = low.unwrap_or(0);
        self.claim(&var.name, start..start + lhs.width(), span)?;
        let value = match low {
            None => rhs,
            Some(low) => {
                // Bits no driver has claimed yet read as 0.
                let prior = self
                    .module
                    .assignments
                    .get(&var.name)
                    .map(|a| a.rhs().clone())
                    .unwrap_or_else(|| konst(0, var.width));
                if let Some(previous) = self.module.drivers.get(&var.name) {
                    let sources = self
                        .ctx
                        .overlay
                        .expr_source(NodeRef::Stmt(&**previous))
                        .map(|p| format!("{p}\n{source}"));
                    driver = Stmt::Block(vec![previous.clone(), driver]).into_ref();
                    if let Some(sources) = sources {
                        self.ctx.overlay.set_stmt_source(&driver, sources);
                    }
                }
                splice(&prior, low, &rhs)
            }
        };
        let assign = Assign::new(var_ref(&var), simplify(&value))?;
        self.record(assign, driver)
    }

    fn process(&mut self, body: &Statement) -> LowerResult<()> {
        let Some(stmt) = self.ctx.lower_stmt(body)? else {
            return Ok(());
        };
        self.module.processes.push(stmt.clone());
        for (name, slot) in Flattener::new(self.ctx.case_fallback).run(&stmt) {
            self.claim(&name, 0..slot.lhs.width(), body.span())?;
            let assign = Assign::new(slot.lhs, simplify(&slot.value))?;
            let driver = driver_of(&stmt, &name);
            self.record(assign, driver)?;
        }
        Ok(())
    }

    /// Marks bits `field` of `name` as driven by the item at `span`.
    ///
    /// A process claims every bit of each target it writes; a continuous
    /// assignment claims the bits its target selects.
    fn claim(&mut self, name: &str, field: std::ops::Range<u32>, span: Span) -> LowerResult<()> {
        let fields = self.driven_at.entry(name.to_string()).or_default();
        let overlap = fields
            .iter()
            .find(|(f, _)| f.start < field.end && field.start < f.end);
        if let Some((_, previous)) = overlap {
            return Err(LowerError::MultipleDrivers {
                name: name.to_string(),
                span,
                previous: *previous,
            });
        }
        fields.push((field, span));
        Ok(())
    }

    fn record(&mut self, assign: Assign, driver: StmtRef) -> LowerResult<()> {
        let key = assign.target().name.clone();
        log::trace!("{key} = {}", assign.rhs());
        let source = self
            .ctx
            .overlay
            .expr_source(NodeRef::Stmt(&*driver))
            .map(str::to_string);
        if let Some(source) = source {
            self.ctx.overlay.set_expr_source(assign.rhs(), source);
        }
        self.module.drivers.insert(key.clone(), driver);
        self.module.assignments.insert(key, assign);
        Ok(())
    }
}

/// The statement of a process that drives `target`: the only top-level
/// statement writing it, or the whole body.
fn driver_of(body: &StmtRef, target: &str) -> StmtRef {
    if let Stmt::Block(stmts) = &**body {
        let mut writers = stmts.iter().filter(|s| {
            Analyzer::new()
                .writes(s)
                .iter()
                .any(|v| v.name == target)
        });
        if let (Some(only), None) = (writers.next(), writers.next()) {
            return only.clone();
        }
    }
    body.clone()
}

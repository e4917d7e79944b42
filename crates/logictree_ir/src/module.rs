//! Lowered modules.

use crate::analysis::{expr_free_vars, VarSet};
use crate::overlay::Overlay;
use crate::stmt::{Assign, StmtRef};
use crate::expr::Var;
use std::collections::BTreeMap;
use std::fmt;

/// Port direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// `input`
    Input,
    /// `output`
    Output,
    /// `inout`
    Inout,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Input => "input",
            Direction::Output => "output",
            Direction::Inout => "inout",
        })
    }
}

/// A module port.
#[derive(Clone, Debug, PartialEq)]
pub struct Port {
    /// Port name.
    pub name: String,
    /// Direction.
    pub direction: Direction,
    /// Width in bits.
    pub width: u32,
    /// Declared `[msb:lsb]`, if any.
    pub range: Option<(i64, i64)>,
    /// Declared signed.
    pub signed: bool,
}

impl Port {
    /// The port as a variable.
    pub fn var(&self) -> Var {
        Var {
            name: self.name.clone(),
            width: self.width,
            signed: self.signed,
        }
    }
}

/// One lowered module.
#[derive(Clone, Debug, Default)]
pub struct Module {
    /// Module name.
    pub name: String,
    /// Ports in declaration order.
    pub ports: Vec<Port>,
    /// Every declared signal.
    pub signal_map: BTreeMap<String, Var>,
    /// Declared `[msb:lsb]` of vector signals.
    pub vector_widths: BTreeMap<String, (i64, i64)>,
    /// Combinational right-hand side of every driven signal, keyed by the
    /// signal name. Writes to a select are folded into the whole signal.
    pub assignments: BTreeMap<String, Assign>,
    /// The statement that drives each signal as written in the source.
    pub drivers: BTreeMap<String, StmtRef>,
    /// Procedural block bodies in source order.
    pub processes: Vec<StmtRef>,
    /// Labels and source text recorded during lowering.
    pub overlay: Overlay,
}

impl Module {
    /// Creates an empty module.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Output ports in declaration order.
    pub fn outputs(&self) -> impl Iterator<Item = &Port> {
        self.ports.iter().filter(|p| p.direction == Direction::Output)
    }

    /// Input ports in declaration order.
    pub fn inputs(&self) -> impl Iterator<Item = &Port> {
        self.ports.iter().filter(|p| p.direction == Direction::Input)
    }

    /// Output port names in declaration order.
    pub fn output_names(&self) -> Vec<String> {
        self.outputs().map(|p| p.name.clone()).collect()
    }

    /// Input port names in declaration order.
    pub fn declared_inputs(&self) -> Vec<String> {
        self.inputs().map(|p| p.name.clone()).collect()
    }

    /// The assignment driving `name`.
    pub fn get_output(&self, name: &str) -> Option<&Assign> {
        self.assignments.get(name)
    }

    /// Assignments for the requested signals, or for every output port
    /// (then any other assignment) when `names` is empty.
    pub fn selected_outputs(&self, names: &[String]) -> Vec<(&str, &Assign)> {
        if names.is_empty() {
            let outputs = self.output_names();
            let mut picked: Vec<(&str, &Assign)> = self
                .assignments
                .iter()
                .filter(|(k, _)| outputs.contains(k))
                .map(|(k, a)| (k.as_str(), a))
                .collect();
            if picked.is_empty() {
                picked = self.assignments.iter().map(|(k, a)| (k.as_str(), a)).collect();
            }
            return picked;
        }
        names
            .iter()
            .filter_map(|n| self.assignments.get_key_value(n.as_str()))
            .map(|(k, a)| (k.as_str(), a))
            .collect()
    }

    /// Variables read by any assignment.
    pub fn free_vars(&self) -> VarSet {
        self.assignments
            .values()
            .flat_map(|a| expr_free_vars(a.rhs()))
            .collect()
    }
}

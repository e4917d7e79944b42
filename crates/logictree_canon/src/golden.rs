//! Golden hash records.
//!
//! A golden file pins the canonical function of one output so later runs
//! can detect logic changes. Files are pretty-printed JSON:
//!
//! ```json
//! {
//!   "name": "mux2",
//!   "hash": "3f1c…",
//!   "expr": "ite(s, ite(b, TRUE, FALSE), ite(a, TRUE, FALSE))",
//!   "inputs": { "flat": ["a", "b", "s"], "decl": ["s", "a", "b"] }
//! }
//! ```

use crate::error::HashResult;
use crate::hash::explain_logic_hash;
use logictree_common::LogicHash;
use logictree_ir::{expr_free_vars, Expr};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Inputs read by the recorded expression.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldenInputs {
    /// Sorted signal names.
    pub flat: Vec<String>,
    /// The same names in declaration order.
    pub decl: Vec<String>,
}

/// One golden record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Golden {
    /// Record name; also the file stem.
    pub name: String,
    /// Logic hash of `expr`.
    pub hash: LogicHash,
    /// Canonical BDD string.
    pub expr: String,
    /// Inputs read.
    pub inputs: GoldenInputs,
}

/// Outcome of comparing a fresh record against a stored one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GoldenVerdict {
    /// Same inputs, same function.
    Match,
    /// Same inputs, different function.
    HashMismatch {
        /// Stored hash.
        expected: LogicHash,
        /// Fresh hash.
        actual: LogicHash,
    },
    /// The set of inputs differs.
    InputsChanged {
        /// Stored inputs.
        expected: Vec<String>,
        /// Fresh inputs.
        actual: Vec<String>,
    },
}

impl GoldenVerdict {
    /// `true` for [`GoldenVerdict::Match`].
    pub fn is_match(&self) -> bool {
        matches!(self, GoldenVerdict::Match)
    }
}

impl fmt::Display for GoldenVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoldenVerdict::Match => f.write_str("match"),
            GoldenVerdict::HashMismatch { expected, actual } => {
                write!(f, "hash mismatch: expected {expected}, got {actual}")
            }
            GoldenVerdict::InputsChanged { expected, actual } => write!(
                f,
                "inputs changed: expected [{}], got [{}]",
                expected.join(", "),
                actual.join(", ")
            ),
        }
    }
}

impl Golden {
    /// Records `expr` under `name`.
    ///
    /// `decl_order` lists signal names in declaration order; names the
    /// expression does not read are dropped, and names it reads but
    /// `decl_order` misses are appended in sorted order.
    pub fn capture(name: &str, expr: &Expr, decl_order: &[String]) -> HashResult<Self> {
        let explained = explain_logic_hash(expr)?;
        let flat: Vec<String> = expr_free_vars(expr).into_iter().map(|v| v.name).collect();
        let mut decl: Vec<String> = decl_order
            .iter()
            .filter(|n| flat.contains(n))
            .cloned()
            .collect();
        for n in &flat {
            if !decl.contains(n) {
                decl.push(n.clone());
            }
        }
        Ok(Self {
            name: name.to_string(),
            hash: explained.hash,
            expr: explained.canonical,
            inputs: GoldenInputs { flat, decl },
        })
    }

    /// Pretty-printed JSON.
    pub fn to_json_string(&self) -> HashResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a record.
    pub fn from_json_str(json: &str) -> HashResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// `<dir>/<name>.json`
    pub fn path_in(dir: &Path, name: &str) -> PathBuf {
        dir.join(format!("{name}.json"))
    }

    /// Writes the record to `<dir>/<name>.json`, creating `dir` if needed.
    pub fn save(&self, dir: &Path) -> HashResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = Self::path_in(dir, &self.name);
        std::fs::write(&path, self.to_json_string()? + "\n")?;
        log::info!("saved golden record `{}` to {}", self.name, path.display());
        Ok(path)
    }

    /// Reads a record from a file.
    pub fn load(path: &Path) -> HashResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Compares `self` (fresh) against `stored`.
    pub fn compare(&self, stored: &Golden) -> GoldenVerdict {
        if self.inputs.flat != stored.inputs.flat {
            return GoldenVerdict::InputsChanged {
                expected: stored.inputs.flat.clone(),
                actual: self.inputs.flat.clone(),
            };
        }
        if self.hash != stored.hash {
            return GoldenVerdict::HashMismatch {
                expected: stored.hash,
                actual: self.hash,
            };
        }
        GoldenVerdict::Match
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logictree_ir::build::*;

    fn decl(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn capture_orders_inputs() {
        let e = or(and(var("s"), var("b")), and(not(var("s")), var("a")));
        let g = Golden::capture("mux2", &e, &decl(&["s", "a", "b", "y"])).unwrap();
        assert_eq!(g.inputs.flat, ["a", "b", "s"]);
        assert_eq!(g.inputs.decl, ["s", "a", "b"]);
        assert_eq!(g.hash, LogicHash::of_str(&g.expr));
    }

    #[test]
    fn json_field_names_and_round_trip() {
        let g = Golden::capture("and2", &and(var("a"), var("b")), &[]).unwrap();
        let text = g.to_json_string().unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["name"], "and2");
        assert_eq!(value["hash"].as_str().unwrap().len(), 64);
        assert_eq!(value["inputs"]["flat"][1], "b");
        assert_eq!(Golden::from_json_str(&text).unwrap(), g);
    }

    #[test]
    fn verdicts() {
        let base = Golden::capture("y", &and(var("a"), var("b")), &[]).unwrap();
        let same = Golden::capture("y", &and(var("b"), var("a")), &[]).unwrap();
        let other = Golden::capture("y", &or(var("a"), var("b")), &[]).unwrap();
        let wider = Golden::capture("y", &and(var("a"), var("c")), &[]).unwrap();
        assert!(same.compare(&base).is_match());
        assert!(matches!(other.compare(&base), GoldenVerdict::HashMismatch { .. }));
        assert!(matches!(wider.compare(&base), GoldenVerdict::InputsChanged { .. }));
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let g = Golden::capture("xor2", &xor(var("a"), var("b")), &[]).unwrap();
        let path = g.save(&dir.path().join("golden_hashes")).unwrap();
        assert!(path.ends_with("golden_hashes/xor2.json"));
        assert_eq!(Golden::load(&path).unwrap(), g);
    }

    #[test]
    fn malformed_record_is_an_error() {
        assert!(Golden::from_json_str("{\"name\": 3}").is_err());
    }
}

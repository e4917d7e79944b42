//! Interned names for signals, modules and block labels.

use lasso::ThreadedRodeo;
use serde::{Deserialize, Serialize};

/// A handle to a name stored in an [`Interner`].
///
/// The parser interns every identifier it sees, so AST nodes carry a `u32`
/// instead of an owned string. Comparing two handles from the same interner
/// is a single integer compare.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct Ident(u32);

impl Ident {
    /// Builds a handle from its raw index. Intended for tests.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// The raw index behind this handle.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

// SAFETY: the key round-trips through `usize` losslessly; `try_from_usize`
// refuses indices that would not fit the inner `u32`.
unsafe impl lasso::Key for Ident {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn try_from_usize(int: usize) -> Option<Self> {
        u32::try_from(int).ok().map(Ident)
    }
}

/// Thread-safe string interner shared by the parser and the lowerer.
pub struct Interner {
    rodeo: ThreadedRodeo<Ident>,
}

impl Interner {
    /// Creates an empty interner.
    pub fn new() -> Self {
        Self {
            rodeo: ThreadedRodeo::new(),
        }
    }

    /// Interns `s`, reusing the existing handle when it was seen before.
    pub fn get_or_intern(&self, s: &str) -> Ident {
        self.rodeo.get_or_intern(s)
    }

    /// Returns the string behind `ident`.
    ///
    /// # Panics
    ///
    /// Panics if `ident` came from a different interner.
    pub fn resolve(&self, ident: Ident) -> &str {
        self.rodeo.resolve(&ident)
    }

    /// Looks up `s` without interning it.
    pub fn get(&self, s: &str) -> Option<Ident> {
        self.rodeo.get(s)
    }

    /// Number of distinct strings interned so far.
    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    /// Returns `true` if nothing has been interned.
    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_interned_name() {
        let interner = Interner::new();
        let id = interner.get_or_intern("sel");
        assert_eq!(interner.resolve(id), "sel");
    }

    #[test]
    fn repeated_names_share_a_handle() {
        let interner = Interner::new();
        let a = interner.get_or_intern("data_in");
        let b = interner.get_or_intern("data_in");
        assert_eq!(a, b);
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn lookup_does_not_intern() {
        let interner = Interner::new();
        assert!(interner.get("y").is_none());
        assert!(interner.is_empty());
        let y = interner.get_or_intern("y");
        assert_eq!(interner.get("y"), Some(y));
    }

    #[test]
    fn handle_serializes_as_index() {
        let id = Ident::from_raw(7);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "7");
        let back: Ident = serde_json::from_str(&json).unwrap();
        assert_eq!(back.as_raw(), 7);
    }
}

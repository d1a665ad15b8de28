//! Name and string-literal interning.
//!
//! Property names, parameter names, class and slot names and string literal
//! values share one pool and travel as `Atom`s.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::Arc;

/// Handle to an interned string. Atom 0 is the empty string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Default, PartialOrd, Ord)]
pub struct Atom(pub u32);

impl Atom {
    pub const NONE: Atom = Atom(0);

    #[inline]
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Path roots and parameter names the engine spells itself.
const ENGINE_NAMES: &[&str] = &["arguments", "value", "this", "rest"];

/// Append-only string pool.
///
/// ```
/// use flowguard_common::interner::Interner;
/// let mut interner = Interner::new();
/// let name = interner.intern("name");
/// assert_eq!(interner.intern("name"), name);
/// assert_eq!(interner.resolve(name), "name");
/// ```
#[derive(Default)]
pub struct Interner {
    atoms: FxHashMap<Arc<str>, Atom>,
    strings: Vec<Arc<str>>,
}

impl Interner {
    pub fn new() -> Self {
        let mut interner = Interner::default();
        interner.intern("");
        interner
    }

    pub fn intern(&mut self, s: &str) -> Atom {
        if let Some(&atom) = self.atoms.get(s) {
            return atom;
        }
        let atom = Atom(self.strings.len() as u32);
        let shared: Arc<str> = Arc::from(s);
        self.atoms.insert(Arc::clone(&shared), atom);
        self.strings.push(shared);
        atom
    }

    /// Lookup without inserting.
    pub fn get(&self, s: &str) -> Option<Atom> {
        self.atoms.get(s).copied()
    }

    /// Unknown atoms resolve to the empty string.
    pub fn resolve(&self, atom: Atom) -> &str {
        self.strings.get(atom.0 as usize).map_or("", |s| s)
    }

    pub fn resolve_arc(&self, atom: Atom) -> Arc<str> {
        match self.strings.get(atom.0 as usize) {
            Some(s) => Arc::clone(s),
            None => Arc::from(""),
        }
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Only the empty string is interned.
    pub fn is_empty(&self) -> bool {
        self.strings.len() <= 1
    }

    /// Intern the names the engine uses for paths so they get low, stable
    /// atoms in every context.
    pub fn intern_common(&mut self) {
        for name in ENGINE_NAMES {
            self.intern(name);
        }
    }
}

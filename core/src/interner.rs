//! Identifier interning.
//!
//! Every identifier read by the parser or bound by `def`/`let`/`fn` is stored
//! once in a process-wide interner, so scopes can key their maps on a small
//! `Copy` handle instead of owned strings.

use once_cell::sync::Lazy;
use std::fmt;
use std::sync::{PoisonError, RwLock};
use string_interner::{DefaultBackend, DefaultSymbol, StringInterner};

static INTERNER: Lazy<RwLock<StringInterner<DefaultBackend>>> =
    Lazy::new(|| RwLock::new(StringInterner::default()));

/// An identifier name interned in the global string interner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InternedSymbol(DefaultSymbol);

impl InternedSymbol {
    /// Intern a string and return its symbol
    pub fn new(s: &str) -> Self {
        let mut interner = INTERNER.write().unwrap_or_else(PoisonError::into_inner);
        InternedSymbol(interner.get_or_intern(s))
    }

    /// Resolve the symbol back to an owned string
    pub fn resolve(&self) -> String {
        self.with_str(str::to_owned)
    }

    /// Run `f` on the symbol's text without allocating
    pub fn with_str<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&str) -> R,
    {
        let interner = INTERNER.read().unwrap_or_else(PoisonError::into_inner);
        // Symbols are only ever produced by `new`, so resolution cannot miss.
        f(interner.resolve(self.0).unwrap_or_default())
    }

    /// Whether this symbol spells `name`
    pub fn is(&self, name: &str) -> bool {
        self.with_str(|s| s == name)
    }
}

impl From<&str> for InternedSymbol {
    fn from(s: &str) -> Self {
        InternedSymbol::new(s)
    }
}

impl fmt::Display for InternedSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_str(|s| write!(f, "{s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_same_string_returns_same_symbol() {
        assert_eq!(InternedSymbol::new("head"), InternedSymbol::new("head"));
    }

    #[test]
    fn test_intern_different_strings_returns_different_symbols() {
        assert_ne!(InternedSymbol::new("head"), InternedSymbol::new("tail"));
    }

    #[test]
    fn test_resolve_and_display() {
        let sym = InternedSymbol::new("add-mul");
        assert_eq!(sym.resolve(), "add-mul");
        assert_eq!(format!("{sym}"), "add-mul");
        assert!(sym.is("add-mul"));
        assert!(!sym.is("add"));
    }
}

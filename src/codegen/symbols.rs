//! Names known to be Python variables at a given point in a translation.
//!
//! The table decides whether a bare word in an action phrase is emitted as
//! an identifier or as a string literal: `print total` prints the variable
//! when `total` has been bound, the text `"total"` otherwise.

use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    names: BTreeSet<String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn extend<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(names.into_iter().map(Into::into));
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for SymbolTable {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_lookup() {
        let mut t = SymbolTable::new();
        assert!(t.is_empty());
        t.define("x");
        t.extend(["y", "x"]);
        assert!(t.contains("x"));
        assert!(!t.contains("z"));
        assert_eq!(t.names().collect::<Vec<_>>(), ["x", "y"]);
    }
}

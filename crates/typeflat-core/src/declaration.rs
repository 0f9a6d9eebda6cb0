//! Discovered declarations and the ordered, deduplicated set that holds them

use crate::fingerprint::Fingerprint;
use serde::Serialize;
use std::collections::HashMap;

/// Index of a declaration in its [`DeclarationSet`], in discovery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DeclarationId(usize);

impl DeclarationId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A type-level entity found during the graph walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    /// Module the declaration came from, as reported by the resolver
    pub source_location: String,
    /// Name as written at the declaration site
    pub original_name: String,
    /// Whether the source module exports it
    pub is_exported: bool,
    /// Verbatim declaration text, used for identity and emission
    pub raw_text: String,
}

impl Declaration {
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(&self.raw_text)
    }
}

/// Insertion-ordered arena of declarations, unique by text.
///
/// The first declaration recorded for a given text wins; later ones with the
/// same text are rejected by [`DeclarationSet::insert`].
#[derive(Debug, Clone, Default)]
pub struct DeclarationSet {
    declarations: Vec<Declaration>,
    by_fingerprint: HashMap<Fingerprint, DeclarationId>,
}

impl DeclarationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a declaration, returning its id, or `None` if a declaration
    /// with identical text is already present.
    pub fn insert(&mut self, declaration: Declaration) -> Option<DeclarationId> {
        let fingerprint = declaration.fingerprint();
        if self.by_fingerprint.contains_key(&fingerprint) {
            return None;
        }
        let id = DeclarationId(self.declarations.len());
        self.declarations.push(declaration);
        self.by_fingerprint.insert(fingerprint, id);
        Some(id)
    }

    pub fn contains_text(&self, text: &str) -> bool {
        self.by_fingerprint.contains_key(&Fingerprint::of(text))
    }

    pub fn id_of_text(&self, text: &str) -> Option<DeclarationId> {
        self.by_fingerprint.get(&Fingerprint::of(text)).copied()
    }

    pub fn get(&self, id: DeclarationId) -> Option<&Declaration> {
        self.declarations.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Declarations with their ids, in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (DeclarationId, &Declaration)> {
        self.declarations
            .iter()
            .enumerate()
            .map(|(idx, decl)| (DeclarationId(idx), decl))
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub fn original_names(&self) -> Vec<&str> {
        self.declarations
            .iter()
            .map(|d| d.original_name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl(name: &str, text: &str) -> Declaration {
        Declaration {
            source_location: "/routes/a.d.ts".to_string(),
            original_name: name.to_string(),
            is_exported: true,
            raw_text: text.to_string(),
        }
    }

    #[test]
    fn test_insert_preserves_order() {
        let mut set = DeclarationSet::new();
        set.insert(decl("B", "interface B {}"));
        set.insert(decl("A", "interface A {}"));
        assert_eq!(set.original_names(), vec!["B", "A"]);
    }

    #[test]
    fn test_identical_text_collapses() {
        let mut set = DeclarationSet::new();
        let first = set.insert(decl("A", "interface A {}"));
        let second = set.insert(decl("A", "interface A {}"));
        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(set.len(), 1);
        assert_eq!(set.id_of_text("interface A {}"), first);
    }

    #[test]
    fn test_same_name_different_text_kept() {
        let mut set = DeclarationSet::new();
        set.insert(decl("Config", "interface Config { a: string }"));
        set.insert(decl("Config", "interface Config { b: number }"));
        assert_eq!(set.len(), 2);
        assert!(set.contains_text("interface Config { b: number }"));
    }
}

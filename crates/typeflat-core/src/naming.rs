//! Name resolution for emitted declarations.
//!
//! Every declaration keeps its original name unless an earlier declaration in
//! discovery order already took it. Later claimants get the first free
//! `{name}{n}` with `n` counting up from 2 per original name. Bindings are
//! append-only, so re-running over the same discovery order reproduces the
//! same renames.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::declaration::{DeclarationId, DeclarationSet};
use crate::debug::RenameRecord;

/// First suffix tried for a colliding name.
const FIRST_SUFFIX: u32 = 2;

/// Emitted names for one file's declarations, indexed by [`DeclarationId`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameBinding {
    names: Vec<String>,
    renames: Vec<RenameRecord>,
}

impl NameBinding {
    pub fn emitted_name(&self, id: DeclarationId) -> Option<&str> {
        self.names.get(id.index()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Emitted names in discovery order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Declarations whose emitted name differs from their original name.
    pub fn renames(&self) -> &[RenameRecord] {
        &self.renames
    }
}

/// Assign a unique emitted name to every declaration, in discovery order.
pub fn resolve(declarations: &DeclarationSet) -> NameBinding {
    let mut used: HashSet<String> = HashSet::with_capacity(declarations.len());
    let mut next_suffix: HashMap<&str, u32> = HashMap::new();
    let mut binding = NameBinding {
        names: Vec::with_capacity(declarations.len()),
        renames: Vec::new(),
    };

    for (_, declaration) in declarations.iter() {
        let original = declaration.original_name.as_str();
        let emitted = if used.contains(original) {
            let counter = next_suffix.entry(original).or_insert(FIRST_SUFFIX);
            let mut candidate = format!("{}{}", original, counter);
            while used.contains(&candidate) {
                *counter += 1;
                candidate = format!("{}{}", original, counter);
            }
            *counter += 1;
            debug!(
                module = %declaration.source_location,
                original,
                emitted = %candidate,
                "renamed colliding declaration"
            );
            binding.renames.push(RenameRecord {
                module: declaration.source_location.clone(),
                original_name: original.to_string(),
                emitted_name: candidate.clone(),
            });
            candidate
        } else {
            original.to_string()
        };
        used.insert(emitted.clone());
        binding.names.push(emitted);
    }

    binding
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::Declaration;

    fn set_of(entries: &[(&str, &str)]) -> DeclarationSet {
        let mut set = DeclarationSet::new();
        for (name, text) in entries {
            set.insert(Declaration {
                source_location: "/routes/x.d.ts".to_string(),
                original_name: name.to_string(),
                is_exported: true,
                raw_text: text.to_string(),
            });
        }
        set
    }

    #[test]
    fn test_unique_names_unchanged() {
        let set = set_of(&[("User", "interface User {}"), ("Address", "interface Address {}")]);
        let binding = resolve(&set);
        assert_eq!(binding.names(), &["User".to_string(), "Address".to_string()]);
        assert!(binding.renames().is_empty());
    }

    #[test]
    fn test_collision_gets_counter_suffix() {
        let set = set_of(&[
            ("Config", "interface Config { a: string }"),
            ("Config", "interface Config { b: string }"),
            ("Config", "interface Config { c: string }"),
        ]);
        let binding = resolve(&set);
        assert_eq!(binding.names(), &["Config", "Config2", "Config3"]);
        assert_eq!(binding.renames().len(), 2);
        assert_eq!(binding.renames()[0].emitted_name, "Config2");
    }

    #[test]
    fn test_generated_name_never_shadows_real_one() {
        let set = set_of(&[
            ("Foo", "interface Foo { a: 1 }"),
            ("Foo2", "interface Foo2 {}"),
            ("Foo", "interface Foo { b: 2 }"),
            ("Foo2", "interface Foo2 { c: 3 }"),
        ]);
        let binding = resolve(&set);
        assert_eq!(binding.names(), &["Foo", "Foo2", "Foo3", "Foo22"]);
    }

    #[test]
    fn test_lookup_by_id() {
        let set = set_of(&[("A", "type A = string"), ("A", "type A = number")]);
        let binding = resolve(&set);
        let ids: Vec<_> = set.iter().map(|(id, _)| id).collect();
        assert_eq!(binding.emitted_name(ids[1]), Some("A2"));
    }
}

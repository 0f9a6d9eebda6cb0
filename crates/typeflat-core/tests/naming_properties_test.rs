//! Property tests for the name resolver

use proptest::prelude::*;
use std::collections::HashSet;
use typeflat_core::{naming, Declaration, DeclarationSet};

fn declaration_set(entries: &[(String, u8)]) -> DeclarationSet {
    let mut set = DeclarationSet::new();
    for (name, body) in entries {
        set.insert(Declaration {
            source_location: format!("/routes/{}.d.ts", body),
            original_name: name.clone(),
            is_exported: body % 2 == 0,
            raw_text: format!("interface {} {{ v{}: string }}", name, body),
        });
    }
    set
}

fn entries() -> impl Strategy<Value = Vec<(String, u8)>> {
    // A small name pool forces collisions, including names like `Foo2`.
    let name = prop_oneof![
        Just("Foo".to_string()),
        Just("Foo2".to_string()),
        Just("Foo3".to_string()),
        Just("Bar".to_string()),
        Just("Config".to_string()),
    ];
    prop::collection::vec((name, 0u8..16), 0..40)
}

proptest! {
    #[test]
    fn emitted_names_are_pairwise_distinct(entries in entries()) {
        let set = declaration_set(&entries);
        let binding = naming::resolve(&set);

        prop_assert_eq!(binding.len(), set.len());
        let unique: HashSet<&String> = binding.names().iter().collect();
        prop_assert_eq!(unique.len(), binding.len());
    }

    #[test]
    fn first_claimant_keeps_its_name(entries in entries()) {
        let set = declaration_set(&entries);
        let binding = naming::resolve(&set);

        let mut seen = HashSet::new();
        for (id, declaration) in set.iter() {
            let emitted = binding.emitted_name(id).unwrap();
            if seen.insert(declaration.original_name.clone()) && emitted != declaration.original_name {
                // Only a name generated for an earlier collision can take it.
                prop_assert!(binding.renames().iter().any(|r| r.emitted_name == declaration.original_name));
            }
            prop_assert!(emitted.starts_with(declaration.original_name.as_str()));
        }
    }

    #[test]
    fn renaming_is_reproducible(entries in entries()) {
        let first = naming::resolve(&declaration_set(&entries));
        let second = naming::resolve(&declaration_set(&entries));
        prop_assert_eq!(first, second);
    }
}

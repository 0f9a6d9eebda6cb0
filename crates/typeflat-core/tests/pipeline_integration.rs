//! Integration tests for the collect → name → plan pipeline over fixture graphs

use pretty_assertions::assert_eq;
use typeflat_core::debug::{FileTrace, TraceEvent};
use typeflat_core::{
    collect, naming, process_file, process_file_traced, CollectOptions, FlattenConfig,
    FlattenError, PathMapping, UnsupportedPolicy,
};
use typeflat_test_fixtures::{fixture, FixtureType, DEFAULT_ROOT};

fn config() -> FlattenConfig {
    FlattenConfig::new(PathMapping::new(DEFAULT_ROOT, "/src/"))
}

#[test]
fn test_scenario_a_member_reference() -> Result<(), Box<dyn std::error::Error>> {
    let fx = fixture(FixtureType::ScenarioA);
    let set = collect(&fx.entry_points, &fx.graph, &CollectOptions::default())?;
    assert_eq!(set.original_names(), vec!["User", "Address"]);

    let plan = process_file(&fx.entry_points, &fx.graph, &config())?;
    let imports: Vec<String> = plan.imports().map(|i| i.to_string()).collect();
    assert_eq!(
        imports,
        vec![
            "import { User as User } from '/src/user';".to_string(),
            "import { Address as Address } from '/src/address';".to_string(),
        ]
    );
    Ok(())
}

#[test]
fn test_scenario_b_collision_renamed_with_provenance() -> Result<(), Box<dyn std::error::Error>> {
    let fx = fixture(FixtureType::ScenarioB);
    let plan = process_file(&fx.entry_points, &fx.graph, &config())?;

    let names: Vec<(&str, &str)> = plan
        .blocks()
        .iter()
        .map(|b| (b.original_name.as_str(), b.emitted_name.as_str()))
        .collect();
    assert_eq!(
        names,
        vec![
            ("Route", "Route"),
            ("Client", "Client"),
            ("Config", "Config"),
            ("Server", "Server"),
            ("Config", "Config2"),
        ]
    );

    let server_config = &plan.blocks()[4];
    assert_eq!(
        server_config.source_location,
        format!("{}/server.d.ts", DEFAULT_ROOT)
    );
    assert!(!server_config.is_exported);
    assert!(server_config.import.is_none());
    assert!(server_config
        .header_lines()
        .contains(&"// Emitted name: Config2".to_string()));
    Ok(())
}

#[test]
fn test_scenario_c_primitive_alias() -> Result<(), Box<dyn std::error::Error>> {
    let fx = fixture(FixtureType::ScenarioC);
    let mut trace = FileTrace::new(&fx.file);
    let plan = process_file_traced(&fx.entry_points, &fx.graph, &config(), &mut trace)?;

    assert_eq!(plan.len(), 1);
    assert_eq!(plan.blocks()[0].text, "export type Id = string;");
    // The alias itself is exported; its string target brings in nothing.
    assert_eq!(plan.imports().count(), 1);
    assert_eq!(trace.recorded_count(), 1);
    Ok(())
}

#[test]
fn test_heritage_base_is_inlined() -> Result<(), Box<dyn std::error::Error>> {
    let fx = fixture(FixtureType::Heritage);
    let set = collect(&fx.entry_points, &fx.graph, &CollectOptions::default())?;
    assert_eq!(set.original_names(), vec!["three", "Hello3"]);
    Ok(())
}

#[test]
fn test_index_signature_value_is_inlined() -> Result<(), Box<dyn std::error::Error>> {
    let fx = fixture(FixtureType::IndexSignature);
    let set = collect(&fx.entry_points, &fx.graph, &CollectOptions::default())?;
    assert_eq!(set.original_names(), vec!["two", "Hello2"]);
    Ok(())
}

#[test]
fn test_cycle_records_each_once() -> Result<(), Box<dyn std::error::Error>> {
    let fx = fixture(FixtureType::Cycle);
    let set = collect(&fx.entry_points, &fx.graph, &CollectOptions::default())?;
    assert_eq!(set.original_names(), vec!["A", "B"]);
    Ok(())
}

#[test]
fn test_structurally_equal_declarations_collapse() -> Result<(), Box<dyn std::error::Error>> {
    let fx = fixture(FixtureType::SharedReference);
    let set = collect(&fx.entry_points, &fx.graph, &CollectOptions::default())?;
    assert_eq!(set.original_names(), vec!["Order", "Customer", "Invoice"]);

    // First discovery wins: the copy reached through Order is kept.
    let customer = &set.declarations()[1];
    assert_eq!(
        customer.source_location,
        format!("{}/shared/orders.d.ts", DEFAULT_ROOT)
    );
    let binding = naming::resolve(&set);
    assert!(binding.renames().is_empty());
    Ok(())
}

#[test]
fn test_union_constituents_are_followed() -> Result<(), Box<dyn std::error::Error>> {
    let fx = fixture(FixtureType::UnionAlias);
    let set = collect(&fx.entry_points, &fx.graph, &CollectOptions::default())?;
    assert_eq!(set.original_names(), vec!["Shape", "Circle", "Square"]);
    Ok(())
}

#[test]
fn test_unsupported_heritage_aborts_by_default() {
    let fx = fixture(FixtureType::UnsupportedHeritage);
    let err = process_file(&fx.entry_points, &fx.graph, &config()).unwrap_err();
    assert!(err.is_unsupported());
    assert_eq!(err.declaration_name(), "Widget");
    assert_eq!(err.module(), format!("{}/widget.d.ts", DEFAULT_ROOT));
}

#[test]
fn test_unsupported_heritage_skipped_on_request() -> Result<(), Box<dyn std::error::Error>> {
    let fx = fixture(FixtureType::UnsupportedHeritage);
    let config = config().with_collect(CollectOptions {
        on_unsupported: UnsupportedPolicy::Skip,
        ..CollectOptions::default()
    });
    let mut trace = FileTrace::new(&fx.file);
    let plan = process_file_traced(&fx.entry_points, &fx.graph, &config, &mut trace)?;

    assert_eq!(plan.len(), 1);
    assert!(trace
        .events
        .iter()
        .any(|e| matches!(e, TraceEvent::UnsupportedSkipped { name, .. } if name == "Widget")));
    Ok(())
}

#[test]
fn test_excluded_module_not_inlined() -> Result<(), Box<dyn std::error::Error>> {
    let fx = fixture(FixtureType::ExcludedModule);
    let mut trace = FileTrace::new(&fx.file);
    let plan = process_file_traced(&fx.entry_points, &fx.graph, &config(), &mut trace)?;

    let names: Vec<&str> = plan.blocks().iter().map(|b| b.original_name.as_str()).collect();
    assert_eq!(names, vec!["Page", "Meta"]);
    assert!(trace
        .events
        .iter()
        .any(|e| matches!(e, TraceEvent::Excluded { name, .. } if name == "ElementLike")));
    Ok(())
}

#[test]
fn test_missing_symbol_is_fatal_and_traced() {
    let fx = fixture(FixtureType::MissingSymbol);
    let mut trace = FileTrace::new(&fx.file);
    let err = process_file_traced(&fx.entry_points, &fx.graph, &config(), &mut trace).unwrap_err();

    assert_eq!(
        err,
        FlattenError::MissingSymbol {
            name: "Ghost".to_string(),
            module: format!("{}/ghost.d.ts", DEFAULT_ROOT),
        }
    );
    assert_eq!(trace.error, Some(err.to_string()));
}

#[test]
fn test_collection_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
    for kind in [
        FixtureType::ScenarioA,
        FixtureType::ScenarioB,
        FixtureType::Cycle,
        FixtureType::SharedReference,
    ] {
        let fx = fixture(kind);
        let first = collect(&fx.entry_points, &fx.graph, &CollectOptions::default())?;
        let second = collect(&fx.entry_points, &fx.graph, &CollectOptions::default())?;
        assert_eq!(first.declarations(), second.declarations(), "{:?}", kind);
    }
    Ok(())
}

#[test]
fn test_every_exported_declaration_has_one_mapped_import() -> Result<(), Box<dyn std::error::Error>> {
    let fx = fixture(FixtureType::ScenarioB);
    let plan = process_file(&fx.entry_points, &fx.graph, &config())?;

    for block in plan.blocks() {
        let imports: Vec<_> = plan
            .imports()
            .filter(|i| i.alias == block.emitted_name)
            .collect();
        if block.is_exported {
            assert_eq!(imports.len(), 1, "{}", block.emitted_name);
            let expected = block
                .source_location
                .replacen(DEFAULT_ROOT, "/src", 1)
                .trim_end_matches(".d.ts")
                .to_string();
            assert_eq!(imports[0].module_path, expected);
        } else {
            assert!(imports.is_empty());
        }
    }
    Ok(())
}

#[test]
fn test_recursive_union_alias_terminates() -> Result<(), Box<dyn std::error::Error>> {
    let fx = fixture(FixtureType::RecursiveUnion);
    let mut trace = FileTrace::new(&fx.file);
    let plan = process_file_traced(&fx.entry_points, &fx.graph, &config(), &mut trace)?;

    let names: Vec<&str> = plan.blocks().iter().map(|b| b.original_name.as_str()).collect();
    assert_eq!(names, vec!["Payload", "Json"]);
    // `body: Json` reaches declarations through nesting, so it is not a primitive.
    assert!(!trace
        .events
        .iter()
        .any(|e| matches!(e, TraceEvent::PrimitiveProperty { property, .. } if property == "body")));
    Ok(())
}

#[test]
fn test_merged_declarations_are_all_emitted() -> Result<(), Box<dyn std::error::Error>> {
    let fx = fixture(FixtureType::MergedDeclaration);
    let plan = process_file(&fx.entry_points, &fx.graph, &config())?;

    let names: Vec<(&str, &str)> = plan
        .blocks()
        .iter()
        .map(|b| (b.original_name.as_str(), b.emitted_name.as_str()))
        .collect();
    assert_eq!(
        names,
        vec![
            ("Panel", "Panel"),
            ("Settings", "Settings"),
            ("Theme", "Theme"),
            ("Settings", "Settings2"),
        ]
    );
    let settings_path = format!("{}/settings.d.ts", DEFAULT_ROOT);
    assert_eq!(plan.blocks()[1].source_location, settings_path);
    assert_eq!(plan.blocks()[3].source_location, settings_path);
    assert!(plan.blocks()[3].text.contains("theme: Theme;"));
    Ok(())
}

#[test]
fn test_input_root_with_trailing_slash_still_rebases() -> Result<(), Box<dyn std::error::Error>> {
    let fx = fixture(FixtureType::ScenarioA);
    let config = FlattenConfig::new(PathMapping::new(format!("{}/", DEFAULT_ROOT), "/src"));
    let plan = process_file(&fx.entry_points, &fx.graph, &config)?;

    let imports: Vec<String> = plan.imports().map(|i| i.to_string()).collect();
    assert_eq!(
        imports,
        vec![
            "import { User as User } from '/src/user';".to_string(),
            "import { Address as Address } from '/src/address';".to_string(),
        ]
    );
    Ok(())
}

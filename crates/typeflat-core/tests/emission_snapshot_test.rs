//! Snapshot tests for rendered flattened output
//!
//! These keep the generated artifact stable: banner, provenance headers,
//! import aliasing and block layout.

use insta::assert_snapshot;
use typeflat_core::{process_file, FlattenConfig, PathMapping};
use typeflat_test_fixtures::{fixture, FixtureType, DEFAULT_ROOT};

#[test]
fn test_snapshot_scenario_b() -> Result<(), Box<dyn std::error::Error>> {
    let fx = fixture(FixtureType::ScenarioB);
    let config = FlattenConfig::new(PathMapping::new(DEFAULT_ROOT, "/src/"));
    let plan = process_file(&fx.entry_points, &fx.graph, &config)?;

    assert_snapshot!("scenario_b", plan.render());
    Ok(())
}

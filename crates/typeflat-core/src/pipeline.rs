//! Per-file pipeline: collect, resolve names, plan emission
//!
//! Each call is independent. Nothing survives between files, so the driver
//! may run files in any order or in parallel against a shared resolver.

use tracing::debug_span;

use crate::collector::Collector;
use crate::config::FlattenConfig;
use crate::debug::FileTrace;
use crate::emit::{self, EmissionPlan};
use crate::error::FlattenError;
use crate::naming;
use crate::resolver::TypeResolver;

/// Top-level statements of a file that are interface or type alias
/// declarations, in source order.
pub fn entry_points_of<R: TypeResolver>(resolver: &R, statements: &[R::Node]) -> Vec<R::Node> {
    statements
        .iter()
        .filter(|node| resolver.is_interface_or_type_alias(node))
        .cloned()
        .collect()
}

/// Flatten one file's entry points into an emission plan.
pub fn process_file<R: TypeResolver>(
    entry_points: &[R::Node],
    resolver: &R,
    config: &FlattenConfig,
) -> Result<EmissionPlan, FlattenError> {
    let declarations = Collector::new(resolver, &config.collect).run(entry_points)?;
    let bindings = naming::resolve(&declarations);
    Ok(emit::plan(&declarations, &bindings, &config.path_mapping))
}

/// Like [`process_file`], also recording walk events, renames and the
/// terminating error into `trace`.
pub fn process_file_traced<R: TypeResolver>(
    entry_points: &[R::Node],
    resolver: &R,
    config: &FlattenConfig,
    trace: &mut FileTrace,
) -> Result<EmissionPlan, FlattenError> {
    let span = debug_span!("process_file", file = %trace.file);
    let _enter = span.enter();

    let collected = Collector::new(resolver, &config.collect)
        .with_trace(trace)
        .run(entry_points);
    let declarations = match collected {
        Ok(declarations) => declarations,
        Err(err) => {
            trace.error = Some(err.to_string());
            return Err(err);
        }
    };

    let bindings = naming::resolve(&declarations);
    trace.renames.extend(bindings.renames().iter().cloned());
    Ok(emit::plan(&declarations, &bindings, &config.path_mapping))
}

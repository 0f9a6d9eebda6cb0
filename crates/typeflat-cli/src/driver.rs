//! Drives the per-file pipeline over a directory of declaration files

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use typeflat_core::debug::{FileTrace, TraversalTrace};
use typeflat_core::graph::TypeGraph;
use typeflat_core::{collect, entry_points_of, naming, process_file_traced, CollectOptions};

use crate::config::RunSettings;

/// Execution knobs that do not affect what gets generated.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub parallel: bool,
    pub fail_fast: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Written {
        output: PathBuf,
        declarations: usize,
        renames: usize,
    },
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct FileReport {
    pub input: PathBuf,
    pub outcome: FileOutcome,
}

impl FileReport {
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, FileOutcome::Failed(_))
    }
}

/// Result of a whole `flatten` run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub reports: Vec<FileReport>,
    pub trace: TraversalTrace,
}

impl RunSummary {
    pub fn written(&self) -> usize {
        self.reports.iter().filter(|r| !r.is_failure()).count()
    }

    pub fn failed(&self) -> usize {
        self.reports.iter().filter(|r| r.is_failure()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileReport> {
        self.reports.iter().filter(|r| r.is_failure())
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Flattened {} file(s), {} failed",
            self.written(),
            self.failed()
        )?;
        for report in self.failures() {
            if let FileOutcome::Failed(reason) = &report.outcome {
                writeln!(f, "  {}: {}", report.input.display(), reason)?;
            }
        }
        Ok(())
    }
}

pub fn load_graph(path: &Path) -> Result<TypeGraph> {
    let file =
        fs::File::open(path).with_context(|| format!("Failed to open type graph: {:?}", path))?;
    TypeGraph::from_reader(std::io::BufReader::new(file))
        .with_context(|| format!("Failed to load type graph: {:?}", path))
}

/// Files under `input_root` to flatten, in a stable order.
///
/// Source maps are skipped. Anything that is not a declaration file is kept
/// but logged, since only declaration files are expected here.
pub fn discover_inputs(input_root: &Path) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for entry in WalkDir::new(input_root).sort_by_file_name() {
        let entry =
            entry.with_context(|| format!("Failed to walk input root: {:?}", input_root))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();
        let name = path.to_string_lossy();
        if name.ends_with(".map") {
            debug!(file = %name, "skipping source map");
            continue;
        }
        if !is_declaration_file(&name) {
            warn!(file = %name, "input is not a declaration file (.d.ts)");
        }
        inputs.push(path);
    }
    Ok(inputs)
}

fn is_declaration_file(name: &str) -> bool {
    [".d.ts", ".d.mts", ".d.cts"]
        .iter()
        .any(|suffix| name.ends_with(suffix))
}

/// Where the generated file for `input` goes: rebased from the input root onto
/// the output directory, with the declaration suffix dropped.
pub fn output_path_for(input: &Path, input_root: &Path, out_dir: &Path) -> PathBuf {
    let relative = input.strip_prefix(input_root).unwrap_or(input);
    let target = out_dir.join(relative);
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let renamed = [(".d.ts", ".ts"), (".d.mts", ".mts"), (".d.cts", ".cts")]
        .iter()
        .find_map(|(from, to)| name.strip_suffix(from).map(|stem| format!("{}{}", stem, to)));
    match renamed {
        Some(renamed) => target.with_file_name(renamed),
        None => target,
    }
}

/// Graph key of an input path. Paths are looked up as given first, then in
/// canonical form.
fn graph_key(graph: &TypeGraph, input: &Path) -> Option<String> {
    let given = input.to_string_lossy().into_owned();
    if graph.file(&given).is_some() {
        return Some(given);
    }
    let canonical = fs::canonicalize(input).ok()?;
    let canonical = canonical.to_string_lossy().into_owned();
    graph.file(&canonical).map(|_| canonical)
}

fn flatten_one(
    input: &Path,
    graph: &TypeGraph,
    settings: &RunSettings,
) -> (FileReport, FileTrace) {
    let mut trace = FileTrace::new(input.to_string_lossy());
    let outcome = match try_flatten_one(input, graph, settings, &mut trace) {
        Ok(outcome) => outcome,
        Err(err) => {
            let reason = format!("{:#}", err);
            if trace.error.is_none() {
                trace.error = Some(reason.clone());
            }
            FileOutcome::Failed(reason)
        }
    };
    match &outcome {
        FileOutcome::Written {
            output,
            declarations,
            renames,
        } => info!(
            input = %input.display(),
            output = %output.display(),
            declarations,
            renames,
            "flattened"
        ),
        FileOutcome::Failed(reason) => warn!(input = %input.display(), %reason, "failed"),
    }
    (
        FileReport {
            input: input.to_path_buf(),
            outcome,
        },
        trace,
    )
}

fn try_flatten_one(
    input: &Path,
    graph: &TypeGraph,
    settings: &RunSettings,
    trace: &mut FileTrace,
) -> Result<FileOutcome> {
    let key = graph_key(graph, input)
        .with_context(|| format!("File is not part of the type graph: {:?}", input))?;
    let source = graph
        .file(&key)
        .with_context(|| format!("File is not part of the type graph: {:?}", input))?;
    let entry_points = entry_points_of(graph, &source.statements);
    let plan = process_file_traced(&entry_points, graph, &settings.flatten, trace)?;

    let output = output_path_for(input, &settings.input_root, &settings.out_dir);
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {:?}", parent))?;
    }
    fs::write(&output, plan.render())
        .with_context(|| format!("Failed to write output file: {:?}", output))?;

    Ok(FileOutcome::Written {
        output,
        declarations: plan.len(),
        renames: trace.renames.len(),
    })
}

/// Flatten every discovered input file.
///
/// Per-file failures are reported in the summary rather than returned; only
/// problems with the run itself (unreadable graph, unwalkable input root)
/// produce an `Err`.
pub fn run(settings: &RunSettings, options: RunOptions) -> Result<RunSummary> {
    let graph = load_graph(&settings.graph)?;
    let inputs = discover_inputs(&settings.input_root)?;
    info!(
        files = inputs.len(),
        input_root = %settings.input_root.display(),
        parallel = options.parallel,
        "flattening"
    );

    let results: Vec<(FileReport, FileTrace)> = if options.parallel {
        let stop = AtomicBool::new(false);
        inputs
            .par_iter()
            .filter_map(|input| {
                if options.fail_fast && stop.load(Ordering::Relaxed) {
                    return None;
                }
                let result = flatten_one(input, &graph, settings);
                if result.0.is_failure() {
                    stop.store(true, Ordering::Relaxed);
                }
                Some(result)
            })
            .collect()
    } else {
        let mut results = Vec::with_capacity(inputs.len());
        for input in &inputs {
            let result = flatten_one(input, &graph, settings);
            let failed = result.0.is_failure();
            results.push(result);
            if failed && options.fail_fast {
                break;
            }
        }
        results
    };

    let mut summary = RunSummary::default();
    for (report, trace) in results {
        summary.reports.push(report);
        summary.trace.add_file(trace);
    }
    Ok(summary)
}

/// One row of the `inspect` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectRow {
    pub emitted_name: String,
    pub original_name: String,
    pub module: String,
    pub exported: bool,
}

/// Collect and name the declarations one file would emit, without writing.
pub fn inspect(graph: &TypeGraph, file: &Path, options: &CollectOptions) -> Result<Vec<InspectRow>> {
    let key = graph_key(graph, file)
        .with_context(|| format!("File is not part of the type graph: {:?}", file))?;
    let source = graph
        .file(&key)
        .with_context(|| format!("File is not part of the type graph: {:?}", file))?;
    let entry_points = entry_points_of(graph, &source.statements);
    let declarations = collect(&entry_points, graph, options)?;
    let bindings = naming::resolve(&declarations);

    Ok(declarations
        .iter()
        .map(|(id, declaration)| InspectRow {
            emitted_name: bindings
                .emitted_name(id)
                .unwrap_or(declaration.original_name.as_str())
                .to_string(),
            original_name: declaration.original_name.clone(),
            module: declaration.source_location.clone(),
            exported: declaration.is_exported,
        })
        .collect())
}

pub fn format_table(rows: &[InspectRow]) -> String {
    let headers = ["EMITTED", "ORIGINAL", "EXPORTED", "MODULE"];
    let emitted_width = rows
        .iter()
        .map(|r| r.emitted_name.len())
        .chain([headers[0].len()])
        .max()
        .unwrap_or_default();
    let original_width = rows
        .iter()
        .map(|r| r.original_name.len())
        .chain([headers[1].len()])
        .max()
        .unwrap_or_default();

    let mut out = format!(
        "{:<ew$}  {:<ow$}  {:<8}  {}\n",
        headers[0],
        headers[1],
        headers[2],
        headers[3],
        ew = emitted_width,
        ow = original_width
    );
    for row in rows {
        out.push_str(&format!(
            "{:<ew$}  {:<ow$}  {:<8}  {}\n",
            row.emitted_name,
            row.original_name,
            if row.exported { "yes" } else { "no" },
            row.module,
            ew = emitted_width,
            ow = original_width
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_for_declaration_files() {
        let root = Path::new("/app/build/routes");
        let out = Path::new("/app/generated");
        assert_eq!(
            output_path_for(Path::new("/app/build/routes/users/get.d.ts"), root, out),
            PathBuf::from("/app/generated/users/get.ts")
        );
        assert_eq!(
            output_path_for(Path::new("/app/build/routes/esm.d.mts"), root, out),
            PathBuf::from("/app/generated/esm.mts")
        );
        assert_eq!(
            output_path_for(Path::new("/app/build/routes/plain.ts"), root, out),
            PathBuf::from("/app/generated/plain.ts")
        );
    }

    #[test]
    fn test_is_declaration_file() {
        assert!(is_declaration_file("a/b.d.ts"));
        assert!(is_declaration_file("b.d.cts"));
        assert!(!is_declaration_file("b.ts"));
        assert!(!is_declaration_file("b.d.ts.map"));
    }

    #[test]
    fn test_format_table_aligns_columns() {
        let rows = vec![
            InspectRow {
                emitted_name: "Config".to_string(),
                original_name: "Config".to_string(),
                module: "/r/client.d.ts".to_string(),
                exported: true,
            },
            InspectRow {
                emitted_name: "Config2".to_string(),
                original_name: "Config".to_string(),
                module: "/r/server.d.ts".to_string(),
                exported: false,
            },
        ];
        let table = format_table(&rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "EMITTED  ORIGINAL  EXPORTED  MODULE");
        assert_eq!(lines[1], "Config   Config    yes       /r/client.d.ts");
        assert_eq!(lines[2], "Config2  Config    no        /r/server.d.ts");
    }
}

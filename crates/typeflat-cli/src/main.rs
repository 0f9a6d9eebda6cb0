use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use typeflat::config::{Overrides, ProjectConfig, RunSettings};
use typeflat::driver::{self, RunOptions};
use typeflat_core::{CollectOptions, UnsupportedPolicy};

const DEFAULT_CONFIG_FILE: &str = "typeflat.toml";

#[derive(Parser)]
#[command(name = "typeflat")]
#[command(about = "Flatten TypeScript declaration files into self-contained type files", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Flatten every declaration file under the input root
    Flatten {
        /// Serialized type graph of the program (JSON)
        #[arg(short, long, env = "TYPEFLAT_GRAPH")]
        graph: Option<PathBuf>,

        /// Directory holding the declaration files
        #[arg(short, long, env = "TYPEFLAT_INPUT_ROOT")]
        input_root: Option<PathBuf>,

        /// Directory to write generated files to
        #[arg(short, long, env = "TYPEFLAT_OUT_DIR")]
        out_dir: Option<PathBuf>,

        /// Prefix replacing the input root in emitted import paths
        #[arg(long)]
        import_root: Option<String>,

        /// Project config file (defaults to ./typeflat.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Additional module path pattern to leave out of inlining
        #[arg(long)]
        exclude: Vec<String>,

        /// Skip unsupported constructs instead of failing the file
        #[arg(long)]
        skip_unsupported: bool,

        /// Process files in parallel
        #[arg(long)]
        parallel: bool,

        /// Stop at the first failing file
        #[arg(long)]
        fail_fast: bool,

        /// Write per-file diagnostics as JSON to this path
        #[arg(long)]
        debug_export: Option<PathBuf>,
    },

    /// Show the declarations one file would emit, without writing anything
    Inspect {
        /// Serialized type graph of the program (JSON)
        #[arg(short, long, env = "TYPEFLAT_GRAPH")]
        graph: PathBuf,

        /// Declaration file to inspect
        #[arg(short, long)]
        file: PathBuf,

        /// Additional module path pattern to leave out of inlining
        #[arg(long)]
        exclude: Vec<String>,

        /// Skip unsupported constructs instead of failing
        #[arg(long)]
        skip_unsupported: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.debug {
        tracing::Level::TRACE
    } else if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(cli.debug) // Show target module in debug mode
        .init();

    match cli.command {
        Commands::Flatten {
            graph,
            input_root,
            out_dir,
            import_root,
            config,
            exclude,
            skip_unsupported,
            parallel,
            fail_fast,
            debug_export,
        } => handle_flatten(
            Overrides {
                graph,
                input_root,
                out_dir,
                import_root,
                exclude,
                skip_unsupported,
            },
            config,
            RunOptions {
                parallel,
                fail_fast,
            },
            debug_export,
        ),
        Commands::Inspect {
            graph,
            file,
            exclude,
            skip_unsupported,
        } => handle_inspect(graph, file, exclude, skip_unsupported),
    }
}

fn load_project_config(path: Option<PathBuf>) -> Result<ProjectConfig> {
    match path {
        Some(path) => ProjectConfig::load(&path),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if default.is_file() {
                info!("Using config file {}", default.display());
                ProjectConfig::load(&default)
            } else {
                Ok(ProjectConfig::default())
            }
        }
    }
}

fn handle_flatten(
    overrides: Overrides,
    config: Option<PathBuf>,
    options: RunOptions,
    debug_export: Option<PathBuf>,
) -> Result<()> {
    let settings = RunSettings::resolve(load_project_config(config)?, overrides)?;
    info!(
        "Flattening {} into {}",
        settings.input_root.display(),
        settings.out_dir.display()
    );

    let summary = driver::run(&settings, options)?;

    if let Some(path) = debug_export {
        summary
            .trace
            .export_to_file(&path)
            .with_context(|| format!("Failed to write debug export: {:?}", path))?;
        info!("Debug information exported to {}", path.display());
    }

    print!("{}", summary);
    if summary.failed() > 0 {
        bail!("{} file(s) failed to flatten", summary.failed());
    }
    Ok(())
}

fn handle_inspect(
    graph: PathBuf,
    file: PathBuf,
    exclude: Vec<String>,
    skip_unsupported: bool,
) -> Result<()> {
    let type_graph = driver::load_graph(&graph)?;

    let mut collect = CollectOptions::default();
    collect.exclude.extend(exclude);
    if skip_unsupported {
        collect.on_unsupported = UnsupportedPolicy::Skip;
    }
    let rows = driver::inspect(&type_graph, &file, &collect)
        .with_context(|| format!("Failed to inspect {:?}", file))?;
    print!("{}", driver::format_table(&rows));
    Ok(())
}

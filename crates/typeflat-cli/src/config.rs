//! Project configuration file (`typeflat.toml`)

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Component, Path, PathBuf};

use typeflat_core::{CollectOptions, FlattenConfig, PathMapping};

/// Default import root substituted for the input root in emitted imports.
pub const DEFAULT_IMPORT_ROOT: &str = "/src/";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    #[serde(default)]
    pub paths: PathsSection,
    #[serde(default)]
    pub collect: CollectOptions,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsSection {
    /// Serialized type graph of the program
    pub graph: Option<PathBuf>,
    /// Directory holding the declaration files to flatten
    pub input_root: Option<PathBuf>,
    /// Directory generated files are written to
    pub out_dir: Option<PathBuf>,
    /// Prefix that replaces the input root in emitted import paths
    pub import_root: Option<String>,
}

impl ProjectConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse typeflat config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config file: {:?}", path))
    }
}

/// Fully resolved settings for one `flatten` run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub graph: PathBuf,
    pub input_root: PathBuf,
    pub out_dir: PathBuf,
    pub flatten: FlattenConfig,
}

/// Command-line values that override the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub graph: Option<PathBuf>,
    pub input_root: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub import_root: Option<String>,
    pub exclude: Vec<String>,
    pub skip_unsupported: bool,
}

impl RunSettings {
    /// Merge the config file with command-line overrides. Relative paths are
    /// taken against the current directory.
    pub fn resolve(config: ProjectConfig, overrides: Overrides) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        Self::resolve_from(config, overrides, &cwd)
    }

    /// Like [`RunSettings::resolve`], with relative paths taken against `base`.
    ///
    /// Module paths in the type graph are absolute, so the input root must be
    /// too for import paths to be rebased onto the import root.
    pub fn resolve_from(config: ProjectConfig, overrides: Overrides, base: &Path) -> Result<Self> {
        let graph = overrides
            .graph
            .or(config.paths.graph)
            .context("No type graph given (use --graph or [paths].graph)")?;
        let input_root = overrides
            .input_root
            .or(config.paths.input_root)
            .context("No input root given (use --input-root or [paths].input_root)")?;
        let out_dir = overrides
            .out_dir
            .or(config.paths.out_dir)
            .context("No output directory given (use --out-dir or [paths].out_dir)")?;
        let import_root = overrides
            .import_root
            .or(config.paths.import_root)
            .unwrap_or_else(|| DEFAULT_IMPORT_ROOT.to_string());

        let graph = absolutize(&graph, base);
        let input_root = absolutize(&input_root, base);
        let out_dir = absolutize(&out_dir, base);

        let mut collect = config.collect;
        collect.exclude.extend(overrides.exclude);
        if overrides.skip_unsupported {
            collect.on_unsupported = typeflat_core::UnsupportedPolicy::Skip;
        }

        let mapping = PathMapping::new(input_root.to_string_lossy(), import_root);
        Ok(Self {
            graph,
            input_root,
            out_dir,
            flatten: FlattenConfig::new(mapping).with_collect(collect),
        })
    }
}

/// `path` joined onto `base` when relative, with `.` and `..` removed
/// lexically. Symlinks are left alone so paths keep the spelling the type
/// graph was exported with.
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };
    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

//! Per-run configuration shared by every file's pipeline

use serde::{Deserialize, Serialize};

/// Suffixes stripped from module paths so imports resolve to the
/// implementation module rather than its declaration file. Order matters:
/// declaration suffixes are tried before their plain counterparts.
const MODULE_SUFFIXES: &[&str] = &[".d.ts", ".d.mts", ".d.cts", ".ts", ".tsx", ".mts", ".cts"];

/// Maps a declaration's source module to the path used in emitted imports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathMapping {
    /// Prefix removed from source module paths
    #[serde(default)]
    pub input_root_prefix: String,
    /// Prefix substituted in its place
    #[serde(default)]
    pub output_root_prefix: String,
}

impl PathMapping {
    pub fn new(input_root_prefix: impl Into<String>, output_root_prefix: impl Into<String>) -> Self {
        Self {
            input_root_prefix: input_root_prefix.into(),
            output_root_prefix: output_root_prefix.into(),
        }
    }

    /// Import path for a declaration declared in `source_location`.
    ///
    /// ```
    /// use typeflat_core::config::PathMapping;
    /// let mapping = PathMapping::new("/build/routes", "/src/");
    /// assert_eq!(mapping.import_path("/build/routes/user/get.d.ts"), "/src/user/get");
    /// ```
    pub fn import_path(&self, source_location: &str) -> String {
        let rebased = self.rebase(source_location);
        strip_module_suffix(&rebased).to_string()
    }

    fn rebase(&self, source_location: &str) -> String {
        if self.input_root_prefix.is_empty() {
            return source_location.to_string();
        }
        let Some(rest) = source_location.strip_prefix(&self.input_root_prefix) else {
            tracing::debug!(
                module = source_location,
                input_root = %self.input_root_prefix,
                "module is outside the input root, keeping its path"
            );
            return source_location.to_string();
        };
        // Only rebase on a segment boundary: "/routes" must not match "/routes2/x".
        if !rest.is_empty() && !rest.starts_with('/') && !self.input_root_prefix.ends_with('/') {
            return source_location.to_string();
        }
        let rest = rest.trim_start_matches('/');
        let root = self.output_root_prefix.trim_end_matches('/');
        if root.is_empty() && self.output_root_prefix.is_empty() {
            rest.to_string()
        } else {
            format!("{}/{}", root, rest)
        }
    }
}

/// Strip the first matching TypeScript module suffix.
pub fn strip_module_suffix(path: &str) -> &str {
    MODULE_SUFFIXES
        .iter()
        .find_map(|suffix| path.strip_suffix(suffix))
        .unwrap_or(path)
}

/// What to do when the walker meets a construct it cannot follow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnsupportedPolicy {
    /// Fail the current file with `UnsupportedConstruct`
    #[default]
    Abort,
    /// Log a warning, record a trace event and keep walking
    Skip,
}

/// Options for the declaration collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectOptions {
    /// Declarations whose module path contains any of these are neither
    /// recorded nor walked
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub on_unsupported: UnsupportedPolicy,
}

fn default_exclude() -> Vec<String> {
    vec!["node_modules".to_string()]
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            exclude: default_exclude(),
            on_unsupported: UnsupportedPolicy::default(),
        }
    }
}

impl CollectOptions {
    pub fn is_excluded(&self, module: &str) -> bool {
        self.exclude
            .iter()
            .any(|pattern| !pattern.is_empty() && module.contains(pattern.as_str()))
    }
}

/// Everything one file's pipeline needs besides the resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlattenConfig {
    #[serde(default)]
    pub path_mapping: PathMapping,
    #[serde(default)]
    pub collect: CollectOptions,
}

impl FlattenConfig {
    pub fn new(path_mapping: PathMapping) -> Self {
        Self {
            path_mapping,
            collect: CollectOptions::default(),
        }
    }

    pub fn with_collect(mut self, collect: CollectOptions) -> Self {
        self.collect = collect;
        self
    }
}

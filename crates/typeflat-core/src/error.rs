use thiserror::Error;

/// Fatal conditions raised while flattening one file.
///
/// Every variant names the declaration that was being walked and the module it
/// came from, so a failure is locatable without re-running with tracing on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlattenError {
    #[error("No symbol for declaration '{name}' in {module}")]
    MissingSymbol { name: String, module: String },

    #[error("Symbol '{symbol}' referenced from '{name}' in {module} has no declarations")]
    MissingDeclarations {
        symbol: String,
        name: String,
        module: String,
    },

    #[error("Unsupported construct in '{name}' ({module}): {construct}")]
    UnsupportedConstruct {
        name: String,
        module: String,
        construct: String,
    },
}

impl FlattenError {
    /// True for the catchable class the driver may choose to skip and warn on.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, FlattenError::UnsupportedConstruct { .. })
    }

    /// Original name of the declaration being walked when the error was raised.
    pub fn declaration_name(&self) -> &str {
        match self {
            FlattenError::MissingSymbol { name, .. }
            | FlattenError::MissingDeclarations { name, .. }
            | FlattenError::UnsupportedConstruct { name, .. } => name,
        }
    }

    /// Source module of the declaration being walked.
    pub fn module(&self) -> &str {
        match self {
            FlattenError::MissingSymbol { module, .. }
            | FlattenError::MissingDeclarations { module, .. }
            | FlattenError::UnsupportedConstruct { module, .. } => module,
        }
    }
}

/// Errors produced while loading or building a [`crate::graph::TypeGraph`].
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Invalid type graph JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Dangling {kind} reference {id} in {owner}")]
    DanglingReference {
        kind: &'static str,
        id: u32,
        owner: String,
    },

    #[error("Duplicate source file in type graph: {0}")]
    DuplicateFile(String),
}

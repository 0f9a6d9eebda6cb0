//! Emission planning: turning named declarations into output text blocks
//!
//! The plan is a pure function of the declaration set, the name binding and
//! the path mapping. Rendering is deterministic so generated files can be
//! compared against golden output.
//!
//! Declaration text is emitted verbatim. Only the header comments and the
//! import alias carry the emitted name, so the generated file is a record of
//! what was inlined rather than a module that type-checks as-is: an exported
//! block's import binds the same name its own text declares, and a renamed
//! block (`Config2`) still declares `interface Config`.

use std::fmt;

use crate::config::PathMapping;
use crate::declaration::{DeclarationId, DeclarationSet};
use crate::naming::NameBinding;

/// Banner written once at the top of every generated file.
pub const GENERATED_BANNER: &str =
    "// This file was generated by typeflat. Do not edit it manually.";

/// `import { original as emitted } from 'path';`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStatement {
    pub original_name: String,
    pub alias: String,
    pub module_path: String,
}

impl fmt::Display for ImportStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "import {{ {} as {} }} from '{}';",
            self.original_name, self.alias, self.module_path
        )
    }
}

/// Output for a single declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmissionBlock {
    pub declaration: DeclarationId,
    pub source_location: String,
    pub original_name: String,
    pub emitted_name: String,
    pub is_exported: bool,
    /// Present only for exported declarations
    pub import: Option<ImportStatement>,
    pub text: String,
}

impl EmissionBlock {
    /// Provenance comment lines, without trailing newlines.
    pub fn header_lines(&self) -> Vec<String> {
        let status = if self.is_exported {
            "exported"
        } else {
            "internal (not exported)"
        };
        vec![
            format!("// Source: {}", self.source_location),
            format!("// Original name: {}", self.original_name),
            format!("// Emitted name: {}", self.emitted_name),
            format!("// Export status: {}", status),
        ]
    }
}

impl fmt::Display for EmissionBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.header_lines() {
            writeln!(f, "{}", line)?;
        }
        if let Some(import) = &self.import {
            writeln!(f, "{}", import)?;
        }
        writeln!(f, "{}", self.text)
    }
}

/// Ordered output blocks for one file, one per declaration in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmissionPlan {
    blocks: Vec<EmissionBlock>,
}

impl EmissionPlan {
    pub fn blocks(&self) -> &[EmissionBlock] {
        &self.blocks
    }

    pub fn imports(&self) -> impl Iterator<Item = &ImportStatement> {
        self.blocks.iter().filter_map(|b| b.import.as_ref())
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for EmissionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", GENERATED_BANNER)?;
        for block in &self.blocks {
            writeln!(f)?;
            write!(f, "{}", block)?;
        }
        Ok(())
    }
}

/// Build the emission plan for a resolved declaration set.
pub fn plan(
    declarations: &DeclarationSet,
    bindings: &NameBinding,
    mapping: &PathMapping,
) -> EmissionPlan {
    let blocks = declarations
        .iter()
        .map(|(id, declaration)| {
            let emitted_name = bindings
                .emitted_name(id)
                .unwrap_or(&declaration.original_name)
                .to_string();
            let import = declaration.is_exported.then(|| ImportStatement {
                original_name: declaration.original_name.clone(),
                alias: emitted_name.clone(),
                module_path: mapping.import_path(&declaration.source_location),
            });
            EmissionBlock {
                declaration: id,
                source_location: declaration.source_location.clone(),
                original_name: declaration.original_name.clone(),
                emitted_name,
                is_exported: declaration.is_exported,
                import,
                text: declaration.raw_text.clone(),
            }
        })
        .collect();
    EmissionPlan { blocks }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::Declaration;
    use crate::naming;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_exported_and_internal() {
        let mut set = DeclarationSet::new();
        set.insert(Declaration {
            source_location: "/build/routes/get.d.ts".to_string(),
            original_name: "Response".to_string(),
            is_exported: true,
            raw_text: "export interface Response { body: Body }".to_string(),
        });
        set.insert(Declaration {
            source_location: "/build/routes/get.d.ts".to_string(),
            original_name: "Body".to_string(),
            is_exported: false,
            raw_text: "interface Body { ok: boolean }".to_string(),
        });
        let binding = naming::resolve(&set);
        let plan = plan(&set, &binding, &PathMapping::new("/build/routes", "/src/"));

        let expected = "\
// This file was generated by typeflat. Do not edit it manually.

// Source: /build/routes/get.d.ts
// Original name: Response
// Emitted name: Response
// Export status: exported
import { Response as Response } from '/src/get';
export interface Response { body: Body }

// Source: /build/routes/get.d.ts
// Original name: Body
// Emitted name: Body
// Export status: internal (not exported)
interface Body { ok: boolean }
";
        assert_eq!(plan.render(), expected);
        assert_eq!(plan.imports().count(), 1);
    }

    #[test]
    fn test_empty_plan_is_banner_only() {
        let set = DeclarationSet::new();
        let plan = plan(&set, &NameBinding::default(), &PathMapping::default());
        assert!(plan.is_empty());
        assert_eq!(plan.render(), format!("{}\n", GENERATED_BANNER));
    }
}

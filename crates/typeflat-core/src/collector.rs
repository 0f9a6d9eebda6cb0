//! Declaration collector: the recursive walk from entry points
//!
//! Starting from each entry point the collector records the declaration, then
//! follows every type it mentions back to the declarations behind it:
//!
//! 1. the declared type itself (alias targets, merged declarations)
//! 2. heritage base types
//! 3. named properties, in resolver order
//! 4. index-signature value types
//!
//! Each visited type also has its nested types (type arguments, union and
//! intersection constituents) followed. A declaration whose text is already
//! recorded is neither recorded again nor walked again, and a type is visited
//! at most once per walk. Together these terminate cycles through named
//! declarations as well as through anonymous recursive types.

use std::collections::HashSet;
use tracing::{debug, trace, warn};

use crate::config::{CollectOptions, UnsupportedPolicy};
use crate::debug::{FileTrace, TraceEvent};
use crate::declaration::{Declaration, DeclarationSet};
use crate::error::FlattenError;
use crate::fingerprint::Fingerprint;
use crate::resolver::{BaseType, TypeResolver};

/// Collect the transitive closure of declarations reachable from `entry_points`.
pub fn collect<R: TypeResolver>(
    entry_points: &[R::Node],
    resolver: &R,
    options: &CollectOptions,
) -> Result<DeclarationSet, FlattenError> {
    Collector::new(resolver, options).run(entry_points)
}

/// The declaration currently being walked, for error and trace context.
#[derive(Debug, Clone)]
struct Owner {
    name: String,
    module: String,
}

pub struct Collector<'a, R: TypeResolver> {
    resolver: &'a R,
    options: &'a CollectOptions,
    declarations: DeclarationSet,
    visited_types: HashSet<R::Type>,
    trace: Option<&'a mut FileTrace>,
}

impl<'a, R: TypeResolver> Collector<'a, R> {
    pub fn new(resolver: &'a R, options: &'a CollectOptions) -> Self {
        Self {
            resolver,
            options,
            declarations: DeclarationSet::new(),
            visited_types: HashSet::new(),
            trace: None,
        }
    }

    /// Record walk events into `trace` as well as logging them.
    pub fn with_trace(mut self, trace: &'a mut FileTrace) -> Self {
        self.trace = Some(trace);
        self
    }

    pub fn run(mut self, entry_points: &[R::Node]) -> Result<DeclarationSet, FlattenError> {
        for entry in entry_points {
            self.visit_declaration(entry)?;
        }
        debug!(
            declarations = self.declarations.len(),
            "collected declarations"
        );
        Ok(self.declarations)
    }

    fn record_event(&mut self, event: TraceEvent) {
        if let Some(trace) = self.trace.as_deref_mut() {
            trace.push(event);
        }
    }

    fn visit_declaration(&mut self, node: &R::Node) -> Result<(), FlattenError> {
        let resolver = self.resolver;
        let owner = Owner {
            name: resolver.name_of(node),
            module: resolver.source_module_of(node),
        };

        if self.options.is_excluded(&owner.module) {
            trace!(name = %owner.name, module = %owner.module, "excluded module, not walking");
            self.record_event(TraceEvent::Excluded {
                name: owner.name,
                module: owner.module,
            });
            return Ok(());
        }

        let text = resolver.text_of(node);
        if self.declarations.contains_text(&text) {
            trace!(name = %owner.name, module = %owner.module, "already recorded");
            self.record_event(TraceEvent::Duplicate {
                name: owner.name,
                module: owner.module,
            });
            return Ok(());
        }

        let symbol = resolver
            .symbol_of(node)
            .ok_or_else(|| FlattenError::MissingSymbol {
                name: owner.name.clone(),
                module: owner.module.clone(),
            })?;

        let fingerprint = Fingerprint::of(&text);
        self.declarations.insert(Declaration {
            source_location: owner.module.clone(),
            original_name: owner.name.clone(),
            is_exported: resolver.is_exported(node),
            raw_text: text,
        });
        debug!(name = %owner.name, module = %owner.module, "recorded declaration");
        self.record_event(TraceEvent::Recorded {
            name: owner.name.clone(),
            module: owner.module.clone(),
            fingerprint,
        });

        let declared = resolver.declared_type_of(&symbol);
        self.visit_type(&declared, &owner)?;

        for base in resolver.base_types_of(&declared) {
            match base {
                BaseType::Resolved(base) => self.visit_type(&base, &owner)?,
                BaseType::Unresolvable { expression } => {
                    self.unsupported(&owner, format!("heritage expression `{}`", expression))?
                }
            }
        }

        for property in resolver.properties_of(&declared) {
            let property_type = resolver.type_of_property(&property);
            if resolver.symbol_of_type(&property_type).is_none()
                && resolver.nested_types_of(&property_type).is_empty()
            {
                let property_name = resolver.symbol_name(&property);
                trace!(owner = %owner.name, property = %property_name, "property type has no backing symbol");
                self.record_event(TraceEvent::PrimitiveProperty {
                    owner: owner.name.clone(),
                    property: property_name,
                });
            }
            self.visit_type(&property_type, &owner)?;
        }

        for value in resolver.index_signatures_of(&declared) {
            self.visit_type(&value, &owner)?;
        }

        Ok(())
    }

    /// Follow a type to the interface and alias declarations behind it.
    fn visit_type(&mut self, ty: &R::Type, owner: &Owner) -> Result<(), FlattenError> {
        if !self.visited_types.insert(ty.clone()) {
            return Ok(());
        }
        let resolver = self.resolver;
        if let Some(symbol) = resolver.symbol_of_type(ty) {
            let declarations = resolver.declarations_of(&symbol);
            if declarations.is_empty() {
                return Err(FlattenError::MissingDeclarations {
                    symbol: resolver.symbol_name(&symbol),
                    name: owner.name.clone(),
                    module: owner.module.clone(),
                });
            }
            for declaration in &declarations {
                if resolver.is_interface_or_type_alias(declaration) {
                    self.visit_declaration(declaration)?;
                }
            }
        }

        for nested in resolver.nested_types_of(ty) {
            self.visit_type(&nested, owner)?;
        }
        Ok(())
    }

    fn unsupported(&mut self, owner: &Owner, construct: String) -> Result<(), FlattenError> {
        match self.options.on_unsupported {
            UnsupportedPolicy::Abort => Err(FlattenError::UnsupportedConstruct {
                name: owner.name.clone(),
                module: owner.module.clone(),
                construct,
            }),
            UnsupportedPolicy::Skip => {
                warn!(name = %owner.name, module = %owner.module, %construct, "skipping unsupported construct");
                self.record_event(TraceEvent::UnsupportedSkipped {
                    name: owner.name.clone(),
                    module: owner.module.clone(),
                    construct,
                });
                Ok(())
            }
        }
    }
}

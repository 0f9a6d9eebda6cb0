//! Capability interface over an external type checker
//!
//! The flattener never parses source text. Everything it knows about a
//! declaration (its symbol, its declared type, the members of that type and
//! where referenced types are declared) comes through [`TypeResolver`].
//! Production use goes through [`crate::graph::TypeGraph`], a serialized
//! snapshot of a checked program; tests substitute small hand-built graphs.

/// One entry of a type's base-type list (the targets of `extends` clauses).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseType<T> {
    /// The heritage target resolved to a type.
    Resolved(T),
    /// The heritage target is an expression the walker cannot follow
    /// (e.g. `extends mixin(Base)`).
    Unresolvable { expression: String },
}

use std::hash::Hash;

/// Queries the collector needs from a type checker.
///
/// All queries are synchronous and in-memory. Implementations must be
/// deterministic: the same query returns the same answer in the same order,
/// since discovery order decides emission order and collision renaming.
pub trait TypeResolver {
    /// A declaration site (interface, type alias, property, ...).
    type Node: Clone;
    /// A declaration-level identity.
    type Symbol: Clone;
    /// A checked type. Equal handles denote the same type.
    type Type: Clone + Eq + Hash;

    fn symbol_of(&self, node: &Self::Node) -> Option<Self::Symbol>;

    fn declared_type_of(&self, symbol: &Self::Symbol) -> Self::Type;

    fn properties_of(&self, ty: &Self::Type) -> Vec<Self::Symbol>;

    fn type_of_property(&self, property: &Self::Symbol) -> Self::Type;

    /// The backing symbol of a type, `None` for primitives and literals.
    fn symbol_of_type(&self, ty: &Self::Type) -> Option<Self::Symbol>;

    fn declarations_of(&self, symbol: &Self::Symbol) -> Vec<Self::Node>;

    fn symbol_name(&self, symbol: &Self::Symbol) -> String;

    fn source_module_of(&self, node: &Self::Node) -> String;

    fn is_exported(&self, node: &Self::Node) -> bool;

    fn is_interface_or_type_alias(&self, node: &Self::Node) -> bool;

    /// Name as written at the declaration site.
    fn name_of(&self, node: &Self::Node) -> String;

    /// Verbatim text of the declaration.
    fn text_of(&self, node: &Self::Node) -> String;

    /// Base types listed in the type's heritage clauses.
    ///
    /// This is not reachable through [`TypeResolver::properties_of`]: inherited
    /// properties show up there, but the base declaration itself does not.
    fn base_types_of(&self, ty: &Self::Type) -> Vec<BaseType<Self::Type>>;

    /// Value types of the type's index signatures (`[key: string]: V`).
    fn index_signatures_of(&self, ty: &Self::Type) -> Vec<Self::Type>;

    /// Types nested inside `ty`: type arguments and union/intersection
    /// constituents. Nesting may be cyclic (`type Json = string | Json[]`).
    fn nested_types_of(&self, _ty: &Self::Type) -> Vec<Self::Type> {
        Vec::new()
    }
}

//! In-memory type graph: a serialized snapshot of a checked program
//!
//! A type-checker front end exports the program as JSON: source files with
//! their top-level statements, declaration nodes, symbols and types, all
//! cross-referenced by dense numeric ids. [`TypeGraph`] validates every id on
//! load and then answers [`TypeResolver`] queries from memory.
//!
//! ## Format
//!
//! ```json
//! {
//!   "files":   [{ "path": "/routes/user.d.ts", "statements": [0] }],
//!   "nodes":   [{ "name": "User", "kind": "interface", "text": "export interface User { id: string }",
//!                 "module": "/routes/user.d.ts", "exported": true, "symbol": 0 }],
//!   "symbols": [{ "name": "User", "type": 0, "declarations": [0] },
//!               { "name": "id", "type": 1 }],
//!   "types":   [{ "symbol": 0, "properties": [1] },
//!               { "display": "string" }]
//! }
//! ```
//!
//! Base types are either a type id or `{ "expression": "mixin(Base)" }` for a
//! heritage target the checker could not resolve to a type.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;

use crate::error::GraphError;
use crate::resolver::{BaseType, TypeResolver};

macro_rules! graph_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

graph_id!(NodeId);
graph_id!(SymbolId);
graph_id!(TypeId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Interface,
    TypeAlias,
    Class,
    Enum,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: String,
    #[serde(default)]
    pub statements: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeData {
    pub name: String,
    pub kind: NodeKind,
    pub text: String,
    pub module: String,
    #[serde(default)]
    pub exported: bool,
    #[serde(default)]
    pub symbol: Option<SymbolId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolData {
    pub name: String,
    /// Declared type for declaration symbols, value type for properties
    #[serde(rename = "type")]
    pub ty: TypeId,
    #[serde(default)]
    pub declarations: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BaseTypeRef {
    Type(TypeId),
    Expression { expression: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<SymbolId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<SymbolId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub index_signatures: Vec<TypeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub base_types: Vec<BaseTypeRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<TypeId>,
}

/// Raw, unvalidated graph as it appears on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphData {
    #[serde(default)]
    pub files: Vec<SourceFile>,
    #[serde(default)]
    pub nodes: Vec<NodeData>,
    #[serde(default)]
    pub symbols: Vec<SymbolData>,
    #[serde(default)]
    pub types: Vec<TypeData>,
}

/// A validated type graph. Every id it hands out or stores is in range.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "GraphData")]
pub struct TypeGraph {
    data: GraphData,
    file_index: HashMap<String, usize>,
}

impl TryFrom<GraphData> for TypeGraph {
    type Error = GraphError;

    fn try_from(data: GraphData) -> Result<Self, Self::Error> {
        validate(&data)?;
        let mut file_index = HashMap::with_capacity(data.files.len());
        for (idx, file) in data.files.iter().enumerate() {
            if file_index.insert(file.path.clone(), idx).is_some() {
                return Err(GraphError::DuplicateFile(file.path.clone()));
            }
        }
        Ok(Self { data, file_index })
    }
}

impl Serialize for TypeGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.data.serialize(serializer)
    }
}

impl TypeGraph {
    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader(reader: impl std::io::Read) -> Result<Self, GraphError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, GraphError> {
        Ok(serde_json::to_string_pretty(&self.data)?)
    }

    pub fn file(&self, path: &str) -> Option<&SourceFile> {
        self.file_index.get(path).map(|&idx| &self.data.files[idx])
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.data.files
    }

    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.data.nodes[id.index()]
    }

    pub fn symbol(&self, id: SymbolId) -> &SymbolData {
        &self.data.symbols[id.index()]
    }

    pub fn type_data(&self, id: TypeId) -> &TypeData {
        &self.data.types[id.index()]
    }
}

fn check(
    kind: &'static str,
    id: u32,
    limit: usize,
    owner: impl FnOnce() -> String,
) -> Result<(), GraphError> {
    if (id as usize) < limit {
        Ok(())
    } else {
        Err(GraphError::DanglingReference {
            kind,
            id,
            owner: owner(),
        })
    }
}

fn validate(data: &GraphData) -> Result<(), GraphError> {
    let node_count = data.nodes.len();
    let symbol_count = data.symbols.len();
    let type_count = data.types.len();

    for file in &data.files {
        for node in &file.statements {
            check("node", node.0, node_count, || format!("file {}", file.path))?;
        }
    }
    for (idx, node) in data.nodes.iter().enumerate() {
        if let Some(symbol) = node.symbol {
            check("symbol", symbol.0, symbol_count, || {
                format!("node {} ({})", idx, node.name)
            })?;
        }
    }
    for (idx, symbol) in data.symbols.iter().enumerate() {
        let owner = || format!("symbol {} ({})", idx, symbol.name);
        check("type", symbol.ty.0, type_count, owner)?;
        for node in &symbol.declarations {
            check("node", node.0, node_count, owner)?;
        }
    }
    for (idx, ty) in data.types.iter().enumerate() {
        let owner = || format!("type {}", idx);
        if let Some(symbol) = ty.symbol {
            check("symbol", symbol.0, symbol_count, owner)?;
        }
        for property in &ty.properties {
            check("symbol", property.0, symbol_count, owner)?;
        }
        for inner in ty.index_signatures.iter().chain(&ty.nested) {
            check("type", inner.0, type_count, owner)?;
        }
        for base in &ty.base_types {
            if let BaseTypeRef::Type(base) = base {
                check("type", base.0, type_count, owner)?;
            }
        }
    }
    Ok(())
}

impl TypeResolver for TypeGraph {
    type Node = NodeId;
    type Symbol = SymbolId;
    type Type = TypeId;

    fn symbol_of(&self, node: &NodeId) -> Option<SymbolId> {
        self.node(*node).symbol
    }

    fn declared_type_of(&self, symbol: &SymbolId) -> TypeId {
        self.symbol(*symbol).ty
    }

    fn properties_of(&self, ty: &TypeId) -> Vec<SymbolId> {
        self.type_data(*ty).properties.clone()
    }

    fn type_of_property(&self, property: &SymbolId) -> TypeId {
        self.symbol(*property).ty
    }

    fn symbol_of_type(&self, ty: &TypeId) -> Option<SymbolId> {
        self.type_data(*ty).symbol
    }

    fn declarations_of(&self, symbol: &SymbolId) -> Vec<NodeId> {
        self.symbol(*symbol).declarations.clone()
    }

    fn symbol_name(&self, symbol: &SymbolId) -> String {
        self.symbol(*symbol).name.clone()
    }

    fn source_module_of(&self, node: &NodeId) -> String {
        self.node(*node).module.clone()
    }

    fn is_exported(&self, node: &NodeId) -> bool {
        self.node(*node).exported
    }

    fn is_interface_or_type_alias(&self, node: &NodeId) -> bool {
        matches!(
            self.node(*node).kind,
            NodeKind::Interface | NodeKind::TypeAlias
        )
    }

    fn name_of(&self, node: &NodeId) -> String {
        self.node(*node).name.clone()
    }

    fn text_of(&self, node: &NodeId) -> String {
        self.node(*node).text.clone()
    }

    fn base_types_of(&self, ty: &TypeId) -> Vec<BaseType<TypeId>> {
        self.type_data(*ty)
            .base_types
            .iter()
            .map(|base| match base {
                BaseTypeRef::Type(id) => BaseType::Resolved(*id),
                BaseTypeRef::Expression { expression } => BaseType::Unresolvable {
                    expression: expression.clone(),
                },
            })
            .collect()
    }

    fn index_signatures_of(&self, ty: &TypeId) -> Vec<TypeId> {
        self.type_data(*ty).index_signatures.clone()
    }

    fn nested_types_of(&self, ty: &TypeId) -> Vec<TypeId> {
        self.type_data(*ty).nested.clone()
    }
}

/// Handle to a declaration created by [`TypeGraphBuilder::declare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclHandle {
    pub node: NodeId,
    pub symbol: SymbolId,
    /// The declared type of the symbol
    pub ty: TypeId,
}

/// Incremental construction of a [`TypeGraph`] for tests and fixtures.
///
/// Declarations get their own symbol and type up front, so members can point
/// at types declared later (or at themselves) before the graph is built.
#[derive(Debug, Default)]
pub struct TypeGraphBuilder {
    data: GraphData,
    primitives: HashMap<String, TypeId>,
}

impl TypeGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_type(&mut self, ty: TypeData) -> TypeId {
        let id = TypeId(self.data.types.len() as u32);
        self.data.types.push(ty);
        id
    }

    fn push_symbol(&mut self, symbol: SymbolData) -> SymbolId {
        let id = SymbolId(self.data.symbols.len() as u32);
        self.data.symbols.push(symbol);
        id
    }

    fn push_node(&mut self, node: NodeData) -> NodeId {
        let id = NodeId(self.data.nodes.len() as u32);
        self.data.nodes.push(node);
        id
    }

    /// A type without a backing symbol, shared per display name.
    pub fn primitive(&mut self, display: &str) -> TypeId {
        if let Some(&id) = self.primitives.get(display) {
            return id;
        }
        let id = self.push_type(TypeData {
            display: Some(display.to_string()),
            ..TypeData::default()
        });
        self.primitives.insert(display.to_string(), id);
        id
    }

    /// An anonymous type wrapping other types (array, union, generic instance).
    pub fn composite(&mut self, display: &str, nested: &[TypeId]) -> TypeId {
        self.push_type(TypeData {
            display: Some(display.to_string()),
            nested: nested.to_vec(),
            ..TypeData::default()
        })
    }

    /// Add `inner` to the nested types of `ty`. Needed for recursive types,
    /// whose nesting cannot be given up front.
    pub fn nest(&mut self, ty: TypeId, inner: TypeId) {
        self.data.types[ty.index()].nested.push(inner);
    }

    /// An anonymous object type such as the body of `type T = { ... }`.
    pub fn object_type(&mut self) -> TypeId {
        self.push_type(TypeData::default())
    }

    /// A type whose backing symbol has no declarations.
    pub fn undeclared_symbol_type(&mut self, name: &str) -> TypeId {
        let ty = self.push_type(TypeData {
            display: Some(name.to_string()),
            ..TypeData::default()
        });
        let symbol = self.push_symbol(SymbolData {
            name: name.to_string(),
            ty,
            declarations: Vec::new(),
        });
        self.data.types[ty.index()].symbol = Some(symbol);
        ty
    }

    /// Declare an interface (or class/enum) with a fresh symbol and type.
    pub fn declare(
        &mut self,
        kind: NodeKind,
        name: &str,
        text: &str,
        module: &str,
        exported: bool,
    ) -> DeclHandle {
        let ty = self.push_type(TypeData {
            display: Some(name.to_string()),
            ..TypeData::default()
        });
        let symbol = self.push_symbol(SymbolData {
            name: name.to_string(),
            ty,
            declarations: Vec::new(),
        });
        self.data.types[ty.index()].symbol = Some(symbol);
        let node = self.add_declaration(symbol, kind, name, text, module, exported);
        DeclHandle { node, symbol, ty }
    }

    pub fn interface(&mut self, name: &str, text: &str, module: &str, exported: bool) -> DeclHandle {
        self.declare(NodeKind::Interface, name, text, module, exported)
    }

    /// Declare a type alias whose declared type is `target`.
    pub fn type_alias(
        &mut self,
        name: &str,
        text: &str,
        module: &str,
        exported: bool,
        target: TypeId,
    ) -> DeclHandle {
        let symbol = self.push_symbol(SymbolData {
            name: name.to_string(),
            ty: target,
            declarations: Vec::new(),
        });
        let node = self.add_declaration(symbol, NodeKind::TypeAlias, name, text, module, exported);
        DeclHandle {
            node,
            symbol,
            ty: target,
        }
    }

    /// Attach another declaration to an existing symbol (declaration merging).
    pub fn add_declaration(
        &mut self,
        symbol: SymbolId,
        kind: NodeKind,
        name: &str,
        text: &str,
        module: &str,
        exported: bool,
    ) -> NodeId {
        let node = self.push_node(NodeData {
            name: name.to_string(),
            kind,
            text: text.to_string(),
            module: module.to_string(),
            exported,
            symbol: Some(symbol),
        });
        self.data.symbols[symbol.index()].declarations.push(node);
        node
    }

    /// A declaration node the checker could not bind to a symbol.
    pub fn unbound(&mut self, kind: NodeKind, name: &str, text: &str, module: &str) -> NodeId {
        self.push_node(NodeData {
            name: name.to_string(),
            kind,
            text: text.to_string(),
            module: module.to_string(),
            exported: false,
            symbol: None,
        })
    }

    pub fn property(&mut self, owner: TypeId, name: &str, ty: TypeId) -> SymbolId {
        let property = self.push_symbol(SymbolData {
            name: name.to_string(),
            ty,
            declarations: Vec::new(),
        });
        self.data.types[owner.index()].properties.push(property);
        property
    }

    pub fn extends(&mut self, ty: TypeId, base: TypeId) {
        self.data.types[ty.index()]
            .base_types
            .push(BaseTypeRef::Type(base));
    }

    pub fn extends_expression(&mut self, ty: TypeId, expression: &str) {
        self.data.types[ty.index()]
            .base_types
            .push(BaseTypeRef::Expression {
                expression: expression.to_string(),
            });
    }

    pub fn index_signature(&mut self, ty: TypeId, value: TypeId) {
        self.data.types[ty.index()].index_signatures.push(value);
    }

    pub fn file(&mut self, path: &str, statements: &[NodeId]) {
        self.data.files.push(SourceFile {
            path: path.to_string(),
            statements: statements.to_vec(),
        });
    }

    pub fn build(self) -> Result<TypeGraph, GraphError> {
        TypeGraph::try_from(self.data)
    }
}

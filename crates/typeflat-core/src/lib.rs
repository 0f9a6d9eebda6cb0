//! Core of the type declaration flattener
//!
//! Given the interface and type alias declarations of one file, typeflat walks
//! everything they reference through a [`TypeResolver`], collapses
//! declarations with identical text, gives colliding names distinct emitted
//! names and plans a single self-contained output file.
//!
//! ```
//! use typeflat_core::graph::TypeGraphBuilder;
//! use typeflat_core::{process_file, FlattenConfig, PathMapping};
//!
//! let mut g = TypeGraphBuilder::new();
//! let string = g.primitive("string");
//! let id = g.type_alias("Id", "export type Id = string", "/out/id.d.ts", true, string);
//! let graph = g.build().unwrap();
//!
//! let config = FlattenConfig::new(PathMapping::new("/out", "/src"));
//! let plan = process_file(&[id.node], &graph, &config).unwrap();
//! assert_eq!(plan.len(), 1);
//! assert!(plan.render().contains("import { Id as Id } from '/src/id';"));
//! ```

pub mod collector;
pub mod config;
pub mod debug;
pub mod declaration;
pub mod emit;
pub mod error;
pub mod fingerprint;
pub mod graph;
pub mod naming;
pub mod pipeline;
pub mod resolver;

pub use collector::collect;
pub use config::{CollectOptions, FlattenConfig, PathMapping, UnsupportedPolicy};
pub use declaration::{Declaration, DeclarationId, DeclarationSet};
pub use emit::{EmissionPlan, ImportStatement};
pub use error::{FlattenError, GraphError};
pub use naming::NameBinding;
pub use pipeline::{entry_points_of, process_file, process_file_traced};
pub use resolver::{BaseType, TypeResolver};

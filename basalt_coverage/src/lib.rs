//! # Basalt Coverage
//!
//! Source-based code coverage for the basalt backend: discovers
//! instrumentable regions in lowered IR, binds each to a counter slot,
//! places runtime counter increments during code generation, and emits the
//! coverage mapping payload profile tooling consumes.
//!
//! # Pipeline
//!
//! ```text
//! IR module → collect regions → place increments → emit mapping global
//!             (one walk per     (codegen's own     (one payload per
//!              function body)    walk, consulted)   module)
//! ```
//!
//! Collection assigns every region its counter slot in traversal order;
//! the injector and the writer both read that single enumeration, so the
//! runtime counters and the mapping can never disagree about slot numbers.
//! The whole subsystem is a deterministic, single-threaded transform:
//! identical input IR produces byte-identical payloads.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use basalt_ir::{FileIr, Function, Module, Node, NodeId, SourceFile, Span};
//! use basalt_coverage::codegen::{CodegenContext, CodegenModule, ObjectFormat};
//! use basalt_coverage::{collect_module, write_module};
//!
//! let text = "work()";
//! let body = Node::call(NodeId::new(0), "work", vec![], Span::new(0, 6));
//! let function = Function::new("pkg.main", "pkg_main", Span::new(0, 6), Some(body));
//! let module = Module::new(
//!     "demo",
//!     vec![FileIr::new(
//!         Arc::new(SourceFile::new("main.bs", text)),
//!         vec![function],
//!     )],
//! );
//!
//! let regions = collect_module(&module);
//! assert_eq!(regions.total_regions(), 1);
//!
//! let mut ctx = CodegenContext::with_module(CodegenModule::new("demo", ObjectFormat::Elf));
//! let id = write_module(&regions, &mut ctx).expect("codegen module is initialized");
//! let module = ctx.module.unwrap();
//! assert_eq!(module.global(id).section, Some("__llvm_covmap"));
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

pub mod codegen;
pub mod collect;
pub mod covmap;
pub mod error;
pub mod hash;
pub mod instrument;
pub mod region;
pub mod report;
pub mod writer;

pub use collect::{collect_function, collect_module};
pub use error::{CoverageError, CoverageResult};
pub use hash::stable_name_hash;
pub use instrument::{IncrementArgs, Instrumenter, Intrinsic};
pub use region::{
    CounterId, FileId, FileTable, FunctionRegions, ModuleRegions, Region, SourceRegion,
};
pub use report::dump_mappings;
pub use writer::{add_function_names_global, write_module, ModuleCoverageState};

/// Basalt coverage subsystem version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

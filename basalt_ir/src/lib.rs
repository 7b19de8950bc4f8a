//! # Basalt IR
//!
//! The lowered, tree-shaped program representation consumed by the basalt
//! backend passes.
//!
//! This crate defines the read-only traversal surface later pipeline stages
//! (code generation, coverage instrumentation) walk:
//!
//! - **Spans**: byte offset ranges into source files
//! - **Source files**: file identity plus a line-offset table for resolving
//!   byte offsets to 1-based line/column positions
//! - **Nodes**: the expression/statement tree of a function body
//! - **Modules**: files and their declared functions
//!
//! The IR is produced once by the front end and never mutated by consumers;
//! all types here hand out shared references only.

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

pub mod module;
pub mod node;
pub mod source;
pub mod span;

pub use module::{FileIr, Function, Module};
pub use node::{Arm, Node, NodeId, NodeKind};
pub use source::SourceFile;
pub use span::Span;

/// Basalt IR version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Functions, files, and modules.
//!
//! A [`Module`] is one compilation unit: a set of [`FileIr`]s, each owning
//! its [`SourceFile`] and the functions declared in it. Lowering flattens
//! nested functions into the file-level declaration list; their original
//! position is kept as a [`crate::NodeKind::LocalFunction`] node in the
//! enclosing body.

use crate::node::Node;
use crate::source::SourceFile;
use crate::span::Span;
use std::sync::Arc;

/// A lowered function.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    /// Fully qualified name (`pkg.Outer.method`).
    pub name: Arc<str>,
    /// Linker symbol name.
    pub symbol: Arc<str>,
    /// Source extent of the whole declaration.
    pub span: Span,
    /// Body tree; `None` for a declaration without a body.
    pub body: Option<Node>,
}

impl Function {
    /// Create a function.
    #[must_use]
    pub fn new(
        name: impl Into<Arc<str>>,
        symbol: impl Into<Arc<str>>,
        span: Span,
        body: Option<Node>,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            span,
            body,
        }
    }

    /// Whether this is a body-less declaration.
    #[inline]
    #[must_use]
    pub fn is_declaration(&self) -> bool {
        self.body.is_none()
    }
}

/// One source file's worth of IR.
#[derive(Debug, Clone, PartialEq)]
pub struct FileIr {
    /// The file the functions were parsed from.
    pub source: Arc<SourceFile>,
    /// Declared functions in source order, nested functions included
    /// (lowering lifts them here).
    pub functions: Vec<Function>,
}

impl FileIr {
    /// Create a file from its source and declarations.
    #[must_use]
    pub fn new(source: Arc<SourceFile>, functions: Vec<Function>) -> Self {
        Self { source, functions }
    }
}

/// A compilation unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    /// Module name.
    pub name: Arc<str>,
    /// Files in compilation order.
    pub files: Vec<FileIr>,
}

impl Module {
    /// Create a module.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>, files: Vec<FileIr>) -> Self {
        Self {
            name: name.into(),
            files,
        }
    }

    /// Total number of declared functions across all files.
    #[must_use]
    pub fn function_count(&self) -> usize {
        self.files.iter().map(|f| f.functions.len()).sum()
    }
}

//! Region collection.
//!
//! One depth-first pre-order walk per function body, children in program
//! order. Calls and conditional arms produce regions; every other node kind
//! is traversed transitively. The walk is the enumeration: counter ids fall
//! out of recording order, so an identical module always collects an
//! identical, identically-ordered region list.
//!
//! Policy notes, held as invariants:
//!
//! - The head of a conditional produces no region of its own; each arm
//!   produces exactly one. Head execution is recoverable downstream as the
//!   sum of the arm counters.
//! - An arm's condition is visited before the arm's own region is recorded:
//!   the condition evaluates before the arm is entered, and region order
//!   follows execution order.
//! - Local function declarations are never descended into here; lowering
//!   also lists them at file level, where they are collected on their own.

use basalt_ir::{Arm, Function, Module, Node, NodeId, NodeKind, SourceFile, Span};
use log::debug;

use crate::region::{FileId, FileTable, FunctionRegions, ModuleRegions, SourceRegion};

/// Collect coverage regions for every function declared in a module.
///
/// File ids are assigned in first-encountered order and functions appear in
/// declaration order, so the result is deterministic for identical input.
#[must_use]
pub fn collect_module(module: &Module) -> ModuleRegions {
    let mut file_table = FileTable::new();
    let mut functions = Vec::with_capacity(module.function_count());

    for file in &module.files {
        let file_id = file_table.intern(file.source.path());
        for function in &file.functions {
            functions.push(collect_function(function, &file.source, file_id));
        }
    }

    debug!(
        "collected {} regions across {} functions in `{}`",
        functions.iter().map(FunctionRegions::len).sum::<usize>(),
        functions.len(),
        module.name
    );
    ModuleRegions {
        file_table,
        functions,
    }
}

/// Collect the regions of a single function.
///
/// A body-less declaration yields an empty region set; that is a normal
/// outcome, not an error.
#[must_use]
pub fn collect_function(
    function: &Function,
    source: &SourceFile,
    file: FileId,
) -> FunctionRegions {
    let mut regions = FunctionRegions::new(function.name.clone(), function.symbol.clone(), file);
    if let Some(body) = &function.body {
        let mut collector = Collector {
            source,
            file,
            regions: &mut regions,
        };
        collector.visit(body);
    }
    debug!("`{}`: {} regions", function.name, regions.len());
    regions
}

/// Walks one function body, recording regions as it goes.
struct Collector<'a> {
    source: &'a SourceFile,
    file: FileId,
    regions: &'a mut FunctionRegions,
}

impl Collector<'_> {
    fn visit(&mut self, node: &Node) {
        match &node.kind {
            NodeKind::Call { args, .. } => {
                self.record(node.id, node.span);
                for arg in args {
                    self.visit(arg);
                }
            }
            NodeKind::Conditional { arms } => {
                for arm in arms {
                    self.visit_arm(arm);
                }
            }
            NodeKind::Block(nodes) => {
                for node in nodes {
                    self.visit(node);
                }
            }
            NodeKind::Return(value) => {
                if let Some(value) = value {
                    self.visit(value);
                }
            }
            // Collected independently via its file-level declaration.
            NodeKind::LocalFunction(_) => {}
            NodeKind::Literal | NodeKind::Name(_) => {}
        }
    }

    fn visit_arm(&mut self, arm: &Arm) {
        if let Some(condition) = &arm.condition {
            self.visit(condition);
        }
        self.record(arm.id, arm.span);
        self.visit(&arm.body);
    }

    fn record(&mut self, node: NodeId, span: Span) {
        let region = SourceRegion::from_span(self.source, span);
        let counter = self.regions.record(node, self.file, region);
        debug!("  {} -> {} @ {}", node, counter, region);
    }
}

//! Counter increment injection.
//!
//! Code generation walks each function body a second time, independently
//! of collection, and consults the [`Instrumenter`] at every node. Nodes
//! that collected a region get one call to the runtime increment primitive
//! placed at their entry, so the increment dominates the path it measures.
//! The increment carries the function's name global, its stable name hash,
//! the total counter count, and the region's slot; parity with collection
//! is structural, because both sides read the same [`FunctionRegions`].

use basalt_ir::{Arm, Node, NodeId, NodeKind};
use log::debug;

use crate::codegen::{CodegenModule, Global, GlobalId};
use crate::region::{CounterId, FunctionRegions};

/// Symbol prefix of per-function coverage name globals.
pub const NAME_GLOBAL_PREFIX: &str = "__covname_";

/// Runtime primitives the injector places calls to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intrinsic {
    /// `counter_increment(name, hash, total_regions, index)`: bump one
    /// counter slot of one function's counter array.
    CounterIncrement,
}

/// Arguments of one placed counter increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncrementArgs {
    /// The function's coverage name global.
    pub name_global: GlobalId,
    /// Stable hash of the function's qualified name.
    pub function_hash: u64,
    /// Total number of counter slots in the function.
    pub total_regions: u32,
    /// Slot to increment.
    pub counter: CounterId,
}

/// Places counter increments while code generation walks one function.
///
/// The placement callback is supplied by the code generator and inserts
/// the call at its current cursor; the injector never touches the
/// instruction stream itself.
pub struct Instrumenter<'a, F>
where
    F: FnMut(Intrinsic, IncrementArgs),
{
    regions: &'a FunctionRegions,
    name_global: Option<GlobalId>,
    place: F,
}

impl<'a, F> Instrumenter<'a, F>
where
    F: FnMut(Intrinsic, IncrementArgs),
{
    /// Create an instrumenter for one function.
    ///
    /// Creates the function's coverage name global up front. A function
    /// with no regions creates nothing and will place nothing; that is a
    /// normal outcome, not an error.
    pub fn new(module: &mut CodegenModule, regions: &'a FunctionRegions, place: F) -> Self {
        let name_global = if regions.is_empty() {
            None
        } else {
            let symbol = regions.symbol();
            Some(module.add_global(Global::new(
                format!("{NAME_GLOBAL_PREFIX}{symbol}"),
                symbol.as_bytes().to_vec(),
            )))
        };
        Self {
            regions,
            name_global,
            place,
        }
    }

    /// The function's coverage name global, if any regions exist.
    #[inline]
    #[must_use]
    pub fn name_global(&self) -> Option<GlobalId> {
        self.name_global
    }

    /// Place the increment for one node, if it has a region.
    ///
    /// Code generation calls this immediately before emitting the node's
    /// own code.
    pub fn instrument_node(&mut self, node: NodeId) {
        let (Some(region), Some(name_global)) = (self.regions.get(node), self.name_global)
        else {
            return;
        };
        let args = IncrementArgs {
            name_global,
            function_hash: self.regions.hash(),
            total_regions: self.regions.len() as u32,
            counter: region.counter,
        };
        debug!(
            "`{}`: increment {} of {} at {}",
            self.regions.name(),
            region.counter,
            args.total_regions,
            node
        );
        (self.place)(Intrinsic::CounterIncrement, args);
    }

    /// Walk a full body in code generation order, placing every increment.
    ///
    /// The walk mirrors collection exactly: calls at entry, arms after
    /// their condition, local functions skipped. Increments therefore come
    /// out in counter id order, one per collected region.
    pub fn instrument_body(&mut self, body: &Node) {
        self.walk(body);
    }

    fn walk(&mut self, node: &Node) {
        match &node.kind {
            NodeKind::Call { args, .. } => {
                self.instrument_node(node.id);
                for arg in args {
                    self.walk(arg);
                }
            }
            NodeKind::Conditional { arms } => {
                for arm in arms {
                    self.walk_arm(arm);
                }
            }
            NodeKind::Block(nodes) => {
                for node in nodes {
                    self.walk(node);
                }
            }
            NodeKind::Return(value) => {
                if let Some(value) = value {
                    self.walk(value);
                }
            }
            // Instrumented when its file-level declaration is generated.
            NodeKind::LocalFunction(_) => {}
            NodeKind::Literal | NodeKind::Name(_) => {}
        }
    }

    fn walk_arm(&mut self, arm: &Arm) {
        if let Some(condition) = &arm.condition {
            self.walk(condition);
        }
        self.instrument_node(arm.id);
        self.walk(&arm.body);
    }
}

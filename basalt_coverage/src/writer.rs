//! Coverage mapping emission.
//!
//! The final pass over a module's collected regions: encode one mapping
//! blob per instrumented function, assemble the module payload, and attach
//! it to the generated module as the coverage global. All accumulation
//! happens in a [`ModuleCoverageState`] local to one write call; the
//! region data itself is only borrowed.

use log::debug;
use smallvec::SmallVec;

use crate::codegen::{CodegenContext, CodegenModule, Global, GlobalId, Linkage};
use crate::covmap::{
    emit_coverage_data, encode_filenames, encode_region_mapping, sum_counters, FunctionRecord,
    COVMAP_ALIGN,
};
use crate::error::{CoverageError, CoverageResult};
use crate::region::{CounterId, FileId, FunctionRegions, ModuleRegions, Region};

/// Symbol name of the module coverage global.
pub const COVMAP_GLOBAL: &str = "__llvm_coverage_mapping";

/// Symbol name of the unreferenced-names global.
pub const COV_NAMES_GLOBAL: &str = "__llvm_coverage_names";

/// Accumulated per-module output of the write pass.
///
/// Single-writer by construction: one value exists per write call, owned
/// by it, appended to function by function.
#[derive(Debug, Default)]
pub struct ModuleCoverageState {
    records: Vec<FunctionRecord>,
}

impl ModuleCoverageState {
    fn push(&mut self, record: FunctionRecord) {
        self.records.push(record);
    }

    /// Records accumulated so far, in function declaration order.
    #[must_use]
    pub fn records(&self) -> &[FunctionRecord] {
        &self.records
    }
}

/// Serialize a module's regions and attach the coverage global.
///
/// Functions with zero regions are skipped entirely: an empty mapping
/// keyed by a live hash would make downstream tooling report phantom
/// functions, so no record is emitted for them.
///
/// Returns the handle of the coverage global. Fails if code generation has
/// not produced a module yet, or if a function's region list violates the
/// encoder's ordering contract; both are pipeline bugs, not user errors.
pub fn write_module(
    regions: &ModuleRegions,
    ctx: &mut CodegenContext,
) -> CoverageResult<GlobalId> {
    let module = ctx
        .module
        .as_mut()
        .ok_or(CoverageError::ModuleNotInitialized)?;

    let mut state = ModuleCoverageState::default();
    for function in &regions.functions {
        if function.is_empty() {
            debug!("`{}`: no regions, no record", function.name());
            continue;
        }
        state.push(encode_function(function)?);
    }

    let filenames = encode_filenames(regions.file_table.paths());
    let data = emit_coverage_data(state.records(), &filenames);
    debug!(
        "coverage payload: {} records, {} files, {} bytes",
        state.records().len(),
        regions.file_table.len(),
        data.len()
    );

    let section = module.format().covmap_section();
    let id = module.add_global(
        Global::new(COVMAP_GLOBAL, data)
            .with_section(section)
            .with_align(COVMAP_ALIGN)
            .with_linkage(Linkage::Internal),
    );
    module.mark_used(id);
    Ok(id)
}

/// Encode one function's record.
fn encode_function(function: &FunctionRegions) -> CoverageResult<FunctionRecord> {
    // Virtual file table: distinct file ids in first-reference order.
    // Nearly always a single entry, hence the inline capacity.
    let mut file_ids: SmallVec<[FileId; 4]> = SmallVec::new();
    let mut regions: Vec<Region> = Vec::with_capacity(function.len());
    let mut counters: Vec<CounterId> = Vec::with_capacity(function.len());
    for (_, region) in function.iter() {
        if !file_ids.contains(&region.file) {
            file_ids.push(region.file);
        }
        regions.push(*region);
        counters.push(region.counter);
    }

    let tree = sum_counters(&counters);
    let mapping =
        encode_region_mapping(function.name(), &file_ids, &tree.expressions, &regions)?;
    debug!(
        "`{}`: {} regions encoded into {} bytes",
        function.name(),
        regions.len(),
        mapping.len()
    );
    Ok(FunctionRecord {
        name_hash: function.hash(),
        mapping,
    })
}

/// Record the coverage name globals of functions the generated code never
/// references, so downstream tooling still sees their mappings.
///
/// The global is internal metadata with no object section; it is dropped
/// silently when there is nothing to record.
pub fn add_function_names_global(
    module: &mut CodegenModule,
    name_globals: &[GlobalId],
) -> Option<GlobalId> {
    if name_globals.is_empty() {
        return None;
    }
    let data: Vec<u8> = name_globals
        .iter()
        .flat_map(|id| id.index().to_le_bytes())
        .collect();
    let id = module.add_global(Global::new(COV_NAMES_GLOBAL, data).with_linkage(Linkage::Internal));
    Some(id)
}

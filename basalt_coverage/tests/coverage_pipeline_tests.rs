//! End-to-end tests for the coverage pipeline.
//!
//! These tests run the full collect → instrument → write sequence over
//! small hand-built modules and check the externally visible contract:
//! deterministic payload bytes, dense counter ids, stable file ids, one
//! increment per region, and the documented treatment of empty functions.

use std::sync::Arc;

use basalt_coverage::codegen::{CodegenContext, CodegenModule, GlobalId, Linkage, ObjectFormat};
use basalt_coverage::covmap::COVMAP_ALIGN;
use basalt_coverage::writer::COVMAP_GLOBAL;
use basalt_coverage::{
    collect_module, write_module, IncrementArgs, Instrumenter, ModuleRegions,
};
use basalt_ir::{Arm, FileIr, Function, Module, Node, NodeId, SourceFile, Span};

// =============================================================================
// Test Helpers
// =============================================================================

fn span(start: u32, end: u32) -> Span {
    Span::new(start, end)
}

fn single_file_module(path: &str, text: &str, functions: Vec<Function>) -> Module {
    Module::new(
        "test",
        vec![FileIr::new(
            Arc::new(SourceFile::new(path, text)),
            functions,
        )],
    )
}

/// A function whose body is one call nested in a two-arm conditional:
/// `if flag { work() } else { fallback() }`.
fn conditional_function(name: &str) -> (String, Function) {
    //          0         1         2         3
    //          0123456789012345678901234567890123456789
    let text = "if flag { work() } else { fallback() }".to_string();
    let then_call = Node::call(NodeId::new(3), "work", vec![], span(10, 16));
    let then_arm = Arm::new(
        NodeId::new(1),
        Some(Node::name(NodeId::new(2), "flag", span(3, 7))),
        then_call,
        span(8, 18),
    );
    let else_call = Node::call(NodeId::new(5), "fallback", vec![], span(26, 36));
    let else_arm = Arm::new(NodeId::new(4), None, else_call, span(24, 38));
    let body = Node::conditional(NodeId::new(0), vec![then_arm, else_arm], span(0, 38));
    let symbol = name.replace('.', "_");
    (
        text.clone(),
        Function::new(name, symbol, span(0, 38), Some(body)),
    )
}

/// Run collection and a full instrumentation walk, returning the placed
/// increments per function.
fn collect_and_instrument(module: &Module) -> (ModuleRegions, Vec<Vec<IncrementArgs>>) {
    let regions = collect_module(module);
    let mut codegen = CodegenModule::new("test", ObjectFormat::Elf);

    let mut placements = Vec::new();
    let mut index = 0;
    for file in &module.files {
        for function in &file.functions {
            let mut placed = Vec::new();
            {
                let mut instrumenter =
                    Instrumenter::new(&mut codegen, &regions.functions[index], |_, args| {
                        placed.push(args)
                    });
                if let Some(body) = &function.body {
                    instrumenter.instrument_body(body);
                }
            }
            placements.push(placed);
            index += 1;
        }
    }
    (regions, placements)
}

/// Run the write pass against a fresh ELF module and return the payload.
fn write_payload(regions: &ModuleRegions) -> (Vec<u8>, GlobalId, CodegenModule) {
    let mut ctx = CodegenContext::with_module(CodegenModule::new("test", ObjectFormat::Elf));
    let id = write_module(regions, &mut ctx).expect("write succeeds");
    let module = ctx.module.expect("module exists");
    let data = module.global(id).data.clone();
    (data, id, module)
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(data[offset..offset + 4].try_into().expect("4 bytes"))
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn test_pipeline_is_byte_deterministic() {
    let build = || {
        let (text, function) = conditional_function("pkg.choose");
        single_file_module("choose.bs", &text, vec![function])
    };

    let (payload_a, _, _) = write_payload(&collect_module(&build()));
    let (payload_b, _, _) = write_payload(&collect_module(&build()));
    assert_eq!(payload_a, payload_b);
}

// =============================================================================
// Counter Enumeration
// =============================================================================

#[test]
fn test_counter_ids_are_dense() {
    let (text, function) = conditional_function("pkg.choose");
    let module = single_file_module("choose.bs", &text, vec![function]);
    let regions = collect_module(&module);

    let mut ids: Vec<u32> = regions.functions[0]
        .iter()
        .map(|(_, region)| region.counter.index())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, (0..regions.functions[0].len() as u32).collect::<Vec<_>>());
}

#[test]
fn test_conditional_scenario_collects_three_regions_in_order() {
    let (text, function) = conditional_function("pkg.choose");
    let module = single_file_module("choose.bs", &text, vec![function]);
    let (regions, placements) = collect_and_instrument(&module);

    // Then-arm, its call, else-arm: ids 0, 1, 2 in traversal order.
    // The else arm's call gets 3; the head has no region.
    let function_regions = &regions.functions[0];
    assert_eq!(function_regions.len(), 4);
    assert_eq!(
        function_regions
            .get(NodeId::new(1))
            .expect("then arm")
            .counter
            .index(),
        0
    );
    assert_eq!(
        function_regions
            .get(NodeId::new(3))
            .expect("then call")
            .counter
            .index(),
        1
    );
    assert_eq!(
        function_regions
            .get(NodeId::new(4))
            .expect("else arm")
            .counter
            .index(),
        2
    );
    assert!(function_regions.get(NodeId::new(0)).is_none());

    // Increments mirror collection exactly.
    let placed: Vec<u32> = placements[0].iter().map(|a| a.counter.index()).collect();
    assert_eq!(placed, vec![0, 1, 2, 3]);
}

// =============================================================================
// Injection / Collection Parity
// =============================================================================

#[test]
fn test_increment_count_matches_region_count() {
    let (text_a, f_a) = conditional_function("pkg.a");
    let (_, f_b) = conditional_function("pkg.b");
    let declaration = Function::new("pkg.ext", "pkg_ext", span(0, 5), None);
    let module = single_file_module("two.bs", &text_a, vec![f_a, f_b, declaration]);

    let (regions, placements) = collect_and_instrument(&module);
    for (function, placed) in regions.functions.iter().zip(&placements) {
        assert_eq!(function.len(), placed.len());
    }
}

#[test]
fn test_increments_carry_function_identity() {
    let (text, function) = conditional_function("pkg.choose");
    let module = single_file_module("choose.bs", &text, vec![function]);
    let (regions, placements) = collect_and_instrument(&module);

    let function_regions = &regions.functions[0];
    let total = function_regions.len() as u32;
    for args in &placements[0] {
        assert_eq!(args.function_hash, function_regions.hash());
        assert_eq!(args.total_regions, total);
    }
}

// =============================================================================
// Empty Functions
// =============================================================================

#[test]
fn test_empty_function_yields_no_regions_no_increments_no_record() {
    let declaration = Function::new("pkg.ext", "pkg_ext", span(0, 5), None);
    let module = single_file_module("ext.bs", "ext()", vec![declaration]);
    let (regions, placements) = collect_and_instrument(&module);

    assert!(regions.functions[0].is_empty());
    assert!(placements[0].is_empty());

    let (payload, _, _) = write_payload(&regions);
    assert_eq!(read_u32(&payload, 0), 0, "no function record");
    // The file is still listed: file ids are assigned per file, not per
    // region.
    assert_eq!(regions.file_table.len(), 1);
}

// =============================================================================
// File Ids
// =============================================================================

#[test]
fn test_same_file_functions_share_file_id() {
    let (text, f_a) = conditional_function("pkg.a");
    let (_, f_b) = conditional_function("pkg.b");
    let module = single_file_module("shared.bs", &text, vec![f_a, f_b]);

    let regions = collect_module(&module);
    for function in &regions.functions {
        for (_, region) in function.iter() {
            assert_eq!(region.file.index(), 0);
        }
    }
}

#[test]
fn test_two_files_first_encountered_order() {
    let make_file = |path: &str, callee: &str| {
        let text = format!("{callee}()");
        let len = text.len() as u32;
        let body = Node::call(NodeId::new(0), callee, vec![], span(0, len));
        FileIr::new(
            Arc::new(SourceFile::new(path, &text)),
            vec![Function::new(
                format!("pkg.{callee}"),
                format!("pkg_{callee}"),
                span(0, len),
                Some(body),
            )],
        )
    };
    let module = Module::new("m", vec![make_file("first.bs", "a"), make_file("second.bs", "b")]);

    let regions = collect_module(&module);
    let paths: Vec<&str> = regions
        .file_table
        .paths()
        .iter()
        .map(|p| p.as_ref())
        .collect();
    assert_eq!(paths, vec!["first.bs", "second.bs"]);
    assert_eq!(regions.functions[0].file().index(), 0);
    assert_eq!(regions.functions[1].file().index(), 1);

    // The payload's filenames section lists both, in order.
    let (payload, _, _) = write_payload(&regions);
    let records = read_u32(&payload, 0) as usize;
    let filenames_start = 16 + records * 20;
    assert_eq!(payload[filenames_start], 2, "two filenames");
    assert_eq!(payload[filenames_start + 1], 8, "first.bs is 8 bytes");
    assert_eq!(
        &payload[filenames_start + 2..filenames_start + 10],
        b"first.bs"
    );
}

// =============================================================================
// Nested Functions
// =============================================================================

#[test]
fn test_nested_function_not_double_counted() {
    let text = "fun outer() { fun inner() { leak() } }";
    let leak = Node::call(NodeId::new(0), "leak", vec![], span(28, 34));
    let inner = Function::new("pkg.outer.inner", "pkg_outer_inner", span(14, 36), Some(leak));
    let outer_body = Node::block(
        NodeId::new(1),
        vec![Node::local_function(NodeId::new(2), inner.clone(), span(14, 36))],
        span(12, 38),
    );
    let outer = Function::new("pkg.outer", "pkg_outer", span(0, 38), Some(outer_body));
    let module = single_file_module("nested.bs", text, vec![outer, inner]);

    let (regions, placements) = collect_and_instrument(&module);
    assert!(regions.functions[0].is_empty());
    assert!(placements[0].is_empty());
    assert_eq!(regions.functions[1].len(), 1);
    assert_eq!(placements[1].len(), 1);
    assert_eq!(regions.total_regions(), 1);
}

// =============================================================================
// Written Payload
// =============================================================================

#[test]
fn test_payload_global_placement() {
    let (text, function) = conditional_function("pkg.choose");
    let module = single_file_module("choose.bs", &text, vec![function]);
    let (payload, id, codegen) = write_payload(&collect_module(&module));

    let global = codegen.global(id);
    assert_eq!(global.name.as_ref(), COVMAP_GLOBAL);
    assert_eq!(global.section, Some("__llvm_covmap"));
    assert_eq!(global.align, COVMAP_ALIGN);
    assert_eq!(global.linkage, Linkage::Internal);
    assert!(codegen.is_used(id));
    assert_eq!(payload.len() % 8, 0);
}

#[test]
fn test_record_blob_encodes_all_regions() {
    let (text, function) = conditional_function("pkg.choose");
    let module = single_file_module("choose.bs", &text, vec![function]);
    let regions = collect_module(&module);
    let (payload, _, _) = write_payload(&regions);

    assert_eq!(read_u32(&payload, 0), 1, "one record");
    let data_size = read_u32(&payload, 24) as usize;
    let filenames_size = read_u32(&payload, 4) as usize;
    let blob_start = 16 + 20 + filenames_size;
    let blob = &payload[blob_start..blob_start + data_size];

    // Four counters pairwise-sum into three addition expressions; the blob
    // opens with the virtual file table, the expression table, then the
    // region count.
    assert_eq!(&blob[0..2], &[1, 0], "one virtual file, module id 0");
    assert_eq!(blob[2], 3, "three expressions");
    // Expression operands: (c0+c1), (e0+c2), (e1+c3).
    assert_eq!(&blob[3..9], &[1, 5, 3, 9, 7, 13]);
    assert_eq!(blob[9], 4, "four regions in the single file run");
}

#[test]
fn test_hash_is_shared_between_injector_and_payload() {
    let (text, function) = conditional_function("pkg.choose");
    let module = single_file_module("choose.bs", &text, vec![function]);
    let (regions, placements) = collect_and_instrument(&module);
    let (payload, _, _) = write_payload(&regions);

    let name_ref = u64::from_le_bytes(payload[16..24].try_into().expect("8 bytes"));
    assert_eq!(name_ref, regions.functions[0].hash());
    assert_eq!(name_ref, placements[0][0].function_hash);
}

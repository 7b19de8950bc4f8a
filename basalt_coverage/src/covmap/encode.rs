//! Binary encoding of the coverage mapping payload.
//!
//! The payload is a versioned external contract consumed by profile
//! tooling; the layout here reproduces it byte for byte and must not be
//! "improved". All variable-width integers are ULEB128, all fixed-width
//! fields little-endian.
//!
//! # Per-function mapping blob
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ num_file_ids, file_id*          virtual file table       │
//! │ num_expressions, (lhs, rhs)*    expression table         │
//! │ per file, in table order:                                │
//! │   num_regions                                            │
//! │   (counter, Δstart_line, start_col, num_lines, end_col)* │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Region start lines are delta-encoded against the previous region of the
//! same file, so regions must arrive grouped by file id (in virtual table
//! order) and with non-decreasing start lines inside each group.
//!
//! # Module payload
//!
//! Header of four `u32`s (record count, filenames size, mapping size,
//! format version), then one packed record per function
//! (`name_ref: u64, data_size: u32, func_hash: u64`), then the filenames
//! section and every mapping blob back to back, zero-padded to 8 bytes.

use std::sync::Arc;

use crate::covmap::counter::{Counter, CounterExpression};
use crate::error::{CoverageError, CoverageResult};
use crate::region::{FileId, Region};

/// Format version emitted in the payload header.
pub const COVMAP_VERSION: u32 = 1;

/// Required alignment of the module coverage global.
pub const COVMAP_ALIGN: u32 = 8;

/// Append a ULEB128-encoded value.
pub(crate) fn write_uleb128(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if value == 0 {
            break;
        }
    }
}

#[inline]
fn put_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

#[inline]
fn put_u64(buf: &mut Vec<u8>, value: u64) {
    buf.extend_from_slice(&value.to_le_bytes());
}

/// One function's contribution to the module payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRecord {
    /// Stable hash of the qualified function name; the record key.
    pub name_hash: u64,
    /// Encoded region mapping blob.
    pub mapping: Vec<u8>,
}

/// Encode one function's region mapping blob.
///
/// `file_ids` is the function's virtual file table: the distinct module
/// file ids its regions reference, in first-reference order. `regions`
/// must be grouped by file in that same order, each group with
/// non-decreasing start lines; that falls out of collection order
/// naturally, so a violation is a precondition failure upstream and is
/// rejected rather than reordered here.
pub fn encode_region_mapping(
    function: &str,
    file_ids: &[FileId],
    expressions: &[CounterExpression],
    regions: &[Region],
) -> CoverageResult<Vec<u8>> {
    let mut buf = Vec::new();

    write_uleb128(&mut buf, file_ids.len() as u64);
    for file_id in file_ids {
        write_uleb128(&mut buf, u64::from(file_id.index()));
    }

    write_uleb128(&mut buf, expressions.len() as u64);
    for expression in expressions {
        write_uleb128(&mut buf, expression.lhs.encode(expressions));
        write_uleb128(&mut buf, expression.rhs.encode(expressions));
    }

    // One region run per virtual file table entry; a region's position in
    // the run identifies its file, so the tuples carry no file id.
    let mut cursor = 0usize;
    for file_id in file_ids {
        let run_start = cursor;
        while cursor < regions.len() && regions[cursor].file == *file_id {
            cursor += 1;
        }
        let run = &regions[run_start..cursor];
        if run.is_empty() {
            return Err(CoverageError::malformed(
                function,
                format!("file id {} is in the file table but has no regions", file_id.index()),
            ));
        }

        write_uleb128(&mut buf, run.len() as u64);
        let mut prev_line = 0u32;
        for region in run {
            let span = region.span;
            if (span.end_line, span.end_col) < (span.start_line, span.start_col) {
                return Err(CoverageError::malformed(
                    function,
                    format!("inverted region {span}"),
                ));
            }
            if span.start_line < prev_line {
                return Err(CoverageError::malformed(
                    function,
                    format!("region {span} starts before its predecessor"),
                ));
            }
            write_uleb128(&mut buf, Counter::CounterRef(region.counter).encode(expressions));
            write_uleb128(&mut buf, u64::from(span.start_line - prev_line));
            write_uleb128(&mut buf, u64::from(span.start_col));
            write_uleb128(&mut buf, u64::from(span.end_line - span.start_line));
            write_uleb128(&mut buf, u64::from(span.end_col));
            prev_line = span.start_line;
        }
    }
    if cursor != regions.len() {
        return Err(CoverageError::malformed(
            function,
            "regions are not grouped by the file table order",
        ));
    }

    Ok(buf)
}

/// Encode the module filenames section: a count, then each path
/// length-prefixed.
#[must_use]
pub fn encode_filenames(paths: &[Arc<str>]) -> Vec<u8> {
    let mut buf = Vec::new();
    write_uleb128(&mut buf, paths.len() as u64);
    for path in paths {
        write_uleb128(&mut buf, path.len() as u64);
        buf.extend_from_slice(path.as_bytes());
    }
    buf
}

/// Assemble the full module payload.
///
/// The reported mapping size includes the trailing padding that brings the
/// filenames-plus-mappings payload to a multiple of 8 bytes, matching what
/// readers of the section expect.
#[must_use]
pub fn emit_coverage_data(records: &[FunctionRecord], filenames: &[u8]) -> Vec<u8> {
    let raw_mapping_size: usize = records.iter().map(|r| r.mapping.len()).sum();
    let payload_size = filenames.len() + raw_mapping_size;
    let padding = (COVMAP_ALIGN as usize - payload_size % COVMAP_ALIGN as usize)
        % COVMAP_ALIGN as usize;

    let mut buf = Vec::with_capacity(16 + records.len() * 20 + payload_size + padding);
    put_u32(&mut buf, records.len() as u32);
    put_u32(&mut buf, filenames.len() as u32);
    put_u32(&mut buf, (raw_mapping_size + padding) as u32);
    put_u32(&mut buf, COVMAP_VERSION);

    for record in records {
        put_u64(&mut buf, record.name_hash);
        put_u32(&mut buf, record.mapping.len() as u32);
        put_u64(&mut buf, record.name_hash);
    }

    buf.extend_from_slice(filenames);
    for record in records {
        buf.extend_from_slice(&record.mapping);
    }
    buf.extend(std::iter::repeat(0u8).take(padding));
    buf
}

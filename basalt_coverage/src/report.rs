//! Human-readable dump of collected mappings.
//!
//! A debugging aid for inspecting what collection produced without
//! decoding the binary payload: one header line per function, one indented
//! line per region in counter order.

use std::io::{self, Write};

use crate::region::ModuleRegions;

/// Write a plain-text listing of every collected region.
///
/// Format:
///
/// ```text
/// src/main.bs pkg.main
/// 0: 3:5 - 3:16
/// 1: 5:9 - 7:10
/// ```
///
/// Functions with no regions still get their header line, so the listing
/// shows everything collection looked at.
pub fn dump_mappings(regions: &ModuleRegions, out: &mut impl Write) -> io::Result<()> {
    for function in &regions.functions {
        let path = regions.file_table.path(function.file());
        writeln!(out, "{} {}", path, function.name())?;
        for (_, region) in function.iter() {
            writeln!(out, "{}: {}", region.counter.index(), region.span)?;
        }
    }
    Ok(())
}

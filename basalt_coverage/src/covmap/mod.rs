//! The coverage mapping wire format.
//!
//! Split into the counter/expression model ([`counter`]) and the byte-level
//! encoders ([`encode`]). The writer drives both; nothing else in the
//! subsystem touches raw bytes.

pub mod counter;
pub mod encode;

pub use counter::{sum_counters, Counter, CounterExpression, ExprKind, ExpressionTree};
pub use encode::{
    emit_coverage_data, encode_filenames, encode_region_mapping, FunctionRecord, COVMAP_ALIGN,
    COVMAP_VERSION,
};

//! Stable function-name hashing.
//!
//! Every coverage record is keyed by a 64-bit hash of the function's
//! qualified name. The injector passes the same hash to the runtime
//! increment primitive, so the profile data and the mapping agree on the
//! key without either side recomputing it differently.

use rustc_hash::FxHasher;
use std::hash::Hasher;

/// Hash a qualified function name to its 64-bit coverage record key.
///
/// FxHasher is unseeded, so the result depends only on the name bytes:
/// repeated compilations of the same source produce identical keys.
#[must_use]
pub fn stable_name_hash(name: &str) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(name.as_bytes());
    hasher.finish()
}

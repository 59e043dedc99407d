//! Per-node memoization of generated code.

use axon_diagnostic::CompileResult;
use axon_types::ValueKind;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::compiled::Compiled;

/// Generation cache keyed by (target domain, tolerance presence).
///
/// Write-once per key: the first generation for a key is stored and every
/// later request returns the same artifact. The mutex is the seam that
/// keeps first-write behavior sound if tree construction is ever
/// parallelized; compilation today is single-threaded.
#[derive(Debug, Default)]
pub(crate) struct GenCache {
    slots: Mutex<FxHashMap<(ValueKind, bool), Compiled>>,
}

impl GenCache {
    pub(crate) fn new() -> Self {
        GenCache::default()
    }

    /// Cached artifact for `key`, or the result of `build`, stored.
    ///
    /// Errors are not cached: a failed generation is reported to the
    /// caller and the compile is abandoned wholesale.
    pub(crate) fn get_or_try_insert(
        &self,
        key: (ValueKind, bool),
        build: impl FnOnce() -> CompileResult<Compiled>,
    ) -> CompileResult<Compiled> {
        if let Some(hit) = self.slots.lock().get(&key) {
            return Ok(hit.clone());
        }
        // Built outside the lock: children take their own caches' locks.
        let artifact = build()?;
        let mut slots = self.slots.lock();
        let entry = slots.entry(key).or_insert(artifact);
        Ok(entry.clone())
    }
}

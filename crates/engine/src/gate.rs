use gatekeeper_primitives::Height;

use crate::{policy::GatePolicy, registry::MessageRegistry};

/// The downstream batch-processing routine, invoked only when the gate is open.
///
/// Closures taking the current height implement this trait.
pub trait BatchProcessor {
    /// The result of processing a batch.
    type Output;

    /// Process a new batch at the given height.
    fn process_batch(&mut self, height: Height) -> Self::Output;
}

impl<F, T> BatchProcessor for F
where
    F: FnMut(Height) -> T,
{
    type Output = T;

    fn process_batch(&mut self, height: Height) -> Self::Output {
        self(height)
    }
}

/// Returns the number of messages blocking new batches at `height` under `policy`.
pub(crate) fn blocking_count(registry: &MessageRegistry, policy: GatePolicy, height: Height) -> usize {
    match policy {
        GatePolicy::ExpiredUnblocks => registry.blocking_count(height),
        GatePolicy::ExpiredBlocks => registry.pending_count(),
    }
}

/// Returns `true` if new batches may proceed at `height` under `policy`.
pub(crate) fn may_proceed(registry: &MessageRegistry, policy: GatePolicy, height: Height) -> bool {
    match policy {
        GatePolicy::ExpiredUnblocks => !registry.has_blocking(height),
        GatePolicy::ExpiredBlocks => registry.pending_count() == 0,
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::B256;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn empty_registry_never_blocks() {
        let registry = MessageRegistry::default();
        for policy in [GatePolicy::ExpiredUnblocks, GatePolicy::ExpiredBlocks] {
            assert!(may_proceed(&registry, policy, 0));
            assert_eq!(blocking_count(&registry, policy, 0), 0);
        }
    }

    #[test]
    fn expired_messages_stop_blocking() {
        let mut registry = MessageRegistry::default();
        registry.submit(B256::repeat_byte(1), 10).unwrap();

        assert!(!may_proceed(&registry, GatePolicy::ExpiredUnblocks, 10));
        assert!(may_proceed(&registry, GatePolicy::ExpiredUnblocks, 11));
    }

    #[test]
    fn strict_policy_keeps_blocking_after_expiry() {
        let mut registry = MessageRegistry::default();
        registry.submit(B256::repeat_byte(1), 10).unwrap();

        assert!(!may_proceed(&registry, GatePolicy::ExpiredBlocks, 11));
        assert_eq!(blocking_count(&registry, GatePolicy::ExpiredBlocks, 1_000), 1);
    }

    /// The deadline index must give the same answer as scanning every submission.
    #[test]
    fn index_matches_linear_scan() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut registry = MessageRegistry::default();
        let ids = (0u8..32).map(B256::repeat_byte).collect::<Vec<_>>();
        let mut height = 0;

        for _ in 0..2_000 {
            height += rng.random_range(0..3);
            let id = ids[rng.random_range(0..ids.len())];

            if rng.random_bool(0.6) {
                let _ = registry.submit(id, height + rng.random_range(0..20));
            } else {
                let _ = registry.mark_included(id, height, rng.random_bool(0.5));
            }

            for probe in [height, height + 5, height + 25] {
                assert_eq!(
                    may_proceed(&registry, GatePolicy::ExpiredUnblocks, probe),
                    !registry.scan_has_blocking(probe),
                    "gate mismatch at height {probe}"
                );
            }
        }
    }
}

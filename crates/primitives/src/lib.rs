#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

//! Gatekeeper primitive types, utilities and constants.

use alloy_primitives::{Address, B256, BlockNumber};

/// Transport retries utilities
pub mod retries;

/// Utility for summarizing objects into a string for logging purposes.
pub mod summary;

/// Utilities for triggering shutdown signals from active tasks.
pub mod shutdown;

/// A cross-layer message identifier: the 32-byte hash of the message.
pub type MessageId = B256;

/// An account identifier, used for callers, operators and blacklist members.
pub type Account = Address;

/// An L1 ledger height. Deadlines are expressed in this unit.
pub type Height = BlockNumber;

/// Compute the deadline of a message submitted at `height` with the given upper bound.
///
/// Saturates at [`Height::MAX`] instead of wrapping.
pub const fn deadline_for(height: Height, upper_bound: u64) -> Height {
    height.saturating_add(upper_bound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_adds_upper_bound() {
        assert_eq!(deadline_for(100, 10), 110);
        assert_eq!(deadline_for(100, 0), 100);
    }

    #[test]
    fn deadline_saturates() {
        assert_eq!(deadline_for(Height::MAX - 1, 10), Height::MAX);
    }
}

use gatekeeper_primitives::{Account, Height};

/// The read-only environment of an engine call: who is calling, and at which ledger height.
///
/// Both values are provided by the host (the L1 ledger, or the off-chain driver replaying
/// it). The engine never advances the height by itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallContext {
    /// The identity of the caller.
    pub caller: Account,
    /// The current ledger height.
    pub height: Height,
}

impl CallContext {
    /// Creates a new [`CallContext`].
    pub const fn new(caller: Account, height: Height) -> Self {
        Self { caller, height }
    }
}

use std::fmt;

use derive_more::derive::IsVariant;
use gatekeeper_engine::InclusionEngine;
use gatekeeper_primitives::Height;

/// The state of the batch gate at the latest processed L1 height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IsVariant)]
pub(crate) enum GateStatus {
    /// No message blocks new batches.
    Open,
    /// At least one message blocks new batches.
    Closed {
        /// The amount of blocking messages.
        blocking: usize,
        /// The earliest deadline among messages still inside their window, if any.
        next_deadline: Option<Height>,
    },
}

impl GateStatus {
    /// Evaluate the gate of `engine` at `height`.
    pub(crate) fn evaluate(engine: &InclusionEngine, height: Height) -> Self {
        if engine.may_proceed(height) {
            return Self::Open;
        }

        Self::Closed {
            blocking: engine.blocking_count(height),
            next_deadline: engine.registry().next_deadline(height),
        }
    }

    /// Returns the amount of blocking messages.
    pub(crate) const fn blocking(&self) -> usize {
        match self {
            Self::Open => 0,
            Self::Closed { blocking, .. } => *blocking,
        }
    }

    /// Returns an iterable slice of the enum variants.
    pub(crate) const fn variant_names() -> &'static [&'static str; 2] {
        &["Open", "Closed"]
    }
}

impl fmt::Display for GateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "Open"),
            Self::Closed { .. } => write!(f, "Closed"),
        }
    }
}

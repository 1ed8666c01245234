use gatekeeper_primitives::{Account, Height, MessageId};
use thiserror::Error;

/// The result type of engine calls.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors returned by the [`InclusionEngine`](crate::InclusionEngine).
///
/// Every error aborts the whole call: no state is mutated when an error is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The caller lacks the privilege required by the call.
    #[error("Caller {caller} is not authorized")]
    Unauthorized {
        /// The rejected caller.
        caller: Account,
    },
    /// The message was already included and cannot be submitted again.
    #[error("Message {id} was already processed")]
    AlreadyProcessed {
        /// The message identifier.
        id: MessageId,
    },
    /// The message was already marked as included.
    #[error("Message {id} is already included")]
    AlreadyIncluded {
        /// The message identifier.
        id: MessageId,
    },
    /// The inclusion window of the message is over.
    #[error("Deadline of message {id} passed: deadline={deadline}, height={height}")]
    DeadlinePassed {
        /// The message identifier.
        id: MessageId,
        /// The deadline of the message.
        deadline: Height,
        /// The height at which inclusion was attempted.
        height: Height,
    },
    /// The message is not tracked by the registry.
    #[error("Message {id} is not tracked")]
    UnknownMessage {
        /// The message identifier.
        id: MessageId,
    },
    /// The caller is blacklisted and the blacklist policy rejects its submissions.
    #[error("Account {account} is blacklisted")]
    Blacklisted {
        /// The blacklisted account.
        account: Account,
    },
    /// New batches are blocked by pending messages.
    #[error("{blocking} unprocessed message(s) block new batches at height {height}")]
    UnprocessedMessages {
        /// The number of blocking messages.
        blocking: usize,
        /// The height at which the gate was evaluated.
        height: Height,
    },
}

impl EngineError {
    /// Returns a short, static reason for this error, suitable as a metric label.
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "unauthorized",
            Self::AlreadyProcessed { .. } => "already_processed",
            Self::AlreadyIncluded { .. } => "already_included",
            Self::DeadlinePassed { .. } => "deadline_passed",
            Self::UnknownMessage { .. } => "unknown_message",
            Self::Blacklisted { .. } => "blacklisted",
            Self::UnprocessedMessages { .. } => "unprocessed_messages",
        }
    }
}

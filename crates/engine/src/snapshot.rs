use gatekeeper_primitives::{Account, MessageId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{engine::EngineSettings, registry::MessageEntry};

/// Errors that can occur when restoring an engine from a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// The audit sequence references a message with no entry.
    #[error("Audit sequence references untracked message {0}")]
    UntrackedAuditEntry(MessageId),
    /// Two entries share the same identifier.
    #[error("Duplicate entry for message {0}")]
    DuplicateEntry(MessageId),
    /// An entry's sequence is not the position of its latest submission in the audit sequence.
    #[error("Inconsistent audit sequence position for message {0}")]
    InconsistentSequence(MessageId),
}

/// The full, serializable state of an [`InclusionEngine`](crate::InclusionEngine).
///
/// Entries are sorted by sequence so that snapshots of equal engines are equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSnapshot {
    /// The current operator.
    pub operator: Account,
    /// The nominated successor of the operator, if any.
    #[serde(default)]
    pub pending_operator: Option<Account>,
    /// The engine settings, including the current upper bound.
    pub settings: EngineSettings,
    /// All tracked entries.
    pub entries: Vec<MessageEntry>,
    /// The audit sequence of submissions.
    pub audit_sequence: Vec<MessageId>,
    /// The blacklisted accounts.
    #[serde(default)]
    pub blacklist: Vec<Account>,
}

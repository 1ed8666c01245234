use std::collections::{BTreeMap, BTreeSet, HashMap};

use derive_more::derive::IsVariant;
use gatekeeper_primitives::{Height, MessageId, summary::Summary};
use serde::{Deserialize, Serialize};

use crate::{
    error::{EngineError, EngineResult},
    snapshot::SnapshotError,
};

/// A tracked cross-layer message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEntry {
    /// The message identifier.
    pub id: MessageId,
    /// Whether the message was marked as included. Never reverts to `false`.
    pub included: bool,
    /// The last height at which the message can be marked as included.
    pub deadline: Height,
    /// The position of the latest submission of this message in the audit sequence.
    pub sequence: u64,
}

impl MessageEntry {
    /// Returns the status of the message at the given height.
    pub const fn status(&self, height: Height) -> MessageStatus {
        if self.included {
            MessageStatus::Included
        } else if height > self.deadline {
            MessageStatus::Expired
        } else {
            MessageStatus::Pending
        }
    }
}

impl Summary for MessageEntry {
    fn summary(&self) -> String {
        format!(
            "id={}, included={}, deadline={}, sequence={}",
            self.id, self.included, self.deadline, self.sequence
        )
    }
}

/// The derived lifecycle state of a message.
///
/// ```text
///   Pending ──(mark included, height <= deadline)──> Included
///      │
///      └──────(height > deadline)──────────────────> Expired
/// ```
///
/// `Included` and `Expired` are terminal. `Expired` is never stored: it is derived from the
/// height at which the entry is observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IsVariant)]
pub enum MessageStatus {
    /// Not yet included, still inside its window.
    Pending,
    /// Marked as included.
    Included,
    /// Not included, and the window is over.
    Expired,
}

/// The outcome of a successful submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Submission {
    /// A new entry was created.
    Created(MessageEntry),
    /// A pending entry was submitted again: its deadline and sequence were refreshed.
    Refreshed {
        /// The deadline before the resubmission.
        previous_deadline: Height,
        /// The refreshed entry.
        entry: MessageEntry,
    },
}

impl Submission {
    pub(crate) const fn entry(&self) -> MessageEntry {
        match self {
            Self::Created(entry) | Self::Refreshed { entry, .. } => *entry,
        }
    }
}

/// The outcome of a successful inclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Inclusion {
    /// The entry transitioned from pending to included.
    Included(MessageEntry),
    /// The entry was already included, nothing changed.
    Unchanged(MessageEntry),
}

/// Append-only store of message entries.
///
/// Besides the entries keyed by identifier and the audit sequence of submissions, the
/// registry maintains an index of pending (not included) messages keyed by deadline. The
/// batch gate only looks at this index, so its cost does not grow with the number of
/// messages ever submitted.
#[derive(Debug, Clone, Default)]
pub struct MessageRegistry {
    /// Entries keyed by message identifier.
    entries: HashMap<MessageId, MessageEntry>,
    /// Every successful submission in order. Pending resubmissions append duplicates.
    audit: Vec<MessageId>,
    /// Pending messages grouped by deadline.
    pending_by_deadline: BTreeMap<Height, BTreeSet<MessageId>>,
    /// The total number of pending messages, across all deadlines.
    pending_count: usize,
}

impl MessageRegistry {
    /// Rebuild a registry from its persisted parts.
    ///
    /// Every entry's sequence must be the position of its latest occurrence in the audit
    /// sequence, and every identifier in the audit sequence must have an entry.
    pub(crate) fn from_parts(
        entries: Vec<MessageEntry>,
        audit: Vec<MessageId>,
    ) -> Result<Self, SnapshotError> {
        let latest = audit
            .iter()
            .enumerate()
            .map(|(position, id)| (*id, position as u64))
            .collect::<HashMap<_, _>>();

        let mut registry = Self::default();

        for entry in entries {
            if latest.get(&entry.id) != Some(&entry.sequence) {
                return Err(SnapshotError::InconsistentSequence(entry.id));
            }

            if !entry.included {
                registry.track_pending(entry.id, entry.deadline);
            }
            registry.entries.insert(entry.id, entry);
        }

        if let Some(missing) = audit.iter().find(|id| !registry.entries.contains_key(*id)) {
            return Err(SnapshotError::UntrackedAuditEntry(*missing));
        }
        registry.audit = audit;

        Ok(registry)
    }

    /// Returns the entry for `id`, if tracked.
    pub fn get(&self, id: &MessageId) -> Option<&MessageEntry> {
        self.entries.get(id)
    }

    /// Returns `true` if `id` is tracked.
    pub fn contains(&self, id: &MessageId) -> bool {
        self.entries.contains_key(id)
    }

    /// Returns the number of distinct tracked messages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no message was ever submitted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the audit sequence: every successful submission, in order.
    pub fn audit_sequence(&self) -> &[MessageId] {
        &self.audit
    }

    /// Returns an iterator over the tracked entries, in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = &MessageEntry> {
        self.entries.values()
    }

    /// Returns the number of messages not yet included, expired or not.
    pub const fn pending_count(&self) -> usize {
        self.pending_count
    }

    /// Returns the number of messages that are pending inside their window at `height`.
    pub fn blocking_count(&self, height: Height) -> usize {
        self.pending_by_deadline.range(height..).map(|(_, ids)| ids.len()).sum()
    }

    /// Returns `true` if at least one message is pending inside its window at `height`.
    pub fn has_blocking(&self, height: Height) -> bool {
        self.pending_by_deadline.range(height..).next().is_some()
    }

    /// Returns the earliest deadline among messages that are still pending inside their
    /// window at `height`.
    pub fn next_deadline(&self, height: Height) -> Option<Height> {
        self.pending_by_deadline.range(height..).next().map(|(deadline, _)| *deadline)
    }

    /// Returns the pending messages whose deadline lies in `[from, to)`, ordered by deadline.
    ///
    /// At height `to`, these are exactly the messages that expired since height `from`.
    pub fn expiring_between(&self, from: Height, to: Height) -> Vec<(MessageId, Height)> {
        if from >= to {
            return Vec::new();
        }

        self.pending_by_deadline
            .range(from..to)
            .flat_map(|(deadline, ids)| ids.iter().map(|id| (*id, *deadline)))
            .collect()
    }

    /// Submit `id` with the given deadline.
    ///
    /// Fails with [`EngineError::AlreadyProcessed`] if `id` is already included. Submitting an
    /// entry that is still pending is accepted: its deadline is replaced and the identifier is
    /// appended again to the audit sequence.
    pub(crate) fn submit(&mut self, id: MessageId, deadline: Height) -> EngineResult<Submission> {
        let sequence = self.audit.len() as u64;

        let submission = match self.entries.get(&id).copied() {
            Some(existing) if existing.included => {
                return Err(EngineError::AlreadyProcessed { id });
            }
            Some(existing) => {
                self.untrack_pending(id, existing.deadline);
                let entry = MessageEntry { deadline, sequence, ..existing };
                Submission::Refreshed { previous_deadline: existing.deadline, entry }
            }
            None => Submission::Created(MessageEntry { id, included: false, deadline, sequence }),
        };

        let entry = submission.entry();
        self.entries.insert(id, entry);
        self.audit.push(id);
        self.track_pending(id, deadline);

        Ok(submission)
    }

    /// Mark `id` as included at `height`.
    ///
    /// If `reject_duplicates` is set, an already-included entry fails with
    /// [`EngineError::AlreadyIncluded`]; otherwise it is left unchanged. The deadline is
    /// checked in both cases.
    pub(crate) fn mark_included(
        &mut self,
        id: MessageId,
        height: Height,
        reject_duplicates: bool,
    ) -> EngineResult<Inclusion> {
        let Some(entry) = self.entries.get_mut(&id) else {
            return Err(EngineError::UnknownMessage { id });
        };

        if entry.included && reject_duplicates {
            return Err(EngineError::AlreadyIncluded { id });
        }

        if height > entry.deadline {
            return Err(EngineError::DeadlinePassed { id, deadline: entry.deadline, height });
        }

        if entry.included {
            return Ok(Inclusion::Unchanged(*entry));
        }

        entry.included = true;
        let entry = *entry;
        self.untrack_pending(id, entry.deadline);

        Ok(Inclusion::Included(entry))
    }

    fn track_pending(&mut self, id: MessageId, deadline: Height) {
        if self.pending_by_deadline.entry(deadline).or_default().insert(id) {
            self.pending_count += 1;
        }
    }

    fn untrack_pending(&mut self, id: MessageId, deadline: Height) {
        let Some(ids) = self.pending_by_deadline.get_mut(&deadline) else {
            return;
        };

        if ids.remove(&id) {
            self.pending_count -= 1;
        }
        if ids.is_empty() {
            self.pending_by_deadline.remove(&deadline);
        }
    }

    /// The reference gate evaluation: a linear scan over the audit sequence.
    #[cfg(test)]
    pub(crate) fn scan_has_blocking(&self, height: Height) -> bool {
        self.audit.iter().any(|id| {
            let entry = &self.entries[id];
            !entry.included && height <= entry.deadline
        })
    }
}

use std::collections::HashSet;

use gatekeeper_primitives::{Account, Height, MessageId, deadline_for, summary::Summary};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    blacklist::Blacklist,
    context::CallContext,
    error::{EngineError, EngineResult},
    gate::{self, BatchProcessor},
    guard::AccessGuard,
    metrics::EngineMetrics,
    policy::{BlacklistPolicy, GatePolicy, InclusionPolicy},
    registry::{Inclusion, MessageEntry, MessageRegistry, MessageStatus, Submission},
    snapshot::{EngineSnapshot, SnapshotError},
};

/// The default upper bound, in L1 blocks.
pub const DEFAULT_UPPER_BOUND: u64 = 100;

/// The tunable parameters of an [`InclusionEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSettings {
    /// The maximum number of heights a message may wait before inclusion.
    pub upper_bound: u64,
    /// Who may mark messages as included.
    #[serde(default)]
    pub inclusion_policy: InclusionPolicy,
    /// How expired messages affect the batch gate.
    #[serde(default)]
    pub gate_policy: GatePolicy,
    /// What the blacklist is enforced on.
    #[serde(default)]
    pub blacklist_policy: BlacklistPolicy,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            upper_bound: DEFAULT_UPPER_BOUND,
            inclusion_policy: InclusionPolicy::default(),
            gate_policy: GatePolicy::default(),
            blacklist_policy: BlacklistPolicy::default(),
        }
    }
}

impl Summary for EngineSettings {
    fn summary(&self) -> String {
        format!(
            "upper_bound={}, inclusion_policy={}, gate_policy={}, blacklist_policy={}",
            self.upper_bound, self.inclusion_policy, self.gate_policy, self.blacklist_policy
        )
    }
}

/// The message-inclusion enforcement engine.
///
/// Owns the access guard, the message registry, the blacklist and the settings. All mutating
/// calls take a [`CallContext`] and check every precondition before touching any state, so a
/// failed call leaves the engine unchanged.
#[derive(Debug, Clone)]
pub struct InclusionEngine {
    guard: AccessGuard,
    registry: MessageRegistry,
    blacklist: Blacklist,
    settings: EngineSettings,
}

impl InclusionEngine {
    /// Create a new engine administered by `operator`.
    pub fn new(operator: Account, settings: EngineSettings) -> Self {
        EngineMetrics::set_upper_bound(settings.upper_bound);
        EngineMetrics::set_pending_messages(0);
        EngineMetrics::set_blacklist_size(0);

        Self {
            guard: AccessGuard::new(operator),
            registry: MessageRegistry::default(),
            blacklist: Blacklist::default(),
            settings,
        }
    }

    /// Returns the current operator.
    pub const fn operator(&self) -> Account {
        self.guard.operator()
    }

    /// Returns the access guard.
    pub const fn guard(&self) -> &AccessGuard {
        &self.guard
    }

    /// Returns the current settings.
    pub const fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Returns the current upper bound.
    pub const fn upper_bound(&self) -> u64 {
        self.settings.upper_bound
    }

    /// Returns the message registry.
    pub const fn registry(&self) -> &MessageRegistry {
        &self.registry
    }

    /// Returns the blacklist.
    pub const fn blacklist(&self) -> &Blacklist {
        &self.blacklist
    }

    // ============= ADMINISTRATION ================ //

    /// Set the upper bound used for messages submitted from now on. Operator only.
    ///
    /// Deadlines of already tracked messages are not affected. Zero is accepted, in which case
    /// messages must be included at their submission height.
    pub fn set_upper_bound(&mut self, ctx: CallContext, bound: u64) -> EngineResult<()> {
        self.guard
            .ensure_operator(ctx.caller)
            .inspect_err(|e| EngineMetrics::increment_rejected_calls("set_upper_bound", e.reason()))?;

        let old = std::mem::replace(&mut self.settings.upper_bound, bound);
        EngineMetrics::set_upper_bound(bound);
        info!(old, new = bound, height = ctx.height, "Updated upper bound");

        Ok(())
    }

    /// Add `account` to the blacklist. Operator only.
    ///
    /// Returns `false` if the account was already blacklisted.
    pub fn add_to_blacklist(&mut self, ctx: CallContext, account: Account) -> EngineResult<bool> {
        self.guard.ensure_operator(ctx.caller).inspect_err(|e| {
            EngineMetrics::increment_rejected_calls("add_to_blacklist", e.reason())
        })?;

        let added = self.blacklist.insert(account);
        EngineMetrics::set_blacklist_size(self.blacklist.len());
        debug!(%account, added, "Blacklist addition");

        Ok(added)
    }

    /// Remove `account` from the blacklist. Operator only.
    ///
    /// Returns `false` if the account was not blacklisted.
    pub fn remove_from_blacklist(
        &mut self,
        ctx: CallContext,
        account: Account,
    ) -> EngineResult<bool> {
        self.guard.ensure_operator(ctx.caller).inspect_err(|e| {
            EngineMetrics::increment_rejected_calls("remove_from_blacklist", e.reason())
        })?;

        let removed = self.blacklist.remove(&account);
        EngineMetrics::set_blacklist_size(self.blacklist.len());
        debug!(%account, removed, "Blacklist removal");

        Ok(removed)
    }

    /// Nominate `nominee` as the next operator, or cancel a nomination with `None`.
    /// Operator only. The handover completes when the nominee calls
    /// [`Self::accept_operator`].
    pub fn propose_operator(
        &mut self,
        ctx: CallContext,
        nominee: Option<Account>,
    ) -> EngineResult<()> {
        self.guard.nominate(ctx.caller, nominee).inspect_err(|e| {
            EngineMetrics::increment_rejected_calls("propose_operator", e.reason())
        })?;

        info!(operator = %self.guard.operator(), ?nominee, "Operator nomination updated");
        Ok(())
    }

    /// Accept a pending operator nomination. Only the nominee may call this.
    pub fn accept_operator(&mut self, ctx: CallContext) -> EngineResult<()> {
        let previous = self.guard.accept(ctx.caller).inspect_err(|e| {
            EngineMetrics::increment_rejected_calls("accept_operator", e.reason())
        })?;

        info!(%previous, new = %ctx.caller, "Operator handover completed");
        Ok(())
    }

    // ============= MESSAGES ================ //

    /// Submit message `id` at the context height.
    ///
    /// The deadline is `ctx.height + upper_bound`. Fails with
    /// [`EngineError::AlreadyProcessed`] if the message is already included, and with
    /// [`EngineError::Blacklisted`] if the blacklist policy rejects the caller.
    ///
    /// NOTE: submitting a message that is still pending is accepted. Its deadline is
    /// recomputed from the current height and bound, and the submission is recorded again in
    /// the audit sequence.
    pub fn submit(&mut self, ctx: CallContext, id: MessageId) -> EngineResult<MessageEntry> {
        let res = self.submit_inner(ctx, id);
        if let Err(e) = &res {
            EngineMetrics::increment_rejected_calls("submit", e.reason());
        }
        res
    }

    fn submit_inner(&mut self, ctx: CallContext, id: MessageId) -> EngineResult<MessageEntry> {
        if self.settings.blacklist_policy == BlacklistPolicy::RejectSubmissions &&
            self.blacklist.contains(&ctx.caller)
        {
            return Err(EngineError::Blacklisted { account: ctx.caller });
        }

        let deadline = deadline_for(ctx.height, self.settings.upper_bound);

        let submission = self.registry.submit(id, deadline)?;
        EngineMetrics::set_pending_messages(self.registry.pending_count());

        match submission {
            Submission::Created(entry) => {
                EngineMetrics::increment_messages_submitted(false);
                debug!(height = ctx.height, caller = %ctx.caller, "Submitted message: {}", entry.summary());
            }
            Submission::Refreshed { previous_deadline, entry } => {
                EngineMetrics::increment_messages_submitted(true);
                warn!(
                    height = ctx.height,
                    caller = %ctx.caller,
                    previous_deadline,
                    "Resubmitted pending message: {}",
                    entry.summary()
                );
            }
        }

        Ok(submission.entry())
    }

    /// Mark message `id` as included at the context height.
    ///
    /// Fails with [`EngineError::UnknownMessage`] if the message is not tracked and with
    /// [`EngineError::DeadlinePassed`] if the context height is past its deadline. Under
    /// [`InclusionPolicy::OperatorOnly`], non-operators fail with
    /// [`EngineError::Unauthorized`] and already-included messages fail with
    /// [`EngineError::AlreadyIncluded`].
    pub fn mark_included(&mut self, ctx: CallContext, id: MessageId) -> EngineResult<MessageEntry> {
        let res = self.mark_included_inner(ctx, id);
        if let Err(e) = &res {
            EngineMetrics::increment_rejected_calls("mark_included", e.reason());
        }
        res
    }

    fn mark_included_inner(
        &mut self,
        ctx: CallContext,
        id: MessageId,
    ) -> EngineResult<MessageEntry> {
        let reject_duplicates = match self.settings.inclusion_policy {
            InclusionPolicy::OperatorOnly => {
                self.guard.ensure_operator(ctx.caller)?;
                true
            }
            InclusionPolicy::Open => false,
        };

        match self.registry.mark_included(id, ctx.height, reject_duplicates)? {
            Inclusion::Included(entry) => {
                EngineMetrics::increment_messages_included();
                EngineMetrics::set_pending_messages(self.registry.pending_count());
                debug!(height = ctx.height, caller = %ctx.caller, "Included message: {}", entry.summary());
                Ok(entry)
            }
            Inclusion::Unchanged(entry) => {
                debug!(height = ctx.height, %id, "Message already included, nothing to do");
                Ok(entry)
            }
        }
    }

    /// Returns the entry for `id`, if tracked.
    pub fn entry(&self, id: &MessageId) -> Option<&MessageEntry> {
        self.registry.get(id)
    }

    /// Returns the status of `id` at `height`, if tracked.
    pub fn status(&self, id: &MessageId, height: Height) -> Option<MessageStatus> {
        self.registry.get(id).map(|entry| entry.status(height))
    }

    /// Returns the pending messages whose deadline lies in `[from, to)`.
    ///
    /// See [`MessageRegistry::expiring_between`].
    pub fn expiring_between(&self, from: Height, to: Height) -> Vec<(MessageId, Height)> {
        self.registry.expiring_between(from, to)
    }

    // ============= BATCH GATE ================ //

    /// Returns `true` if new batches may proceed at `height`.
    ///
    /// Under the default [`GatePolicy::ExpiredUnblocks`], the gate is closed iff at least one
    /// message is pending and `height <= deadline`. Messages whose deadline passed without
    /// inclusion do not block.
    pub fn may_proceed(&self, height: Height) -> bool {
        gate::may_proceed(&self.registry, self.settings.gate_policy, height)
    }

    /// Returns the number of messages blocking new batches at `height`.
    pub fn blocking_count(&self, height: Height) -> usize {
        gate::blocking_count(&self.registry, self.settings.gate_policy, height)
    }

    /// Returns `true` if new batches must be rejected at `height`. This is the negation of
    /// [`Self::may_proceed`], exposed for monitoring. It has no side effects.
    pub fn reject_new_batch(&self, height: Height) -> bool {
        !self.may_proceed(height)
    }

    /// Run `processor` if the gate is open at `height`.
    ///
    /// Fails with [`EngineError::UnprocessedMessages`] without invoking the processor if the
    /// gate is closed.
    pub fn process_new_batch<P: BatchProcessor>(
        &self,
        height: Height,
        processor: &mut P,
    ) -> EngineResult<P::Output> {
        if !self.may_proceed(height) {
            let err =
                EngineError::UnprocessedMessages { blocking: self.blocking_count(height), height };
            EngineMetrics::increment_rejected_calls("process_new_batch", err.reason());
            return Err(err);
        }

        EngineMetrics::increment_batches_processed();
        debug!(height, "Gate open, processing new batch");

        Ok(processor.process_batch(height))
    }

    // ============= SNAPSHOTS ================ //

    /// Returns a serializable snapshot of the full engine state.
    pub fn snapshot(&self) -> EngineSnapshot {
        let mut entries = self.registry.entries().copied().collect::<Vec<_>>();
        entries.sort_by_key(|entry| entry.sequence);

        EngineSnapshot {
            operator: self.guard.operator(),
            pending_operator: self.guard.pending_operator(),
            settings: self.settings,
            entries,
            audit_sequence: self.registry.audit_sequence().to_vec(),
            blacklist: self.blacklist.iter().copied().collect(),
        }
    }

    /// Restore an engine from a snapshot.
    pub fn from_snapshot(snapshot: EngineSnapshot) -> Result<Self, SnapshotError> {
        let mut seen = HashSet::with_capacity(snapshot.entries.len());
        if let Some(dup) = snapshot.entries.iter().find(|entry| !seen.insert(entry.id)) {
            return Err(SnapshotError::DuplicateEntry(dup.id));
        }

        let registry = MessageRegistry::from_parts(snapshot.entries, snapshot.audit_sequence)?;

        let guard = AccessGuard::with_pending(snapshot.operator, snapshot.pending_operator);

        let blacklist = snapshot.blacklist.into_iter().collect::<Blacklist>();

        EngineMetrics::set_upper_bound(snapshot.settings.upper_bound);
        EngineMetrics::set_pending_messages(registry.pending_count());
        EngineMetrics::set_blacklist_size(blacklist.len());

        Ok(Self { guard, registry, blacklist, settings: snapshot.settings })
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{Address, B256};

    use super::*;

    const OPERATOR: Address = Address::repeat_byte(0x01);
    const ALICE: Address = Address::repeat_byte(0x0a);
    const H1: B256 = B256::repeat_byte(0x01);
    const H2: B256 = B256::repeat_byte(0x02);

    fn engine(upper_bound: u64) -> InclusionEngine {
        InclusionEngine::new(OPERATOR, EngineSettings { upper_bound, ..Default::default() })
    }

    fn engine_with(settings: EngineSettings) -> InclusionEngine {
        InclusionEngine::new(OPERATOR, settings)
    }

    const fn op(height: Height) -> CallContext {
        CallContext::new(OPERATOR, height)
    }

    const fn alice(height: Height) -> CallContext {
        CallContext::new(ALICE, height)
    }

    #[test]
    fn submit_sets_deadline_from_current_bound() {
        let mut engine = engine(10);

        let entry = engine.submit(alice(100), H1).unwrap();
        assert_eq!(entry.deadline, 110);
        assert!(!entry.included);
        assert_eq!(engine.status(&H1, 100), Some(MessageStatus::Pending));
    }

    #[test]
    fn bound_change_does_not_alter_existing_deadlines() {
        let mut engine = engine(10);
        engine.submit(alice(100), H1).unwrap();

        engine.set_upper_bound(op(101), 50).unwrap();
        engine.submit(alice(102), H2).unwrap();

        assert_eq!(engine.entry(&H1).unwrap().deadline, 110);
        assert_eq!(engine.entry(&H2).unwrap().deadline, 152);
    }

    #[test]
    fn submit_rejects_included_message() {
        let mut engine = engine(10);
        engine.submit(alice(100), H1).unwrap();
        engine.mark_included(op(101), H1).unwrap();

        assert_eq!(engine.submit(alice(102), H1), Err(EngineError::AlreadyProcessed { id: H1 }));
    }

    /// Resubmitting a pending message is accepted and refreshes its deadline. This keeps the
    /// behavior of the deployed protocol, which only rejects included messages.
    #[test]
    fn submit_accepts_pending_resubmission() {
        let mut engine = engine(10);
        engine.submit(alice(100), H1).unwrap();

        let entry = engine.submit(alice(108), H1).unwrap();
        assert_eq!(entry.deadline, 118);
        assert_eq!(engine.registry().audit_sequence(), &[H1, H1]);
        assert_eq!(engine.registry().len(), 1);
        // The refreshed deadline keeps the gate closed past the original one.
        assert!(engine.reject_new_batch(115));
    }

    #[test]
    fn mark_included_within_window() {
        let mut engine = engine(10);
        engine.submit(alice(100), H1).unwrap();

        let entry = engine.mark_included(op(110), H1).unwrap();
        assert!(entry.included);
        assert_eq!(engine.status(&H1, 1_000), Some(MessageStatus::Included));
    }

    #[test]
    fn mark_included_after_deadline_fails_without_mutation() {
        let mut engine = engine(10);
        engine.submit(alice(100), H1).unwrap();

        assert_eq!(
            engine.mark_included(op(111), H1),
            Err(EngineError::DeadlinePassed { id: H1, deadline: 110, height: 111 })
        );
        assert!(!engine.entry(&H1).unwrap().included);
        assert_eq!(engine.status(&H1, 111), Some(MessageStatus::Expired));
    }

    #[test]
    fn operator_only_inclusion() {
        let mut engine = engine(10);
        engine.submit(alice(100), H1).unwrap();

        assert_eq!(
            engine.mark_included(alice(101), H1),
            Err(EngineError::Unauthorized { caller: ALICE })
        );
        engine.mark_included(op(101), H1).unwrap();
        assert_eq!(engine.mark_included(op(102), H1), Err(EngineError::AlreadyIncluded { id: H1 }));
    }

    #[test]
    fn open_inclusion() {
        let mut engine = engine_with(EngineSettings {
            upper_bound: 10,
            inclusion_policy: InclusionPolicy::Open,
            ..Default::default()
        });
        engine.submit(alice(100), H1).unwrap();

        assert!(engine.mark_included(alice(101), H1).unwrap().included);
        // Marking again is a no-op, and the entry never reverts.
        assert!(engine.mark_included(alice(102), H1).unwrap().included);
        assert_eq!(
            engine.mark_included(alice(111), H1),
            Err(EngineError::DeadlinePassed { id: H1, deadline: 110, height: 111 })
        );
        assert!(engine.entry(&H1).unwrap().included);
    }

    #[test]
    fn mark_included_unknown_message() {
        let mut engine = engine(10);
        assert_eq!(engine.mark_included(op(0), H1), Err(EngineError::UnknownMessage { id: H1 }));
    }

    #[test]
    fn zero_bound_requires_inclusion_at_submission_height() {
        let mut engine = engine(10);
        engine.set_upper_bound(op(0), 0).unwrap();

        let entry = engine.submit(alice(50), H1).unwrap();
        assert_eq!(entry.deadline, 50);
        assert!(engine.reject_new_batch(50));
        assert!(engine.may_proceed(51));

        engine.submit(alice(60), H2).unwrap();
        assert!(matches!(engine.mark_included(op(61), H2), Err(EngineError::DeadlinePassed { .. })));
        assert!(engine.mark_included(op(60), H2).is_ok());
    }

    #[test]
    fn only_operator_sets_upper_bound() {
        let mut engine = engine(10);

        engine.set_upper_bound(op(0), 0).unwrap();
        assert_eq!(engine.upper_bound(), 0);

        assert_eq!(
            engine.set_upper_bound(alice(0), 5),
            Err(EngineError::Unauthorized { caller: ALICE })
        );
        assert_eq!(engine.upper_bound(), 0);
    }

    #[test]
    fn gate_blocks_only_within_window() {
        let mut engine = engine(10);
        assert!(engine.may_proceed(0));

        engine.submit(alice(100), H1).unwrap();
        assert!(!engine.may_proceed(100));
        assert!(!engine.may_proceed(110));
        // Past the deadline, the un-included message stops blocking.
        assert!(engine.may_proceed(111));

        engine.submit(alice(105), H2).unwrap();
        engine.mark_included(op(106), H2).unwrap();
        assert!(engine.may_proceed(111));
        assert_eq!(engine.blocking_count(106), 1);
    }

    /// Alternative semantics, kept for review: with [`GatePolicy::ExpiredBlocks`] a message
    /// that expires without inclusion keeps blocking new batches forever.
    #[test]
    fn alternative_gate_expired_messages_keep_blocking() {
        let mut engine = engine_with(EngineSettings {
            upper_bound: 10,
            gate_policy: GatePolicy::ExpiredBlocks,
            ..Default::default()
        });

        engine.submit(alice(100), H1).unwrap();
        assert!(engine.reject_new_batch(111));
        assert!(engine.reject_new_batch(10_000));
        assert!(matches!(
            engine.process_new_batch(111, &mut |_: Height| ()),
            Err(EngineError::UnprocessedMessages { blocking: 1, height: 111 })
        ));
    }

    #[test]
    fn reject_new_batch_is_idempotent() {
        let mut engine = engine(10);
        engine.submit(alice(100), H1).unwrap();

        let first = engine.reject_new_batch(105);
        for _ in 0..10 {
            assert_eq!(engine.reject_new_batch(105), first);
        }
        assert!(first);
    }

    #[test]
    fn process_new_batch_runs_processor_only_when_open() {
        let mut engine = engine(10);
        let mut processed = Vec::new();
        let mut processor = |height: Height| {
            processed.push(height);
            height * 2
        };

        assert_eq!(engine.process_new_batch(1, &mut processor), Ok(2));

        engine.submit(alice(100), H1).unwrap();
        assert_eq!(
            engine.process_new_batch(100, &mut processor),
            Err(EngineError::UnprocessedMessages { blocking: 1, height: 100 })
        );

        engine.mark_included(op(100), H1).unwrap();
        assert_eq!(engine.process_new_batch(100, &mut processor), Ok(200));
        assert_eq!(processed, vec![1, 100]);
    }

    /// h1 submitted at 100 with bound 10 is included at 105. h2, submitted at 99, expires at
    /// 109 and no longer blocks at 111, where including it fails.
    #[test]
    fn scenario_expired_message_unblocks_gate() {
        let mut engine = engine(10);

        engine.submit(alice(99), H2).unwrap();
        let h1 = engine.submit(alice(100), H1).unwrap();
        assert_eq!(h1.deadline, 110);
        assert_eq!(engine.entry(&H2).unwrap().deadline, 109);

        engine.mark_included(op(105), H1).unwrap();
        assert!(engine.reject_new_batch(105));

        assert!(engine.may_proceed(111));
        assert_eq!(
            engine.mark_included(op(111), H2),
            Err(EngineError::DeadlinePassed { id: H2, deadline: 109, height: 111 })
        );
        assert_eq!(engine.expiring_between(100, 111), vec![(H2, 109)]);
    }

    #[test]
    fn blacklist_is_operator_administered() {
        let mut engine = engine(10);

        assert_eq!(
            engine.add_to_blacklist(alice(0), ALICE),
            Err(EngineError::Unauthorized { caller: ALICE })
        );
        assert!(engine.add_to_blacklist(op(0), ALICE).unwrap());
        assert!(!engine.add_to_blacklist(op(0), ALICE).unwrap());
        assert!(engine.blacklist().contains(&ALICE));

        assert_eq!(
            engine.remove_from_blacklist(alice(0), ALICE),
            Err(EngineError::Unauthorized { caller: ALICE })
        );
        assert!(engine.remove_from_blacklist(op(0), ALICE).unwrap());
        assert!(!engine.blacklist().contains(&ALICE));
    }

    #[test]
    fn inert_blacklist_does_not_affect_submissions() {
        let mut engine = engine(10);
        engine.add_to_blacklist(op(0), ALICE).unwrap();

        assert!(engine.submit(alice(1), H1).is_ok());
    }

    #[test]
    fn enforced_blacklist_rejects_submissions() {
        let mut engine = engine_with(EngineSettings {
            blacklist_policy: BlacklistPolicy::RejectSubmissions,
            ..Default::default()
        });
        engine.add_to_blacklist(op(0), ALICE).unwrap();

        assert_eq!(engine.submit(alice(1), H1), Err(EngineError::Blacklisted { account: ALICE }));
        assert!(engine.registry().is_empty());
        assert!(engine.submit(op(1), H1).is_ok());
    }

    #[test]
    fn operator_handover() {
        let mut engine = engine(10);

        engine.propose_operator(op(0), Some(ALICE)).unwrap();
        assert_eq!(engine.operator(), OPERATOR);

        engine.accept_operator(alice(1)).unwrap();
        assert_eq!(engine.operator(), ALICE);
        assert!(engine.set_upper_bound(op(2), 1).is_err());
        assert!(engine.set_upper_bound(alice(2), 1).is_ok());
    }

    #[test]
    fn snapshot_round_trip_preserves_gate() {
        let mut engine = engine(10);
        engine.submit(alice(100), H1).unwrap();
        engine.submit(alice(101), H2).unwrap();
        engine.submit(alice(102), H1).unwrap();
        engine.mark_included(op(103), H2).unwrap();
        engine.add_to_blacklist(op(103), ALICE).unwrap();
        engine.propose_operator(op(103), Some(ALICE)).unwrap();

        let snapshot = engine.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored =
            InclusionEngine::from_snapshot(serde_json::from_str(&json).unwrap()).unwrap();

        assert_eq!(restored.snapshot(), snapshot);
        assert_eq!(restored.guard().pending_operator(), Some(ALICE));
        for height in [100, 110, 112, 113] {
            assert_eq!(restored.may_proceed(height), engine.may_proceed(height));
            assert_eq!(restored.blocking_count(height), engine.blocking_count(height));
        }
    }

    #[test]
    fn snapshot_with_duplicates_is_rejected() {
        let mut engine = engine(10);
        engine.submit(alice(100), H1).unwrap();

        let mut snapshot = engine.snapshot();
        snapshot.entries.push(snapshot.entries[0]);
        assert_eq!(
            InclusionEngine::from_snapshot(snapshot).unwrap_err(),
            SnapshotError::DuplicateEntry(H1)
        );
    }

    #[test]
    fn snapshot_with_inconsistent_sequence_is_rejected() {
        let mut engine = engine(10);
        engine.submit(alice(100), H1).unwrap();
        engine.submit(alice(101), H2).unwrap();

        let mut snapshot = engine.snapshot();
        snapshot.entries[0].sequence = 1;
        assert_eq!(
            InclusionEngine::from_snapshot(snapshot).unwrap_err(),
            SnapshotError::InconsistentSequence(H1)
        );
    }
}

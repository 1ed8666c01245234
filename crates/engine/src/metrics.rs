use metrics::{counter, gauge};

#[derive(Debug, Clone, Copy)]
pub(crate) struct EngineMetrics;

impl EngineMetrics {
    // ################ COUNTERS ################ //

    /// Increments the amount of accepted submissions
    pub(crate) fn increment_messages_submitted(resubmission: bool) {
        counter!("engine_messages_submitted", "resubmission" => resubmission.to_string())
            .increment(1);
    }

    /// Increments the amount of messages marked as included
    pub(crate) fn increment_messages_included() {
        counter!("engine_messages_included").increment(1);
    }

    /// Increments the amount of rejected calls by reason
    pub(crate) fn increment_rejected_calls(call: &'static str, reason: &'static str) {
        counter!("engine_rejected_calls", "call" => call, "reason" => reason).increment(1);
    }

    /// Increments the amount of batches allowed through the gate
    pub(crate) fn increment_batches_processed() {
        counter!("engine_batches_processed").increment(1);
    }

    // ################ GAUGES ################ //

    /// Sets the amount of messages not yet included
    pub(crate) fn set_pending_messages(count: usize) {
        gauge!("engine_pending_messages").set(count as f64);
    }

    /// Sets the current upper bound
    pub(crate) fn set_upper_bound(bound: u64) {
        gauge!("engine_upper_bound").set(bound as f64);
    }

    /// Sets the size of the blacklist
    pub(crate) fn set_blacklist_size(size: usize) {
        gauge!("engine_blacklist_size").set(size as f64);
    }
}

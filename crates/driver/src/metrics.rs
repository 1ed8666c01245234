use std::time::Duration;

use metrics::{counter, gauge, histogram};

use crate::status::GateStatus;

#[derive(Debug, Clone, Copy)]
pub(crate) struct DriverMetrics;

impl DriverMetrics {
    // ################ COUNTERS ################ //

    // ============= L1 / L2 STATE ================ //

    /// Sets the L1 execution client head (aka: latest block number)
    pub(crate) fn set_l1_head_number(value: u64) {
        counter!("driver_l1_head_number").absolute(value);
    }

    /// Sets the L2 execution client head (aka: latest block number)
    pub(crate) fn set_l2_head_number(value: u64) {
        counter!("driver_l2_head_number").absolute(value);
    }

    /// Sets the latest L1 block whose events have been applied to the engine.
    pub(crate) fn set_l1_synced_block(value: u64) {
        counter!("driver_l1_synced_block").absolute(value);
    }

    /// Sets the latest L2 block whose events have been applied to the engine.
    pub(crate) fn set_l2_synced_block(value: u64) {
        counter!("driver_l2_synced_block").absolute(value);
    }

    /// Increments the amount of chain sync failures
    pub(crate) fn increment_sync_failures() {
        counter!("driver_sync_failures").increment(1);
    }

    // ============= Messages ================ //

    /// Increments the amount of chain events applied to the engine, by event
    pub(crate) fn increment_events_applied(event: &'static str) {
        counter!("driver_events_applied", "event" => event).increment(1);
    }

    /// Increments the amount of chain events rejected by the engine, by event and reason
    pub(crate) fn increment_events_rejected(event: &'static str, reason: &'static str) {
        counter!("driver_events_rejected", "event" => event, "reason" => reason).increment(1);
    }

    /// Increments the amount of messages that expired without being included
    pub(crate) fn increment_expired_messages() {
        counter!("driver_expired_messages").increment(1);
    }

    /// Increments the amount of failures to write the state file
    pub(crate) fn increment_state_file_failures() {
        counter!("driver_state_file_failures").increment(1);
    }

    // ################ GAUGES ################ //

    /// Sets the version of the gatekeeper driver.
    pub(crate) fn set_gatekeeper_version(tag: String) {
        gauge!("driver_gatekeeper_version", "tag" => tag).set(1.0);
    }

    /// Sets the amount of messages blocking new batches.
    pub(crate) fn set_blocking_messages(count: usize) {
        gauge!("driver_blocking_messages").set(count as f64);
    }

    /// Sets the status of the batch gate.
    pub(crate) fn set_gate_status(status: GateStatus) {
        let displayed = format!("{status}");

        for other in GateStatus::variant_names() {
            let other = other.to_string();
            if other == displayed {
                // Don't temporarily set the current status to 0.
                continue;
            }
            gauge!("driver_gate_status", "status" => other).set(0);
        }

        gauge!("driver_gate_status", "status" => displayed).set(1);
    }

    // ################ HISTOGRAMS ################ //

    /// Records the time it took to sync both chains in a poll tick
    pub(crate) fn record_sync_time(time_elapsed: Duration) {
        histogram!("driver_sync_time").record(time_elapsed.as_secs_f64());
    }
}

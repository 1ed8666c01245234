use std::{
    convert::Infallible,
    time::{Duration, Instant},
};

use alloy::transports::TransportError;
use gatekeeper_chainio::{
    ChainIoError, PositionedEvent, block_ranges,
    messages::{
        MessageInbox, MessageQueue, inbox::IMessageInbox::MessageIncluded,
        queue::IMessageQueue::MessageEnqueued,
    },
};
use gatekeeper_config::Opts;
use gatekeeper_engine::{CallContext, EngineError, InclusionEngine, SnapshotError};
use gatekeeper_primitives::{Height, retries::startup_backoff, summary::Summary};
use thiserror::Error;
use tokio::time::{MissedTickBehavior, interval, sleep};
use tokio_retry::Retry;
use tracing::{debug, error, info, warn};

use crate::{
    config::RuntimeConfig,
    metrics::DriverMetrics,
    state::{L1State, L2State, PersistedState, StateFileError},
    status::GateStatus,
};

/// The amount of attempts to reach the execution clients on startup.
const STARTUP_RETRY_ATTEMPTS: usize = 8;

/// The errors that can occur during the driver's operation.
/// Note that these errors won't halt the event loop in any case once it has started.
#[derive(Debug, Error)]
pub enum DriverError {
    /// RPC error.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// Error while reading contract events.
    #[error("Chain I/O error: {0}")]
    ChainIo(#[from] ChainIoError),
    /// The engine rejected a startup call.
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
    /// The engine snapshot in the state file is inconsistent.
    #[error("Failed to restore engine snapshot: {0}")]
    Snapshot(#[from] SnapshotError),
    /// The state file could not be read.
    #[error("State file error: {0}")]
    StateFile(#[from] StateFileError),
}

/// Gatekeeper inclusion monitor driver.
///
/// The driver owns the [`InclusionEngine`] and drives it from chain events:
/// - `MessageEnqueued` events on L1 are submitted at the height of the block that emitted them
/// - `MessageIncluded` events on L2 are marked as included at the L1 height of their block, that
///   is the last L1 block not newer than the L2 block timestamp
///
/// After each sync, it reports messages that expired without inclusion and evaluates the
/// batch gate at the L1 height both chains have been synced to.
#[derive(Debug)]
pub struct Driver {
    /// Driver runtime configuration.
    cfg: RuntimeConfig,
    /// Layer 1 chain state
    l1: L1State,
    /// Layer 2 chain state
    l2: L2State,
    /// The inclusion engine, fed from chain events.
    engine: InclusionEngine,
    /// The batch gate status at the synced height.
    status: GateStatus,
    /// The lowest deadline not yet checked for expiry.
    expiry_cursor: Height,
}

impl Driver {
    /// Create a new [`Driver`] instance.
    ///
    /// If a state file is configured and exists, the engine and the chain cursors are restored
    /// from it. Otherwise a fresh engine is created from the configured options and the
    /// initial blacklist is applied on behalf of the operator.
    pub async fn new(opts: Opts) -> Result<Self, DriverError> {
        let cfg = RuntimeConfig::from_opts(opts);

        info!("{}", cfg.summary());

        let queue = MessageQueue::new(cfg.l1.el_url.clone(), cfg.contracts.message_queue);
        let inbox = MessageInbox::new(cfg.l2.el_url.clone(), cfg.contracts.message_inbox);

        let (l1_head, l2_head) = Retry::start(startup_backoff(STARTUP_RETRY_ATTEMPTS), || async {
            tokio::try_join!(queue.head(), inbox.head())
        })
        .await?;
        info!(l1_head, l2_head, "Connected to L1 and L2 execution clients");

        let persisted = match &cfg.engine.state_file {
            Some(path) => PersistedState::load(path)?,
            None => None,
        };

        let (engine, next_l1_block, next_l2_block, l1_origin, expiry_cursor) = match persisted {
            Some(state) => {
                let engine = InclusionEngine::from_snapshot(state.engine)?;
                if engine.operator() != cfg.engine.operator ||
                    *engine.settings() != cfg.engine.settings()
                {
                    warn!(
                        operator = %engine.operator(),
                        "Engine options differ from the state file, using the restored state: {}",
                        engine.settings().summary()
                    );
                }

                info!(
                    next_l1_block = state.next_l1_block,
                    next_l2_block = state.next_l2_block,
                    messages = engine.registry().len(),
                    "Restored engine state from state file"
                );
                (
                    engine,
                    state.next_l1_block,
                    state.next_l2_block,
                    Some(state.l1_origin),
                    state.expiry_cursor,
                )
            }
            None => {
                let operator = cfg.engine.operator;
                let mut engine = InclusionEngine::new(operator, cfg.engine.settings());

                let ctx = CallContext::new(operator, l1_head);
                for account in &cfg.engine.blacklist {
                    engine.add_to_blacklist(ctx, *account)?;
                }

                (engine, l1_head, l2_head, None, l1_head)
            }
        };

        // Explicit start blocks take precedence over the state file.
        let next_l1_block = cfg.chain.l1_start_block.unwrap_or(next_l1_block);
        let next_l2_block = cfg.chain.l2_start_block.unwrap_or(next_l2_block);
        let expiry_cursor = expiry_cursor.min(next_l1_block);

        let l1 = L1State::new(queue, l1_head, next_l1_block);

        // Without a stored origin, the L1 start is the floor of the L2 cursor.
        let l1_origin = match (l1_origin, cfg.chain.l2_start_block) {
            (Some(origin), None) => origin.min(l1.synced_height()),
            _ => l1.synced_height(),
        };
        let l2 = L2State { inbox, head: l2_head, next_block: next_l2_block, l1_origin };

        let status = GateStatus::evaluate(&engine, l2.l1_origin);
        DriverMetrics::set_gate_status(status);

        Ok(Self { cfg, l1, l2, engine, status, expiry_cursor })
    }

    /// Create the driver, sync it and run its event loop.
    ///
    /// Only returns if the driver could not be created.
    pub async fn run(opts: Opts) -> Result<Infallible, DriverError> {
        Self::new(opts).await?.startup_sync().await.start().await
    }

    /// Perform a startup sync of the driver, catching up from the start blocks to the current
    /// heads.
    ///
    /// NOTE: retries until it succeeds.
    pub async fn startup_sync(mut self) -> Self {
        DriverMetrics::set_gatekeeper_version(env!("CARGO_PKG_VERSION").to_owned());

        loop {
            match self.sync_chains().await {
                Ok(()) => {
                    self.after_sync();
                    info!(
                        l1_block = self.l1.synced_height(),
                        l2_block = self.l2.next_block.saturating_sub(1),
                        height = self.synced_height(),
                        gate = %self.status,
                        "✅ Driver synced successfully"
                    );
                    return self;
                }
                Err(e) => {
                    error!(error = ?e, "Error while syncing the driver, retrying...");
                    sleep(Duration::from_secs(3)).await;
                }
            }
        }
    }

    /// Start the driver event loop.
    ///
    /// This function will run until the driver is stopped.
    pub async fn start(mut self) -> ! {
        let mut poll = interval(self.cfg.poll_interval());
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // The first tick completes immediately, and the startup sync already ran.
        poll.tick().await;

        info!("🤠 Starting driver event loop");

        loop {
            poll.tick().await;
            self.on_poll_tick().await;
        }
    }

    /// Returns the inclusion engine.
    pub const fn engine(&self) -> &InclusionEngine {
        &self.engine
    }

    /// Returns the L1 height up to which the events of both chains have been applied.
    ///
    /// This is the lower of the synced L1 block and the L1 height at the time of the last
    /// synced L2 block, so that no inclusion is missing at that height.
    pub fn synced_height(&self) -> Height {
        self.l1.synced_height().min(self.l2.l1_origin)
    }

    /// Returns `true` if new batches must be rejected at the synced L1 height.
    pub fn reject_new_batch(&self) -> bool {
        self.engine.reject_new_batch(self.synced_height())
    }

    /// Handle a poll tick: sync both chains, then report and persist.
    async fn on_poll_tick(&mut self) {
        let start = Instant::now();

        if let Err(e) = self.sync_chains().await {
            DriverMetrics::increment_sync_failures();
            warn!(error = %e, "Failed to sync chain events, retrying at next tick");
        }

        DriverMetrics::record_sync_time(start.elapsed());

        // Partial progress is kept, so the gate is evaluated even after a failure.
        self.after_sync();
    }

    /// Apply all new events from L1, then from L2.
    ///
    /// L2 is only synced once L1 has fully caught up to its head, so that every inclusion is
    /// applied after the enqueue events that precede it. Each inclusion is still applied at
    /// the L1 height of its own L2 block.
    async fn sync_chains(&mut self) -> Result<(), DriverError> {
        let (l1_head, l2_head) = tokio::try_join!(self.l1.queue.head(), self.l2.inbox.head())?;

        self.l1.head = l1_head;
        self.l2.head = l2_head;
        DriverMetrics::set_l1_head_number(l1_head);
        DriverMetrics::set_l2_head_number(l2_head);

        self.sync_l1().await?;
        self.sync_l2().await?;

        Ok(())
    }

    /// Apply the `MessageEnqueued` events from the next L1 block up to the L1 head.
    async fn sync_l1(&mut self) -> Result<(), DriverError> {
        let blocks = self.l1.next_block..=self.l1.head;

        for range in block_ranges(blocks, self.cfg.chain.max_block_range) {
            let events = self.l1.queue.get_enqueued(range.clone()).await?;
            debug!(?range, count = events.len(), "Fetched L1 enqueue events");

            for event in events {
                self.on_message_enqueued(event);
            }

            self.l1.next_block = range.end().saturating_add(1);
            DriverMetrics::set_l1_synced_block(*range.end());
        }

        Ok(())
    }

    /// Apply the `MessageIncluded` events from the next L2 block up to the L2 head.
    ///
    /// The L1 heights of a range are all resolved before any of its events is applied, so that
    /// a failed lookup leaves the range to be retried as a whole.
    async fn sync_l2(&mut self) -> Result<(), DriverError> {
        let blocks = self.l2.next_block..=self.l2.head;

        for range in block_ranges(blocks, self.cfg.chain.max_block_range) {
            let events = self.l2.inbox.get_included(range.clone()).await?;
            debug!(?range, count = events.len(), "Fetched L2 inclusion events");

            let mut origin = self.l2.l1_origin;
            let mut stamped = Vec::with_capacity(events.len());
            for event in events {
                let timestamp = match event.block_timestamp {
                    Some(timestamp) => timestamp,
                    None => self.l2.inbox.block_timestamp(event.block_number).await?,
                };
                origin = self.l1.height_at(timestamp, origin).await?;
                stamped.push((event, origin));
            }

            let end_timestamp = self.l2.inbox.block_timestamp(*range.end()).await?;
            let end_origin = self.l1.height_at(end_timestamp, origin).await?;

            for (event, height) in stamped {
                self.on_message_included(event, height);
            }

            self.l2.next_block = range.end().saturating_add(1);
            self.l2.l1_origin = end_origin;
            DriverMetrics::set_l2_synced_block(*range.end());
        }

        self.l1.prune_timestamps(self.l2.l1_origin);

        Ok(())
    }

    /// Submit an enqueued message at the height of the L1 block that emitted it, on behalf of
    /// its sender.
    fn on_message_enqueued(&mut self, enqueued: PositionedEvent<MessageEnqueued>) {
        let block = enqueued.block_number;
        let ctx = CallContext::new(enqueued.event.sender, block);

        match self.engine.submit(ctx, enqueued.event.msgHash) {
            Ok(entry) => {
                DriverMetrics::increment_events_applied("enqueued");
                debug!(block, deadline = entry.deadline, "📨 {}", enqueued.event.summary());
            }
            Err(e) => {
                DriverMetrics::increment_events_rejected("enqueued", e.reason());
                let summary = enqueued.event.summary();
                warn!(block, error = %e, "Engine rejected enqueued message: {summary}");
            }
        }
    }

    /// Mark a message as included at the L1 `height` of its L2 block, on behalf of the operator.
    fn on_message_included(&mut self, included: PositionedEvent<MessageIncluded>, height: Height) {
        let id = included.event.msgHash;
        let ctx = CallContext::new(self.engine.operator(), height);

        match self.engine.mark_included(ctx, id) {
            Ok(_) => {
                DriverMetrics::increment_events_applied("included");
                debug!(%id, l2_block = included.block_number, height = ctx.height, "📬 Message included");
            }
            Err(e) => {
                DriverMetrics::increment_events_rejected("included", e.reason());
                warn!(
                    %id,
                    l2_block = included.block_number,
                    height = ctx.height,
                    error = %e,
                    "Engine rejected message inclusion"
                );
            }
        }
    }

    /// Report expired messages, update the gate status and persist the state.
    fn after_sync(&mut self) {
        self.report_expired();
        self.update_status();
        self.persist_state();
    }

    /// Report every message whose deadline passed since the last report.
    ///
    /// A message with deadline `d` is expired at every height above `d`, so at the synced
    /// height `h` the new expiries are the pending messages with deadlines in
    /// `[expiry_cursor, h)`.
    fn report_expired(&mut self) {
        let height = self.synced_height();

        for (id, deadline) in self.engine.expiring_between(self.expiry_cursor, height) {
            DriverMetrics::increment_expired_messages();
            warn!(%id, deadline, height, "⏰ Message expired without being included");
        }

        self.expiry_cursor = self.expiry_cursor.max(height);
    }

    /// Updates the gate status and logs the transition if it has changed.
    fn update_status(&mut self) {
        let height = self.synced_height();
        let new_status = GateStatus::evaluate(&self.engine, height);
        let old_status = self.status;

        DriverMetrics::set_blocking_messages(new_status.blocking());

        if old_status.is_open() != new_status.is_open() {
            DriverMetrics::set_gate_status(new_status);

            match new_status {
                GateStatus::Open => info!(height, "🟢 Batch gate open"),
                GateStatus::Closed { blocking, next_deadline } => {
                    warn!(height, blocking, ?next_deadline, "🔴 Batch gate closed")
                }
            }
        }

        self.status = new_status;
    }

    /// Writes the state file, if configured.
    fn persist_state(&self) {
        let Some(path) = &self.cfg.engine.state_file else { return };

        let state = PersistedState {
            next_l1_block: self.l1.next_block,
            next_l2_block: self.l2.next_block,
            l1_origin: self.l2.l1_origin,
            expiry_cursor: self.expiry_cursor,
            engine: self.engine.snapshot(),
        };

        if let Err(e) = state.store(path) {
            DriverMetrics::increment_state_file_failures();
            error!(path = %path.display(), error = %e, "Failed to store state file");
        }
    }
}

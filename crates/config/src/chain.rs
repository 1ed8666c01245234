use alloy_primitives::{Address, BlockNumber};
use clap::Parser;
use url::Url;

/// L1-related configuration options
#[derive(Debug, Clone, Parser)]
pub struct L1Opts {
    /// The URL of the L1 execution client HTTP connection
    #[clap(long = "l1.el-url", env = "GATEKEEPER_L1_EXECUTION_URL", id = "l1-el-url")]
    pub el_url: Url,
}

/// L2-related configuration options
#[derive(Debug, Clone, Parser)]
pub struct L2Opts {
    /// The URL of the L2 execution client HTTP connection
    #[clap(long = "l2.el-url", env = "GATEKEEPER_L2_EXECUTION_URL", id = "l2-el-url")]
    pub el_url: Url,
}

/// The contract addresses emitting the cross-layer message events.
#[derive(Debug, Clone, Parser)]
pub struct ContractAddresses {
    /// The address of the L1 message queue, emitting `MessageEnqueued` events
    #[clap(long = "contracts.message-queue", env = "GATEKEEPER_MESSAGE_QUEUE")]
    pub message_queue: Address,
    /// The address of the L2 message inbox, emitting `MessageIncluded` events
    #[clap(long = "contracts.message-inbox", env = "GATEKEEPER_MESSAGE_INBOX")]
    pub message_inbox: Address,
}

/// Options controlling how the chains are followed.
#[derive(Debug, Clone, Parser)]
pub struct ChainOpts {
    /// The interval between two polls of the L1 and L2 heads (in seconds).
    #[clap(
        long = "chain.poll-interval-secs",
        env = "GATEKEEPER_POLL_INTERVAL_SECS",
        default_value_t = 12,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub poll_interval_secs: u64,
    /// The maximum number of blocks requested in a single `eth_getLogs` call.
    ///
    /// Most providers cap the range of log queries. Larger gaps are fetched in several calls.
    #[clap(
        long = "chain.max-block-range",
        env = "GATEKEEPER_MAX_BLOCK_RANGE",
        default_value_t = 1_000,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub max_block_range: u64,
    /// The L1 block to start following from. If unset, starts from the current L1 head, or
    /// from the block after the last one recorded in the state file.
    #[clap(long = "chain.l1-start-block", env = "GATEKEEPER_L1_START_BLOCK")]
    pub l1_start_block: Option<BlockNumber>,
    /// The L2 block to start following from. If unset, starts from the current L2 head, or
    /// from the block after the last one recorded in the state file.
    #[clap(long = "chain.l2-start-block", env = "GATEKEEPER_L2_START_BLOCK")]
    pub l2_start_block: Option<BlockNumber>,
}

use std::ops::RangeInclusive;

use IMessageQueue::{IMessageQueueInstance, MessageEnqueued};
use alloy::{providers::Provider, rpc::types::Filter, sol, transports::TransportResult};
use alloy_primitives::{Address, BlockNumber};
use derive_more::derive::Deref;
use gatekeeper_primitives::summary::Summary;
use url::Url;

use crate::{
    ChainIoError, DefaultProvider, PositionedEvent, block_timestamp, fetch_events, new_provider,
};

/// A wrapper over the L1 `MessageQueue` contract, where users enqueue messages
/// that must be included on L2.
#[derive(Debug, Clone, Deref)]
pub struct MessageQueue(IMessageQueueInstance<DefaultProvider>);

impl MessageQueue {
    /// Create a new `MessageQueue` instance at the given contract address.
    pub fn new<U: Into<Url>>(el_client_url: U, address: Address) -> Self {
        Self(IMessageQueueInstance::new(address, new_provider(el_client_url)))
    }

    /// Returns the latest block number of the L1 chain.
    pub async fn head(&self) -> TransportResult<BlockNumber> {
        self.0.provider().get_block_number().await
    }

    /// Returns the timestamp of the given L1 block.
    pub async fn block_timestamp(&self, number: BlockNumber) -> Result<u64, ChainIoError> {
        block_timestamp(self.0.provider(), number).await
    }

    /// Returns a log [`Filter`] for `MessageEnqueued` events in the given block range.
    pub fn message_enqueued_filter(&self, blocks: RangeInclusive<BlockNumber>) -> Filter {
        let (from, to) = blocks.into_inner();
        self.0.MessageEnqueued_filter().filter.from_block(from).to_block(to)
    }

    /// Fetch all `MessageEnqueued` events in the given block range, in chain order.
    pub async fn get_enqueued(
        &self,
        blocks: RangeInclusive<BlockNumber>,
    ) -> Result<Vec<PositionedEvent<MessageEnqueued>>, ChainIoError> {
        let filter = self.message_enqueued_filter(blocks);
        fetch_events::<MessageEnqueued>(self.0.provider(), &filter).await
    }
}

impl Summary for MessageEnqueued {
    fn summary(&self) -> String {
        format!("message: {}, sender: {}", self.msgHash, self.sender)
    }
}

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface IMessageQueue {
        /// @notice Emitted when a message is enqueued on L1.
        /// @param sender The account that enqueued the message.
        /// @param msgHash The unique identifier of the message.
        event MessageEnqueued(address indexed sender, bytes32 indexed msgHash);
    }
}

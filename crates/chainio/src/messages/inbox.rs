use std::ops::RangeInclusive;

use IMessageInbox::{IMessageInboxInstance, MessageIncluded};
use alloy::{providers::Provider, rpc::types::Filter, sol, transports::TransportResult};
use alloy_primitives::{Address, BlockNumber};
use derive_more::derive::Deref;
use url::Url;

use crate::{
    ChainIoError, DefaultProvider, PositionedEvent, block_timestamp, fetch_events, new_provider,
};

/// A wrapper over the L2 `MessageInbox` contract, which records the messages
/// included on L2.
#[derive(Debug, Clone, Deref)]
pub struct MessageInbox(IMessageInboxInstance<DefaultProvider>);

impl MessageInbox {
    /// Create a new `MessageInbox` instance at the given contract address.
    pub fn new<U: Into<Url>>(el_client_url: U, address: Address) -> Self {
        Self(IMessageInboxInstance::new(address, new_provider(el_client_url)))
    }

    /// Returns the latest block number of the L2 chain.
    pub async fn head(&self) -> TransportResult<BlockNumber> {
        self.0.provider().get_block_number().await
    }

    /// Returns the timestamp of the given L2 block.
    pub async fn block_timestamp(&self, number: BlockNumber) -> Result<u64, ChainIoError> {
        block_timestamp(self.0.provider(), number).await
    }

    /// Returns a log [`Filter`] for `MessageIncluded` events in the given block range.
    pub fn message_included_filter(&self, blocks: RangeInclusive<BlockNumber>) -> Filter {
        let (from, to) = blocks.into_inner();
        self.0.MessageIncluded_filter().filter.from_block(from).to_block(to)
    }

    /// Fetch all `MessageIncluded` events in the given block range, in chain order.
    pub async fn get_included(
        &self,
        blocks: RangeInclusive<BlockNumber>,
    ) -> Result<Vec<PositionedEvent<MessageIncluded>>, ChainIoError> {
        let filter = self.message_included_filter(blocks);
        fetch_events::<MessageIncluded>(self.0.provider(), &filter).await
    }
}

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface IMessageInbox {
        /// @notice Emitted when an enqueued message is included on L2.
        /// @param msgHash The unique identifier of the message.
        event MessageIncluded(bytes32 indexed msgHash);
    }
}

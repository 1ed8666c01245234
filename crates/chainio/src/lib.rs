#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

//! Chain I/O module to read cross-layer message events from EVM chains.

use std::{any::type_name, ops::RangeInclusive};

use alloy::{
    providers::{
        Provider, ProviderBuilder, RootProvider, fillers::FillProvider,
        utils::JoinedRecommendedFillers,
    },
    rpc::{
        client::ClientBuilder,
        types::{Filter, Log},
    },
    transports::TransportError,
};
use alloy_primitives::BlockNumber;
use alloy_sol_types::SolEvent;
use gatekeeper_primitives::retries::default_retry_layer;
use thiserror::Error;
use tracing::trace;
use url::Url;

/// Cross-layer message contract bindings
pub mod messages;

/// Alias to the default provider with all recommended fillers (read-only).
pub type DefaultProvider = FillProvider<JoinedRecommendedFillers, RootProvider>;

/// Errors that can occur while reading chain data.
#[derive(Debug, Error)]
pub enum ChainIoError {
    /// The RPC request failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// A log matched the filter but could not be decoded.
    #[error("Failed to decode {event} log: {source}")]
    Decode {
        /// The name of the event.
        event: &'static str,
        /// The decoding error.
        source: alloy_sol_types::Error,
    },
    /// A log has no block number or log index, i.e. it is still pending.
    #[error("{event} log is missing its block position")]
    MissingPosition {
        /// The name of the event.
        event: &'static str,
    },
    /// The execution client does not know the requested block.
    #[error("Block {0} not found")]
    BlockNotFound(BlockNumber),
}

/// A decoded event, with its position in the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionedEvent<T> {
    /// The block in which the event was emitted.
    pub block_number: BlockNumber,
    /// The index of the log in its block.
    pub log_index: u64,
    /// The timestamp of the block, if the execution client includes it in logs.
    pub block_timestamp: Option<u64>,
    /// The decoded event.
    pub event: T,
}

/// Create a new read-only HTTP provider with the default retry layer.
pub fn new_provider<U: Into<Url>>(el_client_url: U) -> DefaultProvider {
    let client = ClientBuilder::default().layer(default_retry_layer()).http(el_client_url.into());
    ProviderBuilder::new().connect_client(client)
}

/// Fetch and decode all logs of event `T` matching `filter`, ordered by chain position.
pub async fn fetch_events<T: SolEvent>(
    provider: &DefaultProvider,
    filter: &Filter,
) -> Result<Vec<PositionedEvent<T>>, ChainIoError> {
    let logs = provider.get_logs(filter).await?;
    trace!(count = logs.len(), event = type_name::<T>(), "Fetched logs");

    let mut events = logs.into_iter().map(decode_positioned::<T>).collect::<Result<Vec<_>, _>>()?;
    events.sort_by_key(|e| (e.block_number, e.log_index));

    Ok(events)
}

fn decode_positioned<T: SolEvent>(log: Log) -> Result<PositionedEvent<T>, ChainIoError> {
    let (Some(block_number), Some(log_index)) = (log.block_number, log.log_index) else {
        return Err(ChainIoError::MissingPosition { event: T::SIGNATURE });
    };

    let block_timestamp = log.block_timestamp;
    let event = log
        .log_decode::<T>()
        .map_err(|source| ChainIoError::Decode { event: T::SIGNATURE, source })?
        .into_inner()
        .data;

    Ok(PositionedEvent { block_number, log_index, block_timestamp, event })
}

/// Returns the timestamp of block `number`.
pub async fn block_timestamp(
    provider: &DefaultProvider,
    number: BlockNumber,
) -> Result<u64, ChainIoError> {
    match provider.get_block_by_number(number.into()).await? {
        Some(block) => Ok(block.header.timestamp),
        None => Err(ChainIoError::BlockNotFound(number)),
    }
}

/// Split `range` into consecutive sub-ranges of at most `max_len` blocks.
///
/// A `max_len` of zero is treated as one.
pub fn block_ranges(
    range: RangeInclusive<BlockNumber>,
    max_len: u64,
) -> impl Iterator<Item = RangeInclusive<BlockNumber>> {
    let step = max_len.max(1);
    let (start, end) = range.into_inner();
    let mut cursor = (start <= end).then_some(start);

    std::iter::from_fn(move || {
        let from = cursor?;
        let to = from.saturating_add(step - 1).min(end);
        cursor = if to < end { Some(to + 1) } else { None };
        Some(from..=to)
    })
}

/// JSON-RPC mocks for tests against an execution client.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use std::{collections::BTreeMap, fs, io, path::Path};

use alloy_primitives::BlockNumber;
use gatekeeper_chainio::{
    ChainIoError,
    messages::{MessageInbox, MessageQueue},
};
use gatekeeper_engine::EngineSnapshot;
use gatekeeper_primitives::Height;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Layer 1 chain state
#[derive(Debug)]
pub(crate) struct L1State {
    /// The L1 message queue contract.
    pub queue: MessageQueue,
    /// The latest observed L1 head.
    pub head: BlockNumber,
    /// The next L1 block whose events must be applied.
    pub next_block: BlockNumber,
    /// Timestamps of the L1 blocks looked up so far.
    pub timestamps: BTreeMap<BlockNumber, u64>,
}

impl L1State {
    /// Create a new [`L1State`] with an empty timestamp cache.
    pub(crate) const fn new(queue: MessageQueue, head: BlockNumber, next_block: BlockNumber) -> Self {
        Self { queue, head, next_block, timestamps: BTreeMap::new() }
    }

    /// Returns the last L1 block whose events have been applied.
    pub(crate) const fn synced_height(&self) -> Height {
        self.next_block.saturating_sub(1)
    }

    /// Returns the timestamp of L1 block `number`.
    pub(crate) async fn timestamp(&mut self, number: BlockNumber) -> Result<u64, ChainIoError> {
        if let Some(timestamp) = self.timestamps.get(&number) {
            return Ok(*timestamp);
        }

        let timestamp = self.queue.block_timestamp(number).await?;
        self.timestamps.insert(number, timestamp);
        Ok(timestamp)
    }

    /// Returns the L1 height at `timestamp`: the highest synced L1 block at or above `floor`
    /// that is not newer than `timestamp`, or `floor` if there is none.
    ///
    /// Binary search over block timestamps, which are strictly increasing.
    pub(crate) async fn height_at(
        &mut self,
        timestamp: u64,
        floor: Height,
    ) -> Result<Height, ChainIoError> {
        let mut hi = self.synced_height();
        let mut lo = floor.min(hi);

        if self.timestamp(hi).await? <= timestamp {
            return Ok(hi);
        }

        // The answer is in `[lo, hi)`.
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            if self.timestamp(mid).await? <= timestamp {
                lo = mid;
            } else {
                hi = mid;
            }
        }

        Ok(lo)
    }

    /// Drop the cached timestamps of the blocks below `height`.
    pub(crate) fn prune_timestamps(&mut self, height: Height) {
        self.timestamps = self.timestamps.split_off(&height);
    }
}

/// Layer 2 chain state
#[derive(Debug)]
pub(crate) struct L2State {
    /// The L2 message inbox contract.
    pub inbox: MessageInbox,
    /// The latest observed L2 head.
    pub head: BlockNumber,
    /// The next L2 block whose events must be applied.
    pub next_block: BlockNumber,
    /// The L1 height at the time of the last synced L2 block.
    pub l1_origin: Height,
}

/// Errors that can occur when reading or writing the state file.
#[derive(Debug, Error)]
pub enum StateFileError {
    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The state file content is not valid.
    #[error("Invalid state file: {0}")]
    Json(#[from] serde_json::Error),
}

/// The state persisted across restarts: the engine snapshot and the chain cursors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PersistedState {
    /// The next L1 block whose events must be applied.
    pub next_l1_block: BlockNumber,
    /// The next L2 block whose events must be applied.
    pub next_l2_block: BlockNumber,
    /// The L1 height at the time of the last synced L2 block.
    pub l1_origin: Height,
    /// The lowest deadline not yet checked for expiry.
    pub expiry_cursor: Height,
    /// The engine state.
    pub engine: EngineSnapshot,
}

impl PersistedState {
    /// Load the state from `path`. Returns `None` if the file does not exist.
    pub(crate) fn load(path: &Path) -> Result<Option<Self>, StateFileError> {
        let raw = match fs::read(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(serde_json::from_slice(&raw)?))
    }

    /// Write the state to `path`.
    ///
    /// The state is first written next to `path`, then moved over it, so that a crash never
    /// leaves a truncated file behind.
    pub(crate) fn store(&self, path: &Path) -> Result<(), StateFileError> {
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(self)?)?;
        fs::rename(&tmp, path)?;

        debug!(path = %path.display(), next_l1_block = self.next_l1_block, "Stored state file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use alloy_primitives::{Address, B256};
    use gatekeeper_chainio::test_utils::mock_blocks;
    use gatekeeper_engine::{CallContext, EngineSettings, InclusionEngine};
    use mockito::Server;

    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("gatekeeper-{name}-{}.json", std::process::id()))
    }

    #[test]
    fn test_load_missing_file() {
        let path = temp_path("missing");
        assert!(PersistedState::load(&path).unwrap().is_none());
    }

    #[test]
    fn test_store_and_load() {
        let operator = Address::repeat_byte(0x01);
        let mut engine = InclusionEngine::new(operator, EngineSettings::default());
        engine.submit(CallContext::new(operator, 7), B256::repeat_byte(0xaa)).unwrap();

        let state = PersistedState {
            next_l1_block: 8,
            next_l2_block: 3,
            l1_origin: 7,
            expiry_cursor: 7,
            engine: engine.snapshot(),
        };

        let path = temp_path("roundtrip");
        state.store(&path).unwrap();
        let loaded = PersistedState::load(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(loaded, Some(state));
    }

    #[test]
    fn test_load_invalid_file() {
        let path = temp_path("invalid");
        fs::write(&path, b"not json").unwrap();
        let res = PersistedState::load(&path);
        fs::remove_file(&path).unwrap();

        assert!(matches!(res, Err(StateFileError::Json(_))));
    }

    #[tokio::test]
    async fn test_height_at_timestamp() {
        let mut server = Server::new_async().await;
        let _blocks = mock_blocks(&mut server, |number| number * 12).await;

        let queue = MessageQueue::new(url::Url::parse(&server.url()).unwrap(), Address::ZERO);
        let mut l1 = L1State::new(queue, 120, 121);

        // Between two blocks: the older one.
        assert_eq!(l1.height_at(1_277, 100).await.unwrap(), 106);
        // Exactly at a block.
        assert_eq!(l1.height_at(1_284, 100).await.unwrap(), 107);
        // Newer than the synced height.
        assert_eq!(l1.height_at(5_000, 100).await.unwrap(), 120);
        // Older than the floor.
        assert_eq!(l1.height_at(0, 100).await.unwrap(), 100);

        l1.prune_timestamps(107);
        assert!(l1.timestamps.keys().all(|number| *number >= 107));
        assert!(l1.timestamps.contains_key(&120));
    }
}

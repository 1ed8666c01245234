use std::time::Duration;

use derive_more::derive::Deref;
use gatekeeper_config::Opts;
use gatekeeper_primitives::summary::Summary;

/// The runtime configuration for the gatekeeper driver.
#[derive(Debug, Clone, Deref)]
pub(crate) struct RuntimeConfig {
    /// CLI options that can be accessed as dereferenced fields.
    #[deref]
    pub opts: Opts,
}

impl RuntimeConfig {
    /// Create a new [`RuntimeConfig`] instance from the given [`Opts`].
    pub(crate) const fn from_opts(opts: Opts) -> Self {
        Self { opts }
    }

    /// Returns the interval between two polls of the chain heads.
    pub(crate) const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.opts.chain.poll_interval_secs)
    }
}

impl Summary for RuntimeConfig {
    fn summary(&self) -> String {
        let blacklist = if self.engine.blacklist.is_empty() {
            "none".to_owned()
        } else {
            self.engine.blacklist.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
        };

        format!(
            "Running with the following configuration:
            - Instance name: {}
            - L1: url={}, message_queue={}
            - L2: url={}, message_inbox={}
            - Engine: operator={}, {}
            - Initial blacklist: {}
            - Polling: interval={}s, max_block_range={}
            - State file: {}
            ",
            self.instance_name,
            self.l1.el_url,
            self.contracts.message_queue,
            self.l2.el_url,
            self.contracts.message_inbox,
            self.engine.operator,
            self.engine.settings().summary(),
            blacklist,
            self.chain.poll_interval_secs,
            self.chain.max_block_range,
            self.engine.state_file.as_ref().map_or("none".into(), |p| p.display().to_string()),
        )
    }
}

use std::path::PathBuf;

use alloy_primitives::Address;
use clap::Parser;
use gatekeeper_engine::{
    BlacklistPolicy, DEFAULT_UPPER_BOUND, EngineSettings, GatePolicy, InclusionPolicy,
};

/// Inclusion engine configuration options
#[derive(Debug, Clone, Parser)]
pub struct EngineOpts {
    /// The operator account of the engine. Inclusions observed on L2 and the initial
    /// blacklist are applied with this identity.
    #[clap(long = "engine.operator", env = "GATEKEEPER_OPERATOR")]
    pub operator: Address,
    /// The maximum number of L1 blocks a message may wait before being included on L2.
    #[clap(
        long = "engine.upper-bound",
        env = "GATEKEEPER_UPPER_BOUND",
        default_value_t = DEFAULT_UPPER_BOUND
    )]
    pub upper_bound: u64,
    /// Who may mark messages as included: `operator-only` or `open`.
    #[clap(
        long = "engine.inclusion-policy",
        env = "GATEKEEPER_INCLUSION_POLICY",
        default_value_t = InclusionPolicy::OperatorOnly
    )]
    pub inclusion_policy: InclusionPolicy,
    /// Whether expired, never-included messages keep blocking new batches:
    /// `expired-unblocks` or `expired-blocks`.
    #[clap(
        long = "engine.gate-policy",
        env = "GATEKEEPER_GATE_POLICY",
        default_value_t = GatePolicy::ExpiredUnblocks
    )]
    pub gate_policy: GatePolicy,
    /// What the blacklist is enforced on: `inert` or `reject-submissions`.
    #[clap(
        long = "engine.blacklist-policy",
        env = "GATEKEEPER_BLACKLIST_POLICY",
        default_value_t = BlacklistPolicy::Inert
    )]
    pub blacklist_policy: BlacklistPolicy,
    /// Accounts to blacklist on startup, comma-separated.
    #[clap(long = "engine.blacklist", env = "GATEKEEPER_BLACKLIST", value_delimiter = ',')]
    pub blacklist: Vec<Address>,
    /// Path of the JSON file where the engine state is persisted. If unset, the state is
    /// kept in memory only.
    #[clap(long = "engine.state-file", env = "GATEKEEPER_STATE_FILE")]
    pub state_file: Option<PathBuf>,
}

impl EngineOpts {
    /// Returns the engine settings described by these options.
    pub const fn settings(&self) -> EngineSettings {
        EngineSettings {
            upper_bound: self.upper_bound,
            inclusion_policy: self.inclusion_policy,
            gate_policy: self.gate_policy,
            blacklist_policy: self.blacklist_policy,
        }
    }
}

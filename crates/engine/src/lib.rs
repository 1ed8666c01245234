#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

//! Deadline-based message-inclusion enforcement engine.
//!
//! The engine tracks every cross-layer message submitted from L1, assigns it a deadline
//! expressed in L1 height, and gates batch progression on whether pending messages are
//! resolved within that deadline.
//!
//! All state lives in a single [`InclusionEngine`], created with an injected operator. Every
//! mutation goes through one of its entry points and either completes fully or leaves the
//! state untouched.

/// The call context: caller identity and current ledger height.
mod context;
pub use context::CallContext;

/// Engine error taxonomy.
mod error;
pub use error::{EngineError, EngineResult};

/// Operator-based access control.
mod guard;
pub use guard::AccessGuard;

/// The message registry and its pending-deadline index.
mod registry;
pub use registry::{MessageEntry, MessageRegistry, MessageStatus};

/// The batch gate.
mod gate;
pub use gate::BatchProcessor;

/// The blacklist set.
mod blacklist;
pub use blacklist::Blacklist;

/// Configurable policies for the behaviors left open by the protocol design.
mod policy;
pub use policy::{BlacklistPolicy, GatePolicy, InclusionPolicy, ParsePolicyError};

/// The engine service object.
mod engine;
pub use engine::{DEFAULT_UPPER_BOUND, EngineSettings, InclusionEngine};

/// Serializable engine snapshots.
mod snapshot;
pub use snapshot::{EngineSnapshot, SnapshotError};

/// The metrics for the engine.
mod metrics;

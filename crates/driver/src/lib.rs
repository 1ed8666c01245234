#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

//! Gatekeeper inclusion monitor driver
//!
//! The driver is responsible for:
//! - Feeding L1 `MessageEnqueued` events into the inclusion engine
//! - Marking messages as included from L2 `MessageIncluded` events
//! - Evaluating the batch gate at the latest processed L1 height and reporting expired messages

/// The main driver module with the core event loop.
mod driver;
pub use driver::{Driver, DriverError};

/// The driver configuration.
mod config;

/// The metrics for the driver.
mod metrics;

/// The driver state containers and the on-disk state file.
mod state;
pub use state::StateFileError;

/// The batch gate status.
mod status;

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

//! Gatekeeper: deadline-based inclusion monitor for L1 to L2 messages.
//!
//! Follows the L1 message queue and the L2 message inbox, and reports whether new L2
//! batches must be rejected because enqueued messages are still waiting for inclusion.

use clap::Parser;
use tracing::info;

use gatekeeper_config::Opts;
use gatekeeper_driver::Driver;
use gatekeeper_primitives::shutdown::{ShutdownSignal, run_until_shutdown};

mod allocator;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    if let Ok(custom_env_file) = std::env::var("ENV_FILE") {
        // Try from custom env file, and abort if it fails
        dotenvy::from_filename(custom_env_file)?;
    } else {
        // Try from default .env file, and ignore if it fails. It might
        // be that the user isn't using it.
        dotenvy::dotenv().ok();
    }

    let opts = Opts::parse();

    let tracer_provider = opts.telemetry.setup(&opts.instance_name)?;

    info!(instance = %opts.instance_name, "🛡️ Gatekeeper starting...");

    let shutdown_signal = ShutdownSignal::new();
    let on_shutdown = || {
        info!("👋 Gatekeeper shutting down...");
        tracer_provider.shutdown();
    };

    run_until_shutdown(Driver::run(opts), shutdown_signal, on_shutdown).await
}

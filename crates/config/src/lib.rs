#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

//! Configuration for the gatekeeper inclusion monitor.

use clap::{
    Parser,
    builder::{
        Styles,
        styling::{AnsiColor, Color, Style},
    },
};

mod chain;
pub use chain::{ChainOpts, ContractAddresses, L1Opts, L2Opts};

mod engine;
pub use engine::EngineOpts;

mod telemetry;
pub use telemetry::{LogProvider, TelemetryOpts};

/// CLI options for the gatekeeper inclusion monitor.
#[derive(Debug, Clone, Parser)]
#[command(author, version, styles = cli_styles(), about)]
pub struct Opts {
    /// A unique name for this gatekeeper instance, used in metrics and logs
    #[clap(long, env = "GATEKEEPER_INSTANCE_NAME", default_value = "gatekeeper")]
    pub instance_name: String,
    /// L1-related configuration options
    #[clap(flatten)]
    pub l1: L1Opts,
    /// L2-related configuration options
    #[clap(flatten)]
    pub l2: L2Opts,
    /// Inclusion engine configuration options
    #[clap(flatten)]
    pub engine: EngineOpts,
    /// The contract addresses emitting the cross-layer message events.
    #[clap(flatten)]
    pub contracts: ContractAddresses,
    /// Options controlling how the chains are followed.
    #[clap(flatten)]
    pub chain: ChainOpts,
    /// Telemetry-related configuration options
    #[clap(flatten)]
    pub telemetry: TelemetryOpts,
}

/// Styles for the CLI.
const fn cli_styles() -> Styles {
    Styles::styled()
        .usage(Style::new().bold().underline().fg_color(Some(Color::Ansi(AnsiColor::Yellow))))
        .header(Style::new().bold().underline().fg_color(Some(Color::Ansi(AnsiColor::Yellow))))
        .literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))))
        .invalid(Style::new().bold().fg_color(Some(Color::Ansi(AnsiColor::Red))))
        .error(Style::new().bold().fg_color(Some(Color::Ansi(AnsiColor::Red))))
        .valid(Style::new().bold().underline().fg_color(Some(Color::Ansi(AnsiColor::Green))))
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::White))))
}

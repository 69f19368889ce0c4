//! CLI argument parsing for the demo-stack orchestrator.
//!
//! The CLI is intentionally thin: each subcommand maps to one gate, saga, or
//! verification pass; policy lives in the modules behind them.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint for the carbon-credit demo stack.
#[derive(Parser, Debug)]
#[command(
    name = "carbonctl",
    version,
    about = "Drive the carbon-credit demo stack end-to-end",
    after_help = "Commands:\n  wait                Probe the fleet until ready (or once, without --deadline-secs)\n  seed-registry       Create demo organizations, users, and project (admin)\n  seed-issuance       Create the demo issuance (issuer)\n  finalize-issuance   Finalize and await the settlement receipt (admin)\n  demo-transfer       Transfer 300 credits to BuyerCo (issuer)\n  demo-retire         Retire 150 credits with certificate (buyer)\n  seed-iot            Seed simulator data and anchor the oracle digest\n  smoke               Verify end state across the fleet\n  demo                Gate, all sagas in order, then smoke\n  urls                Print stack URLs and demo credentials\n\nExamples:\n  carbonctl wait --deadline-secs 120\n  carbonctl demo\n  carbonctl smoke --json",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Raise the default log level to debug (RUST_LOG still takes precedence)
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    Wait(WaitArgs),
    SeedRegistry(SagaArgs),
    SeedIssuance(SagaArgs),
    FinalizeIssuance(SagaArgs),
    DemoTransfer(SagaArgs),
    DemoRetire(SagaArgs),
    SeedIot(SagaArgs),
    Smoke(SmokeArgs),
    Demo(DemoArgs),
    Urls(UrlsArgs),
}

/// Health-gate inputs.
#[derive(Parser, Debug)]
#[command(about = "Probe every configured service and report readiness")]
pub struct WaitArgs {
    /// Stack configuration file (JSON); defaults cover the local demo stack
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Keep re-probing with backoff until ready or this many seconds elapse
    #[arg(long, value_name = "SECS")]
    pub deadline_secs: Option<u64>,

    /// Emit the readiness report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// Shared inputs for the saga commands.
#[derive(Parser, Debug)]
#[command(about = "Run one demo saga against the stack")]
pub struct SagaArgs {
    /// Stack configuration file (JSON); defaults cover the local demo stack
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Emit the saga report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// Smoke-suite inputs.
#[derive(Parser, Debug)]
#[command(about = "Re-query the fleet and verify the expected end state")]
pub struct SmokeArgs {
    /// Stack configuration file (JSON); defaults cover the local demo stack
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Emit the smoke report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// Full demo-run inputs.
#[derive(Parser, Debug)]
#[command(about = "Health gate, every saga in order, then the smoke suite")]
pub struct DemoArgs {
    /// Stack configuration file (JSON); defaults cover the local demo stack
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Seconds to wait for the fleet before starting the sagas
    #[arg(long, value_name = "SECS", default_value_t = 120)]
    pub deadline_secs: u64,
}

/// URL-table inputs.
#[derive(Parser, Debug)]
#[command(about = "Print stack URLs and demo credentials")]
pub struct UrlsArgs {
    /// Stack configuration file (JSON); defaults cover the local demo stack
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

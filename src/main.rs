use anyhow::Result;
use clap::Parser;
use std::time::Duration;

mod cli;
mod client;
mod config;
mod error;
mod health;
mod idempotency;
mod poll;
mod resolve;
mod saga;
mod smoke;
mod urls;

use cli::{Command, DemoArgs, RootArgs, SagaArgs, SmokeArgs, UrlsArgs, WaitArgs};
use saga::Saga;

fn main() -> Result<()> {
    let cli = RootArgs::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Wait(args) => cmd_wait(args),
        Command::SeedRegistry(args) => cmd_saga(Saga::SeedRegistry, args),
        Command::SeedIssuance(args) => cmd_saga(Saga::SeedIssuance, args),
        Command::FinalizeIssuance(args) => cmd_saga(Saga::FinalizeIssuance, args),
        Command::DemoTransfer(args) => cmd_saga(Saga::DemoTransfer, args),
        Command::DemoRetire(args) => cmd_saga(Saga::DemoRetire, args),
        Command::SeedIot(args) => cmd_saga(Saga::SeedIot, args),
        Command::Smoke(args) => cmd_smoke(args),
        Command::Demo(args) => cmd_demo(args),
        Command::Urls(args) => cmd_urls(args),
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "carbonctl=debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_wait(args: WaitArgs) -> Result<()> {
    let config = config::load_config(args.config.as_deref())?;
    eprintln!("Waiting for all services to be healthy...\n");
    let report = match args.deadline_secs {
        Some(secs) => health::wait_for_fleet(&config.services, Duration::from_secs(secs)),
        None => health::check_fleet(&config.services),
    };
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print();
    }
    if !report.all_ready {
        eprintln!("\n{} service(s) failed to start", report.failed_count());
        std::process::exit(1);
    }
    eprintln!("\nAll services are healthy and ready");
    Ok(())
}

fn cmd_saga(saga: Saga, args: SagaArgs) -> Result<()> {
    let config = config::load_config(args.config.as_deref())?;
    saga::execute(saga, &config, args.json)
}

fn cmd_smoke(args: SmokeArgs) -> Result<()> {
    let config = config::load_config(args.config.as_deref())?;
    let report = smoke::run_smoke(&config)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print();
    }
    if !report.all_passed() {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_demo(args: DemoArgs) -> Result<()> {
    let config = config::load_config(args.config.as_deref())?;
    eprintln!("Waiting for all services to be healthy...\n");
    let report = health::wait_for_fleet(&config.services, Duration::from_secs(args.deadline_secs));
    report.print();
    if !report.all_ready {
        eprintln!("\n{} service(s) failed to start", report.failed_count());
        std::process::exit(1);
    }
    for saga in Saga::ALL {
        saga::execute(saga, &config, false)?;
    }
    eprintln!("==> smoke");
    let smoke_report = smoke::run_smoke(&config)?;
    smoke_report.print();
    if !smoke_report.all_passed() {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_urls(args: UrlsArgs) -> Result<()> {
    let config = config::load_config(args.config.as_deref())?;
    urls::print_urls(&config);
    Ok(())
}

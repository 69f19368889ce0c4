//! The six demo sagas and their shared runner.
//!
//! Each saga is a linear sequence of identity-scoped API calls: authenticate
//! as the acting identity, issue the calls, thread identifiers from each
//! response into later steps. Identifiers cross actor boundaries; credentials
//! never do.

mod demo_retire;
mod demo_transfer;
mod finalize_issuance;
pub mod runner;
mod seed_iot;
mod seed_issuance;
mod seed_registry;

use crate::config::StackConfig;
use crate::error::FlowError;
use anyhow::Result;
use runner::SagaRun;
use serde_json::Value;

/// The named workflows, in demo order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Saga {
    SeedRegistry,
    SeedIssuance,
    FinalizeIssuance,
    DemoTransfer,
    DemoRetire,
    SeedIot,
}

impl Saga {
    pub const ALL: [Saga; 6] = [
        Saga::SeedRegistry,
        Saga::SeedIssuance,
        Saga::FinalizeIssuance,
        Saga::DemoTransfer,
        Saga::DemoRetire,
        Saga::SeedIot,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Saga::SeedRegistry => "seed-registry",
            Saga::SeedIssuance => "seed-issuance",
            Saga::FinalizeIssuance => "finalize-issuance",
            Saga::DemoTransfer => "demo-transfer",
            Saga::DemoRetire => "demo-retire",
            Saga::SeedIot => "seed-iot",
        }
    }
}

/// Run one saga and print its outcome. Returns an error when any step failed;
/// the report (with partial progress) is emitted either way.
pub fn execute(saga: Saga, config: &StackConfig, emit_json: bool) -> Result<()> {
    eprintln!("==> {}", saga.name());
    let mut run = SagaRun::new(saga.name());
    let result = match saga {
        Saga::SeedRegistry => seed_registry::run(config, &mut run),
        Saga::SeedIssuance => seed_issuance::run(config, &mut run),
        Saga::FinalizeIssuance => finalize_issuance::run(config, &mut run),
        Saga::DemoTransfer => demo_transfer::run(config, &mut run),
        Saga::DemoRetire => demo_retire::run(config, &mut run),
        Saga::SeedIot => seed_iot::run(config, &mut run),
    };
    let report = run.into_report(result.is_ok());
    if emit_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    result?;
    Ok(())
}

/// Pull a required string field out of a response body.
pub(crate) fn expect_str(
    value: &Value,
    field: &'static str,
    context: &'static str,
) -> Result<String, FlowError> {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            FlowError::transport(
                context,
                std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("response missing field {field:?}"),
                ),
            )
        })
}

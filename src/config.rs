//! Stack configuration: service targets, actor credentials, poll tuning.
//!
//! Defaults mirror the local demo stack so `carbonctl` works out of the box;
//! a JSON file passed via `--config` overrides any of it. The readiness check
//! for every target is expressed as a single per-target predicate rather than
//! special-cased per service.

use crate::error::FlowError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const REGISTRY: &str = "registry";
pub const ADAPTER: &str = "adapter";
pub const EVIDENCE_LOCKER: &str = "evidence-locker";
pub const IOT_ORACLE: &str = "iot-oracle";
pub const IOT_SIM: &str = "iot-sim";
pub const EXPLORER: &str = "explorer";
pub const ISSUER_PORTAL: &str = "issuer-portal";
pub const VERIFIER_CONSOLE: &str = "verifier-console";
pub const BUYER_MARKETPLACE: &str = "buyer-marketplace";

/// How a target's readiness probe response is judged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReadinessPredicate {
    /// Any response with status < 500 counts as ready.
    #[default]
    Reachable,
    /// Requires a 2xx response whose JSON body carries `"status": expected`.
    BodyStatus { expected: String },
}

/// One independently-deployed service in the fleet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceTarget {
    pub name: String,
    pub base_url: String,
    #[serde(default = "default_health_path")]
    pub health_path: String,
    #[serde(default)]
    pub readiness: ReadinessPredicate,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl ServiceTarget {
    pub fn health_url(&self) -> String {
        format!("{}{}", self.base_url, self.health_path)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Login identity for one demo actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// The four separation-of-duty actors the sagas authenticate as.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Actors {
    pub admin: Credentials,
    pub issuer: Credentials,
    pub verifier: Credentials,
    pub buyer: Credentials,
}

impl Default for Actors {
    fn default() -> Self {
        Actors {
            admin: Credentials {
                email: "admin@demo.local".to_string(),
                password: "Admin@123".to_string(),
            },
            issuer: Credentials {
                email: "issuer@solarco.local".to_string(),
                password: "Solar@123".to_string(),
            },
            verifier: Credentials {
                email: "verifier@demo.local".to_string(),
                password: "Verifier@123".to_string(),
            },
            buyer: Credentials {
                email: "buyer@buyerco.local".to_string(),
                password: "Buyer@123".to_string(),
            },
        }
    }
}

/// Tuning for poll-until-ready loops (settlement receipts, oracle digests).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PollSettings {
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub deadline_ms: u64,
}

impl Default for PollSettings {
    fn default() -> Self {
        PollSettings {
            initial_delay_ms: 250,
            max_delay_ms: 2_000,
            deadline_ms: 15_000,
        }
    }
}

/// Full configuration surface for one orchestration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StackConfig {
    #[serde(default = "default_services")]
    pub services: Vec<ServiceTarget>,
    #[serde(default)]
    pub actors: Actors,
    #[serde(default)]
    pub receipt_poll: PollSettings,
    /// Directory scanned for sample evidence PDFs during seed-registry.
    #[serde(default = "default_evidence_dir")]
    pub evidence_dir: String,
}

impl StackConfig {
    /// Look up a service target by its well-known name.
    pub fn target(&self, name: &str) -> Result<&ServiceTarget, FlowError> {
        self.services
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| FlowError::ReferenceNotFound {
                kind: "service",
                name: name.to_string(),
                hint: "declare it in the services table of the stack config",
            })
    }
}

impl Default for StackConfig {
    fn default() -> Self {
        StackConfig {
            services: default_services(),
            actors: Actors::default(),
            receipt_poll: PollSettings::default(),
            evidence_dir: default_evidence_dir(),
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<StackConfig> {
    let Some(path) = path else {
        return Ok(StackConfig::default());
    };
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let config: StackConfig =
        serde_json::from_slice(&bytes).context("parse stack config JSON")?;
    Ok(config)
}

fn default_health_path() -> String {
    "/health".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_evidence_dir() -> String {
    "data/samples".to_string()
}

fn body_healthy() -> ReadinessPredicate {
    ReadinessPredicate::BodyStatus {
        expected: "healthy".to_string(),
    }
}

fn default_services() -> Vec<ServiceTarget> {
    let core = |name: &str, base: &str| ServiceTarget {
        name: name.to_string(),
        base_url: base.to_string(),
        health_path: default_health_path(),
        readiness: body_healthy(),
        timeout_ms: 60_000,
    };
    let reachable = |name: &str, base: &str, path: &str| ServiceTarget {
        name: name.to_string(),
        base_url: base.to_string(),
        health_path: path.to_string(),
        readiness: ReadinessPredicate::Reachable,
        timeout_ms: default_timeout_ms(),
    };
    vec![
        core(REGISTRY, "http://localhost:4000"),
        core(ADAPTER, "http://localhost:4100"),
        core(EVIDENCE_LOCKER, "http://localhost:4600"),
        core(IOT_ORACLE, "http://localhost:4201"),
        core(IOT_SIM, "http://localhost:4200"),
        reachable(EXPLORER, "http://localhost:3002", "/api/health"),
        reachable(ISSUER_PORTAL, "http://localhost:3001", "/api/health"),
        reachable(VERIFIER_CONSOLE, "http://localhost:3003", "/api/health"),
        reachable(BUYER_MARKETPLACE, "http://localhost:3004", "/api/health"),
        reachable("minio", "http://localhost:9000", "/minio/health/live"),
        reachable("ipfs", "http://localhost:5001", "/api/v0/id"),
        reachable("chain-rpc", "http://localhost:8545", "/"),
    ]
}

//! Ordered step execution with partial-progress reporting.
//!
//! A saga is a strict sequence: the runner hands each step's closure to the
//! caller one at a time, records its outcome, and surfaces the first failure
//! unchanged so the saga aborts there. Already-committed remote state is not
//! rolled back; the report makes the partial progress visible instead.

use crate::error::FlowError;
use crate::idempotency::IdempotencyKey;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Ok,
    Failed,
}

/// Outcome of one step, including identifiers it produced for later steps.
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub step: String,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub produced: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Structured result of a whole saga run.
#[derive(Debug, Clone, Serialize)]
pub struct SagaReport {
    pub saga: String,
    pub ok: bool,
    pub steps: Vec<StepOutcome>,
}

/// Step recorder for one saga instance.
pub struct SagaRun {
    name: &'static str,
    steps: Vec<StepOutcome>,
}

impl SagaRun {
    pub fn new(name: &'static str) -> Self {
        SagaRun {
            name,
            steps: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Execute one step. The closure's error aborts the saga via `?` at the
    /// call site; the outcome is recorded either way.
    pub fn step<T>(
        &mut self,
        step: &str,
        f: impl FnOnce() -> Result<T, FlowError>,
    ) -> Result<T, FlowError> {
        let started = Instant::now();
        let result = f();
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => {
                eprintln!("  ✓ {step}");
                tracing::info!(saga = self.name, step, elapsed_ms, "step ok");
                self.steps.push(StepOutcome {
                    step: step.to_string(),
                    status: StepStatus::Ok,
                    produced: BTreeMap::new(),
                    error: None,
                });
            }
            Err(e) => {
                eprintln!("  ✗ {step}: {e}");
                tracing::warn!(saga = self.name, step, elapsed_ms, error = %e, "step failed");
                self.steps.push(StepOutcome {
                    step: step.to_string(),
                    status: StepStatus::Failed,
                    produced: BTreeMap::new(),
                    error: Some(e.to_string()),
                });
            }
        }
        result
    }

    /// Attach an identifier produced by the most recent step.
    pub fn produce(&mut self, key: &str, value: impl Into<String>) {
        if let Some(last) = self.steps.last_mut() {
            last.produced.insert(key.to_string(), value.into());
        }
    }

    /// Idempotency key for a step of this saga, distinguished by `inputs`.
    pub fn key(&self, step: &str, inputs: &[&str]) -> IdempotencyKey {
        IdempotencyKey::derive(self.name, step, inputs)
    }

    pub fn into_report(self, ok: bool) -> SagaReport {
        SagaReport {
            saga: self.name.to_string(),
            ok,
            steps: self.steps,
        }
    }
}

//! Service health gate.
//!
//! One pass probes every configured target concurrently and aggregates the
//! outcomes into a [`ReadinessReport`]; total wait is bounded by the slowest
//! single probe, not the sum. A probe failure (refused connection, timeout)
//! is captured in the report, never propagated. Repeat-with-backoff cadence
//! belongs to the caller and is provided by [`wait_for_fleet`].

use crate::config::{ReadinessPredicate, ServiceTarget};
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use ureq::Agent;

/// Result of one readiness probe.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeOutcome {
    pub service: String,
    pub ready: bool,
    pub detail: String,
}

/// Per-service outcomes plus the global AND. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessReport {
    pub probes: Vec<ProbeOutcome>,
    pub all_ready: bool,
}

impl ReadinessReport {
    pub fn failed_count(&self) -> usize {
        self.probes.iter().filter(|p| !p.ready).count()
    }

    /// Human-readable per-service lines.
    pub fn print(&self) {
        for probe in &self.probes {
            if probe.ready {
                println!("  ✓ {} is healthy", probe.service);
            } else {
                println!("  ✗ {} is not ready ({})", probe.service, probe.detail);
            }
        }
    }
}

/// Probe every target once, concurrently, and aggregate.
pub fn check_fleet(targets: &[ServiceTarget]) -> ReadinessReport {
    let probes: Vec<ProbeOutcome> = std::thread::scope(|scope| {
        let handles: Vec<_> = targets
            .iter()
            .map(|target| scope.spawn(move || probe(target)))
            .collect();
        handles
            .into_iter()
            .zip(targets)
            .map(|(handle, target)| {
                handle.join().unwrap_or_else(|_| ProbeOutcome {
                    service: target.name.clone(),
                    ready: false,
                    detail: "probe panicked".to_string(),
                })
            })
            .collect()
    });
    aggregate(probes)
}

fn aggregate(probes: Vec<ProbeOutcome>) -> ReadinessReport {
    let all_ready = probes.iter().all(|p| p.ready);
    ReadinessReport { probes, all_ready }
}

/// Repeat [`check_fleet`] with doubling backoff until every target is ready
/// or `deadline` lapses. Returns the last report either way.
pub fn wait_for_fleet(targets: &[ServiceTarget], deadline: Duration) -> ReadinessReport {
    let started = Instant::now();
    let mut delay = Duration::from_millis(500);
    loop {
        let report = check_fleet(targets);
        if report.all_ready || started.elapsed() >= deadline {
            return report;
        }
        tracing::info!(
            failed = report.failed_count(),
            retry_in_ms = delay.as_millis() as u64,
            "fleet not ready, retrying"
        );
        std::thread::sleep(delay.min(deadline.saturating_sub(started.elapsed())));
        delay = (delay * 2).min(Duration::from_secs(5));
    }
}

fn probe(target: &ServiceTarget) -> ProbeOutcome {
    let url = target.health_url();
    let config = Agent::config_builder()
        .timeout_global(Some(target.timeout()))
        .http_status_as_error(false)
        .build();
    let agent: Agent = config.into();
    let started = Instant::now();
    let outcome = match agent.get(&url).call() {
        Ok(mut response) => judge(&target.readiness, &mut response),
        Err(e) => (false, e.to_string()),
    };
    tracing::debug!(
        service = target.name.as_str(),
        url,
        ready = outcome.0,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "readiness probe"
    );
    ProbeOutcome {
        service: target.name.clone(),
        ready: outcome.0,
        detail: outcome.1,
    }
}

fn is_2xx(status: u16) -> bool {
    (200..300).contains(&status)
}

fn judge(
    predicate: &ReadinessPredicate,
    response: &mut ureq::http::Response<ureq::Body>,
) -> (bool, String) {
    let status = response.status().as_u16();
    match predicate {
        ReadinessPredicate::Reachable => (status < 500, format!("status {status}")),
        ReadinessPredicate::BodyStatus { expected } => {
            if !is_2xx(status) {
                return (false, format!("status {status}"));
            }
            match response.body_mut().read_json::<Value>() {
                Ok(body) => {
                    let reported = body.get("status").and_then(Value::as_str).unwrap_or("");
                    (
                        reported == expected,
                        format!("status {status}, body status {reported:?}"),
                    )
                }
                Err(e) => (false, format!("unreadable health body: {e}")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(service: &str, ready: bool) -> ProbeOutcome {
        ProbeOutcome {
            service: service.to_string(),
            ready,
            detail: String::new(),
        }
    }

    #[test]
    fn aggregate_is_ready_only_when_every_probe_is() {
        let all = aggregate(vec![outcome("a", true), outcome("b", true)]);
        assert!(all.all_ready);
        assert_eq!(all.failed_count(), 0);

        let mixed = aggregate(vec![
            outcome("a", true),
            outcome("b", false),
            outcome("c", true),
        ]);
        assert!(!mixed.all_ready);
        assert_eq!(mixed.failed_count(), 1);
    }

    #[test]
    fn body_status_demands_a_2xx_response() {
        assert!(!is_2xx(199));
        assert!(is_2xx(200));
        assert!(is_2xx(299));
        assert!(!is_2xx(302));
        assert!(!is_2xx(404));
    }

    #[test]
    fn unreachable_target_is_not_ready_and_not_fatal() {
        // Nothing listens on this port; the probe must fold the connection
        // failure into the report instead of returning an error.
        let target = ServiceTarget {
            name: "ghost".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
            health_path: "/health".to_string(),
            readiness: ReadinessPredicate::Reachable,
            timeout_ms: 500,
        };
        let report = check_fleet(&[target]);
        assert!(!report.all_ready);
        assert_eq!(report.probes.len(), 1);
        assert!(!report.probes[0].ready);
    }
}

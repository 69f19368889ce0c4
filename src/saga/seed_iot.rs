//! seed-iot: create a simulator site, generate yesterday's synthetic data,
//! then poll the oracle for the resulting digest and anchor it.

use crate::client::ApiClient;
use crate::config::{self, StackConfig};
use crate::error::FlowError;
use crate::poll::{poll_until, Poll};
use crate::saga::expect_str;
use crate::saga::runner::SagaRun;
use serde_json::{json, Value};

pub fn run(config: &StackConfig, run: &mut SagaRun) -> Result<(), FlowError> {
    let sim = ApiClient::for_target(config.target(config::IOT_SIM)?);
    let oracle = ApiClient::for_target(config.target(config::IOT_ORACLE)?);

    let site_key = run.key("create-site", &["PRJ001"]);
    let site = run.step("create IoT site", || {
        let body = json!({
            "id": "PRJ001",
            "name": "Solar Farm C IoT Site",
            "projectId": "PRJ001",
            "location": { "latitude": 28.6139, "longitude": 77.2090, "country": "IN" },
            "deviceType": "SOLAR_MONITOR",
            "factorRef": "FCT-DEMO-IN-2024",
        });
        sim.post(None, "/sites", &body, &site_key)
    })?;
    let site_id = expect_str(&site, "id", "site")?;
    run.produce("site_id", &site_id);

    let day = yesterday_utc();
    let generate_key = run.key("generate-data", &[&site_id, &day]);
    run.step(&format!("generate data for {day}"), || {
        sim.post(
            None,
            &format!("/sites/{site_id}/generate?day={day}"),
            &json!({}),
            &generate_key,
        )
    })?;

    let digest_id = run.step("await latest digest", || {
        poll_until("oracle digest", &config.receipt_poll, || {
            match oracle.get(None, &format!("/v1/sites/{site_id}/digests/latest")) {
                Ok(digest) => match digest.get("id").and_then(Value::as_str) {
                    Some(id) if !id.is_empty() => Ok(Poll::Ready(id.to_string())),
                    _ => Ok(Poll::NotYet),
                },
                Err(FlowError::Rejected { status: 404, .. }) => Ok(Poll::NotYet),
                Err(e) => Err(e),
            }
        })
    })?;
    run.produce("digest_id", &digest_id);

    let anchor_key = run.key("anchor-digest", &[&site_id, &digest_id]);
    let anchored = run.step("anchor digest", || {
        let body = json!({ "siteId": site_id, "digestId": digest_id });
        oracle.post(None, "/v1/anchor", &body, &anchor_key)
    })?;
    if let Some(hash) = anchored.get("txHash").and_then(Value::as_str) {
        run.produce("tx_hash", hash);
    }
    Ok(())
}

fn yesterday_utc() -> String {
    (chrono::Utc::now() - chrono::Duration::days(1))
        .format("%Y-%m-%d")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yesterday_is_a_calendar_date() {
        let day = yesterday_utc();
        assert_eq!(day.len(), 10);
        assert!(chrono::NaiveDate::parse_from_str(&day, "%Y-%m-%d").is_ok());
    }
}

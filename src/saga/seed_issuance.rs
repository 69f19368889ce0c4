//! seed-issuance: the issuer requests one issuance for the demo project.

use crate::client::ApiClient;
use crate::config::{self, StackConfig};
use crate::error::FlowError;
use crate::saga::expect_str;
use crate::saga::runner::SagaRun;
use serde_json::json;

pub fn run(config: &StackConfig, run: &mut SagaRun) -> Result<(), FlowError> {
    let registry = ApiClient::for_target(config.target(config::REGISTRY)?);
    let issuer = &config.actors.issuer;

    let session = run.step("login as issuer", || {
        registry.login(&issuer.email, &issuer.password)
    })?;

    let key = run.key("create-issuance", &["PRJ001", "2024", "10000"]);
    let issuance = run.step("create issuance for PRJ001", || {
        let body = json!({
            "projectId": "PRJ001",
            "vintageYear": 2024,
            "quantity": 10000,
            "factorRef": "FCT-DEMO-IN-2024",
            "description": "Demo issuance for Solar Farm C",
            "methodology": "RE-SOLAR",
            "vintageStartDate": "2024-01-01",
            "vintageEndDate": "2024-12-31",
        });
        registry.post(Some(&session), "/issuances", &body, &key)
    })?;

    let id = expect_str(&issuance, "id", "issuance")?;
    run.produce("issuance_id", &id);
    if let Ok(status) = expect_str(&issuance, "status", "issuance") {
        run.produce("status", status);
    }
    Ok(())
}

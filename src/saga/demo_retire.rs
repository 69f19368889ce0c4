//! demo-retire: the buyer retires credits and fetches the resulting
//! retirement certificate.

use crate::client::ApiClient;
use crate::config::{self, StackConfig};
use crate::error::FlowError;
use crate::saga::expect_str;
use crate::saga::runner::SagaRun;
use serde_json::{json, Value};

pub fn run(config: &StackConfig, run: &mut SagaRun) -> Result<(), FlowError> {
    let registry = ApiClient::for_target(config.target(config::REGISTRY)?);
    let buyer = &config.actors.buyer;

    let session = run.step("login as buyer", || {
        registry.login(&buyer.email, &buyer.password)
    })?;

    let key = run.key("retire-credits", &["PRJ001", "2024", "150"]);
    let retirement = run.step("retire 150 credits", || {
        let body = json!({
            "quantity": 150,
            "projectId": "PRJ001",
            "vintageYear": 2024,
            "reason": "Demo retirement for carbon neutrality",
            "retirementType": "VOLUNTARY",
            "retirementBeneficiary": "BuyerCo",
        });
        registry.post(Some(&session), "/credits/retire", &body, &key)
    })?;
    let certificate_id = expect_str(&retirement, "certificateId", "retirement")?;
    run.produce("retirement_id", expect_str(&retirement, "id", "retirement")?);
    run.produce("certificate_id", &certificate_id);

    let certificate = run.step("fetch retirement certificate", || {
        registry.get(Some(&session), &format!("/retirements/{certificate_id}"))
    })?;
    if let Some(hash) = certificate.get("adapterTxHash").and_then(Value::as_str) {
        run.produce("adapter_tx_hash", hash);
    }
    Ok(())
}

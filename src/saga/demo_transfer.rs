//! demo-transfer: the issuer moves credits to BuyerCo, resolving the buyer's
//! organization id by name first.

use crate::client::ApiClient;
use crate::config::{self, StackConfig};
use crate::error::FlowError;
use crate::resolve::resolve_organization_id;
use crate::saga::expect_str;
use crate::saga::runner::SagaRun;
use serde_json::json;

pub fn run(config: &StackConfig, run: &mut SagaRun) -> Result<(), FlowError> {
    let registry = ApiClient::for_target(config.target(config::REGISTRY)?);
    let issuer = &config.actors.issuer;

    let session = run.step("login as issuer", || {
        registry.login(&issuer.email, &issuer.password)
    })?;

    let buyer_org_id = run.step("resolve BuyerCo organization", || {
        resolve_organization_id(&registry, &session, "BuyerCo")
    })?;
    run.produce("buyer_org_id", &buyer_org_id);

    let key = run.key("transfer-credits", &[&buyer_org_id, "PRJ001", "2024", "300"]);
    let transfer = run.step("transfer 300 credits to BuyerCo", || {
        let body = json!({
            "toOrganizationId": buyer_org_id,
            "quantity": 300,
            "projectId": "PRJ001",
            "vintageYear": 2024,
            "reason": "Demo transfer to BuyerCo",
        });
        registry.post(Some(&session), "/credits/transfer", &body, &key)
    })?;
    run.produce("transfer_id", expect_str(&transfer, "id", "transfer")?);
    Ok(())
}

//! finalize-issuance: the admin finalizes the pending issuance through the
//! registry, which settles it through the adapter server-to-server. The saga
//! then queries the adapter directly and polls until the settlement receipt
//! carries a transaction hash.

use crate::client::ApiClient;
use crate::config::{self, StackConfig};
use crate::error::FlowError;
use crate::poll::{poll_until, Poll};
use crate::saga::expect_str;
use crate::saga::runner::SagaRun;
use serde_json::{json, Value};

pub fn run(config: &StackConfig, run: &mut SagaRun) -> Result<(), FlowError> {
    let registry = ApiClient::for_target(config.target(config::REGISTRY)?);
    let adapter = ApiClient::for_target(config.target(config::ADAPTER)?);
    let admin = &config.actors.admin;

    let session = run.step("login as admin", || {
        registry.login(&admin.email, &admin.password)
    })?;

    let issuance_id = run.step("find issuance to finalize", || {
        let listing = registry.get(Some(&session), "/issuances")?;
        let first = listing
            .as_array()
            .and_then(|issuances| issuances.first())
            .ok_or(FlowError::PrerequisiteMissing {
                what: "issuance to finalize",
                hint: "run seed-issuance first",
            })?;
        expect_str(first, "id", "issuance listing")
    })?;
    run.produce("issuance_id", &issuance_id);

    let key = run.key("finalize-issuance", &[&issuance_id]);
    let finalized = run.step("finalize issuance via registry", || {
        registry.post(
            Some(&session),
            &format!("/issuances/{issuance_id}/finalize"),
            &json!({}),
            &key,
        )
    })?;
    let adapter_tx_id = expect_str(&finalized, "adapterTxId", "finalize response")?;
    run.produce("adapter_tx_id", &adapter_tx_id);

    let receipt = run.step("await settlement receipt", || {
        poll_until("settlement receipt", &config.receipt_poll, || {
            match adapter.get(None, &format!("/v1/receipts/{adapter_tx_id}")) {
                Ok(receipt) if has_tx_hash(&receipt) => Ok(Poll::Ready(receipt)),
                // Settled receipt not visible yet: either absent or pending.
                Ok(_) => Ok(Poll::NotYet),
                Err(FlowError::Rejected { status: 404, .. }) => Ok(Poll::NotYet),
                Err(e) => Err(e),
            }
        })
    })?;
    run.produce("tx_hash", expect_str(&receipt, "txHash", "receipt")?);
    if let Ok(status) = expect_str(&receipt, "status", "receipt") {
        run.produce("receipt_status", status);
    }
    Ok(())
}

fn has_tx_hash(receipt: &Value) -> bool {
    receipt
        .get("txHash")
        .and_then(Value::as_str)
        .is_some_and(|hash| !hash.is_empty())
}

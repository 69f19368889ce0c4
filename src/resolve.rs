//! Cross-service reference resolution.
//!
//! Translates a human-meaningful organization name into the service-assigned
//! id by listing organizations visible to the session and scanning linearly.
//! The corpus in a demo run is small and bounded, so no caching. Read-only
//! and safe to call repeatedly.

use crate::client::{ApiClient, Session};
use crate::error::FlowError;
use serde_json::Value;

pub fn resolve_organization_id(
    client: &ApiClient,
    session: &Session,
    name: &str,
) -> Result<String, FlowError> {
    let listing = client.get(Some(session), "/organizations")?;
    find_org_id(&listing, name).ok_or_else(|| FlowError::ReferenceNotFound {
        kind: "organization",
        name: name.to_string(),
        hint: "run seed-registry first",
    })
}

fn find_org_id(listing: &Value, name: &str) -> Option<String> {
    listing
        .as_array()?
        .iter()
        .find(|org| org.get("name").and_then(Value::as_str) == Some(name))?
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn finds_id_by_exact_name() {
        let listing = json!([
            { "id": "org-1", "name": "SolarCo" },
            { "id": "org-2", "name": "BuyerCo" },
        ]);
        assert_eq!(find_org_id(&listing, "BuyerCo").as_deref(), Some("org-2"));
    }

    #[test]
    fn absent_name_yields_none_never_empty_string() {
        let listing = json!([{ "id": "org-1", "name": "SolarCo" }]);
        assert_eq!(find_org_id(&listing, "BuyerCo"), None);
    }

    #[test]
    fn non_array_listing_yields_none() {
        let listing = json!({ "error": "unexpected shape" });
        assert_eq!(find_org_id(&listing, "BuyerCo"), None);
    }
}

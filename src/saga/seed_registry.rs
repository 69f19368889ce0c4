//! seed-registry: admin creates the organizations, users, and project the
//! rest of the demo builds on, then uploads sample evidence when present.

use crate::client::ApiClient;
use crate::config::{self, StackConfig};
use crate::error::FlowError;
use crate::saga::expect_str;
use crate::saga::runner::SagaRun;
use serde_json::json;
use std::path::Path;

const EVIDENCE_SAMPLES: [&str; 2] = ["baseline.pdf", "monitoring-plan.pdf"];

pub fn run(config: &StackConfig, run: &mut SagaRun) -> Result<(), FlowError> {
    let registry = ApiClient::for_target(config.target(config::REGISTRY)?);
    let admin = &config.actors.admin;

    let session = run.step("login as admin", || {
        registry.login(&admin.email, &admin.password)
    })?;

    let mut org_ids = Vec::new();
    for (name, kind, country, description) in [
        ("AdminOrg", "ADMIN", "US", "Administrative organization for demo"),
        ("VerifierOrg", "VERIFIER", "US", "Verification organization for demo"),
        ("SolarCo", "ISSUER", "IN", "Solar energy company issuing carbon credits"),
        ("BuyerCo", "BUYER", "US", "Company purchasing carbon credits"),
    ] {
        let key = run.key("create-organization", &[name]);
        let created = run.step(&format!("create organization {name}"), || {
            let body = json!({
                "name": name,
                "type": kind,
                "country": country,
                "description": description,
            });
            registry.post(Some(&session), "/organizations", &body, &key)
        })?;
        let id = expect_str(&created, "id", "organization")?;
        run.produce("organization_id", &id);
        org_ids.push((name, id));
    }
    let org_id = |name: &str| -> String {
        org_ids
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, id)| id.clone())
            .unwrap_or_default()
    };

    for (email, password, role, org, first, last) in [
        (
            config.actors.verifier.email.as_str(),
            config.actors.verifier.password.as_str(),
            "VERIFIER",
            "VerifierOrg",
            "Verifier",
            "User",
        ),
        (
            config.actors.issuer.email.as_str(),
            config.actors.issuer.password.as_str(),
            "ISSUER",
            "SolarCo",
            "Solar",
            "Issuer",
        ),
        (
            config.actors.buyer.email.as_str(),
            config.actors.buyer.password.as_str(),
            "BUYER",
            "BuyerCo",
            "Carbon",
            "Buyer",
        ),
    ] {
        let key = run.key("create-user", &[email]);
        run.step(&format!("create user {email}"), || {
            let body = json!({
                "email": email,
                "password": password,
                "role": role,
                "organizationId": org_id(org),
                "firstName": first,
                "lastName": last,
            });
            registry.post(Some(&session), "/users", &body, &key)
        })?;
    }

    let project_key = run.key("create-project", &["PRJ001"]);
    let project = run.step("create project PRJ001", || {
        let body = json!({
            "id": "PRJ001",
            "name": "Solar Farm C",
            "description": "Large-scale solar farm in India",
            "methodology": "RE-SOLAR",
            "country": "IN",
            "organizationId": org_id("SolarCo"),
            "vintageYear": 2024,
            "estimatedCredits": 10000,
        });
        registry.post(Some(&session), "/projects", &body, &project_key)
    })?;
    let project_id = expect_str(&project, "id", "project")?;
    run.produce("project_id", &project_id);

    for sample in EVIDENCE_SAMPLES {
        let path = Path::new(&config.evidence_dir).join(sample);
        if !path.is_file() {
            eprintln!("  - evidence sample {} not found, skipping", path.display());
            continue;
        }
        let key = run.key("upload-evidence", &[&project_id, sample]);
        run.step(&format!("upload evidence {sample}"), || {
            registry.upload_file(
                &session,
                &format!("/projects/{project_id}/evidence"),
                &path,
                &key,
            )
        })?;
    }

    Ok(())
}

//! Demo-stack URL and credential summary.

use crate::config::{self, StackConfig};

/// Print the endpoint table for the configured stack.
pub fn print_urls(config: &StackConfig) {
    println!("\nDemo stack URLs\n");
    let rows: [(&str, &str, Option<&str>, &str); 9] = [
        (
            config::REGISTRY,
            "Official registry API (docs under /docs)",
            None,
            "/docs",
        ),
        (
            config::ISSUER_PORTAL,
            "Issuer portal for managing projects and issuances",
            Some("issuer"),
            "",
        ),
        (
            config::VERIFIER_CONSOLE,
            "Verifier console for reviewing and approving issuances",
            Some("verifier"),
            "",
        ),
        (
            config::BUYER_MARKETPLACE,
            "Carbon credit marketplace for buyers",
            Some("buyer"),
            "",
        ),
        (
            config::EXPLORER,
            "Public explorer showing project details and certificates",
            None,
            "/projects/PRJ001",
        ),
        (
            config::EVIDENCE_LOCKER,
            "Evidence storage and verification service",
            None,
            "",
        ),
        (config::ADAPTER, "Issuance settlement adapter", None, ""),
        (config::IOT_ORACLE, "IoT oracle (digests and anchoring)", None, ""),
        (config::IOT_SIM, "IoT solar simulator", None, ""),
    ];

    for (index, (name, description, actor, suffix)) in rows.iter().enumerate() {
        let Ok(target) = config.target(name) else {
            continue;
        };
        println!("{}. {}", index + 1, target.name);
        println!("   {}{}", target.base_url, suffix);
        println!("   {description}");
        if let Some(actor) = actor {
            let credentials = match *actor {
                "issuer" => &config.actors.issuer,
                "verifier" => &config.actors.verifier,
                "buyer" => &config.actors.buyer,
                _ => &config.actors.admin,
            };
            println!("   login: {} / {}", credentials.email, credentials.password);
        }
        println!();
    }

    println!("Key demo flow:");
    println!("  1. seed-registry    organizations, users, project");
    println!("  2. seed-issuance    10,000 credits (2024 vintage)");
    println!("  3. finalize-issuance  settle via adapter");
    println!("  4. demo-transfer    300 credits to BuyerCo");
    println!("  5. demo-retire      150 credits with certificate");
    println!("  6. seed-iot         anchored digest for yesterday's data");
    println!("  7. smoke            verify end state across the fleet");
}

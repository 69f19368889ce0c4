//! Deterministic idempotency keys for mutating calls.
//!
//! A key is derived from the logical operation's identity: saga name, step
//! name, and the business inputs that make the operation distinct. Re-running
//! the same logical operation therefore resends the same key, which lets the
//! receiving service deduplicate it, while distinct operations never collide.

use sha2::{Digest, Sha256};
use std::fmt;

/// An `Idempotency-Key` header value scoped to one logical operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Derive the key for `step` of `saga`, distinguished by `inputs`.
    pub fn derive(saga: &str, step: &str, inputs: &[&str]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(saga.as_bytes());
        hasher.update(b"\n");
        hasher.update(step.as_bytes());
        for input in inputs {
            hasher.update(b"\n");
            hasher.update(input.as_bytes());
        }
        IdempotencyKey(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_operation_same_key() {
        let a = IdempotencyKey::derive("seed-registry", "create-organization", &["SolarCo"]);
        let b = IdempotencyKey::derive("seed-registry", "create-organization", &["SolarCo"]);
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_inputs_distinct_keys() {
        let a = IdempotencyKey::derive("seed-registry", "create-organization", &["SolarCo"]);
        let b = IdempotencyKey::derive("seed-registry", "create-organization", &["BuyerCo"]);
        assert_ne!(a, b);
    }

    #[test]
    fn distinct_steps_distinct_keys() {
        let a = IdempotencyKey::derive("demo-transfer", "transfer", &["PRJ001", "300"]);
        let b = IdempotencyKey::derive("demo-retire", "transfer", &["PRJ001", "300"]);
        assert_ne!(a, b);
    }

    #[test]
    fn input_boundaries_are_unambiguous() {
        // ["ab", "c"] must not hash like ["a", "bc"].
        let a = IdempotencyKey::derive("s", "t", &["ab", "c"]);
        let b = IdempotencyKey::derive("s", "t", &["a", "bc"]);
        assert_ne!(a, b);
    }
}

//! Error taxonomy for fleet orchestration.
//!
//! Every failure a saga, probe, or smoke check can hit falls into one of
//! these categories. Errors are fatal to the operation that produced them;
//! only the health gate and the smoke suite fold an item's failure into a
//! boolean instead of aborting the batch.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlowError {
    /// No usable response: connect failure, timeout, or an unreadable body.
    #[error("no usable response from {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The service answered with a non-2xx status.
    #[error("{method} {url} rejected with status {status}: {body}")]
    Rejected {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },

    /// Login was refused for the given identity.
    #[error("authentication failed for {identity} (status {status})")]
    Auth { identity: String, status: u16 },

    /// A lookup by human-meaningful name found nothing.
    #[error("{kind} named {name:?} not found ({hint})")]
    ReferenceNotFound {
        kind: &'static str,
        name: String,
        hint: &'static str,
    },

    /// A saga expects state that an earlier saga was supposed to create.
    #[error("{what} missing ({hint})")]
    PrerequisiteMissing {
        what: &'static str,
        hint: &'static str,
    },

    /// A poll-until-ready loop exhausted its deadline.
    #[error("{what} not ready after {waited:?}")]
    Deadline { what: String, waited: Duration },
}

impl FlowError {
    pub(crate) fn transport(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        FlowError::Transport {
            url: url.into(),
            source: Box::new(source),
        }
    }
}

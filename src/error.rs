//! Error types for the proxy-rotation-pool crate.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error returned when no proxy can be handed out by the pool.
#[derive(Debug, Error)]
#[error("No proxy available in pool")]
pub struct NoProxyAvailable;

/// The remote proxy list could not be fetched or parsed.
///
/// Always surfaced to the caller; the pool never retries on its own.
#[derive(Debug, Error)]
pub enum SourceUnavailable {
    /// Transport failure or non-success HTTP status.
    #[error("failed to download proxy list: {0}")]
    Transport(#[from] reqwest::Error),
    /// The configured source URL does not parse.
    #[error("invalid proxy source url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The document contains no proxy table rows.
    #[error("proxy list document contains no proxy table")]
    MissingTable,
    /// A refresh left nothing to hand out.
    #[error("proxy source returned no eligible proxies")]
    Exhausted,
}

/// Reasons the identity list fell back to the built-in default.
///
/// Never returned to callers; logged and recovered inside `identity`.
#[derive(Debug, Error)]
pub(crate) enum IdentityLoadDegraded {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed record on line {line} of {path}")]
    Malformed { path: PathBuf, line: usize },
    #[error("{path} contains no identities")]
    Empty { path: PathBuf },
}

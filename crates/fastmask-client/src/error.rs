//! Error types for the client library.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading credentials or talking to the
/// Fastmail JMAP API.
///
/// Every failure is terminal for a single-shot run: nothing here is
/// retried, and callers are expected to surface the error and exit.
/// Messages never contain the raw API token.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// Missing, unreadable, or malformed configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Config directory or file has permissions other than the required
    /// mode. `actual` is the observed mode; `expected` names the mode(s)
    /// that would be accepted.
    #[error("insecure permissions {actual:04o} (should be {expected}): {path}")]
    InsecurePermissions {
        /// The offending directory or file.
        path: PathBuf,
        /// Observed permission bits.
        actual: u32,
        /// Acceptable mode(s), e.g. `"0600 or 0400"`.
        expected: &'static str,
    },

    /// Session bootstrap failure: transport error, non-200 status,
    /// malformed session document, or a token missing the masked email
    /// capability.
    #[error("auth error: {0}")]
    Auth(String),

    /// Masked email creation failure: transport error, non-200 status,
    /// or a response envelope the client cannot extract an alias from.
    #[error("alias error: {0}")]
    Alias(String),
}

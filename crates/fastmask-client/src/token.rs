//! Redacting wrapper around the Fastmail API token.
//!
//! The token is stored in a [`SecretString`] so the memory is zeroed on
//! drop, and the wrapper's `Display`/`Debug` implementations only ever
//! produce a redacted form. The single place that needs the real value
//! (building the `Authorization` header) must call [`SecureToken::full_token`],
//! which keeps every raw-secret call site explicit and easy to audit.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};

/// How many leading characters of a long token survive redaction.
const REDACTION_PREVIEW_LEN: usize = 4;

/// Tokens at or below this length redact entirely; a 4-character preview
/// of an 8-character secret would give away half of it.
const REDACTION_MIN_LEN: usize = 8;

/// A Fastmail API bearer token that redacts itself when formatted.
#[derive(Clone)]
pub struct SecureToken {
    inner: SecretString,
}

impl SecureToken {
    /// Wraps a raw token string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            inner: SecretString::from(raw.into()),
        }
    }

    /// Returns the raw token value.
    ///
    /// This is the only way to get the unredacted secret out of the
    /// wrapper. Call sites should be limited to header construction.
    #[must_use]
    pub fn full_token(&self) -> &str {
        self.inner.expose_secret()
    }
}

impl fmt::Display for SecureToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw = self.inner.expose_secret();
        if raw.is_empty() {
            return f.write_str("<empty>");
        }
        if raw.chars().count() <= REDACTION_MIN_LEN {
            return f.write_str("<redacted>");
        }
        let preview: String = raw.chars().take(REDACTION_PREVIEW_LEN).collect();
        write!(f, "{preview}...<redacted>")
    }
}

// Debug goes through the same redaction so `{:?}` formatting of any
// structure holding a token cannot leak it.
impl fmt::Debug for SecureToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

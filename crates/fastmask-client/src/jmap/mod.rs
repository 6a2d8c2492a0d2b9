//! Fastmail JMAP wire types and client implementation.
//!
//! This module provides the request/response types for the JMAP session
//! document and the `MaskedEmail/set` method call, plus the client that
//! speaks them.
//!
//! JMAP batches calls as `[name, arguments, callId]` triples. The array
//! is deliberately heterogeneous (a string, a method-specific object,
//! another string), so responses cannot be deserialized against one
//! static shape; see [`client::JmapClient::create_alias`] for the
//! two-phase decode.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod client;
pub use client::JmapClient;

/// Well-known JMAP session discovery endpoint.
pub const SESSION_URL: &str = "https://api.fastmail.com/.well-known/jmap";

/// JMAP core capability / primary-account namespace URI.
pub const CORE_CAPABILITY: &str = "urn:ietf:params:jmap:core";

/// Fastmail masked email capability URI. The token must carry this
/// capability before `MaskedEmail/set` may be called.
pub const MASKED_EMAIL_CAPABILITY: &str = "https://www.fastmail.com/dev/maskedemail";

/// The one JMAP method this client speaks.
pub(crate) const MASKED_EMAIL_SET: &str = "MaskedEmail/set";

/// Creation tag used to key the `create` map and locate the response.
pub(crate) const CREATE_TAG: &str = "fastmask";

/// Call id echoed back in the method response.
pub(crate) const CALL_ID: &str = "0";

/// State for newly created aliases.
pub(crate) const STATE_ENABLED: &str = "enabled";

/// Both network round trips are bounded by this timeout.
pub(crate) const HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// The JMAP session document returned by the well-known endpoint.
///
/// Capability and account metadata are kept as opaque JSON values: the
/// client only checks for key presence and extracts one account id.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// URL all subsequent API calls are POSTed to.
    pub api_url: String,
    /// Capability URI -> capability metadata.
    pub capabilities: HashMap<String, serde_json::Value>,
    /// Namespace URI -> primary account id.
    pub primary_accounts: HashMap<String, serde_json::Value>,
}

/// The account identity extracted from a session document.
///
/// Produced once by [`JmapClient::bootstrap`] and consumed by
/// [`JmapClient::create_alias`].
#[derive(Debug, Clone)]
pub struct Identity {
    /// Primary account id for the JMAP core namespace.
    pub account_id: String,
    /// API endpoint for method calls.
    pub api_url: String,
}

/// Per-alias creation parameters inside the `create` map.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaskedEmailCreate {
    /// Domain the alias is intended for.
    pub for_domain: String,
    /// Alias state, always `"enabled"` here.
    pub state: &'static str,
    /// Random local-part prefix for the generated address.
    pub email_prefix: String,
}

/// Arguments object of a `MaskedEmail/set` call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaskedEmailSetArgs {
    /// Account the alias is created under.
    pub account_id: String,
    /// Creation tag -> alias parameters.
    pub create: HashMap<&'static str, MaskedEmailCreate>,
}

/// One `[name, arguments, callId]` method call. Serializes as a JSON
/// array because tuple structs serialize positionally.
#[derive(Debug, Serialize)]
pub struct MethodCall(
    pub &'static str,
    pub MaskedEmailSetArgs,
    pub &'static str,
);

/// Top-level JMAP request envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodCallRequest {
    /// Capability URIs the request relies on.
    pub using: Vec<&'static str>,
    /// The batched method calls (exactly one here).
    pub method_calls: Vec<MethodCall>,
}

/// Top-level JMAP response envelope.
///
/// Each method response is kept as an opaque value; the inner triples
/// are heterogeneous and get decoded in a second pass.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodCallResponse {
    /// The batched method responses, undecoded.
    pub method_responses: Vec<serde_json::Value>,
}

/// Arguments object of a `MaskedEmail/set` response.
#[derive(Debug, Deserialize)]
pub struct MaskedEmailSetResponse {
    /// Creation tag -> created alias. Absent when nothing was created.
    #[serde(default)]
    pub created: HashMap<String, MaskedEmailCreated>,
}

/// A successfully created alias in the `created` map.
#[derive(Debug, Deserialize)]
pub struct MaskedEmailCreated {
    /// The full generated address.
    pub email: String,
}

/// Final output of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct AliasResult {
    /// The random prefix the alias was requested with.
    pub prefix: String,
    /// The domain the alias is bound to.
    pub domain: String,
    /// The generated masked address.
    pub email: String,
}

//! JMAP client for session bootstrap and masked email creation.
//!
//! One client instance performs at most two round trips per run: an
//! authenticated GET of the session document, then a single
//! `MaskedEmail/set` POST. There is no retry policy and no session
//! caching; each invocation bootstraps from scratch.

use log::{debug, error};

use crate::error::ClientError;
use crate::jmap::{
    AliasResult, CALL_ID, CORE_CAPABILITY, CREATE_TAG, HTTP_TIMEOUT, Identity,
    MASKED_EMAIL_CAPABILITY, MASKED_EMAIL_SET, MaskedEmailCreate, MaskedEmailSetArgs,
    MaskedEmailSetResponse, MethodCall, MethodCallRequest, MethodCallResponse, SESSION_URL,
    STATE_ENABLED, SessionResponse,
};
use crate::prefix;
use crate::token::SecureToken;

/// Client for the Fastmail JMAP API.
///
/// Holds the bearer token (redacted in any formatting, see
/// [`SecureToken`]) and a reqwest client with a 5 second timeout shared
/// by both calls.
#[derive(Debug, Clone)]
pub struct JmapClient {
    http: reqwest::Client,
    token: SecureToken,
    session_url: String,
}

impl JmapClient {
    /// Creates a client from a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the underlying HTTP client
    /// cannot be constructed.
    pub fn new(token: SecureToken) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Config(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            http,
            token,
            session_url: SESSION_URL.to_string(),
        })
    }

    /// Overrides the session discovery URL.
    ///
    /// Used to point the client at a test server.
    #[must_use]
    pub fn with_session_url(mut self, url: impl Into<String>) -> Self {
        self.session_url = url.into();
        self
    }

    /// Fetches the session document and extracts the account identity.
    ///
    /// Verifies the token carries the masked email capability and that
    /// the primary account id for the core namespace is a string; the
    /// server violating either is as fatal as a bad token.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Auth`] on transport failure, non-200
    /// status (carrying the response body verbatim), malformed session
    /// JSON, a missing masked email capability, or a non-string account
    /// id.
    pub async fn bootstrap(&self) -> Result<Identity, ClientError> {
        debug!("fetching session document from {}", self.session_url);

        let response = self
            .http
            .get(&self.session_url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.token.full_token()))
            .send()
            .await
            .map_err(|e| ClientError::Auth(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Auth(e.to_string()))?;

        if status != reqwest::StatusCode::OK {
            error!("session request failed with status {status}");
            return Err(ClientError::Auth(body));
        }

        let session: SessionResponse = serde_json::from_str(&body)
            .map_err(|e| ClientError::Auth(format!("malformed session document: {e}")))?;

        if !session.capabilities.contains_key(MASKED_EMAIL_CAPABILITY) {
            return Err(ClientError::Auth(
                "fastmail token does not have masked email capability".to_string(),
            ));
        }

        let account_id = session.primary_accounts.get(CORE_CAPABILITY).ok_or_else(|| {
            ClientError::Auth(format!("no primary account for {CORE_CAPABILITY}"))
        })?;
        let account_id = account_id.as_str().ok_or_else(|| {
            ClientError::Auth(format!(
                "found account id but it was of unexpected type: {account_id}"
            ))
        })?;

        debug!("authenticated against account {account_id}");

        Ok(Identity {
            account_id: account_id.to_string(),
            api_url: session.api_url,
        })
    }

    /// Creates one masked email alias for `domain`.
    ///
    /// Generates a fresh random prefix, submits a single
    /// `MaskedEmail/set` call, and extracts the created address from the
    /// response.
    ///
    /// The method response triple `[name, arguments, callId]` mixes a
    /// string, a method-specific object, and another string, so it is
    /// decoded in two phases: first into opaque JSON values, then the
    /// arguments object against the `MaskedEmail/set` shape once the
    /// method name has been matched.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Alias`] on transport failure, non-200
    /// status (carrying status and body), or any response the alias
    /// cannot be extracted from: an empty `methodResponses` sequence, a
    /// triple shorter than two elements, a method name other than
    /// `MaskedEmail/set`, a missing `fastmask` creation tag, or an empty
    /// email.
    pub async fn create_alias(
        &self,
        identity: &Identity,
        domain: &str,
    ) -> Result<AliasResult, ClientError> {
        let prefix = prefix::generate();

        let request = MethodCallRequest {
            using: vec![CORE_CAPABILITY, MASKED_EMAIL_CAPABILITY],
            method_calls: vec![MethodCall(
                MASKED_EMAIL_SET,
                MaskedEmailSetArgs {
                    account_id: identity.account_id.clone(),
                    create: [(
                        CREATE_TAG,
                        MaskedEmailCreate {
                            for_domain: domain.to_string(),
                            state: STATE_ENABLED,
                            email_prefix: prefix.clone(),
                        },
                    )]
                    .into(),
                },
                CALL_ID,
            )],
        };

        debug!("creating masked email for {domain} with prefix {prefix}");

        let response = self
            .http
            .post(&identity.api_url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.token.full_token()))
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::Alias(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Alias(e.to_string()))?;

        if status != reqwest::StatusCode::OK {
            error!("masked email request failed with status {status}");
            return Err(ClientError::Alias(format!(
                "server returned status code {}: {body}",
                status.as_u16()
            )));
        }

        let envelope: MethodCallResponse = serde_json::from_str(&body)
            .map_err(|e| ClientError::Alias(format!("failed to parse response: {e}")))?;

        let first = envelope
            .method_responses
            .first()
            .ok_or_else(|| ClientError::Alias("empty method responses".to_string()))?;

        // Phase one: the triple as opaque values.
        let triple: Vec<serde_json::Value> = serde_json::from_value(first.clone())
            .map_err(|e| ClientError::Alias(format!("failed to parse method response array: {e}")))?;
        if triple.len() < 2 {
            return Err(ClientError::Alias(format!(
                "invalid method response length: {}",
                triple.len()
            )));
        }

        let name = triple
            .first()
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| ClientError::Alias("method name was not a string".to_string()))?;
        if name != MASKED_EMAIL_SET {
            return Err(ClientError::Alias(format!(
                "unexpected method response: {name}"
            )));
        }

        // Phase two: the arguments object against the shape the matched
        // method name implies.
        let args = triple
            .get(1)
            .cloned()
            .ok_or_else(|| ClientError::Alias("missing set response".to_string()))?;
        let set_response: MaskedEmailSetResponse = serde_json::from_value(args)
            .map_err(|e| ClientError::Alias(format!("failed to parse set response: {e}")))?;

        let created = set_response
            .created
            .get(CREATE_TAG)
            .ok_or_else(|| ClientError::Alias("no fastmask response in created map".to_string()))?;

        if created.email.is_empty() {
            return Err(ClientError::Alias("email was empty in response".to_string()));
        }

        debug!("created masked email {}", created.email);

        Ok(AliasResult {
            prefix,
            domain: domain.to_string(),
            email: created.email.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const TEST_TOKEN: &str = "fmu1-testtoken1234567890";

    fn test_client(session_url: &str) -> JmapClient {
        JmapClient::new(SecureToken::new(TEST_TOKEN))
            .unwrap()
            .with_session_url(session_url)
    }

    fn session_body(api_url: &str) -> serde_json::Value {
        serde_json::json!({
            "apiUrl": api_url,
            "capabilities": {
                CORE_CAPABILITY: {},
                MASKED_EMAIL_CAPABILITY: {}
            },
            "primaryAccounts": {
                CORE_CAPABILITY: "u12345678"
            }
        })
    }

    fn test_identity(api_url: &str) -> Identity {
        Identity {
            account_id: "u12345678".to_string(),
            api_url: api_url.to_string(),
        }
    }

    #[tokio::test]
    async fn bootstrap_extracts_identity() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .and(header("Authorization", format!("Bearer {TEST_TOKEN}")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(session_body("https://api.example.com/jmap/api")),
            )
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let identity = client.bootstrap().await.unwrap();

        assert_eq!(identity.account_id, "u12345678");
        assert_eq!(identity.api_url, "https://api.example.com/jmap/api");
    }

    #[tokio::test]
    async fn bootstrap_rejects_missing_masked_email_capability() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "apiUrl": "https://api.example.com/jmap/api",
                "capabilities": { CORE_CAPABILITY: {} },
                "primaryAccounts": { CORE_CAPABILITY: "u12345678" }
            })))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let err = client.bootstrap().await.unwrap_err();

        assert!(matches!(err, ClientError::Auth(_)));
        assert!(err.to_string().contains("masked email capability"));
    }

    #[tokio::test]
    async fn bootstrap_rejects_non_string_account_id() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "apiUrl": "https://api.example.com/jmap/api",
                "capabilities": {
                    CORE_CAPABILITY: {},
                    MASKED_EMAIL_CAPABILITY: {}
                },
                "primaryAccounts": { CORE_CAPABILITY: 42 }
            })))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let err = client.bootstrap().await.unwrap_err();

        assert!(matches!(err, ClientError::Auth(_)));
        assert!(err.to_string().contains("unexpected type"));
    }

    #[tokio::test]
    async fn bootstrap_surfaces_error_body_verbatim() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Authorization header not a valid format"))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let err = client.bootstrap().await.unwrap_err();

        assert!(matches!(err, ClientError::Auth(_)));
        assert!(err.to_string().contains("Authorization header not a valid format"));
    }

    #[tokio::test]
    async fn create_alias_extracts_created_email() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/jmap/api"))
            .and(header("Authorization", format!("Bearer {TEST_TOKEN}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "methodResponses": [
                    ["MaskedEmail/set", {
                        "created": {
                            "fastmask": { "email": "foo@example.com" }
                        }
                    }, "0"]
                ]
            })))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let identity = test_identity(&format!("{}/jmap/api", mock_server.uri()));

        let alias = client.create_alias(&identity, "example.org").await.unwrap();

        assert_eq!(alias.email, "foo@example.com");
        assert_eq!(alias.domain, "example.org");
        assert_eq!(alias.prefix.len(), 5);
    }

    #[tokio::test]
    async fn create_alias_rejects_empty_method_responses() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/jmap/api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "methodResponses": []
            })))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let identity = test_identity(&format!("{}/jmap/api", mock_server.uri()));

        let err = client.create_alias(&identity, "example.org").await.unwrap_err();

        assert!(matches!(err, ClientError::Alias(_)));
        assert!(err.to_string().contains("empty method responses"));
    }

    #[tokio::test]
    async fn create_alias_rejects_short_method_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/jmap/api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "methodResponses": [["MaskedEmail/set"]]
            })))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let identity = test_identity(&format!("{}/jmap/api", mock_server.uri()));

        let err = client.create_alias(&identity, "example.org").await.unwrap_err();

        assert!(err.to_string().contains("invalid method response length"));
    }

    #[tokio::test]
    async fn create_alias_rejects_error_method_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/jmap/api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "methodResponses": [
                    ["error", { "type": "unknownMethod" }, "0"]
                ]
            })))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let identity = test_identity(&format!("{}/jmap/api", mock_server.uri()));

        let err = client.create_alias(&identity, "example.org").await.unwrap_err();

        assert!(err.to_string().contains("unexpected method response: error"));
    }

    #[tokio::test]
    async fn create_alias_rejects_missing_fastmask_tag() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/jmap/api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "methodResponses": [
                    ["MaskedEmail/set", { "created": {} }, "0"]
                ]
            })))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let identity = test_identity(&format!("{}/jmap/api", mock_server.uri()));

        let err = client.create_alias(&identity, "example.org").await.unwrap_err();

        assert!(err.to_string().contains("no fastmask response"));
    }

    #[tokio::test]
    async fn create_alias_rejects_empty_email() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/jmap/api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "methodResponses": [
                    ["MaskedEmail/set", {
                        "created": { "fastmask": { "email": "" } }
                    }, "0"]
                ]
            })))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let identity = test_identity(&format!("{}/jmap/api", mock_server.uri()));

        let err = client.create_alias(&identity, "example.org").await.unwrap_err();

        assert!(err.to_string().contains("email was empty"));
    }

    #[tokio::test]
    async fn create_alias_surfaces_status_and_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/jmap/api"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let identity = test_identity(&format!("{}/jmap/api", mock_server.uri()));

        let err = client.create_alias(&identity, "example.org").await.unwrap_err();

        assert!(matches!(err, ClientError::Alias(_)));
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("internal error"));
    }

    #[tokio::test]
    async fn create_alias_tolerates_missing_created_map() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/jmap/api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "methodResponses": [
                    ["MaskedEmail/set", { "notCreated": {} }, "0"]
                ]
            })))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let identity = test_identity(&format!("{}/jmap/api", mock_server.uri()));

        // No `created` map decodes as empty, which reads as a missing tag.
        let err = client.create_alias(&identity, "example.org").await.unwrap_err();
        assert!(err.to_string().contains("no fastmask response"));
    }
}

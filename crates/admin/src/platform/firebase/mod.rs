//! Firebase REST client.
//!
//! Talks to two Google APIs:
//!
//! - Identity Toolkit (`identitytoolkit.googleapis.com/v1`) for ID token
//!   lookup and account management
//! - Cloud Firestore (`firestore.googleapis.com/v1`) for documents
//!
//! # Authentication
//!
//! Token lookup is authorized with the project's web API key. Account
//! management and Firestore calls need an OAuth access token, resolved per
//! service in this order:
//!
//! 1. That service's emulator configured: the emulator `owner` token
//! 2. `FIREBASE_ACCESS_TOKEN` set: that token
//! 3. Service account configured: a token from the JWT-bearer exchange
//! 4. Otherwise: the GCE/Cloud Run metadata server
//!
//! Exchanged and metadata tokens are cached for [`ACCESS_TOKEN_TTL`].

mod credentials;
mod firestore;
mod identity;

pub use credentials::ServiceAccount;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::PlatformError;
use crate::config::FirebaseConfig;

/// Identity Toolkit base URL.
const IDENTITY_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Firestore base URL.
const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Metadata server endpoint issuing access tokens for the default service account.
const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Bearer the emulators accept as a fully privileged caller.
const EMULATOR_BEARER: &str = "owner";

/// Access tokens live for an hour; refresh well before that.
pub const ACCESS_TOKEN_TTL: Duration = Duration::from_secs(50 * 60);

const ACCESS_TOKEN_KEY: &str = "default";

/// Which Google API a privileged request goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Service {
    Identity,
    Firestore,
}

/// Firebase API client.
///
/// Cheap to clone; all clones share one HTTP client and token cache.
#[derive(Clone)]
pub struct FirebaseClient {
    inner: Arc<FirebaseClientInner>,
}

struct FirebaseClientInner {
    client: reqwest::Client,
    project_id: String,
    api_key: Option<SecretString>,
    static_token: Option<SecretString>,
    service_account: Option<ServiceAccount>,
    auth_emulated: bool,
    firestore_emulated: bool,
    identity_base: String,
    documents_root: String,
    tokens: Cache<&'static str, SecretString>,
}

impl std::fmt::Debug for FirebaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseClient")
            .field("project_id", &self.inner.project_id)
            .field("identity_base", &self.inner.identity_base)
            .field("documents_root", &self.inner.documents_root)
            .field("auth_emulated", &self.inner.auth_emulated)
            .field("firestore_emulated", &self.inner.firestore_emulated)
            .field(
                "service_account",
                &self.inner.service_account.as_ref().map(ServiceAccount::client_email),
            )
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    #[serde(default)]
    message: String,
}

impl FirebaseClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &FirebaseConfig) -> Result<Self, PlatformError> {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()?;

        let identity_base = config.auth_emulator_host.as_ref().map_or_else(
            || IDENTITY_BASE_URL.to_owned(),
            |host| format!("http://{host}/identitytoolkit.googleapis.com/v1"),
        );
        let firestore_base = config.firestore_emulator_host.as_ref().map_or_else(
            || FIRESTORE_BASE_URL.to_owned(),
            |host| format!("http://{host}/v1"),
        );
        let documents_root = format!(
            "{firestore_base}/projects/{}/databases/(default)/documents",
            config.project_id
        );

        Ok(Self {
            inner: Arc::new(FirebaseClientInner {
                client,
                project_id: config.project_id.clone(),
                api_key: config.api_key.clone(),
                static_token: config.access_token.clone(),
                service_account: config
                    .client_email
                    .clone()
                    .zip(config.private_key.clone())
                    .map(|(email, key)| ServiceAccount::new(email, key)),
                auth_emulated: config.auth_emulator_host.is_some(),
                firestore_emulated: config.firestore_emulator_host.is_some(),
                identity_base,
                documents_root,
                tokens: Cache::builder()
                    .max_capacity(1)
                    .time_to_live(ACCESS_TOKEN_TTL)
                    .build(),
            }),
        })
    }

    /// Firebase project ID.
    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.inner.project_id
    }

    /// Resource name prefix for documents, e.g.
    /// `projects/p/databases/(default)/documents`.
    fn documents_resource(&self) -> String {
        format!(
            "projects/{}/databases/(default)/documents",
            self.inner.project_id
        )
    }

    fn is_emulated(&self, service: Service) -> bool {
        match service {
            Service::Identity => self.inner.auth_emulated,
            Service::Firestore => self.inner.firestore_emulated,
        }
    }

    /// Resolve an OAuth access token for privileged calls to `service`.
    async fn access_token(&self, service: Service) -> Result<SecretString, PlatformError> {
        if self.is_emulated(service) {
            return Ok(SecretString::from(EMULATOR_BEARER));
        }
        if let Some(token) = &self.inner.static_token {
            return Ok(token.clone());
        }

        let fetch = async {
            match &self.inner.service_account {
                Some(account) => self.exchange_assertion(account).await,
                None => self.fetch_metadata_token().await,
            }
        };
        self.inner
            .tokens
            .try_get_with(ACCESS_TOKEN_KEY, fetch)
            .await
            .map_err(|e| PlatformError::Credentials(e.to_string()))
    }

    async fn exchange_assertion(
        &self,
        account: &ServiceAccount,
    ) -> Result<SecretString, PlatformError> {
        tracing::debug!(
            client_email = account.client_email(),
            "Exchanging service account assertion"
        );
        let assertion = account.assertion(jsonwebtoken::get_current_timestamp())?;

        let response = self
            .inner
            .client
            .post(credentials::TOKEN_URL)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(credentials::token_request_body(&assertion))
            .send()
            .await
            .map_err(|e| PlatformError::Credentials(format!("token endpoint unreachable: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(PlatformError::Credentials(format!(
                "token exchange returned {status}: {detail}"
            )));
        }

        let token: credentials::TokenResponse = response
            .json()
            .await
            .map_err(|e| PlatformError::Parse(format!("Failed to parse token response: {e}")))?;
        Ok(SecretString::from(token.access_token))
    }

    async fn fetch_metadata_token(&self) -> Result<SecretString, PlatformError> {
        tracing::debug!("Fetching access token from metadata server");
        let response = self
            .inner
            .client
            .get(METADATA_TOKEN_URL)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| PlatformError::Credentials(format!("metadata server unreachable: {e}")))?;

        if !response.status().is_success() {
            return Err(PlatformError::Credentials(format!(
                "metadata server returned {}",
                response.status()
            )));
        }

        let token: MetadataToken = response
            .json()
            .await
            .map_err(|e| PlatformError::Parse(format!("Failed to parse metadata token: {e}")))?;
        Ok(SecretString::from(token.access_token))
    }

    /// Build a request to `service` carrying the OAuth bearer.
    async fn authorized(
        &self,
        service: Service,
        method: reqwest::Method,
        url: &str,
    ) -> Result<reqwest::RequestBuilder, PlatformError> {
        let token = self.access_token(service).await?;
        Ok(self
            .inner
            .client
            .request(method, url)
            .bearer_auth(token.expose_secret()))
    }

    /// Handle API response and parse JSON.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, PlatformError> {
        if response.status().is_success() {
            return response
                .json()
                .await
                .map_err(|e| PlatformError::Parse(format!("Failed to parse response: {e}")));
        }

        Err(Self::parse_error(response).await)
    }

    /// Check for success, discarding the body.
    async fn expect_success(response: reqwest::Response) -> Result<(), PlatformError> {
        if response.status().is_success() {
            return Ok(());
        }
        Err(Self::parse_error(response).await)
    }

    /// Parse a Google API error response.
    async fn parse_error(response: reqwest::Response) -> PlatformError {
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<GoogleErrorBody>(&text)
            .map(|body| body.error.message)
            .unwrap_or(text);

        classify_error(status, message)
    }
}

/// Map an HTTP status and Google error message to a [`PlatformError`].
///
/// Identity Toolkit reports most failures as `400` with a code such as
/// `USER_NOT_FOUND` or `INVALID_ID_TOKEN : detail` in the message.
fn classify_error(status: u16, message: String) -> PlatformError {
    let code = message
        .split([' ', ':'])
        .next()
        .unwrap_or_default();

    match code {
        "USER_NOT_FOUND" => PlatformError::NotFound(message),
        "INVALID_ID_TOKEN" | "TOKEN_EXPIRED" | "USER_DISABLED" | "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" => {
            PlatformError::InvalidToken(message)
        }
        _ => match status {
            404 => PlatformError::NotFound(message),
            401 | 403 => PlatformError::Credentials(message),
            _ => PlatformError::Api { status, message },
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> FirebaseConfig {
        FirebaseConfig {
            project_id: "demo-gmexpress".to_owned(),
            ..FirebaseConfig::default()
        }
    }

    #[test]
    fn test_classify_identity_codes() {
        assert!(matches!(
            classify_error(400, "USER_NOT_FOUND".to_owned()),
            PlatformError::NotFound(_)
        ));
        assert!(matches!(
            classify_error(400, "INVALID_ID_TOKEN : Invalid token".to_owned()),
            PlatformError::InvalidToken(_)
        ));
        assert!(matches!(
            classify_error(400, "TOKEN_EXPIRED".to_owned()),
            PlatformError::InvalidToken(_)
        ));
    }

    #[test]
    fn test_classify_by_status() {
        assert!(matches!(
            classify_error(404, "Document not found".to_owned()),
            PlatformError::NotFound(_)
        ));
        assert!(matches!(
            classify_error(403, "PERMISSION_DENIED".to_owned()),
            PlatformError::Credentials(_)
        ));
        assert!(matches!(
            classify_error(503, "unavailable".to_owned()),
            PlatformError::Api { status: 503, .. }
        ));
    }

    #[test]
    fn test_production_urls() {
        let client = FirebaseClient::new(&config()).unwrap();
        assert_eq!(client.inner.identity_base, IDENTITY_BASE_URL);
        assert_eq!(
            client.inner.documents_root,
            "https://firestore.googleapis.com/v1/projects/demo-gmexpress/databases/(default)/documents"
        );
        assert!(!client.inner.auth_emulated);
        assert!(!client.inner.firestore_emulated);
        assert!(client.inner.service_account.is_none());
    }

    #[test]
    fn test_emulator_urls() {
        let mut config = config();
        config.auth_emulator_host = Some("127.0.0.1:9099".to_owned());
        config.firestore_emulator_host = Some("127.0.0.1:8080".to_owned());

        let client = FirebaseClient::new(&config).unwrap();
        assert_eq!(
            client.inner.identity_base,
            "http://127.0.0.1:9099/identitytoolkit.googleapis.com/v1"
        );
        assert!(client.inner.documents_root.starts_with("http://127.0.0.1:8080/v1/projects/"));
        assert!(client.inner.auth_emulated);
        assert!(client.inner.firestore_emulated);
    }

    #[tokio::test]
    async fn test_emulator_uses_owner_bearer() {
        let mut config = config();
        config.auth_emulator_host = Some("localhost:9099".to_owned());
        config.firestore_emulator_host = Some("localhost:8080".to_owned());
        let client = FirebaseClient::new(&config).unwrap();

        for service in [Service::Identity, Service::Firestore] {
            let token = client.access_token(service).await.unwrap();
            assert_eq!(token.expose_secret(), EMULATOR_BEARER);
        }
    }

    #[tokio::test]
    async fn test_owner_bearer_only_for_emulated_service() {
        let mut config = config();
        config.firestore_emulator_host = Some("localhost:8080".to_owned());
        config.access_token = Some(SecretString::from("ya29.static-token"));
        let client = FirebaseClient::new(&config).unwrap();

        assert_eq!(client.inner.identity_base, IDENTITY_BASE_URL);
        let firestore = client.access_token(Service::Firestore).await.unwrap();
        assert_eq!(firestore.expose_secret(), EMULATOR_BEARER);
        let identity = client.access_token(Service::Identity).await.unwrap();
        assert_eq!(identity.expose_secret(), "ya29.static-token");
    }

    #[tokio::test]
    async fn test_static_token_wins_over_metadata() {
        let mut config = config();
        config.access_token = Some(SecretString::from("ya29.static-token"));
        let client = FirebaseClient::new(&config).unwrap();

        let token = client.access_token(Service::Firestore).await.unwrap();
        assert_eq!(token.expose_secret(), "ya29.static-token");
    }

    #[test]
    fn test_service_account_needs_both_variables() {
        let mut config = config();
        config.client_email = Some("cli@demo-gmexpress.iam.gserviceaccount.com".to_owned());
        let client = FirebaseClient::new(&config).unwrap();
        assert!(client.inner.service_account.is_none());

        config.private_key = Some(SecretString::from("pem"));
        let client = FirebaseClient::new(&config).unwrap();
        assert_eq!(
            client.inner.service_account.as_ref().map(ServiceAccount::client_email),
            Some("cli@demo-gmexpress.iam.gserviceaccount.com")
        );
    }

    #[tokio::test]
    async fn test_bad_service_account_key_is_credentials_error() {
        let mut config = config();
        config.client_email = Some("cli@demo-gmexpress.iam.gserviceaccount.com".to_owned());
        config.private_key = Some(SecretString::from("not a pem key"));
        let client = FirebaseClient::new(&config).unwrap();

        let err = client.access_token(Service::Identity).await.unwrap_err();
        assert!(matches!(err, PlatformError::Credentials(_)));
    }
}

//! Service account credentials.
//!
//! A service account key is exchanged for an OAuth access token with the
//! JWT-bearer grant: an RS256-signed assertion naming the account and the
//! requested scopes is posted to Google's token endpoint.

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::platform::PlatformError;

/// OAuth token endpoint, also the assertion audience.
pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Scopes covering Identity Toolkit and Firestore.
const SCOPES: &str = "https://www.googleapis.com/auth/cloud-platform \
                      https://www.googleapis.com/auth/datastore \
                      https://www.googleapis.com/auth/identitytoolkit \
                      https://www.googleapis.com/auth/userinfo.email";

/// Assertions are valid for the maximum Google accepts.
const ASSERTION_LIFETIME_SECS: u64 = 3600;

/// A service account identity and its signing key.
#[derive(Clone)]
pub struct ServiceAccount {
    client_email: String,
    private_key: SecretString,
}

impl std::fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("client_email", &self.client_email)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
struct AssertionClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: u64,
    exp: u64,
}

#[derive(Debug, Deserialize)]
pub(super) struct TokenResponse {
    pub access_token: String,
}

impl ServiceAccount {
    /// Create from an email and a PEM-encoded RSA key.
    #[must_use]
    pub const fn new(client_email: String, private_key: SecretString) -> Self {
        Self {
            client_email,
            private_key,
        }
    }

    /// Service account email.
    #[must_use]
    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    fn claims(&self, now: u64) -> AssertionClaims {
        AssertionClaims {
            iss: self.client_email.clone(),
            scope: SCOPES.to_owned(),
            aud: TOKEN_URL.to_owned(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        }
    }

    /// Sign a token-request assertion issued at `now` (Unix seconds).
    ///
    /// # Errors
    ///
    /// Returns `Credentials` if the key is not a valid RSA PEM key.
    pub fn assertion(&self, now: u64) -> Result<String, PlatformError> {
        let key = EncodingKey::from_rsa_pem(self.private_key.expose_secret().as_bytes())
            .map_err(|e| PlatformError::Credentials(format!("invalid service account key: {e}")))?;

        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &self.claims(now), &key)
            .map_err(|e| PlatformError::Credentials(format!("failed to sign assertion: {e}")))
    }
}

/// Form body for the token endpoint.
pub(super) fn token_request_body(assertion: &str) -> String {
    format!(
        "grant_type={}&assertion={}",
        urlencoding::encode(JWT_BEARER_GRANT),
        urlencoding::encode(assertion)
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use jsonwebtoken::{DecodingKey, Validation};

    use super::*;

    const TEST_KEY: &str = include_str!("testdata/service_account_key.pem");
    const TEST_PUBLIC_KEY: &str = include_str!("testdata/service_account_pub.pem");

    fn account(key: &str) -> ServiceAccount {
        ServiceAccount::new(
            "cli@demo-gmexpress.iam.gserviceaccount.com".to_owned(),
            SecretString::from(key),
        )
    }

    #[test]
    fn test_claims() {
        let claims = account(TEST_KEY).claims(1_700_000_000);
        assert_eq!(claims.iss, "cli@demo-gmexpress.iam.gserviceaccount.com");
        assert_eq!(claims.aud, TOKEN_URL);
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(claims.scope.contains("/auth/identitytoolkit"));
        assert!(claims.scope.contains("/auth/datastore"));
        assert!(!claims.scope.contains("  "));
    }

    #[test]
    fn test_assertion_is_signed_with_the_account_key() {
        let now = jsonwebtoken::get_current_timestamp();
        let assertion = account(TEST_KEY).assertion(now).unwrap();

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[TOKEN_URL]);
        validation.set_issuer(&["cli@demo-gmexpress.iam.gserviceaccount.com"]);
        let decoded = jsonwebtoken::decode::<AssertionClaims>(
            &assertion,
            &DecodingKey::from_rsa_pem(TEST_PUBLIC_KEY.as_bytes()).unwrap(),
            &validation,
        )
        .unwrap();

        assert_eq!(decoded.claims, account(TEST_KEY).claims(now));
    }

    #[test]
    fn test_bad_key_is_credentials_error() {
        let err = account("not a pem key").assertion(0).unwrap_err();
        assert!(matches!(err, PlatformError::Credentials(_)));
    }

    #[test]
    fn test_debug_redacts_key() {
        let debug = format!("{:?}", account(TEST_KEY));
        assert!(debug.contains("cli@demo-gmexpress"));
        assert!(!debug.contains("PRIVATE KEY"));
    }

    #[test]
    fn test_token_request_body_is_form_encoded() {
        let body = token_request_body("a.b+c/d");
        assert_eq!(
            body,
            "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer&assertion=a.b%2Bc%2Fd"
        );
    }
}

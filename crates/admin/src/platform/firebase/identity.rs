//! Identity Toolkit operations.

use async_trait::async_trait;
use gmexpress_core::UserId;
use reqwest::Method;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{FirebaseClient, Service};
use crate::platform::{IdentityProvider, IdentityRecord, PlatformError, UserPage, VerifiedToken};

/// Largest page `accounts:batchGet` accepts.
pub const MAX_PAGE_SIZE: u32 = 1000;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    id_token: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteAccountRequest<'a> {
    local_id: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountInfo {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
}

impl From<AccountInfo> for IdentityRecord {
    fn from(info: AccountInfo) -> Self {
        Self {
            uid: UserId::new(info.local_id),
            email: info.email,
            display_name: info.display_name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<AccountInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchGetResponse {
    #[serde(default)]
    users: Vec<AccountInfo>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[async_trait]
impl IdentityProvider for FirebaseClient {
    #[instrument(skip_all)]
    async fn verify_id_token(&self, id_token: &str) -> Result<VerifiedToken, PlatformError> {
        let api_key = match (&self.inner.api_key, self.inner.auth_emulated) {
            (Some(key), _) => key.expose_secret().to_owned(),
            (None, true) => "emulator".to_owned(),
            (None, false) => {
                return Err(PlatformError::Credentials(
                    "FIREBASE_API_KEY is required to verify ID tokens".to_owned(),
                ));
            }
        };

        let url = format!(
            "{}/accounts:lookup?key={}",
            self.inner.identity_base,
            urlencoding::encode(&api_key)
        );
        let response = self
            .inner
            .client
            .post(&url)
            .json(&LookupRequest { id_token })
            .send()
            .await?;

        let lookup: LookupResponse = Self::handle_response(response).await?;
        let account = lookup
            .users
            .into_iter()
            .next()
            .ok_or_else(|| PlatformError::InvalidToken("no account for token".to_owned()))?;

        Ok(VerifiedToken {
            uid: UserId::new(account.local_id),
            email: account.email,
        })
    }

    #[instrument(skip(self), fields(uid = %uid))]
    async fn delete_user(&self, uid: &UserId) -> Result<(), PlatformError> {
        let url = format!(
            "{}/projects/{}/accounts:delete",
            self.inner.identity_base, self.inner.project_id
        );
        let response = self
            .authorized(Service::Identity, Method::POST, &url)
            .await?
            .json(&DeleteAccountRequest {
                local_id: uid.as_str(),
            })
            .send()
            .await?;

        Self::expect_success(response).await
    }

    #[instrument(skip(self))]
    async fn list_users(
        &self,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<UserPage, PlatformError> {
        let mut url = format!(
            "{}/projects/{}/accounts:batchGet?maxResults={}",
            self.inner.identity_base,
            self.inner.project_id,
            page_size.clamp(1, MAX_PAGE_SIZE)
        );
        if let Some(token) = page_token {
            url.push_str("&nextPageToken=");
            url.push_str(&urlencoding::encode(token));
        }

        let response = self
            .authorized(Service::Identity, Method::GET, &url)
            .await?
            .send()
            .await?;
        let page: BatchGetResponse = Self::handle_response(response).await?;

        Ok(UserPage {
            users: page.users.into_iter().map(IdentityRecord::from).collect(),
            next_page_token: page.next_page_token.filter(|t| !t.is_empty()),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_get_response_without_users() {
        let page: BatchGetResponse = serde_json::from_str("{}").unwrap();
        assert!(page.users.is_empty());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn test_account_info_maps_to_record() {
        let info: AccountInfo = serde_json::from_str(
            r#"{"localId":"u1","email":"ana@example.cl","displayName":"Ana","emailVerified":true}"#,
        )
        .unwrap();
        let record = IdentityRecord::from(info);

        assert_eq!(record.uid, UserId::new("u1"));
        assert_eq!(record.label(), "ana@example.cl");
        assert_eq!(record.display_name.as_deref(), Some("Ana"));
    }

    #[test]
    fn test_request_bodies_are_camel_case() {
        let body = serde_json::to_value(DeleteAccountRequest { local_id: "u1" }).unwrap();
        assert_eq!(body, serde_json::json!({ "localId": "u1" }));

        let body = serde_json::to_value(LookupRequest { id_token: "t" }).unwrap();
        assert_eq!(body, serde_json::json!({ "idToken": "t" }));
    }
}

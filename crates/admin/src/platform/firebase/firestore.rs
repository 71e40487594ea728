//! Firestore document operations.

use std::collections::HashMap;

use async_trait::async_trait;
use gmexpress_core::{CategoryId, UserId, UserRole};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use super::{FirebaseClient, Service};
use crate::platform::{DocumentStore, NewCategory, PlatformError, UserDocument};

const USERS: &str = "users";
const CATEGORIES: &str = "categories";

/// A Firestore document as returned by the REST API.
#[derive(Debug, Deserialize)]
struct Document {
    name: String,
    #[serde(default)]
    fields: HashMap<String, Value>,
}

impl Document {
    /// Last path segment of the resource name.
    fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or_default()
    }

    /// Value of a `stringValue` field.
    fn string_field(&self, field: &str) -> Option<&str> {
        self.fields.get(field)?.get("stringValue")?.as_str()
    }
}

/// One element of a `:runQuery` response stream.
#[derive(Debug, Deserialize)]
struct QueryResult {
    #[serde(default)]
    document: Option<Document>,
}

/// `where name == value limit 1` on a collection.
fn equality_query(collection: &str, field: &str, value: &str) -> Value {
    json!({
        "structuredQuery": {
            "from": [{ "collectionId": collection }],
            "where": {
                "fieldFilter": {
                    "field": { "fieldPath": field },
                    "op": "EQUAL",
                    "value": { "stringValue": value }
                }
            },
            "limit": 1
        }
    })
}

/// Commit body creating a category with a server-side `createdAt`.
fn create_category_commit(document_name: &str, category: &NewCategory) -> Value {
    json!({
        "writes": [{
            "update": {
                "name": document_name,
                "fields": {
                    "name": { "stringValue": category.name },
                    "createdBy": { "stringValue": category.created_by }
                }
            },
            "updateTransforms": [{
                "fieldPath": "createdAt",
                "setToServerValue": "REQUEST_TIME"
            }],
            "currentDocument": { "exists": false }
        }]
    })
}

impl FirebaseClient {
    fn document_url(&self, collection: &str, id: &str) -> String {
        format!(
            "{}/{collection}/{}",
            self.inner.documents_root,
            urlencoding::encode(id)
        )
    }
}

#[async_trait]
impl DocumentStore for FirebaseClient {
    #[instrument(skip(self), fields(uid = %uid))]
    async fn get_user(&self, uid: &UserId) -> Result<Option<UserDocument>, PlatformError> {
        let url = self.document_url(USERS, uid.as_str());
        let response = self
            .authorized(Service::Firestore, Method::GET, &url)
            .await?
            .send()
            .await?;

        match Self::handle_response::<Document>(response).await {
            Ok(doc) => Ok(Some(UserDocument {
                uid: uid.clone(),
                role: doc
                    .string_field("role")
                    .map(|role| UserRole::from(role.to_owned())),
            })),
            Err(PlatformError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self), fields(uid = %uid))]
    async fn delete_user(&self, uid: &UserId) -> Result<(), PlatformError> {
        let url = self.document_url(USERS, uid.as_str());
        let response = self
            .authorized(Service::Firestore, Method::DELETE, &url)
            .await?
            .send()
            .await?;
        Self::expect_success(response).await
    }

    #[instrument(skip(self))]
    async fn find_category_by_name(&self, name: &str) -> Result<Option<CategoryId>, PlatformError> {
        let url = format!("{}:runQuery", self.inner.documents_root);
        let response = self
            .authorized(Service::Firestore, Method::POST, &url)
            .await?
            .json(&equality_query(CATEGORIES, "name", name))
            .send()
            .await?;

        let results: Vec<QueryResult> = Self::handle_response(response).await?;
        Ok(results
            .into_iter()
            .find_map(|r| r.document)
            .map(|doc| CategoryId::new(doc.id())))
    }

    #[instrument(skip(self), fields(name = %category.name))]
    async fn insert_category(&self, category: &NewCategory) -> Result<CategoryId, PlatformError> {
        let id = CategoryId::new(uuid::Uuid::new_v4().simple().to_string());
        let document_name = format!("{}/{CATEGORIES}/{id}", self.documents_resource());

        let url = format!("{}:commit", self.inner.documents_root);
        let response = self
            .authorized(Service::Firestore, Method::POST, &url)
            .await?
            .json(&create_category_commit(&document_name, category))
            .send()
            .await?;

        Self::expect_success(response).await?;
        Ok(id)
    }
}

//! In-process platform for tests and local runs.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use gmexpress_core::{CategoryId, UserId, UserRole};

use super::{
    DocumentStore, IdentityProvider, IdentityRecord, NewCategory, PlatformError, UserDocument,
    UserPage, VerifiedToken,
};

#[derive(Debug, Default)]
struct State {
    /// ID token -> UID.
    tokens: HashMap<String, UserId>,
    /// Ordered so pagination is stable.
    identities: BTreeMap<UserId, IdentityRecord>,
    user_docs: HashMap<UserId, UserDocument>,
    categories: Vec<(CategoryId, String, String)>,
    next_category: u64,
    failing_identity_deletes: HashSet<UserId>,
    failing_document_deletes: HashSet<UserId>,
    failing_category_inserts: HashSet<String>,
    fail_document_reads: bool,
}

/// Identity provider and document store backed by in-memory maps.
///
/// Builder methods seed the state; failure switches make individual calls
/// return [`PlatformError::Api`] so error paths can be exercised.
#[derive(Debug, Default)]
pub struct InMemoryPlatform {
    state: Mutex<State>,
}

impl InMemoryPlatform {
    /// Create an empty platform.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add an identity record.
    #[must_use]
    pub fn with_identity(self, uid: &str, email: Option<&str>) -> Self {
        let uid = UserId::new(uid);
        self.state().identities.insert(
            uid.clone(),
            IdentityRecord {
                uid,
                email: email.map(str::to_owned),
                display_name: None,
            },
        );
        self
    }

    /// Make `token` verify as `uid`.
    #[must_use]
    pub fn with_token(self, token: &str, uid: &str) -> Self {
        self.state().tokens.insert(token.to_owned(), UserId::new(uid));
        self
    }

    /// Add a `users/{uid}` document.
    #[must_use]
    pub fn with_user_doc(self, uid: &str, role: Option<&str>) -> Self {
        let uid = UserId::new(uid);
        self.state().user_docs.insert(
            uid.clone(),
            UserDocument {
                uid,
                role: role.map(|r| UserRole::from(r.to_owned())),
            },
        );
        self
    }

    /// Add an identity record, a `users/{uid}` document with `role`, and a
    /// token for it.
    #[must_use]
    pub fn with_user(self, uid: &str, role: &str, token: &str) -> Self {
        self.with_identity(uid, None)
            .with_user_doc(uid, Some(role))
            .with_token(token, uid)
    }

    /// Add a category document.
    #[must_use]
    pub fn with_category(self, name: &str) -> Self {
        {
            let mut state = self.state();
            let id = next_category_id(&mut state);
            state
                .categories
                .push((id, name.to_owned(), "seed".to_owned()));
        }
        self
    }

    /// Make identity deletion of `uid` fail.
    #[must_use]
    pub fn failing_identity_delete(self, uid: &str) -> Self {
        self.state().failing_identity_deletes.insert(UserId::new(uid));
        self
    }

    /// Make document deletion of `users/{uid}` fail.
    #[must_use]
    pub fn failing_document_delete(self, uid: &str) -> Self {
        self.state().failing_document_deletes.insert(UserId::new(uid));
        self
    }

    /// Make inserting a category named `name` fail.
    #[must_use]
    pub fn failing_category_insert(self, name: &str) -> Self {
        self.state().failing_category_inserts.insert(name.to_owned());
        self
    }

    /// Make every `users/{uid}` read fail.
    #[must_use]
    pub fn failing_document_reads(self) -> Self {
        self.state().fail_document_reads = true;
        self
    }

    /// Whether an identity record exists for `uid`.
    #[must_use]
    pub fn has_identity(&self, uid: &str) -> bool {
        self.state().identities.contains_key(&UserId::new(uid))
    }

    /// Whether `users/{uid}` exists.
    #[must_use]
    pub fn has_user_doc(&self, uid: &str) -> bool {
        self.state().user_docs.contains_key(&UserId::new(uid))
    }

    /// Names of all categories, in insertion order.
    #[must_use]
    pub fn category_names(&self) -> Vec<String> {
        self.state()
            .categories
            .iter()
            .map(|(_, name, _)| name.clone())
            .collect()
    }

    /// `createdBy` marker of the first category named `name`.
    #[must_use]
    pub fn category_created_by(&self, name: &str) -> Option<String> {
        self.state()
            .categories
            .iter()
            .find(|(_, n, _)| n == name)
            .map(|(_, _, by)| by.clone())
    }
}

fn next_category_id(state: &mut State) -> CategoryId {
    state.next_category += 1;
    CategoryId::new(format!("cat-{}", state.next_category))
}

fn injected(message: &str) -> PlatformError {
    PlatformError::Api {
        status: 500,
        message: message.to_owned(),
    }
}

#[async_trait]
impl IdentityProvider for InMemoryPlatform {
    async fn verify_id_token(&self, id_token: &str) -> Result<VerifiedToken, PlatformError> {
        let state = self.state();
        let uid = state
            .tokens
            .get(id_token)
            .ok_or_else(|| PlatformError::InvalidToken("INVALID_ID_TOKEN".to_owned()))?;

        Ok(VerifiedToken {
            uid: uid.clone(),
            email: state.identities.get(uid).and_then(|r| r.email.clone()),
        })
    }

    async fn delete_user(&self, uid: &UserId) -> Result<(), PlatformError> {
        let mut state = self.state();
        if state.failing_identity_deletes.contains(uid) {
            return Err(injected("identity backend unavailable"));
        }
        state
            .identities
            .remove(uid)
            .map(|_| ())
            .ok_or_else(|| PlatformError::NotFound(format!("user {uid}")))
    }

    async fn list_users(
        &self,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<UserPage, PlatformError> {
        let state = self.state();
        let page_size = usize::try_from(page_size.max(1)).unwrap_or(usize::MAX);

        let mut remaining = state
            .identities
            .values()
            .filter(|record| page_token.is_none_or(|after| record.uid.as_str() > after));

        let users: Vec<IdentityRecord> = remaining.by_ref().take(page_size).cloned().collect();
        let next_page_token = match (remaining.next(), users.last()) {
            (Some(_), Some(last)) => Some(last.uid.to_string()),
            _ => None,
        };

        Ok(UserPage {
            users,
            next_page_token,
        })
    }
}

#[async_trait]
impl DocumentStore for InMemoryPlatform {
    async fn get_user(&self, uid: &UserId) -> Result<Option<UserDocument>, PlatformError> {
        let state = self.state();
        if state.fail_document_reads {
            return Err(injected("database unavailable"));
        }
        Ok(state.user_docs.get(uid).cloned())
    }

    async fn delete_user(&self, uid: &UserId) -> Result<(), PlatformError> {
        let mut state = self.state();
        if state.failing_document_deletes.contains(uid) {
            return Err(injected("database unavailable"));
        }
        state.user_docs.remove(uid);
        Ok(())
    }

    async fn find_category_by_name(&self, name: &str) -> Result<Option<CategoryId>, PlatformError> {
        Ok(self
            .state()
            .categories
            .iter()
            .find(|(_, n, _)| n == name)
            .map(|(id, _, _)| id.clone()))
    }

    async fn insert_category(&self, category: &NewCategory) -> Result<CategoryId, PlatformError> {
        let mut state = self.state();
        if state.failing_category_inserts.contains(&category.name) {
            return Err(injected("write rejected"));
        }
        let id = next_category_id(&mut state);
        state.categories.push((
            id.clone(),
            category.name.clone(),
            category.created_by.clone(),
        ));
        Ok(id)
    }
}

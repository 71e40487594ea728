//! One-off data maintenance run from `gm-cli`.
//!
//! - Orphan cleanup: identity records whose `users/{uid}` profile document is
//!   gone are found page by page and deleted from the identity provider.
//! - Category seeding: the default category names are created unless a
//!   category with the same name already exists.

use gmexpress_core::UserId;
use tracing::instrument;

use crate::platform::{DocumentStore, IdentityProvider, IdentityRecord, NewCategory, PlatformError};

/// Page size used when walking all identity records.
pub const ORPHAN_PAGE_SIZE: u32 = 1000;

/// Category names created by [`seed_default_categories`].
pub const DEFAULT_CATEGORIES: &[&str] = &["Pizza", "Ensalada", "Bebidas", "Desayuno", "Carnes"];

/// `createdBy` marker on seeded categories.
pub const SEED_CREATED_BY: &str = "system-migration";

/// An identity record with no profile document.
pub type OrphanUser = IdentityRecord;

/// Outcome of [`delete_orphan_users`].
#[derive(Debug, Default)]
pub struct CleanupReport {
    pub deleted: Vec<UserId>,
    pub failed: Vec<(UserId, PlatformError)>,
}

/// Outcome of [`seed_default_categories`].
#[derive(Debug, Default)]
pub struct SeedReport {
    pub inserted: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<(String, PlatformError)>,
}

/// Collect every identity record that has no `users/{uid}` document.
///
/// # Errors
///
/// Returns the first platform error; a partial scan is never reported.
#[instrument(skip(identity, documents))]
pub async fn find_orphan_users(
    identity: &dyn IdentityProvider,
    documents: &dyn DocumentStore,
    page_size: u32,
) -> Result<Vec<OrphanUser>, PlatformError> {
    let mut orphans = Vec::new();
    let mut page_token: Option<String> = None;
    let mut scanned = 0usize;

    loop {
        let page = identity
            .list_users(page_size, page_token.as_deref())
            .await?;
        scanned += page.users.len();

        for record in page.users {
            if documents.get_user(&record.uid).await?.is_none() {
                orphans.push(record);
            }
        }

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    tracing::info!(scanned, orphans = orphans.len(), "Orphan scan complete");
    Ok(orphans)
}

/// Delete each orphan's identity record, continuing past failures.
#[instrument(skip_all, fields(count = orphans.len()))]
pub async fn delete_orphan_users(
    identity: &dyn IdentityProvider,
    orphans: &[OrphanUser],
) -> CleanupReport {
    let mut report = CleanupReport::default();

    for orphan in orphans {
        match identity.delete_user(&orphan.uid).await {
            Ok(()) => {
                tracing::info!(uid = %orphan.uid, "Deleted orphan user");
                report.deleted.push(orphan.uid.clone());
            }
            Err(e) => {
                tracing::error!(uid = %orphan.uid, error = %e, "Failed to delete orphan user");
                report.failed.push((orphan.uid.clone(), e));
            }
        }
    }

    report
}

/// Create each named category unless one with that exact name exists.
///
/// Running twice inserts nothing the second time.
#[instrument(skip_all)]
pub async fn seed_default_categories(documents: &dyn DocumentStore, names: &[&str]) -> SeedReport {
    let mut report = SeedReport::default();

    for &name in names {
        match seed_one(documents, name).await {
            Ok(true) => report.inserted.push(name.to_owned()),
            Ok(false) => {
                tracing::debug!(name, "Category already exists");
                report.skipped.push(name.to_owned());
            }
            Err(e) => {
                tracing::error!(name, error = %e, "Failed to seed category");
                report.failed.push((name.to_owned(), e));
            }
        }
    }

    report
}

async fn seed_one(documents: &dyn DocumentStore, name: &str) -> Result<bool, PlatformError> {
    if documents.find_category_by_name(name).await?.is_some() {
        return Ok(false);
    }

    documents
        .insert_category(&NewCategory {
            name: name.to_owned(),
            created_by: SEED_CREATED_BY.to_owned(),
        })
        .await?;
    Ok(true)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::platform::InMemoryPlatform;

    #[tokio::test]
    async fn test_finds_orphans_across_pages() {
        let platform = InMemoryPlatform::new()
            .with_user("a", "cliente", "ta")
            .with_identity("b", Some("b@gm.cl"))
            .with_user("c", "admin", "tc")
            .with_identity("d", None)
            .with_identity("e", None);

        let orphans = find_orphan_users(&platform, &platform, 2).await.unwrap();
        let uids: Vec<_> = orphans.iter().map(|o| o.uid.to_string()).collect();
        assert_eq!(uids, ["b", "d", "e"]);
        assert_eq!(orphans[0].label(), "b@gm.cl");
    }

    #[tokio::test]
    async fn test_no_orphans() {
        let platform = InMemoryPlatform::new().with_user("a", "cliente", "ta");
        let orphans = find_orphan_users(&platform, &platform, ORPHAN_PAGE_SIZE)
            .await
            .unwrap();
        assert!(orphans.is_empty());
    }

    #[tokio::test]
    async fn test_scan_aborts_on_read_failure() {
        let platform = InMemoryPlatform::new()
            .with_identity("a", None)
            .failing_document_reads();
        assert!(find_orphan_users(&platform, &platform, 10).await.is_err());
    }

    #[tokio::test]
    async fn test_cleanup_continues_past_failures() {
        let platform = InMemoryPlatform::new()
            .with_identity("a", None)
            .with_identity("b", None)
            .with_identity("c", None)
            .failing_identity_delete("b");

        let orphans = find_orphan_users(&platform, &platform, 10).await.unwrap();
        let report = delete_orphan_users(&platform, &orphans).await;

        assert_eq!(report.deleted, [UserId::new("a"), UserId::new("c")]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, UserId::new("b"));
        assert!(platform.has_identity("b"));
        assert!(!platform.has_identity("a"));
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let platform = InMemoryPlatform::new().with_category("Bebidas");

        let first = seed_default_categories(&platform, DEFAULT_CATEGORIES).await;
        assert_eq!(first.inserted, ["Pizza", "Ensalada", "Desayuno", "Carnes"]);
        assert_eq!(first.skipped, ["Bebidas"]);
        assert!(first.failed.is_empty());

        let second = seed_default_categories(&platform, DEFAULT_CATEGORIES).await;
        assert!(second.inserted.is_empty());
        assert_eq!(second.skipped.len(), DEFAULT_CATEGORIES.len());
        assert_eq!(platform.category_names().len(), DEFAULT_CATEGORIES.len());
        assert_eq!(
            platform.category_created_by("Pizza").as_deref(),
            Some(SEED_CREATED_BY)
        );
    }

    #[tokio::test]
    async fn test_seed_records_failures() {
        let platform = InMemoryPlatform::new().failing_category_insert("Carnes");
        let report = seed_default_categories(&platform, DEFAULT_CATEGORIES).await;

        assert_eq!(report.inserted.len(), 4);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "Carnes");
        assert!(!platform.category_names().contains(&"Carnes".to_owned()));
    }
}

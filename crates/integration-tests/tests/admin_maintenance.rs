//! Integration tests for the maintenance services behind `gm-cli`.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use gmexpress_admin::platform::InMemoryPlatform;
use gmexpress_admin::services::{
    DEFAULT_CATEGORIES, delete_orphan_users, find_orphan_users, seed_default_categories,
};

#[tokio::test]
async fn test_cleanup_removes_only_orphans() {
    let mut platform = InMemoryPlatform::new();
    for n in 0..25 {
        let uid = format!("user-{n:02}");
        platform = if n % 5 == 0 {
            platform.with_identity(&uid, Some(&format!("{uid}@gmexpress.cl")))
        } else {
            platform.with_user(&uid, "cliente", &format!("token-{n}"))
        };
    }

    let orphans = find_orphan_users(&platform, &platform, 4).await.unwrap();
    let uids: Vec<_> = orphans.iter().map(|o| o.uid.to_string()).collect();
    assert_eq!(uids, ["user-00", "user-05", "user-10", "user-15", "user-20"]);

    let report = delete_orphan_users(&platform, &orphans).await;
    assert_eq!(report.deleted.len(), 5);
    assert!(report.failed.is_empty());

    let remaining = find_orphan_users(&platform, &platform, 4).await.unwrap();
    assert!(remaining.is_empty());
    assert!(platform.has_identity("user-01"));
}

#[tokio::test]
async fn test_seeding_twice_inserts_once() {
    let platform = InMemoryPlatform::new();

    let first = seed_default_categories(&platform, DEFAULT_CATEGORIES).await;
    let second = seed_default_categories(&platform, DEFAULT_CATEGORIES).await;

    assert_eq!(first.inserted.len(), DEFAULT_CATEGORIES.len());
    assert!(second.inserted.is_empty());
    assert_eq!(second.skipped.len(), DEFAULT_CATEGORIES.len());
    assert_eq!(
        platform.category_names(),
        ["Pizza", "Ensalada", "Bebidas", "Desayuno", "Carnes"]
    );
}

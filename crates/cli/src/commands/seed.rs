//! Reference data seeding.
//!
//! Inserts the default product categories into the `categories` collection.
//! Categories that already exist by name are left alone, so the command can
//! be re-run safely.

use gmexpress_admin::services::{DEFAULT_CATEGORIES, seed_default_categories};
use tracing::info;

use super::{CommandError, connect};

/// Seed the default categories.
///
/// # Errors
///
/// Returns an error if the client cannot be built or any insert fails.
pub async fn categories() -> Result<(), CommandError> {
    let client = connect()?;

    info!(count = DEFAULT_CATEGORIES.len(), "Seeding default categories");
    let report = seed_default_categories(&client, DEFAULT_CATEGORIES).await;

    for name in &report.inserted {
        println!("  insertada: {name}");
    }
    for name in &report.skipped {
        println!("  ya existe: {name}");
    }
    for (name, error) in &report.failed {
        println!("  error en {name}: {error}");
    }
    println!(
        "Resultado: {} insertadas, {} ya existían",
        report.inserted.len(),
        report.skipped.len()
    );

    if report.failed.is_empty() {
        Ok(())
    } else {
        Err(CommandError::Partial {
            failed: report.failed.len(),
            total: DEFAULT_CATEGORIES.len(),
        })
    }
}

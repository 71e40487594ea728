//! Identity record maintenance.
//!
//! # Usage
//!
//! ```bash
//! gm-cli users cleanup-orphans [--yes]
//! ```
//!
//! # Environment Variables
//!
//! - `FIREBASE_PROJECT_ID` - Project to clean (default: gmexpress-estesi)
//! - `FIREBASE_ACCESS_TOKEN` - OAuth token with Auth and Firestore admin rights
//! - `FIREBASE_AUTH_EMULATOR_HOST` / `FIRESTORE_EMULATOR_HOST` - Use emulators

use std::io::{BufRead, Write};

use gmexpress_admin::services::{
    ORPHAN_PAGE_SIZE, OrphanUser, delete_orphan_users, find_orphan_users,
};

use super::{CommandError, connect};

/// Find identity records with no profile document and delete them.
///
/// Asks for confirmation on stdin unless `assume_yes` is set.
///
/// # Errors
///
/// Returns an error if the scan fails or any deletion fails.
pub async fn cleanup_orphans(assume_yes: bool) -> Result<(), CommandError> {
    let client = connect()?;

    println!("Buscando usuarios huérfanos...");
    let orphans = find_orphan_users(&client, &client, ORPHAN_PAGE_SIZE).await?;

    if orphans.is_empty() {
        println!("No se encontraron usuarios huérfanos. Todo está sincronizado.");
        return Ok(());
    }

    println!("Se encontraron {} usuarios huérfanos:", orphans.len());
    for (index, orphan) in orphans.iter().enumerate() {
        println!("  {}", describe(index + 1, orphan));
    }

    if !assume_yes {
        println!();
        println!("ADVERTENCIA: Esta acción es irreversible.");
        let answer = prompt("¿Deseas eliminar estos usuarios? (s/n): ")?;
        if !is_confirmation(&answer) {
            println!("Operación cancelada.");
            return Ok(());
        }
    }

    let report = delete_orphan_users(&client, &orphans).await;
    for uid in &report.deleted {
        println!("  eliminado: {uid}");
    }
    for (uid, error) in &report.failed {
        println!("  error eliminando {uid}: {error}");
    }
    println!(
        "Resultado: {} eliminados, {} errores",
        report.deleted.len(),
        report.failed.len()
    );

    if report.failed.is_empty() {
        Ok(())
    } else {
        Err(CommandError::Partial {
            failed: report.failed.len(),
            total: orphans.len(),
        })
    }
}

/// One listing line: `1. email (name) - UID: uid`.
fn describe(position: usize, orphan: &OrphanUser) -> String {
    format!(
        "{position}. {} ({}) - UID: {}",
        orphan.email.as_deref().unwrap_or("Sin email"),
        orphan.display_name.as_deref().unwrap_or("Sin nombre"),
        orphan.uid
    )
}

fn prompt(question: &str) -> Result<String, CommandError> {
    let mut stdout = std::io::stdout();
    write!(stdout, "{question}")?;
    stdout.flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(answer)
}

/// `s`, `si`, `y` and `yes` (any case) confirm; anything else declines.
fn is_confirmation(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "s" | "si" | "sí" | "y" | "yes"
    )
}

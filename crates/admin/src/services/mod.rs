//! Business logic services for admin.
//!
//! # Services
//!
//! - `users` - Admin-initiated user deletion
//! - `maintenance` - Orphan user cleanup and category seeding

pub mod maintenance;
pub mod users;

pub use maintenance::{
    CleanupReport, DEFAULT_CATEGORIES, ORPHAN_PAGE_SIZE, OrphanUser, SeedReport,
    delete_orphan_users, find_orphan_users, seed_default_categories,
};
pub use users::{DeleteUserError, delete_user};

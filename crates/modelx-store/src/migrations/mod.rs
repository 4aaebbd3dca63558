//! Migration framework
//!
//! Provides:
//! - Migration runner with SHA-256 checksums
//! - Idempotent application; a changed migration is rejected
//! - Embedded SQL migrations

mod checksums;
mod embedded;
mod runner;

pub use checksums::compute_checksum;
pub use embedded::{get_migrations, Migration};
pub use runner::apply_migrations;

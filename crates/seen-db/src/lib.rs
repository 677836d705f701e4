//! Database repositories for the Seen verification service
//!
//! Each repository owns a `PgPool` and exposes domain-typed operations.
//! Every read path filters on `deleted_at IS NULL`; soft-deleted rows are
//! invisible to the rest of the system. The expected table and enum
//! definitions are in `schema.sql` next to this crate.

mod store;
mod uploads;

pub use store::VerificationStore;
pub use uploads::{ListUploadsParams, UploadRepository};

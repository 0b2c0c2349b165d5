//! Sharing and collaboration core for a prompt-management product.
//!
//! An owner exposes a private prompt to other parties through revocable,
//! permission-scoped share links, keeps a durable set of named
//! collaborators, and records every change in a linear version ledger, an
//! append-only activity trail, a per-user notification inbox and threaded
//! comments.
//!
//! Everything persists through a single injected [`sqlx::SqlitePool`] (see
//! [`db::init_db`]); services own the orchestration and repositories own
//! the SQL. The crate exposes a library-level contract only — callers bring
//! their own transport, authentication and delivery channels.

pub mod config;
pub mod db;
pub mod error;
pub mod services;

pub use config::{CleanupConfig, Config, ConfigError, DatabaseConfig, SharingConfig};
pub use db::init_db;
pub use error::{AppError, AppResult};

//! Database layer for data persistence and access.
//!
//! This module implements the data access layer using SQLx with SQLite.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  (API request handlers)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   Storage   │  (pool ownership, schema setup, transaction scope)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │ Repositories│  (db::handlers - queries over a single connection)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   SQLite    │
//! └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`storage`]: [`Storage`], the accessor the API layer talks to
//! - [`handlers`]: Repository implementations
//! - [`models`]: Database record structures matching table schemas
//! - [`errors`]: Database-specific error types
//!
//! # Transactions
//!
//! Repositories borrow a `&mut SqliteConnection`, so they run equally well on a pooled
//! connection or inside a transaction. Writes go through [`Storage::insert`], which opens and
//! commits a transaction around the repository call:
//!
//! ```ignore
//! let mut tx = pool.begin().await?;
//! let id = Assessments::new(&mut tx).create(&request).await?;
//! tx.commit().await?;
//! ```
//!
//! # Migrations
//!
//! Migrations live in the `migrations/` directory and are embedded at compile time.
//! [`Storage::initialize`] applies them through [`crate::migrator`].

pub mod errors;
pub mod handlers;
pub mod models;
pub mod storage;

pub use storage::Storage;

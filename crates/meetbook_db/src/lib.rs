//! SQL storage for Meetbook.
//!
//! Provides [`DbClient`], a pooled connection over the `sqlx::Any` driver, and
//! [`SqlSchedulingRepository`], the durable implementation of the scheduling
//! core's repository port. SQLite is enabled by default; PostgreSQL is behind
//! the `postgres` feature.
//!
//! # Example
//!
//! ```rust,no_run
//! use meetbook_config::DatabaseConfig;
//! use meetbook_db::{DbClient, SqlSchedulingRepository};
//!
//! async fn open() -> Result<SqlSchedulingRepository, meetbook_db::DbError> {
//!     let config = DatabaseConfig { url: "sqlite://data/meetbook.db".to_string() };
//!     let repository = SqlSchedulingRepository::new(DbClient::from_config(&config).await?);
//!     repository.init_schema().await?;
//!     Ok(repository)
//! }
//! ```

pub mod client;
pub mod error;
pub mod repositories;

pub use client::{DbClient, DbTransaction};
pub use error::DbError;
pub use repositories::SqlSchedulingRepository;

// ============================================================================
// Casbin Table Adapter Library
// ============================================================================

//! Stores Casbin policy rules in one relational table and keeps the
//! enforcer's in-memory model in step with it.
//!
//! Each rule becomes a row of a ptype tag plus up to six positional columns
//! (`v0`..`v5`). Loading renders rows back into policy lines and feeds them to
//! the model; saving replaces the table; single adds and removes are mirrored
//! one statement at a time.
//!
//! # Examples
//!
//! ```
//! use casbin_table_adapter::{AdapterConfig, MemoryRuleStore, TableAdapter};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MemoryRuleStore::new();
//! let adapter = TableAdapter::new(store.clone(), AdapterConfig::default()).await?;
//!
//! let rule = vec!["alice".to_string(), "data1".to_string(), "read".to_string()];
//! adapter.insert_rule("p", &rule).await?;
//! adapter.insert_rule("p", &rule).await?;
//! assert_eq!(store.row_count("casbin_rule").await?, 2);
//!
//! let removed = adapter.delete_rule("p", &rule[..1]).await?;
//! assert_eq!(removed, 2);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod connection;
pub mod core;
pub mod facade;
pub mod storage;

// Re-export main types for convenience
pub use adapter::TableAdapter;
pub use connection::config::{AdapterConfig, DEFAULT_TABLE_NAME, DatabaseConfig, EnvConfig};
pub use connection::connect;
pub use crate::core::{AdapterError, CasbinRule, MAX_FIELDS, Result, RuleFilter};
pub use facade::{PolicyHost, SharedEnforcer};
pub use storage::{MemoryRuleStore, PgRuleStore, RuleStore};

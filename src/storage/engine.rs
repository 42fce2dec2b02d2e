use crate::core::{CasbinRule, Result, RuleFilter};
use async_trait::async_trait;

/// Rule store trait - the database boundary the adapter talks to.
///
/// Every method is one logical statement against one table. Stores do no
/// retrying and hold no state about the adapter.
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// Create the rule table if it does not exist
    async fn create_table(&self, table: &str) -> Result<()>;

    /// Drop the rule table; fails if it does not exist
    async fn drop_table(&self, table: &str) -> Result<()>;

    /// Read every row, in whatever order the store yields them
    async fn select_all(&self, table: &str) -> Result<Vec<CasbinRule>>;

    /// Insert one row, duplicates included
    async fn insert(&self, table: &str, rule: &CasbinRule) -> Result<()>;

    /// Delete every row matching the filter, returning how many went away
    async fn delete_matching(&self, table: &str, filter: &RuleFilter) -> Result<u64>;

    /// Delete every row, keeping the table
    async fn delete_all(&self, table: &str) -> Result<u64>;
}

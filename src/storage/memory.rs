use super::{RuleStore, RuleTable};
use crate::core::{AdapterError, CasbinRule, Result, RuleFilter};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Rule store backed by in-process tables.
///
/// Clones share the same tables, so a host can keep a handle for inspection
/// while the adapter owns another.
#[derive(Clone, Default)]
pub struct MemoryRuleStore {
    tables: Arc<RwLock<HashMap<String, RuleTable>>>,
}

impl MemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn table_exists(&self, name: &str) -> bool {
        self.tables.read().await.contains_key(name)
    }

    pub async fn list_tables(&self) -> Vec<String> {
        self.tables.read().await.keys().cloned().collect()
    }

    pub async fn row_count(&self, table: &str) -> Result<usize> {
        let tables = self.tables.read().await;
        tables
            .get(table)
            .map(RuleTable::row_count)
            .ok_or_else(|| AdapterError::TableNotFound(table.to_string()))
    }
}

#[async_trait]
impl RuleStore for MemoryRuleStore {
    async fn create_table(&self, table: &str) -> Result<()> {
        self.tables
            .write()
            .await
            .entry(table.to_string())
            .or_insert_with(|| RuleTable::new(table));
        Ok(())
    }

    async fn drop_table(&self, table: &str) -> Result<()> {
        if self.tables.write().await.remove(table).is_none() {
            return Err(AdapterError::TableNotFound(table.to_string()));
        }
        Ok(())
    }

    async fn select_all(&self, table: &str) -> Result<Vec<CasbinRule>> {
        let tables = self.tables.read().await;
        tables
            .get(table)
            .map(RuleTable::scan)
            .ok_or_else(|| AdapterError::TableNotFound(table.to_string()))
    }

    async fn insert(&self, table: &str, rule: &CasbinRule) -> Result<()> {
        let mut tables = self.tables.write().await;
        let target = tables
            .get_mut(table)
            .ok_or_else(|| AdapterError::TableNotFound(table.to_string()))?;
        target.insert(rule.clone());
        Ok(())
    }

    async fn delete_matching(&self, table: &str, filter: &RuleFilter) -> Result<u64> {
        let mut tables = self.tables.write().await;
        let target = tables
            .get_mut(table)
            .ok_or_else(|| AdapterError::TableNotFound(table.to_string()))?;
        Ok(target.delete_matching(filter))
    }

    async fn delete_all(&self, table: &str) -> Result<u64> {
        let mut tables = self.tables.write().await;
        let target = tables
            .get_mut(table)
            .ok_or_else(|| AdapterError::TableNotFound(table.to_string()))?;
        Ok(target.clear())
    }
}

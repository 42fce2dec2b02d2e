use crate::connection::config::AdapterConfig;
use crate::core::{
    AdapterError, CasbinRule, Result, RuleFilter, load_policy_row,
};
use crate::storage::RuleStore;
use async_trait::async_trait;
use casbin::{Adapter, Filter, Model};
use tracing::{debug, info};

/// Policy storage adapter over a single rule table.
///
/// Holds no locks: each call issues its statements in order and relies on the
/// store's isolation. Callers must not run a save concurrently with loads or
/// mutations on the same table; wrap the enforcer (see `PolicyHost`) instead.
pub struct TableAdapter<S: RuleStore> {
    store: S,
    config: AdapterConfig,
    is_filtered: bool,
}

impl<S: RuleStore> TableAdapter<S> {
    /// Validate the configuration and make sure the table exists.
    pub async fn new(store: S, config: AdapterConfig) -> Result<Self> {
        config.validate()?;
        let adapter = Self {
            store,
            config,
            is_filtered: false,
        };
        adapter.ensure_table().await?;
        Ok(adapter)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn table_name(&self) -> &str {
        &self.config.table_name
    }

    /// Create the table if absent. A no-op when the schema is not managed.
    pub async fn ensure_table(&self) -> Result<()> {
        if !self.config.manage_schema {
            return Ok(());
        }
        self.store
            .create_table(self.table_name())
            .await
            .map_err(|err| AdapterError::schema(self.table_name(), err))
    }

    /// Drop the table. Fails when it does not exist; a no-op when the schema is not managed.
    pub async fn drop_table(&self) -> Result<()> {
        if !self.config.manage_schema {
            return Ok(());
        }
        self.store
            .drop_table(self.table_name())
            .await
            .map_err(|err| AdapterError::schema(self.table_name(), err))
    }

    /// Empty the table: drop and recreate, or delete every row when the host owns the schema.
    async fn reset_table(&self) -> Result<()> {
        if self.config.manage_schema {
            self.drop_table().await?;
            self.ensure_table().await
        } else {
            self.store.delete_all(self.table_name()).await?;
            Ok(())
        }
    }

    /// Every stored row, unfiltered.
    pub async fn load_rules(&self) -> Result<Vec<CasbinRule>> {
        self.store.select_all(self.table_name()).await
    }

    /// Append stored rows to `model`. Returns how many rows passed the filter.
    pub async fn load_into(&self, model: &mut dyn Model, filter: Option<&Filter<'_>>) -> Result<usize> {
        let rows = self.load_rules().await?;
        let total = rows.len();

        let mut loaded = 0;
        for row in rows.iter().filter(|row| filter.is_none_or(|f| matches_load_filter(row, f))) {
            load_policy_row(row, model);
            loaded += 1;
        }

        info!(table = self.table_name(), rows = total, loaded, "loaded policy rows");
        Ok(loaded)
    }

    /// Replace the table contents with every `p` and `g` rule in `model`.
    ///
    /// Not atomic. If an insert fails the error is returned at once and the
    /// table keeps only the rows inserted before it; run the save again to
    /// recover.
    pub async fn save_model(&self, model: &dyn Model) -> Result<usize> {
        let mut rows = Vec::new();
        for sec in ["p", "g"] {
            if let Some(ast_map) = model.get_model().get(sec) {
                for (ptype, ast) in ast_map {
                    for rule in ast.get_policy() {
                        rows.push(CasbinRule::from_stored_rule(ptype, rule)?);
                    }
                }
            }
        }

        self.reset_table().await?;
        for row in &rows {
            self.store.insert(self.table_name(), row).await?;
        }

        info!(table = self.table_name(), rows = rows.len(), "saved policy");
        Ok(rows.len())
    }

    /// Insert one rule. Duplicates are stored again, not merged.
    pub async fn insert_rule(&self, ptype: &str, rule: &[String]) -> Result<()> {
        let row = CasbinRule::from_stored_rule(ptype, rule)?;
        debug!(table = self.table_name(), ptype, "inserting rule");
        self.store.insert(self.table_name(), &row).await
    }

    /// Insert a batch of rules. Every rule is checked before the first insert.
    pub async fn insert_rules(&self, ptype: &str, rules: &[Vec<String>]) -> Result<()> {
        let rows = rules
            .iter()
            .map(|rule| CasbinRule::from_stored_rule(ptype, rule))
            .collect::<Result<Vec<_>>>()?;
        debug!(table = self.table_name(), ptype, count = rows.len(), "inserting rules");
        for row in &rows {
            self.store.insert(self.table_name(), row).await?;
        }
        Ok(())
    }

    /// Delete every row matching the non-empty fields of `rule`.
    pub async fn delete_rule(&self, ptype: &str, rule: &[String]) -> Result<u64> {
        let filter = RuleFilter::from_row(&CasbinRule::from_rule(ptype, rule));
        let removed = self.store.delete_matching(self.table_name(), &filter).await?;
        debug!(table = self.table_name(), ptype, removed, "deleted rule");
        Ok(removed)
    }

    /// Delete rows matching `field_values` laid over the columns from `field_index` on.
    pub async fn delete_filtered(
        &self,
        ptype: &str,
        field_index: usize,
        field_values: &[String],
    ) -> Result<u64> {
        let filter = RuleFilter::with_offset(ptype, field_index, field_values);
        let removed = self.store.delete_matching(self.table_name(), &filter).await?;
        debug!(
            table = self.table_name(),
            ptype, field_index, removed, "deleted filtered rules"
        );
        Ok(removed)
    }
}

/// Positional match of a row against the filter list for its section.
fn matches_load_filter(row: &CasbinRule, filter: &Filter<'_>) -> bool {
    let values = match row.section().as_deref() {
        Some("p") => &filter.p,
        Some("g") => &filter.g,
        _ => return true,
    };
    values
        .iter()
        .enumerate()
        .all(|(idx, want)| want.is_empty() || row.field(idx) == Some(*want))
}

#[async_trait]
impl<S: RuleStore + 'static> Adapter for TableAdapter<S> {
    async fn load_policy(&mut self, m: &mut dyn Model) -> casbin::Result<()> {
        self.load_into(m, None).await?;
        self.is_filtered = false;
        Ok(())
    }

    async fn load_filtered_policy<'a>(&mut self, m: &mut dyn Model, f: Filter<'a>) -> casbin::Result<()> {
        self.load_into(m, Some(&f)).await?;
        self.is_filtered = true;
        Ok(())
    }

    async fn save_policy(&mut self, m: &mut dyn Model) -> casbin::Result<()> {
        self.save_model(m).await?;
        Ok(())
    }

    async fn clear_policy(&mut self) -> casbin::Result<()> {
        self.reset_table().await?;
        Ok(())
    }

    fn is_filtered(&self) -> bool {
        self.is_filtered
    }

    async fn add_policy(&mut self, _sec: &str, ptype: &str, rule: Vec<String>) -> casbin::Result<bool> {
        self.insert_rule(ptype, &rule).await?;
        Ok(true)
    }

    async fn add_policies(
        &mut self,
        _sec: &str,
        ptype: &str,
        rules: Vec<Vec<String>>,
    ) -> casbin::Result<bool> {
        self.insert_rules(ptype, &rules).await?;
        Ok(true)
    }

    async fn remove_policy(&mut self, _sec: &str, ptype: &str, rule: Vec<String>) -> casbin::Result<bool> {
        self.delete_rule(ptype, &rule).await?;
        Ok(true)
    }

    async fn remove_policies(
        &mut self,
        _sec: &str,
        ptype: &str,
        rules: Vec<Vec<String>>,
    ) -> casbin::Result<bool> {
        for rule in &rules {
            self.delete_rule(ptype, rule).await?;
        }
        Ok(true)
    }

    async fn remove_filtered_policy(
        &mut self,
        _sec: &str,
        ptype: &str,
        field_index: usize,
        field_values: Vec<String>,
    ) -> casbin::Result<bool> {
        self.delete_filtered(ptype, field_index, &field_values).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_filter_matches_by_section() {
        let filter = Filter {
            p: vec!["", "data1"],
            g: vec!["alice"],
        };

        assert!(matches_load_filter(
            &CasbinRule::from_rule("p", &["bob", "data1", "read"]),
            &filter
        ));
        assert!(!matches_load_filter(
            &CasbinRule::from_rule("p2", &["bob", "data2", "read"]),
            &filter
        ));
        assert!(matches_load_filter(
            &CasbinRule::from_rule("g", &["alice", "admin"]),
            &filter
        ));
        assert!(!matches_load_filter(
            &CasbinRule::from_rule("g2", &["bob", "admin"]),
            &filter
        ));
    }

    #[test]
    fn empty_load_filter_matches_everything() {
        let filter = Filter { p: vec![], g: vec![] };
        assert!(matches_load_filter(&CasbinRule::from_rule("p", &["x"]), &filter));
    }
}

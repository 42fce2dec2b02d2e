use crate::core::{CasbinRule, RuleFilter};
use std::collections::BTreeMap;

/// In-process rule table. Rows are kept in insertion order by row id.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    name: String,
    rows: BTreeMap<usize, CasbinRule>,
    next_row_id: usize,
}

impl RuleTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: BTreeMap::new(),
            next_row_id: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn insert(&mut self, rule: CasbinRule) -> usize {
        let id = self.next_row_id;
        self.next_row_id += 1;
        self.rows.insert(id, rule);
        id
    }

    pub fn scan(&self) -> Vec<CasbinRule> {
        self.rows.values().cloned().collect()
    }

    pub fn delete_matching(&mut self, filter: &RuleFilter) -> u64 {
        let before = self.rows.len();
        self.rows.retain(|_, row| !filter.matches(row));
        (before - self.rows.len()) as u64
    }

    pub fn clear(&mut self) -> u64 {
        let removed = self.rows.len() as u64;
        self.rows.clear();
        removed
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

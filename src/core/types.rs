use super::{AdapterError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Number of positional value columns (`v0`..`v5`) in the rule table.
pub const MAX_FIELDS: usize = 6;

pub const COLUMN_NAMES: [&str; MAX_FIELDS] = ["v0", "v1", "v2", "v3", "v4", "v5"];

/// One persisted rule row.
///
/// Unused columns hold the empty string, never NULL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CasbinRule {
    pub ptype: String,
    pub v0: String,
    pub v1: String,
    pub v2: String,
    pub v3: String,
    pub v4: String,
    pub v5: String,
}

impl CasbinRule {
    /// Build a row from a rule. Fields beyond `MAX_FIELDS` are dropped.
    pub fn from_rule<S: AsRef<str>>(ptype: &str, rule: &[S]) -> Self {
        if rule.len() > MAX_FIELDS {
            debug!(
                ptype,
                fields = rule.len(),
                "truncating rule to {} fields",
                MAX_FIELDS
            );
        }

        let mut row = CasbinRule {
            ptype: ptype.to_string(),
            ..Default::default()
        };
        for (idx, value) in rule.iter().take(MAX_FIELDS).enumerate() {
            *row.field_mut(idx) = value.as_ref().to_string();
        }
        row
    }

    /// Same as `from_rule`, but rejects a rule with a gap in its first six fields.
    pub fn from_stored_rule<S: AsRef<str>>(ptype: &str, rule: &[S]) -> Result<Self> {
        let row = Self::from_rule(ptype, rule);
        row.check_left_packed()?;
        Ok(row)
    }

    pub fn fields(&self) -> [&str; MAX_FIELDS] {
        [
            self.v0.as_str(),
            self.v1.as_str(),
            self.v2.as_str(),
            self.v3.as_str(),
            self.v4.as_str(),
            self.v5.as_str(),
        ]
    }

    pub fn field(&self, idx: usize) -> Option<&str> {
        self.fields().get(idx).copied()
    }

    fn field_mut(&mut self, idx: usize) -> &mut String {
        match idx {
            0 => &mut self.v0,
            1 => &mut self.v1,
            2 => &mut self.v2,
            3 => &mut self.v3,
            4 => &mut self.v4,
            _ => &mut self.v5,
        }
    }

    /// Non-empty fields in column order.
    pub fn values(&self) -> Vec<String> {
        self.fields()
            .iter()
            .filter(|v| !v.is_empty())
            .map(|v| v.to_string())
            .collect()
    }

    pub fn check_left_packed(&self) -> Result<()> {
        let fields = self.fields();
        if let Some(first_empty) = fields.iter().position(|v| v.is_empty()) {
            if let Some(offset) = fields[first_empty..].iter().position(|v| !v.is_empty()) {
                return Err(AdapterError::NonContiguousRule {
                    ptype: self.ptype.clone(),
                    position: first_empty + offset,
                });
            }
        }
        Ok(())
    }

    /// Section a row belongs to: the first character of its ptype.
    pub fn section(&self) -> Option<String> {
        self.ptype.chars().next().map(|c| c.to_string())
    }
}

/// Delete predicate: `ptype` always matches exactly, each set column matches exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleFilter {
    pub ptype: String,
    pub values: [Option<String>; MAX_FIELDS],
}

impl RuleFilter {
    /// Filter matching the non-empty fields of `row`.
    pub fn from_row(row: &CasbinRule) -> Self {
        let mut filter = RuleFilter {
            ptype: row.ptype.clone(),
            ..Default::default()
        };
        for (idx, value) in row.fields().iter().enumerate() {
            if !value.is_empty() {
                filter.values[idx] = Some(value.to_string());
            }
        }
        filter
    }

    /// Filter for values starting at column `field_index`.
    ///
    /// Column `k` is constrained only when
    /// `field_index <= k && k < field_index + field_values.len()`; values that
    /// land past `v5` are ignored. Empty values constrain nothing.
    pub fn with_offset<S: AsRef<str>>(ptype: &str, field_index: usize, field_values: &[S]) -> Self {
        let mut row = CasbinRule {
            ptype: ptype.to_string(),
            ..Default::default()
        };
        for k in 0..MAX_FIELDS {
            if field_index <= k && k < field_index + field_values.len() {
                *row.field_mut(k) = field_values[k - field_index].as_ref().to_string();
            }
        }
        Self::from_row(&row)
    }

    pub fn matches(&self, row: &CasbinRule) -> bool {
        if row.ptype != self.ptype {
            return false;
        }
        self.values
            .iter()
            .zip(row.fields())
            .all(|(want, have)| want.as_deref().is_none_or(|want| want == have))
    }

    /// `(column, value)` pairs that constrain the delete, in column order.
    pub fn conditions(&self) -> impl Iterator<Item = (&'static str, &str)> {
        COLUMN_NAMES
            .iter()
            .zip(self.values.iter())
            .filter_map(|(column, value)| value.as_deref().map(|v| (*column, v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(ptype: &str, fields: &[&str]) -> CasbinRule {
        CasbinRule::from_rule(ptype, fields)
    }

    #[test]
    fn from_rule_fills_trailing_columns_with_empty_strings() {
        let r = row("p", &["alice", "data1", "read"]);
        assert_eq!(r.v2, "read");
        assert_eq!(r.v3, "");
        assert_eq!(r.v5, "");
    }

    #[test]
    fn from_rule_truncates_past_six_fields() {
        let r = row("p", &["a", "b", "c", "d", "e", "f", "g"]);
        assert_eq!(r.values(), vec!["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn stored_rule_rejects_gaps() {
        let err = CasbinRule::from_stored_rule("p", &["alice", "", "read"]).unwrap_err();
        assert!(matches!(err, AdapterError::NonContiguousRule { position: 2, .. }));
        assert!(CasbinRule::from_stored_rule("p", &["alice", "data1", ""]).is_ok());
    }

    #[test]
    fn offset_filter_uses_relative_positions() {
        let filter = RuleFilter::with_offset("p", 1, &["alice", "read"]);
        assert_eq!(filter.values[0], None);
        assert_eq!(filter.values[1].as_deref(), Some("alice"));
        assert_eq!(filter.values[2].as_deref(), Some("read"));
        assert_eq!(filter.values[3], None);
    }

    #[test]
    fn offset_filter_ignores_values_past_last_column() {
        let filter = RuleFilter::with_offset("p", 4, &["x", "y", "z"]);
        let conditions: Vec<_> = filter.conditions().collect();
        assert_eq!(conditions, vec![("v4", "x"), ("v5", "y")]);
    }

    #[test]
    fn offset_filter_past_all_columns_matches_only_ptype() {
        let filter = RuleFilter::with_offset("p", 9, &["x"]);
        assert_eq!(filter.conditions().count(), 0);
        assert!(filter.matches(&row("p", &["anything"])));
        assert!(!filter.matches(&row("g", &["anything"])));
    }

    #[test]
    fn empty_values_impose_no_constraint() {
        let filter = RuleFilter::from_row(&row("p", &["alice"]));
        assert!(filter.matches(&row("p", &["alice", "data1", "read"])));
        assert!(filter.matches(&row("p", &["alice", "data2", "write"])));
        assert!(!filter.matches(&row("p", &["bob", "data1", "read"])));
    }
}

#![allow(dead_code)]

use async_trait::async_trait;
use casbin::{DefaultModel, Model};
use casbin_table_adapter::core::BoxError;
use casbin_table_adapter::{AdapterError, CasbinRule, MemoryRuleStore, Result, RuleFilter, RuleStore};
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tempfile::NamedTempFile;

pub const TABLE: &str = "casbin_rule";

pub const RBAC_MODEL: &str = r#"
[request_definition]
r = sub, obj, act

[policy_definition]
p = sub, obj, act

[role_definition]
g = _, _

[policy_effect]
e = some(where (p.eft == allow))

[matchers]
m = g(r.sub, p.sub) && r.obj == p.obj && r.act == p.act
"#;

pub const WIDE_MODEL: &str = r#"
[request_definition]
r = sub, obj, act

[policy_definition]
p = sub, obj, act
p2 = sub, dom, obj, act, eft, tag

[role_definition]
g = _, _
g2 = _, _, _

[policy_effect]
e = some(where (p.eft == allow))

[matchers]
m = g(r.sub, p.sub) && r.obj == p.obj && r.act == p.act
"#;

pub async fn wide_model() -> DefaultModel {
    DefaultModel::from_str(WIDE_MODEL).await.unwrap()
}

pub async fn rbac_model() -> DefaultModel {
    DefaultModel::from_str(RBAC_MODEL).await.unwrap()
}

pub fn model_file() -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".conf").tempfile().unwrap();
    file.write_all(RBAC_MODEL.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

pub fn rule(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|f| f.to_string()).collect()
}

pub fn sorted(mut rules: Vec<Vec<String>>) -> Vec<Vec<String>> {
    rules.sort();
    rules
}

pub fn policy_of(model: &DefaultModel, ptype: &str) -> Vec<Vec<String>> {
    let sec = &ptype[..1];
    sorted(model.get_policy(sec, ptype))
}

#[derive(Debug)]
struct InjectedFault(&'static str);

impl std::fmt::Display for InjectedFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "injected {} fault", self.0)
    }
}

impl std::error::Error for InjectedFault {}

fn fault(kind: &'static str) -> AdapterError {
    let source: BoxError = Box::new(InjectedFault(kind));
    AdapterError::StorageError(source)
}

/// Memory store that can be told to fail its N-th insert or its next drop.
#[derive(Clone, Default)]
pub struct FaultyStore {
    pub inner: MemoryRuleStore,
    fail_insert_at: Arc<AtomicUsize>,
    inserts: Arc<AtomicUsize>,
    fail_drop: Arc<AtomicBool>,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `n`-th insert (1-based) counted from now. `0` disarms.
    pub fn fail_insert_at(&self, n: usize) {
        self.inserts.store(0, Ordering::SeqCst);
        self.fail_insert_at.store(n, Ordering::SeqCst);
    }

    pub fn fail_next_drop(&self, fail: bool) {
        self.fail_drop.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl RuleStore for FaultyStore {
    async fn create_table(&self, table: &str) -> Result<()> {
        self.inner.create_table(table).await
    }

    async fn drop_table(&self, table: &str) -> Result<()> {
        if self.fail_drop.swap(false, Ordering::SeqCst) {
            return Err(fault("drop"));
        }
        self.inner.drop_table(table).await
    }

    async fn select_all(&self, table: &str) -> Result<Vec<CasbinRule>> {
        self.inner.select_all(table).await
    }

    async fn insert(&self, table: &str, rule: &CasbinRule) -> Result<()> {
        let n = self.inserts.fetch_add(1, Ordering::SeqCst) + 1;
        if n == self.fail_insert_at.load(Ordering::SeqCst) {
            return Err(fault("insert"));
        }
        self.inner.insert(table, rule).await
    }

    async fn delete_matching(&self, table: &str, filter: &RuleFilter) -> Result<u64> {
        self.inner.delete_matching(table, filter).await
    }

    async fn delete_all(&self, table: &str) -> Result<u64> {
        self.inner.delete_all(table).await
    }
}

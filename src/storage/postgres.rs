use super::RuleStore;
use crate::core::{CasbinRule, Result, RuleFilter};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;

/// Rule store on a PostgreSQL pool.
///
/// The pool is a shared handle owned by the host; dropping the store does not
/// close it. Table names are spliced into statements unquoted, so they must
/// already be validated (see `AdapterConfig::validate`).
#[derive(Clone)]
pub struct PgRuleStore {
    pool: PgPool,
}

impl PgRuleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RuleStore for PgRuleStore {
    async fn create_table(&self, table: &str) -> Result<()> {
        let sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                ptype VARCHAR(12) NOT NULL DEFAULT '',
                v0 TEXT NOT NULL DEFAULT '',
                v1 TEXT NOT NULL DEFAULT '',
                v2 TEXT NOT NULL DEFAULT '',
                v3 TEXT NOT NULL DEFAULT '',
                v4 TEXT NOT NULL DEFAULT '',
                v5 TEXT NOT NULL DEFAULT ''
            )
            "#
        );
        sqlx::query(&sql).execute(&self.pool).await?;
        Ok(())
    }

    async fn drop_table(&self, table: &str) -> Result<()> {
        sqlx::query(&format!("DROP TABLE {table}"))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn select_all(&self, table: &str) -> Result<Vec<CasbinRule>> {
        let rows = sqlx::query_as::<_, CasbinRule>(&format!(
            "SELECT ptype, v0, v1, v2, v3, v4, v5 FROM {table}"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert(&self, table: &str, rule: &CasbinRule) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO {table} (ptype, v0, v1, v2, v3, v4, v5) VALUES ($1, $2, $3, $4, $5, $6, $7)"
        ))
        .bind(&rule.ptype)
        .bind(&rule.v0)
        .bind(&rule.v1)
        .bind(&rule.v2)
        .bind(&rule.v3)
        .bind(&rule.v4)
        .bind(&rule.v5)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_matching(&self, table: &str, filter: &RuleFilter) -> Result<u64> {
        let mut builder = QueryBuilder::<Postgres>::new(format!("DELETE FROM {table}"));
        push_filter(&mut builder, filter);
        debug!(sql = builder.sql(), "deleting matching rules");

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn delete_all(&self, table: &str) -> Result<u64> {
        let result = sqlx::query(&format!("DELETE FROM {table}"))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

fn push_filter<'a>(builder: &mut QueryBuilder<'a, Postgres>, filter: &'a RuleFilter) {
    builder.push(" WHERE ptype = ").push_bind(filter.ptype.as_str());
    for (column, value) in filter.conditions() {
        builder.push(" AND ").push(column).push(" = ").push_bind(value);
    }
}

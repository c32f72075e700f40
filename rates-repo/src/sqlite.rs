//! SQLite repository adapter.
#![allow(clippy::collapsible_if)]

use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use rates_types::{
    CurrencyPair, Rate, RateFilter, RateId, RateQuery, RateRepository, RepoError, SortOrder,
};

use crate::types::{SqliteRateRow, format_date};

const SELECT_RATE: &str = "SELECT id, base_currency, quote_currency, value, effective_date, \
     source, created_at, updated_at FROM exchange_rates";

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

pub struct SqliteRepo {
    pool: SqlitePool,
}

fn db_err(e: sqlx::Error) -> RepoError {
    RepoError::Database(e.to_string())
}

fn is_memory_url(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &RateFilter) {
    qb.push(" WHERE 1 = 1");
    if let Some(base) = filter.base {
        qb.push(" AND base_currency = ").push_bind(base.code());
    }
    if let Some(quote) = filter.quote {
        qb.push(" AND quote_currency = ").push_bind(quote.code());
    }
    if let Some(source) = filter.source {
        qb.push(" AND source = ").push_bind(source.as_str());
    }
    if let Some(before) = filter.effective_before {
        qb.push(" AND effective_date < ").push_bind(format_date(before));
    }
    if let Some(after) = filter.effective_after {
        qb.push(" AND effective_date > ").push_bind(format_date(after));
    }
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            let path = path.split('?').next().unwrap_or(path);
            if !is_memory_url(database_url) {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Every connection to `:memory:` opens its own empty database.
        let max_connections = if is_memory_url(database_url) { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let repo = Self { pool };
        repo.create_schema().await?;
        Ok(repo)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the database schema (idempotent).
    pub async fn create_schema(&self) -> Result<(), RepoError> {
        let ddl = include_str!("../migrations/0001_create_exchange_rates.sql");
        for statement in ddl.split(';') {
            let stmt = statement.trim();
            if !stmt.is_empty() {
                sqlx::query(stmt)
                    .execute(&self.pool)
                    .await
                    .map_err(db_err)?;
            }
        }
        Ok(())
    }

    async fn fetch_pair_row(
        &self,
        sql: &str,
        pair: CurrencyPair,
        date: Option<NaiveDate>,
    ) -> Result<Rate, RepoError> {
        let mut query = sqlx::query_as::<_, SqliteRateRow>(sql)
            .bind(pair.base().code())
            .bind(pair.quote().code());
        if let Some(date) = date {
            query = query.bind(format_date(date));
        }

        query
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or(RepoError::NotFound)?
            .into_domain()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl RateRepository for SqliteRepo {
    async fn create(&self, rate: &Rate) -> Result<Rate, RepoError> {
        let stored = sqlx::query_as::<_, SqliteRateRow>(
            r#"INSERT INTO exchange_rates
                   (id, base_currency, quote_currency, value, effective_date, source, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT (base_currency, quote_currency, effective_date, source)
               DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
               RETURNING id, base_currency, quote_currency, value, effective_date,
                         source, created_at, updated_at"#,
        )
        .bind(rate.id().to_string())
        .bind(rate.pair().base().code())
        .bind(rate.pair().quote().code())
        .bind(rate.value())
        .bind(format_date(rate.effective_date()))
        .bind(rate.source().as_str())
        .bind(rate.created_at().to_rfc3339())
        .bind(rate.updated_at().to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?
        .into_domain()?;

        tracing::debug!(pair = %rate.pair(), date = %rate.effective_date(), id = %stored.id(), "rate upserted");
        Ok(stored)
    }

    async fn delete(&self, filter: &RateFilter) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::<Sqlite>::new("DELETE FROM exchange_rates");
        push_filter(&mut qb, filter);
        let result = qb.build().execute(&self.pool).await.map_err(db_err)?;
        Ok(result.rows_affected())
    }

    async fn find_by_id(&self, id: RateId) -> Result<Rate, RepoError> {
        let sql = format!("{SELECT_RATE} WHERE id = ?");
        sqlx::query_as::<_, SqliteRateRow>(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or(RepoError::NotFound)?
            .into_domain()
    }

    async fn find_by_pair_and_date(
        &self,
        pair: CurrencyPair,
        date: NaiveDate,
    ) -> Result<Rate, RepoError> {
        let sql = format!(
            "{SELECT_RATE} WHERE base_currency = ? AND quote_currency = ? AND effective_date = ? \
             ORDER BY updated_at DESC LIMIT 1"
        );
        self.fetch_pair_row(&sql, pair, Some(date)).await
    }

    async fn find_latest(&self, pair: CurrencyPair) -> Result<Rate, RepoError> {
        let sql = format!(
            "{SELECT_RATE} WHERE base_currency = ? AND quote_currency = ? \
             ORDER BY effective_date DESC, updated_at DESC LIMIT 1"
        );
        self.fetch_pair_row(&sql, pair, None).await
    }

    async fn exists_by_pair_and_date(
        &self,
        pair: CurrencyPair,
        date: NaiveDate,
    ) -> Result<bool, RepoError> {
        let found: i64 = sqlx::query_scalar(
            r#"SELECT EXISTS(
                   SELECT 1 FROM exchange_rates
                   WHERE base_currency = ? AND quote_currency = ? AND effective_date = ?
               )"#,
        )
        .bind(pair.base().code())
        .bind(pair.quote().code())
        .bind(format_date(date))
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(found != 0)
    }

    async fn find_by_date_range(
        &self,
        pair: CurrencyPair,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Rate>, RepoError> {
        let sql = format!(
            "{SELECT_RATE} WHERE base_currency = ? AND quote_currency = ? \
             AND effective_date BETWEEN ? AND ? ORDER BY effective_date ASC"
        );
        let rows = sqlx::query_as::<_, SqliteRateRow>(&sql)
            .bind(pair.base().code())
            .bind(pair.quote().code())
            .bind(format_date(start))
            .bind(format_date(end))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.into_iter().map(SqliteRateRow::into_domain).collect()
    }

    async fn find_by_pairs(&self, pairs: &[CurrencyPair]) -> Result<Vec<Rate>, RepoError> {
        let mut rates = Vec::with_capacity(pairs.len());
        for pair in pairs {
            match self.find_latest(*pair).await {
                Ok(rate) => rates.push(rate),
                Err(RepoError::NotFound) => {
                    tracing::debug!(%pair, "no stored rate for pair, skipping");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(rates)
    }

    async fn find_all(&self, query: &RateQuery) -> Result<Vec<Rate>, RepoError> {
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT_RATE);
        push_filter(&mut qb, &query.filter);
        qb.push(match query.order {
            SortOrder::Ascending => " ORDER BY effective_date ASC, created_at ASC",
            SortOrder::Descending => " ORDER BY effective_date DESC, created_at DESC",
        });
        if let Some(page) = query.page {
            qb.push(" LIMIT ")
                .push_bind(page.limit)
                .push(" OFFSET ")
                .push_bind(page.offset);
        }

        let rows: Vec<SqliteRateRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.into_iter().map(SqliteRateRow::into_domain).collect()
    }

    async fn count(&self, filter: &RateFilter) -> Result<i64, RepoError> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM exchange_rates");
        push_filter(&mut qb, filter);
        qb.build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)
    }
}

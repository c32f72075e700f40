//! PostgreSQL repository adapter.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, QueryBuilder};

use rates_types::{
    CurrencyPair, Rate, RateFilter, RateId, RateQuery, RateRepository, RepoError, SortOrder,
};

use crate::types::PgRateRow;

/// NUMERIC is read back as DOUBLE PRECISION so it decodes into `f64`.
const SELECT_RATE: &str = "SELECT id, base_currency, quote_currency, \
     value::DOUBLE PRECISION AS value, effective_date, source, created_at, updated_at \
     FROM exchange_rates";

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL Repository
// ─────────────────────────────────────────────────────────────────────────────

pub struct PostgresRepo {
    pool: PgPool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    Ok(())
}

async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    execute_migration(
        pool,
        include_str!("../migrations/0001_create_exchange_rates_pg.sql"),
        "0001",
    )
    .await
}

fn db_err(e: sqlx::Error) -> RepoError {
    RepoError::Database(e.to_string())
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &RateFilter) {
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
        qb.push(" AND effective_date < ").push_bind(before);
    }
    if let Some(after) = filter.effective_after {
        qb.push(" AND effective_date > ").push_bind(after);
    }
}

impl PostgresRepo {
    /// Creates a new PostgreSQL repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_pair_row(
        &self,
        sql: &str,
        pair: CurrencyPair,
        date: Option<NaiveDate>,
    ) -> Result<Rate, RepoError> {
        let mut query = sqlx::query_as::<_, PgRateRow>(sql)
            .bind(pair.base().code())
            .bind(pair.quote().code());
        if let Some(date) = date {
            query = query.bind(date);
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
impl RateRepository for PostgresRepo {
    async fn create(&self, rate: &Rate) -> Result<Rate, RepoError> {
        let stored = sqlx::query_as::<_, PgRateRow>(
            r#"INSERT INTO exchange_rates
                   (id, base_currency, quote_currency, value, effective_date, source, created_at, updated_at)
               VALUES ($1, $2, $3, $4::NUMERIC, $5, $6, $7, $8)
               ON CONFLICT (base_currency, quote_currency, effective_date, source)
               DO UPDATE SET value = EXCLUDED.value, updated_at = EXCLUDED.updated_at
               RETURNING id, base_currency, quote_currency, value::DOUBLE PRECISION AS value,
                         effective_date, source, created_at, updated_at"#,
        )
        .bind(rate.id().into_uuid())
        .bind(rate.pair().base().code())
        .bind(rate.pair().quote().code())
        .bind(rate.value())
        .bind(rate.effective_date())
        .bind(rate.source().as_str())
        .bind(rate.created_at())
        .bind(rate.updated_at())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?
        .into_domain()?;

        tracing::debug!(pair = %rate.pair(), date = %rate.effective_date(), id = %stored.id(), "rate upserted");
        Ok(stored)
    }

    async fn delete(&self, filter: &RateFilter) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM exchange_rates");
        push_filter(&mut qb, filter);
        let result = qb.build().execute(&self.pool).await.map_err(db_err)?;
        Ok(result.rows_affected())
    }

    async fn find_by_id(&self, id: RateId) -> Result<Rate, RepoError> {
        let sql = format!("{SELECT_RATE} WHERE id = $1");
        sqlx::query_as::<_, PgRateRow>(&sql)
            .bind(id.into_uuid())
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
            "{SELECT_RATE} WHERE base_currency = $1 AND quote_currency = $2 AND effective_date = $3 \
             ORDER BY updated_at DESC LIMIT 1"
        );
        self.fetch_pair_row(&sql, pair, Some(date)).await
    }

    async fn find_latest(&self, pair: CurrencyPair) -> Result<Rate, RepoError> {
        let sql = format!(
            "{SELECT_RATE} WHERE base_currency = $1 AND quote_currency = $2 \
             ORDER BY effective_date DESC, updated_at DESC LIMIT 1"
        );
        self.fetch_pair_row(&sql, pair, None).await
    }

    async fn exists_by_pair_and_date(
        &self,
        pair: CurrencyPair,
        date: NaiveDate,
    ) -> Result<bool, RepoError> {
        sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS(
                   SELECT 1 FROM exchange_rates
                   WHERE base_currency = $1 AND quote_currency = $2 AND effective_date = $3
               )"#,
        )
        .bind(pair.base().code())
        .bind(pair.quote().code())
        .bind(date)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)
    }

    async fn find_by_date_range(
        &self,
        pair: CurrencyPair,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Rate>, RepoError> {
        let sql = format!(
            "{SELECT_RATE} WHERE base_currency = $1 AND quote_currency = $2 \
             AND effective_date BETWEEN $3 AND $4 ORDER BY effective_date ASC"
        );
        let rows = sqlx::query_as::<_, PgRateRow>(&sql)
            .bind(pair.base().code())
            .bind(pair.quote().code())
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.into_iter().map(PgRateRow::into_domain).collect()
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
        let mut qb = QueryBuilder::<Postgres>::new(SELECT_RATE);
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

        let rows: Vec<PgRateRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.into_iter().map(PgRateRow::into_domain).collect()
    }

    async fn count(&self, filter: &RateFilter) -> Result<i64, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM exchange_rates");
        push_filter(&mut qb, filter);
        qb.build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)
    }
}

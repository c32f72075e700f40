//! Fetch command: provider → validated rate → idempotent store → cache invalidation.

use chrono::NaiveDate;

use rates_types::{
    CurrencyPair, FetchError, Rate, RateCache, RateProvider, RateRepository, Source,
    latest_cache_key,
};

/// One rate to fetch and store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRateCommand {
    pub pair: CurrencyPair,
    pub date: NaiveDate,
    /// Skip the existence check and overwrite through the upsert.
    pub force: bool,
}

impl FetchRateCommand {
    pub fn new(pair: CurrencyPair, date: NaiveDate) -> Self {
        Self {
            pair,
            date,
            force: false,
        }
    }

    pub fn forced(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// A rate for the pair and date already existed; nothing was fetched.
    Skipped,
    /// The row as persisted. A forced refetch keeps the existing id.
    Stored(Rate),
}

/// Runs fetch commands against one provider.
pub struct FetchRateService<R: RateRepository, P: RateProvider, C: RateCache> {
    repo: R,
    provider: P,
    cache: C,
}

impl<R: RateRepository, P: RateProvider, C: RateCache> FetchRateService<R, P, C> {
    pub fn new(repo: R, provider: P, cache: C) -> Self {
        Self {
            repo,
            provider,
            cache,
        }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    #[tracing::instrument(
        skip(self),
        fields(pair = %cmd.pair, date = %cmd.date, provider = self.provider.name())
    )]
    pub async fn execute(&self, cmd: FetchRateCommand) -> Result<FetchOutcome, FetchError> {
        let FetchRateCommand { pair, date, force } = cmd;

        if !force {
            let exists = self
                .repo
                .exists_by_pair_and_date(pair, date)
                .await
                .map_err(|source| FetchError::ExistenceCheck { pair, date, source })?;
            if exists {
                tracing::debug!("rate already stored, skipping");
                return Ok(FetchOutcome::Skipped);
            }
        }

        let value = self
            .provider
            .fetch_rate(pair, date)
            .await
            .map_err(|source| {
                tracing::error!(error = %source, "provider fetch failed");
                FetchError::Provider { pair, date, source }
            })?;

        let rate = self
            .provider
            .name()
            .parse::<Source>()
            .and_then(|source| Rate::new(pair, value, date, source))
            .map_err(|source| FetchError::Entity { pair, date, source })?;

        let stored = self.repo.create(&rate).await.map_err(|source| {
            tracing::error!(error = %source, "failed to store rate");
            FetchError::Save { pair, date, source }
        })?;

        let key = latest_cache_key(pair);
        if let Err(e) = self.cache.delete(&key).await {
            tracing::warn!(key = %key, error = %e, "failed to invalidate cached latest rate");
        }

        tracing::info!(value, "rate stored");
        Ok(FetchOutcome::Stored(stored))
    }
}

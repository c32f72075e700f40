//! Worker commands that talk to the database directly.

use anyhow::{Result, bail};
use chrono::{Duration, NaiveDate};

use rates_hex::{FetchOutcome, FetchRateCommand, FetchRateService};
use rates_types::{CurrencyCode, CurrencyPair, RateCache, RateFilter, RateProvider, RateRepository};

/// Dates to fetch: an inclusive range, a single date, or `today`.
pub fn plan_dates(
    date: Option<NaiveDate>,
    range: Option<(NaiveDate, NaiveDate)>,
    today: NaiveDate,
) -> Result<Vec<NaiveDate>> {
    match (range, date) {
        (Some((start, end)), _) => {
            if end < start {
                bail!("end date {end} is before start date {start}");
            }
            let days = (end - start).num_days();
            Ok((0..=days).map(|n| start + Duration::days(n)).collect())
        }
        (None, Some(date)) => Ok(vec![date]),
        (None, None) => Ok(vec![today]),
    }
}

/// Every ordered pair of distinct currencies. Unknown codes are skipped.
pub fn matrix_pairs(currencies: &[String]) -> Result<Vec<CurrencyPair>> {
    let mut codes: Vec<CurrencyCode> = Vec::new();
    for raw in currencies.iter().filter(|c| !c.trim().is_empty()) {
        match raw.parse::<CurrencyCode>() {
            Ok(code) if !codes.contains(&code) => codes.push(code),
            Ok(_) => {}
            Err(e) => tracing::warn!(currency = %raw, error = %e, "skipping invalid currency"),
        }
    }
    if codes.len() < 2 {
        bail!("need at least 2 valid currencies, got {}", codes.len());
    }

    let mut pairs = Vec::with_capacity(codes.len() * (codes.len() - 1));
    for &base in &codes {
        for &quote in &codes {
            if base != quote {
                pairs.push(CurrencyPair::new(base, quote)?);
            }
        }
    }
    Ok(pairs)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FetchSummary {
    pub stored: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl FetchSummary {
    pub fn total(&self) -> usize {
        self.stored + self.skipped + self.failed
    }
}

/// Runs the fetch command for every pair and date. Failures are logged and
/// counted; the run continues.
pub async fn fetch_all<R, P, C>(
    service: &FetchRateService<R, P, C>,
    pairs: &[CurrencyPair],
    dates: &[NaiveDate],
    force: bool,
) -> FetchSummary
where
    R: RateRepository,
    P: RateProvider,
    C: RateCache,
{
    let mut summary = FetchSummary::default();
    for &pair in pairs {
        for &date in dates {
            let cmd = FetchRateCommand::new(pair, date).forced(force);
            match service.execute(cmd).await {
                Ok(FetchOutcome::Stored(_)) => summary.stored += 1,
                Ok(FetchOutcome::Skipped) => summary.skipped += 1,
                Err(e) => {
                    tracing::error!(%pair, %date, error = %e, "fetch failed");
                    summary.failed += 1;
                }
            }
        }
    }
    tracing::info!(
        total = summary.total(),
        stored = summary.stored,
        skipped = summary.skipped,
        errors = summary.failed,
        "fetch completed"
    );
    summary
}

/// Filter for `clean`. At least one criterion is required.
pub fn clean_filter(
    pair: Option<CurrencyPair>,
    before: Option<NaiveDate>,
    after: Option<NaiveDate>,
) -> Result<RateFilter> {
    let filter = RateFilter {
        base: pair.map(|p| p.base()),
        quote: pair.map(|p| p.quote()),
        effective_before: before,
        effective_after: after,
        ..RateFilter::default()
    };
    if filter.is_empty() {
        bail!("clean needs at least one of --pair, --before or --after");
    }
    Ok(filter)
}

/// Counts matching rows, then deletes them once `confirm` agrees.
///
/// Returns the number of rows deleted.
pub async fn clean<R: RateRepository>(
    repo: &R,
    filter: &RateFilter,
    dry_run: bool,
    confirm: impl FnOnce(i64) -> Result<bool>,
) -> Result<u64> {
    let count = repo.count(filter).await?;
    tracing::info!(count, "found rows to delete");

    if count == 0 {
        return Ok(0);
    }
    if dry_run {
        tracing::warn!(count, "dry run, nothing deleted");
        return Ok(0);
    }
    if !confirm(count)? {
        bail!("deletion cancelled");
    }

    let deleted = repo.delete(filter).await?;
    tracing::info!(deleted, "rows deleted");
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_plan_dates() {
        let today = date(2024, 6, 1);
        assert_eq!(plan_dates(None, None, today).unwrap(), vec![today]);
        assert_eq!(
            plan_dates(Some(date(2024, 1, 15)), None, today).unwrap(),
            vec![date(2024, 1, 15)]
        );

        let range = plan_dates(None, Some((date(2024, 1, 30), date(2024, 2, 2))), today).unwrap();
        assert_eq!(
            range,
            vec![date(2024, 1, 30), date(2024, 1, 31), date(2024, 2, 1), date(2024, 2, 2)]
        );

        assert!(plan_dates(None, Some((date(2024, 2, 2), date(2024, 2, 1))), today).is_err());
    }

    #[test]
    fn test_matrix_pairs_skips_invalid_codes() {
        let input: Vec<String> = ["cny", "XXX", "JPY", "usd", "JPY"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let pairs = matrix_pairs(&input).unwrap();
        assert_eq!(pairs.len(), 6);
        assert!(pairs.contains(&"CNY/JPY".parse().unwrap()));
        assert!(pairs.contains(&"JPY/CNY".parse().unwrap()));
        assert!(pairs.iter().all(|p| p.base() != p.quote()));
    }

    #[test]
    fn test_matrix_pairs_needs_two_currencies() {
        let input = vec!["CNY".to_string(), "BAD".to_string()];
        assert!(matrix_pairs(&input).is_err());
    }

    #[test]
    fn test_clean_filter() {
        assert!(clean_filter(None, None, None).is_err());

        let pair: CurrencyPair = "JPY/USD".parse().unwrap();
        let filter = clean_filter(Some(pair), Some(date(2024, 1, 1)), None).unwrap();
        assert_eq!(filter.base, Some(CurrencyCode::JPY));
        assert_eq!(filter.quote, Some(CurrencyCode::USD));
        assert_eq!(filter.effective_before, Some(date(2024, 1, 1)));
        assert_eq!(filter.effective_after, None);
    }
}

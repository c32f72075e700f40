//! SQLite repository integration tests.

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, Utc};
    use rates_types::{
        CurrencyPair, PageRequest, Rate, RateFilter, RateQuery, RateRepository, RepoError,
        SortOrder, Source,
    };

    use crate::SqliteRepo;

    async fn setup_repo() -> SqliteRepo {
        SqliteRepo::new("sqlite::memory:").await.unwrap()
    }

    fn pair(s: &str) -> CurrencyPair {
        s.parse().unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rate(p: &str, value: f64, on: NaiveDate) -> Rate {
        Rate::new(pair(p), value, on, Source::UnionPay).unwrap()
    }

    async fn seed_days(repo: &SqliteRepo, p: &str, start: NaiveDate, days: i64) {
        for offset in 0..days {
            let on = start + Duration::days(offset);
            repo.create(&rate(p, 20.0 + offset as f64, on)).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_create_and_find_by_id() {
        let repo = setup_repo().await;
        let stored = rate("CNY/JPY", 20.5, date(2024, 1, 15));

        repo.create(&stored).await.unwrap();
        let fetched = repo.find_by_id(stored.id()).await.unwrap();

        assert_eq!(fetched.id(), stored.id());
        assert_eq!(fetched.pair(), pair("CNY/JPY"));
        assert_eq!(fetched.value(), 20.5);
        assert_eq!(fetched.effective_date(), date(2024, 1, 15));
        assert_eq!(fetched.source(), Source::UnionPay);
    }

    #[tokio::test]
    async fn test_upsert_keeps_single_row_with_latest_value() {
        let repo = setup_repo().await;
        let on = date(2024, 1, 15);

        let first = repo.create(&rate("CNY/JPY", 20.0, on)).await.unwrap();
        let second = repo.create(&rate("CNY/JPY", 21.0, on)).await.unwrap();

        let filter = RateFilter::for_pair(pair("CNY/JPY"));
        assert_eq!(repo.count(&filter).await.unwrap(), 1);
        let stored = repo.find_by_pair_and_date(pair("CNY/JPY"), on).await.unwrap();
        assert_eq!(stored.value(), 21.0);
        assert_eq!(second.value(), 21.0);
        assert_eq!(second.id(), first.id());
        assert_eq!(stored.id(), first.id());
    }

    #[tokio::test]
    async fn test_same_day_different_source_is_a_separate_row() {
        let repo = setup_repo().await;
        let on = date(2024, 1, 15);

        repo.create(&rate("CNY/JPY", 20.0, on)).await.unwrap();
        let manual = Rate::new(pair("CNY/JPY"), 20.2, on, Source::Manual).unwrap();
        repo.create(&manual).await.unwrap();

        assert_eq!(
            repo.count(&RateFilter::for_pair(pair("CNY/JPY"))).await.unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn test_find_latest_is_orientation_specific() {
        let repo = setup_repo().await;
        seed_days(&repo, "JPY/CNY", date(2024, 1, 1), 3).await;

        let latest = repo.find_latest(pair("JPY/CNY")).await.unwrap();
        assert_eq!(latest.effective_date(), date(2024, 1, 3));

        assert!(matches!(
            repo.find_latest(pair("CNY/JPY")).await,
            Err(RepoError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_find_by_pair_and_date_not_found() {
        let repo = setup_repo().await;
        assert!(matches!(
            repo.find_by_pair_and_date(pair("USD/JPY"), date(2024, 1, 1))
                .await,
            Err(RepoError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_exists_by_pair_and_date() {
        let repo = setup_repo().await;
        let on = date(2024, 2, 1);
        repo.create(&rate("USD/JPY", 150.0, on)).await.unwrap();

        assert!(repo.exists_by_pair_and_date(pair("USD/JPY"), on).await.unwrap());
        assert!(!repo
            .exists_by_pair_and_date(pair("JPY/USD"), on)
            .await
            .unwrap());
        assert!(!repo
            .exists_by_pair_and_date(pair("USD/JPY"), date(2024, 2, 2))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_date_range_is_inclusive_and_ascending() {
        let repo = setup_repo().await;
        seed_days(&repo, "EUR/USD", date(2024, 3, 1), 10).await;

        let rates = repo
            .find_by_date_range(pair("EUR/USD"), date(2024, 3, 3), date(2024, 3, 6))
            .await
            .unwrap();

        let dates: Vec<_> = rates.iter().map(Rate::effective_date).collect();
        assert_eq!(
            dates,
            vec![
                date(2024, 3, 3),
                date(2024, 3, 4),
                date(2024, 3, 5),
                date(2024, 3, 6)
            ]
        );
    }

    #[tokio::test]
    async fn test_find_all_orders_and_paginates() {
        let repo = setup_repo().await;
        seed_days(&repo, "GBP/USD", date(2024, 1, 1), 25).await;
        seed_days(&repo, "EUR/USD", date(2024, 1, 1), 5).await;

        let query = RateQuery {
            filter: RateFilter::for_pair(pair("GBP/USD")),
            order: SortOrder::Descending,
            page: Some(PageRequest {
                limit: 10,
                offset: 10,
            }),
        };
        let page = repo.find_all(&query).await.unwrap();

        assert_eq!(page.len(), 10);
        assert_eq!(page[0].effective_date(), date(2024, 1, 15));
        assert!(page.iter().all(|r| r.pair() == pair("GBP/USD")));

        let ascending = repo
            .find_all(&RateQuery {
                order: SortOrder::Ascending,
                ..RateQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(ascending.len(), 30);
        assert_eq!(ascending[0].effective_date(), date(2024, 1, 1));
    }

    #[tokio::test]
    async fn test_count_with_date_bounds() {
        let repo = setup_repo().await;
        seed_days(&repo, "USD/SGD", date(2024, 1, 1), 10).await;

        let filter = RateFilter {
            effective_after: Some(date(2024, 1, 3)),
            effective_before: Some(date(2024, 1, 8)),
            ..RateFilter::for_pair(pair("USD/SGD"))
        };
        // Both bounds are exclusive: Jan 4 through Jan 7.
        assert_eq!(repo.count(&filter).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_delete_matching_rows() {
        let repo = setup_repo().await;
        seed_days(&repo, "USD/KRW", date(2024, 1, 1), 5).await;
        seed_days(&repo, "USD/HKD", date(2024, 1, 1), 5).await;

        let filter = RateFilter {
            effective_before: Some(date(2024, 1, 3)),
            ..RateFilter::for_pair(pair("USD/KRW"))
        };
        assert_eq!(repo.delete(&filter).await.unwrap(), 2);
        assert_eq!(
            repo.count(&RateFilter::default()).await.unwrap(),
            8
        );
    }

    #[tokio::test]
    async fn test_find_by_pairs_skips_missing() {
        let repo = setup_repo().await;
        seed_days(&repo, "CNY/JPY", date(2024, 1, 1), 2).await;
        seed_days(&repo, "USD/JPY", date(2024, 1, 1), 4).await;

        let rates = repo
            .find_by_pairs(&[pair("CNY/JPY"), pair("EUR/GBP"), pair("USD/JPY")])
            .await
            .unwrap();

        assert_eq!(rates.len(), 2);
        assert_eq!(rates[0].effective_date(), date(2024, 1, 2));
        assert_eq!(rates[1].effective_date(), date(2024, 1, 4));
    }

    #[tokio::test]
    async fn test_timestamps_round_trip() {
        let repo = setup_repo().await;
        let stored = rate("CNY/USD", 0.14, Utc::now().date_naive());
        repo.create(&stored).await.unwrap();

        let fetched = repo.find_by_id(stored.id()).await.unwrap();
        assert_eq!(fetched.created_at(), stored.created_at());
    }
}

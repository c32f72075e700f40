//! RateFlow CLI
//!
//! Worker commands (`fetch`, `fetch-matrix`, `clean`) run against the database
//! directly. `latest`, `list` and `health` query a running API.

mod worker;

use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rates_client::RatesClient;
use rates_hex::FetchRateService;
use rates_provider::{ConfiguredProvider, ProviderKind};
use rates_repo::CacheBackend;
use rates_repo::cache::redis::{DEFAULT_CONNECTION_TIMEOUT_MS, DEFAULT_KEY_PREFIX};
use rates_types::{CurrencyPair, RateProvider};

#[derive(Parser)]
#[command(name = "rateflow")]
#[command(author, version, about = "RateFlow exchange-rate worker and API client", long_about = None)]
struct Cli {
    /// Database URL for worker commands
    #[arg(long, env = "DATABASE_URL", global = true, hide_env_values = true)]
    database_url: Option<String>,

    /// Redis URL; the latest-rate cache is skipped when absent
    #[arg(long, env = "REDIS_URL", global = true, hide_env_values = true)]
    redis_url: Option<String>,

    /// Base URL of the RateFlow API
    #[arg(
        long,
        env = "RATEFLOW_API_URL",
        default_value = "http://localhost:8080",
        global = true
    )]
    api_url: String,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Which dates to fetch. Defaults to today.
#[derive(Args)]
struct DateArgs {
    /// Single date (YYYY-MM-DD)
    #[arg(long, conflicts_with_all = ["start", "end"])]
    date: Option<NaiveDate>,

    /// Range start (YYYY-MM-DD), inclusive
    #[arg(long, requires = "end")]
    start: Option<NaiveDate>,

    /// Range end (YYYY-MM-DD), inclusive
    #[arg(long, requires = "start")]
    end: Option<NaiveDate>,
}

impl DateArgs {
    fn plan(&self) -> Result<Vec<NaiveDate>> {
        let range = self.start.zip(self.end);
        worker::plan_dates(self.date, range, Utc::now().date_naive())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch rates for one pair from a provider and store them
    Fetch {
        /// Currency pair (CNY/JPY, CNY-JPY or CNYJPY)
        #[arg(long, default_value = "CNY/JPY")]
        pair: CurrencyPair,
        #[command(flatten)]
        dates: DateArgs,
        /// Provider (unionpay, manual)
        #[arg(long, default_value = "unionpay")]
        provider: ProviderKind,
        /// Refetch and overwrite rates that are already stored
        #[arg(long)]
        force: bool,
    },
    /// Fetch rates for every ordered pair of the given currencies
    FetchMatrix {
        /// Comma-separated currency codes, e.g. CNY,JPY,USD
        #[arg(long, value_delimiter = ',', required = true)]
        currencies: Vec<String>,
        #[command(flatten)]
        dates: DateArgs,
        #[arg(long, default_value = "unionpay")]
        provider: ProviderKind,
        #[arg(long)]
        force: bool,
    },
    /// Delete stored rates matching the filters
    Clean {
        /// Only this exact orientation
        #[arg(long)]
        pair: Option<CurrencyPair>,
        /// Rates effective strictly before this date
        #[arg(long)]
        before: Option<NaiveDate>,
        /// Rates effective strictly after this date
        #[arg(long)]
        after: Option<NaiveDate>,
        /// Report what would be deleted without deleting
        #[arg(long)]
        dry_run: bool,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Show the latest rate from the API
    Latest {
        #[arg(long)]
        pair: CurrencyPair,
    },
    /// List rates from the API
    List {
        #[arg(long)]
        pair: CurrencyPair,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        page_size: u32,
        #[arg(long, requires = "end")]
        start: Option<NaiveDate>,
        #[arg(long, requires = "start")]
        end: Option<NaiveDate>,
    },
    /// Check API health
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Fetch {
            pair,
            ref dates,
            provider,
            force,
        } => {
            let dates = dates.plan()?;
            run_fetch(&cli, provider, &[pair], &dates, force).await?;
        }

        Commands::FetchMatrix {
            ref currencies,
            ref dates,
            provider,
            force,
        } => {
            let pairs = worker::matrix_pairs(currencies)?;
            let dates = dates.plan()?;
            tracing::info!(pairs = pairs.len(), dates = dates.len(), "starting fetch matrix");
            run_fetch(&cli, provider, &pairs, &dates, force).await?;
        }

        Commands::Clean {
            pair,
            before,
            after,
            dry_run,
            yes,
        } => {
            let filter = worker::clean_filter(pair, before, after)?;
            let repo = rates_repo::build_repo(database_url(&cli)?).await?;
            tracing::info!(backend = repo.backend(), ?filter, dry_run, "starting clean");

            let deleted = worker::clean(&repo, &filter, dry_run, |count| {
                if yes {
                    Ok(true)
                } else {
                    confirm_on_stdin(count)
                }
            })
            .await?;
            println!("Deleted {} rows", deleted);
        }

        Commands::Latest { pair } => {
            let client = RatesClient::new(&cli.api_url);
            let rate = client.latest(pair).await?;
            println!("{}", serde_json::to_string_pretty(&rate)?);
        }

        Commands::List {
            pair,
            page,
            page_size,
            start,
            end,
        } => {
            let client = RatesClient::new(&cli.api_url);
            let result = client.list(pair, page, page_size, start.zip(end)).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Commands::Health => {
            let client = RatesClient::new(&cli.api_url);
            match client.health().await {
                Ok(health) => println!("✓ API is {}", health.status),
                Err(e) => {
                    println!("✗ API is not healthy: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn database_url(cli: &Cli) -> Result<&str> {
    cli.database_url
        .as_deref()
        .filter(|url| !url.trim().is_empty())
        .context("DATABASE_URL (or --database-url) is required for worker commands")
}

async fn run_fetch(
    cli: &Cli,
    provider: ProviderKind,
    pairs: &[CurrencyPair],
    dates: &[NaiveDate],
    force: bool,
) -> Result<()> {
    let repo = rates_repo::build_repo(database_url(cli)?).await?;
    let cache = CacheBackend::from_url(
        cli.redis_url.as_deref(),
        DEFAULT_KEY_PREFIX,
        DEFAULT_CONNECTION_TIMEOUT_MS,
    )?;
    let provider = ConfiguredProvider::build(provider)?;
    tracing::info!(
        backend = repo.backend(),
        cache = cache.kind(),
        provider = provider.name(),
        "worker ready"
    );

    let service = FetchRateService::new(repo, provider, cache);
    let summary = worker::fetch_all(&service, pairs, dates, force).await;
    println!(
        "Fetched {} rate(s): {} stored, {} skipped, {} failed",
        summary.total(),
        summary.stored,
        summary.skipped,
        summary.failed
    );

    if summary.failed > 0 {
        bail!("completed with {} errors", summary.failed);
    }
    Ok(())
}

fn confirm_on_stdin(count: i64) -> Result<bool> {
    print!(
        "\n⚠️  About to delete {} rows from the database.\nType 'yes' to confirm deletion: ",
        count
    );
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin()
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    Ok(answer.trim() == "yes")
}

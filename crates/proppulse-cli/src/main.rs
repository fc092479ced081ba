// PropPulse command-line entry point.
//
// Startup sequence:
// 1. Parse arguments
// 2. Initialize tracing (log to file, not terminal)
// 3. Load config
// 4. Dispatch the subcommand:
//    - verify: check the stats API, verify every row, write <stem>_updated.csv
//    - rank:   load scored props, sort/filter, print a page, export on request
//    - check:  check the stats API only

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::info;

use proppulse_core::api::BallDontLieClient;
use proppulse_core::config::{self, Config, API_KEY_ENV};
use proppulse_core::prop::{format_number, format_odds, PropRecord};
use proppulse_core::rank::{
    self, ev_tier, export_csv, export_markdown, prop_confidence, ConfidenceBucket, FilterCriteria,
    Page, RankedView, SortKey,
};
use proppulse_core::teams::TeamAliasTable;
use proppulse_core::verify::{BatchOptions, BatchRunner, CancelSignal, PropTable};

#[derive(Parser)]
#[command(
    name = "proppulse",
    author,
    version,
    about = "Verify player props against BallDontLie box scores and rank scored props"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify a props CSV against recent box scores
    Verify {
        /// CSV with Player, Stat, Line and optional Opponent columns
        input: PathBuf,

        /// Only games strictly before this date count (YYYY-MM-DD, default today)
        #[arg(long)]
        cutoff: Option<NaiveDate>,

        /// Lookback window in days (overrides [batch] lookback_days)
        #[arg(long)]
        days: Option<u32>,

        /// Concurrent rows (overrides [batch] max_concurrency)
        #[arg(long)]
        concurrency: Option<usize>,

        /// Output path (default <input stem>_updated.csv next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rank, filter and export a scored-props CSV
    Rank {
        /// Scored props from the projection model, optionally already verified
        input: PathBuf,

        /// Sort key: ev, prob, projection, edge, odds, confidence
        #[arg(long, default_value = "ev")]
        sort: SortKey,

        /// Minimum EV in percent
        #[arg(long)]
        min_ev: Option<f64>,

        /// Minimum model probability in percent
        #[arg(long)]
        min_prob: Option<f64>,

        /// Maximum model probability in percent
        #[arg(long)]
        max_prob: Option<f64>,

        /// Comma-separated stats, e.g. PTS,REB+AST
        #[arg(long)]
        stats: Option<String>,

        /// Minimum games in the model sample
        #[arg(long)]
        min_games: Option<u32>,

        /// Comma-separated positions, e.g. G,F
        #[arg(long)]
        positions: Option<String>,

        /// Case-insensitive player name substring
        #[arg(long)]
        player: Option<String>,

        /// Minimum confidence: high, medium, low, "very low"
        #[arg(long, value_parser = parse_bucket)]
        min_confidence: Option<ConfidenceBucket>,

        /// Only props with positive EV
        #[arg(long)]
        positive_ev: bool,

        /// Only HIGH confidence props
        #[arg(long, conflicts_with = "positive_ev")]
        high_confidence: bool,

        /// Page to print (1-based)
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Rows per page (overrides [ranking] page_size)
        #[arg(long)]
        page_size: Option<usize>,

        /// Print population summary statistics
        #[arg(long)]
        summary: bool,

        /// Export the filtered list as CSV (default prop_analysis_<timestamp>.csv)
        #[arg(long)]
        export_csv: Option<Option<PathBuf>>,

        /// Export a Markdown report (default prop_report_<timestamp>.md)
        #[arg(long)]
        export_md: Option<Option<PathBuf>>,

        /// Props in the Markdown report (overrides [ranking] markdown_top_n)
        #[arg(long)]
        top: Option<usize>,
    },

    /// Check that the stats API accepts the configured key
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Parse arguments
    let cli = Cli::parse();

    // 2. Initialize tracing (log to file, not terminal)
    init_tracing()?;
    info!("PropPulse starting up");

    // 3. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: api={}, lookback={}d, {} workers",
        config.api.base_url, config.batch.lookback_days, config.batch.max_concurrency
    );

    // 4. Dispatch
    match cli.command {
        Commands::Verify {
            input,
            cutoff,
            days,
            concurrency,
            output,
        } => {
            let cutoff = cutoff.unwrap_or_else(|| Local::now().date_naive());
            let mut options = BatchOptions::from_config(&config.batch, cutoff);
            if let Some(days) = days {
                options.lookback_days = days.max(1);
            }
            if let Some(n) = concurrency {
                options.max_concurrency = n.max(1);
            }
            run_verify(&config, options, &input, output).await
        }
        Commands::Rank {
            input,
            sort,
            min_ev,
            min_prob,
            max_prob,
            stats,
            min_games,
            positions,
            player,
            min_confidence,
            positive_ev,
            high_confidence,
            page,
            page_size,
            summary,
            export_csv,
            export_md,
            top,
        } => {
            let mut criteria = if positive_ev {
                FilterCriteria::positive_ev_only()
            } else if high_confidence {
                FilterCriteria::high_confidence_only()
            } else {
                FilterCriteria::default()
            };
            if min_ev.is_some() {
                criteria.min_ev_pct = min_ev;
            }
            criteria.min_prob_pct = min_prob;
            criteria.max_prob_pct = max_prob;
            if let Some(list) = stats {
                criteria = criteria.with_stats(&list);
            }
            criteria.min_games = min_games;
            if let Some(list) = positions {
                criteria = criteria.with_positions(&list);
            }
            criteria.player = player.filter(|p| !p.trim().is_empty());
            if min_confidence.is_some() {
                criteria.min_confidence = min_confidence;
            }

            let request = RankRequest {
                sort,
                criteria,
                page,
                page_size: page_size.unwrap_or(config.ranking.page_size),
                summary,
                export_csv,
                export_md,
                top: top.unwrap_or(config.ranking.markdown_top_n),
            };
            run_rank(&config, &input, request)
        }
        Commands::Check => {
            let options = BatchOptions::from_config(&config.batch, Local::now().date_naive());
            let runner = build_runner(&config, options)?;
            runner.preflight().await.context("connection check failed")?;
            println!("Stats API reachable, API key accepted.");
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// verify
// ---------------------------------------------------------------------------

fn build_runner(config: &Config, options: BatchOptions) -> Result<BatchRunner> {
    let Some(client) = BallDontLieClient::from_config(config) else {
        bail!(
            "no BallDontLie API key configured; set {} or add balldontlie_api_key to config/credentials.toml (free key at https://www.balldontlie.io/)",
            API_KEY_ENV
        );
    };
    Ok(BatchRunner::new(
        Arc::new(client),
        Arc::new(TeamAliasTable::nba()),
        options,
    ))
}

async fn run_verify(
    config: &Config,
    options: BatchOptions,
    input: &Path,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut table = PropTable::load(input)
        .with_context(|| format!("failed to load props from {}", input.display()))?;
    info!("Loaded {} props from {}", table.len(), input.display());

    let window = options.window();
    let runner = build_runner(config, options)?;
    runner.preflight().await.context("connection check failed")?;

    println!("Verifying {} props against games in {} ...", table.len(), window);

    let cancel = CancelSignal::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nStopping after in-flight rows finish...");
            on_ctrl_c.cancel();
        }
    });

    let report = runner
        .run_table(&mut table, &cancel)
        .await
        .context("verification stopped")?;

    let output = output.unwrap_or_else(|| PropTable::updated_path(input));
    table
        .save(&output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!("Wrote verified props to {}", output.display());

    if report.cancelled {
        println!("Cancelled; unstarted rows were left blank.");
    }
    println!("{}", report.summary);
    println!("Saved to {}", output.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// rank
// ---------------------------------------------------------------------------

struct RankRequest {
    sort: SortKey,
    criteria: FilterCriteria,
    page: usize,
    page_size: usize,
    summary: bool,
    export_csv: Option<Option<PathBuf>>,
    export_md: Option<Option<PathBuf>>,
    top: usize,
}

fn run_rank(config: &Config, input: &Path, request: RankRequest) -> Result<()> {
    let props = rank::load_scored_props(input).context("failed to load scored props")?;
    info!("Loaded {} scored props from {}", props.len(), input.display());

    let mut view = RankedView::new(props, config.ranking.confidence_sort);
    view.filter(request.criteria);
    view.sort_by(request.sort);

    println!(
        "{} of {} props, sorted by {}",
        view.props().len(),
        view.total(),
        view.sort_key()
    );
    match rank::page(view.props(), request.page_size, request.page) {
        Some(page) => print!("{}", render_page(&page)),
        None if view.props().is_empty() => println!("No props match the current filters."),
        None => println!(
            "Page {} is out of range (1-{}).",
            request.page,
            rank::total_pages(view.props().len(), request.page_size)
        ),
    }

    if request.summary {
        println!();
        print!("{}", view.summary());
    }

    let now = Local::now().naive_local();
    if let Some(path) = request.export_csv {
        let path = path.unwrap_or_else(|| PathBuf::from(rank::export::default_csv_name(now)));
        let n = export_csv(view.props(), &path)
            .with_context(|| format!("failed to export {}", path.display()))?;
        println!("Exported {} props to {}", n, path.display());
    }
    if let Some(path) = request.export_md {
        let path = path.unwrap_or_else(|| PathBuf::from(rank::export::default_markdown_name(now)));
        let n = export_markdown(view.props(), &path, request.top, now)
            .with_context(|| format!("failed to export {}", path.display()))?;
        println!("Wrote report of top {} props to {}", n, path.display());
    }
    Ok(())
}

fn parse_bucket(raw: &str) -> Result<ConfidenceBucket, String> {
    let wanted = raw.trim().replace(['_', '-'], " ");
    ConfidenceBucket::ALL
        .into_iter()
        .find(|b| b.label().eq_ignore_ascii_case(&wanted))
        .ok_or_else(|| format!("unknown confidence level '{raw}'"))
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

fn render_row(index: usize, p: &PropRecord) -> String {
    let tier = ev_tier(p);
    let result = p
        .verification
        .as_ref()
        .map(|v| format!("{} {}", v.hit_miss, v.result_symbol()))
        .unwrap_or_default();
    format!(
        "{:>4}  {:<7} {:<22} {:<9} {:>6} {:>6} {:<5} {:>6.1}% {:>+7.1}% {:>6}  {:<9} {}",
        index,
        tier.label(),
        truncate(&p.player, 22),
        truncate(&p.stat, 9),
        format_number(p.line),
        format!("{:.1}", p.projection),
        p.direction().label(),
        p.model_prob_pct(),
        p.ev_pct(),
        format_odds(p.odds),
        prop_confidence(p).bucket.label(),
        result
    )
    .trim_end()
    .to_string()
}

fn render_page(page: &Page<'_, PropRecord>) -> String {
    let mut out = format!(
        "{:>4}  {:<7} {:<22} {:<9} {:>6} {:>6} {:<5} {:>7} {:>8} {:>6}  {:<9} {}\n",
        "#", "Tier", "Player", "Stat", "Line", "Proj", "Dir", "Model", "EV", "Odds", "Conf", "Result"
    );
    for (offset, p) in page.items.iter().enumerate() {
        out.push_str(&render_row(page.start_index + offset + 1, p));
        out.push('\n');
    }
    out.push_str(&format!("Page {}/{}\n", page.number, page.total_pages));
    out
}

fn init_tracing() -> Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("proppulse.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("proppulse_core=info,proppulse=info,warn")),
        )
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use timefill::client::RedmineClient;
use timefill::config::{Config, FileConfig, Overrides};
use timefill::sync::{self, EntryStatus, SyncOutcome, SyncReport};

#[derive(Parser)]
#[command(name = "timefill")]
#[command(about = "Spread today's missing hours across your assigned Redmine issues")]
struct Cli {
    /// Redmine API key
    #[arg(long = "apikey", env = "REDMINE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Redmine host, e.g. redmine.example.com
    #[arg(long, env = "REDMINE_HOST")]
    host: Option<String>,

    /// Target work hours for the day [default: 8]
    #[arg(long)]
    hours: Option<f64>,

    /// Date to use as 'today', formatted YYYY-MM-DD
    #[arg(long)]
    today: Option<String>,

    /// Compute the allocation without creating any time entries
    #[arg(long = "dry")]
    dry_run: bool,

    /// Verbose logging, including server responses
    #[arg(long)]
    debug: bool,

    /// Abort instead of assuming zero tracked hours when entries can't be read
    #[arg(long)]
    strict_ledger: bool,

    /// Path to a JSON config file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn init_tracing(debug: bool) {
    let default = if debug { "timefill=debug" } else { "timefill=info" };
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default.into()),
    );

    // Logs go to stderr so the summary on stdout stays clean
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_summary(report: &SyncReport) {
    println!(
        "{}: {}h tracked of {}h",
        report.day, report.tracked_hours, report.target_hours
    );
    match &report.outcome {
        SyncOutcome::AlreadyTracked => println!("Nothing to track."),
        SyncOutcome::IssuesUnavailable => println!("Assigned issues could not be read."),
        SyncOutcome::NoCandidates { deficit } => {
            println!("Missing {}h but no issues are assigned.", deficit)
        }
        SyncOutcome::Tracked(submission) => {
            for result in &submission.results {
                let status = match &result.status {
                    EntryStatus::Created => "created".to_string(),
                    EntryStatus::Simulated => "dry run".to_string(),
                    EntryStatus::Failed(e) => format!("FAILED: {}", e),
                };
                println!("  #{:<8} {}h  {}", result.issue_id, result.hours, status);
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let file = FileConfig::load(cli.config.as_deref())?;
    let config = Config::resolve(
        Overrides {
            host: cli.host,
            api_key: cli.api_key,
            hours: cli.hours,
            today: cli.today,
            dry_run: cli.dry_run,
            strict_ledger: cli.strict_ledger,
        },
        file,
        chrono::Local::now().date_naive(),
    )?;

    let client = RedmineClient::new(&config.host, config.api_key.as_str())?;
    tracing::debug!("Using {}", client.base_url());

    let report = sync::run(&client, &config.run).await?;
    print_summary(&report);

    let failures = report.failures();
    if failures > 0 {
        anyhow::bail!("{} time entries could not be created", failures);
    }

    Ok(())
}

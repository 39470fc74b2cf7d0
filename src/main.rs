use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use chrono_tz::Tz;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use lolesports_ical::model::League;
use lolesports_ical::{generate_feed, FeedConfig, LolEsportsClient};

/// Scrape LoL Esports schedules and emit an iCalendar feed.
#[derive(Debug, Parser)]
#[command(name = "lolesports-ical", version, about)]
struct Cli {
    /// Output .ics path.
    #[arg(long, default_value = "feed.ics")]
    out: PathBuf,

    /// Local timezone for event descriptions (IANA name).
    #[arg(long, default_value = "Europe/Berlin", value_parser = parse_tz)]
    tz: Tz,

    /// How many days ahead to include.
    #[arg(long, default_value_t = 30)]
    days: u32,

    /// Comma-separated league slugs; defaults to all supported leagues.
    #[arg(long, value_delimiter = ',', value_parser = parse_league)]
    leagues: Option<Vec<League>>,

    /// Skip the structured endpoint and force markup parsing.
    #[arg(long = "no-api")]
    no_api: bool,

    /// Side-car history state file; defaults to `<out>.state.json`.
    #[arg(long)]
    state: Option<PathBuf>,

    /// API key for the structured endpoint.
    #[arg(long, env = "LOLESPORTS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

fn parse_tz(raw: &str) -> Result<Tz, String> {
    Tz::from_str(raw).map_err(|e| e.to_string())
}

fn parse_league(raw: &str) -> Result<League, String> {
    League::from_str(raw.trim()).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = FeedConfig {
        leagues: cli.leagues.unwrap_or_else(League::defaults),
        days: cli.days,
        timezone: cli.tz,
        api_key: cli.api_key,
        output_path: cli.out,
        state_path: cli.state,
        prefer_structured: !cli.no_api,
    };

    let client = LolEsportsClient::new(config.api_key.clone());
    match generate_feed(&client, &config).await {
        Ok(summary) => {
            println!(
                "Fetched {} matches across {} leagues ({} events); wrote {}",
                summary.matches,
                summary.leagues_ok,
                summary.events,
                config.output_path.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "feed generation failed");
            ExitCode::FAILURE
        }
    }
}

use clap::Parser;
use tracing_subscriber::EnvFilter;

use zepp_sync::config::Config;

#[derive(Parser)]
#[command(name = "zepp-sync")]
#[command(author, version, about = "Polls the Zepp/Mi-Fit cloud API and writes smart-band metrics to InfluxDB", long_about = None)]
struct Cli {
    /// Days of history to request (overrides QUERY_DURATION_DAYS)
    #[arg(long)]
    days: Option<u32>,

    /// Collect and decode everything, but skip the sink write
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> zepp_sync::Result<()> {
    let mut config = Config::from_env()?;
    if let Some(days) = cli.days {
        config.query_duration_days = days;
    }

    zepp_sync::sync::run(&config, cli.dry_run).await
}

use clap::Parser;
use haven_admin::cli::Cli;
use haven_admin::is_production;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so HAVEN_GATEWAY_URL and friends apply
    let _ = dotenvy::dotenv();

    let default_level = if is_production!() { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Running in {:?} mode", haven_admin::config::config().environment);

    let cli = Cli::parse();

    if let Err(e) = haven_admin::cli::run(cli).await {
        match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => eprintln!("Error: {e:?}"),
            _ => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }

    Ok(())
}

/*!
 * Vigil CLI entry point
 */

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use vigil::{logging, JolokiaConnector, RestartScript, Watchdog, WatchdogPolicy};

#[derive(Parser)]
#[command(name = "vigil")]
#[command(version, about = "Self-healing memory watchdog: restarts a server when memory stays above threshold", long_about = None)]
struct Cli {
    /// Path to a TOML policy file
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Jolokia agent base URL
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Memory threshold in GiB
    #[arg(long, value_name = "GIB")]
    threshold: Option<f64>,

    /// Consecutive breaches before the restart fires
    #[arg(long, value_name = "N")]
    max_breaches: Option<u32>,

    /// Seconds between samples
    #[arg(long, value_name = "SECS")]
    interval: Option<u64>,

    /// Restart script to run on sustained breach
    #[arg(long, value_name = "PATH")]
    restart_script: Option<PathBuf>,

    /// Verbose (debug-level) logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let mut policy = match &cli.config {
        Some(path) => WatchdogPolicy::from_toml_file(path)
            .with_context(|| format!("loading policy from {}", path.display()))?,
        None => WatchdogPolicy::default(),
    };

    // Flags override the file for the common knobs
    if let Some(endpoint) = cli.endpoint {
        policy.endpoint = endpoint;
    }
    if let Some(threshold) = cli.threshold {
        policy.memory_threshold_gib = threshold;
    }
    if let Some(max_breaches) = cli.max_breaches {
        policy.max_consecutive_breaches = max_breaches;
    }
    if let Some(interval) = cli.interval {
        policy.poll_interval_secs = interval;
    }
    if let Some(script) = cli.restart_script {
        policy.restart_script = script;
    }

    let mut connector = JolokiaConnector::new(policy.endpoint.clone());
    if let Some(username) = policy.username.clone().filter(|u| !u.is_empty()) {
        connector =
            connector.with_credentials(username, policy.password.clone().unwrap_or_default());
    }
    let remediator = RestartScript::new(policy.restart_script.clone());

    let watchdog = Watchdog::new(connector, remediator, policy)?;
    watchdog.run().await;

    Ok(())
}

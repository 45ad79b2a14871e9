mod config;

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use clap::{Args, Parser, Subcommand};
use console::style;
use tracing_subscriber::{fmt, EnvFilter};

use review_core::{
    build_client, check_credentials, Credentials, CycleOutcome, HttpApi, Poller, PollerConfig,
    TelegramNotifier,
};

fn version_string() -> &'static str {
    static VERSION: OnceLock<String> = OnceLock::new();
    VERSION.get_or_init(|| {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            env!("CARGO_PKG_VERSION").to_string()
        } else {
            format!("{} ({hash})", env!("CARGO_PKG_VERSION"))
        }
    })
}

/// Homework review notifier: relay review status changes to Telegram.
#[derive(Parser)]
#[command(name = "review-bot", version = version_string(), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the review API until interrupted.
    Run {
        #[command(flatten)]
        common: CommonArgs,

        /// Seconds between polls. Overrides the config file.
        #[arg(long)]
        interval_secs: Option<u64>,
    },
    /// Run a single poll cycle, notify if needed, and exit.
    Once {
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Path to TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Env file holding PR_TOKEN, TG_TOKEN and TG_CHAT_ID.
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let (common, interval_override, once) = match cli.command {
        Commands::Run {
            common,
            interval_secs,
        } => (common, interval_secs, false),
        Commands::Once { common } => (common, None, true),
    };

    let app_config = load_config(common.config.as_deref());

    if let Err(e) = dotenvy::from_path(&common.env_file) {
        tracing::debug!(path = %common.env_file.display(), error = %e, "Env file not loaded");
    }

    let credentials = Credentials::from_env();
    if !check_credentials(&credentials) {
        tracing::error!("Missing environment variables, refusing to start");
        std::process::exit(1);
    }

    let mut poller_config = app_config.to_poller_config();
    if let Some(secs) = interval_override {
        poller_config = poller_config.with_retry_interval(secs);
    }
    if let Err(e) = poller_config.validate() {
        tracing::error!("{}", e);
        std::process::exit(1);
    }

    let mut poller = match build_poller(poller_config, &credentials) {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build HTTP client");
            std::process::exit(1);
        }
    };

    if once {
        run_once(&mut poller).await;
    } else {
        print_banner(poller.config());
        poller.run(shutdown_signal()).await;
    }
}

fn load_config(path: Option<&Path>) -> config::AppConfig {
    let Some(path) = path else {
        init_tracing("pretty");
        return config::AppConfig::default();
    };

    match config::AppConfig::load(path) {
        Ok(c) => {
            init_tracing(&c.log.format);
            tracing::info!(path = %path.display(), "Loaded config file");
            c
        }
        Err(e) => {
            init_tracing("pretty");
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    }
}

fn build_poller(
    config: PollerConfig,
    credentials: &Credentials,
) -> Result<Poller, Box<dyn std::error::Error>> {
    let client = build_client(config.request_timeout)?;
    let api = Arc::new(HttpApi::from_config(
        &config,
        client.clone(),
        &credentials.api_token,
    ));
    let notifier = Arc::new(TelegramNotifier::from_config(
        &config,
        client,
        &credentials.bot_token,
        &credentials.chat_id,
    ));
    Ok(Poller::new(config, api, notifier))
}

async fn run_once(poller: &mut Poller) {
    let outcome = poller.run_cycle().await;
    let line = match &outcome {
        CycleOutcome::NoNewStatuses => style("no new statuses".to_string()).dim(),
        CycleOutcome::Unchanged => style("status unchanged".to_string()).dim(),
        CycleOutcome::Notified { message, delivered } => {
            let verb = if *delivered { "sent" } else { "NOT sent" };
            style(format!("{verb}: {message}")).green()
        }
        CycleOutcome::Failed { error, .. } => style(format!("failed: {error}")).red(),
    };
    println!("{line}");

    if !outcome.is_success() {
        std::process::exit(2);
    }
}

fn print_banner(config: &PollerConfig) {
    println!(
        "{} {}",
        style("review-bot").bold(),
        style(version_string()).dim()
    );
    println!("  {} {}", style("endpoint:").dim(), style(&config.endpoint).bold());
    println!(
        "  {} {}s",
        style("interval:").dim(),
        config.retry_interval.as_secs()
    );
    if config.accept_list_wrapped {
        println!("  {} list-wrapped responses accepted", style("compat:  ").dim());
    }
    println!();
    println!("{}", style("Press Ctrl+C to stop").dim());
    println!();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}

fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_format {
        "json" => {
            fmt().with_env_filter(filter).json().init();
        }
        _ => {
            fmt().with_env_filter(filter).init();
        }
    }
}

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use music_link_responder as lib;
use lib::config::Config;
use lib::models::{InboundLinkEvent, Service};
use lib::notify::SlackNotifier;
use lib::resolve::Resolver;
use std::path::{Path, PathBuf};
use tracing::subscriber as tracing_subscriber_global;
use tracing_appender::rolling::RollingFileAppender;
use tracing_log::LogTracer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "music-link-responder", version)]
struct Cli {
    /// Path to config TOML
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a shared music link and print the equivalent links
    Resolve {
        /// The shared link (Apple Music, Spotify, or YouTube Music)
        url: String,
    },
    /// Process an inbound link event from a JSON file (or stdin with "-")
    HandleEvent {
        /// Path to the event JSON
        file: PathBuf,
    },
    /// Validate config file and exit
    ConfigValidate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    // Resolve config path: explicit --config overrides; otherwise prefer
    // the system-wide config and fall back to the repository example
    // config for local/dev usage.
    let resolved_config_path: PathBuf = match &cli.config {
        Some(p) => p.clone(),
        None => {
            let etc_path = Path::new("/etc/music-link-responder/config.toml");
            if etc_path.exists() {
                etc_path.to_path_buf()
            } else {
                PathBuf::from("config/example-config.toml")
            }
        }
    };

    let cfg = Config::from_path(&resolved_config_path)
        .with_context(|| format!("loading config from {}", resolved_config_path.display()))?;

    // Initialize log->tracing bridge and structured logging.
    // Logs go to both stdout and a daily-rotated file in cfg.log_dir.
    let _ = LogTracer::init();
    let file_appender: RollingFileAppender =
        tracing_appender::rolling::daily(&cfg.log_dir, "music-link-responder.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Honor RUST_LOG if set, otherwise default to info.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = fmt::layer().with_writer(non_blocking);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer);

    tracing_subscriber_global::set_global_default(subscriber)
        .expect("failed to set global tracing subscriber");

    match cli.command {
        Commands::Resolve { url } => {
            let resolver = Resolver::from_config(&cfg)
                .with_context(|| "constructing provider clients".to_string())?;
            let parsed = url::Url::parse(&url).with_context(|| format!("parsing url {}", url))?;
            match resolver.resolve(&parsed).await {
                Ok(result) => {
                    if result.is_empty() {
                        println!("No equivalent links found.");
                    }
                    for svc in Service::ALL {
                        if let Some(link) = result.get(svc) {
                            println!("{}: {}", svc, link.url);
                        }
                    }
                }
                Err(e) => {
                    eprintln!("Resolution failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::HandleEvent { file } => {
            let raw = if file.as_os_str() == "-" {
                std::io::read_to_string(std::io::stdin())?
            } else {
                std::fs::read_to_string(&file)
                    .with_context(|| format!("reading event from {}", file.display()))?
            };
            let event: InboundLinkEvent =
                serde_json::from_str(&raw).with_context(|| "parsing event JSON".to_string())?;
            let resolver = Resolver::from_config(&cfg)
                .with_context(|| "constructing provider clients".to_string())?;
            let slack = SlackNotifier::new(cfg.slack_token.clone());
            if !slack.is_authenticated() {
                eprintln!("No Slack token configured. Set slack_token or SLACK_TOKEN.");
                std::process::exit(1);
            }
            lib::handler::handle_link_event(&resolver, &slack, &event)
                .await
                .with_context(|| "handling link event".to_string())?;
        }
        Commands::ConfigValidate => {
            match Config::from_path(resolved_config_path.as_path()) {
                Ok(_) => println!("OK"),
                Err(e) => {
                    eprintln!("Config validation failed: {}", e);
                    std::process::exit(2);
                }
            }
        }
    }

    Ok(())
}

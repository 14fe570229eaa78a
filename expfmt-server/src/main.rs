// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  expfmt: Prometheus exposition with content negotiation
//
//  serve:   HTTP scrape endpoint, format picked per request
//  render:  one-shot dump of the registry to stdout
//  Config:  YAML file + EXPFMT_* env overrides
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use clap::{Parser, Subcommand};
use expfmt_core::config::{ExporterConfig, LogConfig};
use expfmt_core::format::ExpositionFormat;
use expfmt_encoder::{encode_all, negotiate_encoder, Encoder, ScrapeMetrics};
use expfmt_http::HttpState;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "expfmt", version, about = "Prometheus exposition format negotiation")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "expfmt.yaml")]
    config: PathBuf,

    /// Log filter; overrides the config file, ignored when RUST_LOG is set
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the scrape endpoint (default)
    Serve,
    /// Write the current registry to stdout once
    Render {
        /// Accept header value to negotiate against
        #[arg(long, conflicts_with = "format")]
        accept: Option<String>,

        /// Force a format: text, protobuf-delimited, protobuf-text, protobuf-compact-text
        #[arg(long)]
        format: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ── Config ──
    let config_found = cli.config.exists();
    let mut config = if config_found {
        ExporterConfig::load(&cli.config)?
    } else {
        ExporterConfig::default()
    };
    if let Some(level) = cli.log_level {
        config.log.level = level;
    }

    // ── Tracing ──
    init_tracing(&config.log);

    if config_found {
        info!(path = %cli.config.display(), "Loaded config file");
    } else {
        info!("No config file found, using defaults");
    }

    // ── State ──
    let metrics = ScrapeMetrics::new(&config.metrics)?;
    info!(enabled = metrics.is_enabled(), "Self metrics");
    let state = Arc::new(HttpState::new(prometheus::default_registry().clone(), metrics));

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            info!(
                version = env!("CARGO_PKG_VERSION"),
                addr = %config.http.addr,
                "expfmt starting"
            );
            expfmt_http::serve(config.http, state).await
        }
        Command::Render { accept, format } => render_once(&state, accept, format),
    }
}

fn init_tracing(log: &LogConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log.level));

    // stdout is reserved for `render` output.
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn render_once(
    state: &HttpState,
    accept: Option<String>,
    format: Option<String>,
) -> anyhow::Result<()> {
    let families = state.gather();
    let stdout = std::io::stdout().lock();

    let (mut encoder, content_type) = match format {
        Some(name) => {
            let format: ExpositionFormat = name.parse()?;
            (Encoder::new(stdout, format), format.content_type())
        }
        None => negotiate_encoder(stdout, accept.as_deref().unwrap_or_default()),
    };

    encode_all(&mut encoder, &families)?;
    encoder.get_mut().flush()?;

    info!(
        format = %encoder.format(),
        families = families.len(),
        "Rendered registry"
    );
    eprintln!("Content-Type: {content_type}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_defaults_to_serve_with_default_config_path() {
        let cli = Cli::try_parse_from(["expfmt"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from("expfmt.yaml"));
        assert!(cli.log_level.is_none());
    }

    #[test]
    fn render_accepts_accept_header() {
        let cli = Cli::try_parse_from(["expfmt", "render", "--accept", "text/plain"]).unwrap();
        match cli.command {
            Some(Command::Render { accept, format }) => {
                assert_eq!(accept.as_deref(), Some("text/plain"));
                assert!(format.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn render_accept_and_format_conflict() {
        let result = Cli::try_parse_from([
            "expfmt", "render", "--accept", "text/plain", "--format", "text",
        ]);
        assert!(result.is_err());
    }
}

//! Structured logging: dual-mode human/JSONL output on stderr. No
//! redaction engine or event-taxonomy layer lives here — `vault-redact`
//! covers the one redaction rule this repo needs, applied at the RPC
//! boundary rather than in the logging pipeline itself.

use std::io::IsTerminal;
use std::str::FromStr;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Log output format, selectable via `--log-format` or `VAULT_LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    #[default]
    Human,
    Jsonl,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "console" | "pretty" => Ok(LogFormat::Human),
            "jsonl" | "json" | "structured" => Ok(LogFormat::Jsonl),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Resolves the effective log format: explicit CLI flag wins, then
/// `VAULT_LOG_FORMAT`, then human.
pub fn resolve_format(explicit: Option<LogFormat>) -> LogFormat {
    explicit
        .or_else(|| std::env::var("VAULT_LOG_FORMAT").ok().and_then(|v| v.parse().ok()))
        .unwrap_or_default()
}

/// Initializes the global `tracing` subscriber. Must be called once at
/// process startup, before any `tracing` macro fires. stdout is reserved
/// for command payloads (JSON results); all log output goes to stderr.
pub fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vault_core=info"));

    match format {
        LogFormat::Human => {
            let use_ansi = std::io::stderr().is_terminal();
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(use_ansi);
            tracing_subscriber::registry().with(filter).with(fmt_layer).init();
        }
        LogFormat::Jsonl => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .json()
                .with_target(false);
            tracing_subscriber::registry().with(filter).with(fmt_layer).init();
        }
    }
}

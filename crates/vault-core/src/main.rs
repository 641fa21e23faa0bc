//! Local-first conversation archive — CLI entry point.
//!
//! Subcommands mirror the RPC surface consumed by a desktop-shell host:
//! `import`, `search`, `status`, `wipe`, `diagnostics`. `--smoke` runs the
//! headless import/search/wipe verification loop instead of any subcommand.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use vault_common::Provider;
use vault_core::logging::{self, LogFormat};
use vault_core::rpc;
use vault_core::smoke::{self, SmokeArgs};
use vault_paths::PathRoot;

#[derive(Debug, Parser)]
#[command(name = "vault-core", version, about = "Local-first conversation archive core")]
struct Cli {
    /// Directory holding the vault (database + artifacts). Created on first use.
    #[arg(long, global = true, env = "VAULT_DIR")]
    vault_dir: Option<PathBuf>,

    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Option<Command>,

    /// Run the headless smoke scenario instead of a subcommand.
    #[arg(long)]
    smoke: bool,

    #[arg(long, requires = "smoke")]
    import: Option<PathBuf>,

    #[arg(long, requires = "smoke")]
    sentinel: Option<String>,

    #[arg(long, requires = "smoke")]
    provider: Option<Provider>,

    #[arg(long, requires = "smoke")]
    smoke_out: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Import a provider export (a raw JSON/HTML file, or a ZIP bundle).
    Import {
        #[arg(long)]
        provider: Provider,
        file: PathBuf,
    },
    /// Full-text search across all imported threads and messages.
    Search { query: String },
    /// Report vault location and local-only status.
    Status,
    /// Erase the entire vault: database and all stored artifacts.
    Wipe {
        /// Required, to guard against an accidental destructive call.
        #[arg(long)]
        yes: bool,
    },
    /// Emit vault health and ingestion diagnostics (no message content).
    Diagnostics,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(logging::resolve_format(cli.log_format));

    if cli.smoke {
        return run_smoke_mode(&cli);
    }

    let Some(command) = cli.command else {
        eprintln!("no subcommand given; pass --help for usage, or --smoke to run the smoke scenario");
        return ExitCode::FAILURE;
    };

    let Some(vault_dir) = cli.vault_dir else {
        eprintln!("--vault-dir (or $VAULT_DIR) is required");
        return ExitCode::FAILURE;
    };

    let root = match PathRoot::init(vault_dir) {
        Ok(root) => root,
        Err(e) => {
            eprintln!("failed to initialize vault directory: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match command {
        Command::Import { provider, file } => rpc::import_headless(root, provider, &file)
            .and_then(|r| print_json(&r)),
        Command::Search { query } => rpc::search(root, &query).and_then(|r| print_json(&r)),
        Command::Status => print_json(&rpc::status(root)),
        Command::Wipe { yes } => {
            if !yes {
                eprintln!("refusing to wipe without --yes");
                return ExitCode::FAILURE;
            }
            rpc::wipe(root).and_then(|()| print_json(&serde_json::json!({ "success": true })))
        }
        Command::Diagnostics => rpc::diagnostics(root).and_then(|r| print_json(&r)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} ({})", e, e.code());
            ExitCode::FAILURE
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> vault_common::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

fn run_smoke_mode(cli: &Cli) -> ExitCode {
    let (Some(vault_dir), Some(import), Some(sentinel), Some(provider), Some(smoke_out)) = (
        cli.vault_dir.clone(),
        cli.import.clone(),
        cli.sentinel.clone(),
        cli.provider,
        cli.smoke_out.clone(),
    ) else {
        eprintln!("--smoke requires --vault-dir, --import, --sentinel, --provider, --smoke-out");
        return ExitCode::FAILURE;
    };

    let (report, code) = smoke::run_smoke(SmokeArgs {
        vault_dir,
        import: &import,
        sentinel,
        provider,
        smoke_out: &smoke_out,
    });

    if report.pass {
        ExitCode::SUCCESS
    } else {
        eprintln!("smoke run failed: {:?}", report.error_message);
        let _ = code;
        ExitCode::FAILURE
    }
}

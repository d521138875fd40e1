//! confab CLI: launches the chat overlay

use clap::{Parser, Subcommand};
use confab_engine::{ChatSession, CompletionBackend, OpenAiClient, API_KEY_ENV};
use std::sync::Arc;

/// Terminal chat overlay backed by a hosted completion API
#[derive(Parser)]
#[command(name = "confab")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the chat overlay (default when no command specified)
    Tui,

    /// Check credential configuration and print diagnostics
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// File receiving diagnostic logs while the TUI owns the terminal.
const LOG_FILE: &str = "confab.log";

fn main() {
    let cli = Cli::parse();

    match cli.command {
        None | Some(Commands::Tui) => {
            init_logging();

            // The credential is read once here; absence is the degraded
            // mode, not a startup failure.
            let backend =
                OpenAiClient::from_env().map(|c| Arc::new(c) as Arc<dyn CompletionBackend>);
            let session = ChatSession::new(backend);

            let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
            if let Err(e) = rt.block_on(confab_tui::run_tui(session)) {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Doctor { json }) => {
            cmd_doctor(json);
        }
    }
}

/// Route tracing diagnostics to a log file; the TUI occupies the terminal.
/// Failure to open the file is non-fatal: diagnostics are best-effort.
fn init_logging() {
    let Ok(file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(LOG_FILE)
    else {
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn cmd_doctor(json: bool) {
    let configured = OpenAiClient::from_env().is_some();

    if json {
        let output = serde_json::json!({
            "credential_env": API_KEY_ENV,
            "configured": configured,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).expect("failed to serialize")
        );
        return;
    }

    println!("confab diagnostics\n");
    if configured {
        println!("  {API_KEY_ENV} - set");
        println!("\nThe overlay will answer with live completions.");
    } else {
        println!("  {API_KEY_ENV} - not set");
        println!("\nThe overlay will run in degraded mode and reply with a");
        println!("configuration warning instead of contacting the API.");
    }
}

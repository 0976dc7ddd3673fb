//! # Tierline - Creator Progress Server
//!
//! The main binary for the Tierline creator dashboard backend.
//!
//! This application provides:
//! - HTTP REST API server (axum-based)
//! - CLI interface for progress, earnings and learning lookups
//! - Snapshot validation
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     apps/tierline (THE BINARY)                  │
//! │                                                                 │
//! │  ┌─────────────┐    ┌─────────────┐    ┌──────────────────┐   │
//! │  │   CLI       │    │   HTTP API  │    │  Configuration   │   │
//! │  │  (clap)     │    │   (axum)    │    │  (toml)          │   │
//! │  └──────┬──────┘    └──────┬──────┘    └────────┬─────────┘   │
//! │         │                  │                    │              │
//! │         └──────────────────┼────────────────────┘              │
//! │                            ▼                                   │
//! │                    ┌───────────────┐                           │
//! │                    │ tierline-core │                           │
//! │                    │ (THE LOGIC)   │                           │
//! │                    └───────────────┘                           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! tierline --snapshot creators.json server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! tierline --snapshot creators.json progress @lumi
//! tierline calc --total 350000
//! tierline --snapshot creators.json check
//! ```

use clap::Parser;
use tierline::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // TIERLINE_LOG_FORMAT=json switches to machine-parseable output.
    let log_format = std::env::var("TIERLINE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tierline=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Tierline startup banner.
fn print_banner() {
    println!(
        r#"
  ████████╗██╗███████╗██████╗ ██╗     ██╗███╗   ██╗███████╗
  ╚══██╔══╝██║██╔════╝██╔══██╗██║     ██║████╗  ██║██╔════╝
     ██║   ██║█████╗  ██████╔╝██║     ██║██╔██╗ ██║█████╗
     ██║   ██║██╔══╝  ██╔══██╗██║     ██║██║╚██╗██║██╔══╝
     ██║   ██║███████╗██║  ██║███████╗██║██║ ╚████║███████╗
     ╚═╝   ╚═╝╚══════╝╚═╝  ╚═╝╚══════╝╚═╝╚═╝  ╚═══╝╚══════╝

  Creator Progress Server v{}

  Rookie • Silver • Gold • Elite
"#,
        env!("CARGO_PKG_VERSION")
    );
}

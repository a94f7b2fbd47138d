//! Home Revision - household inventory from the command line.
//!
//! A thin frontend over `home-revision-core`: log in, list the products
//! you track, and add, edit, restock or delete them.

mod cli;

use std::io;

use clap::Parser;
use home_revision_core::{ApiError, Notice, NoticeKind};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::Cli;

/// Initialize the tracing subscriber for logging.
/// The returned guard flushes buffered log lines on drop.
fn init_tracing() -> WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let (writer, guard) = tracing_appender::non_blocking(io::stderr());

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer))
        .with(filter)
        .init();
    guard
}

fn print_notice(notice: &Notice) {
    match notice.kind {
        NoticeKind::Success => println!("✓ {}", notice.message),
        NoticeKind::Info => println!("{}", notice.message),
        NoticeKind::Error => eprintln!("✗ {}", notice.message),
    }
}

#[tokio::main]
async fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _guard = init_tracing();
    let cli = Cli::parse();
    info!("home-revision starting");

    let (notifier, mut notices) = home_revision_core::Notifier::channel();
    let result = cli::dispatch(cli, notifier).await;

    while let Ok(notice) = notices.try_recv() {
        print_notice(&notice);
    }

    if let Err(e) = result {
        // API failures were already shown as notices
        if e.downcast_ref::<ApiError>().is_none() {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}

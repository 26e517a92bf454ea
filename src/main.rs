use btcqr::interfaces::cli::{self, Cli};
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries URIs, images and events.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "btcqr=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Cli::parse();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    cli::run(args, &mut out).await.into_diagnostic()?;

    Ok(())
}

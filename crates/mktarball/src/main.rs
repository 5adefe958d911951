// Copyright 2026 Oxide Computer Company

use anyhow::Result;
use clap::Parser;
use mktarball::{BuildLayout, Cli, Config};
use mktarball_vcs::Vcs;
use tracing_subscriber::fmt::writer::MakeWriterExt;

fn initialize_tracing() {
    // Timestamps aren't useful here: schedulers that run us already record
    // them.
    let format = tracing_subscriber::fmt::format()
        .without_time()
        .with_target(false)
        .compact();
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    // Progress goes to stdout, warnings and errors to stderr.
    let writer = std::io::stderr
        .with_max_level(tracing::Level::WARN)
        .or_else(std::io::stdout);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .event_format(format)
        .with_writer(writer)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::from_cli(cli)?;
    let vcs = Vcs::git()?;
    let today = chrono::Local::now().date_naive();

    let published =
        mktarball::run(&config, &BuildLayout::default(), &vcs, today)?;
    tracing::info!(
        commit = %published.commit,
        release = published.release.top_dir(),
        "wrote {} files to {}",
        published.files.len(),
        config.out_dir,
    );
    Ok(())
}

fn main() {
    // Usage errors exit with 1 like every other failure; --help and
    // --version exit with 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };

    initialize_tracing();
    if let Err(e) = run(cli) {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

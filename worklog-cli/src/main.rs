use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use worklog_cli::WorklogCli;
use worklog_cli::cli_args::validate;
use worklog_persist::SessionRepository;
use worklog_persist::StoreConfig;
use worklog_persist::default_config_path;

fn main() -> anyhow::Result<()> {
    let WorklogCli {
        config,
        data_dir,
        verbose,
        command,
    } = WorklogCli::parse();

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    validate(&command)?;

    let mut config = match config.or_else(default_config_path) {
        Some(path) => StoreConfig::load(&path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => StoreConfig::default(),
    };
    config.apply_env_overrides();
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }

    let mut repo = SessionRepository::open(&config).context("failed to open session store")?;
    if let Some(err) = repo.last_persist_error() {
        warn!(path = %repo.store_path().display(), error = %err, "starting with an empty session list");
    }

    let output = worklog_cli::run(&command, &mut repo, Utc::now())?;
    println!("{output}");
    Ok(())
}

use dirbackup::service::{resolve_config_path, Schedule, ServiceConfig, CONFIG_ENV};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dirbackup::logging::init("info") {
        eprintln!("Warning: diagnostics disabled: {}", e);
    }

    let config_path = resolve_config_path(
        std::env::args_os().nth(1).map(PathBuf::from),
        std::env::var(CONFIG_ENV).ok(),
        &std::env::current_dir()?,
    );
    tracing::info!(path = %config_path.display(), "loading config");

    let config = ServiceConfig::load(&config_path)?;
    let schedule = Schedule::try_from(config)?;

    tracing::info!(
        version = dirbackup::VERSION,
        folders = schedule.folders.len(),
        "starting service"
    );
    tokio::select! {
        _ = schedule.run_forever() => {}
        result = tokio::signal::ctrl_c() => {
            result?;
            tracing::info!("interrupted, stopping service");
        }
    }
    Ok(())
}

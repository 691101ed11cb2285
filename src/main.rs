use clap::Parser;
use dirbackup::config::Cli;
use dirbackup::{ui, AuditLog, RunStats, SyncError, SyncJob};
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = dirbackup::logging::init("warn") {
        eprintln!("Warning: diagnostics disabled: {}", e);
    }

    let quiet = cli.quiet;
    match execute(cli) {
        Ok((stats, dry_run)) => {
            if !quiet {
                println!("{}", ui::format_run_summary(&stats, dry_run));
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", ui::format_failure(&e));
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: Cli) -> Result<(RunStats, bool), SyncError> {
    let log = AuditLog::open(&cli.log_file)?.with_echo(!cli.quiet);

    // Convert CLI args to a job - this validates immediately
    let job = SyncJob::try_from(cli)?;
    let dry_run = job.dry_run;

    let stats = dirbackup::run(job, Arc::new(log))?;
    Ok((stats, dry_run))
}

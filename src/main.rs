// src/main.rs

use std::path::PathBuf;

use chrono::Local;
use pgbackup::engine::RunBanner;
use pgbackup::{cli, logging, run};
use tracing::error;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = cli::parse();
    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("pgbackup error: {err:?}");
        std::process::exit(1);
    }

    let started_at = Local::now();
    let program = std::env::args_os()
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("pgbackup"));

    let banner = RunBanner::new(started_at, &program);
    banner.log_start();

    let succeeded = match run(args, &program, started_at).await {
        Ok(report) => report.succeeded(),
        Err(err) => {
            error!(error = %err, "backup run aborted");
            false
        }
    };

    banner.log_finish(succeeded);
    std::process::exit(if succeeded { 0 } else { 1 });
}

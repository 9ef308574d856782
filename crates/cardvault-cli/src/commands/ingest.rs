use anyhow::{bail, Result};
use cardvault_core::PendingIngestion;
use cardvault_worker::{IngestCoordinator, IngestOutcome};
use std::path::PathBuf;

/// Ingest each path in turn and report what happened to it. Fails at the
/// end if any file failed.
pub async fn run(coordinator: &IngestCoordinator, paths: &[PathBuf]) -> Result<()> {
    let mut failed = 0usize;

    for path in paths {
        let Some(pending) = PendingIngestion::new(path) else {
            println!("{}: skipped, unsupported file type", path.display());
            continue;
        };

        match coordinator.ingest(&pending).await {
            Ok(IngestOutcome::Indexed { id, backup_path }) => {
                println!("{}: indexed as #{} at {}", path.display(), id, backup_path);
            }
            Ok(IngestOutcome::AlreadyIndexed { backup_path }) => {
                println!("{}: already indexed at {}", path.display(), backup_path);
            }
            Err(e) => {
                failed += 1;
                eprintln!("{}: {} [{}]", path.display(), e, e.error_code());
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} files failed to ingest", failed, paths.len());
    }
    Ok(())
}

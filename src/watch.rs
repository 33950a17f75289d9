//! File watcher: runs batch detection on startup, then re-runs on
//! outline changes.

use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use notify::{RecursiveMode, Watcher as _};

use crate::batch;
use crate::error;

/// Debounce delay between filesystem events and re-detection.
const DEBOUNCE_MS: u64 = 100;

/// Create a filesystem watcher that sends events on the given channel.
///
/// # Errors
///
/// Returns an error if the watcher cannot be created.
fn create_watcher(
    tx: crossbeam_channel::Sender<()>,
) -> Result<notify::RecommendedWatcher, error::Error> {
    return notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        if let Ok(event) = res
            && matches!(
                event.kind,
                notify::EventKind::Create(_)
                    | notify::EventKind::Modify(_)
                    | notify::EventKind::Remove(_)
            )
        {
            let _ = tx.send(());
        }
    })
    .map_err(|e| {
        return error::Error::WatchFailed {
            reason: format!("watcher setup failed: {e}"),
        };
    });
}

/// Entry point for the watch command.
///
/// Runs an initial batch detection, then watches the directory and
/// re-runs on changes.
///
/// # Errors
///
/// Returns errors from watcher setup; detection errors are reported per
/// run and watching continues.
pub fn run(dir: &str) -> Result<ExitCode, error::Error> {
    eprintln!("watch: initial run");
    let mut last_code = run_batch(dir);

    let (tx, rx) = crossbeam_channel::unbounded();
    let mut watcher = create_watcher(tx)?;
    watcher
        .watch(Path::new(dir), RecursiveMode::Recursive)
        .map_err(|e| {
            return error::Error::WatchFailed {
                reason: format!("cannot watch {dir}: {e}"),
            };
        })?;

    eprintln!("watch: monitoring {dir}, press Ctrl+C to stop");

    while rx.recv().is_ok() {
        let debounce = Duration::from_millis(DEBOUNCE_MS);
        while rx.recv_timeout(debounce).is_ok() {}
        eprintln!("watch: change detected, re-running...");
        last_code = run_batch(dir);
    }

    return Ok(last_code);
}

/// Run batch detection once and print the result. Returns its exit code.
fn run_batch(dir: &str) -> ExitCode {
    return match batch::run(dir, false) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(3_u8)
        },
    };
}

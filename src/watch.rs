//! File watcher: builds the index on startup, then rebuilds on source changes.

use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use notify::{RecursiveMode, Watcher as _};

use crate::commands::{self, Context};
use crate::diagnostics;
use crate::error;

/// Debounce delay between filesystem events and rebuild.
const DEBOUNCE_MS: u64 = 100;

/// Directories to watch: each configured source directory itself, and the
/// parent directory of each configured source file.
fn collect_watch_dirs(root: &Path, sources: &[String]) -> Vec<(PathBuf, RecursiveMode)> {
    let mut seen = HashSet::new();
    let mut dirs = Vec::new();
    for source in sources {
        let path = root.join(source);
        let (dir, mode) = if path.is_dir() {
            (path, RecursiveMode::Recursive)
        } else if let Some(parent) = path.parent() {
            (parent.to_path_buf(), RecursiveMode::NonRecursive)
        } else {
            continue;
        };
        if seen.insert(dir.clone()) {
            dirs.push((dir, mode));
        }
    }
    return dirs;
}

/// True if `event` should trigger a rebuild: a create, modify, or remove
/// that touches at least one path other than the index file.
fn triggers_rebuild(event: &notify::Event, index_name: Option<&OsStr>) -> bool {
    let relevant = matches!(
        event.kind,
        notify::EventKind::Create(_) | notify::EventKind::Modify(_) | notify::EventKind::Remove(_)
    );
    let only_index = index_name.is_some()
        && !event.paths.is_empty()
        && event.paths.iter().all(|p| return p.file_name() == index_name);
    return relevant && !only_index;
}

/// Create a filesystem watcher that sends events on the given channel.
/// Events touching only the index file are dropped so a rebuild does not
/// trigger another rebuild.
///
/// # Errors
///
/// Returns `Error::WatchFailed` if the watcher cannot be created.
fn create_watcher(
    tx: crossbeam_channel::Sender<()>,
    index_name: Option<OsString>,
) -> Result<notify::RecommendedWatcher, error::Error> {
    return notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        let Ok(event) = res else {
            return;
        };
        if triggers_rebuild(&event, index_name.as_deref()) {
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
/// Runs an initial build, then watches the configured sources and rebuilds
/// on changes. Rebuild failures are reported and the loop keeps going.
///
/// # Errors
///
/// Returns `Error::WatchFailed` if the watcher cannot be set up.
pub fn run(ctx: &Context) -> Result<ExitCode, error::Error> {
    eprintln!("watch: initial build");
    let mut last_code = run_build(ctx);

    let (tx, rx) = crossbeam_channel::unbounded();
    let index_name = ctx.config.index.file_name().map(OsStr::to_os_string);
    let mut watcher = create_watcher(tx, index_name)?;

    let watch_dirs = collect_watch_dirs(&ctx.root, &ctx.config.sources);
    for (dir, mode) in &watch_dirs {
        if let Err(e) = watcher.watch(dir, *mode) {
            tracing::warn!(dir = %dir.display(), error = %e, "cannot watch directory");
        }
    }

    let dir_count = watch_dirs.len();
    eprintln!("watch: monitoring {dir_count} directories, press Ctrl+C to stop");

    while rx.recv().is_ok() {
        let debounce = Duration::from_millis(DEBOUNCE_MS);
        while rx.recv_timeout(debounce).is_ok() {}
        eprintln!("watch: change detected, rebuilding...");
        last_code = run_build(ctx);
    }

    return Ok(last_code);
}

/// Run build once and report the result. Returns the exit code build would have.
fn run_build(ctx: &Context) -> ExitCode {
    return match commands::build(ctx) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(3_u8)
        },
    };
}

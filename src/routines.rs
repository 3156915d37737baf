//! Built-in filesystem and composite routines.
//!
//! These are the non-command steps of the default catalog: best-effort
//! directory sweeps and multi-command sequences. Every failure on an
//! individual entry is a warning line, never a step error; the abort probe
//! is polled before each entry so cancel and skip land promptly.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::instrument;

use crate::operation::{Routine, RoutineContext};
use crate::plan::Outcome;

/// Removes the contents of a set of directories, keeping the directories
/// themselves.
///
/// Missing targets are logged and skipped. Each entry is deleted
/// independently; locked or privileged entries produce warning lines and the
/// sweep moves on.
#[derive(Clone, Debug)]
pub struct SweepDirs {
    targets: Vec<PathBuf>,
}

impl SweepDirs {
    pub fn new(targets: Vec<PathBuf>) -> Self {
        Self { targets }
    }

    /// The user and system temp directories, plus the prefetch directory
    /// when requested.
    pub fn temp_sweep(include_prefetch: bool) -> Self {
        let mut targets = vec![std::env::temp_dir()];
        let windir = std::env::var_os("WINDIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(r"C:\Windows"));
        targets.push(windir.join("Temp"));
        if include_prefetch {
            targets.push(windir.join("Prefetch"));
        }
        Self { targets }
    }
}

#[async_trait]
impl Routine for SweepDirs {
    #[instrument(skip_all)]
    async fn run(&self, ctx: RoutineContext) -> Outcome {
        for target in &self.targets {
            match sweep_folder(target, &ctx) {
                SweepResult::Done => {}
                SweepResult::Aborted => {
                    ctx.emitter.append("[INFO] Aborted cleanup.");
                    return ctx.abort.interruption().unwrap_or(Outcome::Cancel);
                }
            }
        }
        Outcome::Ok
    }
}

enum SweepResult {
    Done,
    Aborted,
}

/// Deletes every entry of `folder`, polling the abort probe between entries.
fn sweep_folder(folder: &Path, ctx: &RoutineContext) -> SweepResult {
    if ctx.should_abort() {
        return SweepResult::Aborted;
    }
    if !folder.exists() {
        ctx.emitter
            .append(format!("[INFO] Skip (not found): {}", folder.display()));
        return SweepResult::Done;
    }

    ctx.emitter
        .append(format!("[INFO] Cleaning: {}", folder.display()));
    let entries = match std::fs::read_dir(folder) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::PermissionDenied => {
            ctx.emitter.append(format!(
                "[WARN] Permission denied: {} (try Admin)",
                folder.display()
            ));
            return SweepResult::Done;
        }
        Err(err) => {
            ctx.emitter.append(format!(
                "[WARN] Error cleaning {}: {}",
                folder.display(),
                err
            ));
            return SweepResult::Done;
        }
    };

    for entry in entries.flatten() {
        if ctx.should_abort() {
            return SweepResult::Aborted;
        }
        safe_remove(&entry.path(), ctx);
    }
    ctx.emitter
        .append(format!("[OK] Cleaned: {}", folder.display()));
    SweepResult::Done
}

/// Best-effort removal of one path. Directories go recursively; symlinks are
/// removed as links, never followed.
fn safe_remove(path: &Path, ctx: &RoutineContext) {
    let is_real_dir = path
        .symlink_metadata()
        .map(|meta| meta.is_dir() && !meta.is_symlink())
        .unwrap_or(false);
    let result = if is_real_dir {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    if let Err(err) = result {
        ctx.emitter.append(format!(
            "[WARN] Could not delete {}: {}",
            path.display(),
            err
        ));
    }
}

/// Stops the update services, sweeps the download cache, and restarts the
/// services. Any sub-command interruption ends the whole routine.
#[derive(Clone, Debug)]
pub struct UpdateCacheRepair {
    download_dir: PathBuf,
}

impl UpdateCacheRepair {
    pub fn new(download_dir: PathBuf) -> Self {
        Self { download_dir }
    }

    /// The platform's update download cache, resolved from `WINDIR`.
    pub fn from_env() -> Self {
        let windir = std::env::var_os("WINDIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(r"C:\Windows"));
        Self::new(windir.join("SoftwareDistribution").join("Download"))
    }
}

#[async_trait]
impl Routine for UpdateCacheRepair {
    #[instrument(skip_all)]
    async fn run(&self, ctx: RoutineContext) -> Outcome {
        for argv in [["net", "stop", "wuauserv"], ["net", "stop", "bits"]] {
            let outcome = ctx.run_command(argv).await;
            if outcome.is_interruption() {
                return outcome;
            }
        }

        match sweep_folder(&self.download_dir, &ctx) {
            SweepResult::Done => {}
            SweepResult::Aborted => {
                ctx.emitter.append("[INFO] Aborted cleanup.");
                return ctx.abort.interruption().unwrap_or(Outcome::Cancel);
            }
        }

        // Restart the services even when the sweep warned; leaving them
        // stopped would break updates outright.
        for argv in [["net", "start", "bits"], ["net", "start", "wuauserv"]] {
            let outcome = ctx.run_command(argv).await;
            if outcome.is_interruption() {
                return outcome;
            }
        }
        Outcome::Ok
    }
}

/// Resets the socket catalog and the IP stack, in that order.
#[derive(Clone, Copy, Debug, Default)]
pub struct NetworkReset;

#[async_trait]
impl Routine for NetworkReset {
    #[instrument(skip_all)]
    async fn run(&self, ctx: RoutineContext) -> Outcome {
        let outcome = ctx.run_command(["netsh", "winsock", "reset"]).await;
        if outcome.is_interruption() {
            return outcome;
        }
        ctx.run_command(["netsh", "int", "ip", "reset"]).await
    }
}

//! Parallel batch detection across a directory of outline documents.
//!
//! Documents are fully independent tasks: each worker runs its own
//! detection pass with its own resolution context, so nothing is shared
//! between documents beyond the read-only matcher.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use walkdir::WalkDir;

use crate::config::Config;
use crate::detect;
use crate::error;
use crate::matcher::Matcher;
use crate::resolver::ResolutionPolicy;
use crate::segment;
use crate::types::DetectionStats;

/// Detection summary for one outline file.
#[derive(Debug, serde::Serialize)]
struct FileReport {
    /// Path relative to the scanned directory.
    file: PathBuf,
    /// Summary counts for the file.
    stats: DetectionStats,
}

/// Outline file extensions scanned in batch mode.
const OUTLINE_EXTENSIONS: [&str; 2] = ["md", "txt"];

/// Collect the outline files under `root`, applying the config's
/// include/exclude filters to their relative paths.
fn collect_files(root: &Path, config: &Config) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| {
            return e
                .path()
                .extension()
                .and_then(|ext| return ext.to_str())
                .is_some_and(|ext| OUTLINE_EXTENSIONS.contains(&ext));
        })
        .map(|e| return e.path().to_path_buf())
        .filter(|p| {
            let relative = p.strip_prefix(root).unwrap_or(p);
            return config.should_scan(&relative.to_string_lossy());
        })
        .collect();
    files.sort();
    return files;
}

/// Detect references in one file. Failures are per-file: one unreadable
/// document never stops the batch.
fn process_file(
    path: &Path,
    matcher: &dyn Matcher,
    policy: &ResolutionPolicy,
) -> Result<DetectionStats, error::Error> {
    let content = std::fs::read_to_string(path)?;
    let units = segment::segment(&content);
    let detection = detect::detect(&units, matcher, policy);
    return Ok(detection.stats);
}

/// Entry point for the batch command. Scans `dir`, fans files out to
/// worker threads, and prints per-file and aggregate summaries.
///
/// # Errors
///
/// Returns errors from config loading or matcher construction. Per-file
/// read failures are reported and skipped.
pub fn run(dir: &str, json: bool) -> Result<ExitCode, error::Error> {
    let root = PathBuf::from(dir);
    let config = Config::load(&PathBuf::from("."))?;
    let matcher = config.build_matcher()?;
    let policy = config.policy();

    let files = collect_files(&root, &config);
    if files.is_empty() {
        eprintln!("No outline files found under {dir}.");
        return Ok(ExitCode::SUCCESS);
    }

    let workers = std::thread::available_parallelism()
        .map(|n| return n.get())
        .unwrap_or(1)
        .min(files.len());

    let (path_tx, path_rx) = crossbeam_channel::unbounded::<PathBuf>();
    let (report_tx, report_rx) = crossbeam_channel::unbounded::<FileReport>();

    for file in &files {
        let _ = path_tx.send(file.clone());
    }
    drop(path_tx);

    std::thread::scope(|scope| {
        for _worker in 0..workers {
            let path_rx = path_rx.clone();
            let report_tx = report_tx.clone();
            let matcher = matcher.as_ref();
            let policy = &policy;
            let root = root.as_path();
            scope.spawn(move || {
                while let Ok(path) = path_rx.recv() {
                    match process_file(&path, matcher, policy) {
                        Ok(stats) => {
                            let file = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
                            let _ = report_tx.send(FileReport { file, stats });
                        },
                        Err(e) => eprintln!("warn: skipping {}: {e}", path.display()),
                    }
                }
            });
        }
        drop(report_tx);
    });

    let mut reports: Vec<FileReport> = report_rx.iter().collect();
    reports.sort_by(|a, b| return a.file.cmp(&b.file));

    if json {
        match serde_json::to_string_pretty(&reports) {
            Ok(out) => println!("{out}"),
            Err(e) => eprintln!("error: {e}"),
        }
    } else {
        print_reports(&reports);
    }

    let any_unresolved = reports.iter().any(|r| return r.stats.unresolved_count > 0);
    if any_unresolved {
        return Ok(ExitCode::from(1));
    }
    return Ok(ExitCode::SUCCESS);
}

/// Print per-file lines and the aggregate summary.
fn print_reports(reports: &[FileReport]) {
    let mut total = 0_usize;
    let mut unique = 0_usize;
    let mut unresolved = 0_usize;

    for report in reports {
        println!(
            "{}: {} references, {} unique verses, {} unresolved",
            report.file.display(),
            report.stats.total_occurrences,
            report.stats.unique_verses,
            report.stats.unresolved_count,
        );
        total = total.saturating_add(report.stats.total_occurrences);
        unique = unique.saturating_add(report.stats.unique_verses);
        unresolved = unresolved.saturating_add(report.stats.unresolved_count);
    }

    println!();
    let count = reports.len();
    println!("{count} files, {total} references, {unique} unique verses, {unresolved} unresolved");
    return;
}

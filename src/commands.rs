//! Core CLI commands for verseref: detect, annotate, books.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::books;
use crate::config::Config;
use crate::dedupe;
use crate::detect;
use crate::error;
use crate::segment;
use crate::store::{self, JsonVerseStore, VerseTextStore as _};
use crate::types::{Detection, MatchForm, Unit};

/// Detect references in one document, attach verse text from the store,
/// and print each reference with its verses.
///
/// # Errors
///
/// Returns errors from config loading, document reading, or store opening.
pub fn annotate(file: &str) -> Result<ExitCode, error::Error> {
    let root = PathBuf::from(".");
    let config = Config::load(&root)?;
    let matcher = config.build_matcher()?;
    let units = load_document(Path::new(file))?;
    let detection = detect::detect(&units, matcher.as_ref(), &config.policy());

    let store = JsonVerseStore::open(&root.join(&config.store_path))?;
    if store.is_empty() {
        eprintln!("warn: verse store is empty");
    }

    for reference in &detection.references {
        // Lists display their covering range; spell the verse set out.
        if reference.form == MatchForm::List {
            let compact = dedupe::compress_verses(&reference.atomic_verses());
            println!("{} ({compact})", reference.display());
        } else {
            println!("{}", reference.display());
        }
        for verse in store::lookup_reference(reference, &store) {
            match &verse.text {
                Some(text) => println!("  {:>3}  {text}", verse.canonical.verse_start),
                None => println!("  {:>3}  [no text]", verse.canonical.verse_start),
            }
        }
        println!();
    }

    print_summary(&detection);
    return Ok(exit_code_for(&detection));
}

/// List the canonical books: abbreviation and full name, in canon order.
pub fn books_list(json: bool) {
    if json {
        let entries: Vec<serde_json::Value> = books::all()
            .map(|key| {
                return serde_json::json!({
                    "abbrev": key.abbrev(),
                    "name": key.full_name(),
                });
            })
            .collect();
        print_json(&entries);
        return;
    }

    for key in books::all() {
        println!("{:<10} {}", key.abbrev(), key.full_name());
    }
    return;
}

/// Run detection on one outline document and print the result.
///
/// # Errors
///
/// Returns errors from config loading or document reading.
pub fn detect_file(file: &str, json: bool) -> Result<ExitCode, error::Error> {
    let root = PathBuf::from(".");
    let config = Config::load(&root)?;
    let matcher = config.build_matcher()?;
    let units = load_document(Path::new(file))?;
    let detection = detect::detect(&units, matcher.as_ref(), &config.policy());

    if json {
        print_json(&detection);
    } else {
        print_detection(&detection);
    }
    return Ok(exit_code_for(&detection));
}

/// Exit code priority: unresolved citations (1) > clean (0).
fn exit_code_for(detection: &Detection) -> ExitCode {
    if detection.stats.unresolved_count > 0 {
        return ExitCode::from(1);
    }
    return ExitCode::SUCCESS;
}

/// Read and segment one outline document.
///
/// # Errors
///
/// Returns `Error::DocumentNotFound` if the path doesn't exist, or
/// `Error::Io` for other read failures.
pub fn load_document(path: &Path) -> Result<Vec<Unit>, error::Error> {
    let content = match std::fs::read_to_string(path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(error::Error::DocumentNotFound { path: path.to_path_buf() });
        },
        Err(e) => return Err(error::Error::Io(e)),
        Ok(c) => c,
    };
    return Ok(segment::segment(&content));
}

/// Quick store sanity check: resolve one citation string and look it up.
///
/// # Errors
///
/// Returns errors from config loading or store opening.
pub fn lookup(citation: &str) -> Result<ExitCode, error::Error> {
    let root = PathBuf::from(".");
    let config = Config::load(&root)?;
    let matcher = config.build_matcher()?;
    let units = segment::segment(citation);
    let detection = detect::detect(&units, matcher.as_ref(), &config.policy());

    let Some(reference) = detection.references.first() else {
        eprintln!("No reference recognized in \"{citation}\".");
        return Ok(ExitCode::from(1));
    };

    let store = JsonVerseStore::open(&root.join(&config.store_path))?;
    let mut missing = 0_u32;
    println!("{}", reference.display());
    for verse in reference.atomic_verses() {
        let text = store
            .get(reference.canonical.book, reference.canonical.chapter, verse)?;
        match text {
            Some(text) => println!("  {verse:>3}  {text}"),
            None => {
                missing = missing.saturating_add(1);
                println!("  {verse:>3}  [no text]");
            },
        }
    }

    if missing > 0 {
        return Ok(ExitCode::from(1));
    }
    return Ok(ExitCode::SUCCESS);
}

/// Print one detection in column form, unresolved citations last.
fn print_detection(detection: &Detection) {
    for reference in &detection.references {
        println!(
            "{:<22} {:<8} {:<13} {:.2}  {}",
            reference.display(),
            reference.form.label(),
            reference.basis.label(),
            reference.confidence,
            reference.original_text,
        );
    }

    if !detection.unresolved.is_empty() {
        println!();
        for m in &detection.unresolved {
            println!("UNRESOLVED  {} (unit {})", m.span_text, m.unit_id);
        }
    }

    println!();
    print_summary(detection);
    return;
}

/// Serialize a value as pretty JSON to stdout.
fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(out) => println!("{out}"),
        Err(e) => eprintln!("error: {e}"),
    }
    return;
}

/// One-line stats summary.
fn print_summary(detection: &Detection) {
    println!(
        "{} references, {} unique verses, {} unresolved",
        detection.stats.total_occurrences,
        detection.stats.unique_verses,
        detection.stats.unresolved_count,
    );
    return;
}

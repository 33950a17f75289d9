use std::fmt::Write as _;

use crate::books;
use crate::error::Error;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render an error as valid markdown with bold headings and print to
/// stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened and how to fix it.
/// Designed to be readable by both humans and LLM agents.
pub fn render_error(e: &Error) -> String {
    match e {
        Error::StoreNotFound { path } => render_store_not_found(&path.display().to_string()),
        Error::UnknownAlias { name } => render_unknown_alias(name),
        Error::UnknownBook { name } => render_unknown_book(name),
        Error::UnknownEngine { name } => render_unknown_engine(name),
        _ => render_generic(e),
    }
}

fn render_generic(e: &Error) -> String {
    match e {
        Error::ConfigParse { file, reason } => format!("\
# Error: Config Parse Failed

Could not parse `{}`: {reason}
", file.display()),

        Error::DocumentNotFound { path } => format!("\
# Error: Document Not Found

`{}` does not exist.
", path.display()),

        Error::StoreCorrupt { path, reason } => format!("\
# Error: Verse Store Corrupt

`{}`: {reason}

## Fix

The store is a JSON object of book -> chapter -> verse -> text.
", path.display()),

        Error::Io(e) => format!("\
# Error: I/O

{e}
"),
        Error::TomlDe(e) => format!("\
# Error: Invalid TOML

{e}
"),
        Error::WatchFailed { reason } => format!("\
# Error: Watch Failed

{reason}
"),
        // Already handled in render_error, but need exhaustive match.
        _ => format!("\
# Error

{e}
"),
    }
}

fn render_store_not_found(path: &str) -> String {
    format!(
        "\
# Error: Verse Store Not Found

`{path}` does not exist.

## Fix

Point `[store] path` in `.verseref.toml` at your verse store file,
or create one:

    {{\"Eph\": {{\"4\": {{\"7\": \"But to each one of us...\"}}}}}}
"
    )
}

fn render_unknown_alias(name: &str) -> String {
    format!(
        "\
# Error: Unknown Alias

Alias `{name}` is not configured.

## Fix

List configured aliases:

    verseref alias list
"
    )
}

fn render_unknown_book(name: &str) -> String {
    let mut out = format!(
        "\
# Error: Unknown Book

`{name}` is not a recognizable book name.
"
    );

    if let Some(suggestion) = find_closest_book(name) {
        let _ = write!(out, "\n## Did you mean `{suggestion}`?\n");
    }

    out.push_str("\
\n## Fix

Use a canonical name or abbreviation:

    verseref books
");
    out
}

fn render_unknown_engine(name: &str) -> String {
    format!(
        "\
# Error: Unknown Matcher Engine

`{name}` is not a known engine.

## Fix

Set the engine in `.verseref.toml`:

    [detection]
    engine = \"grammar\"
"
    )
}

/// Find a canonical book whose full name starts with the given prefix,
/// for "did you mean" suggestions.
pub(crate) fn find_closest_book(name: &str) -> Option<&'static str> {
    let lowered = name.trim().trim_end_matches('.').to_lowercase();
    if lowered.len() < 3 {
        return None;
    }
    books::all()
        .map(books::BookKey::full_name)
        .find(|full| full.to_lowercase().starts_with(&lowered))
}

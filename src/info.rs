use std::path::PathBuf;

use serde::Serialize;

use crate::config;
use crate::store::JsonVerseStore;

/// Output the comprehensive verseref reference document.
pub fn run(json: bool) {
    let root = PathBuf::from(".");
    let state = gather_state(&root);

    if json {
        print_json(&state);
    } else {
        print_markdown(&state);
    }
}

// ── State gathering ───────────────────────────────────────────────────

#[derive(Serialize)]
struct CurrentState {
    aliases: Vec<(String, String)>,
    config_found: bool,
    engine: Option<String>,
    store_path: Option<String>,
    store_verses: Option<usize>,
}

fn gather_state(root: &std::path::Path) -> CurrentState {
    let config_found = root.join(".verseref.toml").exists();
    let config = config::Config::load(root).ok();

    let engine = config.as_ref().map(|c| c.engine.clone());
    let store_path = config
        .as_ref()
        .map(|c| c.store_path.display().to_string());
    let store_verses = config
        .as_ref()
        .and_then(|c| JsonVerseStore::open(&root.join(&c.store_path)).ok())
        .map(|s| s.len());

    let mut aliases = config.map(|c| c.aliases).unwrap_or_default();
    aliases.sort();

    CurrentState { aliases, config_found, engine, store_path, store_verses }
}

// ── Markdown output ───────────────────────────────────────────────────

fn print_markdown(state: &CurrentState) {
    let version = env!("CARGO_PKG_VERSION");
    print_markdown_header(version);
    print_markdown_state(state);
    println!();
    print_markdown_exit_codes();
}

fn print_markdown_header(version: &str) {
    print!(
        "\
# verseref {version}

Verse references for outline documents — detect citations, resolve bare
\"v./vv.\" forms against document context, and attach verse text.

## Recognized Forms

    Rom. 5:1-11                 full reference, range, or comma list
    (Psalm 68:18)               parenthetical, with or without cf. inside
    cf. Luke 4:18               cf.-prefixed
    v. 5 / vv. 47-48            bare citation, resolved from context
    Luke 7                      chapter-only mention
    Scripture Reading: ...      anchor line; clauses share the book

## Workflow

    verseref detect <file>            Detect and resolve references
    verseref annotate <file>          Detect, then attach verse text
    verseref batch <dir>              Detect across a directory in parallel
    verseref watch <dir>              Re-run batch detection on changes
    verseref lookup \"Eph. 4:7-16\"     Resolve one citation against the store
    verseref books                    List canonical books
    verseref alias add <name> <book>  Add a custom book alias
    verseref info                     This document

## Config (.verseref.toml)

    [store]
    path = \"verses.json\"

    [detection]
    engine = \"grammar\"
    chapter_hint_first = true

    [batch]
    include = []
    exclude = []

    [aliases]
    \"S.S\" = \"Song\"

"
    );
}

fn print_markdown_state(state: &CurrentState) {
    println!("## Current State\n");
    let config_label = if state.config_found { "found" } else { "not found (defaults)" };
    println!("- config: {config_label}");
    if let Some(engine) = &state.engine {
        println!("- engine: {engine}");
    }
    match (&state.store_path, state.store_verses) {
        (Some(path), Some(count)) => println!("- store: {path} ({count} verses)"),
        (Some(path), None) => println!("- store: {path} (not readable)"),
        _ => {},
    }
    if state.aliases.is_empty() {
        println!("- aliases: none");
    } else {
        for (name, book) in &state.aliases {
            println!("- alias: {name} -> {book}");
        }
    }
}

fn print_markdown_exit_codes() {
    print!(
        "\
## Exit Codes

- 0 — all references resolved
- 1 — unresolved bare citations present (or lookup miss)
- 2 — usage, config, or store error
"
    );
}

// ── JSON output ───────────────────────────────────────────────────────

fn print_json(state: &CurrentState) {
    match serde_json::to_string_pretty(state) {
        Ok(out) => println!("{out}"),
        Err(e) => eprintln!("error: {e}"),
    }
}

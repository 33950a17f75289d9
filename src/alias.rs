use std::path::{Path, PathBuf};

use crate::books;
use crate::config;
use crate::error;

// ── CLI commands ──────────────────────────────────────────────────────

/// Add a book alias to the config file. The target must be a
/// recognizable book name; it is stored in canonical abbreviated form.
///
/// # Errors
///
/// Returns `Error::UnknownBook` if the target doesn't normalize,
/// or errors from config reading/writing.
pub fn cmd_add(name: &str, book: &str) -> Result<(), error::Error> {
    let Some(key) = books::normalize(book) else {
        return Err(error::Error::UnknownBook { name: book.to_string() });
    };

    let root = PathBuf::from(".");
    add_to_config(&root, name, key.abbrev())?;
    println!("Added alias: {name} -> {}", key.abbrev());
    Ok(())
}

/// List all configured aliases, sorted alphabetically.
///
/// # Errors
///
/// Returns errors from config loading.
pub fn cmd_list() -> Result<(), error::Error> {
    let root = PathBuf::from(".");
    let config = config::Config::load(&root)?;

    if config.aliases.is_empty() {
        println!("No aliases configured.");
        return Ok(());
    }

    let mut sorted: Vec<_> = config.aliases.iter().collect();
    sorted.sort_by_key(|(name, _)| name.as_str());
    for (name, book) in sorted {
        println!("{name} -> {book}");
    }

    Ok(())
}

/// Remove an alias from the config file.
///
/// # Errors
///
/// Returns `Error::UnknownAlias` if the name isn't configured,
/// or errors from config reading/writing.
pub fn cmd_remove(name: &str) -> Result<(), error::Error> {
    let root = PathBuf::from(".");
    remove_from_config(&root, name)?;
    println!("Removed alias: {name}");
    Ok(())
}

// ── Config file editing ───────────────────────────────────────────────

/// Add an alias mapping to `.verseref.toml`.
/// Creates the `[aliases]` table if it doesn't exist.
///
/// # Errors
///
/// Returns `Error::ConfigParse` if the config can't be parsed,
/// or `Error::Io` if writing fails.
fn add_to_config(root: &Path, name: &str, abbrev: &str) -> Result<(), error::Error> {
    let (config_path, mut doc) = read_config_doc(root)?;

    if !doc.contains_key("aliases") {
        doc["aliases"] = toml_edit::Item::Table(toml_edit::Table::new());
    }

    doc["aliases"][name] = toml_edit::value(abbrev);

    std::fs::write(&config_path, doc.to_string())?;
    Ok(())
}

/// Parse a `.verseref.toml` into a format-preserving document.
/// Returns an empty document if the file doesn't exist.
///
/// # Errors
///
/// Returns `Error::Io` on read failure or `Error::ConfigParse` on parse
/// failure.
fn read_config_doc(root: &Path) -> Result<(PathBuf, toml_edit::DocumentMut), error::Error> {
    let config_path = root.join(".verseref.toml");
    let content = match std::fs::read_to_string(&config_path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(error::Error::Io(e)),
    };

    let doc: toml_edit::DocumentMut = content.parse().map_err(|e: toml_edit::TomlError| {
        error::Error::ConfigParse {
            file: config_path.clone(),
            reason: e.to_string(),
        }
    })?;

    Ok((config_path, doc))
}

/// Remove an alias key from `.verseref.toml`.
///
/// # Errors
///
/// Returns `Error::UnknownAlias` if the name isn't found.
fn remove_from_config(root: &Path, name: &str) -> Result<(), error::Error> {
    let (config_path, mut doc) = read_config_doc(root)?;

    let aliases = doc
        .get_mut("aliases")
        .and_then(toml_edit::Item::as_table_mut)
        .ok_or_else(|| error::Error::UnknownAlias {
            name: name.to_string(),
        })?;

    if aliases.remove(name).is_none() {
        return Err(error::Error::UnknownAlias {
            name: name.to_string(),
        });
    }

    std::fs::write(&config_path, doc.to_string())?;
    Ok(())
}

/// Crate-level error types for verseref diagnostics.
use std::path::PathBuf;

/// All errors carry enough context to produce a useful diagnostic without
/// a debugger. Each variant names the file, name, or reason for failure.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Config file exists but cannot be parsed as TOML (format-preserving
    /// edit path).
    #[error("config parse failed: {}: {reason}", file.display())]
    ConfigParse {
        /// Path to the config file.
        file: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// An outline document does not exist on disk.
    #[error("document not found: {}", path.display())]
    DocumentNotFound {
        /// Path to the missing document.
        path: PathBuf,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// Verse store file exists but cannot be parsed.
    #[error("verse store corrupt: {}: {reason}", path.display())]
    StoreCorrupt {
        /// Path to the corrupt store file.
        path: PathBuf,
        /// Description of the corruption.
        reason: String,
    },

    /// Expected verse store file does not exist on disk.
    #[error("verse store not found: {}", path.display())]
    StoreNotFound {
        /// Path to the missing store file.
        path: PathBuf,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// No configured alias matches the given name.
    #[error("unknown alias: `{name}`")]
    UnknownAlias {
        /// Alias name that was not found.
        name: String,
    },

    /// A configured alias targets a name that is not a canonical book.
    #[error("unknown book: `{name}`")]
    UnknownBook {
        /// The unrecognized book name.
        name: String,
    },

    /// The configured matcher engine name is not recognized.
    #[error("unknown matcher engine: `{name}`")]
    UnknownEngine {
        /// Engine name from the config.
        name: String,
    },

    /// The filesystem watcher could not be set up.
    #[error("watch failed: {reason}")]
    WatchFailed {
        /// Description of the watcher failure.
        reason: String,
    },
}

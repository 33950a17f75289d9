use std::path::{Path, PathBuf};

use crate::books::{self, BookKey, Lexicon};
use crate::error::Error;
use crate::matcher::{GrammarMatcher, Matcher};
use crate::resolver::ResolutionPolicy;

/// The one matcher engine shipped today. Alternates implement the same
/// `Matcher` contract and are selected here by name.
const ENGINE_GRAMMAR: &str = "grammar";

/// Project configuration loaded from `.verseref.toml`.
/// Include/exclude patterns are path prefixes applied to outline files
/// during batch scans.
pub struct Config {
    /// Custom book aliases: alias spelling → any recognizable book name.
    pub aliases: Vec<(String, String)>,
    /// Prefer a more recent chapter-only mention over the last full
    /// reference when resolving bare citations.
    pub chapter_hint_first: bool,
    /// Matcher engine name.
    pub engine: String,
    exclude: Vec<String>,
    include: Vec<String>,
    /// Path to the verse store file, relative to the root.
    pub store_path: PathBuf,
}

/// Raw TOML structure for `.verseref.toml`.
#[derive(serde::Deserialize, Default)]
struct VerserefTomlConfig {
    #[serde(default)]
    aliases: std::collections::BTreeMap<String, String>,
    #[serde(default)]
    batch: BatchSection,
    #[serde(default)]
    detection: DetectionSection,
    #[serde(default)]
    store: StoreSection,
}

/// Raw `[batch]` section.
#[derive(serde::Deserialize, Default)]
struct BatchSection {
    #[serde(default)]
    exclude: Vec<String>,
    #[serde(default)]
    include: Vec<String>,
}

/// Raw `[detection]` section.
#[derive(serde::Deserialize)]
struct DetectionSection {
    #[serde(default = "default_chapter_hint_first")]
    chapter_hint_first: bool,
    #[serde(default = "default_engine")]
    engine: String,
}

impl Default for DetectionSection {
    fn default() -> Self {
        Self {
            chapter_hint_first: default_chapter_hint_first(),
            engine: default_engine(),
        }
    }
}

/// Raw `[store]` section.
#[derive(serde::Deserialize)]
struct StoreSection {
    #[serde(default = "default_store_path")]
    path: PathBuf,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self { path: default_store_path() }
    }
}

fn default_chapter_hint_first() -> bool {
    true
}

fn default_engine() -> String {
    ENGINE_GRAMMAR.to_string()
}

fn default_store_path() -> PathBuf {
    PathBuf::from("verses.json")
}

impl Config {
    /// Build the lexicon from the static table plus configured aliases.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownBook` if an alias targets a name that does
    /// not normalize to a canonical book.
    pub fn build_lexicon(&self) -> Result<Lexicon, Error> {
        if self.aliases.is_empty() {
            return Ok(Lexicon::new());
        }
        let mut pairs: Vec<(String, BookKey)> = Vec::with_capacity(self.aliases.len());
        for (alias, target) in &self.aliases {
            let Some(key) = books::normalize(target) else {
                return Err(Error::UnknownBook { name: target.clone() });
            };
            pairs.push((alias.clone(), key));
        }
        Ok(Lexicon::with_aliases(&pairs))
    }

    /// Construct the configured matcher engine.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownEngine` for an unrecognized engine name,
    /// or `Error::UnknownBook` from lexicon construction.
    pub fn build_matcher(&self) -> Result<Box<dyn Matcher>, Error> {
        if self.engine != ENGINE_GRAMMAR {
            return Err(Error::UnknownEngine { name: self.engine.clone() });
        }
        Ok(Box::new(GrammarMatcher::new(self.build_lexicon()?)))
    }

    /// Load config from `.verseref.toml` in the given root directory.
    /// Returns defaults if the file doesn't exist. Returns an error if
    /// the file exists but is malformed — never silently falls back to
    /// defaults when the user wrote a config file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(".verseref.toml");
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::from_raw(VerserefTomlConfig::default()));
            },
            Err(e) => return Err(Error::Io(e)),
        };

        let raw: VerserefTomlConfig = toml::from_str(&content)?;
        Ok(Self::from_raw(raw))
    }

    /// The resolution policy selected by this config.
    pub fn policy(&self) -> ResolutionPolicy {
        ResolutionPolicy { chapter_hint_first: self.chapter_hint_first }
    }

    /// Check whether an outline file path should be scanned in batch mode.
    ///
    /// A path is included if no include patterns are set (scan everything),
    /// or if the path starts with at least one include pattern.
    /// An included path is then excluded if it starts with any exclude
    /// pattern.
    pub fn should_scan(&self, relative_path: &str) -> bool {
        let included = self.include.is_empty()
            || self.include.iter().any(|p| relative_path.starts_with(p.as_str()));

        if !included {
            return false;
        }

        !self.exclude.iter().any(|p| relative_path.starts_with(p.as_str()))
    }

    /// Fold the raw TOML sections into the runtime shape.
    fn from_raw(raw: VerserefTomlConfig) -> Self {
        Self {
            aliases: raw.aliases.into_iter().collect(),
            chapter_hint_first: raw.detection.chapter_hint_first,
            engine: raw.detection.engine,
            exclude: raw.batch.exclude,
            include: raw.batch.include,
            store_path: raw.store.path,
        }
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Config {
        let raw: VerserefTomlConfig = toml::from_str(content).unwrap();
        Config::from_raw(raw)
    }

    #[test]
    fn alias_to_unknown_book_is_rejected() {
        let config = parse("[aliases]\nxyz = \"Hezekiah\"\n");
        assert!(matches!(config.build_lexicon(), Err(Error::UnknownBook { .. })));
    }

    #[test]
    fn aliases_feed_the_lexicon() {
        let config = parse("[aliases]\n\"S.S\" = \"Song of Songs\"\n");
        let lexicon = config.build_lexicon().unwrap();
        assert_eq!(lexicon.resolve("S.S."), books::normalize("Song"));
    }

    #[test]
    fn defaults_when_sections_absent() {
        let config = parse("");
        assert_eq!(config.engine, "grammar");
        assert!(config.chapter_hint_first);
        assert_eq!(config.store_path, PathBuf::from("verses.json"));
        assert!(config.should_scan("anything/outline.txt"));
    }

    #[test]
    fn include_exclude_prefixes() {
        let config = parse("[batch]\ninclude = [\"outlines/\"]\nexclude = [\"outlines/drafts/\"]\n");
        assert!(config.should_scan("outlines/w24.txt"));
        assert!(!config.should_scan("notes/w24.txt"));
        assert!(!config.should_scan("outlines/drafts/w24.txt"));
    }

    #[test]
    fn unknown_engine_is_rejected() {
        let config = parse("[detection]\nengine = \"llm\"\n");
        assert!(matches!(config.build_matcher(), Err(Error::UnknownEngine { .. })));
    }
}

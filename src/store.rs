//! Verse text storage: the store contract, the bundled JSON-file
//! implementation, and the batch lookup adapter.

use std::collections::HashMap;
use std::path::Path;

use crate::books::{self, BookKey};
use crate::error::Error;
use crate::types::{CanonicalRef, ResolvedReference};

/// External verse text source, keyed by (book, chapter, verse).
/// `Ok(None)` is a miss — the verse is simply absent from the store.
/// `Err` is a store-level failure the adapter may retry once.
pub trait VerseTextStore {
    /// Look up the text of a single verse.
    ///
    /// # Errors
    ///
    /// Returns a store-specific error on lookup failure (not on a miss).
    fn get(&self, book: BookKey, chapter: u32, verse: u32) -> Result<Option<String>, Error>;
}

/// One atomic verse with whatever text the store had for it. Absent text
/// never invalidates the reference it came from.
#[derive(Debug, serde::Serialize)]
pub struct VerseText {
    /// The verse this text belongs to.
    pub canonical: CanonicalRef,
    /// The literal verse text, absent on a store miss.
    pub text: Option<String>,
}

/// File-backed store: a JSON object of book abbreviation → chapter →
/// verse → text, loaded once and held in memory. One open handle serves
/// any number of lookups.
#[derive(Debug)]
pub struct JsonVerseStore {
    /// All verses, keyed for direct lookup.
    verses: HashMap<(BookKey, u32, u32), String>,
}

/// On-disk shape of the store file.
type StoreFile = HashMap<String, HashMap<String, HashMap<String, String>>>;

impl JsonVerseStore {
    /// Number of verses loaded.
    pub fn len(&self) -> usize {
        return self.verses.len();
    }

    /// Whether the store holds no verses at all.
    pub fn is_empty(&self) -> bool {
        return self.verses.is_empty();
    }

    /// Load a store file from disk.
    ///
    /// # Errors
    ///
    /// Returns `Error::StoreNotFound` if the file doesn't exist,
    /// `Error::Io` for other read failures, or `Error::StoreCorrupt`
    /// if the JSON doesn't parse. Entries under unrecognized book names
    /// are skipped with a warning rather than failing the whole load.
    pub fn open(path: &Path) -> Result<Self, Error> {
        let content = match std::fs::read_to_string(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::StoreNotFound { path: path.to_path_buf() });
            },
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };

        let parsed: StoreFile = serde_json::from_str(&content).map_err(|e| {
            return Error::StoreCorrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            };
        })?;

        let mut verses = HashMap::new();
        for (book_name, chapters) in parsed {
            let Some(book) = books::normalize(&book_name) else {
                eprintln!("warn: skipping unknown book \"{book_name}\" in store");
                continue;
            };
            collect_book_verses(book, &chapters, &mut verses);
        }

        return Ok(Self { verses });
    }
}

impl VerseTextStore for JsonVerseStore {
    fn get(&self, book: BookKey, chapter: u32, verse: u32) -> Result<Option<String>, Error> {
        return Ok(self.verses.get(&(book, chapter, verse)).cloned());
    }
}

/// Flatten one book's chapter/verse maps into the lookup table.
/// Non-numeric chapter or verse keys are skipped with a warning.
fn collect_book_verses(
    book: BookKey,
    chapters: &HashMap<String, HashMap<String, String>>,
    verses: &mut HashMap<(BookKey, u32, u32), String>,
) {
    for (chapter_key, chapter_verses) in chapters {
        let Ok(chapter) = chapter_key.parse::<u32>() else {
            eprintln!("warn: skipping non-numeric chapter \"{chapter_key}\" under {book}");
            continue;
        };
        for (verse_key, text) in chapter_verses {
            let Ok(verse) = verse_key.parse::<u32>() else {
                eprintln!("warn: skipping non-numeric verse \"{verse_key}\" under {book} {chapter}");
                continue;
            };
            verses.insert((book, chapter, verse), text.clone());
        }
    }
    return;
}

/// Look up the text of every atomic verse in a resolved reference.
/// A store failure is retried once; a second failure is recorded as a
/// miss with a warning. Misses never remove the reference from output.
pub fn lookup_reference(
    reference: &ResolvedReference,
    store: &dyn VerseTextStore,
) -> Vec<VerseText> {
    let book = reference.canonical.book;
    let chapter = reference.canonical.chapter;

    return reference
        .atomic_verses()
        .into_iter()
        .filter_map(|verse| {
            let canonical = CanonicalRef::new(book, chapter, verse, None)?;
            let text = get_with_retry(store, book, chapter, verse);
            if text.is_none() {
                eprintln!("warn: no verse text for {canonical}");
            }
            return Some(VerseText { canonical, text });
        })
        .collect();
}

/// One lookup with a single bounded retry on a transient store failure.
fn get_with_retry(
    store: &dyn VerseTextStore,
    book: BookKey,
    chapter: u32,
    verse: u32,
) -> Option<String> {
    for _attempt in 0..2 {
        match store.get(book, chapter, verse) {
            Ok(text) => return text,
            Err(_e) => {},
        }
    }
    return None;
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use std::io::Write as _;

    use crate::types::{CanonicalRef, MatchForm, ResolutionBasis, VerseSpan};

    fn sample_store() -> JsonVerseStore {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = r#"{
            "Eph": {
                "4": {
                    "7": "But to each one of us grace was given...",
                    "8": "Therefore He says, Having ascended..."
                }
            }
        }"#;
        file.write_all(json.as_bytes()).unwrap();
        JsonVerseStore::open(file.path()).unwrap()
    }

    fn eph_reference(spans: &[(u32, u32)]) -> ResolvedReference {
        let book = crate::books::normalize("Eph").unwrap();
        let spans: Vec<VerseSpan> =
            spans.iter().map(|&(s, e)| VerseSpan::new(s, e).unwrap()).collect();
        ResolvedReference {
            basis: ResolutionBasis::Direct,
            canonical: CanonicalRef::new(book, 4, spans[0].start, Some(spans[0].end)).unwrap(),
            confidence: 1.0,
            form: MatchForm::Range,
            original_text: "Eph. 4:7-9".to_string(),
            spans,
            unit_id: 0,
        }
    }

    #[test]
    fn hits_and_misses_coexist() {
        let store = sample_store();
        let texts = lookup_reference(&eph_reference(&[(7, 9)]), &store);
        assert_eq!(texts.len(), 3);
        assert!(texts[0].text.is_some());
        assert!(texts[1].text.is_some());
        // Verse 9 is not in the store: a miss, not an error.
        assert!(texts[2].text.is_none());
    }

    #[test]
    fn missing_file_is_store_not_found() {
        let err = JsonVerseStore::open(Path::new("no/such/verses.json")).unwrap_err();
        assert!(matches!(err, Error::StoreNotFound { .. }));
    }

    #[test]
    fn malformed_json_is_store_corrupt() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{not json").unwrap();
        let err = JsonVerseStore::open(file.path()).unwrap_err();
        assert!(matches!(err, Error::StoreCorrupt { .. }));
    }

    #[test]
    fn unknown_books_are_skipped_not_fatal() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = r#"{"Hezekiah": {"1": {"1": "no such book"}}, "Rom": {"5": {"2": "text"}}}"#;
        file.write_all(json.as_bytes()).unwrap();
        let store = JsonVerseStore::open(file.path()).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn store_lookup_by_key() {
        let store = sample_store();
        let eph = crate::books::normalize("Eph").unwrap();
        assert!(store.get(eph, 4, 7).unwrap().is_some());
        assert!(store.get(eph, 5, 1).unwrap().is_none());
    }
}

/// Canonical book table and book-name normalization.
use serde::Serialize;

/// One canonical book: display abbreviation, full name, and the folded
/// synonym spellings accepted for it (see `fold` for the folding rules).
struct BookSpec {
    abbrev: &'static str,
    full: &'static str,
    synonyms: &'static [&'static str],
}

/// The 66 canonical books in canon order. Synonyms are stored pre-folded:
/// lowercase, no periods, no interior whitespace, ordinal words and Roman
/// numerals already mapped to digits.
static BOOKS: [BookSpec; 66] = [
    BookSpec { abbrev: "Gen", full: "Genesis", synonyms: &["ge", "gn"] },
    BookSpec { abbrev: "Exo", full: "Exodus", synonyms: &["ex", "exod"] },
    BookSpec { abbrev: "Lev", full: "Leviticus", synonyms: &["le", "lv"] },
    BookSpec { abbrev: "Num", full: "Numbers", synonyms: &["nu", "nm", "numb"] },
    BookSpec { abbrev: "Deut", full: "Deuteronomy", synonyms: &["deu", "dt"] },
    BookSpec { abbrev: "Josh", full: "Joshua", synonyms: &["jos"] },
    BookSpec { abbrev: "Judg", full: "Judges", synonyms: &["jdg", "jdgs"] },
    BookSpec { abbrev: "Ruth", full: "Ruth", synonyms: &["ru"] },
    BookSpec { abbrev: "1 Sam", full: "1 Samuel", synonyms: &["1sa"] },
    BookSpec { abbrev: "2 Sam", full: "2 Samuel", synonyms: &["2sa"] },
    BookSpec { abbrev: "1 Kings", full: "1 Kings", synonyms: &["1ki", "1kgs", "1king"] },
    BookSpec { abbrev: "2 Kings", full: "2 Kings", synonyms: &["2ki", "2kgs", "2king"] },
    BookSpec { abbrev: "1 Chron", full: "1 Chronicles", synonyms: &["1chr", "1ch"] },
    BookSpec { abbrev: "2 Chron", full: "2 Chronicles", synonyms: &["2chr", "2ch"] },
    BookSpec { abbrev: "Ezra", full: "Ezra", synonyms: &["ezr"] },
    BookSpec { abbrev: "Neh", full: "Nehemiah", synonyms: &["ne"] },
    BookSpec { abbrev: "Esth", full: "Esther", synonyms: &["es", "est"] },
    BookSpec { abbrev: "Job", full: "Job", synonyms: &[] },
    BookSpec { abbrev: "Psa", full: "Psalms", synonyms: &["ps", "psalm", "pss", "psm"] },
    BookSpec { abbrev: "Prov", full: "Proverbs", synonyms: &["pro", "pr", "prv"] },
    BookSpec { abbrev: "Eccl", full: "Ecclesiastes", synonyms: &["ecc", "ec"] },
    BookSpec {
        abbrev: "Song",
        full: "Song of Songs",
        synonyms: &["sos", "ss", "songofsolomon", "canticles"],
    },
    BookSpec { abbrev: "Isa", full: "Isaiah", synonyms: &["is"] },
    BookSpec { abbrev: "Jer", full: "Jeremiah", synonyms: &["je"] },
    BookSpec { abbrev: "Lam", full: "Lamentations", synonyms: &["la"] },
    BookSpec { abbrev: "Ezek", full: "Ezekiel", synonyms: &["eze", "ezk"] },
    BookSpec { abbrev: "Dan", full: "Daniel", synonyms: &["da", "dn"] },
    BookSpec { abbrev: "Hos", full: "Hosea", synonyms: &["ho"] },
    BookSpec { abbrev: "Joel", full: "Joel", synonyms: &["joe", "jl"] },
    BookSpec { abbrev: "Amos", full: "Amos", synonyms: &["am"] },
    BookSpec { abbrev: "Obad", full: "Obadiah", synonyms: &["ob", "oba"] },
    BookSpec { abbrev: "Jonah", full: "Jonah", synonyms: &["jon", "jnh"] },
    BookSpec { abbrev: "Micah", full: "Micah", synonyms: &["mic", "mi"] },
    BookSpec { abbrev: "Nah", full: "Nahum", synonyms: &["na"] },
    BookSpec { abbrev: "Hab", full: "Habakkuk", synonyms: &["hb"] },
    BookSpec { abbrev: "Zeph", full: "Zephaniah", synonyms: &["zep", "zp"] },
    BookSpec { abbrev: "Hag", full: "Haggai", synonyms: &["hg"] },
    BookSpec { abbrev: "Zech", full: "Zechariah", synonyms: &["zec", "zc"] },
    BookSpec { abbrev: "Mal", full: "Malachi", synonyms: &["ml"] },
    BookSpec { abbrev: "Matt", full: "Matthew", synonyms: &["mt", "mat"] },
    BookSpec { abbrev: "Mark", full: "Mark", synonyms: &["mk", "mrk"] },
    BookSpec { abbrev: "Luke", full: "Luke", synonyms: &["lk", "luk"] },
    BookSpec { abbrev: "John", full: "John", synonyms: &["jn", "joh"] },
    BookSpec { abbrev: "Acts", full: "Acts", synonyms: &["ac", "act"] },
    BookSpec { abbrev: "Rom", full: "Romans", synonyms: &["ro", "rm"] },
    BookSpec { abbrev: "1 Cor", full: "1 Corinthians", synonyms: &["1co"] },
    BookSpec { abbrev: "2 Cor", full: "2 Corinthians", synonyms: &["2co"] },
    BookSpec { abbrev: "Gal", full: "Galatians", synonyms: &["ga"] },
    BookSpec { abbrev: "Eph", full: "Ephesians", synonyms: &["ep"] },
    BookSpec { abbrev: "Phil", full: "Philippians", synonyms: &["php", "phi"] },
    BookSpec { abbrev: "Col", full: "Colossians", synonyms: &["cl"] },
    BookSpec { abbrev: "1 Thes", full: "1 Thessalonians", synonyms: &["1th", "1thess"] },
    BookSpec { abbrev: "2 Thes", full: "2 Thessalonians", synonyms: &["2th", "2thess"] },
    BookSpec { abbrev: "1 Tim", full: "1 Timothy", synonyms: &["1ti"] },
    BookSpec { abbrev: "2 Tim", full: "2 Timothy", synonyms: &["2ti"] },
    BookSpec { abbrev: "Titus", full: "Titus", synonyms: &["tit"] },
    BookSpec { abbrev: "Philem", full: "Philemon", synonyms: &["phm", "phlm"] },
    BookSpec { abbrev: "Heb", full: "Hebrews", synonyms: &["hebr"] },
    BookSpec { abbrev: "James", full: "James", synonyms: &["jas", "jam"] },
    BookSpec { abbrev: "1 Pet", full: "1 Peter", synonyms: &["1pe", "1pt"] },
    BookSpec { abbrev: "2 Pet", full: "2 Peter", synonyms: &["2pe", "2pt"] },
    BookSpec { abbrev: "1 John", full: "1 John", synonyms: &["1jn", "1jo"] },
    BookSpec { abbrev: "2 John", full: "2 John", synonyms: &["2jn", "2jo"] },
    BookSpec { abbrev: "3 John", full: "3 John", synonyms: &["3jn", "3jo"] },
    BookSpec { abbrev: "Jude", full: "Jude", synonyms: &["jud"] },
    BookSpec { abbrev: "Rev", full: "Revelation", synonyms: &["re", "rv", "apoc"] },
];

/// Index into the canonical book table. Constructed only through
/// `normalize` or `Lexicon::resolve`, so every value names a real book.
/// The newtype prevents mixing with arbitrary strings or indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BookKey(usize);

impl BookKey {
    /// The canonical display abbreviation, e.g. "Rom" or "1 Cor".
    pub fn abbrev(self) -> &'static str {
        BOOKS[self.0].abbrev
    }

    /// The abbreviation as it appears in a citation: a trailing period
    /// when the abbreviation shortens the full name ("Rom."), none when
    /// the book name is unabbreviated ("Ruth", "Acts").
    pub fn cited(self) -> String {
        let spec = &BOOKS[self.0];
        if spec.abbrev == spec.full {
            spec.abbrev.to_string()
        } else {
            format!("{}.", spec.abbrev)
        }
    }

    /// The full book name, e.g. "Romans" or "1 Corinthians".
    pub fn full_name(self) -> &'static str {
        BOOKS[self.0].full
    }
}

impl std::fmt::Display for BookKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.abbrev())
    }
}

impl Serialize for BookKey {
    /// Serialize as the canonical abbreviation string.
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.abbrev())
    }
}

/// The static book table plus user-configured aliases. Aliases are
/// consulted first, then the canonical table.
#[derive(Debug, Default)]
pub struct Lexicon {
    /// Folded alias spelling → canonical key.
    aliases: Vec<(String, BookKey)>,
}

impl Lexicon {
    /// Lexicon with no custom aliases — canonical table only.
    pub fn new() -> Self {
        Self { aliases: Vec::new() }
    }

    /// Lexicon with custom aliases. Each pair is (alias spelling, any
    /// recognizable book name); the caller has already validated that the
    /// targets normalize.
    pub fn with_aliases(pairs: &[(String, BookKey)]) -> Self {
        let aliases = pairs
            .iter()
            .map(|(name, key)| (fold(name), *key))
            .collect();
        Self { aliases }
    }

    /// Resolve a raw book token: custom aliases first, then the canonical
    /// table. Returns `None` for anything unrecognized.
    pub fn resolve(&self, raw: &str) -> Option<BookKey> {
        let folded = fold(raw);
        if folded.is_empty() {
            return None;
        }
        self.aliases
            .iter()
            .find(|(alias, _)| *alias == folded)
            .map(|(_, key)| *key)
            .or_else(|| lookup(&folded))
    }
}

/// Fold a raw book token into lookup form: trim, drop a trailing period,
/// lowercase, map a leading ordinal ("I", "II", "III", "First", "Second",
/// "Third") to its digit, and join the remaining tokens without spaces.
/// "1 Cor.", "First Corinthians", and "I Corinthians" all fold to forms
/// that resolve to the same key.
fn fold(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('.');
    let lowered = trimmed.to_lowercase();
    let mut tokens = lowered.split_whitespace();

    let Some(first) = tokens.next() else {
        return String::new();
    };
    let first = match first {
        "first" | "i" => "1",
        "second" | "ii" => "2",
        "third" | "iii" => "3",
        other => other,
    };

    let mut folded = String::with_capacity(lowered.len());
    folded.push_str(first);
    for token in tokens {
        folded.push_str(token);
    }
    folded
}

/// Find a folded spelling in the canonical table.
fn lookup(folded: &str) -> Option<BookKey> {
    BOOKS.iter().enumerate().find_map(|(index, spec)| {
        let matches = fold(spec.abbrev) == folded
            || fold(spec.full) == folded
            || spec.synonyms.contains(&folded);
        matches.then_some(BookKey(index))
    })
}

/// Normalize a raw book name to its canonical key. Accepts leading Arabic
/// and Roman numerals and ordinal words, trailing periods, any casing, and
/// interior whitespace variation. Returns `None` for unrecognized strings;
/// a capitalized prose word ("According") is a non-match, not an error.
/// Pure function over the static table.
pub fn normalize(raw: &str) -> Option<BookKey> {
    let folded = fold(raw);
    if folded.is_empty() {
        return None;
    }
    lookup(&folded)
}

/// Iterate all 66 canonical keys in canon order.
pub fn all() -> impl Iterator<Item = BookKey> {
    (0..BOOKS.len()).map(BookKey)
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    #[test]
    fn all_spellings_of_first_corinthians_agree() {
        let expected = normalize("1 Corinthians").unwrap();
        for raw in ["1 Cor", "1 Cor.", "1Cor", "First Corinthians", "I Corinthians", "1 co"] {
            assert_eq!(normalize(raw), Some(expected), "spelling: {raw}");
        }
        assert_eq!(expected.abbrev(), "1 Cor");
    }

    #[test]
    fn capitalized_prose_words_do_not_normalize() {
        for raw in ["According", "Therefore", "The", "Reading", "Christ"] {
            assert_eq!(normalize(raw), None, "word: {raw}");
        }
    }

    #[test]
    fn case_and_period_tolerance() {
        assert_eq!(normalize("ROM."), normalize("rom"));
        assert_eq!(normalize("Psalm"), normalize("Psa"));
        assert_eq!(normalize("psalms"), normalize("Psa"));
    }

    #[test]
    fn cited_form_appends_period_only_when_abbreviated() {
        assert_eq!(normalize("Romans").unwrap().cited(), "Rom.");
        assert_eq!(normalize("Ruth").unwrap().cited(), "Ruth");
        assert_eq!(normalize("Acts").unwrap().cited(), "Acts");
    }

    #[test]
    fn lexicon_aliases_shadow_nothing_but_add_spellings() {
        let song = normalize("Song of Songs").unwrap();
        let lexicon = Lexicon::with_aliases(&[("S.S".to_string(), song)]);
        assert_eq!(lexicon.resolve("S.S."), Some(song));
        // Canonical spellings still resolve through the same lexicon.
        assert_eq!(lexicon.resolve("Rom."), normalize("Romans"));
    }

    #[test]
    fn roman_numeral_prefixes() {
        assert_eq!(normalize("II Timothy"), normalize("2 Tim"));
        assert_eq!(normalize("III John"), normalize("3 John"));
        assert_eq!(normalize("I John"), normalize("1 John"));
    }

    #[test]
    fn round_trip_through_canonical_spellings() {
        for key in all() {
            assert_eq!(normalize(key.abbrev()), Some(key), "abbrev: {}", key.abbrev());
            assert_eq!(normalize(key.full_name()), Some(key), "full: {}", key.full_name());
        }
    }

    #[test]
    fn song_of_songs_spellings() {
        let song = normalize("Song of Songs").unwrap();
        assert_eq!(normalize("Song"), Some(song));
        assert_eq!(normalize("Song of Solomon"), Some(song));
        assert_eq!(normalize("SS"), Some(song));
    }

    #[test]
    fn table_has_sixty_six_books() {
        assert_eq!(all().count(), 66);
    }
}

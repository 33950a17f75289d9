/// Core domain types for verse references, matches, and detection output.
use serde::Serialize;

use crate::books::BookKey;

/// A fully qualified verse reference. Invariants (chapter ≥ 1,
/// verse_start ≥ 1, verse_end ≥ verse_start) hold by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CanonicalRef {
    /// Canonical book identifier.
    pub book: BookKey,
    /// One-based chapter number.
    pub chapter: u32,
    /// Inclusive end verse, absent when the reference names a single verse
    /// or a whole chapter.
    pub verse_end: Option<u32>,
    /// One-based first verse. For whole-chapter references this is 1.
    pub verse_start: u32,
}

impl CanonicalRef {
    /// Build a canonical reference, validating the invariants.
    /// Returns `None` for chapter 0, verse 0, or an inverted range.
    pub fn new(
        book: BookKey,
        chapter: u32,
        verse_start: u32,
        verse_end: Option<u32>,
    ) -> Option<Self> {
        if chapter == 0 || verse_start == 0 {
            return None;
        }
        if verse_end.is_some_and(|end| end < verse_start) {
            return None;
        }
        Some(Self { book, chapter, verse_end, verse_start })
    }
}

impl std::fmt::Display for CanonicalRef {
    /// Render as cited text, e.g. `Eph. 4:7-16` or `Luke 7:50`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}:{}", self.book.cited(), self.chapter, self.verse_start)?;
        match self.verse_end {
            Some(end) if end != self.verse_start => write!(f, "-{end}"),
            _ => Ok(()),
        }
    }
}

/// Everything the core produces for one document: resolved references in
/// document order, the unresolved side list, and summary counts.
#[derive(Debug, Serialize)]
pub struct Detection {
    /// Fully resolved references, deduplicated, in document order.
    pub references: Vec<ResolvedReference>,
    /// Summary counts over the reference list.
    pub stats: DetectionStats,
    /// Bare verse matches that no context source could qualify.
    pub unresolved: Vec<RawMatch>,
}

/// Summary counts for one document's detection pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DetectionStats {
    /// Number of resolved reference occurrences (after deduplication).
    pub total_occurrences: usize,
    /// Distinct underlying (book, chapter, verse) triples across all
    /// resolved references.
    pub unique_verses: usize,
    /// Number of matches left unresolved.
    pub unresolved_count: usize,
}

/// The grammatical form a raw match was recognized as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchForm {
    /// A book name followed by a bare chapter number ("Luke 7").
    ChapterOnly,
    /// A reference introduced by "cf." outside parentheses.
    CfPrefixed,
    /// A fully qualified single-verse reference ("Rom. 5:1").
    Full,
    /// A reference with a comma-separated verse list ("Rom. 16:1, 4-5").
    List,
    /// A reference enclosed in parentheses, with or without "cf." inside.
    Parenthetical,
    /// A fully qualified verse range ("Rom. 5:1-11").
    Range,
    /// A bare "v."/"vv." citation lacking book and chapter.
    VerseOnly,
}

impl MatchForm {
    /// Short lowercase label for text output.
    pub fn label(self) -> &'static str {
        match self {
            MatchForm::ChapterOnly => "chapter",
            MatchForm::CfPrefixed => "cf",
            MatchForm::Full => "full",
            MatchForm::List => "list",
            MatchForm::Parenthetical => "paren",
            MatchForm::Range => "range",
            MatchForm::VerseOnly => "verse-only",
        }
    }
}

/// One span recognized by the grammar matcher, with the payload the
/// resolver needs. Immutable; ordered by (unit, start offset).
#[derive(Debug, Clone, Serialize)]
pub struct RawMatch {
    /// Book named in the span, absent for bare verse citations.
    pub book: Option<BookKey>,
    /// Chapter named in the span, absent for bare verse citations.
    pub chapter: Option<u32>,
    /// Byte offset one past the end of the span within the unit text.
    pub end_offset: usize,
    /// The grammatical form this span was recognized as.
    pub form: MatchForm,
    /// The matched text, verbatim (letter suffixes like "6a" included).
    pub span_text: String,
    /// Byte offset of the span start within the unit text.
    pub start_offset: usize,
    /// Identifier of the unit the span was found in.
    pub unit_id: u32,
    /// Parsed verse groups, empty for chapter-only mentions.
    pub verses: Vec<VerseSpan>,
}

impl RawMatch {
    /// Covering verse span: minimum start to maximum end across all groups.
    /// `None` when the match carries no verse groups.
    pub fn covering_span(&self) -> Option<VerseSpan> {
        let start = self.verses.iter().map(|s| s.start).min()?;
        let end = self.verses.iter().map(|s| s.end).max()?;
        Some(VerseSpan { end, start })
    }
}

/// Which context source supplied the book/chapter for a resolved reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionBasis {
    /// A nearby chapter-only mention supplied the chapter.
    ChapterHint,
    /// The match was fully qualified on its own.
    Direct,
    /// The most recent fully qualified reference supplied book and chapter.
    LastFullRef,
    /// The document's Scripture Reading anchor supplied book and chapter.
    ScriptureReading,
}

impl ResolutionBasis {
    /// Short lowercase label for text output.
    pub fn label(self) -> &'static str {
        match self {
            ResolutionBasis::ChapterHint => "chapter-hint",
            ResolutionBasis::Direct => "direct",
            ResolutionBasis::LastFullRef => "last-ref",
            ResolutionBasis::ScriptureReading => "reading",
        }
    }
}

/// A detected reference after context resolution. Immutable once created;
/// the ordered list of these is the core's primary output.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedReference {
    /// Context source that qualified this reference.
    pub basis: ResolutionBasis,
    /// Covering canonical reference (for lists, min start to max end).
    pub canonical: CanonicalRef,
    /// Detection confidence in [0, 1]. Reported, never thresholded on.
    pub confidence: f64,
    /// The grammatical form of the originating match.
    pub form: MatchForm,
    /// The cited text exactly as it appeared in the document.
    pub original_text: String,
    /// The verse groups making up this reference, in cited order.
    pub spans: Vec<VerseSpan>,
    /// Identifier of the unit the reference was found in.
    pub unit_id: u32,
}

impl ResolvedReference {
    /// Expand the verse groups into atomic verse numbers, in cited order.
    /// Empty for whole-chapter references.
    pub fn atomic_verses(&self) -> Vec<u32> {
        let mut verses = Vec::new();
        for span in &self.spans {
            verses.extend(span.start..=span.end);
        }
        verses
    }

    /// Render as cited text. Whole-chapter references print without a
    /// verse part ("Luke 7"); everything else delegates to the canonical.
    pub fn display(&self) -> String {
        if self.form == MatchForm::ChapterOnly {
            format!("{} {}", self.canonical.book.cited(), self.canonical.chapter)
        } else {
            self.canonical.to_string()
        }
    }
}

/// One structural unit of a document: a tagged line of text.
#[derive(Debug, Clone, Serialize)]
pub struct Unit {
    /// Position of the unit in the document, starting at 0.
    pub id: u32,
    /// Structural classification of the unit.
    pub tag: UnitTag,
    /// The unit's text, whitespace-trimmed.
    pub text: String,
}

impl Unit {
    /// Whether this unit is the document's Scripture Reading line, either
    /// by tag or by the literal-prefix fallback.
    pub fn is_scripture_reading(&self) -> bool {
        if self.tag == UnitTag::ScriptureReading {
            return true;
        }
        let len = 17.min(self.text.len());
        self.text.is_char_boundary(len)
            && self.text[..len].eq_ignore_ascii_case("scripture reading")
    }
}

/// Structural classification of a document unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitTag {
    /// A title or section heading.
    Heading,
    /// An outline point ("I.", "A.", "1.", "a.").
    OutlinePoint,
    /// Ordinary prose.
    Plain,
    /// The document's "Scripture Reading:" line.
    ScriptureReading,
}

/// An inclusive verse range within one chapter. A single verse is a span
/// with `end == start`. Invariant `end >= start` holds by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct VerseSpan {
    /// Inclusive last verse of the span.
    pub end: u32,
    /// One-based first verse of the span.
    pub start: u32,
}

impl VerseSpan {
    /// Build a span, validating that it is non-empty and not inverted.
    pub fn new(start: u32, end: u32) -> Option<Self> {
        if start == 0 || end < start {
            return None;
        }
        Some(Self { end, start })
    }

    /// Span covering a single verse.
    pub fn single(verse: u32) -> Option<Self> {
        Self::new(verse, verse)
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use crate::books;

    fn key(name: &str) -> BookKey {
        books::normalize(name).unwrap()
    }

    #[test]
    fn canonical_display_single_and_range() {
        let single = CanonicalRef::new(key("Luke"), 7, 50, None).unwrap();
        assert_eq!(single.to_string(), "Luke 7:50");
        let range = CanonicalRef::new(key("Eph"), 4, 7, Some(16)).unwrap();
        assert_eq!(range.to_string(), "Eph. 4:7-16");
    }

    #[test]
    fn canonical_rejects_inverted_range() {
        assert!(CanonicalRef::new(key("Rom"), 5, 11, Some(1)).is_none());
    }

    #[test]
    fn canonical_rejects_zero_chapter() {
        assert!(CanonicalRef::new(key("Rom"), 0, 1, None).is_none());
    }

    #[test]
    fn scripture_reading_fallback_is_case_insensitive() {
        let unit = Unit {
            id: 0,
            tag: UnitTag::Plain,
            text: "SCRIPTURE READING: Eph. 4:7-16".to_string(),
        };
        assert!(unit.is_scripture_reading());
    }

    #[test]
    fn verse_span_rejects_inversion() {
        assert!(VerseSpan::new(5, 4).is_none());
        assert_eq!(VerseSpan::new(4, 5), Some(VerseSpan { end: 5, start: 4 }));
    }
}

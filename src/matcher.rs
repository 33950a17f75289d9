/// Layered citation grammar over unit text.
///
/// Candidate spans are gathered from every pattern layer, then an overlap
/// sweep keeps the longest match at the earliest offset, so "Rom. 5:1-11"
/// is never partially matched as "Rom. 5:1" plus a stray "-11".
use regex::{Captures, Regex};

use crate::books::{BookKey, Lexicon};
use crate::types::{MatchForm, RawMatch, Unit, VerseSpan};

/// A book token candidate: optional ordinal prefix (Arabic, Roman, or
/// word form), a capitalized word, and the "of Songs/Solomon" tail.
/// Validation against the lexicon happens after the textual match.
const BOOK_PAT: &str = r"(?:(?:1|2|3|III|II|I|First|Second|Third)\s+)?[A-Z][a-zA-Z]+(?:\s+of\s+(?:Songs|Solomon))?";

/// A verse group list: numbers with optional letter suffixes, ranges, and
/// comma separators ("1", "4-5", "1, 4-5, 16, 20").
const VLIST_PAT: &str = r"\d+[a-z]?(?:\s*[-–]\s*\d+[a-z]?)?(?:\s*,\s*\d+[a-z]?(?:\s*[-–]\s*\d+[a-z]?)?)*";

/// Anything that can produce raw matches from a unit. The deterministic
/// grammar matcher is the default engine; alternates implement the same
/// contract and are selected through config. Engines are shared read-only
/// across batch workers, hence the thread bounds.
pub trait Matcher: Send + Sync {
    /// Scan one unit left to right and return its matches in span order.
    fn find_matches(&self, unit: &Unit) -> Vec<RawMatch>;
}

/// The deterministic regex-layered matcher. All patterns are compiled once
/// at construction.
pub struct GrammarMatcher {
    /// Book followed by a bare chapter number.
    chapter_only: Regex,
    /// "cf." prefixed reference outside parentheses.
    cf_prefixed: Regex,
    /// Book-less `chapter:verses` clause continuing a preceding reference.
    continuation: Regex,
    /// Fully qualified `Book chapter:verses` reference.
    full: Regex,
    /// Book table plus configured aliases.
    lexicon: Lexicon,
    /// Reference enclosed in parentheses.
    paren: Regex,
    /// Book-less clause on the Scripture Reading line.
    sr_clause: Regex,
    /// Bare "v."/"vv." citation.
    verse_only: Regex,
}

impl GrammarMatcher {
    /// Compile the pattern layers over the given lexicon.
    ///
    /// # Panics
    ///
    /// Panics if a hardcoded pattern is invalid (compile-time invariant).
    pub fn new(lexicon: Lexicon) -> Self {
        let full = format!(r"({BOOK_PAT})\.?\s+(\d+):({VLIST_PAT})");
        Self {
            chapter_only: Regex::new(&format!(r"({BOOK_PAT})\.?\s+(\d+)\b"))
                .expect("valid regex"),
            cf_prefixed: Regex::new(&format!(r"(?i:cf)\.\s*({BOOK_PAT})\.?\s+(\d+):({VLIST_PAT})"))
                .expect("valid regex"),
            continuation: Regex::new(&format!(r"^\s*;\s*(\d+):({VLIST_PAT})"))
                .expect("valid regex"),
            full: Regex::new(&full).expect("valid regex"),
            lexicon,
            paren: Regex::new(&format!(
                r"\(\s*(?:cf\.\s*)?({BOOK_PAT})\.?\s+(\d+):({VLIST_PAT})[^)]*\)"
            ))
            .expect("valid regex"),
            sr_clause: Regex::new(&format!(r"(\d+):({VLIST_PAT})")).expect("valid regex"),
            verse_only: Regex::new(&format!(r"\b(?:vv?\.|verses?)\s*({VLIST_PAT})"))
                .expect("valid regex"),
        }
    }

    /// Collect candidates from every layer of an ordinary unit.
    fn collect_candidates(&self, unit: &Unit) -> Vec<(u8, RawMatch)> {
        let text = unit.text.as_str();
        let mut candidates: Vec<(u8, RawMatch)> = Vec::new();

        for cap in self.paren.captures_iter(text) {
            if let Some(m) = self.qualified_candidate(&cap, Some(MatchForm::Parenthetical), unit.id, 0) {
                candidates.push((0, m));
            }
        }

        for cap in self.cf_prefixed.captures_iter(text) {
            if let Some(m) = self.qualified_candidate(&cap, Some(MatchForm::CfPrefixed), unit.id, 0) {
                candidates.push((1, m));
            }
        }

        for cap in self.full.captures_iter(text) {
            let Some(m) = self.qualified_candidate(&cap, None, unit.id, 0) else {
                continue;
            };
            let book = m.book;
            let end = m.end_offset;
            candidates.push((2, m));
            self.collect_continuations(text, end, book, unit.id, &mut candidates);
        }

        for cap in self.verse_only.captures_iter(text) {
            let Some(whole) = cap.get(0) else { continue };
            let Some(list) = cap.get(1) else { continue };
            let verses = parse_verse_list(list.as_str());
            if verses.is_empty() {
                continue;
            }
            candidates.push((3, RawMatch {
                book: None,
                chapter: None,
                end_offset: whole.end(),
                form: MatchForm::VerseOnly,
                span_text: whole.as_str().to_string(),
                start_offset: whole.start(),
                unit_id: unit.id,
                verses,
            }));
        }

        for cap in self.chapter_only.captures_iter(text) {
            let Some(whole) = cap.get(0) else { continue };
            let Some(book) = cap.get(1).and_then(|g| self.lexicon.resolve(g.as_str())) else {
                continue;
            };
            let Some(chapter) = cap.get(2).and_then(|g| g.as_str().parse::<u32>().ok()) else {
                continue;
            };
            if chapter == 0 {
                continue;
            }
            candidates.push((4, RawMatch {
                book: Some(book),
                chapter: Some(chapter),
                end_offset: whole.end(),
                form: MatchForm::ChapterOnly,
                span_text: whole.as_str().to_string(),
                start_offset: whole.start(),
                unit_id: unit.id,
                verses: Vec::new(),
            }));
        }

        candidates
    }

    /// Gather book-less `; chapter:verses` clauses that continue a
    /// qualified reference, inheriting its book.
    fn collect_continuations(
        &self,
        text: &str,
        mut at: usize,
        book: Option<BookKey>,
        unit_id: u32,
        candidates: &mut Vec<(u8, RawMatch)>,
    ) {
        while let Some(cap) = text.get(at..).and_then(|rest| self.continuation.captures(rest)) {
            let (Some(whole), Some(chapter_group), Some(list)) = (cap.get(0), cap.get(1), cap.get(2))
            else {
                return;
            };
            let Some(chapter) = chapter_group.as_str().parse::<u32>().ok().filter(|c| *c > 0)
            else {
                return;
            };
            let verses = parse_verse_list(list.as_str());
            if verses.is_empty() {
                return;
            }
            let start = at + chapter_group.start();
            let end = at + whole.end();
            candidates.push((2, RawMatch {
                book,
                chapter: Some(chapter),
                end_offset: end,
                form: classify_verses(&verses),
                span_text: text.get(start..end).unwrap_or_default().to_string(),
                start_offset: start,
                unit_id,
                verses,
            }));
            at = end;
        }
    }

    /// Build a qualified candidate from a (book, chapter, verse list)
    /// capture. Returns `None` when the book does not validate, the
    /// chapter is malformed, or no verse group survives parsing.
    fn qualified_candidate(
        &self,
        cap: &Captures<'_>,
        form: Option<MatchForm>,
        unit_id: u32,
        offset: usize,
    ) -> Option<RawMatch> {
        let whole = cap.get(0)?;
        let book = self.lexicon.resolve(cap.get(1)?.as_str())?;
        let chapter: u32 = cap.get(2)?.as_str().parse().ok()?;
        if chapter == 0 {
            return None;
        }
        let verses = parse_verse_list(cap.get(3)?.as_str());
        if verses.is_empty() {
            return None;
        }

        Some(RawMatch {
            book: Some(book),
            chapter: Some(chapter),
            end_offset: offset + whole.end(),
            form: form.unwrap_or_else(|| classify_verses(&verses)),
            span_text: whole.as_str().to_string(),
            start_offset: offset + whole.start(),
            unit_id,
            verses,
        })
    }

    /// Extract the semicolon-separated references of the Scripture Reading
    /// line. Book-less clauses inherit the book of the preceding clause
    /// ("Eph. 4:7-16; 6:10-20" yields two Ephesians references).
    fn scripture_reading_matches(&self, unit: &Unit) -> Vec<RawMatch> {
        let text = unit.text.as_str();
        let scan_from = scripture_reading_intro_len(text);

        let mut matches: Vec<RawMatch> = Vec::new();
        let mut inherited: Option<BookKey> = None;
        let mut clause_start = scan_from;

        for clause in text.get(scan_from..).unwrap_or_default().split(';') {
            if let Some(cap) = self.full.captures(clause) {
                if let Some(m) = self.qualified_candidate(&cap, None, unit.id, clause_start) {
                    inherited = m.book;
                    matches.push(m);
                }
            } else if let Some(book) = inherited
                && let Some(m) = self.bare_sr_clause(clause, book, unit.id, clause_start)
            {
                matches.push(m);
            }
            clause_start += clause.len() + 1;
        }

        matches
    }

    /// Parse one book-less Scripture Reading clause ("6:10-20") against an
    /// inherited book.
    fn bare_sr_clause(
        &self,
        clause: &str,
        book: BookKey,
        unit_id: u32,
        offset: usize,
    ) -> Option<RawMatch> {
        let cap = self.sr_clause.captures(clause)?;
        let whole = cap.get(0)?;
        let chapter: u32 = cap.get(1)?.as_str().parse().ok()?;
        if chapter == 0 {
            return None;
        }
        let verses = parse_verse_list(cap.get(2)?.as_str());
        if verses.is_empty() {
            return None;
        }

        Some(RawMatch {
            book: Some(book),
            chapter: Some(chapter),
            end_offset: offset + whole.end(),
            form: classify_verses(&verses),
            span_text: whole.as_str().to_string(),
            start_offset: offset + whole.start(),
            unit_id,
            verses,
        })
    }
}

impl Matcher for GrammarMatcher {
    fn find_matches(&self, unit: &Unit) -> Vec<RawMatch> {
        if unit.is_scripture_reading() {
            return self.scripture_reading_matches(unit);
        }

        let mut candidates = self.collect_candidates(unit);

        // Earliest offset first; at equal offsets the longest span, then
        // the higher-precedence layer.
        candidates.sort_by(|a, b| {
            a.1.start_offset
                .cmp(&b.1.start_offset)
                .then(b.1.end_offset.cmp(&a.1.end_offset))
                .then(a.0.cmp(&b.0))
        });

        let mut kept: Vec<RawMatch> = Vec::new();
        let mut last_end = 0_usize;
        for (_, m) in candidates {
            if m.start_offset >= last_end {
                last_end = m.end_offset;
                kept.push(m);
            }
        }
        kept
    }
}

/// Length of the literal "Scripture Reading:" intro at the start of a
/// unit, including the colon. Zero when the unit carries no intro (the
/// producer tagged it and the text is just the references).
fn scripture_reading_intro_len(text: &str) -> usize {
    let prefix_len = "scripture reading".len();
    let has_intro = text.len() >= prefix_len
        && text.is_char_boundary(prefix_len)
        && text[..prefix_len].eq_ignore_ascii_case("scripture reading");
    if !has_intro {
        return 0;
    }
    // Skip the colon if it directly follows the intro.
    let colon = text
        .get(prefix_len..)
        .and_then(|rest| rest.find(':').filter(|i| *i <= 1))
        .map_or(0, |i| i + 1);
    prefix_len + colon
}

/// Classify a qualified match by the shape of its verse groups.
fn classify_verses(verses: &[VerseSpan]) -> MatchForm {
    match verses {
        [single] if single.end == single.start => MatchForm::Full,
        [_single] => MatchForm::Range,
        _ => MatchForm::List,
    }
}

/// Numeric value of a verse token, dropping a letter suffix ("6a" → 6).
fn parse_verse_number(token: &str) -> Option<u32> {
    let digits: String = token.trim().chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok().filter(|v| *v > 0)
}

/// Parse a comma-separated verse group list into spans. Inverted ranges
/// are discarded with a warning; the rest of the list survives.
fn parse_verse_list(list: &str) -> Vec<VerseSpan> {
    let mut spans = Vec::new();
    for part in list.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let span = match part.split_once(['-', '–']) {
            None => parse_verse_number(part).and_then(VerseSpan::single),
            Some((start, end)) => {
                let parsed = parse_verse_number(start)
                    .zip(parse_verse_number(end))
                    .and_then(|(s, e)| VerseSpan::new(s, e));
                if parsed.is_none() {
                    eprintln!("warn: discarding malformed verse range \"{part}\"");
                }
                parsed
            },
        };
        if let Some(span) = span {
            spans.push(span);
        }
    }
    spans
}

/// Context resolution: a single forward pass that qualifies bare verse
/// citations against the Scripture Reading anchor, the most recent fully
/// qualified reference, or a nearby chapter-only mention.
use std::collections::HashSet;

use crate::books::BookKey;
use crate::types::{
    CanonicalRef, MatchForm, RawMatch, ResolutionBasis, ResolvedReference, Unit, VerseSpan,
};

/// Confidence for a bare citation resolved via the Scripture Reading anchor.
const CONF_ANCHOR: f64 = 0.85;
/// Confidence for a "cf." prefixed reference.
const CONF_CF: f64 = 0.9;
/// Confidence for a chapter-only mention or a chapter-hint resolution.
const CONF_CHAPTER_HINT: f64 = 0.8;
/// Confidence for a reference that is fully qualified on its own.
const CONF_DIRECT: f64 = 1.0;
/// Confidence for a bare citation resolved via the most recent reference.
const CONF_LAST_FULL: f64 = 0.9;

/// Which context source wins for a bare verse citation. The canonical
/// order puts a strictly-more-recent chapter-only mention ahead of the
/// last full reference; the knob demotes it below. A policy choice, not a
/// structural one.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionPolicy {
    /// Prefer the chapter hint over the last full reference when the hint
    /// is more recent.
    pub chapter_hint_first: bool,
}

impl Default for ResolutionPolicy {
    fn default() -> Self {
        Self { chapter_hint_first: true }
    }
}

/// Output of one resolution pass.
pub struct Resolution {
    /// Resolved references in document order, duplicates not yet collapsed.
    pub references: Vec<ResolvedReference>,
    /// Bare verse matches no context source could qualify.
    pub unresolved: Vec<RawMatch>,
}

/// A chapter supplied by a chapter-only mention or a full reference,
/// stamped with the match ordinal that established it.
struct ChapterHint {
    book: BookKey,
    chapter: u32,
    ordinal: usize,
}

/// Per-document resolution state, mutated strictly in document order.
/// One instance per processing pass; never shared.
#[derive(Default)]
struct ResolutionContext {
    /// The Scripture Reading anchor. Set once, never overwritten.
    anchor: Option<CanonicalRef>,
    /// Ordinal of the match that set the anchor.
    anchor_ordinal: Option<usize>,
    /// The most recent chapter context.
    chapter_hint: Option<ChapterHint>,
    /// The most recent fully qualified reference and its ordinal.
    last_full: Option<(CanonicalRef, usize)>,
}

impl ResolutionContext {
    /// Record a chapter-only mention.
    fn note_chapter(&mut self, book: BookKey, chapter: u32, ordinal: usize) {
        self.chapter_hint = Some(ChapterHint { book, chapter, ordinal });
    }

    /// Record a fully qualified reference. The chapter hint follows it.
    fn note_full(&mut self, canonical: CanonicalRef, ordinal: usize) {
        self.last_full = Some((canonical, ordinal));
        self.chapter_hint = Some(ChapterHint {
            book: canonical.book,
            chapter: canonical.chapter,
            ordinal,
        });
    }

    /// The chapter hint, if it was established after the anchor and more
    /// recently than the last full reference (i.e. by a chapter-only
    /// mention seen since then).
    fn usable_hint(&self) -> Option<(BookKey, u32)> {
        let hint = self.chapter_hint.as_ref()?;
        if self.anchor_ordinal.is_some_and(|a| hint.ordinal <= a) {
            return None;
        }
        if self.last_full.is_some_and(|(_, f)| hint.ordinal <= f) {
            return None;
        }
        Some((hint.book, hint.chapter))
    }
}

/// Resolve matches in document order. Context mutation is the only side
/// effect; the pass never fails — a bare citation with no applicable
/// context degrades to the unresolved list.
pub fn resolve(units: &[Unit], matches: Vec<RawMatch>, policy: &ResolutionPolicy) -> Resolution {
    let sr_units: HashSet<u32> = units
        .iter()
        .filter(|u| u.is_scripture_reading())
        .map(|u| u.id)
        .collect();
    let countable_chapters = countable_chapter_mentions(&matches);

    let mut ctx = ResolutionContext::default();
    let mut seen_direct = false;
    let mut references: Vec<ResolvedReference> = Vec::new();
    let mut unresolved: Vec<RawMatch> = Vec::new();

    for (ordinal, m) in matches.into_iter().enumerate() {
        match m.form {
            MatchForm::ChapterOnly => {
                let (Some(book), Some(chapter)) = (m.book, m.chapter) else {
                    continue;
                };
                ctx.note_chapter(book, chapter, ordinal);
                if countable_chapters.contains(&ordinal)
                    && let Some(canonical) = CanonicalRef::new(book, chapter, 1, None)
                {
                    references.push(ResolvedReference {
                        basis: ResolutionBasis::Direct,
                        canonical,
                        confidence: CONF_CHAPTER_HINT,
                        form: m.form,
                        original_text: m.span_text,
                        spans: Vec::new(),
                        unit_id: m.unit_id,
                    });
                }
            },
            MatchForm::VerseOnly => {
                match resolve_bare(&ctx, policy, &m) {
                    Some(reference) => references.push(reference),
                    None => unresolved.push(m),
                }
            },
            _ => {
                let Some(reference) = direct_reference(&m) else {
                    eprintln!("warn: discarding malformed reference \"{}\"", m.span_text);
                    continue;
                };
                if !seen_direct {
                    seen_direct = true;
                    if sr_units.contains(&m.unit_id) {
                        ctx.anchor = Some(reference.canonical);
                        ctx.anchor_ordinal = Some(ordinal);
                    }
                }
                ctx.note_full(reference.canonical, ordinal);
                references.push(reference);
            },
        }
    }

    Resolution { references, unresolved }
}

/// Chapter-only mentions that count as references: those not narrowed by
/// a later match in the same unit (a bare verse citation, or a qualified
/// reference into the same book and chapter).
fn countable_chapter_mentions(matches: &[RawMatch]) -> HashSet<usize> {
    let mut countable = HashSet::new();
    for (index, m) in matches.iter().enumerate() {
        if m.form != MatchForm::ChapterOnly {
            continue;
        }
        let narrowed = matches
            .iter()
            .skip(index.saturating_add(1))
            .filter(|later| later.unit_id == m.unit_id)
            .any(|later| {
                later.form == MatchForm::VerseOnly
                    || (!later.verses.is_empty()
                        && later.book == m.book
                        && later.chapter == m.chapter)
            });
        if !narrowed {
            countable.insert(index);
        }
    }
    countable
}

/// Covering canonical reference for a qualified match.
fn covering_canonical(book: BookKey, chapter: u32, span: VerseSpan) -> Option<CanonicalRef> {
    let end = (span.end != span.start).then_some(span.end);
    CanonicalRef::new(book, chapter, span.start, end)
}

/// Build a DIRECT reference from a fully qualified match.
fn direct_reference(m: &RawMatch) -> Option<ResolvedReference> {
    let (book, chapter) = m.book.zip(m.chapter)?;
    let canonical = covering_canonical(book, chapter, m.covering_span()?)?;
    let confidence = if m.form == MatchForm::CfPrefixed { CONF_CF } else { CONF_DIRECT };

    Some(ResolvedReference {
        basis: ResolutionBasis::Direct,
        canonical,
        confidence,
        form: m.form,
        original_text: m.span_text.clone(),
        spans: m.verses.clone(),
        unit_id: m.unit_id,
    })
}

/// Resolve a bare verse citation against the context sources in policy
/// order. `None` means no source applies.
fn resolve_bare(
    ctx: &ResolutionContext,
    policy: &ResolutionPolicy,
    m: &RawMatch,
) -> Option<ResolvedReference> {
    let hint = ctx
        .usable_hint()
        .map(|(book, chapter)| (book, chapter, ResolutionBasis::ChapterHint, CONF_CHAPTER_HINT));
    let last = ctx
        .last_full
        .map(|(r, _)| (r.book, r.chapter, ResolutionBasis::LastFullRef, CONF_LAST_FULL));
    let anchor = ctx
        .anchor
        .map(|r| (r.book, r.chapter, ResolutionBasis::ScriptureReading, CONF_ANCHOR));

    let (book, chapter, basis, confidence) = if policy.chapter_hint_first {
        hint.or(last).or(anchor)?
    } else {
        last.or(hint).or(anchor)?
    };

    let canonical = covering_canonical(book, chapter, m.covering_span()?)?;
    Some(ResolvedReference {
        basis,
        canonical,
        confidence,
        form: m.form,
        original_text: m.span_text.clone(),
        spans: m.verses.clone(),
        unit_id: m.unit_id,
    })
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use crate::books;
    use crate::types::UnitTag;

    fn key(name: &str) -> BookKey {
        books::normalize(name).unwrap()
    }

    fn plain_unit(id: u32) -> Unit {
        Unit { id, tag: UnitTag::Plain, text: String::new() }
    }

    fn full_match(unit_id: u32, book: &str, chapter: u32, start: u32, end: u32) -> RawMatch {
        RawMatch {
            book: Some(key(book)),
            chapter: Some(chapter),
            end_offset: 0,
            form: if end == start { MatchForm::Full } else { MatchForm::Range },
            span_text: format!("{book} {chapter}:{start}-{end}"),
            start_offset: 0,
            unit_id,
            verses: vec![VerseSpan::new(start, end).unwrap()],
        }
    }

    fn bare_match(unit_id: u32, start: u32, end: u32, text: &str) -> RawMatch {
        RawMatch {
            book: None,
            chapter: None,
            end_offset: 0,
            form: MatchForm::VerseOnly,
            span_text: text.to_string(),
            start_offset: 0,
            unit_id,
            verses: vec![VerseSpan::new(start, end).unwrap()],
        }
    }

    fn chapter_match(unit_id: u32, book: &str, chapter: u32) -> RawMatch {
        RawMatch {
            book: Some(key(book)),
            chapter: Some(chapter),
            end_offset: 0,
            form: MatchForm::ChapterOnly,
            span_text: format!("{book} {chapter}"),
            start_offset: 0,
            unit_id,
            verses: Vec::new(),
        }
    }

    #[test]
    fn bare_citations_resolve_via_last_full_reference() {
        let units = vec![plain_unit(0), plain_unit(1)];
        let matches = vec![
            full_match(0, "Luke", 7, 36, 50),
            bare_match(1, 47, 48, "vv. 47-48"),
            bare_match(1, 50, 50, "v. 50"),
        ];
        let out = resolve(&units, matches, &ResolutionPolicy::default());
        assert_eq!(out.references.len(), 3);
        assert_eq!(out.references[1].basis, ResolutionBasis::LastFullRef);
        assert_eq!(out.references[1].canonical.book, key("Luke"));
        assert_eq!(out.references[1].canonical.chapter, 7);
        assert_eq!(out.references[1].canonical.verse_start, 47);
        assert_eq!(out.references[2].canonical.verse_start, 50);
        assert!(out.unresolved.is_empty());
    }

    #[test]
    fn bare_citation_without_context_is_unresolved() {
        let units = vec![plain_unit(0)];
        let matches = vec![bare_match(0, 5, 5, "v. 5")];
        let out = resolve(&units, matches, &ResolutionPolicy::default());
        assert!(out.references.is_empty());
        assert_eq!(out.unresolved.len(), 1);
        assert_eq!(out.unresolved[0].span_text, "v. 5");
    }

    #[test]
    fn chapter_mention_narrowed_by_bare_citation_is_not_counted() {
        let units = vec![plain_unit(0)];
        let matches = vec![
            chapter_match(0, "Luke", 7),
            bare_match(0, 47, 48, "vv. 47-48"),
        ];
        let out = resolve(&units, matches, &ResolutionPolicy::default());
        // Only the narrowed bare citation is counted, resolved by the hint.
        assert_eq!(out.references.len(), 1);
        assert_eq!(out.references[0].basis, ResolutionBasis::ChapterHint);
        assert_eq!(out.references[0].canonical.chapter, 7);
    }

    #[test]
    fn chapter_hint_beats_older_full_reference() {
        let units = vec![plain_unit(0), plain_unit(1)];
        let matches = vec![
            full_match(0, "Rom", 5, 1, 11),
            chapter_match(1, "Luke", 7),
            bare_match(1, 50, 50, "v. 50"),
        ];
        let out = resolve(&units, matches, &ResolutionPolicy::default());
        let bare = out.references.last().unwrap();
        assert_eq!(bare.basis, ResolutionBasis::ChapterHint);
        assert_eq!(bare.canonical.book, key("Luke"));
        assert_eq!(bare.confidence, 0.8);
    }

    #[test]
    fn policy_knob_demotes_chapter_hint() {
        let units = vec![plain_unit(0), plain_unit(1)];
        let matches = vec![
            full_match(0, "Rom", 5, 1, 11),
            chapter_match(1, "Luke", 7),
            bare_match(1, 50, 50, "v. 50"),
        ];
        let policy = ResolutionPolicy { chapter_hint_first: false };
        let out = resolve(&units, matches, &policy);
        let bare = out.references.last().unwrap();
        assert_eq!(bare.basis, ResolutionBasis::LastFullRef);
        assert_eq!(bare.canonical.book, key("Rom"));
    }

    #[test]
    fn full_reference_supersedes_earlier_chapter_mention() {
        let units = vec![plain_unit(0), plain_unit(1)];
        let matches = vec![
            chapter_match(0, "Luke", 7),
            full_match(1, "Rom", 5, 1, 1),
            bare_match(1, 2, 2, "v. 2"),
        ];
        let out = resolve(&units, matches, &ResolutionPolicy::default());
        let bare = out.references.last().unwrap();
        // The hint from unit 0 is older than the Rom. 5:1 reference.
        assert_eq!(bare.basis, ResolutionBasis::LastFullRef);
        assert_eq!(bare.canonical.book, key("Rom"));
        assert_eq!(bare.canonical.chapter, 5);
    }

    #[test]
    fn scripture_reading_unit_sets_anchor_once() {
        let sr = Unit {
            id: 0,
            tag: UnitTag::ScriptureReading,
            text: "Scripture Reading: Eph. 4:7-16; 6:10-20".to_string(),
        };
        let units = vec![sr, plain_unit(1)];
        let matches = vec![
            full_match(0, "Eph", 4, 7, 16),
            full_match(0, "Eph", 6, 10, 20),
            full_match(1, "Rom", 12, 3, 3),
        ];
        let out = resolve(&units, matches, &ResolutionPolicy::default());
        assert_eq!(out.references.len(), 3);
        // All direct; the anchor is the first clause only.
        assert!(out.references.iter().all(|r| r.basis == ResolutionBasis::Direct));
    }

    #[test]
    fn cf_reference_has_lower_confidence() {
        let mut m = full_match(0, "Luke", 4, 18, 18);
        m.form = MatchForm::CfPrefixed;
        let out = resolve(&[plain_unit(0)], vec![m], &ResolutionPolicy::default());
        assert_eq!(out.references[0].confidence, 0.9);
        assert_eq!(out.references[0].basis, ResolutionBasis::Direct);
    }
}

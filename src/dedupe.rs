/// Reference normalization: atomic verse expansion for counting,
/// duplicate collapsing, and display re-compression.
use std::collections::HashSet;

use crate::books::BookKey;
use crate::types::{DetectionStats, ResolvedReference};

/// Exact-duplicate key: canonical value, literal text, and originating
/// unit. The same citation re-detected within one unit collapses; the
/// same text cited from two different outline points stays distinct.
type OccurrenceKey = (BookKey, u32, u32, Option<u32>, String, u32);

/// Render an atomic verse set back into compact display form:
/// `[1, 4, 5, 16, 20]` becomes `"1, 4-5, 16, 20"`.
pub fn compress_verses(verses: &[u32]) -> String {
    let mut sorted: Vec<u32> = verses.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut groups: Vec<String> = Vec::new();
    let mut run: Option<(u32, u32)> = None;
    for &verse in &sorted {
        run = match run {
            None => Some((verse, verse)),
            Some((start, end)) if verse == end + 1 => Some((start, verse)),
            Some(done) => {
                groups.push(format_run(done));
                Some((verse, verse))
            },
        };
    }
    if let Some(done) = run {
        groups.push(format_run(done));
    }
    groups.join(", ")
}

/// Format a consecutive run as "n" or "start-end".
fn format_run((start, end): (u32, u32)) -> String {
    if start == end {
        start.to_string()
    } else {
        format!("{start}-{end}")
    }
}

/// Collapse exact duplicates preserving first-seen document order, expand
/// verse groups into atomic triples for the unique-verse statistic, and
/// compute summary counts. Unresolved matches are excluded from the
/// countable totals; their count is carried through into the stats.
pub fn normalize_and_dedupe(
    refs: Vec<ResolvedReference>,
    unresolved_count: usize,
) -> (Vec<ResolvedReference>, DetectionStats) {
    let mut seen: HashSet<OccurrenceKey> = HashSet::new();
    let mut unique: HashSet<(BookKey, u32, u32)> = HashSet::new();
    let mut kept: Vec<ResolvedReference> = Vec::with_capacity(refs.len());

    for reference in refs {
        for verse in reference.atomic_verses() {
            unique.insert((reference.canonical.book, reference.canonical.chapter, verse));
        }

        let key = (
            reference.canonical.book,
            reference.canonical.chapter,
            reference.canonical.verse_start,
            reference.canonical.verse_end,
            reference.original_text.clone(),
            reference.unit_id,
        );
        if seen.insert(key) {
            kept.push(reference);
        }
    }

    let stats = DetectionStats {
        total_occurrences: kept.len(),
        unique_verses: unique.len(),
        unresolved_count,
    };
    (kept, stats)
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use crate::books;
    use crate::types::{CanonicalRef, MatchForm, ResolutionBasis, VerseSpan};

    fn reference(unit_id: u32, book: &str, chapter: u32, spans: &[(u32, u32)], text: &str) -> ResolvedReference {
        let key = books::normalize(book).unwrap();
        let spans: Vec<VerseSpan> =
            spans.iter().map(|&(s, e)| VerseSpan::new(s, e).unwrap()).collect();
        let start = spans.iter().map(|s| s.start).min().unwrap();
        let end = spans.iter().map(|s| s.end).max().unwrap();
        ResolvedReference {
            basis: ResolutionBasis::Direct,
            canonical: CanonicalRef::new(key, chapter, start, (end != start).then_some(end))
                .unwrap(),
            confidence: 1.0,
            form: MatchForm::List,
            original_text: text.to_string(),
            spans,
            unit_id,
        }
    }

    #[test]
    fn compress_round_trips_a_mixed_list() {
        assert_eq!(compress_verses(&[1, 4, 5, 16, 20]), "1, 4-5, 16, 20");
        assert_eq!(compress_verses(&[3]), "3");
        assert_eq!(compress_verses(&[2, 1, 3]), "1-3");
        assert_eq!(compress_verses(&[]), "");
    }

    #[test]
    fn list_expands_to_atomic_verses_under_one_entry() {
        let r = reference(0, "Rom", 16, &[(1, 1), (4, 5), (16, 16), (20, 20)], "Rom. 16:1, 4-5, 16, 20");
        let (kept, stats) = normalize_and_dedupe(vec![r], 0);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].original_text, "Rom. 16:1, 4-5, 16, 20");
        assert_eq!(kept[0].atomic_verses(), vec![1, 4, 5, 16, 20]);
        assert_eq!(stats.unique_verses, 5);
        assert_eq!(stats.total_occurrences, 1);
    }

    #[test]
    fn repeat_citation_in_different_units_keeps_both_occurrences() {
        let first = reference(2, "Rom", 5, &[(2, 2)], "Rom. 5:2");
        let second = reference(7, "Rom", 5, &[(2, 2)], "Rom. 5:2");
        let (kept, stats) = normalize_and_dedupe(vec![first, second], 0);
        assert_eq!(kept.len(), 2);
        assert_eq!(stats.total_occurrences, 2);
        assert_eq!(stats.unique_verses, 1);
    }

    #[test]
    fn repeat_citation_in_same_unit_collapses() {
        let first = reference(2, "Rom", 5, &[(2, 2)], "Rom. 5:2");
        let second = reference(2, "Rom", 5, &[(2, 2)], "Rom. 5:2");
        let (kept, _) = normalize_and_dedupe(vec![first, second], 0);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn distinct_literal_text_for_same_verse_stays_distinct() {
        let spelled = reference(0, "Rom", 5, &[(2, 2)], "Rom. 5:2");
        let bare = reference(1, "Rom", 5, &[(2, 2)], "v. 2");
        let (kept, stats) = normalize_and_dedupe(vec![spelled, bare], 0);
        assert_eq!(kept.len(), 2);
        assert_eq!(stats.unique_verses, 1);
    }

    #[test]
    fn unresolved_count_is_carried_through() {
        let (_, stats) = normalize_and_dedupe(Vec::new(), 3);
        assert_eq!(stats.unresolved_count, 3);
        assert_eq!(stats.total_occurrences, 0);
    }
}

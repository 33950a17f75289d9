/// Segmentation of raw document text into tagged structural units.
///
/// Stands in for the PDF extraction collaborator: one unit per non-empty
/// line, tagged by the outline conventions of the source documents
/// (Roman-numeral and letter point markers, all-caps headings, and the
/// "Scripture Reading:" line).
use crate::types::{Unit, UnitTag};

/// Split text into ordered, tagged units. Blank lines produce no unit;
/// unit ids count from 0 in document order. Only the first line starting
/// with "Scripture Reading" is tagged as such.
pub fn segment(text: &str) -> Vec<Unit> {
    let mut units: Vec<Unit> = Vec::new();
    let mut tagged_reading = false;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let mut tag = classify_line(trimmed);
        if tag == UnitTag::ScriptureReading {
            if tagged_reading {
                tag = UnitTag::Plain;
            }
            tagged_reading = true;
        }

        let id = u32::try_from(units.len()).unwrap_or(u32::MAX);
        units.push(Unit { id, tag, text: trimmed.to_string() });
    }
    units
}

/// Classify one trimmed line by its leading marker and shape.
fn classify_line(line: &str) -> UnitTag {
    if starts_with_scripture_reading(line) {
        return UnitTag::ScriptureReading;
    }
    if has_outline_marker(line) {
        return UnitTag::OutlinePoint;
    }
    if is_heading(line) {
        return UnitTag::Heading;
    }
    UnitTag::Plain
}

/// Literal-prefix check for the Scripture Reading line (spec'd fallback
/// when no producer tag is available).
fn starts_with_scripture_reading(line: &str) -> bool {
    let len = 17.min(line.len());
    line.is_char_boundary(len) && line[..len].eq_ignore_ascii_case("scripture reading")
}

/// Outline point markers: "I.", "IV.", "A.", "1.", "a." followed by
/// whitespace.
fn has_outline_marker(line: &str) -> bool {
    let Some((marker, rest)) = line.split_once('.') else {
        return false;
    };
    if !rest.starts_with(' ') && !rest.starts_with('\t') {
        return false;
    }

    let is_roman = !marker.is_empty() && marker.chars().all(|c| matches!(c, 'I' | 'V' | 'X'));
    let is_single_letter = marker.len() == 1
        && marker.chars().all(|c| c.is_ascii_alphabetic());
    let is_number = !marker.is_empty() && marker.chars().all(|c| c.is_ascii_digit());

    is_roman || is_single_letter || is_number
}

/// Headings: all-caps lines, or short title lines without a closing
/// period (message titles, week headers).
fn is_heading(line: &str) -> bool {
    let has_letters = line.chars().any(char::is_alphabetic);
    if !has_letters {
        return false;
    }
    if line.chars().all(|c| !c.is_lowercase()) {
        return true;
    }
    !line.ends_with('.') && line.split_whitespace().count() <= 8 && !line.contains(':')
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_produce_no_units() {
        let units = segment("one\n\n\ntwo\n");
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].id, 0);
        assert_eq!(units[1].id, 1);
        assert_eq!(units[1].text, "two");
    }

    #[test]
    fn heading_detection() {
        assert_eq!(classify_line("THE BELIEVERS IN CHRIST"), UnitTag::Heading);
        assert_eq!(classify_line("Message Twelve"), UnitTag::Heading);
    }

    #[test]
    fn outline_markers() {
        assert_eq!(classify_line("I. Christ ascended to the heavens"), UnitTag::OutlinePoint);
        assert_eq!(classify_line("IV. The church as the Body"), UnitTag::OutlinePoint);
        assert_eq!(classify_line("A. The gifts given to the Body"), UnitTag::OutlinePoint);
        assert_eq!(classify_line("1. To perfect the saints"), UnitTag::OutlinePoint);
        assert_eq!(classify_line("a. In the divine life"), UnitTag::OutlinePoint);
    }

    #[test]
    fn prose_is_plain() {
        assert_eq!(
            classify_line("This sentence simply continues the point above it in plain prose."),
            UnitTag::Plain
        );
    }

    #[test]
    fn only_first_scripture_reading_line_is_tagged() {
        let units = segment("Scripture Reading: Eph. 4:7\nScripture Reading: Rom. 5:1\n");
        assert_eq!(units[0].tag, UnitTag::ScriptureReading);
        assert_eq!(units[1].tag, UnitTag::Plain);
    }

    #[test]
    fn scripture_reading_line_is_tagged() {
        let units = segment("Message One\nScripture Reading: Eph. 4:7-16; 6:10-20\nI. Point");
        assert_eq!(units[1].tag, UnitTag::ScriptureReading);
    }
}

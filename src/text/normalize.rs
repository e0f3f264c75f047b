use std::collections::BTreeSet;

/// Separator between independent senses or spellings in scraped text
pub const SEGMENT_SEPARATOR: &str = ", ";

/// Normalizes a scraped title block into the set of titles it names
///
/// # Normalization Steps
///
/// 1. Collapse whitespace runs to a single space and trim (case is kept)
/// 2. Strip a `[...]` annotation
/// 3. Strip a `(...)` annotation
/// 4. Split on `", "`
/// 5. Trim each segment, dropping hyphen placeholders and hyphen edges
/// 6. Drop empty segments and separator artifacts
/// 7. Deduplicate
///
/// A single page may describe several spellings, so every element of the
/// result is an independent dictionary key.
///
/// # Examples
///
/// ```
/// use lexicon_ripple::text::normalize_title;
///
/// let titles = normalize_title("amo, amare, amavi, amatus [verb]");
/// assert_eq!(titles.len(), 4);
/// assert!(titles.contains("amatus"));
/// ```
pub fn normalize_title(raw: &str) -> BTreeSet<String> {
    normalize(fold_whitespace(raw))
}

/// Normalizes one scraped definition line into its senses
///
/// Same pipeline as [`normalize_title`], with the text lower-cased after
/// whitespace folding.
///
/// # Examples
///
/// ```
/// use lexicon_ripple::text::normalize_definition;
///
/// let senses = normalize_definition("To love (passionately) - ");
/// assert_eq!(senses.into_iter().collect::<Vec<_>>(), vec!["to love"]);
/// ```
pub fn normalize_definition(raw: &str) -> BTreeSet<String> {
    normalize(fold_whitespace(raw).to_lowercase())
}

fn normalize(folded: String) -> BTreeSet<String> {
    let stripped = strip_enclosed(&folded, '[', ']');
    let stripped = strip_enclosed(&stripped, '(', ')');

    split_segments(&stripped)
        .into_iter()
        .filter_map(clean_segment)
        .collect()
}

/// Collapses every whitespace run (newlines and tabs included) to one space
pub fn fold_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Removes the first `open`...`close` span
///
/// When nothing but hyphens or whitespace follow the closing delimiter, or
/// it is the last or second-to-last character, the annotation trails the
/// text and everything from `open` onwards is cut. Otherwise the span and
/// everything before it are discarded and the remainder is kept.
///
/// Strings without an `open` followed by a `close` come back unchanged.
pub fn strip_enclosed(text: &str, open: char, close: char) -> String {
    let Some(start) = text.find(open) else {
        return text.to_string();
    };
    let Some(offset) = text[start..].find(close) else {
        return text.to_string();
    };

    let rest = &text[start + offset + close.len_utf8()..];
    if is_trailing(rest) {
        text[..start].to_string()
    } else {
        rest.trim_start().to_string()
    }
}

fn is_trailing(rest: &str) -> bool {
    rest.chars().count() <= 1 || rest.chars().all(|c| c.is_whitespace() || c == '-')
}

/// Splits on the literal separator; a comma always separates senses
pub fn split_segments(text: &str) -> Vec<&str> {
    text.split(SEGMENT_SEPARATOR).collect()
}

/// Trims one segment, returning `None` for placeholders and artifacts
pub fn clean_segment(segment: &str) -> Option<String> {
    let cleaned = segment.trim_matches(|c: char| c.is_whitespace() || c == '-');

    if cleaned.is_empty() || cleaned == "," || cleaned == SEGMENT_SEPARATOR {
        return None;
    }

    Some(cleaned.to_string())
}

//! HTML parser for listing, definition and paradigm pages
//!
//! This module turns fetched pages into structured records:
//! - Item links from a listing page
//! - Titles, definitions and the orthography id from a definition page
//! - Inflection tables from a paradigm page

use crate::site::Endpoints;
use crate::storage::ParadigmTable;
use crate::text::{fold_whitespace, normalize_definition, normalize_title};
use scraper::{ElementRef, Html, Selector};
use std::collections::{BTreeMap, BTreeSet};

/// Block holding the entry's title line
pub const TITLE_SELECTOR: &str = "div.flash_card_title";

/// List holding one definition per `<li>`
pub const DEFINITIONS_SELECTOR: &str = "ol.flash_card_english_def";

/// Block holding the orthography id
pub const IDENTIFIER_SELECTOR: &str = "div.flash_card_orth_id";

/// Label preceding the orthography id inside its block
pub const ORTHOGRAPHY_ID_LABEL: &str = "Orthography ID:";

/// One inflection table on a paradigm page
pub const PARADIGM_SELECTOR: &str = "table.paradigm";

/// Structured data of one definition page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordRecord {
    /// Id used to request the entry's inflection tables
    pub orthography_id: Option<u64>,

    /// Every title the page describes
    pub titles: BTreeSet<String>,

    /// Normalized definitions shared by all titles
    pub definitions: BTreeSet<String>,
}

impl WordRecord {
    /// A record without titles carries nothing to store
    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

/// Result of parsing a definition page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedWord {
    pub record: WordRecord,

    /// Raw identifier text that could not be parsed as an id
    pub malformed_id: Option<String>,
}

/// Inflection tables of one entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParadigmRecord {
    /// Number of forms across all tables
    pub forms: usize,

    /// Tables keyed by their position on the page ("0", "1", ...)
    pub tables: BTreeMap<String, ParadigmTable>,
}

/// Extracts the item links from a listing page
///
/// Only hrefs containing the site's item marker are kept. Links are kept as
/// written on the page and deduplicated by exact string.
pub fn extract_item_links(html: &str, endpoints: &Endpoints) -> BTreeSet<String> {
    let document = Html::parse_document(html);
    let mut links = BTreeSet::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                let href = href.trim();
                if !href.is_empty() && endpoints.is_item_link(href) {
                    links.insert(href.to_string());
                }
            }
        }
    }

    links
}

/// Parses a definition page
///
/// A page missing the title block or the definition list yields an empty
/// record. An identifier block whose value is not an integer leaves
/// `orthography_id` unset and reports the raw text in `malformed_id`.
pub fn parse_word_page(html: &str) -> ParsedWord {
    let document = Html::parse_document(html);

    let Some(title_block) = select_first(&document, TITLE_SELECTOR) else {
        return ParsedWord::default();
    };
    let Some(definition_list) = select_first(&document, DEFINITIONS_SELECTOR) else {
        return ParsedWord::default();
    };

    let titles = normalize_title(&element_text(&title_block));

    let mut definitions = BTreeSet::new();
    if let Ok(li_selector) = Selector::parse("li") {
        for item in definition_list.select(&li_selector) {
            definitions.extend(normalize_definition(&element_text(&item)));
        }
    }

    let (orthography_id, malformed_id) = match select_first(&document, IDENTIFIER_SELECTOR) {
        Some(block) => {
            let raw = fold_whitespace(&element_text(&block));
            match parse_orthography_id(&raw) {
                Some(id) => (Some(id), None),
                None => (None, Some(raw)),
            }
        }
        None => (None, None),
    };

    ParsedWord {
        record: WordRecord {
            orthography_id,
            titles,
            definitions,
        },
        malformed_id,
    }
}

/// Parses the text of an identifier block into an orthography id
///
/// # Examples
///
/// ```
/// use lexicon_ripple::crawler::parse_orthography_id;
///
/// assert_eq!(parse_orthography_id("Orthography ID: 20155"), Some(20155));
/// assert_eq!(parse_orthography_id("Orthography ID: n/a"), None);
/// ```
pub fn parse_orthography_id(raw: &str) -> Option<u64> {
    raw.trim()
        .strip_prefix(ORTHOGRAPHY_ID_LABEL)?
        .trim()
        .parse()
        .ok()
}

/// Parses the inflection tables of a paradigm page
///
/// In every table the first row holds the column labels (lower-cased) and
/// each following row holds its row label followed by one cell per column.
/// Every cell goes through the definition normalizer. A page without tables
/// yields a record with zero forms.
pub fn parse_paradigm_page(html: &str) -> ParadigmRecord {
    let document = Html::parse_document(html);
    let mut record = ParadigmRecord::default();

    let (Ok(table_selector), Ok(row_selector), Ok(cell_selector)) = (
        Selector::parse(PARADIGM_SELECTOR),
        Selector::parse("tr"),
        Selector::parse("th, td"),
    ) else {
        return record;
    };

    for (position, table) in document.select(&table_selector).enumerate() {
        let mut rows = table.select(&row_selector);
        let Some(header_row) = rows.next() else {
            record.tables.insert(position.to_string(), ParadigmTable::new());
            continue;
        };

        let headers: Vec<String> = header_row
            .select(&cell_selector)
            .map(|cell| fold_whitespace(&element_text(&cell)).to_lowercase())
            .collect();

        let mut parsed = ParadigmTable::new();
        for row in rows {
            let cells: Vec<ElementRef> = row.select(&cell_selector).collect();
            let Some((label_cell, form_cells)) = cells.split_first() else {
                continue;
            };
            let row_label = fold_whitespace(&element_text(label_cell));

            // Header rows either carry a corner cell above the row labels or not
            let offset = if headers.len() == cells.len() { 1 } else { 0 };

            for (i, cell) in form_cells.iter().enumerate() {
                let Some(column) = headers.get(i + offset) else {
                    continue;
                };

                let forms = normalize_definition(&element_text(cell));
                if forms.is_empty() {
                    continue;
                }

                record.forms += forms.len();
                parsed
                    .entry(column.clone())
                    .or_default()
                    .entry(row_label.clone())
                    .or_default()
                    .extend(forms);
            }
        }

        record.tables.insert(position.to_string(), parsed);
    }

    record
}

fn select_first<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    document.select(&selector).next()
}

/// Concatenated text of an element; callers fold the whitespace
fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>()
}

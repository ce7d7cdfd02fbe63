use std::borrow::Cow;

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use crate::config::{ExtractConfig, FeedMetadata};
use crate::feed::model::{Feed, Item, MIN_CELLS};
use crate::util::strip_soft_hyphens;

/// `DD.MM.YYYY`, e.g. `01.02.2023`.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

#[derive(Debug, Error)]
pub enum ExtractError {
    /// A configured CSS selector does not parse.
    #[error("Invalid selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },

    #[error(transparent)]
    Date(#[from] DateParseError),
}

/// The first cell of a non-empty row is not a `DD.MM.YYYY` date.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("row {row}: can't parse {value:?} as DD.MM.YYYY: {reason}")]
pub struct DateParseError {
    /// Index of the row among all rows matched by the row selector.
    pub row: usize,
    pub value: String,
    pub reason: String,
}

/// Outcome of walking one document.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Items for every row read before extraction stopped.
    pub feed: Feed,
    /// Rows with between one and four cells, dropped with a warning.
    pub skipped: usize,
    /// Set when a row's date did not parse. No row after it was read.
    pub halted: Option<DateParseError>,
}

/// Walks the proceedings table of an HTML document.
///
/// Selectors are compiled once and reused for every document.
#[derive(Debug)]
pub struct FeedExtractor {
    metadata: FeedMetadata,
    rows: Selector,
    cells: Selector,
}

impl FeedExtractor {
    /// # Errors
    ///
    /// [`ExtractError::Selector`] if either configured selector is not valid CSS.
    pub fn new(metadata: FeedMetadata, config: &ExtractConfig) -> Result<Self, ExtractError> {
        Ok(Self {
            metadata,
            rows: compile(&config.row_selector)?,
            cells: compile(&config.cell_selector)?,
        })
    }

    /// Builds a feed from the table rows of `html`.
    ///
    /// Rows are read in document order:
    ///
    /// - rows without cells (header rows made of `th`) are passed over
    /// - the first cell must be a `DD.MM.YYYY` date in local time; the first row
    ///   where it is not stops extraction and is reported in [`Extraction::halted`]
    /// - rows with a valid date but fewer than [`MIN_CELLS`] cells are skipped
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD.
    pub fn extract(&self, source_uri: &str, html: &[u8], created: DateTime<Local>) -> Extraction {
        let text = String::from_utf8_lossy(html);
        if matches!(text, Cow::Owned(_)) {
            tracing::warn!(uri = %source_uri, "Document is not valid UTF-8, decoding lossily");
        }
        let document = Html::parse_document(&text);

        let mut feed = Feed::new(&self.metadata, source_uri, created);
        let mut skipped = 0;
        let mut halted = None;

        for (index, row) in document.select(&self.rows).enumerate() {
            let cells = row_cells(row, &self.cells);
            if cells.is_empty() {
                continue;
            }

            let date = match parse_local_date(&cells[0]) {
                Ok(date) => date,
                Err(reason) => {
                    halted = Some(DateParseError {
                        row: index,
                        value: cells[0].clone(),
                        reason,
                    });
                    break;
                }
            };

            match Item::from_cells(source_uri, &cells, date) {
                Some(item) => feed.items.push(item),
                None => {
                    tracing::warn!(
                        uri = %source_uri,
                        row = index,
                        cells = cells.len(),
                        "Skipping row with fewer than {} cells",
                        MIN_CELLS
                    );
                    skipped += 1;
                }
            }
        }

        tracing::debug!(
            uri = %source_uri,
            items = feed.items.len(),
            skipped = skipped,
            halted = halted.is_some(),
            "Extracted feed"
        );

        Extraction {
            feed,
            skipped,
            halted,
        }
    }
}

fn compile(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::Selector {
        selector: selector.to_owned(),
        reason: e.to_string(),
    })
}

/// Text content of every cell in `row`, with soft hyphens removed.
pub fn row_cells(row: ElementRef<'_>, cells: &Selector) -> Vec<String> {
    row.select(cells)
        .map(|cell| {
            let raw: String = cell.text().collect();
            strip_soft_hyphens(&raw).into_owned()
        })
        .collect()
}

/// Parses `DD.MM.YYYY` as midnight in the local timezone.
pub fn parse_local_date(text: &str) -> Result<DateTime<Local>, String> {
    parse_date_in(text, &Local)
}

/// Parses `DD.MM.YYYY` as midnight in `tz`.
///
/// Surrounding whitespace is ignored. Day and month need two digits and the
/// year four. A midnight skipped by a DST change is an error; a repeated one
/// resolves to the earlier instant.
pub fn parse_date_in<Tz: TimeZone>(text: &str, tz: &Tz) -> Result<DateTime<Tz>, String> {
    let text = text.trim();
    if !is_date_shaped(text) {
        return Err("expected two-digit day and month and a four-digit year".to_owned());
    }

    let date = NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|e| e.to_string())?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| "midnight out of range".to_owned())?;

    tz.from_local_datetime(&midnight)
        .earliest()
        .ok_or_else(|| format!("{} does not exist in the local timezone", midnight))
}

fn is_date_shaped(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, &b)| match i {
            2 | 5 => b == b'.',
            _ => b.is_ascii_digit(),
        })
}

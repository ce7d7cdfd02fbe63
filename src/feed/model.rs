use chrono::{DateTime, Local};

use crate::config::FeedMetadata;

/// Rows need this many cells to become an item: date, case id, title and
/// two detail columns.
pub const MIN_CELLS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub email: String,
}

/// One Atom document's worth of proceedings, built fresh for each input URI.
#[derive(Debug, Clone, PartialEq)]
pub struct Feed {
    pub title: String,
    /// The URI the table was read from. Doubles as the feed id.
    pub link: String,
    pub description: String,
    pub author: Author,
    /// When this run captured the table.
    pub created: DateTime<Local>,
    /// Entries in table row order.
    pub items: Vec<Item>,
}

impl Feed {
    pub fn new(metadata: &FeedMetadata, link: &str, created: DateTime<Local>) -> Self {
        Self {
            title: metadata.title.clone(),
            link: link.to_owned(),
            description: metadata.description.clone(),
            author: Author {
                name: metadata.author_name.clone(),
                email: metadata.author_email.clone(),
            },
            created,
            items: Vec::with_capacity(20),
        }
    }

    /// Serializes the feed as an Atom 1.0 document. See [`super::to_atom`].
    pub fn to_atom(&self) -> Result<String, super::AtomError> {
        super::to_atom(self)
    }
}

/// A single proceeding.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub title: String,
    /// `<source-uri>#<case id>`
    pub link: String,
    /// The case number from the second column. Stable across runs.
    pub id: String,
    /// Third, fourth and fifth column joined with `<br>`.
    pub description: String,
    pub created: DateTime<Local>,
}

impl Item {
    /// Builds an item from a row of at least [`MIN_CELLS`] cells.
    ///
    /// Returns `None` for shorter rows.
    pub fn from_cells(source_uri: &str, cells: &[String], created: DateTime<Local>) -> Option<Self> {
        // The pattern below names exactly MIN_CELLS leading cells
        let [_, id, title, detail_a, detail_b, ..] = cells else {
            return None;
        };
        debug_assert!(cells.len() >= MIN_CELLS);
        Some(Self {
            title: title.clone(),
            link: format!("{}#{}", source_uri, id),
            id: id.clone(),
            description: format!("{}<br>{}<br>{}", title, detail_a, detail_b),
            created,
        })
    }
}

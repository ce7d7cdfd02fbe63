//! Proceedings table → feed → Atom.
//!
//! - [`model`] - the feed and entry types
//! - [`extractor`] - walks the `table.csvTable` rows of an HTML document
//! - [`atom`] - Atom 1.0 serialization using `quick-xml`'s writer
//!
//! # Example
//!
//! ```ignore
//! use fusion2feed::feed::FeedExtractor;
//!
//! let extractor = FeedExtractor::new(config.feed.clone(), &config.extract)?;
//! let extraction = extractor.extract(uri, &bytes, chrono::Local::now());
//! print!("{}", extraction.feed.to_atom()?);
//! ```

mod atom;
mod extractor;
mod model;

pub use atom::{to_atom, AtomError, ATOM_NAMESPACE};
pub use extractor::{
    parse_date_in, parse_local_date, row_cells, DateParseError, ExtractError, Extraction,
    FeedExtractor, DATE_FORMAT,
};
pub use model::{Author, Feed, Item, MIN_CELLS};

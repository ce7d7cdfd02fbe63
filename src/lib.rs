//! fusion2feed: scrape a table of merger-control proceedings into an Atom feed.
//!
//! The pipeline is a single pass per input URI:
//!
//! 1. [`source`] resolves an `http(s)://` or `file://` URI to the raw document bytes
//! 2. [`feed`] walks the `table.csvTable` rows and builds a [`feed::Feed`]
//! 3. [`feed::to_atom`] serializes the feed as an Atom 1.0 document
//!
//! [`convert::Converter`] ties the three together and is what the binary drives.

pub mod config;
pub mod convert;
pub mod feed;
pub mod source;
pub mod util;

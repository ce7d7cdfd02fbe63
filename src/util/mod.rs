//! Utility functions for common operations.
//!
//! - **Text processing**: soft-hyphen stripping for scraped cell text and
//!   replacement of characters XML 1.0 cannot carry

mod text;

pub use text::{is_xml_char, strip_soft_hyphens, xml_safe, SOFT_HYPHEN};

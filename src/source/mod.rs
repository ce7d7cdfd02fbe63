//! URI resolution: turns an `http(s)://` or `file://` URI into document bytes.
//!
//! - [`classify`] validates a URI and decides how it will be read, without I/O
//! - [`UriReader`] performs the GET or file read with a size cap

mod reader;

pub use reader::{classify, SourceError, Target, UriReader};

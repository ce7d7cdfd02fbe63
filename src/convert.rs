//! The per-URI pipeline: read the document, extract the feed, write Atom.
use chrono::{DateTime, Local};
use thiserror::Error;

use crate::config::{Config, OnDateError};
use crate::feed::{AtomError, ExtractError, FeedExtractor};
use crate::source::{SourceError, UriReader};

/// Any failure that aborts the conversion of one URI.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Atom(#[from] AtomError),
}

/// Reader, extractor and policy for one run. Build once, convert many URIs.
#[derive(Debug)]
pub struct Converter {
    reader: UriReader,
    extractor: FeedExtractor,
    on_date_error: OnDateError,
}

impl Converter {
    /// # Errors
    ///
    /// Fails if a configured header or selector is invalid, or the HTTP client
    /// cannot be built.
    pub fn new(config: Config) -> Result<Self, ConvertError> {
        let reader = UriReader::new(&config.http)?;
        Self::with_reader(config, reader)
    }

    /// Uses a prepared [`UriReader`] instead of building one from `config.http`.
    pub fn with_reader(config: Config, reader: UriReader) -> Result<Self, ConvertError> {
        let extractor = FeedExtractor::new(config.feed, &config.extract)?;
        Ok(Self {
            reader,
            extractor,
            on_date_error: config.extract.on_date_error,
        })
    }

    /// Converts `uri` into an Atom document stamped with the current time.
    pub async fn convert(&self, uri: &str) -> Result<String, ConvertError> {
        self.convert_at(uri, Local::now()).await
    }

    /// Converts `uri` into an Atom document with `created` as the feed's
    /// `updated` time. Identical input and `created` give identical output.
    pub async fn convert_at(
        &self,
        uri: &str,
        created: DateTime<Local>,
    ) -> Result<String, ConvertError> {
        let bytes = self.reader.read(uri).await?;
        let extraction = self.extractor.extract(uri, &bytes, created);

        if let Some(err) = extraction.halted {
            match self.on_date_error {
                OnDateError::Fail => return Err(ExtractError::Date(err).into()),
                OnDateError::Truncate => {
                    tracing::warn!(
                        uri = %uri,
                        row = err.row,
                        value = %err.value,
                        items = extraction.feed.items.len(),
                        "Unparsable date, publishing rows read so far"
                    );
                }
            }
        }

        tracing::info!(
            uri = %uri,
            items = extraction.feed.items.len(),
            skipped = extraction.skipped,
            "Converted"
        );
        Ok(extraction.feed.to_atom()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractConfig;

    #[test]
    fn test_invalid_selector_fails_construction() {
        let config = Config {
            extract: ExtractConfig {
                cell_selector: "td[[".to_string(),
                ..ExtractConfig::default()
            },
            ..Config::default()
        };
        assert!(matches!(
            Converter::new(config),
            Err(ConvertError::Extract(ExtractError::Selector { .. }))
        ));
    }

    #[test]
    fn test_invalid_header_fails_construction() {
        let mut config = Config::default();
        config
            .http
            .headers
            .insert("X-Bad\r\n".to_string(), "value".to_string());
        assert!(matches!(
            Converter::new(config),
            Err(ConvertError::Source(SourceError::InvalidHeader { .. }))
        ));
    }

    #[tokio::test]
    async fn test_unsupported_scheme_surfaces_as_source_error() {
        let converter = Converter::new(Config::default()).unwrap();
        let err = converter.convert("ftp://host/path").await.unwrap_err();
        assert!(matches!(
            err,
            ConvertError::Source(SourceError::UnsupportedScheme(_))
        ));
        assert!(err.to_string().contains("ftp"));
    }
}

use crate::config::HttpConfig;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

/// Errors that can occur while resolving a URI to document bytes.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The argument is not an absolute URI.
    #[error("Invalid URI {uri:?}: {reason}")]
    InvalidUri { uri: String, reason: String },
    /// Only http, https and file are understood.
    #[error("can not handle scheme: {0:?}")]
    UnsupportedScheme(String),
    /// The server answered with a status of 299 or above.
    #[error("can't handle status {status} ({reason}) for {uri}")]
    Upstream {
        status: u16,
        reason: String,
        uri: String,
    },
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// The local file could not be opened or read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The document exceeded the configured size limit.
    #[error("Document too large (exceeds {0} bytes)")]
    ResponseTooLarge(u64),
    /// Response was incomplete (received fewer bytes than Content-Length)
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
    /// A configured request header is not a legal HTTP header.
    #[error("Invalid request header {name:?}: {reason}")]
    InvalidHeader { name: String, reason: String },
}

/// How a URI will be read, decided before any I/O takes place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Http(Url),
    File(PathBuf),
}

/// Validates `raw_uri` and decides how it will be read.
///
/// For `file:` URIs a host other than `localhost` is taken as the file name
/// (`file://cases.html` reads `cases.html` relative to the working directory);
/// otherwise the percent-decoded path is used.
///
/// # Errors
///
/// - [`SourceError::InvalidUri`] if the string is not an absolute URI
/// - [`SourceError::UnsupportedScheme`] for anything but http, https and file
pub fn classify(raw_uri: &str) -> Result<Target, SourceError> {
    let url = Url::parse(raw_uri).map_err(|e| SourceError::InvalidUri {
        uri: raw_uri.to_owned(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(Target::Http(url)),
        "file" => {
            if let Some(host) = url.host_str().filter(|h| !h.is_empty() && *h != "localhost") {
                return Ok(Target::File(PathBuf::from(host)));
            }
            let path = url.to_file_path().map_err(|()| SourceError::InvalidUri {
                uri: raw_uri.to_owned(),
                reason: "not a local file path".to_owned(),
            })?;
            Ok(Target::File(path))
        }
        scheme => Err(SourceError::UnsupportedScheme(scheme.to_owned())),
    }
}

/// Reads whole documents from http, https and file URIs.
///
/// Holds one HTTP client for the lifetime of the run, preconfigured with the
/// request headers from [`HttpConfig`]. No timeout and no retries are applied;
/// redirects follow the client defaults.
#[derive(Debug, Clone)]
pub struct UriReader {
    client: reqwest::Client,
    max_body_bytes: u64,
}

impl UriReader {
    /// Builds a reader whose client sends `http.headers` with every request.
    pub fn new(http: &HttpConfig) -> Result<Self, SourceError> {
        let headers = build_headers(http)?;
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;
        Ok(Self::with_client(client, http.max_body_bytes))
    }

    /// Uses a caller-supplied client. `max_body_bytes == 0` disables the size cap.
    pub fn with_client(client: reqwest::Client, max_body_bytes: u64) -> Self {
        Self {
            client,
            max_body_bytes,
        }
    }

    /// Resolves `raw_uri` and returns the complete document.
    ///
    /// # Errors
    ///
    /// Any [`SourceError`]. Scheme and syntax problems are reported before
    /// any network or file access.
    pub async fn read(&self, raw_uri: &str) -> Result<Vec<u8>, SourceError> {
        match classify(raw_uri)? {
            Target::Http(url) => self.fetch(raw_uri, url).await,
            Target::File(path) => self.read_file(path).await,
        }
    }

    /// Errors and logs name `raw_uri` as given, not the normalised `url`.
    async fn fetch(&self, raw_uri: &str, url: Url) -> Result<Vec<u8>, SourceError> {
        let uri = raw_uri.to_owned();
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status.as_u16() >= 299 {
            tracing::debug!(uri = %uri, status = %status, "Upstream refused request");
            return Err(SourceError::Upstream {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("unknown").to_owned(),
                uri,
            });
        }

        let bytes = read_limited_bytes(response, self.max_body_bytes).await?;
        tracing::debug!(uri = %uri, status = %status, bytes = bytes.len(), "Fetched document");
        Ok(bytes)
    }

    async fn read_file(&self, path: PathBuf) -> Result<Vec<u8>, SourceError> {
        let meta = match tokio::fs::metadata(&path).await {
            Ok(meta) => meta,
            Err(source) => return Err(SourceError::Io { path, source }),
        };
        if self.max_body_bytes > 0 && meta.len() > self.max_body_bytes {
            return Err(SourceError::ResponseTooLarge(self.max_body_bytes));
        }

        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                tracing::debug!(path = %path.display(), bytes = bytes.len(), "Read document");
                Ok(bytes)
            }
            Err(source) => Err(SourceError::Io { path, source }),
        }
    }
}

fn build_headers(http: &HttpConfig) -> Result<HeaderMap, SourceError> {
    let mut headers = HeaderMap::with_capacity(http.headers.len());
    for (name, value) in &http.headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| SourceError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| SourceError::InvalidHeader {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}

async fn read_limited_bytes(response: reqwest::Response, limit: u64) -> Result<Vec<u8>, SourceError> {
    let expected_length = response.content_length();

    // Fast path: check Content-Length header
    if let Some(len) = expected_length {
        if limit > 0 && len > limit {
            return Err(SourceError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if limit > 0 && (bytes.len().saturating_add(chunk.len()) as u64) > limit {
            return Err(SourceError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    if let Some(expected) = expected_length {
        if (bytes.len() as u64) < expected {
            return Err(SourceError::IncompleteResponse {
                expected,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}

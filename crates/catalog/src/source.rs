//! Dataset sources.
//!
//! A `DataSource` only fetches bytes; parsing and validation happen in
//! [`crate::load`] so every source is held to the same rules:
//! - `FileSource` reads a local file (native hosts, tests).
//! - `HttpSource` fetches over HTTP(S).
//! - `MemorySource` serves an in-memory payload.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use formats::DatasetFormat;

use crate::error::DataLoadError;

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Raw bytes plus the hints needed to pick a parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePayload {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    /// File path or URL path, used for extension-based format detection.
    pub path_hint: Option<String>,
    /// Explicit format; skips detection when set.
    pub format: Option<DatasetFormat>,
}

/// Implementations must be `Send + Sync` for use across async tasks.
/// Methods return boxed futures for dyn-compatibility.
pub trait DataSource: Send + Sync {
    /// Short label used in logs and errors.
    fn name(&self) -> &str;

    fn fetch(&self) -> BoxFuture<'_, Result<SourcePayload, DataLoadError>>;
}

pub struct FileSource {
    name: String,
    path: PathBuf,
    format: Option<DatasetFormat>,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        Self {
            name: path.display().to_string(),
            path,
            format: None,
        }
    }

    pub fn with_format(mut self, format: DatasetFormat) -> Self {
        self.format = Some(format);
        self
    }
}

impl DataSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> BoxFuture<'_, Result<SourcePayload, DataLoadError>> {
        Box::pin(async move {
            let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
                DataLoadError::unreachable_with_cause(&self.name, "failed to read file", e)
            })?;
            Ok(SourcePayload {
                bytes,
                content_type: None,
                path_hint: Some(self.path.to_string_lossy().into_owned()),
                format: self.format,
            })
        })
    }
}

pub struct HttpSource {
    url: String,
    client: reqwest::Client,
    format: Option<DatasetFormat>,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(url, reqwest::Client::new())
    }

    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
            format: None,
        }
    }

    pub fn with_format(mut self, format: DatasetFormat) -> Self {
        self.format = Some(format);
        self
    }
}

impl DataSource for HttpSource {
    fn name(&self) -> &str {
        &self.url
    }

    fn fetch(&self) -> BoxFuture<'_, Result<SourcePayload, DataLoadError>> {
        Box::pin(async move {
            let resp = self.client.get(&self.url).send().await.map_err(|e| {
                DataLoadError::unreachable_with_cause(&self.url, "HTTP request failed", e)
            })?;

            if !resp.status().is_success() {
                return Err(DataLoadError::Status {
                    source_name: self.url.clone(),
                    status: resp.status().as_u16(),
                });
            }

            let content_type = resp
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let path_hint = Some(resp.url().path().to_string());

            let bytes = resp.bytes().await.map_err(|e| {
                DataLoadError::unreachable_with_cause(&self.url, "failed to read response", e)
            })?;

            Ok(SourcePayload {
                bytes: bytes.to_vec(),
                content_type,
                path_hint,
                format: self.format,
            })
        })
    }
}

/// In-memory source for tests or datasets embedded in the host page.
#[derive(Debug, Clone)]
pub struct MemorySource {
    name: String,
    payload: SourcePayload,
}

impl MemorySource {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            payload: SourcePayload {
                bytes: bytes.into(),
                content_type: None,
                path_hint: None,
                format: None,
            },
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.payload.content_type = Some(content_type.into());
        self
    }

    pub fn with_format(mut self, format: DatasetFormat) -> Self {
        self.payload.format = Some(format);
        self
    }
}

impl DataSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> BoxFuture<'_, Result<SourcePayload, DataLoadError>> {
        let payload = self.payload.clone();
        Box::pin(async move { Ok(payload) })
    }
}

use formats::{DatasetFormat, FormatError, SurveyPoint, parse_points};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::DataLoadError;
use crate::source::DataSource;

/// Content types that carry no format information but may hold a dataset.
const GENERIC_CONTENT_TYPES: &[&str] = &[
    "text/plain",
    "application/octet-stream",
    "binary/octet-stream",
];

/// A fully parsed dataset, ready to be swapped into a [`crate::PointIndex`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDataset {
    pub points: Vec<SurveyPoint>,
    pub format: DatasetFormat,
    /// blake3 of the raw payload, hex encoded.
    pub content_hash: String,
    pub skipped: usize,
}

impl LoadedDataset {
    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            points: self.points.len(),
            skipped: self.skipped,
            format: self.format,
            content_hash: self.content_hash.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub points: usize,
    pub skipped: usize,
    pub format: DatasetFormat,
    pub content_hash: String,
}

pub fn content_hash(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

/// Fetch and parse a dataset.
///
/// Fails as a whole when the source cannot be fetched, declares a content
/// type that cannot hold a dataset, is not a structurally valid document, or
/// holds records none of which are usable. Individually malformed records are
/// skipped (and logged) by the parsers.
pub async fn load(source: &dyn DataSource) -> Result<LoadedDataset, DataLoadError> {
    let name = source.name().to_string();
    let payload = source.fetch().await?;

    if let Some(ct) = payload.content_type.as_deref()
        && !is_dataset_content_type(ct)
    {
        return Err(DataLoadError::ContentType {
            source_name: name,
            content_type: ct.to_string(),
        });
    }

    let hash = content_hash(&payload.bytes);
    let text = std::str::from_utf8(&payload.bytes).map_err(|_| DataLoadError::Malformed {
        source_name: name.clone(),
        error: FormatError::InvalidUtf8,
    })?;

    let format = payload
        .format
        .or_else(|| {
            DatasetFormat::detect(
                payload.content_type.as_deref(),
                payload.path_hint.as_deref(),
                text,
            )
        })
        .ok_or_else(|| DataLoadError::Malformed {
            source_name: name.clone(),
            error: FormatError::UnknownFormat,
        })?;

    let parsed = parse_points(format, text).map_err(|error| DataLoadError::Malformed {
        source_name: name.clone(),
        error,
    })?;

    if parsed.points.is_empty() && !parsed.skipped.is_empty() {
        return Err(DataLoadError::NoValidRecords {
            source_name: name,
            skipped: parsed.skipped.len(),
        });
    }
    if parsed.record_count() == 0 {
        warn!("dataset {name} contains no records");
    }

    info!(
        "loaded {} points from {name} ({format}, {} skipped)",
        parsed.points.len(),
        parsed.skipped.len()
    );

    Ok(LoadedDataset {
        skipped: parsed.skipped.len(),
        points: parsed.points,
        format,
        content_hash: hash,
    })
}

fn is_dataset_content_type(content_type: &str) -> bool {
    if DatasetFormat::from_content_type(content_type).is_some() {
        return true;
    }
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime.is_empty() || GENERIC_CONTENT_TYPES.contains(&mime.as_str())
}

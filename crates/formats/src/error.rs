/// Top-level (whole document) parse failure.
///
/// Per-record problems never produce this; they are reported as
/// [`crate::SkippedRecord`]s instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    InvalidUtf8,
    InvalidJson(String),
    NotAFeatureCollection,
    NotKml,
    UnknownFormat,
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatError::InvalidUtf8 => write!(f, "document is not valid UTF-8"),
            FormatError::InvalidJson(msg) => write!(f, "JSON parse error: {msg}"),
            FormatError::NotAFeatureCollection => {
                write!(f, "expected GeoJSON FeatureCollection")
            }
            FormatError::NotKml => write!(f, "expected a <kml> document"),
            FormatError::UnknownFormat => write!(f, "unrecognized dataset format"),
        }
    }
}

impl std::error::Error for FormatError {}

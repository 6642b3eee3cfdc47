use formats::FormatError;

type Cause = Box<dyn std::error::Error + Send + Sync>;

/// A dataset load that failed as a whole.
///
/// Malformed individual records never produce this; they are skipped during
/// parsing. Callers are expected to surface this (e.g. with a retry action)
/// rather than fall back to an empty dataset.
#[derive(Debug)]
pub enum DataLoadError {
    Unreachable {
        source_name: String,
        message: String,
        cause: Option<Cause>,
    },
    Status {
        source_name: String,
        status: u16,
    },
    ContentType {
        source_name: String,
        content_type: String,
    },
    Malformed {
        source_name: String,
        error: FormatError,
    },
    NoValidRecords {
        source_name: String,
        skipped: usize,
    },
}

impl DataLoadError {
    pub fn unreachable(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        DataLoadError::Unreachable {
            source_name: source_name.into(),
            message: message.into(),
            cause: None,
        }
    }

    pub fn unreachable_with_cause(
        source_name: impl Into<String>,
        message: impl Into<String>,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        DataLoadError::Unreachable {
            source_name: source_name.into(),
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    pub fn source_name(&self) -> &str {
        match self {
            DataLoadError::Unreachable { source_name, .. }
            | DataLoadError::Status { source_name, .. }
            | DataLoadError::ContentType { source_name, .. }
            | DataLoadError::Malformed { source_name, .. }
            | DataLoadError::NoValidRecords { source_name, .. } => source_name,
        }
    }

    /// Whether retrying the same source later could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            DataLoadError::Unreachable { .. } => true,
            DataLoadError::Status { status, .. } => *status == 408 || *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl std::fmt::Display for DataLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataLoadError::Unreachable {
                source_name,
                message,
                ..
            } => write!(f, "dataset {source_name} unreachable: {message}"),
            DataLoadError::Status {
                source_name,
                status,
            } => write!(f, "dataset {source_name} returned HTTP {status}"),
            DataLoadError::ContentType {
                source_name,
                content_type,
            } => write!(
                f,
                "dataset {source_name} has unexpected content type {content_type}"
            ),
            DataLoadError::Malformed { source_name, error } => {
                write!(f, "dataset {source_name} is malformed: {error}")
            }
            DataLoadError::NoValidRecords {
                source_name,
                skipped,
            } => write!(
                f,
                "dataset {source_name} has no valid records ({skipped} skipped)"
            ),
        }
    }
}

impl std::error::Error for DataLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataLoadError::Unreachable { cause, .. } => cause.as_ref().map(|e| e.as_ref() as _),
            DataLoadError::Malformed { error, .. } => Some(error),
            _ => None,
        }
    }
}

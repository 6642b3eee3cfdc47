use serde::{Deserialize, Serialize};

use crate::error::FormatError;
use crate::geojson::parse_geojson_points;
use crate::kml::parse_kml_points;
use crate::point::ParsedPoints;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetFormat {
    GeoJson,
    Kml,
}

impl DatasetFormat {
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        if mime.ends_with("json") {
            Some(DatasetFormat::GeoJson)
        } else if mime.contains("kml") || mime.ends_with("/xml") {
            Some(DatasetFormat::Kml)
        } else {
            None
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        let ext = path.rsplit_once('.')?.1.to_ascii_lowercase();
        match ext.as_str() {
            "json" | "geojson" => Some(DatasetFormat::GeoJson),
            "kml" | "xml" => Some(DatasetFormat::Kml),
            _ => None,
        }
    }

    /// Guess from the first non-whitespace character of the payload.
    pub fn sniff(payload: &str) -> Option<Self> {
        match payload
            .trim_start_matches('\u{feff}')
            .trim_start()
            .chars()
            .next()?
        {
            '{' | '[' => Some(DatasetFormat::GeoJson),
            '<' => Some(DatasetFormat::Kml),
            _ => None,
        }
    }

    /// Resolve the format from the strongest available hint:
    /// content type, then path extension, then payload sniffing.
    pub fn detect(content_type: Option<&str>, path: Option<&str>, payload: &str) -> Option<Self> {
        content_type
            .and_then(Self::from_content_type)
            .or_else(|| path.and_then(Self::from_path))
            .or_else(|| Self::sniff(payload))
    }
}

impl std::fmt::Display for DatasetFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetFormat::GeoJson => write!(f, "geojson"),
            DatasetFormat::Kml => write!(f, "kml"),
        }
    }
}

pub fn parse_points(format: DatasetFormat, payload: &str) -> Result<ParsedPoints, FormatError> {
    match format {
        DatasetFormat::GeoJson => parse_geojson_points(payload),
        DatasetFormat::Kml => parse_kml_points(payload),
    }
}

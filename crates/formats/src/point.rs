use foundation::geo::LatLng;
use serde::{Deserialize, Serialize};

/// A named survey cell location, normalized from any supported dataset format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyPoint {
    /// Synthetic id derived from the record's position in the source.
    pub id: String,
    /// User-facing search key. Never empty.
    pub cell_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub lat: f64,
    pub lng: f64,
}

impl SurveyPoint {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

/// Synthetic point id for the record at `index` in its source document.
pub fn synthetic_id(index: usize) -> String {
    format!("pt-{index}")
}

/// Fallback cell id for records that carry no usable identifier.
pub fn fallback_cell_id(index: usize) -> String {
    format!("Point_{index}")
}

/// A source record that was dropped during parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPoints {
    pub points: Vec<SurveyPoint>,
    pub skipped: Vec<SkippedRecord>,
}

impl ParsedPoints {
    /// Number of records seen in the source, valid or not.
    pub fn record_count(&self) -> usize {
        self.points.len() + self.skipped.len()
    }
}

pub(crate) fn non_empty_trimmed(s: &str) -> Option<String> {
    let t = s.trim();
    (!t.is_empty()).then(|| t.to_string())
}

use foundation::geo::LatLng;
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::FormatError;
use crate::point::{
    ParsedPoints, SkippedRecord, SurveyPoint, fallback_cell_id, non_empty_trimmed, synthetic_id,
};

/// Property keys holding the cell identifier, in priority order.
pub const CELL_ID_KEYS: &[&str] = &["cell_id", "cellId", "CELL_ID", "cell"];
/// Property keys holding a human-readable name, in priority order.
pub const NAME_KEYS: &[&str] = &["name", "Name"];

pub fn parse_geojson_points(payload: &str) -> Result<ParsedPoints, FormatError> {
    let value: Value =
        serde_json::from_str(payload).map_err(|e| FormatError::InvalidJson(e.to_string()))?;
    parse_geojson_value(&value)
}

/// Accepts a `FeatureCollection` object or a bare array of features.
///
/// Anything else at the top level is fatal. Individual features that are not
/// usable points are skipped and reported in [`ParsedPoints::skipped`].
pub fn parse_geojson_value(value: &Value) -> Result<ParsedPoints, FormatError> {
    let features = match value {
        Value::Array(items) => items,
        Value::Object(obj) => {
            let ty = obj
                .get("type")
                .and_then(|v| v.as_str())
                .ok_or(FormatError::NotAFeatureCollection)?;
            if ty != "FeatureCollection" {
                return Err(FormatError::NotAFeatureCollection);
            }
            obj.get("features")
                .and_then(|v| v.as_array())
                .ok_or(FormatError::NotAFeatureCollection)?
        }
        _ => return Err(FormatError::NotAFeatureCollection),
    };

    let mut out = ParsedPoints::default();
    for (index, feature) in features.iter().enumerate() {
        match parse_feature(index, feature) {
            Ok(point) => out.points.push(point),
            Err(reason) => {
                warn!("skipping GeoJSON feature {index}: {reason}");
                out.skipped.push(SkippedRecord { index, reason });
            }
        }
    }
    Ok(out)
}

fn parse_feature(index: usize, value: &Value) -> Result<SurveyPoint, String> {
    let obj = value
        .as_object()
        .ok_or("feature must be an object".to_string())?;

    if let Some(ty) = obj.get("type").and_then(|v| v.as_str())
        && ty != "Feature"
    {
        return Err(format!("unexpected feature type: {ty}"));
    }

    let geometry = obj
        .get("geometry")
        .filter(|v| !v.is_null())
        .ok_or("feature missing geometry".to_string())?;
    let position = parse_point_geometry(geometry)?;

    let empty = Map::new();
    let props = obj
        .get("properties")
        .and_then(|v| v.as_object())
        .unwrap_or(&empty);

    let display_name = first_text(props, NAME_KEYS);
    let cell_id = first_text(props, CELL_ID_KEYS)
        .or_else(|| display_name.clone())
        .unwrap_or_else(|| fallback_cell_id(index));

    Ok(SurveyPoint {
        id: synthetic_id(index),
        cell_id,
        display_name,
        lat: position.lat,
        lng: position.lng,
    })
}

fn parse_point_geometry(value: &Value) -> Result<LatLng, String> {
    let obj = value
        .as_object()
        .ok_or("geometry must be an object".to_string())?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("geometry missing type".to_string())?;
    if ty != "Point" {
        return Err(format!("unsupported geometry type: {ty}"));
    }

    let arr = obj
        .get("coordinates")
        .ok_or("geometry missing coordinates".to_string())?
        .as_array()
        .ok_or("Point coordinates must be an array".to_string())?;
    if arr.len() < 2 {
        return Err("Point coordinates must have [lng, lat]".to_string());
    }
    let lng = arr[0]
        .as_f64()
        .ok_or("Point lng must be a number".to_string())?;
    let lat = arr[1]
        .as_f64()
        .ok_or("Point lat must be a number".to_string())?;

    LatLng::checked(lat, lng).ok_or(format!("coordinates out of range: [{lng}, {lat}]"))
}

/// First property among `keys` that holds a non-empty string or a number.
fn first_text(props: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match props.get(*key) {
        Some(Value::String(s)) => non_empty_trimmed(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

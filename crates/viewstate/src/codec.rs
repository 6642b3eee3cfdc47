//! URL encoding of the map view.
//!
//! Fragment grammar (read both, write compact only):
//! - legacy: `<zoom>/<lat>/<lng>` with lat/lng at 5 decimal places
//! - compact: `map_<zoom>_<latInt>_<lngInt>` with `latInt = round(lat * 1e5)`
//!
//! The selected cell travels separately in the query string as `id=<cellId>`.
//!
//! Rounding is half away from zero (`f64::round`) for both zoom and the
//! scaled coordinates. Decoding never fails: anything unrecognized yields an
//! empty state and a warning.

use foundation::geo::{LatLng, clamp_zoom, is_valid_zoom};
use tracing::warn;
use url::{Url, form_urlencoded};

use crate::state::{MapPosition, PartialViewState};

pub const COMPACT_PREFIX: &str = "map_";
/// Fixed-point scale for compact coordinates (5 decimal places).
pub const COORD_SCALE: f64 = 100_000.0;
pub const CELL_ID_PARAM: &str = "id";

/// Decode the part of a URL after `#`. A leading `#` is tolerated.
pub fn decode_fragment(fragment: &str) -> PartialViewState {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    if fragment.is_empty() {
        return PartialViewState::default();
    }

    let decoded = if fragment.contains('/') {
        decode_legacy(fragment)
    } else if let Some(body) = fragment.strip_prefix(COMPACT_PREFIX) {
        decode_compact(body)
    } else {
        Err("unrecognized fragment format")
    };

    match decoded {
        Ok(position) => PartialViewState {
            position: Some(position),
            cell_id: None,
        },
        Err(reason) => {
            warn!("ignoring URL fragment {fragment:?}: {reason}");
            PartialViewState::default()
        }
    }
}

fn decode_legacy(fragment: &str) -> Result<MapPosition, &'static str> {
    let parts: Vec<&str> = fragment.split('/').collect();
    let [zoom, lat, lng] = parts[..] else {
        return Err("legacy fragment needs exactly 3 parts");
    };
    let parse = |s: &str| s.parse::<f64>().ok().filter(|v| v.is_finite());
    let (Some(zoom), Some(lat), Some(lng)) = (parse(zoom), parse(lat), parse(lng)) else {
        return Err("legacy fragment has a non-numeric part");
    };
    if !is_valid_zoom(zoom.round() as i64) {
        return Err("zoom out of range");
    }
    checked_position(clamp_zoom(zoom), lat, lng)
}

fn decode_compact(body: &str) -> Result<MapPosition, &'static str> {
    let parts: Vec<&str> = body.split('_').collect();
    let [zoom, lat, lng] = parts[..] else {
        return Err("compact fragment needs exactly 3 parts");
    };
    let (Ok(zoom), Ok(lat), Ok(lng)) = (
        zoom.parse::<i64>(),
        lat.parse::<i64>(),
        lng.parse::<i64>(),
    ) else {
        return Err("compact fragment has a non-integer part");
    };
    if !is_valid_zoom(zoom) {
        return Err("zoom out of range");
    }
    checked_position(
        zoom as u8,
        lat as f64 / COORD_SCALE,
        lng as f64 / COORD_SCALE,
    )
}

fn checked_position(zoom: u8, lat: f64, lng: f64) -> Result<MapPosition, &'static str> {
    let center = LatLng::checked(lat, lng).ok_or("coordinates out of range")?;
    Ok(MapPosition { zoom, center })
}

/// Encode a view in the compact form (without the leading `#`).
///
/// Zoom is rounded and clamped to the valid zoom range.
pub fn encode_fragment(zoom: f64, lat: f64, lng: f64) -> String {
    format!(
        "{COMPACT_PREFIX}{}_{}_{}",
        clamp_zoom(zoom),
        quantize(lat),
        quantize(lng)
    )
}

pub fn encode_position(position: &MapPosition) -> String {
    encode_fragment(
        position.zoom as f64,
        position.center.lat,
        position.center.lng,
    )
}

/// Legacy `<zoom>/<lat>/<lng>` form. Only for links that must stay readable
/// by older viewers; the store always writes the compact form.
pub fn encode_legacy_fragment(zoom: f64, lat: f64, lng: f64) -> String {
    format!("{}/{lat:.5}/{lng:.5}", clamp_zoom(zoom))
}

/// Scale to 5 decimal places and round half away from zero.
///
/// Non-finite input maps to 0.
pub fn quantize(coord: f64) -> i64 {
    round_half_away(coord * COORD_SCALE)
}

fn round_half_away(v: f64) -> i64 {
    // `as` saturates and maps NaN to 0.
    v.round() as i64
}

/// Read the selected cell id from a query string (leading `?` tolerated).
pub fn decode_cell_id(search: &str) -> Option<String> {
    let query = search.strip_prefix('?').unwrap_or(search);
    form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == CELL_ID_PARAM)
        .and_then(|(_, v)| {
            let v = v.trim();
            (!v.is_empty()).then(|| v.to_string())
        })
}

/// Set or remove the `id` parameter, preserving the other parameters.
///
/// The id is trimmed before it is written, the same way
/// [`decode_cell_id`] trims on read, so surrounding whitespace never reaches
/// the URL. Anything else is written as given, percent-encoded. `None`, an
/// empty or a whitespace-only id all remove the parameter.
pub fn encode_cell_id(url: &mut Url, id: Option<&str>) {
    let id = id.map(str::trim).filter(|s| !s.is_empty());

    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut placed = false;
    for (k, v) in url.query_pairs() {
        if k != CELL_ID_PARAM {
            pairs.push((k.into_owned(), v.into_owned()));
            continue;
        }
        if let Some(id) = id
            && !placed
        {
            pairs.push((CELL_ID_PARAM.to_string(), id.to_string()));
            placed = true;
        }
    }
    if let Some(id) = id
        && !placed
    {
        pairs.push((CELL_ID_PARAM.to_string(), id.to_string()));
    }

    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }
}

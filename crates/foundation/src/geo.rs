/// Lowest zoom level a view can be encoded at.
pub const MIN_ZOOM: u8 = 0;
/// Highest zoom level a view can be encoded at.
pub const MAX_ZOOM: u8 = 22;

/// Geographic position in degrees (WGS84).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Builds a position only if both components are finite and in range.
    pub fn checked(lat: f64, lng: f64) -> Option<Self> {
        let p = Self::new(lat, lng);
        p.is_valid().then_some(p)
    }

    pub fn is_valid(&self) -> bool {
        is_valid_lat(self.lat) && is_valid_lng(self.lng)
    }

    /// Same place with longitude wrapped into `[-180, 180]` and latitude
    /// clamped to the poles. `None` if either component is not finite.
    ///
    /// Map widgets report longitudes past 180 after panning across the
    /// antimeridian.
    pub fn normalized(self) -> Option<Self> {
        if !self.lat.is_finite() || !self.lng.is_finite() {
            return None;
        }
        let lng = if is_valid_lng(self.lng) {
            self.lng
        } else {
            (self.lng + 180.0).rem_euclid(360.0) - 180.0
        };
        Some(Self::new(self.lat.clamp(-90.0, 90.0), lng))
    }
}

pub fn is_valid_lat(lat: f64) -> bool {
    lat.is_finite() && (-90.0..=90.0).contains(&lat)
}

pub fn is_valid_lng(lng: f64) -> bool {
    lng.is_finite() && (-180.0..=180.0).contains(&lng)
}

/// Clamp an arbitrary zoom value into `[MIN_ZOOM, MAX_ZOOM]`.
///
/// Rounds half away from zero; NaN maps to `MIN_ZOOM`.
pub fn clamp_zoom(zoom: f64) -> u8 {
    if zoom.is_nan() {
        return MIN_ZOOM;
    }
    zoom.round().clamp(MIN_ZOOM as f64, MAX_ZOOM as f64) as u8
}

pub fn is_valid_zoom(zoom: i64) -> bool {
    (MIN_ZOOM as i64..=MAX_ZOOM as i64).contains(&zoom)
}

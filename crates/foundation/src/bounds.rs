use crate::geo::LatLng;

/// Axis-aligned lat/lng box.
///
/// `west > east` describes a box crossing the antimeridian.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeoBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl GeoBounds {
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        GeoBounds {
            south,
            west,
            north,
            east,
        }
    }

    pub fn world() -> Self {
        GeoBounds::new(-90.0, -180.0, 90.0, 180.0)
    }

    pub fn contains(&self, p: LatLng) -> bool {
        if p.lat < self.south || p.lat > self.north {
            return false;
        }
        if self.west <= self.east {
            p.lng >= self.west && p.lng <= self.east
        } else {
            p.lng >= self.west || p.lng <= self.east
        }
    }
}

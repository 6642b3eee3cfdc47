pub mod dataset;
pub mod error;
pub mod geojson;
pub mod kml;
pub mod point;

pub use dataset::*;
pub use error::*;
pub use geojson::*;
pub use kml::*;
pub use point::*;

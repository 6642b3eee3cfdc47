pub mod bounds;
pub mod geo;
pub mod time;

// Foundation crate: small, well-tested geographic primitives only.
pub use bounds::*;
pub use geo::*;
pub use time::*;

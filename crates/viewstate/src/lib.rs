pub mod codec;
pub mod location;
pub mod state;
pub mod store;

pub use codec::*;
pub use location::*;
pub use state::*;
pub use store::*;

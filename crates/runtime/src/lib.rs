pub mod event_bus;
pub mod mailbox;
pub mod timers;

pub use event_bus::*;
pub use mailbox::*;
pub use timers::*;

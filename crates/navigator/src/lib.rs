pub mod config;
pub mod navigator;
pub mod widget;

pub use config::*;
pub use navigator::*;
pub use widget::*;

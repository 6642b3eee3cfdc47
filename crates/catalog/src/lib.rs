pub mod error;
pub mod index;
pub mod load;
pub mod source;

pub use error::*;
pub use index::*;
pub use load::*;
pub use source::*;

pub use formats::{DatasetFormat, SurveyPoint};

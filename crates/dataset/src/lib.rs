pub mod catalog;
pub mod names;
pub mod record;
pub mod selection;

pub use catalog::*;
pub use names::*;
pub use record::*;
pub use selection::*;

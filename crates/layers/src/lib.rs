pub mod boundary;
pub mod symbology;
pub mod viewport;

pub use boundary::*;
pub use symbology::*;
pub use viewport::*;

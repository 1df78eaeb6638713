pub mod debounce;
pub mod frame;
pub mod highlight_bus;
pub mod transition;

pub use debounce::*;
pub use frame::*;
pub use highlight_bus::*;
pub use transition::*;

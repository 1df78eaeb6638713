pub mod collaborators;
pub mod config;
pub mod format;
pub mod loader;
pub mod session;
pub mod telemetry;
pub mod tooltip;
pub mod view;

pub use collaborators::*;
pub use config::*;
pub use loader::*;
pub use session::*;
pub use telemetry::init_tracing;
pub use view::*;

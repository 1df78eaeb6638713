pub mod analysis;
pub mod cluster;
pub mod pipeline;

pub use analysis::rollup::*;
pub use cluster::*;
pub use pipeline::*;

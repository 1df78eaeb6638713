pub mod boundaries;
pub mod geojson;
pub mod records;
pub mod topojson;

pub use boundaries::*;
pub use records::*;

pub mod rollup;
pub mod statistics;
pub mod temporal;

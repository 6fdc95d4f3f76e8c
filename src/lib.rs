pub mod algorithms;
pub mod blade;
pub mod config;
pub mod errors;
pub mod geometry;
pub mod geomturbo;
pub mod injection;
pub mod pipeline;
pub mod serialize;
pub mod units;

pub mod common;
pub mod curve3;

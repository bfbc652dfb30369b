pub mod common;
pub mod tags;

pub mod class;
pub mod file;
pub mod relocatable;

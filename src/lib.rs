//! Compiles a scenario tag and everything it references into a single cache file.
//!
//! The pipeline resolves the tag graph ([`build::resolver`]), reshapes tags through the per-class
//! [`hooks`], and finally lays out and relocates everything into the output buffer ([`link`]).

pub mod build;
pub mod hooks;
pub mod io;
pub mod link;
pub mod pixel;
pub mod script;

pub use build::{BuildOptions, BuildParameters, compile_map};
pub use link::BuiltCache;

//! Field layouts of the tag classes the build pipeline inspects or rewrites.
//!
//! Offsets are relative to the start of the respective struct or array element. Everything is little
//! endian except for script node tables, which are stored big endian inside of tag files.

pub mod bitmap;
pub mod bsp;
pub mod fog;
pub mod model;
pub mod object;
pub mod particle;
pub mod scenario;
pub mod script;
pub mod shader;
pub mod sound;

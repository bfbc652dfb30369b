pub mod endian;
pub mod reader;
pub mod types;
pub mod writer;

#[cfg(test)]
mod tests;

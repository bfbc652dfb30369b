use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("The file's magic value does not match the expectation {magic:#010x}")]
    InvalidMagicValue { magic: u32 },

    #[error("The file is violating the expected format, because: {reason}")]
    FormatError { reason: &'static str },

    #[error("Missing mandatory {magic} chunk")]
    MissingChunk { magic: &'static str },

    #[error("Unknown tag class {class:#010x}")]
    UnknownTagClass { class: u32 },

    /// An access of `size` bytes at `offset` into a buffer of `len` bytes.
    #[error("Access of {size} bytes at offset {offset:#x} is out of bounds (length {len:#x})")]
    OutOfBounds { offset: usize, size: usize, len: usize },

    /// Represents an empty source, e.g. a zero-length tag file.
    #[error("Source contains no data")]
    EmptySource,

    /// Represents all other cases of `std::io::Error`.
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    #[error(transparent)]
    StringConversationError(#[from] std::ffi::IntoStringError),

    #[error(transparent)]
    UTF8ConversationError(#[from] std::string::FromUtf8Error),
}

pub mod cache;
pub mod common;
pub mod definitions;
pub mod resource;
pub mod tag;

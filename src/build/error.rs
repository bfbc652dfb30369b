use tagforge_files::ParserError;
use tagforge_files::tag::class::TagClass;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("{path}.{class} was not found in any tags directory")]
    TagNotFound { path: String, class: TagClass },

    #[error("{path} was referenced as {expected} but is a {actual}")]
    ClassMismatch {
        path: String,
        expected: TagClass,
        actual: TagClass,
    },

    #[error("Invalid pointer at {offset:#x} to {offset_pointed:#x} (struct is {size:#x} bytes)")]
    InvalidPointer {
        offset: usize,
        offset_pointed: usize,
        size: usize,
    },

    #[error("Invalid dependency at {offset:#x} (struct is {size:#x} bytes)")]
    InvalidDependency { offset: usize, size: usize },

    #[error("Invalid reference: {reason}")]
    InvalidReference { reason: String },

    #[error("Invalid tag data: {reason}")]
    InvalidTagData { reason: String },

    #[error(transparent)]
    Parse(#[from] ParserError),

    #[error("{count} tags exceed the maximum of {limit}")]
    TagCountExceeded { count: usize, limit: usize },

    #[error(
        "Tag data ({tag_data_size} bytes) plus the largest BSP ({largest_bsp} bytes) exceed the tag space of {limit} bytes"
    )]
    TagDataBudgetExceeded {
        tag_data_size: usize,
        largest_bsp: usize,
        limit: usize,
    },

    #[error("The cache file ({size} bytes) exceeds the maximum of {limit} bytes")]
    FileSizeExceeded { size: usize, limit: usize },

    #[error("Scripts compiled into {count} nodes, exceeding the maximum of {limit}")]
    ScriptNodeLimitExceeded { count: usize, limit: usize },

    #[error("Script compilation failed: {0}")]
    ScriptCompile(String),

    #[error("Duplicate object name {name}")]
    DuplicateObjectName { name: String },

    #[error("Invalid child scenario {path}: {reason}")]
    InvalidChildScenario { path: String, reason: &'static str },

    #[error("{0}")]
    Semantic(String),

    #[error("Invalid scenario name {name:?}: {reason}")]
    InvalidScenarioName { name: String, reason: &'static str },

    #[error("Failed to compile {path}.{class}: {source}")]
    CompileFailed {
        path: String,
        class: TagClass,
        source: Box<BuildError>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BuildError {
    /// Errors about the meaning of otherwise well-formed data. Only these may be downgraded.
    pub fn is_semantic(&self) -> bool {
        matches!(self, BuildError::Semantic(_) | BuildError::DuplicateObjectName { .. })
    }

    /// Strips the per-tag context.
    pub fn root_cause(&self) -> &BuildError {
        match self {
            BuildError::CompileFailed { source, .. } => source.root_cause(),
            err => err,
        }
    }

    /// Attaches the tag being compiled, unless a deeper tag already did.
    pub fn in_tag(self, path: &str, class: TagClass) -> BuildError {
        match self {
            err @ BuildError::CompileFailed { .. } => err,
            err => BuildError::CompileFailed {
                path: path.to_owned(),
                class,
                source: Box::new(err),
            },
        }
    }

    pub fn invalid_data(reason: impl Into<String>) -> BuildError {
        BuildError::InvalidTagData { reason: reason.into() }
    }
}

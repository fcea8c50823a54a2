use thiserror::Error;

/// Errors raised while reading an edge list.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EdgeListError {
    /// The reader failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// No line of the input described an edge.
    #[error("input contains no edges")]
    EmptyInput,
}

impl EdgeListError {
    /// Returns a stable machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "EDGE_LIST_IO",
            Self::EmptyInput => "EDGE_LIST_EMPTY_INPUT",
        }
    }
}

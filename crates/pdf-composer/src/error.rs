use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComposerError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No pages to merge")]
    Empty,

    #[error("Input document {index} has {pages} pages, expected exactly one")]
    NotSinglePage { index: usize, pages: usize },

    #[error("Merged document has {actual} pages, expected {expected}")]
    PageCountMismatch { expected: usize, actual: usize },

    #[error("{0}")]
    Other(String),
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PptxError {
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported image data for slide {slide}: expected PNG or JPEG")]
    UnsupportedImage { slide: usize },

    #[error("A presentation needs at least one slide")]
    Empty,

    #[error("Invalid slide size {cx}x{cy} EMU")]
    InvalidSize { cx: i64, cy: i64 },
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MrawError {
    #[error("Precondition violated: {0}")]
    Precondition(String),

    #[error("Short read at offset {offset}: expected {expected} bytes, only {available} available")]
    ShortRead {
        offset: u64,
        expected: usize,
        available: usize,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid frame dimensions: rows={0}, columns={1}")]
    InvalidDimensions(u32, u32),

    #[error("Invalid CIH metadata: {0}")]
    Metadata(String),

    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MrawError>;

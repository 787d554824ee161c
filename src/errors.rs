use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistogramError {
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid image format in '{path}' (must be 'P6')")]
    InvalidMagic { path: PathBuf },

    #[error("Malformed header in '{path}': {message}")]
    MalformedHeader { path: PathBuf, message: String },

    #[error("Image '{path}' does not have 8-bit components (max value {max_value})")]
    UnsupportedMaxValue { path: PathBuf, max_value: u32 },

    #[error("Truncated pixel data in '{path}': expected {expected} bytes, found {actual}")]
    TruncatedData {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    #[error("Failed to encode '{path}': {message}")]
    Encode { path: PathBuf, message: String },

    #[error("Invalid bin divisions {divisions}: must be between 1 and {max}")]
    InvalidDivisions { divisions: usize, max: usize },

    #[error("Invalid iteration count {iterations}: must be at least 1")]
    InvalidIterations { iterations: usize },

    #[error("Invalid thread count {threads}: must be at least 1")]
    InvalidThreadCount { threads: usize },

    #[error("Pixel data length {actual} does not match {width}x{height}")]
    DimensionMismatch {
        width: usize,
        height: usize,
        actual: usize,
    },

    #[error("Histogram has {actual} bins but {divisions} divisions need {expected}")]
    HistogramSizeMismatch {
        divisions: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Cannot normalize histogram of an empty image ({width}x{height})")]
    EmptyImage { width: usize, height: usize },

    #[error("Only {counted} of {total} pixels fall inside the bin space; was the image quantized?")]
    UnquantizedPixels { counted: u64, total: usize },

    #[error("Thread pool error: {message}")]
    ThreadPool { message: String },

    #[error("Settings error: {message}")]
    Settings { message: String },
}

pub type Result<T> = std::result::Result<T, HistogramError>;

impl HistogramError {
    /// True for errors raised while reading the input image.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            HistogramError::FileNotFound { .. }
                | HistogramError::Io { .. }
                | HistogramError::InvalidMagic { .. }
                | HistogramError::MalformedHeader { .. }
                | HistogramError::UnsupportedMaxValue { .. }
                | HistogramError::TruncatedData { .. }
        )
    }

    /// Returns a user-friendly error message with a hint about what to fix
    pub fn user_message(&self) -> String {
        let base_message = self.to_string();
        let suggestion = match self {
            HistogramError::FileNotFound { .. } => "Check the image path and try again.",
            HistogramError::Io { .. } => "Check file permissions and that the file is readable.",
            HistogramError::InvalidMagic { .. } | HistogramError::MalformedHeader { .. } => {
                "Only binary PPM (P6) images are supported. Convert the image first."
            }
            HistogramError::UnsupportedMaxValue { .. } => {
                "Only 8-bit channels (max value 255) are supported."
            }
            HistogramError::TruncatedData { .. } => "The image file appears to be truncated.",
            HistogramError::InvalidDivisions { .. } => "Pass a smaller --divisions value.",
            HistogramError::InvalidIterations { .. } => "Pass --iterations 1 or more.",
            HistogramError::InvalidThreadCount { .. } => "Pass --threads 1 or more.",
            HistogramError::EmptyImage { .. } => "The image has no pixels to count.",
            HistogramError::Settings { .. } => "Fix or remove the settings file.",
            _ => "An unexpected error occurred.",
        };

        format!("{}\n\n{}", base_message, suggestion)
    }

    /// Returns an error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            HistogramError::FileNotFound { .. } => "FILE_NOT_FOUND",
            HistogramError::Io { .. } => "IO_ERROR",
            HistogramError::InvalidMagic { .. } => "INVALID_MAGIC",
            HistogramError::MalformedHeader { .. } => "MALFORMED_HEADER",
            HistogramError::UnsupportedMaxValue { .. } => "UNSUPPORTED_MAX_VALUE",
            HistogramError::TruncatedData { .. } => "TRUNCATED_DATA",
            HistogramError::Encode { .. } => "ENCODE_ERROR",
            HistogramError::InvalidDivisions { .. } => "INVALID_DIVISIONS",
            HistogramError::InvalidIterations { .. } => "INVALID_ITERATIONS",
            HistogramError::InvalidThreadCount { .. } => "INVALID_THREAD_COUNT",
            HistogramError::DimensionMismatch { .. } => "DIMENSION_MISMATCH",
            HistogramError::HistogramSizeMismatch { .. } => "HISTOGRAM_SIZE_MISMATCH",
            HistogramError::EmptyImage { .. } => "EMPTY_IMAGE",
            HistogramError::UnquantizedPixels { .. } => "UNQUANTIZED_PIXELS",
            HistogramError::ThreadPool { .. } => "THREAD_POOL_ERROR",
            HistogramError::Settings { .. } => "SETTINGS_ERROR",
        }
    }

    /// Logs the error with its code
    pub fn log(&self) {
        tracing::error!(code = self.error_code(), "{}", self);
    }
}

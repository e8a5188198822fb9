use thiserror::Error;

pub type Result<T> = std::result::Result<T, TreemapError>;

#[derive(Debug, Error)]
pub enum TreemapError {
    #[error("no records to aggregate")]
    EmptyInput,

    #[error("invalid field `{field}`: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("invalid bounds: width={w}, height={h}")]
    InvalidBounds { w: f64, h: f64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid record at row {row}: {message}")]
    InvalidRecord { row: usize, message: String },
}

impl TreemapError {
    pub(crate) fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        TreemapError::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RecommendError>;

#[derive(Debug, Error)]
pub enum RecommendError {
    /// The source table is malformed or incomplete.
    #[error("data format error: {0}")]
    DataFormat(String),

    /// A caller passed an argument outside the operation's contract.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for RecommendError {
    fn from(err: csv::Error) -> Self {
        RecommendError::DataFormat(err.to_string())
    }
}

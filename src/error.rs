use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoolboxError {
    /// A pipeline option has an unknown or malformed value, or the
    /// user-supplied process function failed.
    #[error("invalid `{option}`: {message}")]
    Configuration { option: &'static str, message: String },

    /// Malformed annotation file line (1-based).
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("invalid matrix: {0}")]
    InvalidMatrix(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoolboxError>;

impl CoolboxError {
    pub fn config(option: &'static str, message: impl Into<String>) -> Self {
        CoolboxError::Configuration {
            option,
            message: message.into(),
        }
    }

    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        CoolboxError::Parse {
            line,
            message: message.into(),
        }
    }
}

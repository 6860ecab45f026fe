//! Error types for bit stream operations

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BitStreamError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("Read of {requested} bits exceeds the {available} bits remaining")]
    Underflow { requested: usize, available: usize },

    #[error("Write of {requested} bits exceeds the {available} bits supplied")]
    Overflow { requested: usize, available: usize },

    #[error("String of {0} code units exceeds the 65535 unit limit")]
    StringTooLong(usize),

    #[error("Decoded text is not valid UTF-16: {0}")]
    InvalidText(#[from] std::string::FromUtf16Error),

    #[error("Compact integer text is not a number: {0:?}")]
    InvalidNumber(String),

    #[error("Schema error: {0}")]
    Schema(String),
}

pub type Result<T> = std::result::Result<T, BitStreamError>;

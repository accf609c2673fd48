use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown column: {0}")]
    UnknownColumn(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;

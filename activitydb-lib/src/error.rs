use std::fmt;

#[derive(Debug)]
pub enum ActivityDbError {
    DataFileNotFound(String),
    DataError(String),
    EmptyTable,
}

pub type Result<T> = std::result::Result<T, ActivityDbError>;

impl fmt::Display for ActivityDbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DataFileNotFound(name) => write!(f, "data file not found: {name}"),
            Self::DataError(msg) => write!(f, "data error: {msg}"),
            Self::EmptyTable => write!(f, "activity table has no temperature rows"),
        }
    }
}

impl std::error::Error for ActivityDbError {}

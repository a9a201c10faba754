//! Crate-level error type.

use thiserror::Error;

use crate::datatype::DataTypeError;
use crate::formats::ParseError;

/// Errors that can occur while loading an alignment.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    DataType(#[from] DataTypeError),

    /// A broken invariant, not caused by the input.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns true if the error can be fixed by editing the input file.
    pub fn is_user_fixable(&self) -> bool {
        match self {
            Error::Parse(e) => e.is_user_fixable(),
            Error::DataType(e) => e.is_user_fixable(),
            Error::Internal(_) => false,
        }
    }
}

/// Result type for loading operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_user_fixable() {
        let parse: Error = ParseError::UnknownFormat.into();
        assert!(parse.is_user_fixable());

        let io: Error = ParseError::from(io::Error::new(io::ErrorKind::NotFound, "gone")).into();
        assert!(!io.is_user_fixable());

        let typing: Error = DataTypeError::AllUnknown { count: 3 }.into();
        assert!(typing.is_user_fixable());
        assert_eq!(
            typing.to_string(),
            "Cannot determine data type because all 3 sequences are of type unknown"
        );

        assert!(!Error::Internal("alignment without length".to_string()).is_user_fixable());
    }
}

//! Caller-surfaced errors for tree construction and querying.

use crate::data::Distance;
use std::collections::TryReserveError;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Build was handed an empty key set; a tree needs at least one key.
    EmptyKeySet,
    /// Query radius above the key width; no key can be that far away.
    DistanceOutOfRange { maxd: Distance },
    /// A data-dependent allocation failed during build or result growth.
    OutOfMemory,
    /// A config file could not be read, written, or parsed.
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyKeySet => {
                write!(f, "cannot build a tree from an empty key set")
            }
            Error::DistanceOutOfRange { maxd } => {
                write!(f, "query distance {} is outside the valid range 0..=32", maxd)
            }
            Error::OutOfMemory => {
                write!(f, "allocation failed")
            }
            Error::Config(msg) => {
                write!(f, "config error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<TryReserveError> for Error {
    fn from(_e: TryReserveError) -> Error {
        Error::OutOfMemory
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn messages_name_the_failure() {
        let e = Error::DistanceOutOfRange { maxd: 40 };
        assert!(e.to_string().contains("40"));

        let e = Error::Config("no such file".to_string());
        assert!(e.to_string().contains("no such file"));
    }
}

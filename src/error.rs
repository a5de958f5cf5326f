use thiserror::Error;

/// Failures reported by [`BoundedLru`](crate::BoundedLru).
///
/// Both are raised before any state changes, so a failed call leaves the
/// cache exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The cache was asked to hold fewer than one entry.
    #[error("invalid cache capacity {capacity}: must be at least 1")]
    InvalidConfiguration { capacity: usize },

    /// A key or value was the absent sentinel of its type.
    #[error("{argument} cannot be absent")]
    InvalidArgument { argument: Argument },
}

/// Which side of an entry was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Argument {
    Key,
    Value,
}

impl std::fmt::Display for Argument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Argument::Key => "key",
            Argument::Value => "value",
        })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

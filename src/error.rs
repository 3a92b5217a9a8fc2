use std::{error, fmt};

use crate::source::SourceError;

/// Top-level failure: the one place this crate uses exceptions instead of
/// a cuss, per the "programmer errors only" rule — a bad catalog entry or
/// a source read failure are not things a listing can usefully diagnose
/// card-by-card.
#[derive(Debug, Clone)]
pub enum Error {
    /// The root file, or a `$`-inserted file, could not be read.
    SourceRead(SourceError),
    /// An internal catalog inconsistency (duplicate alias registration,
    /// missing required identity operation). Indicates a bug in this
    /// crate, not in the assembled source.
    Catalog(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceRead(err) => write!(f, "source read failed: {err}"),
            Self::Catalog(msg) => write!(f, "operations catalog inconsistency: {msg}"),
        }
    }
}

impl error::Error for Error {}

impl From<SourceError> for Error {
    fn from(err: SourceError) -> Self {
        Self::SourceRead(err)
    }
}

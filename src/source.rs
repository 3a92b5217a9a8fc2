use std::{error, fmt};

/// A source-fetch failure. The only asynchronous boundary in the assembler
/// (per the design notes): reading the root file and any `$`-inserted file.
#[derive(Debug, Clone)]
pub enum SourceError {
    NotFound(String),
    Io(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "no match found for `{path}`"),
            Self::Io(msg) => write!(f, "{msg}"),
        }
    }
}

impl error::Error for SourceError {}

/// Supplies source lines on demand. A root file plus every file reachable
/// through `$<path>` insertion lines is read through this trait; the pass 1
/// driver walks insertions depth-first as each `Insertion` card is seen.
///
/// Kept synchronous: the problem size (tens of thousands of cards) and the
/// single-threaded, non-parallel assembly model in the spec give no benefit
/// to an async trait here, so suspension is expressed as an ordinary
/// blocking call rather than a future.
pub trait Source {
    /// Returns the lines of the named file, in order, without trailing
    /// newlines.
    fn read_file(&mut self, path: &str) -> Result<Vec<String>, SourceError>;
}

/// A [`Source`] backed by an in-memory map of path to contents, useful for
/// tests and for embedding pre-fetched source.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: std::collections::HashMap<String, Vec<String>>,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, contents: &str) {
        let lines = contents.lines().map(str::to_owned).collect();
        self.files.insert(path.into(), lines);
    }
}

impl Source for MemorySource {
    fn read_file(&mut self, path: &str) -> Result<Vec<String>, SourceError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(path.to_owned()))
    }
}

//! Invocation options (§6 "External interfaces"). Instantiated by the
//! external shell (out of scope for this crate); a plain struct rather than
//! a builder, since argument parsing is an explicit external collaborator.

/// Selects the source dialect and, transitively, the memory model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceDialect {
    Ray,
    Agc4,
    B1965,
    B1966,
    A1966,
    A1967,
    Agc,
}

/// Selects output conventions and the default listing-section set (the
/// listing sections themselves are the printer's concern, out of scope
/// here; only the selector is part of this crate's interface).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assembler {
    Ray,
    Y1965,
    Y1966Early,
    Y1966Late,
    Y1967,
    Gap,
}

/// A listing-section identifier, optionally stderr-bound. Opaque to this
/// crate beyond being threaded through to the (external) printer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingSection {
    pub name: String,
    pub stderr: bool,
}

/// The options record a caller supplies to [`crate::Assembler::run`].
#[derive(Debug, Clone)]
pub struct AssemblyOptions {
    pub file: String,
    pub source: SourceDialect,
    pub assembler: Assembler,
    pub eol: Vec<ListingSection>,
    pub formatted: bool,
}

impl AssemblyOptions {
    #[must_use]
    pub fn new(file: impl Into<String>, source: SourceDialect, assembler: Assembler) -> Self {
        Self {
            file: file.into(),
            source,
            assembler,
            eol: Vec::new(),
            formatted: true,
        }
    }
}

impl SourceDialect {
    /// Which `ops::Dialect` and memory-model family this source dialect
    /// implies.
    #[must_use]
    pub fn ops_dialect(self) -> crate::ops::Dialect {
        match self {
            Self::Ray | Self::Agc4 | Self::B1965 | Self::B1966 => crate::ops::Dialect::Block1,
            Self::A1966 => crate::ops::Dialect::Block2Early,
            Self::A1967 | Self::Agc => crate::ops::Dialect::Block2Agc,
        }
    }

    #[must_use]
    pub fn is_block1(self) -> bool {
        matches!(self, Self::Ray | Self::Agc4 | Self::B1965 | Self::B1966)
    }
}

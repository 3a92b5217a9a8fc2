//! Two-pass cross-assembler for Apollo Guidance Computer source.

pub mod address_field;
pub mod card;
pub mod cell;
pub mod charset;
pub mod cuss;
pub mod error;
pub mod lexer;
pub mod memory;
pub mod numeric;
pub mod ops;
pub mod options;
pub mod parser;
pub mod pass1;
pub mod pass2;
pub mod source;
pub mod state;
pub mod symbol;

use card::Card;
use cell::CellStore;
use error::Error;
use memory::{Block1Memory, Block2Memory, MemoryModel};
use options::AssemblyOptions;
use source::Source;
use symbol::ResolvedSymbolTable;

/// Everything `Assembler::run` produces: the assembled cards in source
/// order, the resolved symbol table, the built cell store, and the
/// fatal/non-fatal cuss tallies a caller needs before deciding whether to
/// trust the output (§6 "Persisted/emitted state").
#[derive(Debug)]
pub struct AssembleResult {
    pub cards: Vec<Card>,
    pub symbols: ResolvedSymbolTable,
    pub cells: CellStore,
    pub fatal_count: usize,
    pub non_fatal_count: usize,
}

impl AssembleResult {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.fatal_count == 0
    }
}

/// The assembler entry point. Stateless beyond what a single `run` needs:
/// every call builds its own memory model, symbol table and cell store, so
/// nothing leaks between assemblies of different files (§5 "Mutable shared
/// state" is per-run, never a process global).
#[derive(Debug, Default)]
pub struct Assembler;

impl Assembler {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Assembles `options.file` (and everything it transitively
    /// `$`-inserts) read through `source`.
    pub fn run(&self, source: &mut dyn Source, options: &AssemblyOptions) -> Result<AssembleResult, Error> {
        let dialect = options.source.ops_dialect();
        let memory: Box<dyn MemoryModel> = if options.source.is_block1() {
            Box::new(Block1Memory::default())
        } else {
            Box::new(Block2Memory::standard())
        };

        tracing::info!(file = %options.file, ?dialect, "starting pass 1");
        let pass1_out = pass1::run(source, &options.file, dialect, memory.as_ref())?;
        tracing::info!(cards = pass1_out.cards.len(), "pass 1 complete");

        let symbols = pass1_out.symbols.resolve().map_err(|err| {
            tracing::warn!(%err, "symbol resolution failed");
            Error::Catalog("unresolved symbol table")
        })?;
        tracing::info!(symbols = symbols.len(), "symbol table resolved");

        let mut cards = pass1_out.cards;
        tracing::info!("starting pass 2");
        let pass2_out = pass2::run(&mut cards, &symbols, memory.as_ref(), pass1_out.cells, dialect);
        tracing::info!("pass 2 complete");

        let (fatal_count, non_fatal_count) = count_cusses(&cards);
        for card in &cards {
            for cuss in &card.cusses {
                let info = cuss.info();
                if info.fatal {
                    tracing::error!(line = card.line_number, message = info.message, "fatal cuss");
                } else {
                    tracing::warn!(line = card.line_number, message = info.message, "cuss");
                }
            }
        }

        Ok(AssembleResult {
            cards,
            symbols,
            cells: pass2_out.cells,
            fatal_count,
            non_fatal_count,
        })
    }
}

fn count_cusses(cards: &[Card]) -> (usize, usize) {
    let mut fatal = 0;
    let mut non_fatal = 0;
    for card in cards {
        for cuss in &card.cusses {
            if cuss.is_fatal() {
                fatal += 1;
            } else {
                non_fatal += 1;
            }
        }
    }
    (fatal, non_fatal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use options::{Assembler as AssemblerKind, SourceDialect};
    use source::MemorySource;

    #[test]
    fn assembles_a_trivial_program() {
        let mut source = MemorySource::new();
        source.insert(
            "MAIN.agc",
            concat!(
                "         SETLOC   4000\n",
                " FOO      TC       BAR\n",
                " BAR      TC       FOO\n",
            ),
        );
        let options = AssemblyOptions::new("MAIN.agc", SourceDialect::Agc, AssemblerKind::Gap);
        let result = Assembler::new().run(&mut source, &options).unwrap();
        assert_eq!(result.fatal_count, 0, "{:?}", result.cards);
        assert!(result.cells.get(4000).unwrap().value.is_some());
        assert!(result.cells.get(4001).unwrap().value.is_some());
    }
}

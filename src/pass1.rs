//! Pass 1 driver (§4.4): walks parsed cards, maintains the location
//! counter, reserves memory, and records symbols.

use crate::address_field::AddressField;
use crate::card::{Card, CardKind};
use crate::cell::{CellError, CellStore};
use crate::cuss::{
    Cuss, CUSS_ADDRESS_CONFLICT, CUSS_ADDRESS_UNDEFINED, CUSS_BANK_FULL, CUSS_LOCATION_NOT_SET, CUSS_NO_SUCH_BANK,
};
use crate::memory::MemoryModel;
use crate::ops::Dialect;
use crate::parser;
use crate::source::Source;
use crate::state::AssemblerState;
use crate::symbol::{UnresolvedSymbolTable, UnresolvedValue};

/// Pass 1's output: the flattened card sequence (insertions inlined),
/// annotated with `ref_address`/`extent`; the unresolved symbol table; and
/// a cell store with `definition`-only cells.
pub struct Pass1Output {
    pub cards: Vec<Card>,
    pub symbols: UnresolvedSymbolTable,
    pub cells: CellStore,
}

/// Runs pass 1 over `root_file` and everything it transitively `$`-inserts.
pub fn run(
    source: &mut dyn Source,
    root_file: &str,
    dialect: Dialect,
    memory: &dyn MemoryModel,
) -> Result<Pass1Output, crate::error::Error> {
    let mut cards = Vec::new();
    let mut symbols = UnresolvedSymbolTable::new();
    let mut cells = CellStore::new(memory.high_memory());
    let mut state = AssemblerState::new();

    read_file_depth_first(source, root_file, dialect, &mut cards, &mut symbols, &mut cells, memory, &mut state)?;
    flush_pending_interpretive(&mut cards, &mut symbols, &mut cells, &mut state);

    Ok(Pass1Output { cards, symbols, cells })
}

#[allow(clippy::too_many_arguments)]
fn read_file_depth_first(
    source: &mut dyn Source,
    path: &str,
    dialect: Dialect,
    cards: &mut Vec<Card>,
    symbols: &mut UnresolvedSymbolTable,
    cells: &mut CellStore,
    memory: &dyn MemoryModel,
    state: &mut AssemblerState,
) -> Result<(), crate::error::Error> {
    let lines = source.read_file(path)?;
    for (line_no, line) in lines.iter().enumerate() {
        let card = parser::parse_line(line_no as u32 + 1, line, dialect);
        if let CardKind::Insertion { path: nested } = &card.kind {
            let nested = nested.clone();
            cards.push(card);
            read_file_depth_first(source, &nested, dialect, cards, symbols, cells, memory, state)?;
            continue;
        }
        process_card(card, cards, symbols, cells, memory, state);
    }
    Ok(())
}

fn process_card(
    mut card: Card,
    cards: &mut Vec<Card>,
    symbols: &mut UnresolvedSymbolTable,
    cells: &mut CellStore,
    memory: &dyn MemoryModel,
    state: &mut AssemblerState,
) {
    match &card.kind {
        CardKind::Remark | CardKind::Pagination | CardKind::Insertion { .. } => {
            cards.push(card);
        }
        CardKind::Clerical { .. } => {
            process_clerical(&mut card, symbols, cells, memory, state, cards.len());
            cards.push(card);
        }
        CardKind::Basic { .. } | CardKind::AddressConstant { .. } | CardKind::NumericConstant { .. } => {
            let extent = card_extent(&card.kind);
            place_and_reserve(&mut card, extent, symbols, cells, state, cards.len());
            cards.push(card);
        }
        CardKind::Interpretive { .. } => {
            process_interpretive(card, cards, symbols, cells, state);
        }
    }
}

/// Interpretive cards pack two operations per word, each written on its own
/// source line (§4.5). `Store` and `STADR` operations always take a whole
/// word to themselves; any other interpretive operation waits in
/// `state.pending_interpretive` for the following line to complete the
/// pair, flushing unpaired at end of input (a malformed or trailing
/// odd-one-out card still gets a word, just without a second operand).
fn process_interpretive(
    mut card: Card,
    cards: &mut Vec<Card>,
    symbols: &mut UnresolvedSymbolTable,
    cells: &mut CellStore,
    state: &mut AssemblerState,
) {
    if is_standalone_interpretive(&card) {
        flush_pending_interpretive(cards, symbols, cells, state);
        place_and_reserve(&mut card, 1, symbols, cells, state, cards.len());
        cards.push(card);
        return;
    }

    match state.pending_interpretive.take() {
        Some(mut first) => {
            let (CardKind::Interpretive { rhs: Some(first_op), .. }, CardKind::Interpretive { rhs: Some(second_op), .. }) =
                (&first.kind, &card.kind)
            else {
                unreachable!("non-standalone interpretive cards always carry an rhs operand");
            };
            let first_op = first_op.clone();
            let second_op = second_op.clone();
            first.kind = CardKind::Interpretive {
                lhs: Some(first_op),
                rhs: Some(second_op),
            };
            first.cusses.extend(card.cusses);
            place_and_reserve(&mut first, 1, symbols, cells, state, cards.len());
            cards.push(first);
        }
        None => state.pending_interpretive = Some(card),
    }
}

fn is_standalone_interpretive(card: &Card) -> bool {
    let CardKind::Interpretive { rhs: Some(op), .. } = &card.kind else {
        return false;
    };
    matches!(
        op.operation.kind,
        crate::ops::OperationKind::Interpretive { sub_type: crate::ops::InterpretiveSubType::Store, .. }
    ) || op.operation.symbol == "STADR"
}

/// A pending first-half interpretive card with no partner (end of input,
/// or a following standalone card) still occupies a word by itself.
fn flush_pending_interpretive(
    cards: &mut Vec<Card>,
    symbols: &mut UnresolvedSymbolTable,
    cells: &mut CellStore,
    state: &mut AssemblerState,
) {
    if let Some(mut pending) = state.pending_interpretive.take() {
        place_and_reserve(&mut pending, 1, symbols, cells, state, cards.len());
        cards.push(pending);
    }
}

fn card_extent(kind: &CardKind) -> u16 {
    match kind {
        CardKind::Basic { operation, .. }
        | CardKind::AddressConstant { operation, .. }
        | CardKind::NumericConstant { operation, .. } => u16::from(operation.word_count),
        _ => 0,
    }
}

fn place_and_reserve(
    card: &mut Card,
    extent: u16,
    symbols: &mut UnresolvedSymbolTable,
    cells: &mut CellStore,
    state: &mut AssemblerState,
    card_index: usize,
) {
    let Some(lc) = state.location_counter else {
        card.cuss(Cuss::new(CUSS_LOCATION_NOT_SET));
        return;
    };
    card.ref_address = Some(lc);
    card.extent = extent;
    card.e_bank = state.take_one_shot_e_bank();
    card.s_bank = state.take_one_shot_s_bank();

    if let Some(name) = &card.location_symbol {
        if let Some(prior) = symbols.define(name.clone(), UnresolvedValue::Address(lc), card_index) {
            card.cuss(Cuss::with_context(CUSS_ADDRESS_CONFLICT, [format!("card {prior}")]));
        }
    }

    if extent > 0 {
        let conflicts = cells.reserve(lc, extent, card_index);
        cuss_reservation_conflicts(card, &conflicts);
    }

    state.advance(extent);
}

fn process_clerical(
    card: &mut Card,
    symbols: &mut UnresolvedSymbolTable,
    cells: &mut CellStore,
    memory: &dyn MemoryModel,
    state: &mut AssemblerState,
    card_index: usize,
) {
    let CardKind::Clerical { operation, address, .. } = &card.kind else {
        return;
    };
    match operation.symbol {
        "SETLOC" => match resolve_numeric_address(address, symbols) {
            Some(addr) => state.location_counter = Some(addr as u32),
            None => card.cuss(Cuss::new(CUSS_ADDRESS_UNDEFINED)),
        },
        "BANK" | "BLOCK" => match address {
            Some(AddressField::Number(bank)) => match memory.fixed_bank_range(*bank as u32) {
                Some(range) => state.location_counter = Some(*range.start()),
                None => {
                    state.location_counter = None;
                    card.cuss(Cuss::new(CUSS_NO_SUCH_BANK));
                }
            },
            None => {
                // No target named: stay in the current bank if one is
                // known; otherwise the counter remains whatever it was.
            }
            _ => card.cuss(Cuss::new(CUSS_ADDRESS_UNDEFINED)),
        },
        "ERASE" => {
            let (start, extent) = match (&card.raw_address, address) {
                (Some(raw), _) if raw.trim_start().starts_with('=') => {
                    let Some(lc) = state.location_counter else {
                        card.cuss(Cuss::new(CUSS_LOCATION_NOT_SET));
                        return;
                    };
                    let n: i64 = raw.trim_start().trim_start_matches('=').trim().parse().unwrap_or(0);
                    (lc, (n + 1).max(0) as u16)
                }
                (_, Some(AddressField::Symbol(name, offset, _))) => match symbols.contains(name) {
                    true => {
                        // Only symbols already known from earlier in this
                        // same pass can anchor `ERASE X +N`; `resolve_numeric_address`
                        // reads the concrete address straight out of the
                        // unresolved table.
                        match resolve_numeric_address(address, symbols) {
                            Some(base) => (base, (*offset as i64 + 1).max(0) as u16),
                            None => {
                                card.cuss(Cuss::new(CUSS_ADDRESS_UNDEFINED));
                                return;
                            }
                        }
                    }
                    false => {
                        card.cuss(Cuss::new(CUSS_ADDRESS_UNDEFINED));
                        return;
                    }
                },
                (_, None) => match state.location_counter {
                    Some(lc) => (lc, 1),
                    None => {
                        card.cuss(Cuss::new(CUSS_LOCATION_NOT_SET));
                        return;
                    }
                },
                _ => {
                    card.cuss(Cuss::new(CUSS_ADDRESS_UNDEFINED));
                    return;
                }
            };
            card.ref_address = Some(start);
            card.extent = extent;
            let conflicts = cells.reserve(start, extent, card_index);
            cuss_reservation_conflicts(card, &conflicts);
        }
        "EQUALS" | "=" => define_symbol(card, UnresolvedValue::Equals, symbols, card_index),
        "=PLUS" => define_plus_minus(card, 1, symbols, card_index),
        "=MINUS" => define_plus_minus(card, -1, symbols, card_index),
        "=ECADR" => define_symbol(card, UnresolvedValue::Equals, symbols, card_index),
        "EBANK=" => {
            if let Some(AddressField::Number(bank)) = address {
                state.one_shot_e_bank = Some(*bank as u32);
            }
        }
        "SBANK=" => {
            if let Some(AddressField::Number(bank)) = address {
                state.one_shot_s_bank = Some(*bank as u32);
            }
        }
        "COUNT" => {
            state.count = card.location_symbol.clone();
        }
        "BNKSUM" => {
            // Reservation of the checksum words happens in pass 2, where
            // the bank's final cell count is known; pass 1 only notes the
            // card's presence via its normal card-sequence placement.
        }
        _ => {}
    }
}

fn define_symbol(
    card: &mut Card,
    make: impl Fn(String) -> UnresolvedValue,
    symbols: &mut UnresolvedSymbolTable,
    card_index: usize,
) {
    let CardKind::Clerical { address, .. } = &card.kind else {
        return;
    };
    let (Some(name), Some(AddressField::Symbol(target, _, _))) = (&card.location_symbol, address) else {
        card.cuss(Cuss::new(CUSS_ADDRESS_UNDEFINED));
        return;
    };
    if let Some(prior) = symbols.define(name.clone(), make(target.clone()), card_index) {
        card.cuss(Cuss::with_context(CUSS_ADDRESS_CONFLICT, [format!("card {prior}")]));
    }
}

/// `=PLUS`/`=MINUS`: the address field names the base symbol, with an
/// optional `+N`/`-N` offset already folded into [`AddressField::Symbol`]'s
/// second slot by the general address-field grammar; `sign` applies the
/// operation's own plus/minus to that offset.
fn define_plus_minus(card: &mut Card, sign: i64, symbols: &mut UnresolvedSymbolTable, card_index: usize) {
    let CardKind::Clerical { address, .. } = &card.kind else {
        return;
    };
    let (Some(name), Some(AddressField::Symbol(target, offset, _))) = (&card.location_symbol, address) else {
        card.cuss(Cuss::new(CUSS_ADDRESS_UNDEFINED));
        return;
    };
    let value = UnresolvedValue::PlusMinus(target.clone(), sign * i64::from(*offset));
    if let Some(prior) = symbols.define(name.clone(), value, card_index) {
        card.cuss(Cuss::with_context(CUSS_ADDRESS_CONFLICT, [format!("card {prior}")]));
    }
}

/// Reads a symbol's concrete address directly out of the still-unresolved
/// table. Only valid for symbols defined earlier in the same pass as a
/// plain `Address`; used by `SETLOC`/`ERASE`, which (per the historical
/// assembler) require their anchor to already be a location, not a
/// forward-referenced `EQUALS` chain.
fn resolve_numeric_address(address: &Option<AddressField>, symbols: &UnresolvedSymbolTable) -> Option<u32> {
    match address {
        Some(AddressField::Number(n)) => Some(*n as u32),
        Some(AddressField::Symbol(name, offset, _)) => {
            let resolved = symbols.resolve().ok()?;
            match resolved.get(name)? {
                crate::symbol::SymbolValue::Address(addr) => Some((*addr as i64 + *offset as i64) as u32),
                crate::symbol::SymbolValue::Number(n) => Some((*n + *offset as i64) as u32),
            }
        }
        _ => None,
    }
}

/// Translates reservation conflicts from `CellStore::reserve` into cusses on
/// the new card: an out-of-range reservation means the bank ran out of
/// room, anything else means a prior card already claimed the address.
fn cuss_reservation_conflicts(card: &mut Card, conflicts: &[(crate::memory::TrueAddress, CellError)]) {
    for (_, err) in conflicts {
        match err {
            CellError::OutOfRange => card.cuss(Cuss::new(CUSS_BANK_FULL)),
            CellError::AlreadyReserved(prior) => {
                card.cuss(Cuss::with_context(CUSS_ADDRESS_CONFLICT, [format!("card {prior}")]));
            }
            CellError::AlreadyWritten => card.cuss(Cuss::new(CUSS_ADDRESS_CONFLICT)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Block2Memory;
    use crate::source::MemorySource;

    fn run_source(text: &str) -> Pass1Output {
        let mut source = MemorySource::new();
        source.insert("MAIN.agc", text);
        let memory = Block2Memory::standard();
        run(&mut source, "MAIN.agc", Dialect::Block2Agc, &memory).unwrap()
    }

    #[test]
    fn setloc_then_basic_reserves_a_cell() {
        let out = run_source(concat!(
            "         SETLOC   4000\n",
            " FOO      TC       BAR\n",
        ));
        let basic = &out.cards[1];
        assert_eq!(basic.ref_address, Some(4000));
        assert_eq!(basic.extent, 1);
        assert!(basic.cusses.is_empty(), "{:?}", basic.cusses);
    }

    #[test]
    fn duplicate_location_symbol_is_cussed_on_both_cards() {
        let out = run_source(concat!(
            "         SETLOC   4000\n",
            " FOO      TC       BAR\n",
            " FOO      TC       BAR\n",
        ));
        assert!(!out.cards[2].cusses.is_empty());
    }

    #[test]
    fn erase_equals_reserves_n_plus_one_words() {
        let out = run_source(concat!(
            "         SETLOC   4000\n",
            "         ERASE    =2\n",
        ));
        let erase = &out.cards[1];
        assert_eq!(erase.extent, 3);
        assert_eq!(erase.ref_address, Some(4000));
        assert!(erase.cusses.is_empty(), "{:?}", erase.cusses);
    }

    #[test]
    fn erase_bare_reserves_one_word() {
        let out = run_source(concat!("         SETLOC   4000\n", "         ERASE\n",));
        assert_eq!(out.cards[1].extent, 1);
    }

    #[test]
    fn interpretive_pair_shares_one_word() {
        let out = run_source(concat!(
            "         SETLOC   4000\n",
            " FOO      VLOAD    BAR\n",
            "          DLOAD    BAZ\n",
            " QUUX     TC       FOO\n",
        ));
        let pair = &out.cards[1];
        assert_eq!(pair.ref_address, Some(4000));
        assert_eq!(pair.extent, 1);
        match &pair.kind {
            CardKind::Interpretive { lhs: Some(lhs), rhs: Some(rhs) } => {
                assert_eq!(lhs.operation.symbol, "VLOAD");
                assert_eq!(rhs.operation.symbol, "DLOAD");
            }
            other => panic!("expected a paired Interpretive card, got {other:?}"),
        }
        // The trailing `TC` immediately follows the pair's single word.
        let tc = &out.cards[2];
        assert_eq!(tc.ref_address, Some(4001));
    }

    #[test]
    fn stadr_and_store_each_take_their_own_word() {
        let out = run_source(concat!(
            "         SETLOC   4000\n",
            "          STADR\n",
            "          STORE    BAR\n",
        ));
        assert_eq!(out.cards[1].ref_address, Some(4000));
        assert_eq!(out.cards[2].ref_address, Some(4001));
        match &out.cards[1].kind {
            CardKind::Interpretive { lhs: None, rhs: Some(op) } => assert_eq!(op.operation.symbol, "STADR"),
            other => panic!("expected standalone STADR, got {other:?}"),
        }
    }

    #[test]
    fn equals_defines_a_symbol_chain() {
        let out = run_source(concat!(
            "         SETLOC   4000\n",
            " FOO      TC       BAR\n",
            " BAZ      EQUALS   FOO\n",
        ));
        let resolved = out.symbols.resolve().unwrap();
        assert_eq!(resolved.get("BAZ"), resolved.get("FOO"));
    }

    #[test]
    fn insertion_is_read_depth_first() {
        let mut source = MemorySource::new();
        source.insert("MAIN.agc", concat!("         SETLOC   4000\n", "$SUB.agc\n", " AFTER    TC       BAR\n"));
        source.insert("SUB.agc", " INSUB    TC       BAR\n");
        let memory = Block2Memory::standard();
        let out = run(&mut source, "MAIN.agc", Dialect::Block2Agc, &memory).unwrap();
        let names: Vec<_> = out
            .cards
            .iter()
            .filter_map(|c| c.location_symbol.as_deref())
            .collect();
        assert_eq!(names, vec!["INSUB", "AFTER"]);
    }
}

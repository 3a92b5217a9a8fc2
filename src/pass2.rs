//! Pass 2 driver (§4.5/§4.7): builds the actual 15-bit words for every
//! reserved cell, now that every symbol has a concrete value.

use crate::card::{Card, CardKind};
use crate::cell::CellStore;
use crate::cuss::{
    Cuss, CUSS_BBCON_NEEDS_EBANK, CUSS_EXPECTED_ERASABLE, CUSS_NOT_FIXED_MEMORY, CUSS_OFFSET_NOT_ALLOWED,
    CUSS_SYMBOL_UNDEFINED, CUSS_WRONG_BANK,
};
use crate::memory::MemoryModel;
use crate::numeric::{self, Precision, Radix};
use crate::ops::{store_select, AddressRange, Dialect, InterpretiveSubType, OperandShape, OperationKind};
use crate::symbol::{ResolvedSymbolTable, SymbolValue};

/// Pass 2's output: every reserved cell now carries its built word.
pub struct Pass2Output {
    pub cells: CellStore,
}

/// The preceding interpretive card's shift/logical/indexing state, carried
/// forward for a following `P` address-constant card (§4.5: "`P` interprets
/// a leading interpretive operator").
#[derive(Debug, Clone, Copy)]
struct PrevInterpretive {
    sub_type: InterpretiveSubType,
    code: u16,
    index_register: Option<u8>,
    indexable_slot: bool,
}

fn interpretive_summary(lhs: Option<&crate::card::InterpretiveOperand>, rhs: Option<&crate::card::InterpretiveOperand>) -> Option<PrevInterpretive> {
    let op = rhs.or(lhs)?;
    let OperationKind::Interpretive { sub_type, code: Some(code), operand1, .. } = op.operation.kind else {
        return None;
    };
    let index_register = match &op.address {
        Some(crate::address_field::AddressField::Symbol(_, _, reg)) => *reg,
        _ => None,
    };
    Some(PrevInterpretive {
        sub_type,
        code,
        index_register,
        indexable_slot: operand1.is_some_and(|d| d.shape.contains(OperandShape::INDEXABLE)),
    })
}

/// Runs pass 2 over the cards and symbol table pass 1 produced.
pub fn run(cards: &mut [Card], symbols: &ResolvedSymbolTable, memory: &dyn MemoryModel, mut cells: CellStore, dialect: Dialect) -> Pass2Output {
    let mut prev_was_stadr = false;
    let mut prev_interpretive: Option<PrevInterpretive> = None;
    for card in cards.iter_mut() {
        build_card(card, symbols, memory, &mut cells, prev_was_stadr, prev_interpretive, dialect);
        prev_was_stadr = match &card.kind {
            CardKind::Interpretive { lhs: None, rhs: Some(op) } => op.operation.symbol == "STADR",
            CardKind::Clerical { .. } | CardKind::Remark | CardKind::Pagination | CardKind::Insertion { .. } => prev_was_stadr,
            _ => false,
        };
        prev_interpretive = match &card.kind {
            CardKind::Interpretive { lhs, rhs } => interpretive_summary(lhs.as_ref(), rhs.as_ref()),
            CardKind::Clerical { .. } | CardKind::Remark | CardKind::Pagination | CardKind::Insertion { .. } => prev_interpretive,
            _ => None,
        };
    }
    run_bnksum(cards, memory, &mut cells, dialect);
    Pass2Output { cells }
}

fn resolve_address(card: &mut Card, address: &crate::address_field::AddressField, symbols: &ResolvedSymbolTable) -> Option<i64> {
    use crate::address_field::AddressField as AF;
    match address {
        AF::Number(n) => Some(i64::from(*n)),
        AF::Symbol(name, offset, _) => match symbols.get(name) {
            Some(SymbolValue::Address(addr)) => Some(i64::from(*addr) + i64::from(*offset)),
            Some(SymbolValue::Number(n)) => Some(n + i64::from(*offset)),
            None => {
                card.cuss(Cuss::with_context(CUSS_SYMBOL_UNDEFINED, [name.clone()]));
                None
            }
        },
        AF::Indirect(lhs, _) => match symbols.get(lhs) {
            Some(SymbolValue::Address(addr)) => Some(i64::from(*addr)),
            Some(SymbolValue::Number(n)) => Some(*n),
            None => {
                card.cuss(Cuss::with_context(CUSS_SYMBOL_UNDEFINED, [lhs.clone()]));
                None
            }
        },
    }
}

#[allow(clippy::too_many_arguments)]
fn build_card(
    card: &mut Card,
    symbols: &ResolvedSymbolTable,
    memory: &dyn MemoryModel,
    cells: &mut CellStore,
    prev_was_stadr: bool,
    prev_interpretive: Option<PrevInterpretive>,
    dialect: Dialect,
) {
    let Some(base) = card.ref_address else {
        return;
    };
    match card.kind.clone() {
        CardKind::Basic { operation, complemented, address } => {
            build_basic(card, base, operation, complemented, address.as_ref(), symbols, memory, cells);
        }
        CardKind::AddressConstant { operation, address } => {
            build_address_constant(card, base, operation, address.as_ref(), symbols, memory, cells, prev_interpretive);
        }
        CardKind::NumericConstant { operation, token } => {
            build_numeric_constant(card, base, operation, &token, cells);
        }
        CardKind::Interpretive { lhs, rhs } => {
            build_interpretive(card, base, lhs.as_ref(), rhs.as_ref(), symbols, cells, prev_was_stadr, dialect);
        }
        CardKind::Clerical { .. } | CardKind::Remark | CardKind::Pagination | CardKind::Insertion { .. } => {}
    }
}

fn build_basic(
    card: &mut Card,
    base: crate::memory::TrueAddress,
    operation: &'static crate::ops::Operation,
    complemented: bool,
    address: Option<&crate::address_field::AddressField>,
    symbols: &ResolvedSymbolTable,
    memory: &dyn MemoryModel,
    cells: &mut CellStore,
) {
    let OperationKind::Basic { op_code, qc, address_range, special_address, address_bias, .. } = operation.kind else {
        return;
    };

    let operand = if let Some(special) = special_address {
        u32::from(special)
    } else if let Some(address) = address {
        if matches!(address_range, AddressRange::IoChannel) && matches!(address, crate::address_field::AddressField::Symbol(_, offset, _) if *offset != 0) {
            card.cuss(Cuss::new(CUSS_OFFSET_NOT_ALLOWED));
            return;
        }
        let Some(resolved) = resolve_address(card, address, symbols) else {
            return;
        };
        let resolved = resolved + i64::from(address_bias.unwrap_or(0));
        if resolved < 0 {
            card.cuss(Cuss::new(CUSS_WRONG_BANK));
            return;
        }
        let target = resolved as u32;
        if !address_in_range(memory, address_range, target) {
            card.cuss(range_violation_cuss(memory, address_range, target));
            return;
        }
        match reachable_slot(memory, base, target) {
            Some(slot) => slot,
            None => {
                card.cuss(Cuss::new(CUSS_WRONG_BANK));
                return;
            }
        }
    } else {
        0
    };

    let mut word = match qc {
        Some(qc) => (u32::from(op_code) << 12) | (u32::from(qc) << 10) | (operand & 0x3FF),
        None => (u32::from(op_code) << 12) | (operand & 0xFFF),
    };
    if complemented {
        word = !word & 0x7FFF;
    }
    let _ = cells.write(base, word as u16);
}

/// An operand must land in the bank already implied by `location_counter`
/// for fixed-memory references (basic instructions address only within
/// their own bank plus the fixed-fixed region); erasable operands are
/// reachable from anywhere.
fn reachable_slot(memory: &dyn MemoryModel, location_counter: crate::memory::TrueAddress, target: crate::memory::TrueAddress) -> Option<u32> {
    let area = memory.area(target);
    if area.is_erasable() {
        memory.as_bank_and_address(target).map(|ba| ba.address)
    } else if area.is_fixed() {
        memory.as_interpretive_fixed_address(location_counter, target).map(|v| v & 0xFFF)
    } else {
        None
    }
}

fn address_in_range(memory: &dyn MemoryModel, range: AddressRange, target: crate::memory::TrueAddress) -> bool {
    match range {
        AddressRange::Any | AddressRange::IoChannel => true,
        AddressRange::Erasable => memory.area(target).is_erasable(),
        AddressRange::Fixed => memory.area(target).is_fixed(),
    }
}

fn range_violation_cuss(memory: &dyn MemoryModel, range: AddressRange, target: crate::memory::TrueAddress) -> Cuss {
    let _ = memory;
    match range {
        AddressRange::Erasable => Cuss::new(CUSS_EXPECTED_ERASABLE),
        _ => Cuss::with_context(CUSS_NOT_FIXED_MEMORY, [format!("{target:o}")]),
    }
}

fn build_address_constant(
    card: &mut Card,
    base: crate::memory::TrueAddress,
    operation: &'static crate::ops::Operation,
    address: Option<&crate::address_field::AddressField>,
    symbols: &ResolvedSymbolTable,
    memory: &dyn MemoryModel,
    cells: &mut CellStore,
    prev_interpretive: Option<PrevInterpretive>,
) {
    let Some(address) = address else {
        // `P`'s address field is optional (§4.2): a bare `P` means shift or
        // flag value 0.
        if operation.symbol == "P" {
            build_p(card, base, 0, prev_interpretive, memory, cells);
        }
        return;
    };
    let Some(resolved) = resolve_address(card, address, symbols) else {
        return;
    };

    match operation.symbol {
        "ADRES" | "GENADR" | "CADR" | "ECADR" | "REMADR" => {
            let target = resolved as u32;
            let Some(BankAndAddressBits { word, .. }) = complete_fixed_or_erasable(card, memory, target) else {
                return;
            };
            let _ = cells.write(base, word);
        }
        "2CADR" | "2FCADR" => {
            let target = resolved as u32;
            let Some(complete) = memory.as_fixed_complete_address(target) else {
                card.cuss(Cuss::new(CUSS_NOT_FIXED_MEMORY));
                return;
            };
            let _ = cells.write(base, (complete & 0x3FF) as u16);
            let bank = (complete >> 10) as u16;
            let _ = cells.write(base + 1, bank);
        }
        "BBCON" => {
            let target = resolved as u32;
            let Some(e_bank) = card.e_bank else {
                card.cuss(Cuss::new(CUSS_BBCON_NEEDS_EBANK));
                return;
            };
            let Some((f_bank, s_bank)) = memory.fixed_bank_and_superbank(target) else {
                card.cuss(Cuss::new(CUSS_NOT_FIXED_MEMORY));
                return;
            };
            let word = ((f_bank & 0x1F) << 10) | ((s_bank & 0x7) << 4) | (e_bank & 0x7);
            let _ = cells.write(base, word as u16);
        }
        "DNCHAN" => {
            let channel = resolved as u32;
            if channel >= 0x20 {
                card.cuss(Cuss::new(CUSS_OFFSET_NOT_ALLOWED));
            }
            let _ = cells.write(base, (0x3800 | (channel & 0x1F)) as u16);
        }
        "DNPTR" => {
            let target = resolved as u32;
            if memory.area(target) != crate::memory::Area::VariableFixed {
                card.cuss(Cuss::new(CUSS_NOT_FIXED_MEMORY));
                return;
            }
            let _ = cells.write(base, (0x3000 | (target & 0x7FF)) as u16);
        }
        "1DNADR" | "2DNADR" => {
            let target = resolved as u32;
            if !memory.area(target).is_erasable() {
                card.cuss(Cuss::new(CUSS_EXPECTED_ERASABLE));
                return;
            }
            let Some(ba) = memory.as_bank_and_address(target) else {
                card.cuss(Cuss::new(CUSS_EXPECTED_ERASABLE));
                return;
            };
            let n: u32 = operation.symbol[..1].parse().unwrap_or(1);
            let word = (((n.max(1) - 1) & 0x7) << 11) | (ba.address & 0x7FF);
            let _ = cells.write(base, word as u16);
        }
        "P" => {
            build_p(card, base, resolved, prev_interpretive, memory, cells);
        }
        _ => {
            let _ = cells.write(base, (resolved as u32 & 0x7FFF) as u16);
        }
    }
}

struct BankAndAddressBits {
    word: u16,
}

/// Builds a `P` address-constant card's word (§4.5's three sub-cases),
/// consulting the state the immediately preceding interpretive card left
/// behind. `target` is `P`'s own resolved address field (`0` when absent).
fn build_p(
    card: &mut Card,
    base: crate::memory::TrueAddress,
    target: i64,
    prev_interpretive: Option<PrevInterpretive>,
    memory: &dyn MemoryModel,
    cells: &mut CellStore,
) {
    let index_register = prev_interpretive.and_then(|p| p.index_register);
    let complement = index_register == Some(2);

    let mut word = match prev_interpretive.map(|p| p.sub_type) {
        Some(InterpretiveSubType::Logical) => {
            let code = prev_interpretive.expect("sub_type just matched Some").code;
            if target < 0 {
                card.cuss(Cuss::new(CUSS_OFFSET_NOT_ALLOWED));
            }
            let flag = target.max(0) as u32;
            ((flag / 15) << 8) | (u32::from(code) << 4) | (flag % 15)
        }
        Some(InterpretiveSubType::Shift) => {
            let code = prev_interpretive.expect("sub_type just matched Some").code;
            if target.unsigned_abs() > 125 {
                card.cuss(Cuss::new(CUSS_OFFSET_NOT_ALLOWED));
            }
            0x2000 | ((u32::from(code) & 0x1F) << 8) | (((target + 129) as u32) & 0xFF)
        }
        _ => {
            let target = target as u32;
            let translated = if memory.area(target).is_erasable() {
                memory.as_bank_and_address(target).map(|ba| ba.address)
            } else if index_register.is_some() {
                memory.as_interpretive_fixed_address(base, target)
            } else {
                memory.as_fixed_complete_address(target)
            };
            let Some(mut translated) = translated else {
                card.cuss(Cuss::new(CUSS_NOT_FIXED_MEMORY));
                return;
            };
            if prev_interpretive.is_some_and(|p| p.indexable_slot) {
                translated += 1;
            }
            translated
        }
    };
    if complement {
        word = !word & 0x7FFF;
    }
    let _ = cells.write(base, (word & 0x7FFF) as u16);
}

fn complete_fixed_or_erasable(card: &mut Card, memory: &dyn MemoryModel, target: crate::memory::TrueAddress) -> Option<BankAndAddressBits> {
    if memory.area(target).is_fixed() {
        let complete = memory.as_fixed_complete_address(target)?;
        Some(BankAndAddressBits { word: (complete & 0x7FFF) as u16 })
    } else if memory.area(target).is_erasable() {
        let ba = memory.as_bank_and_address(target)?;
        Some(BankAndAddressBits {
            word: ((ba.bank.unwrap_or(0) & 0x7) << 8) as u16 | (ba.address & 0xFF) as u16,
        })
    } else {
        card.cuss(Cuss::new(CUSS_NOT_FIXED_MEMORY));
        None
    }
}

fn build_numeric_constant(card: &mut Card, base: crate::memory::TrueAddress, operation: &'static crate::ops::Operation, token: &str, cells: &mut CellStore) {
    let (precision, radix) = match operation.symbol {
        "DEC" => (Precision::Single, Radix::Decimal),
        "2DEC" => (Precision::Double, Radix::Decimal),
        "OCT" => (Precision::Single, Radix::Octal),
        "2OCT" => (Precision::Double, Radix::Octal),
        _ => return,
    };
    let words = numeric::lex(token, precision, radix, false, &mut card.cusses);
    let _ = cells.write(base, words.low_word);
    if let Some(high) = words.high_word {
        let _ = cells.write(base + 1, high);
    }
}

/// Builds one interpretive card's word (§4.5). A `Store`-sub-type card
/// (`STORE`/`STODL`/`STOVL`/`STCALL`) packs its own single-word form
/// instead of the regular two-op pair, complemented iff the immediately
/// preceding interpretive card was `STADR`. Every other pair is packed as
/// `highOp << 7 | lowOp` and always one's-complemented.
#[allow(clippy::too_many_arguments)]
fn build_interpretive(
    card: &mut Card,
    base: crate::memory::TrueAddress,
    lhs: Option<&crate::card::InterpretiveOperand>,
    rhs: Option<&crate::card::InterpretiveOperand>,
    symbols: &ResolvedSymbolTable,
    cells: &mut CellStore,
    prev_was_stadr: bool,
    dialect: Dialect,
) {
    if let Some(op) = rhs {
        if let OperationKind::Interpretive { sub_type: InterpretiveSubType::Store, .. } = op.operation.kind {
            let Some(address) = op.address.as_ref() else {
                return;
            };
            let iaw1_indexed = matches!(address, crate::address_field::AddressField::Symbol(_, _, Some(_)));
            let index_register = match address {
                crate::address_field::AddressField::Symbol(_, _, Some(reg)) => Some(*reg),
                _ => None,
            };
            let code = select_store_code(dialect, op.operation, iaw1_indexed, index_register);
            let Some(resolved) = resolve_address(card, address, symbols) else {
                return;
            };
            let slot = ((resolved + 1) as u32) & 0x7FF;
            let mut word = (u32::from(code) << 11) | slot;
            if prev_was_stadr {
                word = !word & 0x7FFF;
            }
            let _ = cells.write(base, word as u16);
            return;
        }
    }

    let high = lhs.and_then(|op| op.operation_code());
    let low = rhs.and_then(|op| op.operation_code());
    let word = !((u32::from(high.unwrap_or(0)) << 7) | u32::from(low.unwrap_or(0))) & 0x7FFF;
    let _ = cells.write(base, word as u16);
}

/// Selects a store card's ts-code (§4.6): `STORE` itself first checks
/// whether its own word is indexed and by which register (step 3), then
/// every store op dispatches on dialect — BLK2's six-entry table, or the
/// AGC `checkIndexedStore` alternate-code lookup (step 2). The BLK2 table
/// only ever sees IAW1 here since a store card carries a single address
/// field in this model.
fn select_store_code(dialect: Dialect, operation: &'static crate::ops::Operation, iaw1_indexed: bool, index_register: Option<u8>) -> u16 {
    let base = match operation.kind {
        OperationKind::Interpretive { code: Some(code), .. } => code,
        _ => 0,
    };
    if operation.symbol == "STORE" {
        if let Some(reg) = index_register {
            return match store_select::store_first_word_indexed(reg) {
                store_select::StoreFirstWordTsCode::Index1 => base,
                store_select::StoreFirstWordTsCode::Index2 => base + 1,
            };
        }
    }
    match dialect {
        Dialect::Block2Early => {
            let indexed = store_select::IndexedOperands { iaw1_indexed, iaw2_indexed: false };
            store_select::blk2_ts_code(indexed, index_register)
        }
        Dialect::Block2Agc | Dialect::Block1 => store_select::check_indexed_store(operation, iaw1_indexed).unwrap_or(base),
    }
}

impl crate::card::InterpretiveOperand {
    /// `(opCode + 1) + (indexed ? 2 : 0)` (§4.5) — the bit-field offsets
    /// the interpretive dispatch table requires. `indexed` is read off the
    /// operand's own address field (a trailing `,1`/`,2` register suffix).
    fn operation_code(&self) -> Option<u16> {
        let code = match self.operation.kind {
            OperationKind::Interpretive { op_code: Some(code), .. } => code,
            OperationKind::Interpretive { code: Some(code), .. } => code,
            _ => return None,
        };
        let indexed = matches!(&self.address, Some(crate::address_field::AddressField::Symbol(_, _, Some(_))));
        Some(code + 1 + if indexed { 2 } else { 0 })
    }
}

/// `BNKSUM` checksum (§4.7/§8 scenario 6). Reserves the bank's last two
/// words: the penultimate a `TC` to the checksum, the last the checksum
/// itself, chosen so `sum(bank) + checksum ≡ bank (mod 2^15 - 1)` with
/// `checksum`'s sign matching the running sum's.
fn run_bnksum(cards: &mut [Card], memory: &dyn MemoryModel, cells: &mut CellStore, dialect: Dialect) {
    let tc_op_code = match dialect.catalog().lookup("TC").map(|op| op.kind) {
        Some(OperationKind::Basic { op_code, .. }) => Some(op_code),
        _ => None,
    };

    for idx in 0..cards.len() {
        let is_bnksum = matches!(&cards[idx].kind, CardKind::Clerical { operation, .. } if operation.symbol == "BNKSUM");
        if !is_bnksum {
            continue;
        }
        let Some(addr) = cards[idx].ref_address else {
            continue;
        };
        let bank = bank_of(memory, addr);
        let Some(range) = memory.fixed_bank_range(bank) else {
            continue;
        };
        let checksum_addr = *range.end();
        if checksum_addr <= *range.start() {
            continue;
        }
        let tc_addr = checksum_addr - 1;

        let mut sum: i64 = 0;
        for a in *range.start()..tc_addr {
            if let Some(cell) = cells.get(a) {
                if let Some(v) = cell.value {
                    sum += signed_value(v);
                }
            }
        }

        let checksum_raw = if sum < 0 { -i64::from(bank) - sum } else { i64::from(bank) - sum };
        let word = if checksum_raw < 0 {
            ((-checksum_raw) as u16) ^ 0x7FFF
        } else {
            (checksum_raw as u16) & 0x7FFF
        };

        if cells.get(tc_addr).is_none() && cells.get(checksum_addr).is_none() {
            let _ = cells.reserve(tc_addr, 2, idx);
            if let Some(op_code) = tc_op_code {
                if let Some(s_reg) = memory.as_bank_and_address(checksum_addr).map(|ba| ba.address) {
                    let tc_word = (u32::from(op_code) << 12) | (s_reg & 0xFFF);
                    let _ = cells.write(tc_addr, tc_word as u16);
                }
            }
        }
        let _ = cells.write(checksum_addr, word);
    }
}

/// Signed value of a 15-bit one's-complement word: the sign is the whole
/// word's top bit, magnitude is the one's complement of the word when
/// negative (§4.7's "add, or subtract when the top bit is set").
fn signed_value(v: u16) -> i64 {
    if v & 0x4000 == 0 {
        i64::from(v)
    } else {
        i64::from(v) - 0x7FFF
    }
}

fn bank_of(memory: &dyn MemoryModel, addr: crate::memory::TrueAddress) -> u32 {
    memory.as_bank_and_address(addr).and_then(|ba| ba.bank).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Card;
    use crate::memory::Block2Memory;
    use crate::ops::Dialect;
    use crate::symbol::{ResolvedSymbolTable, SymbolValue};

    fn tc_operation() -> &'static crate::ops::Operation {
        Dialect::Block2Agc.catalog().lookup("TC").unwrap()
    }

    #[test]
    fn basic_instruction_builds_a_word() {
        let memory = Block2Memory::standard();
        let mut cells = CellStore::new(memory.high_memory());
        let op = tc_operation();
        let mut card = Card::new(
            1,
            None,
            CardKind::Basic {
                operation: op,
                complemented: false,
                address: Some(crate::address_field::AddressField::Number(0x30)),
            },
        );
        card.ref_address = Some(0x800);
        card.extent = 1;
        cells.reserve(0x800, 1, 0);
        build_basic(&mut card, 0x800, op, false, Some(&crate::address_field::AddressField::Number(0x30)), &ResolvedSymbolTable::default(), &memory, &mut cells);
        assert_eq!(cells.get(0x800).unwrap().value, Some(0x30));
    }

    #[test]
    fn symbol_resolves_to_its_address() {
        let mut table = crate::symbol::UnresolvedSymbolTable::new();
        table.define("FOO", crate::symbol::UnresolvedValue::Address(0x42), 0);
        let resolved = table.resolve().unwrap();
        assert_eq!(resolved.get("FOO"), Some(&SymbolValue::Address(0x42)));
    }

    /// §8 scenario 6: `BNKSUM 04` with a single non-zero cell `0x1234` in
    /// the bank reserves `0x23FE` (`TC` to `0x23FF`) and `0x23FF`
    /// (the checksum), chosen so the bank's words plus the checksum sum to
    /// `4 (mod 0x7FFF)`.
    #[test]
    fn bnksum_reserves_tc_and_checksum() {
        let memory = Block2Memory::standard();
        let mut cells = CellStore::new(memory.high_memory());
        cells.reserve(0x2000, 1, 0);
        let _ = cells.write(0x2000, 0x1234);

        let bnksum_op = Dialect::Block2Agc.catalog().lookup("BNKSUM").unwrap();
        let mut card = Card::new(2, None, CardKind::Clerical { operation: bnksum_op, address: None, complement: false, index: None });
        card.ref_address = Some(0x2000);
        let mut cards = [card];

        run_bnksum(&mut cards, &memory, &mut cells, Dialect::Block2Agc);

        assert_eq!(cells.get(0x23FF).unwrap().value, Some(0x6DCF));
        let tc_word = cells.get(0x23FE).unwrap().value.unwrap();
        let expected_s_reg = memory.as_bank_and_address(0x23FF).unwrap().address;
        assert_eq!(tc_word >> 12, 0); // TC's op_code
        assert_eq!(tc_word & 0xFFF, expected_s_reg);
    }

    /// §4.5: `BBCON` packs `(fBank << 10) | (sBank << 4) | eBank`. `0x7000`
    /// decomposes to `fBank == 0x18, sBank == 3` per §4.1's worked example.
    #[test]
    fn bbcon_packs_fbank_sbank_ebank() {
        let memory = Block2Memory::standard();
        let mut cells = CellStore::new(memory.high_memory());
        let op = Dialect::Block2Agc.catalog().lookup("BBCON").unwrap();
        let address = crate::address_field::AddressField::Number(0x7000);
        let mut card = Card::new(1, None, CardKind::AddressConstant { operation: op, address: Some(address.clone()) });
        card.ref_address = Some(0x800);
        card.e_bank = Some(3);
        cells.reserve(0x800, 1, 0);
        build_address_constant(&mut card, 0x800, op, Some(&address), &ResolvedSymbolTable::default(), &memory, &mut cells, None);
        assert_eq!(cells.get(0x800).unwrap().value, Some((0x18 << 10) | (3 << 4) | 3));
        assert!(card.cusses.is_empty());
    }

    #[test]
    fn bbcon_without_armed_ebank_cusses() {
        let memory = Block2Memory::standard();
        let mut cells = CellStore::new(memory.high_memory());
        let op = Dialect::Block2Agc.catalog().lookup("BBCON").unwrap();
        let address = crate::address_field::AddressField::Number(0x800);
        let mut card = Card::new(1, None, CardKind::AddressConstant { operation: op, address: Some(address.clone()) });
        card.ref_address = Some(0x800);
        cells.reserve(0x800, 1, 0);
        build_address_constant(&mut card, 0x800, op, Some(&address), &ResolvedSymbolTable::default(), &memory, &mut cells, None);
        assert_eq!(card.cusses.len(), 1);
        assert_eq!(card.cusses[0].serial, CUSS_BBCON_NEEDS_EBANK);
    }

    #[test]
    fn dnchan_packs_channel_field() {
        let memory = Block2Memory::standard();
        let mut cells = CellStore::new(memory.high_memory());
        let op = Dialect::Block2Agc.catalog().lookup("DNCHAN").unwrap();
        let address = crate::address_field::AddressField::Number(7);
        let mut card = Card::new(1, None, CardKind::AddressConstant { operation: op, address: Some(address.clone()) });
        card.ref_address = Some(0x800);
        cells.reserve(0x800, 1, 0);
        build_address_constant(&mut card, 0x800, op, Some(&address), &ResolvedSymbolTable::default(), &memory, &mut cells, None);
        assert_eq!(cells.get(0x800).unwrap().value, Some(0x3800 | 7));
    }

    #[test]
    fn dnptr_rejects_fixed_fixed_address() {
        let memory = Block2Memory::standard();
        let mut cells = CellStore::new(memory.high_memory());
        let op = Dialect::Block2Agc.catalog().lookup("DNPTR").unwrap();
        let address = crate::address_field::AddressField::Number(0x800);
        let mut card = Card::new(1, None, CardKind::AddressConstant { operation: op, address: Some(address.clone()) });
        card.ref_address = Some(0x800);
        cells.reserve(0x800, 1, 0);
        build_address_constant(&mut card, 0x800, op, Some(&address), &ResolvedSymbolTable::default(), &memory, &mut cells, None);
        assert_eq!(card.cusses.len(), 1);
        assert_eq!(card.cusses[0].serial, CUSS_NOT_FIXED_MEMORY);
    }

    #[test]
    fn dnptr_packs_address_in_variable_fixed() {
        let memory = Block2Memory::standard();
        let mut cells = CellStore::new(memory.high_memory());
        let op = Dialect::Block2Agc.catalog().lookup("DNPTR").unwrap();
        let address = crate::address_field::AddressField::Number(0x1234);
        let mut card = Card::new(1, None, CardKind::AddressConstant { operation: op, address: Some(address.clone()) });
        card.ref_address = Some(0x1234);
        cells.reserve(0x1234, 1, 0);
        build_address_constant(&mut card, 0x1234, op, Some(&address), &ResolvedSymbolTable::default(), &memory, &mut cells, None);
        assert_eq!(cells.get(0x1234).unwrap().value, Some(0x3000 | (0x1234 & 0x7FF)));
        assert!(card.cusses.is_empty());
    }

    #[test]
    fn two_dnadr_packs_n_and_erasable_address() {
        let memory = Block2Memory::standard();
        let mut cells = CellStore::new(memory.high_memory());
        let op = Dialect::Block2Agc.catalog().lookup("2DNADR").unwrap();
        let address = crate::address_field::AddressField::Number(0x305);
        let mut card = Card::new(1, None, CardKind::AddressConstant { operation: op, address: Some(address.clone()) });
        card.ref_address = Some(0x800);
        cells.reserve(0x800, 1, 0);
        build_address_constant(&mut card, 0x800, op, Some(&address), &ResolvedSymbolTable::default(), &memory, &mut cells, None);
        let ba = memory.as_bank_and_address(0x305).unwrap();
        assert_eq!(cells.get(0x800).unwrap().value, Some((1 << 11) | (ba.address & 0x7FF)));
    }

    #[test]
    fn p_shift_packs_code_and_shift_count() {
        let memory = Block2Memory::standard();
        let mut cells = CellStore::new(memory.high_memory());
        cells.reserve(0x800, 1, 0);
        let mut card = Card::new(1, None, CardKind::Remark);
        let prev = PrevInterpretive {
            sub_type: InterpretiveSubType::Shift,
            code: 5,
            index_register: None,
            indexable_slot: false,
        };
        build_p(&mut card, 0x800, 7, Some(prev), &memory, &mut cells);
        assert_eq!(cells.get(0x800).unwrap().value, Some(0x2000 | (5 << 8) | (7 + 129)));
        assert!(card.cusses.is_empty());
    }

    #[test]
    fn p_shift_complements_when_index_register_is_2() {
        let memory = Block2Memory::standard();
        let mut cells = CellStore::new(memory.high_memory());
        cells.reserve(0x800, 1, 0);
        let mut card = Card::new(1, None, CardKind::Remark);
        let prev = PrevInterpretive {
            sub_type: InterpretiveSubType::Shift,
            code: 5,
            index_register: Some(2),
            indexable_slot: false,
        };
        build_p(&mut card, 0x800, 7, Some(prev), &memory, &mut cells);
        let raw: u32 = 0x2000 | (5 << 8) | (7 + 129);
        assert_eq!(cells.get(0x800).unwrap().value, Some((!raw & 0x7FFF) as u16));
    }

    #[test]
    fn p_logical_packs_flag_div_and_mod_15() {
        let memory = Block2Memory::standard();
        let mut cells = CellStore::new(memory.high_memory());
        cells.reserve(0x800, 1, 0);
        let mut card = Card::new(1, None, CardKind::Remark);
        let prev = PrevInterpretive {
            sub_type: InterpretiveSubType::Logical,
            code: 2,
            index_register: None,
            indexable_slot: false,
        };
        build_p(&mut card, 0x800, 37, Some(prev), &memory, &mut cells);
        assert_eq!(cells.get(0x800).unwrap().value, Some(((37 / 15) << 8) | (2 << 4) | (37 % 15)));
    }

    #[test]
    fn p_other_translates_fixed_address_and_adds_one_when_indexable() {
        let memory = Block2Memory::standard();
        let mut cells = CellStore::new(memory.high_memory());
        cells.reserve(0x800, 1, 0);
        let mut card = Card::new(1, None, CardKind::Remark);
        let prev = PrevInterpretive {
            sub_type: InterpretiveSubType::Unary,
            code: 0,
            index_register: None,
            indexable_slot: true,
        };
        build_p(&mut card, 0x800, 0x900, Some(prev), &memory, &mut cells);
        let expected = memory.as_fixed_complete_address(0x900).unwrap() + 1;
        assert_eq!(cells.get(0x800).unwrap().value, Some((expected & 0x7FFF) as u16));
    }

    /// §4.6: BLK2 selects from the six-entry table regardless of the AGC
    /// dialect's `checkIndexedStore` alternate-code convention.
    #[test]
    fn select_store_code_dispatches_on_dialect() {
        let agc_op = Dialect::Block2Agc.catalog().lookup("STODL").unwrap();
        assert_eq!(select_store_code(Dialect::Block2Agc, agc_op, true, Some(1)), 0o34);

        let blk2_op = Dialect::Block2Early.catalog().lookup("STODL").unwrap();
        assert_eq!(select_store_code(Dialect::Block2Early, blk2_op, true, Some(1)), 0o21);
    }

    #[test]
    fn select_store_code_store_picks_index_register_ts_code() {
        let op = Dialect::Block2Agc.catalog().lookup("STORE").unwrap();
        assert_eq!(select_store_code(Dialect::Block2Agc, op, true, Some(1)), 0o20);
        assert_eq!(select_store_code(Dialect::Block2Agc, op, true, Some(2)), 0o21);
    }
}

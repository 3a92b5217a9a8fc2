//! Interpretive store ts-code selection (§4.6): picking the exact
//! `STORE`/`STODL`/`STOVL`/`STCALL` ts-code once the parser has classified
//! whether the interpretive address words (IAWs) carry an index register.

use super::{Operation, OperationKind};

/// Which of a store card's one or two IAWs carry an index register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexedOperands {
    pub iaw1_indexed: bool,
    pub iaw2_indexed: bool,
}

/// BLK2's six-entry ts-code table (§4.6 point 2), indexed by which IAWs are
/// indexed and by which register indexes them: `[not-indexed, X1, X2,
/// IAW2-only, X1+IAW2, X2+IAW2]`.
const BLK2_TS_CODES: [u16; 6] = [0o20, 0o21, 0o22, 0o23, 0o24, 0o25];

/// Selects a BLK2 `STODL`/`STOVL` ts-code from the six-entry table.
#[must_use]
pub fn blk2_ts_code(indexed: IndexedOperands, iaw1_register: Option<u8>) -> u16 {
    let slot = match (indexed.iaw1_indexed, indexed.iaw2_indexed, iaw1_register) {
        (false, false, _) => 0,
        (true, false, Some(1)) => 1,
        (true, false, _) => 2,
        (false, true, _) => 3,
        (true, true, Some(1)) => 4,
        (true, true, _) => 5,
    };
    BLK2_TS_CODES[slot]
}

/// On the AGC (non-BLK2) dialect, returns the alternate ts-code for `op`
/// when its first IAW is indexed, or the base code otherwise. `op` must be
/// an `Interpretive` store operation.
#[must_use]
pub fn check_indexed_store(op: &Operation, iaw1_indexed: bool) -> Option<u16> {
    let OperationKind::Interpretive { code: Some(base), .. } = op.kind else {
        return None;
    };
    Some(if iaw1_indexed { base + 1 } else { base })
}

/// Which ts-code `STORE` takes when its first word is indexed, keyed by
/// which index register (X1 or X2) performs the indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFirstWordTsCode {
    Index1,
    Index2,
}

#[must_use]
pub fn store_first_word_indexed(index_register: u8) -> StoreFirstWordTsCode {
    if index_register == 2 {
        StoreFirstWordTsCode::Index2
    } else {
        StoreFirstWordTsCode::Index1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blk2_table_selects_not_indexed() {
        assert_eq!(blk2_ts_code(IndexedOperands::default(), None), 0o20);
    }

    #[test]
    fn blk2_table_selects_both_indexed_x2() {
        let indexed = IndexedOperands { iaw1_indexed: true, iaw2_indexed: true };
        assert_eq!(blk2_ts_code(indexed, Some(2)), 0o25);
    }

    #[test]
    fn store_first_word_picks_register() {
        assert_eq!(store_first_word_indexed(1), StoreFirstWordTsCode::Index1);
        assert_eq!(store_first_word_indexed(2), StoreFirstWordTsCode::Index2);
    }
}

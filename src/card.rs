//! Card type definitions (§9 "Dynamic dispatch on card type"): a card is
//! modeled as a sum type, with exhaustive matching enforced by the
//! compiler rather than a runtime type tag.

use crate::address_field::AddressField;
use crate::cuss::Cuss;
use crate::ops::Operation;

/// A stable index into the owning pass output's card sequence (§9
/// "Ownership of cards"): diagnostics that cross-reference a prior
/// defining card store this, not a pointer, to avoid cyclic ownership.
pub type CardRef = usize;

/// One interpretive operation slot within an `Interpretive` card, plus its
/// resolved address field (if any).
#[derive(Debug, Clone)]
pub struct InterpretiveOperand {
    pub operation: &'static Operation,
    pub address: Option<AddressField>,
}

/// A single parsed source line, enriched by the pass drivers as described
/// in §3 "Assembled card".
#[derive(Debug, Clone)]
pub struct Card {
    pub line_number: u32,
    pub location_symbol: Option<String>,
    pub kind: CardKind,
    /// The address field's original text, kept alongside the parsed
    /// [`AddressField`] for the handful of clerical forms (`ERASE =N`) that
    /// need to see the raw token rather than its parsed shape.
    pub raw_address: Option<String>,
    /// Filled in by pass 1.
    pub ref_address: Option<crate::memory::TrueAddress>,
    pub extent: u16,
    pub e_bank: Option<u32>,
    pub s_bank: Option<u32>,
    pub count: Option<String>,
    pub cusses: Vec<Cuss>,
}

impl Card {
    #[must_use]
    pub fn new(line_number: u32, location_symbol: Option<String>, kind: CardKind) -> Self {
        Self {
            line_number,
            location_symbol,
            kind,
            raw_address: None,
            ref_address: None,
            extent: 0,
            e_bank: None,
            s_bank: None,
            count: None,
            cusses: Vec::new(),
        }
    }

    pub fn cuss(&mut self, cuss: Cuss) {
        self.cusses.push(cuss);
    }
}

/// The sum type over card variants named in §9.
#[derive(Debug, Clone)]
pub enum CardKind {
    Remark,
    Pagination,
    /// `$<path>`: resolved by the pass-1 driver, not the parser (§4.6).
    Insertion { path: String },
    Basic {
        operation: &'static Operation,
        complemented: bool,
        address: Option<AddressField>,
    },
    Interpretive {
        lhs: Option<InterpretiveOperand>,
        rhs: Option<InterpretiveOperand>,
    },
    AddressConstant {
        operation: &'static Operation,
        address: Option<AddressField>,
    },
    NumericConstant {
        operation: &'static Operation,
        token: String,
    },
    Clerical {
        operation: &'static Operation,
        address: Option<AddressField>,
        complement: bool,
        index: Option<u8>,
    },
}

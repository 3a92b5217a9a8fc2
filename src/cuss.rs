//! Diagnostic catalog ("cusses", §4.8). A flat, fixed list keyed by a
//! historical serial number; fatal/non-fatal is a property of the catalog
//! entry, never of the call site (§7).

use std::collections::HashMap;
use std::sync::LazyLock;

/// One catalog entry: whether this diagnostic is fatal, and its message.
#[derive(Debug, Clone, Copy)]
pub struct CussInfo {
    pub fatal: bool,
    pub message: &'static str,
}

/// A diagnostic instance attached to a card: which catalog entry fired,
/// plus optional free-form context (operand text, a cross-referenced card
/// index) the printer can interpolate into the message.
#[derive(Debug, Clone)]
pub struct Cuss {
    pub serial: u32,
    pub context: Vec<String>,
}

impl Cuss {
    #[must_use]
    pub fn new(serial: u32) -> Self {
        Self { serial, context: Vec::new() }
    }

    #[must_use]
    pub fn with_context(serial: u32, context: impl IntoIterator<Item = String>) -> Self {
        Self { serial, context: context.into_iter().collect() }
    }

    /// Looks up this instance's catalog entry. Panics if `serial` names no
    /// catalog entry — a cuss is only ever constructed from the constants
    /// below, so an unknown serial means a programmer error in this crate.
    #[must_use]
    pub fn info(&self) -> &'static CussInfo {
        CUSS_CATALOG.get(&self.serial).unwrap_or_else(|| panic!("unregistered cuss serial {}", self.serial))
    }

    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.info().fatal
    }
}

// Parse-time cusses (§7.1).
pub const CUSS_COLUMN_17: u32 = 101;
pub const CUSS_LOCATION_SHOULD_BE_BLANK: u32 = 102;
pub const CUSS_ILLEGAL_OPERATION: u32 = 103;

// Pass-1 cusses (§7.2).
pub const CUSS_ADDRESS_CONFLICT: u32 = 201;
pub const CUSS_NO_SUCH_BANK: u32 = 202;
pub const CUSS_BANK_FULL: u32 = 203;
pub const CUSS_ADDRESS_UNDEFINED: u32 = 204;
pub const CUSS_LOCATION_NOT_SET: u32 = 205;
pub const CUSS_SYMBOL_CYCLE: u32 = 206;
pub const CUSS_SYMBOL_UNDEFINED: u32 = 207;

// Pass-2 cusses (§7.3).
pub const CUSS_WRONG_BANK: u32 = 301;
pub const CUSS_EXPECTED_ERASABLE: u32 = 302;
pub const CUSS_OFFSET_NOT_ALLOWED: u32 = 303;
pub const CUSS_BBCON_NEEDS_EBANK: u32 = 304;
pub const CUSS_NOT_FIXED_MEMORY: u32 = 305;
pub const CUSS_DEC_RANGE: u32 = 306;
pub const CUSS_DEC_ABOUTONE: u32 = 307;
pub const CUSS_OCT_EXPONENT: u32 = 308;
pub const CUSS_OCT_FRACTION: u32 = 309;

// I/O cusses (§7.4).
pub const CUSS_NO_MATCH_FOUND: u32 = 401;

static CUSS_CATALOG: LazyLock<HashMap<u32, CussInfo>> = LazyLock::new(|| {
    let mut m = HashMap::new();
    m.insert(CUSS_COLUMN_17, CussInfo { fatal: false, message: "Queer information in column 17" });
    m.insert(CUSS_LOCATION_SHOULD_BE_BLANK, CussInfo { fatal: false, message: "Location field should be blank" });
    m.insert(CUSS_ILLEGAL_OPERATION, CussInfo { fatal: true, message: "Illegal or mis-spelled operation field" });

    m.insert(CUSS_ADDRESS_CONFLICT, CussInfo { fatal: true, message: "Conflict with earlier use of this address" });
    m.insert(CUSS_NO_SUCH_BANK, CussInfo { fatal: true, message: "No such bank or block number" });
    m.insert(CUSS_BANK_FULL, CussInfo { fatal: true, message: "This bank or block is full" });
    m.insert(CUSS_ADDRESS_UNDEFINED, CussInfo { fatal: true, message: "Address field is undefined" });
    m.insert(CUSS_LOCATION_NOT_SET, CussInfo { fatal: true, message: "Location counter is not set" });
    m.insert(CUSS_SYMBOL_CYCLE, CussInfo { fatal: true, message: "Symbol definition cycle detected" });
    m.insert(CUSS_SYMBOL_UNDEFINED, CussInfo { fatal: true, message: "Undefined in pass 1" });

    m.insert(CUSS_WRONG_BANK, CussInfo { fatal: true, message: "Address is in wrong bank" });
    m.insert(CUSS_EXPECTED_ERASABLE, CussInfo { fatal: true, message: "Expected erasable but got fixed" });
    m.insert(CUSS_OFFSET_NOT_ALLOWED, CussInfo { fatal: false, message: "Offset not allowed here" });
    m.insert(
        CUSS_BBCON_NEEDS_EBANK,
        CussInfo { fatal: true, message: "BBCON type constants require preceding EBANK=" },
    );
    m.insert(CUSS_NOT_FIXED_MEMORY, CussInfo { fatal: true, message: "Not in fixed memory" });
    m.insert(CUSS_DEC_RANGE, CussInfo { fatal: false, message: "Value out of range; clamped" });
    m.insert(CUSS_DEC_ABOUTONE, CussInfo { fatal: false, message: "Value rounds to one; clamped below maximum" });
    m.insert(CUSS_OCT_EXPONENT, CussInfo { fatal: true, message: "Exponent not legal on an octal constant" });
    m.insert(CUSS_OCT_FRACTION, CussInfo { fatal: false, message: "Fractional octal digits truncated" });

    m.insert(CUSS_NO_MATCH_FOUND, CussInfo { fatal: true, message: "No match found for card number or acceptor text" });
    m
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_is_a_catalog_property() {
        let cuss = Cuss::new(CUSS_DEC_RANGE);
        assert!(!cuss.is_fatal());
        let cuss = Cuss::new(CUSS_ADDRESS_CONFLICT);
        assert!(cuss.is_fatal());
    }

    #[test]
    fn context_carries_through() {
        let cuss = Cuss::with_context(CUSS_NO_SUCH_BANK, ["07".to_owned()]);
        assert_eq!(cuss.context, vec!["07".to_owned()]);
    }
}

//! Literal catalog entries, per dialect. Not exhaustive of the historical
//! opcode list (~200 entries across three dialects); this covers one or more
//! representative operations of every `OperationKind` and every
//! dialect-variation point named in §4.2, which is what the pass drivers and
//! their tests exercise. Extending a dialect's table means adding another
//! `(aliases, Operation)` entry below; the catalog's shape does not change.

use super::{
    AddressFieldRequirement as AFR, AddressRange as AR, InterpretiveSubType as Sub, Necessity as N, OperandDescriptor,
    OperandKind, OperandShape, Operation, OperationKind as K,
};

fn op(symbol: &'static str, word_count: u8, kind: K) -> Operation {
    Operation { symbol, word_count, kind }
}

const ADDR_OPERAND: OperandDescriptor = OperandDescriptor {
    kind: OperandKind::Address,
    shape: OperandShape::INDEXABLE.union(OperandShape::ERASABLE_ALLOWED).union(OperandShape::FIXED_ALLOWED),
};

const CONST_OPERAND: OperandDescriptor = OperandDescriptor {
    kind: OperandKind::Constant,
    shape: OperandShape::PUSH_DOWN,
};

type Entry = (&'static [&'static str], Operation);

/// Basic, clerical, numeric and address-constant entries common to both
/// Block 2 dialects — only the interpretive misc-jump opcodes and the store
/// ts-codes differ (§4.2), and those are layered in by the two dialect
/// constructors below.
fn block2_common() -> Vec<Entry> {
    vec![
        (
            &["TC"],
            op(
                "TC",
                1,
                K::Basic {
                    op_code: 0,
                    qc: None,
                    address_range: AR::Any,
                    special_address: None,
                    address_bias: None,
                    is_extended: false,
                },
            ),
        ),
        (
            &["CCS"],
            op(
                "CCS",
                1,
                K::Basic {
                    op_code: 1,
                    qc: None,
                    address_range: AR::Erasable,
                    special_address: None,
                    address_bias: None,
                    is_extended: false,
                },
            ),
        ),
        (
            &["CA"],
            op(
                "CA",
                1,
                K::Basic {
                    op_code: 3,
                    qc: Some(2),
                    address_range: AR::Any,
                    special_address: None,
                    address_bias: None,
                    is_extended: false,
                },
            ),
        ),
        (
            &["CS"],
            op(
                "CS",
                1,
                K::Basic {
                    op_code: 3,
                    qc: Some(3),
                    address_range: AR::Any,
                    special_address: None,
                    address_bias: None,
                    is_extended: false,
                },
            ),
        ),
        (
            &["AD"],
            op(
                "AD",
                1,
                K::Basic {
                    op_code: 6,
                    qc: None,
                    address_range: AR::Any,
                    special_address: None,
                    address_bias: None,
                    is_extended: false,
                },
            ),
        ),
        (
            &["MASK"],
            op(
                "MASK",
                1,
                K::Basic {
                    op_code: 7,
                    qc: None,
                    address_range: AR::Any,
                    special_address: None,
                    address_bias: None,
                    is_extended: false,
                },
            ),
        ),
        (
            &["TS"],
            op(
                "TS",
                1,
                K::Basic {
                    op_code: 2,
                    qc: None,
                    address_range: AR::Erasable,
                    special_address: None,
                    address_bias: None,
                    is_extended: false,
                },
            ),
        ),
        (
            &["DXCH"],
            op(
                "DXCH",
                1,
                K::Basic {
                    op_code: 1,
                    qc: Some(1),
                    address_range: AR::Erasable,
                    special_address: None,
                    address_bias: None,
                    is_extended: true,
                },
            ),
        ),
        (
            &["DDOUBL"],
            op(
                "DDOUBL",
                1,
                K::Basic {
                    op_code: 6,
                    qc: None,
                    address_range: AR::Erasable,
                    special_address: None,
                    address_bias: Some(1),
                    is_extended: true,
                },
            ),
        ),
        (
            &["INDEX", "NDX", "5"],
            op(
                "INDEX",
                1,
                K::Basic {
                    op_code: 5,
                    qc: None,
                    address_range: AR::Any,
                    special_address: None,
                    address_bias: None,
                    is_extended: false,
                },
            ),
        ),
        (
            &["EXTEND"],
            op(
                "EXTEND",
                1,
                K::Basic {
                    op_code: 6,
                    qc: Some(0),
                    address_range: AR::Any,
                    special_address: Some(0o25),
                    address_bias: None,
                    is_extended: false,
                },
            ),
        ),
        (
            &["SETLOC"],
            op(
                "SETLOC",
                0,
                K::Clerical {
                    location: N::Forbidden,
                    address: N::Required,
                    complement: N::Forbidden,
                    index: N::Forbidden,
                },
            ),
        ),
        (
            &["BANK"],
            op(
                "BANK",
                0,
                K::Clerical {
                    location: N::Forbidden,
                    address: N::Optional,
                    complement: N::Forbidden,
                    index: N::Forbidden,
                },
            ),
        ),
        (
            &["BLOCK"],
            op(
                "BLOCK",
                0,
                K::Clerical {
                    location: N::Forbidden,
                    address: N::Required,
                    complement: N::Forbidden,
                    index: N::Forbidden,
                },
            ),
        ),
        (
            &["ERASE"],
            op(
                "ERASE",
                0,
                K::Clerical {
                    location: N::Optional,
                    address: N::Optional,
                    complement: N::Forbidden,
                    index: N::Forbidden,
                },
            ),
        ),
        (
            &["EQUALS", "="],
            op(
                "EQUALS",
                0,
                K::Clerical {
                    location: N::Required,
                    address: N::Required,
                    complement: N::Forbidden,
                    index: N::Forbidden,
                },
            ),
        ),
        (
            &["=PLUS"],
            op(
                "=PLUS",
                0,
                K::Clerical {
                    location: N::Required,
                    address: N::Required,
                    complement: N::Forbidden,
                    index: N::Forbidden,
                },
            ),
        ),
        (
            &["=MINUS"],
            op(
                "=MINUS",
                0,
                K::Clerical {
                    location: N::Required,
                    address: N::Required,
                    complement: N::Forbidden,
                    index: N::Forbidden,
                },
            ),
        ),
        (
            &["=ECADR"],
            op(
                "=ECADR",
                0,
                K::Clerical {
                    location: N::Required,
                    address: N::Required,
                    complement: N::Forbidden,
                    index: N::Forbidden,
                },
            ),
        ),
        (
            &["EBANK="],
            op(
                "EBANK=",
                0,
                K::Clerical {
                    location: N::Optional,
                    address: N::Required,
                    complement: N::Forbidden,
                    index: N::Forbidden,
                },
            ),
        ),
        (
            &["SBANK="],
            op(
                "SBANK=",
                0,
                K::Clerical {
                    location: N::Optional,
                    address: N::Required,
                    complement: N::Forbidden,
                    index: N::Forbidden,
                },
            ),
        ),
        (
            &["COUNT"],
            op(
                "COUNT",
                0,
                K::Clerical {
                    location: N::Optional,
                    address: N::Required,
                    complement: N::Forbidden,
                    index: N::Forbidden,
                },
            ),
        ),
        (
            &["BNKSUM"],
            op(
                "BNKSUM",
                0,
                K::Clerical {
                    location: N::Optional,
                    address: N::Optional,
                    complement: N::Forbidden,
                    index: N::Forbidden,
                },
            ),
        ),
        (&["DEC"], op("DEC", 1, K::Numeric)),
        (&["2DEC"], op("2DEC", 2, K::Numeric)),
        (&["OCT"], op("OCT", 1, K::Numeric)),
        (&["2OCT"], op("2OCT", 2, K::Numeric)),
        (&["ADRES"], op("ADRES", 1, K::AddressConstant { address_field: AFR::Required })),
        (&["CADR"], op("CADR", 1, K::AddressConstant { address_field: AFR::Required })),
        (&["ECADR"], op("ECADR", 1, K::AddressConstant { address_field: AFR::Required })),
        (&["GENADR"], op("GENADR", 1, K::AddressConstant { address_field: AFR::Required })),
        (&["REMADR"], op("REMADR", 1, K::AddressConstant { address_field: AFR::Required })),
        (&["BBCON"], op("BBCON", 1, K::AddressConstant { address_field: AFR::Required })),
        (&["2CADR"], op("2CADR", 2, K::AddressConstant { address_field: AFR::Required })),
        (&["2FCADR"], op("2FCADR", 2, K::AddressConstant { address_field: AFR::Required })),
        (&["P"], op("P", 1, K::AddressConstant { address_field: AFR::Optional })),
        (&["DNCHAN"], op("DNCHAN", 1, K::AddressConstant { address_field: AFR::Required })),
        (&["DNPTR"], op("DNPTR", 1, K::AddressConstant { address_field: AFR::Required })),
        (&["1DNADR"], op("1DNADR", 1, K::AddressConstant { address_field: AFR::Required })),
        (&["2DNADR"], op("2DNADR", 1, K::AddressConstant { address_field: AFR::Required })),
        (
            &["STADR"],
            op(
                "STADR",
                1,
                K::Interpretive {
                    sub_type: Sub::Unary,
                    rhs: false,
                    op_code: Some(0o16),
                    code: None,
                    operand1: None,
                    operand2: None,
                },
            ),
        ),
        (
            &["STORE"],
            op(
                "STORE",
                1,
                K::Interpretive {
                    sub_type: Sub::Store,
                    rhs: false,
                    op_code: None,
                    code: Some(0o20),
                    operand1: Some(ADDR_OPERAND),
                    operand2: None,
                },
            ),
        ),
        (
            &["STODL"],
            op(
                "STODL",
                1,
                K::Interpretive {
                    sub_type: Sub::Store,
                    rhs: false,
                    op_code: None,
                    code: Some(0o33),
                    operand1: Some(ADDR_OPERAND),
                    operand2: None,
                },
            ),
        ),
        (
            &["STOVL"],
            op(
                "STOVL",
                1,
                K::Interpretive {
                    sub_type: Sub::Store,
                    rhs: false,
                    op_code: None,
                    code: Some(0o34),
                    operand1: Some(ADDR_OPERAND),
                    operand2: None,
                },
            ),
        ),
        (
            &["STCALL"],
            op(
                "STCALL",
                1,
                K::Interpretive {
                    sub_type: Sub::Store,
                    rhs: false,
                    op_code: None,
                    code: Some(0o35),
                    operand1: Some(ADDR_OPERAND),
                    operand2: None,
                },
            ),
        ),
        (
            &["VLOAD"],
            op(
                "VLOAD",
                1,
                K::Interpretive {
                    sub_type: Sub::Unary,
                    rhs: true,
                    op_code: Some(0o07),
                    code: None,
                    operand1: Some(ADDR_OPERAND),
                    operand2: None,
                },
            ),
        ),
        (
            &["DLOAD"],
            op(
                "DLOAD",
                1,
                K::Interpretive {
                    sub_type: Sub::Unary,
                    rhs: true,
                    op_code: Some(0o27),
                    code: None,
                    operand1: Some(ADDR_OPERAND),
                    operand2: None,
                },
            ),
        ),
        (
            &["SL"],
            op(
                "SL",
                1,
                K::Interpretive {
                    sub_type: Sub::Shift,
                    rhs: true,
                    op_code: Some(0o15),
                    code: None,
                    operand1: Some(CONST_OPERAND),
                    operand2: None,
                },
            ),
        ),
        (
            &["BOV"],
            op(
                "BOV",
                1,
                K::Interpretive {
                    sub_type: Sub::Logical,
                    rhs: false,
                    op_code: Some(0o02),
                    code: None,
                    operand1: Some(ADDR_OPERAND),
                    operand2: None,
                },
            ),
        ),
        (
            &["AXT"],
            op(
                "AXT",
                1,
                K::Interpretive {
                    sub_type: Sub::Indexable,
                    rhs: true,
                    op_code: Some(0o12),
                    code: None,
                    operand1: Some(CONST_OPERAND),
                    operand2: None,
                },
            ),
        ),
    ]
}

/// `CALL`/`ITA`/`RTB`/`BHIZ` swap their opcodes between BLK2 and later AGC
/// assemblers (§4.2). Supplied by the two Block 2 dialect constructors so
/// the rest of the catalog stays identical.
fn misc_jump(blk2: bool) -> Vec<Entry> {
    let (call, ita, rtb, bhiz) = if blk2 { (0o50, 0o51, 0o52, 0o53) } else { (0o51, 0o50, 0o53, 0o52) };
    vec![
        (
            &["CALL"],
            op(
                "CALL",
                1,
                K::Interpretive {
                    sub_type: Sub::Misc,
                    rhs: false,
                    op_code: Some(call),
                    code: None,
                    operand1: Some(ADDR_OPERAND),
                    operand2: None,
                },
            ),
        ),
        (
            &["ITA"],
            op(
                "ITA",
                1,
                K::Interpretive {
                    sub_type: Sub::Misc,
                    rhs: false,
                    op_code: Some(ita),
                    code: None,
                    operand1: None,
                    operand2: None,
                },
            ),
        ),
        (
            &["RTB"],
            op(
                "RTB",
                1,
                K::Interpretive {
                    sub_type: Sub::Misc,
                    rhs: false,
                    op_code: Some(rtb),
                    code: None,
                    operand1: Some(ADDR_OPERAND),
                    operand2: None,
                },
            ),
        ),
        (
            &["BHIZ"],
            op(
                "BHIZ",
                1,
                K::Interpretive {
                    sub_type: Sub::Misc,
                    rhs: false,
                    op_code: Some(bhiz),
                    code: None,
                    operand1: Some(ADDR_OPERAND),
                    operand2: None,
                },
            ),
        ),
    ]
}

pub fn block2_early() -> Vec<Entry> {
    let mut v = block2_common();
    v.extend(misc_jump(true));
    v
}

pub fn block2_agc() -> Vec<Entry> {
    let mut v = block2_common();
    v.extend(misc_jump(false));
    v
}

/// Block 1: fewer clericals, single-word interpretives, and `INDEX`
/// collapsed to one variant reaching any memory (§9 open question).
pub fn block1() -> Vec<Entry> {
    vec![
        (
            &["TC"],
            op(
                "TC",
                1,
                K::Basic {
                    op_code: 0,
                    qc: None,
                    address_range: AR::Any,
                    special_address: None,
                    address_bias: None,
                    is_extended: false,
                },
            ),
        ),
        (
            &["CCS"],
            op(
                "CCS",
                1,
                K::Basic {
                    op_code: 1,
                    qc: None,
                    address_range: AR::Erasable,
                    special_address: None,
                    address_bias: None,
                    is_extended: false,
                },
            ),
        ),
        (
            &["CA"],
            op(
                "CA",
                1,
                K::Basic {
                    op_code: 3,
                    qc: Some(2),
                    address_range: AR::Any,
                    special_address: None,
                    address_bias: None,
                    is_extended: false,
                },
            ),
        ),
        (
            &["AD"],
            op(
                "AD",
                1,
                K::Basic {
                    op_code: 6,
                    qc: None,
                    address_range: AR::Any,
                    special_address: None,
                    address_bias: None,
                    is_extended: false,
                },
            ),
        ),
        (
            &["TS"],
            op(
                "TS",
                1,
                K::Basic {
                    op_code: 2,
                    qc: None,
                    address_range: AR::Erasable,
                    special_address: None,
                    address_bias: None,
                    is_extended: false,
                },
            ),
        ),
        (
            &["INDEX", "NDX", "5"],
            op(
                "INDEX",
                1,
                K::Basic {
                    op_code: 5,
                    qc: None,
                    address_range: AR::Any,
                    special_address: None,
                    address_bias: None,
                    is_extended: false,
                },
            ),
        ),
        (
            &["SETLOC"],
            op(
                "SETLOC",
                0,
                K::Clerical {
                    location: N::Forbidden,
                    address: N::Required,
                    complement: N::Forbidden,
                    index: N::Forbidden,
                },
            ),
        ),
        (
            &["ERASE"],
            op(
                "ERASE",
                0,
                K::Clerical {
                    location: N::Optional,
                    address: N::Optional,
                    complement: N::Forbidden,
                    index: N::Forbidden,
                },
            ),
        ),
        (
            &["EQUALS", "="],
            op(
                "EQUALS",
                0,
                K::Clerical {
                    location: N::Required,
                    address: N::Required,
                    complement: N::Forbidden,
                    index: N::Forbidden,
                },
            ),
        ),
        (&["DEC"], op("DEC", 1, K::Numeric)),
        (&["OCT"], op("OCT", 1, K::Numeric)),
        (&["ADRES"], op("ADRES", 1, K::AddressConstant { address_field: AFR::Required })),
        (&["CADR"], op("CADR", 1, K::AddressConstant { address_field: AFR::Required })),
    ]
}

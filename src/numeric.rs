//! `DEC`/`2DEC`/`OCT`/`2OCT` numeric-constant lexer (§4.3).
//!
//! Exact-rational intermediate arithmetic: the mantissa, decimal exponent,
//! and binary scaling are combined into a `num/den` pair of `i128`s before
//! any rounding happens, so the comparison against the representable
//! maximum is exact rather than floating-point-approximate.

use crate::cuss::{Cuss, CUSS_DEC_RANGE, CUSS_DEC_ABOUTONE, CUSS_OCT_EXPONENT, CUSS_OCT_FRACTION};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    Single,
    Double,
}

impl Precision {
    fn bits(self) -> u32 {
        match self {
            Self::Single => 14,
            Self::Double => 28,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Radix {
    Decimal,
    Octal,
}

/// The one or two words a numeric constant assembles to. Single precision
/// never populates `high_word`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NumericWords {
    pub high_word: Option<u16>,
    pub low_word: u16,
}

/// Significant-digit limits (§4.3): real source exceeds the documented
/// smaller limits and must still assemble, so these are generous rather
/// than the historically-documented figures.
const DECIMAL_SIGNIFICANT_DIGITS: usize = 20;
const OCTAL_SIGNIFICANT_DIGITS: usize = 24;
const MAX_EXPONENT: i32 = 100;
const MAX_SCALING: i32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Rational {
    num: i128,
    den: i128,
}

impl Rational {
    /// Both `num` and `den` are non-negative throughout this module (sign
    /// is tracked and applied separately), so rounding reduces to ordinary
    /// round-half-up.
    fn new(num: i128, den: i128) -> Self {
        Self { num, den }
    }

    /// `self >= other`, cross-multiplied (both denominators are positive).
    fn at_least(self, other_num: i128, other_den: i128) -> bool {
        self.num * other_den >= other_num * self.den
    }

    /// Rounds `self` to the nearest integer, half away from zero.
    fn round_half_away_from_zero(self) -> i128 {
        (2 * self.num + self.den) / (2 * self.den)
    }
}

/// Lexes one numeric-constant token into its assembled word(s).
///
/// `is_extended` is carried through for interface completeness (§4.3 lists
/// it among the lexer's inputs) but the word-building algorithm below does
/// not consult it; the distilled spec names it without describing a
/// numeric-specific effect.
pub fn lex(token: &str, precision: Precision, radix: Radix, is_extended: bool, cusses: &mut Vec<Cuss>) -> NumericWords {
    let _ = is_extended;
    match radix {
        Radix::Decimal => lex_decimal(token, precision, cusses),
        Radix::Octal => lex_octal(token, precision, cusses),
    }
}

struct ParsedDecimal {
    negative: bool,
    mantissa: i128,
    frac_len: i32,
    exponent: i32,
    scaling: i32,
}

fn parse_decimal(token: &str) -> Option<ParsedDecimal> {
    let mut rest = token.trim();
    let negative = match rest.as_bytes().first() {
        Some(b'-') => {
            rest = &rest[1..];
            true
        }
        Some(b'+') => {
            rest = &rest[1..];
            false
        }
        _ => false,
    };

    let mut exponent = 0i32;
    let mut scaling = 0i32;
    let mut mantissa_part = rest;

    if let Some(idx) = rest.find(['B', 'b']) {
        let (head, tail) = rest.split_at(idx);
        mantissa_part = head.trim();
        scaling = tail[1..].trim().parse().ok()?;
    }
    if let Some(idx) = mantissa_part.find(['E', 'e']) {
        let (head, tail) = mantissa_part.split_at(idx);
        mantissa_part = head.trim();
        exponent = tail[1..].trim().parse().ok()?;
    }

    if exponent.unsigned_abs() as i32 > MAX_EXPONENT || scaling.unsigned_abs() as i32 > MAX_SCALING {
        return None;
    }

    let (int_part, frac_part) = match mantissa_part.split_once('.') {
        Some((i, f)) => (i, f),
        None => (mantissa_part, ""),
    };
    let digits: String = int_part.chars().chain(frac_part.chars()).collect();
    if digits.is_empty() || digits.len() > DECIMAL_SIGNIFICANT_DIGITS || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let mantissa: i128 = digits.parse().ok()?;

    Some(ParsedDecimal {
        negative,
        mantissa,
        frac_len: frac_part.len() as i32,
        exponent,
        scaling,
    })
}

fn lex_decimal(token: &str, precision: Precision, cusses: &mut Vec<Cuss>) -> NumericWords {
    let Some(parsed) = parse_decimal(token) else {
        cusses.push(Cuss::new(CUSS_DEC_RANGE));
        return NumericWords::default();
    };

    let bits = precision.bits();
    let max: i128 = 1i128 << bits;

    let mut num = parsed.mantissa;
    let mut den: i128 = 1;
    let effective_exp = parsed.exponent - parsed.frac_len;
    if effective_exp >= 0 {
        num *= 10i128.pow(effective_exp as u32);
    } else {
        den *= 10i128.pow((-effective_exp) as u32);
    }
    if parsed.scaling >= 0 {
        num *= 1i128 << parsed.scaling;
    } else {
        den *= 1i128 << (-parsed.scaling);
    }

    let value = Rational::new(num, den);
    let magnitude = if value.at_least(max, 1) {
        cusses.push(Cuss::new(CUSS_DEC_RANGE));
        max - 1
    } else if value.at_least(1, 1) {
        // Already scaled by the token's own `B` exponent to (or past) a full
        // word's worth; use it directly rather than multiplying by 2^bits
        // again.
        let rounded = value.round_half_away_from_zero();
        if rounded >= max {
            cusses.push(Cuss::new(CUSS_DEC_RANGE));
            max - 1
        } else {
            rounded
        }
    } else {
        let scaled = Rational::new(value.num << bits, value.den);
        let rounded = scaled.round_half_away_from_zero();
        if rounded >= max {
            // ABOUTONE: value was legitimately representable but rounding
            // pushed it one unit past the maximum magnitude; clamp rather
            // than overflow into the sign bit.
            cusses.push(Cuss::new(CUSS_DEC_ABOUTONE));
            max - 1
        } else {
            rounded
        }
    }
    .max(0);

    encode_signed(magnitude as u32, parsed.negative, precision)
}

struct ParsedOctal {
    negative: Option<bool>,
    mantissa: i128,
    scaling: i32,
}

fn parse_octal(token: &str) -> Option<(ParsedOctal, bool)> {
    let mut rest = token.trim();
    let mut negative = None;
    match rest.as_bytes().first() {
        Some(b'-') => {
            rest = &rest[1..];
            negative = Some(true);
        }
        Some(b'+') => {
            rest = &rest[1..];
            negative = Some(false);
        }
        _ => {}
    }

    let mut illegal_exponent = false;
    let mut scaling = 0i32;
    let mut mantissa_part = rest;
    if let Some(idx) = rest.find(['B', 'b']) {
        let (head, tail) = rest.split_at(idx);
        mantissa_part = head.trim();
        scaling = tail[1..].trim().parse().unwrap_or(0);
    }
    if let Some(idx) = mantissa_part.find(['E', 'e']) {
        illegal_exponent = true;
        mantissa_part = mantissa_part[..idx].trim();
    }

    let mut truncated_fraction = false;
    let digits_part = match mantissa_part.split_once('.') {
        Some((i, f)) => {
            truncated_fraction = !f.is_empty();
            i
        }
        None => mantissa_part,
    };
    if digits_part.is_empty() || digits_part.len() > OCTAL_SIGNIFICANT_DIGITS || !digits_part.chars().all(|c| ('0'..='7').contains(&c)) {
        return None;
    }
    let mantissa = i128::from_str_radix(digits_part, 8).ok()?;

    Some((
        ParsedOctal { negative, mantissa, scaling },
        illegal_exponent || truncated_fraction,
    ))
}

fn lex_octal(token: &str, precision: Precision, cusses: &mut Vec<Cuss>) -> NumericWords {
    let Some((parsed, warn)) = parse_octal(token) else {
        cusses.push(Cuss::new(CUSS_OCT_EXPONENT));
        return NumericWords::default();
    };
    if warn {
        cusses.push(Cuss::new(CUSS_OCT_FRACTION));
    }

    let bits = precision.bits();
    let max: i128 = 1i128 << bits;
    let value = if parsed.scaling >= 0 {
        parsed.mantissa << parsed.scaling
    } else {
        parsed.mantissa >> (-parsed.scaling)
    };
    let clamped = if value >= max {
        cusses.push(Cuss::new(CUSS_DEC_RANGE));
        max - 1
    } else {
        value
    };

    match parsed.negative {
        Some(negative) => encode_signed(clamped as u32, negative, precision),
        // No sign: logical encoding, the raw bit pattern up to the full
        // word width (15 bits SP, two 15-bit halves DP).
        None => encode_logical(clamped as u32, precision),
    }
}

fn encode_signed(magnitude: u32, negative: bool, precision: Precision) -> NumericWords {
    match precision {
        Precision::Single => {
            let mut word = (magnitude & 0x3FFF) as u16;
            if negative {
                word = !word & 0x3FFF | 0x4000;
            }
            NumericWords { high_word: None, low_word: word }
        }
        Precision::Double => {
            let mut high = ((magnitude >> 14) & 0x3FFF) as u16;
            let low = (magnitude & 0x3FFF) as u16;
            if negative {
                high = (!high & 0x3FFF) | 0x4000;
            }
            NumericWords { high_word: Some(high), low_word: low }
        }
    }
}

fn encode_logical(magnitude: u32, precision: Precision) -> NumericWords {
    match precision {
        Precision::Single => NumericWords {
            high_word: None,
            low_word: (magnitude & 0x7FFF) as u16,
        },
        Precision::Double => NumericWords {
            high_word: Some(((magnitude >> 15) & 0x7FFF) as u16),
            low_word: (magnitude & 0x7FFF) as u16,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dec_one_b14_clamps_with_range_cuss() {
        let mut cusses = Vec::new();
        let words = lex("1 B14", Precision::Single, Radix::Decimal, false, &mut cusses);
        assert_eq!(words.low_word, 0x3FFF);
        assert!(!cusses.is_empty());
    }

    #[test]
    fn double_dec_half() {
        let mut cusses = Vec::new();
        let words = lex(".5", Precision::Double, Radix::Decimal, false, &mut cusses);
        assert_eq!(words.high_word, Some(0x2000));
        assert_eq!(words.low_word, 0x0000);
        assert!(cusses.is_empty());
    }

    #[test]
    fn oct_77777_is_logical_max() {
        let mut cusses = Vec::new();
        let words = lex("77777", Precision::Single, Radix::Octal, false, &mut cusses);
        assert_eq!(words.low_word, 0x7FFF);
        assert!(cusses.is_empty());
    }

    #[test]
    fn aboutone_rounds_down_rather_than_overflowing() {
        // 0.99999... at full scale would round to 0x4000 (one past the
        // maximum magnitude); the clamp keeps it at 0x3FFF instead.
        let mut cusses = Vec::new();
        let words = lex(".99999999999999999999", Precision::Single, Radix::Decimal, false, &mut cusses);
        assert_eq!(words.low_word, 0x3FFF);
    }
}

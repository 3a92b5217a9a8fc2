//! Address-field parser (§4.5/§6): columns 17-40 of a card, parsed into
//! symbol+offset, numeric, or indirect forms, with an optional trailing
//! index-register suffix (`,1`/`,2`) captured for interpretive operand
//! resolution.

use std::fmt;

/// A parsed address field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressField {
    /// `symbol`, or `symbol +/- number`, with the index suffix (if any).
    Symbol(String, i32, Option<u8>),
    /// `+/- number` with no symbol.
    Number(i32),
    /// `symbol ± symbol`, for `=PLUS`/`=MINUS`: the target, then the symbol
    /// whose value is added or subtracted.
    Indirect(String, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressFieldError(pub String);

impl fmt::Display for AddressFieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "queer information in column 17: `{}`", self.0)
    }
}

impl std::error::Error for AddressFieldError {}

/// Parses the text of columns 17-40, already trimmed of the trailing
/// free-form remark.
pub fn parse(text: &str) -> Result<AddressField, AddressFieldError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AddressFieldError(text.to_owned()));
    }

    let (body, index) = split_index_suffix(text);

    if let Some((lhs, op, rhs)) = split_symbol_symbol(body) {
        if rhs.parse::<i32>().is_err() {
            return Ok(AddressField::Indirect(lhs.to_owned(), format!("{op}{rhs}")));
        }
    }

    if let Some((symbol, sign, number)) = split_symbol_offset(body) {
        let value: i32 = number.parse().map_err(|_| AddressFieldError(text.to_owned()))?;
        let signed = if sign == '-' { -value } else { value };
        return Ok(AddressField::Symbol(symbol.to_owned(), signed, index));
    }

    if let Ok(value) = body.parse::<i32>() {
        return Ok(AddressField::Number(value));
    }
    if let Some(stripped) = body.strip_prefix('+') {
        if let Ok(value) = stripped.parse::<i32>() {
            return Ok(AddressField::Number(value));
        }
    }

    if is_symbol(body) {
        return Ok(AddressField::Symbol(body.to_owned(), 0, index));
    }

    Err(AddressFieldError(text.to_owned()))
}

fn split_index_suffix(text: &str) -> (&str, Option<u8>) {
    if let Some(body) = text.strip_suffix(",1") {
        (body.trim_end(), Some(1))
    } else if let Some(body) = text.strip_suffix(",2") {
        (body.trim_end(), Some(2))
    } else {
        (text, None)
    }
}

/// Splits `SYMBOL +/- N` into `(symbol, sign, digits)`, requiring the
/// right-hand side to be a plain unsigned number.
fn split_symbol_offset(text: &str) -> Option<(&str, char, &str)> {
    for (idx, ch) in text.char_indices().rev() {
        if ch == '+' || ch == '-' {
            let symbol = text[..idx].trim();
            let rest = text[idx + 1..].trim();
            if idx != 0 && is_symbol(symbol) && !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()) {
                return Some((symbol, ch, rest));
            }
        }
    }
    None
}

/// Splits `SYMBOL +/- SYMBOL`, for `=PLUS`/`=MINUS` address fields.
fn split_symbol_symbol(text: &str) -> Option<(&str, char, &str)> {
    for (idx, ch) in text.char_indices().rev() {
        if ch == '+' || ch == '-' {
            let lhs = text[..idx].trim();
            let rhs = text[idx + 1..].trim();
            if idx != 0 && is_symbol(lhs) && is_symbol(rhs) {
                return Some((lhs, ch, rhs));
            }
        }
    }
    None
}

fn is_symbol(text: &str) -> bool {
    !text.is_empty()
        && text.len() <= 8
        && text.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && text.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_symbol() {
        assert_eq!(parse("FOO").unwrap(), AddressField::Symbol("FOO".to_owned(), 0, None));
    }

    #[test]
    fn symbol_with_offset_and_index() {
        assert_eq!(
            parse("FOO +2,1").unwrap(),
            AddressField::Symbol("FOO".to_owned(), 2, Some(1))
        );
    }

    #[test]
    fn bare_number() {
        assert_eq!(parse("-3").unwrap(), AddressField::Number(-3));
    }

    #[test]
    fn symbol_plus_symbol_is_indirect() {
        assert_eq!(
            parse("FOO +BAR").unwrap(),
            AddressField::Indirect("FOO".to_owned(), "+BAR".to_owned())
        );
    }

    #[test]
    fn empty_field_is_an_error() {
        assert!(parse("").is_err());
    }
}

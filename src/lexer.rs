//! Column-format line splitter (§6 "Source format"). Splits one raw source
//! line into its fixed fields; `parser` turns the result into a typed
//! [`crate::card::Card`].

/// Column boundaries, 1-indexed as in the historical source format.
const LOCATION_START: usize = 1; // columns 2-8
const LOCATION_END: usize = 8;
const OPERATION_START: usize = 8; // columns 9-16
const OPERATION_END: usize = 16;
const ADDRESS_START: usize = 16; // columns 17-40
const ADDRESS_END: usize = 40;

/// One lexed line, before it is classified into a [`crate::card::CardKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexedLine {
    /// Column 1: `R`, `P`, `#`, or `$`, if present.
    pub marker: Option<char>,
    pub location: Option<String>,
    /// Operation symbol with its leading `-` and trailing `*` already
    /// stripped off into `complemented`/`extended`.
    pub operation: Option<String>,
    pub complemented: bool,
    pub extended: bool,
    pub address_field: Option<String>,
    pub remark: Option<String>,
}

fn column(line: &str, start: usize, end: usize) -> Option<String> {
    let chars: Vec<char> = line.chars().collect();
    if start >= chars.len() {
        return None;
    }
    let end = end.min(chars.len());
    let slice: String = chars[start..end].iter().collect();
    let trimmed = slice.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Lexes one raw line into its fixed-column fields. Never fails: a line
/// that cannot be sensibly split simply yields `None` fields, and the
/// parser attaches a cuss for the fields it required but didn't get.
#[must_use]
pub fn lex(line: &str) -> LexedLine {
    let chars: Vec<char> = line.chars().collect();
    let marker = chars.first().copied().filter(|c| matches!(c, 'R' | 'P' | '#' | '$'));

    if marker == Some('R') {
        return LexedLine {
            marker,
            location: None,
            operation: None,
            complemented: false,
            extended: false,
            address_field: None,
            remark: Some(line.get(1..).unwrap_or("").trim().to_owned()),
        };
    }
    if marker == Some('$') {
        let path = line.get(1..).unwrap_or("").trim().to_owned();
        return LexedLine {
            marker,
            location: None,
            operation: None,
            complemented: false,
            extended: false,
            address_field: Some(path),
            remark: None,
        };
    }

    let location = column(line, LOCATION_START, LOCATION_END);
    let mut operation = column(line, OPERATION_START, OPERATION_END);
    let mut complemented = false;
    let mut extended = false;
    if let Some(op) = &mut operation {
        if let Some(stripped) = op.strip_prefix('-') {
            complemented = true;
            *op = stripped.to_owned();
        }
        if let Some(stripped) = op.strip_suffix('*') {
            extended = true;
            *op = stripped.to_owned();
        }
    }
    let address_field = column(line, ADDRESS_START, ADDRESS_END);
    let remark = if chars.len() > ADDRESS_END {
        let tail: String = chars[ADDRESS_END..].iter().collect();
        let trimmed = tail.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_owned())
    } else {
        None
    };

    LexedLine {
        marker,
        location,
        operation,
        complemented,
        extended,
        address_field,
        remark,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_line_remark() {
        let lexed = lex("R this is a comment");
        assert_eq!(lexed.marker, Some('R'));
        assert_eq!(lexed.remark.as_deref(), Some("this is a comment"));
    }

    #[test]
    fn insertion_line() {
        let lexed = lex("$MAIN.agc");
        assert_eq!(lexed.marker, Some('$'));
        assert_eq!(lexed.address_field.as_deref(), Some("MAIN.agc"));
    }

    #[test]
    fn basic_instruction_line() {
        let line = " FOO     TC       BAR                      remark text";
        let lexed = lex(line);
        assert_eq!(lexed.location.as_deref(), Some("FOO"));
        assert_eq!(lexed.operation.as_deref(), Some("TC"));
        assert_eq!(lexed.address_field.as_deref(), Some("BAR"));
    }

    #[test]
    fn complement_and_extended_markers_stripped() {
        let line = "        -TC*     BAR";
        let lexed = lex(line);
        assert_eq!(lexed.operation.as_deref(), Some("TC"));
        assert!(lexed.complemented);
        assert!(lexed.extended);
    }
}

//! Input classification: raw input units to transition-table columns
//!
//! The scanner never branches on byte values directly; every unit is first
//! mapped to one [`InputClass`] and the transition table is indexed by that
//! class. Classification is total: every possible byte value maps to a
//! class, with unmatched values falling through to `Other`.

use crate::lexical::table::InputClass;

/// End-of-input sentinel handed to [`classify`] when the stream is exhausted.
pub const END_OF_INPUT: Option<u8> = None;

/// Classify one input unit.
///
/// Units are treated as extended ASCII code points; multi-byte UTF-8
/// sequences are classified byte-wise, which lands their continuation
/// bytes (>= 0xA1) in the visible-symbol class. A known approximation,
/// not full decoding.
///
/// Exact-value checks run before range checks. An embedded NUL is treated
/// as end-of-input, not as data.
pub fn classify(unit: Option<u8>) -> InputClass {
    let byte = match unit {
        None => return InputClass::End,
        Some(b) => b,
    };

    match byte {
        b' ' | b'\t' | b'\n' | b'\r' => return InputClass::Whitespace,
        b'.' => return InputClass::Dot,
        0 => return InputClass::End,
        b':' => return InputClass::Colon,
        b'\\' => return InputClass::Backslash,
        b'_' => return InputClass::Alphabetic,
        b'+' | b'-' => return InputClass::Sign,
        b'"' => return InputClass::DoubleQuote,
        b'\'' => return InputClass::SingleQuote,
        _ => {}
    }

    if byte.is_ascii_digit() {
        return InputClass::Digit;
    }

    if byte.is_ascii_alphabetic() {
        return InputClass::Alphabetic;
    }

    // Any remaining visible symbol: 0x21..=0x7E, or >= 0xA1
    if (0x21..=0x7E).contains(&byte) || byte >= 0xA1 {
        return InputClass::Visible;
    }

    InputClass::Other
}

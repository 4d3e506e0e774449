// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Digit handling shared by cell values, stall labels and sheet names.
//!
//! Venue sheets mix ASCII and full-width digits (`１２`), so both are folded
//! to the same value.

/// Value of an ASCII or full-width decimal digit.
pub fn digit_value(c: char) -> Option<u32> {
    match c {
        '0'..='9' => Some(c as u32 - '0' as u32),
        '０'..='９' => Some(c as u32 - '０' as u32),
        _ => None,
    }
}

fn fold_digits(digits: impl Iterator<Item = u32>) -> Option<u32> {
    let mut value: u32 = 0;
    let mut any = false;
    for d in digits {
        value = value.checked_mul(10)?.checked_add(d)?;
        any = true;
    }
    any.then_some(value)
}

/// Parse text made only of digits, ignoring surrounding whitespace.
pub fn parse_all_digits(text: &str) -> Option<u32> {
    let text = text.trim();
    if !text.chars().all(|c| digit_value(c).is_some()) {
        return None;
    }
    fold_digits(text.chars().filter_map(digit_value))
}

/// Parse the leading run of digits: `"5-1"` → 5, `"12a"` → 12, `"a1"` → none.
pub fn leading_number(text: &str) -> Option<u32> {
    fold_digits(text.trim_start().chars().map_while(digit_value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_digits() {
        assert_eq!(parse_all_digits("42"), Some(42));
        assert_eq!(parse_all_digits(" ４２ "), Some(42));
        assert_eq!(parse_all_digits("4a"), None);
        assert_eq!(parse_all_digits(""), None);
        assert_eq!(parse_all_digits("99999999999"), None);
    }

    #[test]
    fn leading_digits() {
        assert_eq!(leading_number("5-1"), Some(5));
        assert_eq!(leading_number("１２ab"), Some(12));
        assert_eq!(leading_number("  7"), Some(7));
        assert_eq!(leading_number("a1"), None);
        assert_eq!(leading_number(""), None);
    }
}

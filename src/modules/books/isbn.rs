//! ISBN-10 / ISBN-13 format and checksum validation.
//!
//! Spaces and hyphens are ignored, so `978-0-306-40615-7` is accepted.

/// Returns `true` when `value` is a valid ISBN-10 or ISBN-13.
pub fn is_valid(value: &str) -> bool {
    let compact: Vec<u8> = value
        .bytes()
        .filter(|b| !b.is_ascii_whitespace() && *b != b'-')
        .collect();

    match compact.len() {
        10 => is_valid_isbn10(&compact),
        13 => is_valid_isbn13(&compact),
        _ => false,
    }
}

/// Weights 1..=10 over the digits; the last position may be `X` (ten).
/// Valid when the weighted sum is divisible by 11.
fn is_valid_isbn10(digits: &[u8]) -> bool {
    let mut sum = 0u32;
    for (i, &b) in digits.iter().enumerate() {
        let value = match b {
            b'0'..=b'9' => u32::from(b - b'0'),
            b'X' if i == 9 => 10,
            _ => return false,
        };
        sum += (i as u32 + 1) * value;
    }
    sum % 11 == 0
}

/// Alternating weights 1 and 3 over the first twelve digits; the thirteenth
/// is the check digit.
fn is_valid_isbn13(digits: &[u8]) -> bool {
    if !digits.iter().all(u8::is_ascii_digit) {
        return false;
    }
    let sum: u32 = digits[..12]
        .iter()
        .enumerate()
        .map(|(i, &b)| u32::from(b - b'0') * if i % 2 == 0 { 1 } else { 3 })
        .sum();
    let check = (10 - sum % 10) % 10;
    check == u32::from(digits[12] - b'0')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_isbn13() {
        assert!(is_valid("9780306406157"));
        assert!(is_valid("978-0-306-40615-7"));
        assert!(is_valid("978 0 306 40615 7"));
    }

    #[test]
    fn accepts_valid_isbn10() {
        assert!(is_valid("0306406152"));
        assert!(is_valid("0-306-40615-2"));
        assert!(is_valid("080442957X"));
    }

    #[test]
    fn rejects_bad_checksums() {
        assert!(!is_valid("9780306406158"));
        assert!(!is_valid("0306406153"));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(!is_valid("not-an-isbn"));
        assert!(!is_valid(""));
        assert!(!is_valid("97803064061"));
        assert!(!is_valid("X306406152"));
        assert!(!is_valid("080442957x"));
        assert!(!is_valid("978030640615X"));
    }
}

//! Financial identifier standards: validation and random code generation.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use rowforge_core::StandardType;

/// Shape of a Reuters instrument code. RIC has no check digit, so it is
/// handled as a plain pattern rather than a checksummed standard.
pub(crate) const RIC_PATTERN: &str = "[A-Z]{1,4}\\.[A-Z]{1,2}";

const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const UPPER_DIGITS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
// SEDOL bodies never carry vowels.
const SEDOL_CHARS: &[u8] = b"0123456789BCDFGHJKLMNPQRSTVWXYZ";
const SEDOL_WEIGHTS: [u32; 6] = [1, 3, 1, 7, 3, 9];

/// Fixed code length of a standard, `None` for variable-length RIC.
pub(crate) fn code_length(standard: StandardType) -> Option<u32> {
    match standard {
        StandardType::Ric => None,
        StandardType::Isin => Some(12),
        StandardType::Sedol => Some(7),
        StandardType::Cusip => Some(9),
    }
}

/// Whether a string is a well-formed code of the given standard.
pub fn is_valid_code(standard: StandardType, value: &str) -> bool {
    match standard {
        StandardType::Ric => regex::Regex::new(&format!("^(?:{RIC_PATTERN})$"))
            .map(|re| re.is_match(value))
            .unwrap_or(false),
        StandardType::Isin => is_valid_isin(value),
        StandardType::Sedol => is_valid_sedol(value),
        StandardType::Cusip => is_valid_cusip(value),
    }
}

/// Generates a random valid code of the given standard.
pub fn random_code(standard: StandardType, rng: &mut ChaCha8Rng) -> String {
    match standard {
        StandardType::Ric => {
            let head_len = rng.random_range(1..=4);
            let tail_len = rng.random_range(1..=2);
            let head = random_chars(rng, UPPER, head_len);
            let tail = random_chars(rng, UPPER, tail_len);
            format!("{head}.{tail}")
        }
        StandardType::Isin => {
            let mut body = random_chars(rng, UPPER, 2);
            body.push_str(&random_chars(rng, UPPER_DIGITS, 9));
            let check = isin_check_digit(&body);
            format!("{body}{check}")
        }
        StandardType::Sedol => {
            let body = random_chars(rng, SEDOL_CHARS, 6);
            let check = sedol_check_digit(&body);
            format!("{body}{check}")
        }
        StandardType::Cusip => {
            let body = random_chars(rng, UPPER_DIGITS, 8);
            let check = cusip_check_digit(&body);
            format!("{body}{check}")
        }
    }
}

fn is_valid_isin(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 12 {
        return false;
    }
    if !bytes[..2].iter().all(u8::is_ascii_uppercase) {
        return false;
    }
    if !bytes[2..11]
        .iter()
        .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
    {
        return false;
    }
    if !bytes[11].is_ascii_digit() {
        return false;
    }
    luhn_sum(value) % 10 == 0
}

fn is_valid_sedol(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 7 {
        return false;
    }
    if !bytes[..6].iter().all(|b| SEDOL_CHARS.contains(b)) {
        return false;
    }
    let Some(check) = (bytes[6] as char).to_digit(10) else {
        return false;
    };
    let sum: u32 = bytes[..6]
        .iter()
        .zip(SEDOL_WEIGHTS)
        .map(|(b, weight)| char_value(*b) * weight)
        .sum();
    (sum + check) % 10 == 0
}

fn is_valid_cusip(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 9 {
        return false;
    }
    if !bytes[..8]
        .iter()
        .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
    {
        return false;
    }
    let Some(check) = (bytes[8] as char).to_digit(10) else {
        return false;
    };
    cusip_check_digit(&value[..8]) == check
}

/// Luhn over the letter-expanded digits of the whole code.
fn luhn_sum(code: &str) -> u32 {
    let mut digits = Vec::with_capacity(code.len() * 2);
    for byte in code.bytes() {
        let value = char_value(byte);
        if value >= 10 {
            digits.push(value / 10);
            digits.push(value % 10);
        } else {
            digits.push(value);
        }
    }
    digits
        .iter()
        .rev()
        .enumerate()
        .map(|(position, digit)| {
            if position % 2 == 1 {
                let doubled = digit * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                *digit
            }
        })
        .sum()
}

fn isin_check_digit(body: &str) -> u32 {
    // Appending the check shifts doubling parity, so search for the digit
    // that zeroes the total instead of deriving it in place.
    (0..10)
        .find(|check| {
            let candidate = format!("{body}{check}");
            luhn_sum(&candidate) % 10 == 0
        })
        .unwrap_or(0)
}

fn sedol_check_digit(body: &str) -> u32 {
    let sum: u32 = body
        .bytes()
        .zip(SEDOL_WEIGHTS)
        .map(|(b, weight)| char_value(b) * weight)
        .sum();
    (10 - sum % 10) % 10
}

fn cusip_check_digit(body: &str) -> u32 {
    let sum: u32 = body
        .bytes()
        .enumerate()
        .map(|(index, byte)| {
            let mut value = char_value(byte);
            if index % 2 == 1 {
                value *= 2;
            }
            value / 10 + value % 10
        })
        .sum();
    (10 - sum % 10) % 10
}

fn char_value(byte: u8) -> u32 {
    match byte {
        b'0'..=b'9' => u32::from(byte - b'0'),
        b'A'..=b'Z' => u32::from(byte - b'A') + 10,
        _ => 0,
    }
}

fn random_chars(rng: &mut ChaCha8Rng, charset: &[u8], count: u32) -> String {
    (0..count)
        .map(|_| charset[rng.random_range(0..charset.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn validates_known_codes() {
        assert!(is_valid_code(StandardType::Isin, "US0378331005"));
        assert!(is_valid_code(StandardType::Isin, "GB0002634946"));
        assert!(!is_valid_code(StandardType::Isin, "US0378331006"));
        assert!(!is_valid_code(StandardType::Isin, "us0378331005"));

        assert!(is_valid_code(StandardType::Sedol, "0263494"));
        assert!(!is_valid_code(StandardType::Sedol, "0263495"));
        assert!(!is_valid_code(StandardType::Sedol, "0263A94"));

        assert!(is_valid_code(StandardType::Cusip, "037833100"));
        assert!(!is_valid_code(StandardType::Cusip, "037833101"));

        assert!(is_valid_code(StandardType::Ric, "VOD.L"));
        assert!(is_valid_code(StandardType::Ric, "ABCD.XY"));
        assert!(!is_valid_code(StandardType::Ric, "vod.l"));
        assert!(!is_valid_code(StandardType::Ric, "TOOLONG.X"));
    }

    #[test]
    fn generated_codes_validate() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for standard in [
            StandardType::Ric,
            StandardType::Isin,
            StandardType::Sedol,
            StandardType::Cusip,
        ] {
            for _ in 0..25 {
                let code = random_code(standard, &mut rng);
                assert!(
                    is_valid_code(standard, &code),
                    "{standard:?} produced invalid code {code}"
                );
            }
        }
    }
}

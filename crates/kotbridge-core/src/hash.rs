//! Content hashes naming generated fragments.
//!
//! The digest is read as a signed big-endian integer and printed in radix 32
//! with `0-9a-v` digits. A negative sign becomes `x` so the result is safe
//! in file names. Existing generated directories depend on this exact form.

use sha2::{Digest, Sha256};

const DIGITS: &[u8; 32] = b"0123456789abcdefghijklmnopqrstuv";

/// Hashes normalized fragment text into a file-name-safe identifier.
#[must_use]
pub fn fragment_hash(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    signed_radix32(&digest)
}

fn signed_radix32(bytes: &[u8]) -> String {
    let negative = bytes.first().is_some_and(|b| b & 0x80 != 0);
    let magnitude = if negative {
        twos_complement(bytes)
    } else {
        bytes.to_vec()
    };

    let digits = to_radix32(&magnitude);
    if negative {
        format!("x{digits}")
    } else {
        digits
    }
}

fn twos_complement(bytes: &[u8]) -> Vec<u8> {
    let mut out: Vec<u8> = bytes.iter().map(|b| !b).collect();
    for byte in out.iter_mut().rev() {
        let (sum, carry) = byte.overflowing_add(1);
        *byte = sum;
        if !carry {
            break;
        }
    }
    out
}

/// Repeated division of a big-endian magnitude by 32.
fn to_radix32(magnitude: &[u8]) -> String {
    let mut number: Vec<u8> = magnitude.iter().copied().skip_while(|&b| b == 0).collect();
    if number.is_empty() {
        return "0".to_owned();
    }

    let mut digits = Vec::new();
    while !number.is_empty() {
        let mut remainder: u16 = 0;
        for byte in &mut number {
            let acc = (remainder << 8) | u16::from(*byte);
            // acc < 32 * 256, so the quotient fits a byte
            *byte = u8::try_from(acc / 32).unwrap_or(u8::MAX);
            remainder = acc % 32;
        }
        digits.push(DIGITS[usize::from(remainder)]);
        let leading = number.iter().take_while(|&&b| b == 0).count();
        number.drain(..leading);
    }

    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

//! EAN-13 symbol layout and code tables.
//!
//! A symbol is 95 modules: start guard (3), six left digits (6 x 7),
//! center guard (5), six right digits (6 x 7), end guard (3). Left digits
//! use either the L or the G table; the L/G choice across the six left
//! digits encodes the implicit first digit.

use crate::error::{BarcodeError, Result, Section};
use crate::models::Ean13;

pub const MODULE_COUNT: usize = 95;
pub const EDGE_GUARD_LEN: usize = 3;
pub const CENTER_GUARD_LEN: usize = 5;
pub const DIGIT_LEN: usize = 7;
pub const DIGITS_PER_HALF: usize = 6;

const LEFT_START: usize = EDGE_GUARD_LEN;
const RIGHT_START: usize = LEFT_START + DIGITS_PER_HALF * DIGIT_LEN + CENTER_GUARD_LEN;

pub const EDGE_GUARD: [u8; 3] = [1, 0, 1];
pub const CENTER_GUARD: [u8; 5] = [0, 1, 0, 1, 0];

/// Odd-parity left-half codes, indexed by digit.
pub static L_CODES: [u8; 10] = [
    0b0001101, 0b0011001, 0b0010011, 0b0111101, 0b0100011,
    0b0110001, 0b0101111, 0b0111011, 0b0110111, 0b0001011,
];

/// Even-parity left-half codes, indexed by digit.
pub static G_CODES: [u8; 10] = [
    0b0100111, 0b0110011, 0b0011011, 0b0100001, 0b0011101,
    0b0111001, 0b0000101, 0b0010001, 0b0001001, 0b0010111,
];

/// Right-half codes, indexed by digit.
pub static R_CODES: [u8; 10] = [
    0b1110010, 0b1100110, 0b1101100, 0b1000010, 0b1011100,
    0b1001110, 0b1010000, 0b1000100, 0b1001000, 0b1110100,
];

/// Left-half parity per first digit, indexed by digit.
pub static PARITY_PATTERNS: [&str; 10] = [
    "LLLLLL", "LLGLGG", "LLGGLG", "LLGGGL", "LGLLGG",
    "LGGLLG", "LGGGLL", "LGLGLG", "LGLGGL", "LGGLGL",
];

fn pack(bits: &[u8]) -> u8 {
    bits.iter().fold(0, |acc, b| (acc << 1) | (b & 1))
}

fn bits_to_string(bits: &[u8]) -> String {
    bits.iter().map(|b| if *b == 1 { '1' } else { '0' }).collect()
}

fn lookup(table: &[u8; 10], code: u8) -> Option<u8> {
    table.iter().position(|c| *c == code).map(|d| d as u8)
}

/// Resolve a left-half group to (digit, parity character).
fn decode_left(group: &[u8]) -> Option<(u8, char)> {
    let code = pack(group);
    lookup(&L_CODES, code)
        .map(|d| (d, 'L'))
        .or_else(|| lookup(&G_CODES, code).map(|d| (d, 'G')))
}

/// First digit implied by a six-character L/G parity string.
pub fn first_digit_for_parity(pattern: &str) -> Option<u8> {
    PARITY_PATTERNS
        .iter()
        .position(|p| *p == pattern)
        .map(|d| d as u8)
}

/// Decode a 95-module bitstream into its 13 digits.
///
/// Guard modules are not checked; only the twelve digit groups and the
/// parity pattern have to match.
pub fn decode_ean13(code: &[u8]) -> Result<Ean13> {
    if code.len() != MODULE_COUNT {
        return Err(BarcodeError::InsufficientModules { found: code.len() });
    }

    let mut digits = String::with_capacity(13);
    let mut parity = String::with_capacity(DIGITS_PER_HALF);

    let left = &code[LEFT_START..LEFT_START + DIGITS_PER_HALF * DIGIT_LEN];
    for (index, group) in left.chunks_exact(DIGIT_LEN).enumerate() {
        let (digit, table) = decode_left(group).ok_or_else(|| BarcodeError::InvalidCodeGroup {
            section: Section::Left,
            index,
            bits: bits_to_string(group),
        })?;
        digits.push(char::from(b'0' + digit));
        parity.push(table);
    }

    let right = &code[RIGHT_START..RIGHT_START + DIGITS_PER_HALF * DIGIT_LEN];
    for (index, group) in right.chunks_exact(DIGIT_LEN).enumerate() {
        let digit = lookup(&R_CODES, pack(group)).ok_or_else(|| BarcodeError::InvalidCodeGroup {
            section: Section::Right,
            index,
            bits: bits_to_string(group),
        })?;
        digits.push(char::from(b'0' + digit));
    }

    let first = first_digit_for_parity(&parity)
        .ok_or(BarcodeError::InvalidParityPattern { pattern: parity })?;
    digits.insert(0, char::from(b'0' + first));

    Ean13::new(digits).ok_or(BarcodeError::NoBarcodeDecoded)
}

/// Build the 95-module bitstream for a 13-digit string.
/// The check digit is taken as given, not recomputed.
pub fn encode_ean13(digits: &str) -> Option<Vec<u8>> {
    let ean = Ean13::new(digits)?;
    let d: Vec<usize> = ean.as_str().bytes().map(|b| (b - b'0') as usize).collect();
    let parity = PARITY_PATTERNS[d[0]].as_bytes();

    let mut bits = Vec::with_capacity(MODULE_COUNT);
    let push_code = |bits: &mut Vec<u8>, code: u8| {
        bits.extend((0..DIGIT_LEN).rev().map(|shift| (code >> shift) & 1));
    };

    bits.extend_from_slice(&EDGE_GUARD);
    for (i, &digit) in d[1..7].iter().enumerate() {
        let table = if parity[i] == b'L' { &L_CODES } else { &G_CODES };
        push_code(&mut bits, table[digit]);
    }
    bits.extend_from_slice(&CENTER_GUARD);
    for &digit in &d[7..13] {
        push_code(&mut bits, R_CODES[digit]);
    }
    bits.extend_from_slice(&EDGE_GUARD);

    Some(bits)
}

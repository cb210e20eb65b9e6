//! Luhn check digit over the ten-digit form of the number.

use crate::Digit;
use crate::consts::{CHECKSUM_WINDOW_LEN, CHECKSUM_WINDOW_START, SSN_LEN};

/// Computes the check digit of a full twelve digit number, ignoring the
/// century digits and the current check digit.
pub fn checksum_of(digits: &[Digit; SSN_LEN]) -> Digit {
    let window = std::array::from_fn(|i| digits[CHECKSUM_WINDOW_START + i]);
    luhn_checksum(&window)
}

/// Computes the Luhn check digit for the nine digits `YYMMDDNNG`.
///
/// Weights alternate 2, 1, 2, ... starting from the first digit. Products
/// above 9 are reduced to the sum of their digits.
pub fn luhn_checksum(window: &[Digit; CHECKSUM_WINDOW_LEN]) -> Digit {
    let sum: u32 = window
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let weight = if i % 2 == 0 { 2 } else { 1 };
            sum_digits(u32::from(d.get()) * weight)
        })
        .sum();
    Digit::from_mod10(10 - sum % 10)
}

#[inline]
const fn sum_digits(product: u32) -> u32 {
    if product > 9 { product - 9 } else { product }
}

//! Conversion between calendar dates and the YYYYMMDD digit prefix.

use chrono::{Datelike, NaiveDate};

use crate::consts::{DATE_LEN, DAY_START, MONTH_START, YEAR_START};
use crate::{Digit, ParseError};

/// Encodes `date` as eight digits: year (4), month (2), day (2).
///
/// Years outside `0..=9999` are reduced modulo 10000.
pub fn encode_date(date: NaiveDate) -> [Digit; DATE_LEN] {
    let year = date.year().rem_euclid(10_000).unsigned_abs();
    let mut out = [Digit::ZERO; DATE_LEN];
    write_number(&mut out[YEAR_START..MONTH_START], year);
    write_number(&mut out[MONTH_START..DAY_START], date.month());
    write_number(&mut out[DAY_START..DATE_LEN], date.day());
    out
}

/// Decodes the first eight digits of `digits` into a calendar date.
///
/// # Errors
/// Returns `ParseError::InvalidFormat` if fewer than eight digits are given,
/// and `ParseError::InvalidDate` if they do not name a real date.
pub fn decode_date(digits: &[Digit]) -> Result<NaiveDate, ParseError> {
    let prefix = digits.get(..DATE_LEN).ok_or_else(|| {
        ParseError::InvalidFormat(format!(
            "expected {DATE_LEN} date digits, found {}",
            digits.len()
        ))
    })?;
    let year = digits_to_int(&prefix[YEAR_START..MONTH_START]);
    let month = digits_to_int(&prefix[MONTH_START..DAY_START]);
    let day = digits_to_int(&prefix[DAY_START..DATE_LEN]);

    // year < 10000 always fits in i32
    let invalid = || ParseError::InvalidDate {
        year: year as u16,
        month: month as u8,
        day: day as u8,
    };
    NaiveDate::from_ymd_opt(i32::try_from(year).map_err(|_| invalid())?, month, day)
        .ok_or_else(invalid)
}

/// Reads a digit slice as a base-10 integer, most significant digit first.
pub fn digits_to_int(digits: &[Digit]) -> u32 {
    digits
        .iter()
        .fold(0, |acc, d| acc * 10 + u32::from(d.get()))
}

/// Writes `value` into `out` right-aligned, zero padded.
fn write_number(out: &mut [Digit], mut value: u32) {
    for slot in out.iter_mut().rev() {
        *slot = Digit::from_mod10(value);
        value /= 10;
    }
}

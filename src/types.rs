use crate::ParseError;
use crate::prelude::*;
use serde::{Deserialize, Serialize};

/// A single decimal digit, guaranteed to be in the range `0..=9`.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    Into,
    Serialize,
    Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Digit(u8);

impl Digit {
    /// The digit `0`
    pub const ZERO: Self = Self(0);

    /// Largest value a digit can hold
    pub const MAX: u8 = 9;

    /// Creates a new Digit, validating that it's at most 9
    ///
    /// # Errors
    /// Returns `ParseError::InvalidDigit` if the value is greater than 9.
    pub fn new(value: u8) -> Result<Self, ParseError> {
        if value > Self::MAX {
            return Err(ParseError::InvalidDigit {
                position: None,
                value,
            });
        }
        Ok(Self(value))
    }

    /// Takes the least significant decimal digit of `value`.
    #[inline]
    pub const fn from_mod10(value: u32) -> Self {
        Self((value % 10) as u8)
    }

    /// Converts an ASCII character `b'0'..=b'9'`.
    #[inline]
    pub const fn from_ascii(byte: u8) -> Option<Self> {
        if byte.is_ascii_digit() {
            Some(Self(byte - b'0'))
        } else {
            None
        }
    }

    /// Returns the digit value as u8
    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Returns the ASCII character for this digit
    #[inline]
    pub const fn as_char(self) -> char {
        (b'0' + self.0) as char
    }

    #[inline]
    pub const fn is_even(self) -> bool {
        self.0 % 2 == 0
    }
}

impl TryFrom<u8> for Digit {
    type Error = ParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Gender encoded by the parity of the digit at position 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Even gender digit
    #[display(fmt = "female")]
    Female,
    /// Odd gender digit
    #[display(fmt = "male")]
    Male,
}

impl Gender {
    /// Reads the gender from a parity digit.
    pub const fn from_digit(digit: Digit) -> Self {
        if digit.is_even() {
            Self::Female
        } else {
            Self::Male
        }
    }
}

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::Digit;
use crate::checksum::checksum_of;
use crate::consts::{CHECKSUM_POS, GENDER_POS, PATTERN_LEN, SERIAL_LOW, SERIAL_START, SSN_LEN};

/// What to do with a single digit position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DigitDirective {
    /// `*` (and any unrecognized character): leave the digit as is
    #[default]
    Keep,
    /// `?`: uniformly random digit
    Random,
    /// `0`-`9`: set the digit to this value
    Fixed(Digit),
}

/// Directive for the two serial digits at positions 8 and 9.
///
/// The safe range spans both positions, so it is a single variant rather
/// than a per-position directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SerialDirective {
    /// `s` in either position: serial 98x or 99x
    Safe,
    /// Independent directives for positions 8 and 9
    Digits(DigitDirective, DigitDirective),
}

/// Directive for the gender digit at position 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenderDirective {
    /// `f`: random even digit
    Female,
    /// `m`: random odd digit
    Male,
    Digit(DigitDirective),
}

/// Directive for the check digit at position 11.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChecksumDirective {
    /// `c`: recompute from the final positions 2..=10
    Compute,
    Digit(DigitDirective),
}

/// Instructions for filling the trailing four digits of an identity number.
///
/// Parsed from a four character string, one character per position 8..=11.
/// Missing characters default to `*`, extra characters are ignored, and
/// characters with no meaning at their position are treated as `*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pattern {
    serial: SerialDirective,
    gender: GenderDirective,
    checksum: ChecksumDirective,
}

impl Pattern {
    /// `****`: change nothing
    pub const KEEP: Self = Self {
        serial: SerialDirective::Digits(DigitDirective::Keep, DigitDirective::Keep),
        gender: GenderDirective::Digit(DigitDirective::Keep),
        checksum: ChecksumDirective::Digit(DigitDirective::Keep),
    };

    /// `???c`: random serial and gender, valid checksum
    pub const RANDOM: Self = Self {
        serial: SerialDirective::Digits(DigitDirective::Random, DigitDirective::Random),
        gender: GenderDirective::Digit(DigitDirective::Random),
        checksum: ChecksumDirective::Compute,
    };

    /// `ss?c`: serial in the reserved 980-999 range, valid checksum
    pub const SAFE_RANDOM: Self = Self {
        serial: SerialDirective::Safe,
        gender: GenderDirective::Digit(DigitDirective::Random),
        checksum: ChecksumDirective::Compute,
    };

    /// `***c`: only recompute the checksum
    pub const RECOMPUTE_CHECKSUM: Self = Self {
        serial: SerialDirective::Digits(DigitDirective::Keep, DigitDirective::Keep),
        gender: GenderDirective::Digit(DigitDirective::Keep),
        checksum: ChecksumDirective::Compute,
    };

    pub const fn new(
        serial: SerialDirective,
        gender: GenderDirective,
        checksum: ChecksumDirective,
    ) -> Self {
        Self {
            serial,
            gender,
            checksum,
        }
    }

    /// Parses a directive string. Never fails; see the type docs.
    pub fn parse(s: &str) -> Self {
        let mut chars = [DigitDirective::KEEP_CHAR; PATTERN_LEN];
        for (slot, c) in chars.iter_mut().zip(s.chars()) {
            *slot = c;
        }
        let [high, low, gender, checksum] = chars;

        let serial = if high == 's' || low == 's' {
            SerialDirective::Safe
        } else {
            SerialDirective::Digits(DigitDirective::from_char(high), DigitDirective::from_char(low))
        };
        let gender = match gender {
            'f' => GenderDirective::Female,
            'm' => GenderDirective::Male,
            c => GenderDirective::Digit(DigitDirective::from_char(c)),
        };
        let checksum = match checksum {
            'c' => ChecksumDirective::Compute,
            c => ChecksumDirective::Digit(DigitDirective::from_char(c)),
        };
        Self {
            serial,
            gender,
            checksum,
        }
    }

    pub const fn serial(&self) -> SerialDirective {
        self.serial
    }

    pub const fn gender(&self) -> GenderDirective {
        self.gender
    }

    pub const fn checksum(&self) -> ChecksumDirective {
        self.checksum
    }

    /// Rewrites positions 8..=11 of `digits`. The checksum is written last so
    /// that it covers the final serial and gender digits.
    pub(crate) fn apply<R: Rng + ?Sized>(&self, digits: &mut [Digit; SSN_LEN], rng: &mut R) {
        match self.serial {
            SerialDirective::Safe => {
                digits[SERIAL_START] = Digit::from_mod10(9);
                digits[SERIAL_LOW] = Digit::from_mod10(rng.random_range(8..=9));
            }
            SerialDirective::Digits(high, low) => {
                high.apply(&mut digits[SERIAL_START], rng);
                low.apply(&mut digits[SERIAL_LOW], rng);
            }
        }

        match self.gender {
            GenderDirective::Female => {
                digits[GENDER_POS] = Digit::from_mod10(rng.random_range(0..5) * 2);
            }
            GenderDirective::Male => {
                digits[GENDER_POS] = Digit::from_mod10(rng.random_range(0..5) * 2 + 1);
            }
            GenderDirective::Digit(directive) => directive.apply(&mut digits[GENDER_POS], rng),
        }

        match self.checksum {
            ChecksumDirective::Compute => digits[CHECKSUM_POS] = checksum_of(digits),
            ChecksumDirective::Digit(directive) => directive.apply(&mut digits[CHECKSUM_POS], rng),
        }

        tracing::trace!(pattern = %self, "applied pattern");
    }
}

impl DigitDirective {
    const KEEP_CHAR: char = '*';

    fn from_char(c: char) -> Self {
        match c {
            '?' => Self::Random,
            _ => c
                .to_digit(10)
                .map_or(Self::Keep, |d| Self::Fixed(Digit::from_mod10(d))),
        }
    }

    const fn as_char(self) -> char {
        match self {
            Self::Keep => Self::KEEP_CHAR,
            Self::Random => '?',
            Self::Fixed(d) => d.as_char(),
        }
    }

    fn apply<R: Rng + ?Sized>(self, slot: &mut Digit, rng: &mut R) {
        match self {
            Self::Keep => {}
            Self::Random => *slot = Digit::from_mod10(rng.random_range(0..10)),
            Self::Fixed(d) => *slot = d,
        }
    }
}

impl Default for Pattern {
    fn default() -> Self {
        Self::KEEP
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (high, low) = match self.serial {
            SerialDirective::Safe => ('s', 's'),
            SerialDirective::Digits(high, low) => (high.as_char(), low.as_char()),
        };
        let gender = match self.gender {
            GenderDirective::Female => 'f',
            GenderDirective::Male => 'm',
            GenderDirective::Digit(d) => d.as_char(),
        };
        let checksum = match self.checksum {
            ChecksumDirective::Compute => 'c',
            ChecksumDirective::Digit(d) => d.as_char(),
        };
        write!(f, "{high}{low}{gender}{checksum}")
    }
}

impl FromStr for Pattern {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for Pattern {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl Serialize for Pattern {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

mod checksum;
mod codec;
mod config;
mod consts;
mod pattern;
mod prelude;
mod random;
mod types;

pub use checksum::{checksum_of, luhn_checksum};
pub use codec::{decode_date, digits_to_int, encode_date};
pub use config::GeneratorConfig;
pub use consts::*;
pub use pattern::{ChecksumDirective, DigitDirective, GenderDirective, Pattern, SerialDirective};
pub use random::{random_past_datetime, random_past_timestamp};
pub use types::{Digit, Gender};

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use rand::Rng;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Eight date digits, an optional separator, four trailing digits.
static SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{8})-?([0-9]{4})$").expect("identity number shape is a valid regex")
});

/// A 12 digit Swedish-style personal identity number: `YYYYMMDDNNGC`.
///
/// The date digits always name a real calendar date. The check digit is only
/// guaranteed to be correct for values produced by [`Ssn::parse`] or after a
/// pattern that recomputes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ssn {
    digits: [Digit; SSN_LEN],
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Input is not `YYYYMMDD-XXXX` or `YYYYMMDDXXXX`.
    #[error("Input does not match YYYYMMDD-XXXX or YYYYMMDDXXXX: {0}")]
    InvalidFormat(String),

    /// The date digits do not name a real calendar date.
    #[error("Invalid date: {year:04}-{month:02}-{day:02}")]
    InvalidDate { year: u16, month: u8, day: u8 },

    /// The check digit is wrong. Every other field was decoded, so the
    /// decoded value is kept.
    #[error("Invalid checksum for {ssn}: expected {expected}, found {found}")]
    InvalidChecksum {
        ssn: Ssn,
        expected: Digit,
        found: Digit,
    },

    /// A raw value is not a single decimal digit. `position` is set when the
    /// value came from a twelve digit array.
    #[error(
        "Invalid digit: {value}{} (must be 0-9)",
        .position.map(|p| format!(" at position {p}")).unwrap_or_default()
    )]
    InvalidDigit { position: Option<usize>, value: u8 },
}

impl ParseError {
    /// Returns the decoded number if only the checksum was wrong.
    pub const fn decoded(&self) -> Option<&Ssn> {
        match self {
            Self::InvalidChecksum { ssn, .. } => Some(ssn),
            Self::InvalidFormat(_) | Self::InvalidDate { .. } | Self::InvalidDigit { .. } => None,
        }
    }
}

impl Ssn {
    /// Creates a number born on `date` with trailing digits `0000`.
    pub fn from_date(date: NaiveDate) -> Self {
        let mut ssn = Self {
            digits: [Digit::ZERO; SSN_LEN],
        };
        ssn.set_date(date);
        ssn
    }

    /// Creates a number from raw digits. The date is validated, the check
    /// digit is not.
    ///
    /// # Errors
    /// Returns `ParseError::InvalidDigit` for values above 9 and
    /// `ParseError::InvalidDate` if the date digits are not a real date.
    pub fn from_digits(values: [u8; SSN_LEN]) -> Result<Self, ParseError> {
        let mut digits = [Digit::ZERO; SSN_LEN];
        for (position, (slot, value)) in digits.iter_mut().zip(values).enumerate() {
            *slot = Digit::new(value).map_err(|_| ParseError::InvalidDigit {
                position: Some(position),
                value,
            })?;
        }
        codec::decode_date(&digits)?;
        Ok(Self { digits })
    }

    /// Parses and validates `YYYYMMDD-XXXX` or `YYYYMMDDXXXX`.
    ///
    /// The format is checked first, then the date, then the checksum.
    ///
    /// # Errors
    /// Returns `ParseError::InvalidFormat`, `ParseError::InvalidDate`, or
    /// `ParseError::InvalidChecksum` (which carries the decoded value).
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let caps = SHAPE.captures(s).ok_or_else(|| {
            tracing::debug!(input = s, "rejected identity number shape");
            ParseError::InvalidFormat(s.to_owned())
        })?;

        let mut digits = [Digit::ZERO; SSN_LEN];
        let bytes = caps[1].bytes().chain(caps[2].bytes());
        for (slot, byte) in digits.iter_mut().zip(bytes) {
            *slot = Digit::from_ascii(byte).ok_or_else(|| ParseError::InvalidFormat(s.to_owned()))?;
        }

        codec::decode_date(&digits).inspect_err(|err| {
            tracing::debug!(input = s, %err, "rejected identity number date");
        })?;

        let ssn = Self { digits };
        let expected = ssn.computed_checksum();
        let found = ssn.checksum_digit();
        if expected != found {
            tracing::debug!(input = s, %expected, %found, "identity number checksum mismatch");
            return Err(ParseError::InvalidChecksum {
                ssn,
                expected,
                found,
            });
        }
        Ok(ssn)
    }

    /// Overwrites the date digits, leaving positions 8..=11 untouched.
    pub fn set_date(&mut self, date: NaiveDate) {
        self.digits[..DATE_LEN].copy_from_slice(&codec::encode_date(date));
    }

    /// Rewrites the trailing four digits according to `pattern`.
    pub fn apply_pattern<R: Rng + ?Sized>(&mut self, pattern: &Pattern, rng: &mut R) {
        pattern.apply(&mut self.digits, rng);
    }

    /// Returns a copy with the check digit recomputed.
    #[must_use]
    pub fn with_checksum(mut self) -> Self {
        self.digits[CHECKSUM_POS] = self.computed_checksum();
        self
    }

    /// Mints a number with a birth date in the configured age window
    /// before `now`.
    pub fn generate_at<R: Rng + ?Sized>(
        rng: &mut R,
        now: DateTime<Utc>,
        config: &GeneratorConfig,
    ) -> Self {
        let (from, to) = config.age_window();
        // four year digits cannot hold a date before year 0
        let from = NaiveDate::from_ymd_opt(0, 1, 1)
            .map(|first| now.signed_duration_since(first.and_time(NaiveTime::MIN).and_utc()))
            .map_or(from, |max_age| from.min(max_age));
        let born = random::random_past_datetime(rng, now, from, to);
        let mut ssn = Self::from_date(born.date_naive());
        ssn.apply_pattern(&config.pattern, rng);
        tracing::trace!(%ssn, "generated identity number");
        ssn
    }

    /// Mints a number with a birth date in the configured age window.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, config: &GeneratorConfig) -> Self {
        Self::generate_at(rng, Utc::now(), config)
    }

    /// A valid number for a 0-100 year old.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::generate(rng, &GeneratorConfig::default())
    }

    /// A valid number for a 0-100 year old with a serial in the 980-999 range.
    pub fn random_safe<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::generate(rng, &GeneratorConfig::safe())
    }

    /// [`Ssn::random`] with the thread-local generator.
    pub fn new_random() -> Self {
        Self::random(&mut rand::rng())
    }

    /// [`Ssn::random_safe`] with the thread-local generator.
    pub fn new_safe_random() -> Self {
        Self::random_safe(&mut rand::rng())
    }
}

impl Ssn {
    #[inline]
    pub const fn as_digits(&self) -> &[Digit; SSN_LEN] {
        &self.digits
    }

    /// Returns the digits as plain integers
    pub fn digits(&self) -> [u8; SSN_LEN] {
        self.digits.map(Digit::get)
    }

    pub fn year(&self) -> u16 {
        // four digits always fit
        codec::digits_to_int(&self.digits[YEAR_START..MONTH_START]) as u16
    }

    pub fn month(&self) -> u8 {
        codec::digits_to_int(&self.digits[MONTH_START..DAY_START]) as u8
    }

    pub fn day(&self) -> u8 {
        codec::digits_to_int(&self.digits[DAY_START..DATE_LEN]) as u8
    }

    /// Returns (year, month, day)
    pub fn date(&self) -> (u16, u8, u8) {
        (self.year(), self.month(), self.day())
    }

    /// Returns the birth date.
    ///
    /// # Panics
    /// Never through the public API: every constructor validates the date
    /// digits and only [`Ssn::set_date`] writes them.
    pub fn birth_date(&self) -> NaiveDate {
        match codec::decode_date(&self.digits) {
            Ok(date) => date,
            Err(err) => unreachable!("identity number holds an invalid date: {err}"),
        }
    }

    /// Time elapsed since midnight UTC of the birth date.
    pub fn age(&self, now: DateTime<Utc>) -> TimeDelta {
        now.signed_duration_since(self.birth_date().and_time(NaiveTime::MIN).and_utc())
    }

    /// The three digit birth number at positions 8..=10.
    pub fn serial(&self) -> u16 {
        codec::digits_to_int(&self.digits[SERIAL_START..CHECKSUM_POS]) as u16
    }

    /// Whether the serial lies in the reserved 980-999 range.
    pub fn is_safe(&self) -> bool {
        self.serial() >= SAFE_SERIAL_MIN
    }

    pub const fn gender_digit(&self) -> Digit {
        self.digits[GENDER_POS]
    }

    pub const fn gender(&self) -> Gender {
        Gender::from_digit(self.gender_digit())
    }

    pub const fn is_female(&self) -> bool {
        self.gender_digit().is_even()
    }

    pub const fn checksum_digit(&self) -> Digit {
        self.digits[CHECKSUM_POS]
    }

    /// The check digit positions 2..=10 call for.
    pub fn computed_checksum(&self) -> Digit {
        checksum::checksum_of(&self.digits)
    }

    pub fn has_valid_checksum(&self) -> bool {
        self.computed_checksum() == self.checksum_digit()
    }

    /// Renders the number, optionally without the two century digits and
    /// optionally with a separator between date and trailing digits.
    pub fn format(&self, include_century: bool, include_separator: bool) -> String {
        let start = if include_century { 0 } else { SHORT_FORM_START };
        let mut out = String::with_capacity(SSN_LEN + 1);
        for (i, digit) in self.digits.iter().enumerate().skip(start) {
            if i == SERIAL_START && include_separator {
                out.push(SEPARATOR);
            }
            out.push(digit.as_char());
        }
        out
    }
}

impl fmt::Display for Ssn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(true, true))
    }
}

impl FromStr for Ssn {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<[u8; SSN_LEN]> for Ssn {
    type Error = ParseError;

    fn try_from(value: [u8; SSN_LEN]) -> Result<Self, Self::Error> {
        Self::from_digits(value)
    }
}

impl From<NaiveDate> for Ssn {
    fn from(date: NaiveDate) -> Self {
        Self::from_date(date)
    }
}

impl serde::Serialize for Ssn {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for Ssn {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const SAMPLE: [u8; SSN_LEN] = [1, 9, 7, 5, 0, 9, 3, 0, 1, 9, 3, 8];

    fn sample() -> Ssn {
        Ssn::from_digits(SAMPLE).unwrap()
    }

    #[test]
    fn test_parse_with_separator() {
        let ssn = "19750930-1938".parse::<Ssn>().unwrap();
        assert_eq!(ssn.digits(), SAMPLE);
        assert_eq!(ssn.format(true, true), "19750930-1938");
    }

    #[test]
    fn test_parse_without_separator() {
        let ssn = Ssn::parse("197509301938").unwrap();
        assert_eq!(ssn, sample());
    }

    #[test]
    fn test_parse_short_date() {
        let result = Ssn::parse("1975092-1938");
        assert!(matches!(result, Err(ParseError::InvalidFormat(_))));
    }

    #[test]
    fn test_parse_bad_shapes() {
        for input in [
            "",
            "19750930-193",
            "19750930-19380",
            "19750930--1938",
            "1975093-01938",
            "19750930+1938",
            "19750930 1938",
            "7509301938",
            "750930-1938",
            "1975O930-1938",
            " 19750930-1938",
            "19750930-1938\n",
            "１９７５0930-1938",
        ] {
            assert!(
                matches!(Ssn::parse(input), Err(ParseError::InvalidFormat(_))),
                "{input:?} should be a format error"
            );
        }
    }

    #[test]
    fn test_parse_invalid_month() {
        let result = Ssn::parse("20101510-1234");
        assert!(matches!(
            result,
            Err(ParseError::InvalidDate {
                year: 2010,
                month: 15,
                day: 10
            })
        ));
    }

    #[test]
    fn test_parse_leap_days() {
        assert!(Ssn::parse("20000229-1235").is_ok());
        assert!(matches!(
            Ssn::parse("19000229-1235"),
            Err(ParseError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_coordination_number() {
        // day 30 + 60
        let result = Ssn::parse("19750990-1938");
        assert!(matches!(result, Err(ParseError::InvalidDate { day: 90, .. })));
    }

    #[test]
    fn test_parse_date_checked_before_checksum() {
        // wrong checksum too, but the date error wins
        let result = Ssn::parse("20101510-0000");
        assert!(matches!(result, Err(ParseError::InvalidDate { .. })));
    }

    #[test]
    fn test_parse_checksum_error_keeps_decoded_value() {
        let err = Ssn::parse("20090301-6684").unwrap_err();
        let ParseError::InvalidChecksum {
            ssn,
            expected,
            found,
        } = err.clone()
        else {
            panic!("expected checksum error, got {err:?}");
        };
        assert_eq!(expected.get(), 1);
        assert_eq!(found.get(), 4);
        assert_eq!(ssn.digits(), [2, 0, 0, 9, 0, 3, 0, 1, 6, 6, 8, 4]);
        assert_eq!(err.decoded(), Some(&ssn));
        assert!(!ssn.has_valid_checksum());
    }

    #[test]
    fn test_decoded_is_none_for_other_errors() {
        assert_eq!(Ssn::parse("x").unwrap_err().decoded(), None);
        assert_eq!(Ssn::parse("20101510-1234").unwrap_err().decoded(), None);
    }

    #[test]
    fn test_error_messages() {
        let err = Ssn::parse("20090301-6684").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid checksum for 20090301-6684: expected 1, found 4"
        );
        let err = Ssn::parse("20101510-1234").unwrap_err();
        assert_eq!(err.to_string(), "Invalid date: 2010-15-10");
        let err = Ssn::parse("abc").unwrap_err();
        assert!(err.to_string().contains("YYYYMMDD-XXXX"));
    }

    #[test]
    fn test_format_variants() {
        let ssn = sample();
        assert_eq!(ssn.format(true, true), "19750930-1938");
        assert_eq!(ssn.format(true, false), "197509301938");
        assert_eq!(ssn.format(false, true), "750930-1938");
        assert_eq!(ssn.format(false, false), "7509301938");
        assert_eq!(ssn.to_string(), "19750930-1938");
    }

    #[test]
    fn test_format_does_not_validate() {
        let ssn = Ssn::from_digits([1, 9, 7, 5, 0, 9, 3, 0, 0, 0, 0, 0]).unwrap();
        assert!(!ssn.has_valid_checksum());
        assert_eq!(ssn.to_string(), "19750930-0000");
    }

    #[test]
    fn test_from_digits_errors() {
        let mut bad = SAMPLE;
        bad[3] = 10;
        let err = Ssn::from_digits(bad).unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidDigit {
                position: Some(3),
                value: 10
            }
        );
        assert_eq!(err.to_string(), "Invalid digit: 10 at position 3 (must be 0-9)");
        assert_eq!(err.decoded(), None);
        let mut bad = SAMPLE;
        bad[4] = 1;
        bad[5] = 3;
        assert!(matches!(
            Ssn::try_from(bad),
            Err(ParseError::InvalidDate { month: 13, .. })
        ));
    }

    #[test]
    fn test_accessors() {
        let ssn = sample();
        assert_eq!(ssn.year(), 1975);
        assert_eq!(ssn.month(), 9);
        assert_eq!(ssn.day(), 30);
        assert_eq!(ssn.date(), (1975, 9, 30));
        assert_eq!(
            ssn.birth_date(),
            NaiveDate::from_ymd_opt(1975, 9, 30).unwrap()
        );
        assert_eq!(ssn.serial(), 193);
        assert!(!ssn.is_safe());
        assert_eq!(ssn.gender_digit().get(), 3);
        assert_eq!(ssn.gender(), Gender::Male);
        assert!(!ssn.is_female());
        assert_eq!(ssn.checksum_digit().get(), 8);
        assert_eq!(ssn.computed_checksum().get(), 8);
    }

    #[test]
    fn test_female() {
        let ssn = Ssn::parse("20000229-1235").unwrap();
        assert!(!ssn.is_female());
        let mut rng = StdRng::seed_from_u64(1);
        let mut ssn = ssn;
        ssn.apply_pattern(&Pattern::parse("**fc"), &mut rng);
        assert!(ssn.is_female());
        assert_eq!(ssn.gender(), Gender::Female);
        assert!(ssn.has_valid_checksum());
    }

    #[test]
    fn test_age() {
        let ssn = sample();
        let now: DateTime<Utc> = "1975-10-01T06:00:00Z".parse().unwrap();
        assert_eq!(ssn.age(now), TimeDelta::hours(30));
    }

    #[test]
    fn test_from_date_and_set_date() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let mut ssn = Ssn::from(date);
        assert_eq!(ssn.digits(), [2, 0, 2, 4, 0, 2, 2, 9, 0, 0, 0, 0]);
        assert_eq!(ssn.birth_date(), date);

        ssn = sample();
        ssn.set_date(date);
        assert_eq!(ssn.digits(), [2, 0, 2, 4, 0, 2, 2, 9, 1, 9, 3, 8]);
    }

    #[test]
    fn test_with_checksum() {
        let ssn = Ssn::from_digits([1, 9, 7, 5, 0, 9, 3, 0, 1, 9, 3, 0])
            .unwrap()
            .with_checksum();
        assert_eq!(ssn, sample());
    }

    #[test]
    fn test_recompute_checksum_leaves_other_digits() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut ssn = Ssn::from_digits([2, 0, 0, 9, 0, 3, 0, 1, 6, 6, 8, 4]).unwrap();
        ssn.apply_pattern(&Pattern::RECOMPUTE_CHECKSUM, &mut rng);
        assert_eq!(ssn.digits(), [2, 0, 0, 9, 0, 3, 0, 1, 6, 6, 8, 1]);
    }

    #[test]
    fn test_generate_at_window() {
        let mut rng = StdRng::seed_from_u64(3);
        let now: DateTime<Utc> = "2024-06-15T12:00:00Z".parse().unwrap();
        let config = GeneratorConfig::default().with_ages(20, 30);
        let oldest = (now - TimeDelta::days(30 * 365)).date_naive();
        let youngest = (now - TimeDelta::days(20 * 365)).date_naive();
        for _ in 0..200 {
            let ssn = Ssn::generate_at(&mut rng, now, &config);
            assert!(ssn.birth_date() >= oldest);
            assert!(ssn.birth_date() <= youngest);
            assert!(ssn.has_valid_checksum());
            assert_eq!(Ssn::parse(&ssn.to_string()), Ok(ssn));
        }
    }

    #[test]
    fn test_generate_at_unbounded_age_stays_in_past() {
        let mut rng = StdRng::seed_from_u64(6);
        let now: DateTime<Utc> = "2024-06-15T12:00:00Z".parse().unwrap();
        let config = GeneratorConfig::default().with_ages(0, u32::MAX);
        let first = NaiveDate::from_ymd_opt(0, 1, 1).unwrap();
        for _ in 0..100 {
            let ssn = Ssn::generate_at(&mut rng, now, &config);
            assert!(ssn.birth_date() <= now.date_naive(), "{ssn} is born after now");
            assert!(ssn.birth_date() >= first);
            assert!(ssn.has_valid_checksum());
        }
    }

    #[test]
    fn test_random_is_valid() {
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..200 {
            let ssn = Ssn::random(&mut rng);
            assert_eq!(Ssn::parse(&ssn.format(true, false)), Ok(ssn));
        }
    }

    #[test]
    fn test_random_safe() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..200 {
            let ssn = Ssn::random_safe(&mut rng);
            assert!(ssn.is_safe(), "{ssn} is not in the safe range");
            assert!(ssn.has_valid_checksum());
        }
    }

    #[test]
    fn test_thread_rng_constructors() {
        let a = Ssn::new_random();
        let b = Ssn::new_safe_random();
        assert!(a.has_valid_checksum());
        assert!(b.has_valid_checksum());
        assert!(b.is_safe());
        let distinct: std::collections::HashSet<_> = (0..20).map(|_| Ssn::new_random()).collect();
        assert!(distinct.len() > 1);
    }

    #[test]
    fn test_serde() {
        let ssn = sample();
        let json = serde_json::to_string(&ssn).unwrap();
        assert_eq!(json, r#""19750930-1938""#);
        let parsed: Ssn = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ssn);
    }

    #[test]
    fn test_serde_validation() {
        for json in [
            r#""20090301-6684""#,
            r#""20101510-1234""#,
            r#""1975092-1938""#,
        ] {
            let result: Result<Ssn, _> = serde_json::from_str(json);
            assert!(result.is_err(), "{json} should be rejected");
        }
        let parsed: Ssn = serde_json::from_str(r#""197509301938""#).unwrap();
        assert_eq!(parsed, sample());
    }

    fn arb_valid_ssn() -> impl Strategy<Value = Ssn> {
        (0i64..3_652_059, any::<[u8; 3]>()).prop_map(|(days, tail)| {
            let start = NaiveDate::from_ymd_opt(1, 1, 1).unwrap();
            let mut values = Ssn::from_date(start + TimeDelta::days(days)).digits();
            values[SERIAL_START] = tail[0] % 10;
            values[SERIAL_LOW] = tail[1] % 10;
            values[GENDER_POS] = tail[2] % 10;
            Ssn::from_digits(values).unwrap().with_checksum()
        })
    }

    proptest! {
        #[test]
        fn prop_text_round_trip(ssn in arb_valid_ssn()) {
            prop_assert_eq!(Ssn::parse(&ssn.format(true, true)), Ok(ssn));
            prop_assert_eq!(Ssn::parse(&ssn.format(true, false)), Ok(ssn));
        }

        #[test]
        fn prop_single_digit_change_breaks_checksum(
            ssn in arb_valid_ssn(),
            pos in 2usize..=10,
            bump in 1u8..=9
        ) {
            let mut values = ssn.digits();
            values[pos] = (values[pos] + bump) % 10;
            if let Ok(changed) = Ssn::from_digits(values) {
                prop_assert!(!changed.has_valid_checksum());
            }
        }

        #[test]
        fn prop_checksum_in_range(ssn in arb_valid_ssn()) {
            prop_assert!(ssn.computed_checksum().get() <= 9);
        }
    }
}

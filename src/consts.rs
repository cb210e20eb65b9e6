/// Number of digits in a full identity number
pub const SSN_LEN: usize = 12;

/// Number of digits in the date prefix (YYYYMMDD)
pub const DATE_LEN: usize = 8;

/// First position of the year digits
pub const YEAR_START: usize = 0;
/// First position of the month digits
pub const MONTH_START: usize = 4;
/// First position of the day digits
pub const DAY_START: usize = 6;
/// First position of the serial (birth number) digits
pub const SERIAL_START: usize = 8;
/// Second serial digit, the other half of the "safe" pair
pub const SERIAL_LOW: usize = 9;
/// Gender parity digit: even is female, odd is male
pub const GENDER_POS: usize = 10;
/// Trailing check digit
pub const CHECKSUM_POS: usize = 11;

/// First digit covered by the checksum (century digits are excluded)
pub const CHECKSUM_WINDOW_START: usize = 2;
/// Number of digits covered by the checksum
pub const CHECKSUM_WINDOW_LEN: usize = 9;

/// Position where rendering starts when the century is omitted
pub const SHORT_FORM_START: usize = 2;

/// Separator between the date and the trailing four digits
pub const SEPARATOR: char = '-';

/// Lowest three-digit birth number in the reserved "safe" range
pub const SAFE_SERIAL_MIN: u16 = 980;

/// Default upper bound of generated ages, in years
pub const DEFAULT_MAX_AGE_YEARS: u32 = 100;

/// Length of a year when converting ages to durations
pub const DAYS_PER_YEAR: i64 = 365;

/// Number of directive characters in a pattern
pub const PATTERN_LEN: usize = 4;

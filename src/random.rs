//! Random birth timestamps inside an age window.

use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;

/// Returns a timestamp uniformly distributed in `[now - from, now - to)`,
/// at millisecond resolution.
///
/// `from` is the oldest age and `to` the youngest. Both ends are clamped to
/// the range chrono can represent before drawing, so the result never leaves
/// the clamped window. When the window is empty the result is its start.
pub fn random_past_datetime<R: Rng + ?Sized>(
    rng: &mut R,
    now: DateTime<Utc>,
    from: TimeDelta,
    to: TimeDelta,
) -> DateTime<Utc> {
    let oldest = saturating_sub(now, from);
    let youngest = saturating_sub(now, to);
    let span_ms = youngest.signed_duration_since(oldest).num_milliseconds();
    if span_ms <= 0 {
        return oldest;
    }
    let offset = TimeDelta::milliseconds(rng.random_range(0..span_ms));
    // offset < span, so this stays below `youngest`
    oldest.checked_add_signed(offset).unwrap_or(oldest)
}

/// Same as [`random_past_datetime`] measured from the current system time.
pub fn random_past_timestamp<R: Rng + ?Sized>(
    rng: &mut R,
    from: TimeDelta,
    to: TimeDelta,
) -> DateTime<Utc> {
    random_past_datetime(rng, Utc::now(), from, to)
}

fn saturating_sub(now: DateTime<Utc>, delta: TimeDelta) -> DateTime<Utc> {
    now.checked_sub_signed(delta).unwrap_or(if delta > TimeDelta::zero() {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}

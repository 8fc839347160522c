//! Timestamp normalization
//!
//! OpenCode has stored `updated` both as unix seconds and as unix
//! milliseconds. Everything above the stores works in milliseconds.

/// Largest value still treated as seconds (~5138-11-16 when read as seconds).
pub const MAX_SECONDS: i64 = 99_999_999_999;

/// Normalize a timestamp of unknown unit to unix milliseconds.
///
/// Values above [`MAX_SECONDS`] are already milliseconds; zero and negative
/// values pass through unchanged; everything else is scaled from seconds.
pub fn normalize_unix_millis(ts: i64) -> i64 {
    if ts > MAX_SECONDS || ts <= 0 {
        return ts;
    }
    ts * 1000
}

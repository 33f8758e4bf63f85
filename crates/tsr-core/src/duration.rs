//! Stopwatch duration formatting.

/// Formats a millisecond duration as `MM:SS.CC`.
///
/// Minutes are unbounded (an hour renders as `60:00.00`, not wrapped);
/// seconds and centiseconds are zero-padded to two digits.
#[must_use]
pub fn format_ms(ms: u64) -> String {
    let total_seconds = ms / 1000;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    let centis = (ms % 1000) / 10;
    format!("{minutes:02}:{seconds:02}.{centis:02}")
}

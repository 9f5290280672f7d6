use jiff::Timestamp;

const SECOND_MS: i64 = 1_000;
const MINUTE_MS: i64 = 60 * SECOND_MS;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Milliseconds from `now` until `deadline`, negative once it has passed.
pub fn millis_until(deadline: Timestamp, now: Timestamp) -> i64 {
    deadline.as_millisecond() - now.as_millisecond()
}

/// Check if a deadline has passed. A deadline equal to `now` has not.
pub fn is_overdue(deadline: Timestamp, now: Timestamp) -> bool {
    deadline < now
}

/// Render the distance to a deadline, e.g. "1d 2h 0m 5s left" or "3m 0s overdue".
///
/// Leading zero units are dropped, seconds are always shown.
pub fn time_remaining_text(deadline: Timestamp, now: Timestamp) -> String {
    let diff = millis_until(deadline, now);
    let is_past = diff < 0;
    format!(
        "{} {}",
        format_duration_ms(diff.unsigned_abs()),
        if is_past { "overdue" } else { "left" }
    )
}

fn format_duration_ms(abs_ms: u64) -> String {
    let abs_ms = abs_ms as i64;
    let days = abs_ms / DAY_MS;
    let hours = (abs_ms % DAY_MS) / HOUR_MS;
    let minutes = (abs_ms % HOUR_MS) / MINUTE_MS;
    let seconds = (abs_ms % MINUTE_MS) / SECOND_MS;

    let mut parts = Vec::with_capacity(4);
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if hours > 0 || days > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 || hours > 0 || days > 0 {
        parts.push(format!("{minutes}m"));
    }
    parts.push(format!("{seconds}s"));

    parts.join(" ")
}

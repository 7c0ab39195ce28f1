use std::time::Duration;

const SECONDS_PER_CHAR: f64 = 0.06;
const BASE_SECONDS: f64 = 0.5;

/// How long a transient (icon) presentation stays up before auto-dismiss.
///
/// Longer text raises the floor; the configured minimum and maximum clamp
/// the result.
pub fn display_duration(status: Option<&str>, minimum: Duration, maximum: Duration) -> Duration {
    let chars = status.map(|text| text.chars().count()).unwrap_or(0);
    let by_length = chars as f64 * SECONDS_PER_CHAR + BASE_SECONDS;
    let floor = by_length.max(minimum.as_secs_f64());
    let seconds = floor.min(maximum.as_secs_f64());
    Duration::try_from_secs_f64(seconds).unwrap_or(maximum)
}

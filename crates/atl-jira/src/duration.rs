//! Worklog duration parsing.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

/// Seconds assumed when a duration cannot be parsed.
pub const DEFAULT_TIME_SPENT_SECONDS: u64 = 60;

static UNIT_COMPONENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)([wdhm])").expect("invalid duration regex"));

fn unit_seconds(unit: &str) -> u64 {
    match unit {
        "w" => 7 * 24 * 60 * 60,
        "d" => 24 * 60 * 60,
        "h" => 60 * 60,
        _ => 60,
    }
}

/// Parse a time-spent string such as `1w 2d 3h 4m` into seconds.
///
/// Accepted forms, tried in order:
///
/// 1. an integer followed by `s` (`90s`)
/// 2. any number of `<int><unit>` components with units `w`, `d`, `h`
///    and `m`, in any order; repeated units are added up and characters
///    outside components are ignored. Only ASCII digits `0-9` count,
///    other Unicode digits are ignored like any other character
/// 3. a plain number (`3600`, `90.5`), truncated to whole seconds
///
/// Anything else, including components that add up to zero such as `0h`,
/// logs a warning and yields [`DEFAULT_TIME_SPENT_SECONDS`].
///
/// # Examples
///
/// ```
/// use atl_jira::parse_time_spent;
///
/// assert_eq!(parse_time_spent("1h 30m"), 5400);
/// assert_eq!(parse_time_spent("45s"), 45);
/// assert_eq!(parse_time_spent("soon"), 60);
/// ```
pub fn parse_time_spent(time_spent: &str) -> u64 {
    if let Some(seconds) = time_spent.strip_suffix('s')
        && let Ok(seconds) = seconds.trim().parse::<u64>()
    {
        return seconds;
    }

    let total = UNIT_COMPONENT
        .captures_iter(time_spent)
        .fold(0_u64, |total, caps| {
            let value = caps[1].parse::<u64>().unwrap_or(u64::MAX);
            total.saturating_add(value.saturating_mul(unit_seconds(&caps[2])))
        });
    if total > 0 {
        return total;
    }

    if let Some(seconds) = parse_plain_number(time_spent) {
        return seconds;
    }

    warn!(
        "Could not parse time: {}, defaulting to {} seconds",
        time_spent, DEFAULT_TIME_SPENT_SECONDS
    );
    DEFAULT_TIME_SPENT_SECONDS
}

/// Whole seconds from a plain non-negative number.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_plain_number(value: &str) -> Option<u64> {
    let number = value.trim().parse::<f64>().ok()?;
    // Saturating float-to-int cast
    (number.is_finite() && number >= 0.0).then(|| number.trunc() as u64)
}

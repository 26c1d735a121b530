//! Streaks, windowed progress stats and high-score lookups.
//!
//! All functions are pure over a sprint slice assumed to be in append order
//! (which correlates with timestamp order); `now` is explicit so windows and
//! the current streak are deterministic under test. Calendar-day boundaries
//! are taken in the caller's timezone.

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use crate::types::{BestCategory, ProgressRange, ProgressStats, Sprint};

/// Parse an IANA timezone name, falling back to UTC on anything unknown.
pub fn resolve_timezone(name: &str) -> Tz {
    name.parse().unwrap_or_else(|_| {
        tracing::warn!("unknown timezone {:?}, falling back to UTC", name);
        Tz::UTC
    })
}

/// Longest run of consecutive calendar days containing at least one sprint.
pub fn longest_streak(sprints: &[Sprint], tz: Tz) -> usize {
    let mut dates = sprints.iter().map(|s| local_date(s, tz));
    let Some(mut prev) = dates.next() else {
        return 0;
    };

    let mut longest = 1;
    let mut run = 1;
    for date in dates {
        if date == prev {
            continue;
        }
        if prev.succ_opt() == Some(date) {
            run += 1;
        } else {
            run = 1;
        }
        longest = longest.max(run);
        prev = date;
    }
    longest
}

/// Ongoing run of consecutive writing days ending today or yesterday.
///
/// Counts backward from the most recent sprint; a most recent sprint older
/// than yesterday (relative to `now` in `tz`) means the streak is broken.
pub fn current_streak(sprints: &[Sprint], tz: Tz, now: DateTime<Utc>) -> usize {
    let Some(last) = sprints.last() else {
        return 0;
    };

    let today = now.with_timezone(&tz).date_naive();
    let yesterday = today.pred_opt().unwrap_or(NaiveDate::MIN);
    let mut prev = local_date(last, tz);
    if prev < yesterday {
        return 0;
    }

    let mut streak = 1;
    for sprint in sprints[..sprints.len() - 1].iter().rev() {
        let date = local_date(sprint, tz);
        if date == prev {
            continue;
        }
        if date.succ_opt() == Some(prev) {
            streak += 1;
            prev = date;
        } else {
            break;
        }
    }
    streak
}

/// Aggregate stats over the sprints falling inside the window.
///
/// The attached streak is always computed over the whole history; an empty
/// window yields zero sums and a zero average, never an error.
pub fn progress(
    sprints: &[Sprint],
    range: ProgressRange,
    tz: Tz,
    now: DateTime<Utc>,
) -> ProgressStats {
    let start = range_start(range, tz, now);

    let mut word_count: u64 = 0;
    let mut minutes_written = 0.0;
    let mut wpm_sum = 0.0;
    let mut counted: usize = 0;

    for sprint in sprints {
        if let Some(start) = start {
            if sprint.timestamp.with_timezone(&tz) < start {
                continue;
            }
        }
        word_count += u64::from(sprint.word_count);
        minutes_written += duration_minutes(&sprint.duration);
        wpm_sum += sprint.wpm;
        counted += 1;
    }

    ProgressStats {
        word_count,
        minutes_written,
        average_wpm: if counted > 0 {
            wpm_sum / counted as f64
        } else {
            0.0
        },
        current_streak: current_streak(sprints, tz, now),
    }
}

/// The sprint maximizing the category's metric; ties keep the first seen.
pub fn best_sprint(sprints: &[Sprint], category: BestCategory) -> Option<&Sprint> {
    let mut best: Option<&Sprint> = None;
    for sprint in sprints {
        let Some(current) = best else {
            best = Some(sprint);
            continue;
        };
        let better = match category {
            BestCategory::Wpm => sprint.wpm > current.wpm,
            BestCategory::Words => sprint.word_count > current.word_count,
            BestCategory::Duration => {
                duration_minutes(&sprint.duration) > duration_minutes(&current.duration)
            }
        };
        if better {
            best = Some(sprint);
        }
    }
    best
}

/// Total minutes in a `"M...M:SS"` duration; malformed input counts as zero.
pub fn duration_minutes(duration: &str) -> f64 {
    let mut parts = duration.split(':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(minutes), Some(seconds), None) => {
            let minutes = minutes.parse::<i64>().unwrap_or(0);
            let seconds = seconds.parse::<i64>().unwrap_or(0);
            minutes as f64 + seconds as f64 / 60.0
        }
        _ => 0.0,
    }
}

fn local_date(sprint: &Sprint, tz: Tz) -> NaiveDate {
    sprint.timestamp.with_timezone(&tz).date_naive()
}

/// The window's lower bound as a local-midnight instant, or `None` for the
/// unbounded total range.
fn range_start(range: ProgressRange, tz: Tz, now: DateTime<Utc>) -> Option<DateTime<Tz>> {
    let today = now.with_timezone(&tz).date_naive();
    let date = match range {
        ProgressRange::Today => today,
        ProgressRange::Week => {
            // Weeks start on the most recent Sunday.
            let back = Days::new(u64::from(today.weekday().num_days_from_sunday()));
            today.checked_sub_days(back).unwrap_or(today)
        }
        ProgressRange::Month => today.with_day(1).unwrap_or(today),
        ProgressRange::Year => today.with_ordinal(1).unwrap_or(today),
        ProgressRange::Total => return None,
    };
    Some(local_midnight(tz, date))
}

fn local_midnight(tz: Tz, date: NaiveDate) -> DateTime<Tz> {
    let midnight = date.and_hms_opt(0, 0, 0).unwrap();
    // A DST transition can make local midnight ambiguous or nonexistent;
    // prefer the earlier reading, fall back to the UTC instant.
    tz.from_local_datetime(&midnight)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&midnight))
}

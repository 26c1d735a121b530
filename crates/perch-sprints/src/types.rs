use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use perch_store::{join_list, split_list, Record};

const KEY_ID: &str = "ID";
const KEY_TIME: &str = "TIME";
const KEY_WORDS: &str = "WORDS";
const KEY_WPM: &str = "WPM";
const KEY_DURATION: &str = "DURATION";
const KEY_TAGS: &str = "TAGS";

/// One writing session.
///
/// `content` is carried on creation and when explicitly requested; it is
/// never part of the metadata log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprint {
    /// Caller-supplied id, unique within one user's log.
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub word_count: u32,
    pub wpm: f64,
    /// `"M...M:SS"`, minutes unbounded.
    pub duration: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Sprint {
    /// Materialize from a decoded record. A record with a missing or
    /// unparseable id yields no sprint; other bad fields fall back to zero
    /// values, matching the lenient log format.
    pub(crate) fn from_record(record: &Record) -> Option<Self> {
        let id = record.get(KEY_ID)?.parse().ok()?;
        let timestamp = record
            .get(KEY_TIME)
            .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_default();

        Some(Self {
            id,
            timestamp,
            word_count: record
                .get(KEY_WORDS)
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            wpm: record
                .get(KEY_WPM)
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.0),
            duration: record.get(KEY_DURATION).unwrap_or_default().to_string(),
            tags: record.get(KEY_TAGS).map(split_list).unwrap_or_default(),
            content: None,
        })
    }

    pub(crate) fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.push(KEY_ID, self.id.to_string());
        record.push(
            KEY_TIME,
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
        );
        record.push(KEY_WORDS, self.word_count.to_string());
        record.push(KEY_WPM, format!("{:.2}", self.wpm));
        record.push(KEY_DURATION, self.duration.clone());
        record.push(KEY_TAGS, join_list(&self.tags));
        record
    }
}

/// Windowed aggregate stats plus the ongoing streak.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStats {
    pub word_count: u64,
    pub minutes_written: f64,
    pub average_wpm: f64,
    /// Consecutive writing days counted over the entire history, not just
    /// the requested window.
    pub current_streak: usize,
}

/// Date window for progress stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressRange {
    Today,
    Week,
    Month,
    Year,
    Total,
}

#[derive(Debug, Error)]
#[error("Invalid range. Must be one of: today, week, month, year, total")]
pub struct InvalidRange;

impl FromStr for ProgressRange {
    type Err = InvalidRange;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(Self::Today),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            "total" => Ok(Self::Total),
            _ => Err(InvalidRange),
        }
    }
}

/// Metric used for the best-sprint lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BestCategory {
    Wpm,
    Words,
    Duration,
}

#[derive(Debug, Error)]
#[error("Invalid category. Must be one of: wpm, words, duration")]
pub struct InvalidCategory;

impl FromStr for BestCategory {
    type Err = InvalidCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wpm" => Ok(Self::Wpm),
            "words" => Ok(Self::Words),
            "duration" => Ok(Self::Duration),
            _ => Err(InvalidCategory),
        }
    }
}

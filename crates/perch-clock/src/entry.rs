use chrono::{NaiveDate, NaiveTime};

use perch_store::Record;

/// Date header format of a clock entry, e.g. `Mon, Jan 01, 2024`.
pub(crate) const DATE_FORMAT: &str = "%a, %b %d, %Y";
/// Time-of-day format of every clock field.
pub(crate) const TIME_FORMAT: &str = "%H:%M";

pub(crate) const KEY_PUNCH_IN: &str = "P_IN";
pub(crate) const KEY_BREAK_START: &str = "B_IN";
pub(crate) const KEY_BREAK_END: &str = "B_OUT";
pub(crate) const KEY_PUNCH_OUT: &str = "P_OUT";
pub(crate) const KEY_TOTAL: &str = "TIME";

/// One break within a working day. An absent end means the break is ongoing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Break {
    pub start: NaiveTime,
    pub end: Option<NaiveTime>,
}

/// One working day for one user, materialized from a log record.
#[derive(Debug, Clone, PartialEq)]
pub struct ClockEntry {
    pub date: NaiveDate,
    pub punch_in: NaiveTime,
    pub breaks: Vec<Break>,
    pub punch_out: Option<NaiveTime>,
    /// Worked hours net of breaks, recorded at punch-out.
    pub total_hours: Option<f64>,
}

impl ClockEntry {
    /// An entry with no punch-out is the user's current working day.
    pub fn is_open(&self) -> bool {
        self.punch_out.is_none()
    }

    pub fn on_break(&self) -> bool {
        self.breaks.last().is_some_and(|b| b.end.is_none())
    }

    /// Minutes spent in completed breaks.
    pub fn break_minutes(&self) -> i64 {
        self.breaks
            .iter()
            .filter_map(|b| b.end.map(|end| (end - b.start).num_minutes()))
            .sum()
    }

    /// Materialize an entry from a decoded record.
    ///
    /// Returns `None` when the record cannot represent a working day
    /// (missing or unparseable date label or punch-in). Fields that fail to
    /// parse are dropped; a stray `B_OUT` with no open break is ignored.
    pub(crate) fn from_record(record: &Record) -> Option<Self> {
        let date = NaiveDate::parse_from_str(record.label()?, DATE_FORMAT).ok()?;

        let mut punch_in = None;
        let mut breaks: Vec<Break> = Vec::new();
        let mut punch_out = None;
        let mut total_hours = None;

        for (key, value) in record.fields() {
            match key.as_str() {
                KEY_PUNCH_IN => punch_in = parse_time(value),
                KEY_BREAK_START => {
                    if let Some(start) = parse_time(value) {
                        breaks.push(Break { start, end: None });
                    }
                }
                KEY_BREAK_END => {
                    if let Some(last) = breaks.last_mut() {
                        if last.end.is_none() {
                            last.end = parse_time(value);
                        }
                    }
                }
                KEY_PUNCH_OUT => punch_out = parse_time(value),
                KEY_TOTAL => total_hours = value.parse().ok(),
                _ => {}
            }
        }

        Some(Self {
            date,
            punch_in: punch_in?,
            breaks,
            punch_out,
            total_hours,
        })
    }
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, TIME_FORMAT).ok()
}

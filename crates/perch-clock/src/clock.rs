use std::path::PathBuf;
use std::sync::PoisonError;

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;

use perch_store::LogStore;

use crate::entry::{
    ClockEntry, DATE_FORMAT, KEY_BREAK_END, KEY_BREAK_START, KEY_PUNCH_IN, KEY_PUNCH_OUT,
    KEY_TOTAL, TIME_FORMAT,
};
use crate::error::ClockError;

/// Punch state derived fresh from the log for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    NoEntry,
    PunchedIn,
    OnBreak,
    PunchedOut,
}

/// Status report for the punch status endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockStatus {
    /// Remaining time until the daily target, `"<H>H:<M>M"`. Open entry only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_left: Option<String>,
    /// Time worked net of breaks, `"<H>H:<M>M"` while open, `"<hours>H"` once
    /// punched out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_time: Option<String>,
    /// Daily target in effect, two decimals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_hours: Option<String>,
    /// e.g. `"punched in, off break"`.
    pub in_out: String,
}

/// The punch-clock state machine over a per-user append-only log.
///
/// Every operation reconstructs the user's entries from disk, validates its
/// guard against the last entry, and appends the event, all under the
/// user's lock. Validation and the append form one unit; a rejected action
/// never mutates the log.
pub struct PunchClock {
    log: LogStore,
}

impl PunchClock {
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            log: LogStore::with_dir(dir),
        }
    }

    /// All of a user's working days, oldest first.
    pub fn entries(&self, user: &str) -> Result<Vec<ClockEntry>, ClockError> {
        let lock = self.log.user_lock(user);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.load(user)
    }

    /// The user's current punch state.
    pub fn state(&self, user: &str) -> Result<ClockState, ClockError> {
        Ok(match self.entries(user)?.last() {
            None => ClockState::NoEntry,
            Some(e) if e.on_break() => ClockState::OnBreak,
            Some(e) if e.is_open() => ClockState::PunchedIn,
            Some(_) => ClockState::PunchedOut,
        })
    }

    /// Start a new working day.
    pub fn punch_in(&self, user: &str, now: NaiveDateTime) -> Result<(), ClockError> {
        let lock = self.log.user_lock(user);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let entries = self.load(user)?;
        if entries.last().is_some_and(ClockEntry::is_open) {
            return Err(ClockError::AlreadyPunchedIn);
        }

        let now = at_minute(now);
        self.log.append_lines(
            user,
            &[
                String::new(),
                now.format(DATE_FORMAT).to_string(),
                field(KEY_PUNCH_IN, now.time()),
            ],
        )?;
        Ok(())
    }

    /// Start a break within the open working day.
    pub fn break_start(&self, user: &str, now: NaiveDateTime) -> Result<(), ClockError> {
        let lock = self.log.user_lock(user);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let entries = self.load(user)?;
        let current = open_entry(&entries)?;
        if current.on_break() {
            return Err(ClockError::AlreadyOnBreak);
        }

        self.log
            .append_lines(user, &[field(KEY_BREAK_START, at_minute(now).time())])?;
        Ok(())
    }

    /// End the ongoing break.
    pub fn break_end(&self, user: &str, now: NaiveDateTime) -> Result<(), ClockError> {
        let lock = self.log.user_lock(user);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let entries = self.load(user)?;
        let current = open_entry(&entries)?;
        if !current.on_break() {
            return Err(ClockError::NotOnBreak);
        }

        self.log
            .append_lines(user, &[field(KEY_BREAK_END, at_minute(now).time())])?;
        Ok(())
    }

    /// Close the open working day and record the net hours worked.
    ///
    /// Time-of-day deltas assume punch-in and punch-out fall on the same
    /// calendar day; a session crossing midnight records the raw negative
    /// delta rather than guessing intent.
    pub fn punch_out(&self, user: &str, now: NaiveDateTime) -> Result<f64, ClockError> {
        let lock = self.log.user_lock(user);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let entries = self.load(user)?;
        let current = open_entry(&entries)?;
        if current.on_break() {
            return Err(ClockError::StillOnBreak);
        }

        let out = at_minute(now).time();
        let worked = (out - current.punch_in).num_minutes() - current.break_minutes();
        let hours = worked as f64 / 60.0;

        self.log.append_lines(
            user,
            &[
                field(KEY_PUNCH_OUT, out),
                format!("{KEY_TOTAL}::{hours:.2}"),
            ],
        )?;
        Ok(hours)
    }

    /// Status report against a daily hours target.
    pub fn status(
        &self,
        user: &str,
        target_hours: f64,
        now: NaiveDateTime,
    ) -> Result<ClockStatus, ClockError> {
        let entries = self.entries(user)?;

        let Some(current) = entries.last() else {
            return Ok(ClockStatus {
                time_left: None,
                total_time: None,
                work_hours: None,
                in_out: in_out(false, false),
            });
        };

        if current.is_open() {
            let punched_in = current.date.and_time(current.punch_in);
            let mut worked = (now - punched_in).num_minutes() - current.break_minutes();
            if let Some(open_break) = current.breaks.last().filter(|b| b.end.is_none()) {
                worked -= (now - current.date.and_time(open_break.start)).num_minutes();
            }
            let left = (target_hours * 60.0).round() as i64 - worked;

            Ok(ClockStatus {
                time_left: Some(format_hm(left)),
                total_time: Some(format_hm(worked)),
                work_hours: Some(format!("{target_hours:.2}")),
                in_out: in_out(true, current.on_break()),
            })
        } else {
            Ok(ClockStatus {
                time_left: None,
                total_time: current.total_hours.map(|h| format!("{h:.2}H")),
                work_hours: None,
                in_out: in_out(false, false),
            })
        }
    }

    fn load(&self, user: &str) -> Result<Vec<ClockEntry>, ClockError> {
        let records = self.log.load_all(user)?;
        let entries = records
            .iter()
            .filter_map(|record| {
                let entry = ClockEntry::from_record(record);
                if entry.is_none() {
                    tracing::warn!("skipping malformed clock record for user {}", user);
                }
                entry
            })
            .collect();
        Ok(entries)
    }
}

/// The last entry when it is open, or the conflict for acting while closed.
fn open_entry(entries: &[ClockEntry]) -> Result<&ClockEntry, ClockError> {
    entries
        .last()
        .filter(|e| e.is_open())
        .ok_or(ClockError::NotPunchedIn)
}

fn field(key: &str, time: NaiveTime) -> String {
    format!("{key}::{}", time.format(TIME_FORMAT))
}

/// Truncate to the log's minute resolution so computed totals always agree
/// with the recorded `HH:MM` values.
fn at_minute(now: NaiveDateTime) -> NaiveDateTime {
    now.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now)
}

fn in_out(open: bool, on_break: bool) -> String {
    format!(
        "{}, {}",
        if open { "punched in" } else { "punched out" },
        if on_break { "on break" } else { "off break" },
    )
}

fn format_hm(minutes: i64) -> String {
    format!("{}H:{}M", minutes / 60, minutes % 60)
}

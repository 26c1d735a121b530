//! # perch-clock
//!
//! The punch-clock state machine. Each user's working days live in an
//! append-only log; the current open/closed/on-break state is reconstructed
//! from the full log on every request and every transition is validated
//! against it before a single append persists the event.

mod clock;
mod entry;
mod error;

pub use clock::{ClockState, ClockStatus, PunchClock};
pub use entry::{Break, ClockEntry};
pub use error::ClockError;

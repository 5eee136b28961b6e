//! Schedule assembly errors.

/// Errors raised while assembling a schedule.
///
/// These signal inconsistent input records (a stop time naming an unknown
/// trip, a duplicated identifier) rather than routing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("unknown station {0:?}")]
    UnknownStation(String),

    #[error("unknown trip {0:?}")]
    UnknownTrip(String),

    #[error("unknown line {0:?}")]
    UnknownLine(String),

    #[error("duplicate station {0:?}")]
    DuplicateStation(String),

    #[error("duplicate trip {0:?}")]
    DuplicateTrip(String),

    /// Two stop times of one trip share a stop sequence number
    #[error("trip {trip:?} has stop sequence {sequence} more than once")]
    DuplicateStopSequence { trip: String, sequence: u32 },

    /// The time window is empty or reversed
    #[error("invalid time window: {0}")]
    InvalidWindow(String),
}

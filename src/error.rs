use std::fmt::Display;

use chrono::{DateTime, Local, TimeDelta};

use crate::core::interval::Interval;

/// Failures of the reconciliation core. Any of them aborts the current request.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("no data in {requested}")]
    NoData { requested: Interval },

    #[error("tariff data is missing between {after} and {before}")]
    TariffGap { after: DateTime<Local>, before: DateTime<Local> },

    #[error("no tariff covers {interval}, the next entry only starts at {}", .next.start)]
    TariffCoverage { interval: Interval, next: Interval },

    #[error("need tariff coverage past {} but there are no more entries", .interval.end)]
    TariffExhausted { interval: Interval },

    #[error("consumption interval {consumption} is not covered by the tariff interval {tariff}")]
    MisalignedIntervals { consumption: Interval, tariff: Interval },

    #[error("canonical interval width {0} is not positive")]
    NonPositiveWidth(TimeDelta),

    #[error("interval {0} does not end after it starts")]
    InvertedInterval(Interval),

    #[error("interval {interval} overlaps the previous one ending at {previous_end}")]
    OverlappingIntervals { previous_end: DateTime<Local>, interval: Interval },

    #[error("failed to sync `{series}`")]
    SyncFailed {
        series: String,

        #[source]
        source: anyhow::Error,
    },

    #[error("cancelled")]
    Cancelled,

    #[error("storage failure")]
    Storage(#[from] rusqlite::Error),
}

/// Coarse classification of [`ReconcileError`] for the caller.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Nothing is known about the requested period.
    NoData,

    /// The data exists but is internally inconsistent.
    Inconsistent,

    /// The upstream or the local storage could not be reached.
    Unavailable,

    Cancelled,
}

impl ReconcileError {
    pub fn sync_failed(series: impl Display, source: impl Into<anyhow::Error>) -> Self {
        Self::SyncFailed { series: series.to_string(), source: source.into() }
    }

    /// Re-classify the storage failure as a failure to sync the series.
    #[must_use]
    pub fn into_sync_failed(self, series: impl Display) -> Self {
        match self {
            Self::Storage(source) => Self::sync_failed(series, source),
            error => error,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NoData { .. } => ErrorKind::NoData,
            Self::TariffGap { .. }
            | Self::TariffCoverage { .. }
            | Self::TariffExhausted { .. }
            | Self::MisalignedIntervals { .. }
            | Self::NonPositiveWidth(_)
            | Self::InvertedInterval(_)
            | Self::OverlappingIntervals { .. } => ErrorKind::Inconsistent,
            Self::SyncFailed { .. } | Self::Storage(_) => ErrorKind::Unavailable,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }
}

// Booking history: read-only views over the persisted record list

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::booking::BookingRecord;
use crate::catalog::TravelKind;
use crate::store::{BookingRepository, StorageError};

/// Aggregates shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    pub total_bookings: usize,
    pub amount_spent: f64,
    pub upcoming_trips: usize,
}

/// Sort most recent first, by the nested booking time when present and the
/// record's creation timestamp otherwise.
pub fn sort_most_recent_first(records: &mut [BookingRecord]) {
    records.sort_by(|a, b| b.effective_time().cmp(&a.effective_time()));
}

/// Stats over a record list at a given instant. A trip counts as upcoming
/// when its journey date (taken as midnight UTC) is still ahead of `now`;
/// records without a journey date, like hotels, never do.
pub fn stats_at(records: &[BookingRecord], now: DateTime<Utc>) -> HistoryStats {
    let upcoming_trips = records
        .iter()
        .filter_map(|record| record.journey_date())
        .filter_map(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
        .filter(|date| date.and_time(NaiveTime::MIN).and_utc() > now)
        .count();
    HistoryStats {
        total_bookings: records.len(),
        amount_spent: records.iter().map(|record| record.total_amount).sum(),
        upcoming_trips,
    }
}

/// Read-only history over the booking repository.
#[derive(Debug, Clone)]
pub struct HistoryView {
    repo: BookingRepository,
}

impl HistoryView {
    pub fn new(repo: BookingRepository) -> Self {
        Self { repo }
    }

    /// Every booking, most recent first.
    pub fn all(&self) -> Result<Vec<BookingRecord>, StorageError> {
        let mut records = self.repo.load()?;
        sort_most_recent_first(&mut records);
        debug!(total = records.len(), "history loaded");
        Ok(records)
    }

    /// Bookings of one kind only, most recent first.
    pub fn of_kind(&self, kind: TravelKind) -> Result<Vec<BookingRecord>, StorageError> {
        let mut records = self.repo.load()?;
        records.retain(|record| record.kind == kind);
        sort_most_recent_first(&mut records);
        Ok(records)
    }

    pub fn stats(&self) -> Result<HistoryStats, StorageError> {
        Ok(stats_at(&self.repo.load()?, Utc::now()))
    }
}

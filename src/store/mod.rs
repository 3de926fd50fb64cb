//! Read interface the core consumes, and the in-memory reference store.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::NaiveDate;
use ulid::Ulid;

use crate::model::*;

/// Filter for [`CourtStore::fetch_reservations`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationFilter {
    pub date: Option<NaiveDate>,
    pub exclude_cancelled: bool,
    pub status: Option<ReservationStatus>,
    pub kind: Option<String>,
}

impl ReservationFilter {
    /// Every reservation on `date` that still holds its hours.
    pub fn occupying(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            exclude_cancelled: true,
            ..Self::default()
        }
    }

    pub fn matches(&self, r: &Reservation) -> bool {
        self.date.is_none_or(|d| r.date == d)
            && !(self.exclude_cancelled && r.status == ReservationStatus::Cancelled)
            && self.status.is_none_or(|s| r.status == s)
            && self.kind.as_deref().is_none_or(|k| r.kind == k)
    }
}

/// Filter for [`CourtStore::fetch_recurring_bookings`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecurringFilter {
    pub day: Option<DayOfWeek>,
    pub status: Option<RecurringStatus>,
}

impl RecurringFilter {
    pub fn active_on(day: DayOfWeek) -> Self {
        Self {
            day: Some(day),
            status: Some(RecurringStatus::Active),
        }
    }

    pub fn matches(&self, b: &RecurringBooking) -> bool {
        self.day.is_none_or(|d| b.day == d) && self.status.is_none_or(|s| b.status == s)
    }
}

/// Data-access handle. Implementations decide transport and storage;
/// the core only reads through these methods.
#[async_trait]
pub trait CourtStore: Send + Sync {
    async fn fetch_reservations(&self, filter: &ReservationFilter) -> Result<Vec<Reservation>, DataFetchError>;

    async fn fetch_recurring_bookings(
        &self,
        filter: &RecurringFilter,
    ) -> Result<Vec<RecurringBooking>, DataFetchError>;

    /// Active bands ordered by start hour.
    async fn fetch_active_time_bands(&self) -> Result<Vec<TimeBand>, DataFetchError>;

    async fn fetch_confirmed_reservations(&self, range: &DateRange) -> Result<Vec<Reservation>, DataFetchError>;

    async fn fetch_product_sales(&self, range: &DateRange) -> Result<Vec<ProductSale>, DataFetchError>;

    /// Per-day override of the venue's opening hours, if configured.
    async fn fetch_operating_hours(&self, _day: DayOfWeek) -> Result<Option<OperatingHours>, DataFetchError> {
        Ok(None)
    }
}

// ── Errors ────────────────────────────────────────────────────

/// A collaborator read failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataFetchError {
    Unavailable(String),
    InvalidRecord(String),
}

impl std::fmt::Display for DataFetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataFetchError::Unavailable(msg) => write!(f, "data store unavailable: {msg}"),
            DataFetchError::InvalidRecord(msg) => write!(f, "invalid record from data store: {msg}"),
        }
    }
}

impl std::error::Error for DataFetchError {}

/// A write was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    NotFound(Ulid),
    AlreadyExists(Ulid),
    /// The hours are held by the given reservation or fixed client.
    Conflict(Ulid),
    InvalidTransition { id: Ulid, from: String, to: String },
    OverlappingBands { first: Ulid, second: Ulid },
    LimitExceeded(&'static str),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound(id) => write!(f, "not found: {id}"),
            StoreError::AlreadyExists(id) => write!(f, "already exists: {id}"),
            StoreError::Conflict(id) => write!(f, "hours already taken by: {id}"),
            StoreError::InvalidTransition { id, from, to } => {
                write!(f, "{id}: cannot change status from {from} to {to}")
            }
            StoreError::OverlappingBands { first, second } => {
                write!(f, "active price bands overlap: {first} and {second}")
            }
            StoreError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

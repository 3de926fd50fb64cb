use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;
use ulid::Ulid;

use crate::limits::*;
use crate::model::*;

use super::{CourtStore, DataFetchError, RecurringFilter, ReservationFilter, StoreError};

/// In-process reference store for one venue.
///
/// Reads go straight to the maps. Every write that has to look at other
/// records first (conflicts, band overlap, status transitions) holds
/// `write_gate` for the whole check-then-write sequence, so two concurrent
/// bookings for the same hour cannot both succeed.
pub struct MemoryStore {
    reservations: DashMap<Ulid, Reservation>,
    recurring: DashMap<Ulid, RecurringBooking>,
    bands: DashMap<Ulid, TimeBand>,
    sales: DashMap<Ulid, ProductSale>,
    hours: DashMap<DayOfWeek, OperatingHours>,
    write_gate: Mutex<()>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            reservations: DashMap::new(),
            recurring: DashMap::new(),
            bands: DashMap::new(),
            sales: DashMap::new(),
            hours: DashMap::new(),
            write_gate: Mutex::new(()),
        }
    }

    // ── Reservations ─────────────────────────────────────────

    pub fn reservation(&self, id: &Ulid) -> Option<Reservation> {
        self.reservations.get(id).map(|e| e.value().clone())
    }

    pub fn reservation_count(&self) -> usize {
        self.reservations.len()
    }

    /// Insert a reservation. Anything but a cancelled one must find its
    /// hours free of other reservations and of active fixed clients.
    pub async fn create_reservation(&self, reservation: Reservation) -> Result<(), StoreError> {
        check_text(&reservation.kind)?;
        for field in [&reservation.client_name, &reservation.client_phone, &reservation.payment_method] {
            check_text(field.as_deref().unwrap_or_default())?;
        }
        let _gate = self.write_gate.lock().await;
        if self.reservations.len() >= MAX_RESERVATIONS_PER_VENUE {
            return Err(StoreError::LimitExceeded("too many reservations"));
        }
        if self.reservations.contains_key(&reservation.id) {
            return Err(StoreError::AlreadyExists(reservation.id));
        }
        if reservation.occupies()
            && let Some(holder) = self.reservation_conflict(reservation.date, &reservation.span, None)
        {
            debug!(
                "reservation {} on {} {} rejected: held by {holder}",
                reservation.id, reservation.date, reservation.span
            );
            return Err(StoreError::Conflict(holder));
        }
        self.reservations.insert(reservation.id, reservation);
        Ok(())
    }

    pub async fn set_reservation_status(
        &self,
        id: Ulid,
        status: ReservationStatus,
    ) -> Result<Reservation, StoreError> {
        let _gate = self.write_gate.lock().await;
        let mut entry = self.reservations.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if !entry.status.can_transition_to(status) {
            return Err(StoreError::InvalidTransition {
                id,
                from: entry.status.to_string(),
                to: status.to_string(),
            });
        }
        entry.status = status;
        Ok(entry.clone())
    }

    /// Remove a reservation outright (admin "release").
    pub async fn delete_reservation(&self, id: Ulid) -> Result<Reservation, StoreError> {
        let _gate = self.write_gate.lock().await;
        self.reservations
            .remove(&id)
            .map(|(_, r)| r)
            .ok_or(StoreError::NotFound(id))
    }

    /// First record holding any hour of `span` on `date`, skipping `ignore`.
    fn reservation_conflict(&self, date: NaiveDate, span: &HourSpan, ignore: Option<Ulid>) -> Option<Ulid> {
        for entry in self.reservations.iter() {
            let r = entry.value();
            if Some(r.id) != ignore && r.date == date && r.occupies() && r.span.overlaps(span) {
                return Some(r.id);
            }
        }
        self.recurring_conflict(DayOfWeek::of(date), span, None)
    }

    // ── Fixed clients ────────────────────────────────────────

    pub fn recurring_booking(&self, id: &Ulid) -> Option<RecurringBooking> {
        self.recurring.get(id).map(|e| e.value().clone())
    }

    /// Insert a fixed client. Created active it must not overlap another
    /// active fixed client on the same weekday; requests are never checked.
    pub async fn create_recurring(&self, booking: RecurringBooking) -> Result<(), StoreError> {
        for field in [&booking.client_name, &booking.client_phone] {
            check_text(field.as_deref().unwrap_or_default())?;
        }
        let _gate = self.write_gate.lock().await;
        if self.recurring.len() >= MAX_RECURRING_PER_VENUE {
            return Err(StoreError::LimitExceeded("too many fixed clients"));
        }
        if self.recurring.contains_key(&booking.id) {
            return Err(StoreError::AlreadyExists(booking.id));
        }
        if booking.occupies()
            && let Some(holder) = self.recurring_conflict(booking.day, &booking.span, None)
        {
            return Err(StoreError::Conflict(holder));
        }
        self.recurring.insert(booking.id, booking);
        Ok(())
    }

    /// File a fixed-client request whatever status it carries. Requests
    /// hold no hours until activated.
    pub async fn request_recurring(&self, booking: RecurringBooking) -> Result<(), StoreError> {
        self.create_recurring(booking.with_status(RecurringStatus::Requested)).await
    }

    pub async fn set_recurring_status(
        &self,
        id: Ulid,
        status: RecurringStatus,
    ) -> Result<RecurringBooking, StoreError> {
        let _gate = self.write_gate.lock().await;
        let current = self.recurring_booking(&id).ok_or(StoreError::NotFound(id))?;
        if !current.status.can_transition_to(status) {
            return Err(StoreError::InvalidTransition {
                id,
                from: current.status.to_string(),
                to: status.to_string(),
            });
        }
        if status == RecurringStatus::Active
            && current.status != RecurringStatus::Active
            && let Some(holder) = self.recurring_conflict(current.day, &current.span, Some(id))
        {
            return Err(StoreError::Conflict(holder));
        }
        let updated = current.with_status(status);
        self.recurring.insert(id, updated.clone());
        Ok(updated)
    }

    fn recurring_conflict(&self, day: DayOfWeek, span: &HourSpan, ignore: Option<Ulid>) -> Option<Ulid> {
        self.recurring
            .iter()
            .find(|e| {
                let b = e.value();
                Some(b.id) != ignore && b.day == day && b.occupies() && b.span.overlaps(span)
            })
            .map(|e| *e.key())
    }

    // ── Price bands ──────────────────────────────────────────

    /// Insert or replace a band. Active bands may not overlap each other.
    pub async fn upsert_time_band(&self, band: TimeBand) -> Result<(), StoreError> {
        let _gate = self.write_gate.lock().await;
        if !self.bands.contains_key(&band.id) && self.bands.len() >= MAX_TIME_BANDS {
            return Err(StoreError::LimitExceeded("too many price bands"));
        }
        if band.active {
            self.check_band_overlap(&band)?;
        }
        self.bands.insert(band.id, band);
        Ok(())
    }

    pub async fn set_time_band_active(&self, id: Ulid, active: bool) -> Result<TimeBand, StoreError> {
        let _gate = self.write_gate.lock().await;
        let mut band = self.bands.get(&id).map(|e| e.value().clone()).ok_or(StoreError::NotFound(id))?;
        band.active = active;
        if active {
            self.check_band_overlap(&band)?;
        }
        self.bands.insert(id, band.clone());
        Ok(band)
    }

    fn check_band_overlap(&self, band: &TimeBand) -> Result<(), StoreError> {
        for entry in self.bands.iter() {
            let other = entry.value();
            if other.id != band.id && other.active && other.span.overlaps(&band.span) {
                return Err(StoreError::OverlappingBands {
                    first: other.id,
                    second: band.id,
                });
            }
        }
        Ok(())
    }

    /// Every band, active or not, ordered by start hour.
    pub fn all_time_bands(&self) -> Vec<TimeBand> {
        let mut bands: Vec<TimeBand> = self.bands.iter().map(|e| e.value().clone()).collect();
        bands.sort_by_key(|b| (b.span.start, b.span.end));
        bands
    }

    // ── Shop ─────────────────────────────────────────────────

    pub async fn record_product_sale(&self, sale: ProductSale) -> Result<(), StoreError> {
        let _gate = self.write_gate.lock().await;
        if self.sales.len() >= MAX_PRODUCT_SALES_PER_VENUE {
            return Err(StoreError::LimitExceeded("too many product sales"));
        }
        if self.sales.contains_key(&sale.id) {
            return Err(StoreError::AlreadyExists(sale.id));
        }
        self.sales.insert(sale.id, sale);
        Ok(())
    }

    // ── Opening hours ────────────────────────────────────────

    pub fn set_operating_hours(&self, day: DayOfWeek, hours: OperatingHours) {
        self.hours.insert(day, hours);
    }

    /// Configured per-day overrides, Sunday first.
    pub fn operating_schedule(&self) -> Vec<(DayOfWeek, OperatingHours)> {
        let mut schedule: Vec<_> = self.hours.iter().map(|e| (*e.key(), *e.value())).collect();
        schedule.sort_by_key(|(day, _)| *day);
        schedule
    }
}

fn check_text(s: &str) -> Result<(), StoreError> {
    if s.len() > MAX_LABEL_LEN {
        return Err(StoreError::LimitExceeded("text field too long"));
    }
    Ok(())
}

#[async_trait]
impl CourtStore for MemoryStore {
    async fn fetch_reservations(&self, filter: &ReservationFilter) -> Result<Vec<Reservation>, DataFetchError> {
        let mut out: Vec<Reservation> = self
            .reservations
            .iter()
            .filter(|e| filter.matches(e.value()))
            .map(|e| e.value().clone())
            .collect();
        out.sort_by_key(|r| (r.date, r.span.start, r.id));
        Ok(out)
    }

    async fn fetch_recurring_bookings(
        &self,
        filter: &RecurringFilter,
    ) -> Result<Vec<RecurringBooking>, DataFetchError> {
        let mut out: Vec<RecurringBooking> = self
            .recurring
            .iter()
            .filter(|e| filter.matches(e.value()))
            .map(|e| e.value().clone())
            .collect();
        out.sort_by_key(|b| (b.day, b.span.start, b.id));
        Ok(out)
    }

    async fn fetch_active_time_bands(&self) -> Result<Vec<TimeBand>, DataFetchError> {
        let mut out: Vec<TimeBand> = self
            .bands
            .iter()
            .filter(|e| e.value().active)
            .map(|e| e.value().clone())
            .collect();
        out.sort_by_key(|b| b.span.start);
        Ok(out)
    }

    async fn fetch_confirmed_reservations(&self, range: &DateRange) -> Result<Vec<Reservation>, DataFetchError> {
        let mut out: Vec<Reservation> = self
            .reservations
            .iter()
            .filter(|e| e.value().status == ReservationStatus::Confirmed && range.contains(e.value().date))
            .map(|e| e.value().clone())
            .collect();
        out.sort_by_key(|r| (r.date, r.span.start, r.id));
        Ok(out)
    }

    async fn fetch_product_sales(&self, range: &DateRange) -> Result<Vec<ProductSale>, DataFetchError> {
        let mut out: Vec<ProductSale> = self
            .sales
            .iter()
            .filter(|e| range.contains(e.value().date))
            .map(|e| e.value().clone())
            .collect();
        out.sort_by_key(|s| (s.date, s.id));
        Ok(out)
    }

    async fn fetch_operating_hours(&self, day: DayOfWeek) -> Result<Option<OperatingHours>, DataFetchError> {
        Ok(self.hours.get(&day).map(|e| *e.value()))
    }
}

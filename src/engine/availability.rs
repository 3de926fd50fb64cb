use chrono::NaiveDate;
use tracing::warn;

use crate::model::*;
use crate::store::{CourtStore, RecurringFilter, ReservationFilter};

use super::EngineError;

/// Collects everything that claims court time on a date.
///
/// Reservations and fixed clients are returned side by side rather than
/// merged: the planner decides how each source is shown.
pub struct AvailabilityResolver<'a> {
    store: &'a dyn CourtStore,
}

impl<'a> AvailabilityResolver<'a> {
    pub fn new(store: &'a dyn CourtStore) -> Self {
        Self { store }
    }

    /// Non-cancelled reservations on `date` plus active fixed clients on its
    /// weekday. A point-in-time snapshot: nothing is locked.
    pub async fn occupied_slots(&self, date: NaiveDate) -> Result<Occupancy, EngineError> {
        let day = DayOfWeek::of(date);
        let reservation_filter = ReservationFilter::occupying(date);
        let recurring_filter = RecurringFilter::active_on(day);

        let (mut reservations, mut recurring) = tokio::try_join!(
            self.store.fetch_reservations(&reservation_filter),
            self.store.fetch_recurring_bookings(&recurring_filter),
        )?;

        // The store is trusted for transport only; re-check the filter here.
        let fetched = reservations.len();
        reservations.retain(|r| reservation_filter.matches(r));
        if reservations.len() != fetched {
            warn!(
                "dropped {} reservations outside filter for {date}",
                fetched - reservations.len()
            );
        }
        let fetched = recurring.len();
        recurring.retain(|b| recurring_filter.matches(b));
        if recurring.len() != fetched {
            warn!(
                "dropped {} fixed clients not active on day {}",
                fetched - recurring.len(),
                day.number()
            );
        }

        Ok(Occupancy { reservations, recurring })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use ulid::Ulid;

    use crate::store::DataFetchError;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn span(start: Hour, end: Hour) -> HourSpan {
        HourSpan::new(start, end).unwrap()
    }

    #[tokio::test]
    async fn excludes_cancelled_and_other_dates() {
        let store = MemoryStore::new();
        let keep = Reservation::new(Ulid::new(), date("2025-03-01"), span(8, 9), 40_000).unwrap();
        let keep_id = keep.id;
        store.create_reservation(keep).await.unwrap();
        store
            .create_reservation(
                Reservation::new(Ulid::new(), date("2025-03-01"), span(8, 9), 40_000)
                    .unwrap()
                    .with_status(ReservationStatus::Cancelled),
            )
            .await
            .unwrap();
        store
            .create_reservation(Reservation::new(Ulid::new(), date("2025-03-02"), span(8, 9), 40_000).unwrap())
            .await
            .unwrap();

        let occupancy = AvailabilityResolver::new(&store)
            .occupied_slots(date("2025-03-01"))
            .await
            .unwrap();
        assert_eq!(occupancy.reservations.len(), 1);
        assert_eq!(occupancy.reservations[0].id, keep_id);
        assert!(occupancy.recurring.is_empty());
    }

    #[tokio::test]
    async fn only_active_fixed_clients_on_that_weekday() {
        let store = MemoryStore::new();
        let monday = RecurringBooking::new(Ulid::new(), DayOfWeek::MONDAY, span(17, 18))
            .with_status(RecurringStatus::Active);
        let monday_id = monday.id;
        store.create_recurring(monday).await.unwrap();
        store
            .create_recurring(RecurringBooking::new(Ulid::new(), DayOfWeek::MONDAY, span(19, 20)))
            .await
            .unwrap();
        store
            .create_recurring(
                RecurringBooking::new(Ulid::new(), DayOfWeek::new(2).unwrap(), span(17, 18))
                    .with_status(RecurringStatus::Active),
            )
            .await
            .unwrap();

        let occupancy = AvailabilityResolver::new(&store)
            .occupied_slots(date("2025-03-03"))
            .await
            .unwrap();
        assert_eq!(occupancy.recurring.len(), 1);
        assert_eq!(occupancy.recurring[0].id, monday_id);
    }

    /// Ignores every filter, as a misbehaving remote store might.
    struct UnfilteredStore {
        reservations: Vec<Reservation>,
        recurring: Vec<RecurringBooking>,
    }

    #[async_trait]
    impl CourtStore for UnfilteredStore {
        async fn fetch_reservations(&self, _: &ReservationFilter) -> Result<Vec<Reservation>, DataFetchError> {
            Ok(self.reservations.clone())
        }
        async fn fetch_recurring_bookings(&self, _: &RecurringFilter) -> Result<Vec<RecurringBooking>, DataFetchError> {
            Ok(self.recurring.clone())
        }
        async fn fetch_active_time_bands(&self) -> Result<Vec<TimeBand>, DataFetchError> {
            Ok(vec![])
        }
        async fn fetch_confirmed_reservations(&self, _: &DateRange) -> Result<Vec<Reservation>, DataFetchError> {
            Ok(vec![])
        }
        async fn fetch_product_sales(&self, _: &DateRange) -> Result<Vec<ProductSale>, DataFetchError> {
            Ok(vec![])
        }
    }

    #[test]
    fn out_of_filter_records_dropped() {
        let store = UnfilteredStore {
            reservations: vec![
                Reservation::new(Ulid::new(), date("2025-03-01"), span(8, 9), 1).unwrap(),
                Reservation::new(Ulid::new(), date("2025-03-01"), span(9, 10), 1)
                    .unwrap()
                    .with_status(ReservationStatus::Cancelled),
                Reservation::new(Ulid::new(), date("2025-03-08"), span(8, 9), 1).unwrap(),
            ],
            recurring: vec![
                RecurringBooking::new(Ulid::new(), DayOfWeek::SATURDAY, span(10, 11))
                    .with_status(RecurringStatus::Active),
                RecurringBooking::new(Ulid::new(), DayOfWeek::SATURDAY, span(12, 13)),
                RecurringBooking::new(Ulid::new(), DayOfWeek::SUNDAY, span(10, 11))
                    .with_status(RecurringStatus::Active),
            ],
        };
        let occupancy = tokio_test::block_on(
            AvailabilityResolver::new(&store).occupied_slots(date("2025-03-01")),
        )
        .unwrap();
        assert_eq!(occupancy.reservations.len(), 1);
        assert_eq!(occupancy.recurring.len(), 1);
        assert_eq!(occupancy.recurring[0].span, span(10, 11));
    }
}

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use ulid::Ulid;

use super::*;
use crate::model::*;
use crate::store::{CourtStore, DataFetchError, MemoryStore, RecurringFilter, ReservationFilter};

fn date(s: &str) -> NaiveDate {
    parse_date(s).unwrap()
}

fn span(start: Hour, end: Hour) -> HourSpan {
    HourSpan::new(start, end).unwrap()
}

fn band(start: Hour, end: Hour, weekday: Amount, friday: Amount, weekend: Amount) -> TimeBand {
    TimeBand::new(
        Ulid::new(),
        span(start, end),
        BandPrices { weekday, friday, weekend_holiday: weekend },
        format!("{start:02}-{end:02}"),
        true,
    )
    .unwrap()
}

async fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.upsert_time_band(band(8, 12, 30_000, 30_000, 40_000)).await.unwrap();
    store.upsert_time_band(band(12, 18, 50_000, 55_000, 60_000)).await.unwrap();
    store.upsert_time_band(band(18, 23, 80_000, 90_000, 100_000)).await.unwrap();
    store
}

// ── Store that fails on demand ───────────────────────────

#[derive(Default)]
struct FailingStore {
    fail_reservations: bool,
    fail_recurring: bool,
    fail_bands: bool,
    fail_sales: bool,
    calls: AtomicUsize,
}

impl FailingStore {
    fn down(msg: &str) -> DataFetchError {
        DataFetchError::Unavailable(msg.to_string())
    }
}

#[async_trait]
impl CourtStore for FailingStore {
    async fn fetch_reservations(&self, _: &ReservationFilter) -> Result<Vec<Reservation>, DataFetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reservations {
            return Err(Self::down("reservations"));
        }
        Ok(vec![])
    }

    async fn fetch_recurring_bookings(&self, _: &RecurringFilter) -> Result<Vec<RecurringBooking>, DataFetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_recurring {
            return Err(Self::down("recurring"));
        }
        Ok(vec![])
    }

    async fn fetch_active_time_bands(&self) -> Result<Vec<TimeBand>, DataFetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_bands {
            return Err(Self::down("bands"));
        }
        Ok(vec![])
    }

    async fn fetch_confirmed_reservations(&self, _: &DateRange) -> Result<Vec<Reservation>, DataFetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reservations {
            return Err(Self::down("reservations"));
        }
        Ok(vec![])
    }

    async fn fetch_product_sales(&self, _: &DateRange) -> Result<Vec<ProductSale>, DataFetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_sales {
            return Err(Self::down("sales"));
        }
        Ok(vec![])
    }
}

#[tokio::test]
async fn fetch_error_propagates_unchanged() {
    let store = FailingStore { fail_recurring: true, ..Default::default() };
    let err = AvailabilityResolver::new(&store)
        .occupied_slots(date("2025-03-01"))
        .await
        .unwrap_err();
    match err {
        EngineError::Fetch(e) => assert_eq!(e, DataFetchError::Unavailable("recurring".into())),
        other => panic!("expected Fetch, got {other:?}"),
    }
}

#[tokio::test]
async fn plan_day_fails_when_prices_unavailable() {
    let store = FailingStore { fail_bands: true, ..Default::default() };
    let err = plan_day(&store, date("2025-03-01"), OperatingHours::DEFAULT)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Fetch(DataFetchError::Unavailable(_))));
}

#[tokio::test]
async fn month_total_fails_when_shop_unavailable() {
    let store = FailingStore { fail_sales: true, ..Default::default() };
    let err = FinanceAggregator::new(&store)
        .month_total(date("2025-03-15"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Fetch(_)));
}

#[tokio::test]
async fn no_retries_on_failure() {
    let store = FailingStore { fail_reservations: true, ..Default::default() };
    let _ = FinanceAggregator::new(&store).revenue_by_date(date("2025-03-01")).await;
    assert_eq!(store.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn plan_day_end_to_end() {
    let store = seeded_store().await;
    let saturday = date("2025-03-01");
    let booked = Reservation::new(Ulid::new(), saturday, span(8, 9), 40_000)
        .unwrap()
        .with_status(ReservationStatus::Confirmed);
    store.create_reservation(booked).await.unwrap();
    store
        .create_recurring(
            RecurringBooking::new(Ulid::new(), DayOfWeek::SATURDAY, span(19, 21))
                .with_status(RecurringStatus::Active),
        )
        .await
        .unwrap();

    let grid = plan_day(&store, saturday, OperatingHours::DEFAULT).await.unwrap();
    assert_eq!(grid.len(), OperatingHours::DEFAULT.slot_count());

    let slot = |h: Hour| grid.iter().find(|s| s.hour == h).unwrap().clone();
    assert_eq!(slot(9).price, 40_000);
    assert_eq!(slot(9).tier, Tier::Low);
    assert!(slot(8).is_occupied());
    assert!(!slot(9).is_occupied());
    assert_eq!(slot(13).price, 60_000);
    assert_eq!(slot(19).occupied_by.map(|o| o.source()), Some("fixed_client"));
    assert_eq!(slot(20).occupied_by.map(|o| o.source()), Some("fixed_client"));
    assert_eq!(slot(22).price, 100_000);
    assert_eq!(slot(22).tier, Tier::High);
    assert!(!slot(21).is_occupied());
}

#[tokio::test]
async fn plan_day_uses_per_day_hours() {
    let store = seeded_store().await;
    store.set_operating_hours(DayOfWeek::SUNDAY, OperatingHours::new(8, 14).unwrap());

    let sunday = plan_day(&store, date("2025-03-02"), OperatingHours::DEFAULT).await.unwrap();
    assert_eq!(sunday.first().map(|s| s.hour), Some(8));
    assert_eq!(sunday.last().map(|s| s.hour), Some(13));

    let monday = plan_day(&store, date("2025-03-03"), OperatingHours::DEFAULT).await.unwrap();
    assert_eq!(monday.len(), 16);
}

#[tokio::test]
async fn cancellation_reopens_slots() {
    let store = seeded_store().await;
    let day = date("2025-03-05");
    let r = Reservation::new(Ulid::new(), day, span(18, 20), 160_000).unwrap();
    let id = r.id;
    store.create_reservation(r).await.unwrap();

    let before = plan_day(&store, day, OperatingHours::DEFAULT).await.unwrap();
    assert_eq!(before.iter().filter(|s| s.is_occupied()).count(), 2);

    store.set_reservation_status(id, ReservationStatus::Cancelled).await.unwrap();
    let after = plan_day(&store, day, OperatingHours::DEFAULT).await.unwrap();
    assert!(after.iter().all(|s| !s.is_occupied()));
}

#[tokio::test]
async fn conflict_from_late_fixed_client_surfaces_in_grid() {
    let store = seeded_store().await;
    let monday = date("2025-03-03");
    store
        .create_reservation(Reservation::new(Ulid::new(), monday, span(17, 18), 55_000).unwrap())
        .await
        .unwrap();
    // Activation only checks other fixed clients, so the reservation already
    // on that Monday ends up double-claimed.
    let request = RecurringBooking::new(Ulid::new(), DayOfWeek::MONDAY, span(17, 18));
    let request_id = request.id;
    store.create_recurring(request).await.unwrap();
    store
        .set_recurring_status(request_id, RecurringStatus::Active)
        .await
        .unwrap();

    let err = plan_day(&store, monday, OperatingHours::DEFAULT).await.unwrap_err();
    match err {
        EngineError::InvariantViolation(conflicts) => {
            assert_eq!(conflicts.len(), 1);
            assert_eq!(conflicts[0].hour, 17);
            assert!(conflicts[0].claims.iter().any(|c| c.id() == request_id));
        }
        other => panic!("expected InvariantViolation, got {other:?}"),
    }
}

#[tokio::test]
async fn concurrent_bookings_for_same_hour_admit_one() {
    let store = Arc::new(seeded_store().await);
    let day = date("2025-03-06");
    let mut handles = Vec::new();
    for _ in 0..16 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let r = Reservation::new(Ulid::new(), day, span(20, 21), 80_000).unwrap();
            store.create_reservation(r).await.is_ok()
        }));
    }
    let mut admitted = 0;
    for h in handles {
        if h.await.unwrap() {
            admitted += 1;
        }
    }
    assert_eq!(admitted, 1);

    let grid = plan_day(store.as_ref(), day, OperatingHours::DEFAULT).await.unwrap();
    assert_eq!(grid.iter().filter(|s| s.is_occupied()).count(), 1);
}

#[tokio::test]
async fn quote_matches_grid_prices() {
    let store = seeded_store().await;
    let friday = date("2025-02-28");
    let prices = PriceTable::load(&store).await.unwrap();
    let grid = plan_day(&store, friday, OperatingHours::DEFAULT).await.unwrap();

    let booking = span(16, 19);
    let from_grid: Amount = grid
        .iter()
        .filter(|s| booking.contains_hour(s.hour))
        .map(|s| s.price)
        .sum();
    assert_eq!(quote(&prices, friday, booking).unwrap(), from_grid);
    assert_eq!(from_grid, 55_000 + 55_000 + 90_000);
}

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};

use crate::limits::MAX_REVENUE_WINDOW_DAYS;
use crate::model::*;
use crate::store::{CourtStore, ReservationFilter};

use super::EngineError;

/// Read-side revenue reporting. Only confirmed reservations count.
pub struct FinanceAggregator<'a> {
    store: &'a dyn CourtStore,
}

impl<'a> FinanceAggregator<'a> {
    pub fn new(store: &'a dyn CourtStore) -> Self {
        Self { store }
    }

    /// Confirmed court revenue per date, for every date on or after `since`.
    pub async fn revenue_by_date(&self, since: NaiveDate) -> Result<BTreeMap<NaiveDate, Amount>, EngineError> {
        let confirmed = self
            .store
            .fetch_confirmed_reservations(&DateRange::since(since))
            .await?;
        let mut by_date = BTreeMap::new();
        for r in confirmed
            .iter()
            .filter(|r| r.status == ReservationStatus::Confirmed && r.date >= since)
        {
            let day_total: &mut Amount = by_date.entry(r.date).or_insert(0);
            *day_total = day_total.checked_add(r.price).ok_or(ModelError::AmountOverflow)?;
        }
        Ok(by_date)
    }

    /// Revenue for the `days` days ending with `today`.
    pub async fn revenue_last_days(
        &self,
        today: NaiveDate,
        days: u32,
    ) -> Result<BTreeMap<NaiveDate, Amount>, EngineError> {
        let days = days.clamp(1, MAX_REVENUE_WINDOW_DAYS);
        let since = today
            .checked_sub_days(Days::new(u64::from(days - 1)))
            .unwrap_or(NaiveDate::MIN);
        self.revenue_by_date(since).await
    }

    /// Court and shop totals from the first of the month through `reference`.
    pub async fn month_total(&self, reference: NaiveDate) -> Result<MonthTotal, EngineError> {
        let range = DateRange::between(first_of_month(reference), reference);
        let (reservations, sales) = tokio::try_join!(
            self.store.fetch_confirmed_reservations(&range),
            self.store.fetch_product_sales(&range),
        )?;

        let court_revenue = sum_amounts(
            reservations
                .iter()
                .filter(|r| r.status == ReservationStatus::Confirmed && range.contains(r.date))
                .map(|r| r.price),
        )?;
        let shop_revenue = sum_amounts(sales.iter().filter(|s| range.contains(s.date)).map(|s| s.total))?;

        Ok(MonthTotal {
            court_revenue,
            shop_revenue,
            total: sum_amounts([court_revenue, shop_revenue])?,
        })
    }

    /// Counts and confirmed revenue for one date.
    pub async fn day_summary(&self, date: NaiveDate) -> Result<DaySummary, EngineError> {
        let reservations = self
            .store
            .fetch_reservations(&ReservationFilter::occupying(date))
            .await?;

        let mut summary = DaySummary::default();
        for r in reservations.iter().filter(|r| r.date == date) {
            match r.status {
                ReservationStatus::Pending => summary.pending += 1,
                ReservationStatus::Confirmed => {
                    summary.confirmed += 1;
                    summary.revenue = summary
                        .revenue
                        .checked_add(r.price)
                        .ok_or(ModelError::AmountOverflow)?;
                }
                ReservationStatus::Cancelled => continue,
            }
            summary.occupied_hours += u32::from(r.span.hour_count());
        }
        Ok(summary)
    }
}

use chrono::NaiveDate;
use tracing::warn;

use crate::model::*;
use crate::store::CourtStore;

use super::availability::AvailabilityResolver;
use super::conflict::claims_at;
use super::pricing::PriceTable;
use super::EngineError;

/// One slot per whole hour of `hours`, ascending, each with its price and
/// holder. Pure: the same inputs always give the same grid.
///
/// An hour claimed twice fails the whole grid with
/// [`EngineError::InvariantViolation`] listing every such hour.
pub fn build_grid(
    date: NaiveDate,
    hours: OperatingHours,
    prices: &PriceTable,
    occupancy: &Occupancy,
) -> Result<Vec<Slot>, EngineError> {
    let day = DayOfWeek::of(date);
    let mut slots = Vec::with_capacity(hours.slot_count());
    let mut conflicts = Vec::new();

    for hour in hours.hours() {
        let mut claims = claims_at(occupancy, hour);
        if claims.len() > 1 {
            conflicts.push(OccupancyConflict { date, hour, claims });
            continue;
        }
        let quote = prices.price_for(hour, day);
        slots.push(Slot {
            date,
            hour,
            price: quote.price,
            tier: quote.tier,
            label: quote.label,
            occupied_by: claims.pop(),
        });
    }

    if !conflicts.is_empty() {
        warn!("{date}: {} hours claimed more than once", conflicts.len());
        metrics::counter!(crate::observability::OCCUPANCY_CONFLICTS_TOTAL).increment(conflicts.len() as u64);
        return Err(EngineError::InvariantViolation(conflicts));
    }
    Ok(slots)
}

/// Opening hours for `day`: the store's override, else `default`.
pub async fn operating_hours_for(
    store: &dyn CourtStore,
    day: DayOfWeek,
    default: OperatingHours,
) -> Result<OperatingHours, EngineError> {
    Ok(store.fetch_operating_hours(day).await?.unwrap_or(default))
}

/// Load prices, occupancy and opening hours for `date` concurrently and
/// build its grid.
pub async fn plan_day(
    store: &dyn CourtStore,
    date: NaiveDate,
    default_hours: OperatingHours,
) -> Result<Vec<Slot>, EngineError> {
    let resolver = AvailabilityResolver::new(store);
    let (prices, occupancy, hours) = tokio::try_join!(
        PriceTable::load(store),
        resolver.occupied_slots(date),
        operating_hours_for(store, DayOfWeek::of(date), default_hours),
    )?;
    build_grid(date, hours, &prices, &occupancy)
}

/// Price of booking `span` on `date`: the sum of its hourly prices.
/// Hours without a band contribute nothing.
pub fn quote(prices: &PriceTable, date: NaiveDate, span: HourSpan) -> Result<Amount, EngineError> {
    let day = DayOfWeek::of(date);
    Ok(sum_amounts(span.hours().map(|hour| prices.price_for(hour, day).price))?)
}

use crate::model::*;
use crate::store::CourtStore;

use super::EngineError;

/// Active price bands, sorted by start hour and pairwise disjoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceTable {
    bands: Vec<TimeBand>,
}

impl PriceTable {
    /// Build from any list of bands. Inactive bands are dropped; overlapping
    /// active bands are rejected because a lookup would be ambiguous.
    pub fn new(bands: Vec<TimeBand>) -> Result<Self, EngineError> {
        let mut bands: Vec<TimeBand> = bands.into_iter().filter(|b| b.active).collect();
        bands.sort_by_key(|b| b.span.start);
        for pair in bands.windows(2) {
            if pair[0].span.overlaps(&pair[1].span) {
                return Err(EngineError::OverlappingBands {
                    first: pair[0].id,
                    second: pair[1].id,
                });
            }
        }
        Ok(Self { bands })
    }

    pub async fn load(store: &dyn CourtStore) -> Result<Self, EngineError> {
        let bands = store.fetch_active_time_bands().await?;
        Self::new(bands)
    }

    pub fn bands(&self) -> &[TimeBand] {
        &self.bands
    }

    /// Band covering `hour`, if any.
    pub fn band_at(&self, hour: Hour) -> Option<&TimeBand> {
        // bands are disjoint and sorted, so only the last band starting at or
        // before `hour` can contain it
        let idx = self.bands.partition_point(|b| b.span.start <= hour);
        let candidate = self.bands[..idx].last()?;
        candidate.span.contains_hour(hour).then_some(candidate)
    }

    /// Total over its domain: a gap between bands yields [`PriceQuote::unknown`].
    pub fn price_for(&self, hour: Hour, day: DayOfWeek) -> PriceQuote {
        match self.band_at(hour) {
            Some(band) => PriceQuote {
                price: band.prices.for_day(day.kind()),
                tier: band.tier(),
                label: band.label.clone(),
            },
            None => PriceQuote::unknown(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ulid::Ulid;

    fn band(start: Hour, end: Hour, weekday: Amount, friday: Amount, weekend: Amount) -> TimeBand {
        TimeBand::new(
            Ulid::new(),
            HourSpan::new(start, end).unwrap(),
            BandPrices { weekday, friday, weekend_holiday: weekend },
            format!("{start:02}-{end:02}"),
            true,
        )
        .unwrap()
    }

    fn day(n: u8) -> DayOfWeek {
        DayOfWeek::new(n).unwrap()
    }

    fn standard_table() -> PriceTable {
        PriceTable::new(vec![
            band(18, 23, 80_000, 90_000, 100_000),
            band(8, 12, 30_000, 35_000, 40_000),
            band(12, 18, 50_000, 55_000, 60_000),
        ])
        .unwrap()
    }

    #[test]
    fn bands_sorted_by_start() {
        let table = standard_table();
        let starts: Vec<Hour> = table.bands().iter().map(|b| b.span.start).collect();
        assert_eq!(starts, vec![8, 12, 18]);
    }

    #[test]
    fn saturday_morning_weekend_price() {
        let table = PriceTable::new(vec![band(8, 12, 30_000, 30_000, 40_000)]).unwrap();
        let quote = table.price_for(9, DayOfWeek::SATURDAY);
        assert_eq!(quote.price, 40_000);
        assert_eq!(quote.tier, Tier::Low);
        assert_eq!(quote.label, "08-12");
    }

    #[test]
    fn day_classification() {
        let table = standard_table();
        for n in 1..=4 {
            assert_eq!(table.price_for(13, day(n)).price, 50_000);
        }
        assert_eq!(table.price_for(13, DayOfWeek::FRIDAY).price, 55_000);
        assert_eq!(table.price_for(13, DayOfWeek::SATURDAY).price, 60_000);
        assert_eq!(table.price_for(13, DayOfWeek::SUNDAY).price, 60_000);
    }

    #[test]
    fn tier_follows_band_start_not_hour() {
        let table = PriceTable::new(vec![band(10, 20, 1, 1, 1)]).unwrap();
        // 19:00 is late, but the band starts at 10
        assert_eq!(table.price_for(19, DayOfWeek::MONDAY).tier, Tier::Low);

        let table = standard_table();
        assert_eq!(table.price_for(12, DayOfWeek::MONDAY).tier, Tier::Mid);
        assert_eq!(table.price_for(22, DayOfWeek::MONDAY).tier, Tier::High);
    }

    #[test]
    fn band_boundaries_half_open() {
        let table = standard_table();
        assert_eq!(table.price_for(11, DayOfWeek::MONDAY).price, 30_000);
        assert_eq!(table.price_for(12, DayOfWeek::MONDAY).price, 50_000);
        assert_eq!(table.price_for(17, DayOfWeek::MONDAY).price, 50_000);
        assert_eq!(table.price_for(18, DayOfWeek::MONDAY).price, 80_000);
    }

    #[test]
    fn hours_outside_every_band_are_unknown() {
        let table = standard_table();
        for hour in (0..8).chain(23..30) {
            for n in 0..=6 {
                let quote = table.price_for(hour, day(n));
                assert_eq!(quote.price, 0, "hour {hour}");
                assert_eq!(quote.tier, Tier::Mid);
                assert_eq!(quote.label, PriceQuote::UNKNOWN_LABEL);
            }
        }
    }

    #[test]
    fn gap_between_bands_is_unknown() {
        let table = PriceTable::new(vec![band(8, 10, 1, 1, 1), band(14, 16, 2, 2, 2)]).unwrap();
        assert!(table.price_for(12, DayOfWeek::MONDAY).is_unknown());
        assert_eq!(table.price_for(15, DayOfWeek::MONDAY).price, 2);
    }

    #[test]
    fn empty_table_is_unknown_everywhere() {
        let table = PriceTable::default();
        assert!(table.price_for(9, DayOfWeek::MONDAY).is_unknown());
    }

    #[test]
    fn inactive_bands_ignored() {
        let mut off = band(8, 12, 1, 1, 1);
        off.active = false;
        let table = PriceTable::new(vec![off, band(10, 14, 5, 5, 5)]).unwrap();
        assert_eq!(table.bands().len(), 1);
        assert_eq!(table.price_for(9, DayOfWeek::MONDAY).price, 0);
        assert_eq!(table.price_for(10, DayOfWeek::MONDAY).price, 5);
    }

    #[test]
    fn overlapping_active_bands_rejected() {
        let result = PriceTable::new(vec![band(8, 12, 1, 1, 1), band(11, 14, 2, 2, 2)]);
        assert!(matches!(result, Err(EngineError::OverlappingBands { .. })));
    }
}

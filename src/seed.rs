//! Initial venue contents read from a JSON file.
//!
//! ```json
//! {
//!   "time_bands": [
//!     { "start_hour": 8, "end_hour": 12, "price_weekday": 30000,
//!       "price_friday": 30000, "price_weekend": 40000, "label": "mañana" }
//!   ],
//!   "operating_hours": [ { "day_of_week": 0, "open_hour": 8, "close_hour": 14 } ],
//!   "fixed_clients": [
//!     { "day_of_week": 1, "start_hour": 17, "end_hour": 18, "client_name": "Club Norte" }
//!   ]
//! }
//! ```
//!
//! Every venue created after startup gets its own copy with fresh ids.

use std::path::Path;

use serde::Deserialize;
use tracing::info;
use ulid::Ulid;

use crate::model::*;
use crate::store::{MemoryStore, StoreError};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VenueSeed {
    pub time_bands: Vec<BandSeed>,
    pub operating_hours: Vec<HoursSeed>,
    pub fixed_clients: Vec<FixedClientSeed>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BandSeed {
    pub start_hour: Hour,
    pub end_hour: Hour,
    pub price_weekday: Amount,
    pub price_friday: Amount,
    pub price_weekend: Amount,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HoursSeed {
    pub day_of_week: DayOfWeek,
    pub open_hour: Hour,
    pub close_hour: Hour,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixedClientSeed {
    pub day_of_week: DayOfWeek,
    pub start_hour: Hour,
    pub end_hour: Hour,
    #[serde(default = "default_active")]
    pub status: RecurringStatus,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub client_phone: Option<String>,
    #[serde(default)]
    pub party_size: Option<u32>,
}

fn default_true() -> bool {
    true
}

fn default_active() -> RecurringStatus {
    RecurringStatus::Active
}

impl VenueSeed {
    pub fn load(path: &Path) -> Result<Self, SeedError> {
        let text = std::fs::read_to_string(path).map_err(SeedError::Io)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, SeedError> {
        serde_json::from_str(text).map_err(SeedError::Json)
    }

    /// Write the seed into `store`, validating every record on the way.
    pub async fn apply(&self, store: &MemoryStore) -> Result<(), SeedError> {
        for b in &self.time_bands {
            let span = HourSpan::new(b.start_hour, b.end_hour)?;
            let prices = BandPrices {
                weekday: b.price_weekday,
                friday: b.price_friday,
                weekend_holiday: b.price_weekend,
            };
            let label = b.label.clone().unwrap_or_else(|| span.to_string());
            let band = TimeBand::new(Ulid::new(), span, prices, label, b.active)?;
            store.upsert_time_band(band).await?;
        }

        for h in &self.operating_hours {
            store.set_operating_hours(h.day_of_week, OperatingHours::new(h.open_hour, h.close_hour)?);
        }

        for c in &self.fixed_clients {
            let booking = RecurringBooking::new(Ulid::new(), c.day_of_week, HourSpan::new(c.start_hour, c.end_hour)?)
                .with_status(c.status)
                .with_client(c.client_name.clone(), c.client_phone.clone(), c.party_size);
            store.create_recurring(booking).await?;
        }

        info!(
            "seeded venue: {} bands, {} hour overrides, {} fixed clients",
            self.time_bands.len(),
            self.operating_hours.len(),
            self.fixed_clients.len()
        );
        Ok(())
    }
}

#[derive(Debug)]
pub enum SeedError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Model(ModelError),
    Store(StoreError),
}

impl From<ModelError> for SeedError {
    fn from(e: ModelError) -> Self {
        SeedError::Model(e)
    }
}

impl From<StoreError> for SeedError {
    fn from(e: StoreError) -> Self {
        SeedError::Store(e)
    }
}

impl std::fmt::Display for SeedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeedError::Io(e) => write!(f, "cannot read seed file: {e}"),
            SeedError::Json(e) => write!(f, "malformed seed file: {e}"),
            SeedError::Model(e) => write!(f, "invalid seed record: {e}"),
            SeedError::Store(e) => write!(f, "seed rejected by store: {e}"),
        }
    }
}

impl std::error::Error for SeedError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CourtStore;

    const SEED: &str = r#"{
        "time_bands": [
            { "start_hour": 8, "end_hour": 12, "price_weekday": 30000,
              "price_friday": 30000, "price_weekend": 40000, "label": "mañana" },
            { "start_hour": 18, "end_hour": 23, "price_weekday": 80000,
              "price_friday": 90000, "price_weekend": 100000 }
        ],
        "operating_hours": [ { "day_of_week": 0, "open_hour": 8, "close_hour": 14 } ],
        "fixed_clients": [
            { "day_of_week": 1, "start_hour": 17, "end_hour": 18, "client_name": "Club Norte" },
            { "day_of_week": 3, "start_hour": 20, "end_hour": 22, "status": "requested" }
        ]
    }"#;

    #[tokio::test]
    async fn seed_populates_store() {
        let seed = VenueSeed::from_json(SEED).unwrap();
        let store = MemoryStore::new();
        seed.apply(&store).await.unwrap();

        let bands = store.fetch_active_time_bands().await.unwrap();
        assert_eq!(bands.len(), 2);
        assert_eq!(bands[0].label, "mañana");
        assert_eq!(bands[1].label, "18:00-23:00");

        assert_eq!(
            store.fetch_operating_hours(DayOfWeek::SUNDAY).await.unwrap(),
            Some(OperatingHours::new(8, 14).unwrap())
        );

        let monday = store
            .fetch_recurring_bookings(&crate::store::RecurringFilter::active_on(DayOfWeek::MONDAY))
            .await
            .unwrap();
        assert_eq!(monday.len(), 1);
        assert_eq!(monday[0].client_name.as_deref(), Some("Club Norte"));

        let all = store
            .fetch_recurring_bookings(&crate::store::RecurringFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn empty_object_is_empty_seed() {
        let seed = VenueSeed::from_json("{}").unwrap();
        assert!(seed.time_bands.is_empty());
        assert!(seed.fixed_clients.is_empty());
    }

    #[test]
    fn malformed_json_rejected() {
        assert!(matches!(VenueSeed::from_json("{ nope"), Err(SeedError::Json(_))));
        // day_of_week goes through DayOfWeek's validation
        let bad_day = r#"{ "operating_hours": [ { "day_of_week": 9, "open_hour": 8, "close_hour": 14 } ] }"#;
        assert!(matches!(VenueSeed::from_json(bad_day), Err(SeedError::Json(_))));
    }

    #[tokio::test]
    async fn invalid_band_rejected_on_apply() {
        let seed = VenueSeed::from_json(
            r#"{ "time_bands": [ { "start_hour": 12, "end_hour": 8, "price_weekday": 1,
                 "price_friday": 1, "price_weekend": 1 } ] }"#,
        )
        .unwrap();
        let err = seed.apply(&MemoryStore::new()).await.unwrap_err();
        assert!(matches!(err, SeedError::Model(ModelError::InvalidHourSpan { .. })));
    }

    #[tokio::test]
    async fn overlapping_bands_rejected_on_apply() {
        let seed = VenueSeed::from_json(
            r#"{ "time_bands": [
                 { "start_hour": 8, "end_hour": 12, "price_weekday": 1, "price_friday": 1, "price_weekend": 1 },
                 { "start_hour": 11, "end_hour": 14, "price_weekday": 1, "price_friday": 1, "price_weekend": 1 } ] }"#,
        )
        .unwrap();
        let err = seed.apply(&MemoryStore::new()).await.unwrap_err();
        assert!(matches!(err, SeedError::Store(StoreError::OverlappingBands { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = VenueSeed::load(Path::new("/nonexistent/cancha-seed.json")).unwrap_err();
        assert!(matches!(err, SeedError::Io(_)));
    }
}

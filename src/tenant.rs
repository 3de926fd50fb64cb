use std::sync::Arc;

use dashmap::DashMap;
use tracing::info;

use crate::limits::*;
use crate::model::OperatingHours;
use crate::seed::{SeedError, VenueSeed};
use crate::store::MemoryStore;

/// One court's data plus the opening hours used when a weekday has no
/// override of its own.
pub struct Venue {
    pub name: String,
    pub store: MemoryStore,
    pub default_hours: OperatingHours,
}

/// Manages per-venue stores. Venue = database name from the pgwire connection.
pub struct VenueManager {
    venues: DashMap<String, Arc<Venue>>,
    default_hours: OperatingHours,
    seed: Option<VenueSeed>,
}

impl VenueManager {
    pub fn new(default_hours: OperatingHours, seed: Option<VenueSeed>) -> Self {
        Self {
            venues: DashMap::new(),
            default_hours,
            seed,
        }
    }

    pub fn venue_count(&self) -> usize {
        self.venues.len()
    }

    /// Get or lazily create the venue for `name`, seeding new ones.
    pub async fn get_or_create(&self, name: &str) -> Result<Arc<Venue>, VenueError> {
        if let Some(venue) = self.venues.get(name) {
            return Ok(venue.value().clone());
        }
        if name.len() > MAX_VENUE_NAME_LEN {
            return Err(VenueError::NameTooLong);
        }

        let safe_name: String = name
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
            .collect();
        if safe_name.is_empty() {
            return Err(VenueError::EmptyName);
        }
        if let Some(venue) = self.venues.get(&safe_name) {
            return Ok(venue.value().clone());
        }
        if self.venues.len() >= MAX_VENUES {
            return Err(VenueError::TooManyVenues);
        }

        let store = MemoryStore::new();
        if let Some(seed) = &self.seed {
            seed.apply(&store).await.map_err(VenueError::Seed)?;
        }
        let fresh = Arc::new(Venue {
            name: safe_name.clone(),
            store,
            default_hours: self.default_hours,
        });

        // A concurrent caller may have won the race; keep whichever landed first.
        let venue = self.venues.entry(safe_name).or_insert(fresh).value().clone();
        metrics::gauge!(crate::observability::VENUES_ACTIVE).set(self.venues.len() as f64);
        info!("venue ready: {}", venue.name);
        Ok(venue)
    }
}

#[derive(Debug)]
pub enum VenueError {
    NameTooLong,
    EmptyName,
    TooManyVenues,
    Seed(SeedError),
}

impl std::fmt::Display for VenueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VenueError::NameTooLong => write!(f, "venue name too long"),
            VenueError::EmptyName => write!(f, "empty venue name"),
            VenueError::TooManyVenues => write!(f, "too many venues"),
            VenueError::Seed(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for VenueError {}

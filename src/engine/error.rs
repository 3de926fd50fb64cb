use ulid::Ulid;

use crate::model::{ModelError, OccupancyConflict};
use crate::store::DataFetchError;

#[derive(Debug)]
pub enum EngineError {
    /// Collaborator read failed; passed through unchanged.
    Fetch(DataFetchError),
    /// Two or more claims on the same hour. Never resolved locally.
    InvariantViolation(Vec<OccupancyConflict>),
    OverlappingBands { first: Ulid, second: Ulid },
    Model(ModelError),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Fetch(e) => write!(f, "{e}"),
            EngineError::InvariantViolation(conflicts) => {
                write!(f, "overlapping occupancy claims:")?;
                for c in conflicts {
                    let ids: Vec<String> = c
                        .claims
                        .iter()
                        .map(|o| format!("{} {}", o.source(), o.id()))
                        .collect();
                    write!(f, " [{} {:02}:00: {}]", c.date, c.hour, ids.join(", "))?;
                }
                Ok(())
            }
            EngineError::OverlappingBands { first, second } => {
                write!(f, "active price bands overlap: {first} and {second}")
            }
            EngineError::Model(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<DataFetchError> for EngineError {
    fn from(e: DataFetchError) -> Self {
        EngineError::Fetch(e)
    }
}

impl From<ModelError> for EngineError {
    fn from(e: ModelError) -> Self {
        EngineError::Model(e)
    }
}

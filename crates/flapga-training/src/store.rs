use std::{error::Error, sync::Mutex};

use flapga_policy::{Chromosome, NetworkWeights};
use serde::Serialize;

/// Error returned by a [`BestStore`].
pub type StoreError = Box<dyn Error + Send + Sync>;

/// The best individual found so far, copied out of its population.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestIndividual {
    /// Generation in which it was found.
    pub generation: u32,
    pub score: u32,
    pub chromosome: Chromosome,
}

impl BestIndividual {
    /// The chromosome decoded into named tensors.
    #[must_use]
    pub fn weights(&self) -> NetworkWeights {
        self.chromosome.to_network().weights()
    }
}

/// Durable storage for the best individual.
///
/// `save` may be called from a helper thread.
pub trait BestStore: Send + Sync {
    fn save(&self, best: &BestIndividual) -> Result<(), StoreError>;

    /// Returns the previously saved weights, or `None` if nothing was saved yet.
    fn load(&self) -> Result<Option<NetworkWeights>, StoreError>;
}

/// Keeps the best individual in memory; useful for hosts that never persist.
#[derive(Debug, Default)]
pub struct MemoryStore {
    weights: Mutex<Option<NetworkWeights>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_weights(weights: NetworkWeights) -> Self {
        Self {
            weights: Mutex::new(Some(weights)),
        }
    }
}

impl BestStore for MemoryStore {
    fn save(&self, best: &BestIndividual) -> Result<(), StoreError> {
        let mut slot = self.weights.lock().map_err(|e| e.to_string())?;
        *slot = Some(best.weights());
        Ok(())
    }

    fn load(&self) -> Result<Option<NetworkWeights>, StoreError> {
        let slot = self.weights.lock().map_err(|e| e.to_string())?;
        Ok(slot.clone())
    }
}

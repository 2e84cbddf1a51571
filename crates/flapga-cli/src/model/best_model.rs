use std::{
    io,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use flapga_policy::{NetworkWeights, PolicyNetwork};
use flapga_training::{BestIndividual, BestStore, StoreError};
use serde::{Deserialize, Serialize};

use crate::util::{Output, read_json_file};

pub const DEFAULT_MODEL_PATH: &str = "models/best.json";

/// The best network found by a training run, as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestModel {
    pub trained_at: DateTime<Utc>,
    pub generation: u32,
    pub score: u32,
    pub weights: NetworkWeights,
}

impl BestModel {
    pub fn from_best(best: &BestIndividual) -> Self {
        Self {
            trained_at: Utc::now(),
            generation: best.generation,
            score: best.score,
            weights: best.weights(),
        }
    }

    pub fn open<P>(path: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        read_json_file("model", path)
    }

    pub fn to_network(&self) -> anyhow::Result<PolicyNetwork> {
        PolicyNetwork::from_weights(&self.weights).context("Model weights do not fit the network")
    }
}

/// Keeps the best individual in a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonModelStore {
    path: PathBuf,
}

impl JsonModelStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BestStore for JsonModelStore {
    fn save(&self, best: &BestIndividual) -> Result<(), StoreError> {
        let model = BestModel::from_best(best);
        Output::create(self.path.clone())?.write_json(&model)?;
        Ok(())
    }

    fn load(&self) -> Result<Option<NetworkWeights>, StoreError> {
        match self.path.try_exists() {
            Ok(false) => return Ok(None),
            Ok(true) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        }
        let model = BestModel::open(&self.path)?;
        Ok(Some(model.weights))
    }
}

#[cfg(test)]
mod tests {
    use std::{env, fs, process};

    use flapga_policy::Chromosome;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("flapga-{name}-{}", process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn sample_best() -> BestIndividual {
        let network = PolicyNetwork::random(&mut Pcg64::seed_from_u64(5));
        BestIndividual {
            generation: 4,
            score: 17,
            chromosome: Chromosome::from_network(&network),
        }
    }

    #[test]
    fn test_missing_file_loads_as_none() {
        let dir = scratch_dir("missing");
        let store = JsonModelStore::new(dir.join("best.json"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_save_creates_parents_and_roundtrips() {
        let dir = scratch_dir("roundtrip");
        let store = JsonModelStore::new(dir.join("nested").join("best.json"));
        let best = sample_best();

        store.save(&best).unwrap();
        let weights = store.load().unwrap().unwrap();
        assert_eq!(weights, best.weights());

        let model = BestModel::open(store.path()).unwrap();
        assert_eq!(model.generation, 4);
        assert_eq!(model.score, 17);
        assert_eq!(
            model.to_network().unwrap(),
            best.chromosome.to_network()
        );

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_file_layout() {
        let dir = scratch_dir("layout");
        let store = JsonModelStore::new(dir.join("best.json"));
        store.save(&sample_best()).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        for key in ["trained_at", "generation", "score", "weights"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        for key in ["w1", "b1", "w2", "b2", "w3", "b3"] {
            assert!(json["weights"].get(key).is_some(), "missing weights.{key}");
        }

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = scratch_dir("corrupt");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("best.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(JsonModelStore::new(path).load().is_err());

        fs::remove_dir_all(&dir).unwrap();
    }
}

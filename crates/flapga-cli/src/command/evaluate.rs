use std::path::PathBuf;

use flapga_engine::{World, WorldConfig, WorldSeed};
use flapga_policy::PolicyNetwork;
use flapga_training::{Episode, ScoreStats};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg64;
use serde::Serialize;

use crate::{
    logging,
    model::best_model::{BestModel, DEFAULT_MODEL_PATH},
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EvaluateArg {
    /// Model file to evaluate
    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    model: PathBuf,
    /// Training configuration whose world settings are used
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of worlds to fly through
    #[arg(long, default_value_t = 10)]
    episodes: u32,
    /// Seed for world generation (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Maximum ticks per episode
    #[arg(long, default_value_t = 100_000)]
    tick_limit: u64,
    /// Write the report as JSON to this file (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct EvaluationReport {
    model: PathBuf,
    trained_generation: u32,
    trained_score: u32,
    episodes: Vec<EpisodeResult>,
    stats: Option<ScoreStats>,
}

#[derive(Debug, Serialize)]
struct EpisodeResult {
    seed: WorldSeed,
    score: u32,
    ticks: u64,
}

pub(crate) fn run(arg: &EvaluateArg) -> anyhow::Result<()> {
    logging::init_stderr();

    let model = BestModel::open(&arg.model)?;
    let network = model.to_network()?;
    let world_config = util::read_training_config(arg.config.as_deref())?.world;
    world_config.validate()?;

    let mut rng = match arg.seed {
        Some(seed) => Pcg64::seed_from_u64(seed),
        None => Pcg64::from_os_rng(),
    };

    eprintln!(
        "Evaluating {} (generation {}, score {})",
        arg.model.display(),
        model.generation,
        model.score
    );
    let episodes = (0..arg.episodes)
        .map(|i| {
            let seed = rng.random();
            let result = fly(&network, &world_config, seed, arg.tick_limit);
            eprintln!(
                "  #{i:3}: score {:5} after {:6} ticks",
                result.score, result.ticks
            );
            result
        })
        .collect::<Vec<_>>();

    let stats = ScoreStats::new(episodes.iter().map(|e| e.score));
    if let Some(stats) = &stats {
        eprintln!();
        eprintln!("Scores:");
        eprintln!("  Min:    {}", stats.min);
        eprintln!("  Max:    {}", stats.max);
        eprintln!("  Mean:   {:.2}", stats.mean);
        eprintln!("  Median: {:.1}", stats.median);
        eprintln!("  StdDev: {:.2}", stats.std_dev);
    }

    let report = EvaluationReport {
        model: arg.model.clone(),
        trained_generation: model.generation,
        trained_score: model.score,
        episodes,
        stats,
    };
    Output::save_json(&report, arg.output.clone())?;
    Ok(())
}

/// Flies `network` alone through the world generated from `seed`.
fn fly(
    network: &PolicyNetwork,
    config: &WorldConfig,
    seed: WorldSeed,
    tick_limit: u64,
) -> EpisodeResult {
    let world = World::with_seed(config.clone(), seed);
    let mut episode = Episode::with_networks(world, [network.clone()], Some(tick_limit));
    episode.run(|_| None);
    let result = EpisodeResult {
        seed,
        score: episode.scores().first().copied().unwrap_or_default(),
        ticks: episode.world().tick_count(),
    };
    tracing::debug!(?seed, score = result.score, ticks = result.ticks, "episode finished");
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_result() {
        let network = PolicyNetwork::random(&mut Pcg64::seed_from_u64(9));
        let config = WorldConfig::default();
        let seed = WorldSeed::from_bytes([3; 16]);
        let a = fly(&network, &config, seed, 2_000);
        let b = fly(&network, &config, seed, 2_000);
        assert_eq!(a.score, b.score);
        assert_eq!(a.ticks, b.ticks);
        assert!(a.ticks <= 2_000);
    }

    #[test]
    fn test_silent_network_falls_to_the_floor() {
        // all-zero parameters output exactly 0.5, which never jumps
        let result = fly(
            &PolicyNetwork::default(),
            &WorldConfig::default(),
            WorldSeed::from_bytes([0; 16]),
            10_000,
        );
        assert_eq!(result.score, 0);
        assert!(result.ticks < 100);
    }
}

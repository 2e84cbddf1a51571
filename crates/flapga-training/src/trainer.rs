use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::{self, RecvTimeoutError},
    },
    thread,
    time::{Duration, Instant},
};

use flapga_engine::{World, WorldSeed};
use flapga_policy::{Chromosome, PolicyNetwork};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg64;
use serde::Serialize;

use crate::{
    BestIndividual, BestStore, ConfigError, Episode, ScoreStats, StopReason, TickOutcome,
    TickView, TrainingConfig, TrainingObserver,
    genetic::{Mutation, Population, PopulationEvolver},
};

/// What one generation produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRecord {
    /// 1-based generation index.
    pub generation: u32,
    /// Best individual found up to and including this generation.
    pub best: Option<BestIndividual>,
    /// Wall-clock time since training started.
    pub elapsed: Duration,
    /// Ticks the episode lasted.
    pub ticks: u64,
    /// `false` if training stopped before the episode ended.
    pub completed: bool,
    /// The population was discarded afterwards for lack of progress.
    pub hardstuck_reset: bool,
    /// Score of every individual, in population order.
    pub scores: Vec<u32>,
    pub stats: ScoreStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingSummary {
    pub reason: StopReason,
    /// Number of generations evaluated, including an interrupted last one.
    pub generations: u32,
    pub best: Option<BestIndividual>,
    pub elapsed: Duration,
    pub history: Vec<GenerationRecord>,
}

/// Result of [`Trainer::advance_one_tick`].
#[derive(Debug, Clone, PartialEq, derive_more::IsVariant)]
pub enum TrainerEvent {
    /// The current episode advanced by one tick.
    Ticked,
    /// A generation finished and the next one has been bred.
    GenerationCompleted(GenerationRecord),
    /// Training is over. Further calls return the same summary.
    Terminated(TrainingSummary),
}

/// Runs the genetic algorithm one simulation tick at a time.
///
/// # Example
///
/// ```
/// use flapga_training::{StopReason, Trainer, TrainingConfig};
///
/// let mut config = TrainingConfig::default();
/// config.population_size = 10;
/// config.stop_condition.generations = Some(2);
/// config.seed = Some(42);
/// config.episode_tick_limit = Some(500);
///
/// let summary = Trainer::new(config, None).unwrap().start();
/// assert_eq!(summary.reason, StopReason::Generations);
/// assert_eq!(summary.history.len(), 2);
/// ```
pub struct Trainer {
    config: TrainingConfig,
    evolver: PopulationEvolver,
    rng: Pcg64,
    generation: u32,
    population: Population,
    episode: Episode,
    best: Option<BestIndividual>,
    history: Vec<GenerationRecord>,
    started_at: Option<Instant>,
    store: Option<Arc<dyn BestStore>>,
    observer: Option<Box<dyn TrainingObserver + Send>>,
    quit: Arc<AtomicBool>,
    summary: Option<TrainingSummary>,
}

impl fmt::Debug for Trainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trainer")
            .field("generation", &self.generation)
            .field("population_size", &self.population.len())
            .field("best_score", &self.best.as_ref().map(|best| best.score))
            .field("terminated", &self.summary.is_some())
            .finish_non_exhaustive()
    }
}

impl Trainer {
    /// Validates `config` and builds the first population.
    ///
    /// With `load_previous_best` set and a stored best available, the population
    /// is seeded from it; otherwise it is initialized randomly.
    pub fn new(
        config: TrainingConfig,
        store: Option<Arc<dyn BestStore>>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mutation = Mutation::new(
            config.mutation_probability,
            config.mutation_standard_deviation,
        )?;
        let evolver = PopulationEvolver {
            elitism: config.elitism,
            mutation,
        };
        let mut rng = match config.seed {
            Some(seed) => Pcg64::seed_from_u64(seed),
            None => Pcg64::from_os_rng(),
        };

        let previous = if config.load_previous_best {
            store.as_deref().and_then(load_previous_best)
        } else {
            None
        };
        let population = match previous {
            Some(seed) => {
                Population::seeded_from(&seed, config.population_size, &mutation, &mut rng)
            }
            None => Population::random(config.population_size, &mut rng),
        };
        let episode = new_episode(&config, &population, &mut rng);

        Ok(Self {
            config,
            evolver,
            rng,
            generation: 1,
            population,
            episode,
            best: None,
            history: vec![],
            started_at: None,
            store,
            observer: None,
            quit: Arc::new(AtomicBool::new(false)),
            summary: None,
        })
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Box<dyn TrainingObserver + Send>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Flag that asks the trainer to stop before the next tick.
    #[must_use]
    pub fn quit_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.quit)
    }

    #[must_use]
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Index of the generation currently being evaluated.
    #[must_use]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    #[must_use]
    pub fn episode(&self) -> &Episode {
        &self.episode
    }

    #[must_use]
    pub fn best(&self) -> Option<&BestIndividual> {
        self.best.as_ref()
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.map_or(Duration::ZERO, |t| t.elapsed())
    }

    /// Runs until a stop condition holds and returns the summary.
    pub fn start(&mut self) -> TrainingSummary {
        loop {
            if let TrainerEvent::Terminated(summary) = self.advance_one_tick() {
                return summary;
            }
        }
    }

    /// Advances the current episode by one tick.
    ///
    /// When the episode ends, the generation is scored, stop conditions are
    /// checked, and either the next generation is bred or training terminates.
    pub fn advance_one_tick(&mut self) -> TrainerEvent {
        if let Some(summary) = &self.summary {
            return TrainerEvent::Terminated(summary.clone());
        }
        let started_at = *self.started_at.get_or_insert_with(Instant::now);

        let quit = &self.quit;
        let time_budget = self.config.time_budget();
        let score_target = self.config.stop_condition.score;
        let outcome = self.episode.advance_one_tick(|episode| {
            if quit.load(Ordering::Relaxed) {
                return Some(StopReason::Quit);
            }
            if time_budget.is_some_and(|budget| started_at.elapsed() > budget) {
                return Some(StopReason::Time);
            }
            if let Some(target) = score_target
                && episode.best_alive_score().is_some_and(|score| score >= target)
            {
                return Some(StopReason::Score);
            }
            None
        });

        match outcome {
            TickOutcome::Continue => {
                if let Some(observer) = &mut self.observer {
                    observer.on_tick(&TickView {
                        generation: self.generation,
                        best_score: self.best.as_ref().map(|best| best.score),
                        episode: &self.episode,
                    });
                }
                TrainerEvent::Ticked
            }
            TickOutcome::EpisodeComplete => {
                let record = self.score_generation(true);
                if let Some(reason) = self.check_stop() {
                    self.push_record(record);
                    return TrainerEvent::Terminated(self.terminate(reason));
                }
                TrainerEvent::GenerationCompleted(self.breed(record))
            }
            TickOutcome::StopRequested(reason) => {
                let record = self.score_generation(false);
                self.push_record(record);
                TrainerEvent::Terminated(self.terminate(reason))
            }
        }
    }

    /// Copies the episode's scores into the population and updates the
    /// best-ever individual.
    fn score_generation(&mut self, completed: bool) -> GenerationRecord {
        let scores = self.episode.scores();
        self.population.assign_scores(&scores);

        // only a strictly higher score replaces the best-ever
        if let Some((_, champion)) = self.population.best()
            && self
                .best
                .as_ref()
                .is_none_or(|best| champion.score() > best.score)
        {
            self.best = Some(BestIndividual {
                generation: self.generation,
                score: champion.score(),
                chromosome: champion.chromosome().clone(),
            });
        }

        let stats = self.population.score_stats().unwrap_or_default();
        let ticks = self.episode.world().tick_count();
        let elapsed = self.elapsed();
        tracing::info!(
            generation = self.generation,
            best_score = self.best.as_ref().map_or(0, |best| best.score),
            max = stats.max,
            mean = stats.mean,
            median = stats.median,
            ticks,
            elapsed_secs = elapsed.as_secs_f64(),
            completed,
            "generation scored"
        );

        GenerationRecord {
            generation: self.generation,
            best: self.best.clone(),
            elapsed,
            ticks,
            completed,
            hardstuck_reset: false,
            scores,
            stats,
        }
    }

    fn check_stop(&self) -> Option<StopReason> {
        let stop = &self.config.stop_condition;
        if self.quit.load(Ordering::Relaxed) {
            return Some(StopReason::Quit);
        }
        if stop.generations.is_some_and(|limit| self.generation >= limit) {
            return Some(StopReason::Generations);
        }
        if let Some(target) = stop.score
            && self.best.as_ref().is_some_and(|best| best.score >= target)
        {
            return Some(StopReason::Score);
        }
        if self
            .config
            .time_budget()
            .is_some_and(|budget| self.elapsed() > budget)
        {
            return Some(StopReason::Time);
        }
        None
    }

    /// Replaces the population with the next generation and starts its episode.
    fn breed(&mut self, mut record: GenerationRecord) -> GenerationRecord {
        let best_score = self.best.as_ref().map_or(0, |best| best.score);
        let hardstuck =
            best_score == 0 && self.generation.is_multiple_of(self.config.hardstuck_gen);

        self.population = if hardstuck {
            tracing::warn!(
                generation = self.generation,
                "best score is still 0, reinitializing the population"
            );
            Population::random(self.config.population_size, &mut self.rng)
        } else {
            let elite = self.best.as_ref().map(|best| &best.chromosome);
            self.evolver.evolve(&self.population, elite, &mut self.rng)
        };
        self.episode = new_episode(&self.config, &self.population, &mut self.rng);
        self.generation += 1;

        record.hardstuck_reset = hardstuck;
        self.push_record(record.clone());
        record
    }

    fn push_record(&mut self, record: GenerationRecord) {
        if let Some(observer) = &mut self.observer {
            observer.on_generation(&record);
        }
        self.history.push(record);
    }

    fn terminate(&mut self, reason: StopReason) -> TrainingSummary {
        tracing::info!(
            %reason,
            generations = self.generation,
            best_score = self.best.as_ref().map_or(0, |best| best.score),
            "training terminated"
        );
        if self.config.save_best {
            self.persist_best();
        }

        let summary = TrainingSummary {
            reason,
            generations: self.generation,
            best: self.best.clone(),
            elapsed: self.elapsed(),
            history: self.history.clone(),
        };
        self.summary = Some(summary.clone());
        summary
    }

    /// Saves the best-ever individual on a helper thread, waiting at most
    /// `save_timeout` for it.
    fn persist_best(&self) {
        let (Some(store), Some(best)) = (&self.store, &self.best) else {
            return;
        };
        let store = Arc::clone(store);
        let best = best.clone();
        let score = best.score;
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            // the receiver may have given up already
            let _ = tx.send(store.save(&best));
        });

        let timeout = self.config.save_timeout();
        match rx.recv_timeout(timeout) {
            Ok(Ok(())) => tracing::info!(score, "best individual saved"),
            Ok(Err(e)) => tracing::warn!(error = %e, "failed to save best individual"),
            Err(RecvTimeoutError::Timeout) => tracing::warn!(
                timeout_secs = timeout.as_secs_f64(),
                "saving best individual timed out"
            ),
            Err(RecvTimeoutError::Disconnected) => {
                tracing::warn!("save thread exited without reporting");
            }
        }
    }
}

fn new_episode(config: &TrainingConfig, population: &Population, rng: &mut Pcg64) -> Episode {
    let seed: WorldSeed = rng.random();
    let world = World::with_seed(config.world.clone(), seed);
    Episode::with_networks(world, population.networks(), config.episode_tick_limit)
}

fn load_previous_best(store: &dyn BestStore) -> Option<Chromosome> {
    match store.load() {
        Ok(Some(weights)) => match PolicyNetwork::from_weights(&weights) {
            Ok(network) => {
                tracing::info!("seeding population from previous best");
                Some(Chromosome::from_network(&network))
            }
            Err(e) => {
                tracing::warn!(error = %e, "stored best does not fit the network, starting from random networks");
                None
            }
        },
        Ok(None) => {
            tracing::info!("no previous best found, starting from random networks");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to load previous best, starting from random networks");
            None
        }
    }
}

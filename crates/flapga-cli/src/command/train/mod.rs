use std::{
    path::PathBuf,
    process,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use flapga_training::{BestStore, Trainer, TrainerEvent, TrainingConfig, TrainingSummary};

use crate::{
    logging,
    model::best_model::{DEFAULT_MODEL_PATH, JsonModelStore},
    util::{self, Output},
};

mod watch;

const WATCH_TICK_RATE: f64 = 30.0;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Training configuration file (built-in defaults if omitted)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Model file the best individual is loaded from and saved to
    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    model: PathBuf,
    #[arg(long)]
    population_size: Option<usize>,
    /// Stop after this many generations
    #[arg(long)]
    generations: Option<u32>,
    /// Stop once a bird reaches this score
    #[arg(long)]
    score: Option<u32>,
    /// Stop after this many seconds
    #[arg(long)]
    time: Option<f64>,
    #[arg(long)]
    seed: Option<u64>,
    /// End each episode after this many ticks
    #[arg(long)]
    tick_limit: Option<u64>,
    #[arg(long)]
    no_elitism: bool,
    /// Start from random networks even if a saved model exists
    #[arg(long)]
    fresh: bool,
    /// Do not save the best individual when training ends
    #[arg(long)]
    no_save: bool,
    /// Show the running episode in the terminal
    #[arg(long)]
    watch: bool,
    /// Simulation ticks per second (unpaced by default, 30 with --watch)
    #[arg(long)]
    tick_rate: Option<f64>,
    /// Log file used with --watch
    #[arg(long, default_value = "flapga-train.log")]
    log_file: PathBuf,
    /// Write the per-generation history as JSON to this file
    #[arg(long)]
    history: Option<PathBuf>,
}

impl TrainArg {
    fn training_config(&self) -> anyhow::Result<TrainingConfig> {
        let mut config = util::read_training_config(self.config.as_deref())?;
        if let Some(population_size) = self.population_size {
            config.population_size = population_size;
        }
        if let Some(generations) = self.generations {
            config.stop_condition.generations = Some(generations);
        }
        if let Some(score) = self.score {
            config.stop_condition.score = Some(score);
        }
        if let Some(time) = self.time {
            config.stop_condition.time = Some(time);
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(tick_limit) = self.tick_limit {
            config.episode_tick_limit = Some(tick_limit);
        }
        if self.no_elitism {
            config.elitism = false;
        }
        if self.fresh {
            config.load_previous_best = false;
        }
        if self.no_save {
            config.save_best = false;
        }
        Ok(config)
    }

    fn tick_interval(&self) -> anyhow::Result<Option<Duration>> {
        let Some(rate) = self.tick_rate.or(self.watch.then_some(WATCH_TICK_RATE)) else {
            return Ok(None);
        };
        anyhow::ensure!(
            rate.is_finite() && rate > 0.0,
            "Tick rate must be a positive number, got {rate}"
        );
        Ok(Some(Duration::from_secs_f64(1.0 / rate)))
    }
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    if arg.watch {
        logging::init_file(&arg.log_file)?;
    } else {
        logging::init_stderr();
    }

    let config = arg.training_config()?;
    let tick_interval = arg.tick_interval()?;
    let stop = &config.stop_condition;
    if stop.generations.is_none() && stop.score.is_none() && stop.time.is_none() && !arg.watch {
        tracing::warn!("no stop condition set, training runs until interrupted with Ctrl-C");
    }
    let save_best = config.save_best;

    let store = JsonModelStore::new(arg.model.clone());
    tracing::info!(path = %store.path().display(), "using model file");
    let store: Arc<dyn BestStore> = Arc::new(store);
    let summary = if arg.watch {
        watch::run(config, store, tick_interval)?
    } else {
        let mut trainer = Trainer::new(config, Some(store))?;
        let quit = trainer.quit_handle();
        ctrlc::set_handler(move || {
            if request_quit(&quit) {
                // second interrupt while the best individual is being saved
                process::exit(130);
            }
            tracing::info!("interrupted, saving the best individual");
        })?;
        drive(&mut trainer, tick_interval)
    };

    eprintln!();
    eprintln!("Training finished: {}", summary.reason);
    eprintln!("  Generations: {}", summary.generations);
    eprintln!("  Elapsed:     {:.1}s", summary.elapsed.as_secs_f64());
    match &summary.best {
        Some(best) => {
            eprintln!(
                "  Best score:  {} (generation {})",
                best.score, best.generation
            );
            if save_best {
                eprintln!("  Model:       {}", arg.model.display());
            }
        }
        None => eprintln!("  No generation was evaluated"),
    }

    if let Some(path) = &arg.history {
        Output::save_json(&summary.history, Some(path.clone()))?;
        eprintln!("  History:     {}", path.display());
    }
    Ok(())
}

/// Raises the quit flag and reports whether it was already raised.
fn request_quit(quit: &AtomicBool) -> bool {
    quit.swap(true, Ordering::SeqCst)
}

/// Advances `trainer` until it terminates, sleeping between ticks when paced.
fn drive(trainer: &mut Trainer, tick_interval: Option<Duration>) -> TrainingSummary {
    let mut next_tick_at = Instant::now();
    loop {
        match trainer.advance_one_tick() {
            TrainerEvent::Ticked | TrainerEvent::GenerationCompleted(_) => {}
            TrainerEvent::Terminated(summary) => return summary,
        }
        if let Some(interval) = tick_interval {
            next_tick_at += interval;
            let now = Instant::now();
            if next_tick_at > now {
                thread::sleep(next_tick_at - now);
            } else {
                // fell behind; do not try to catch up
                next_tick_at = now;
            }
        }
    }
}

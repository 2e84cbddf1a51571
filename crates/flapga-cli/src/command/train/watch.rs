use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use anyhow::Context as _;
use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};
use flapga_training::{
    BestStore, GenerationRecord, LatestSlot, NetworkSnapshot, TickView, Trainer,
    TrainingConfig, TrainingObserver, TrainingSummary,
};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    text::Line,
    widgets::{Block, Paragraph},
};

use crate::{
    tui::{App, Tui},
    ui::widgets::{
        LastGeneration, NetworkDisplay, PlayfieldDisplay, PlayfieldSnapshot, TrainingProgress,
        TrainingStatsDisplay, style,
    },
};

const FPS: f64 = 30.0;
const POLL_RATE: f64 = 60.0;

/// Runs training on a worker thread while the terminal shows its newest state.
///
/// Closing the view requests a stop; the worker then saves the best individual
/// and this returns its summary.
pub(super) fn run(
    config: TrainingConfig,
    store: Arc<dyn BestStore>,
    tick_interval: Option<Duration>,
) -> anyhow::Result<TrainingSummary> {
    let frames = LatestSlot::new();
    let observer = WatchObserver::new(frames.clone(), config.population_size);
    let trainer = Trainer::new(config, Some(store))?.with_observer(Box::new(observer));
    let quit = trainer.quit_handle();

    let worker = thread::Builder::new()
        .name("trainer".to_owned())
        .spawn(move || {
            let mut trainer = trainer;
            super::drive(&mut trainer, tick_interval)
        })
        .context("Failed to spawn training thread")?;

    let mut app = WatchApp::new(frames, Arc::clone(&quit), worker);
    let ui_result = Tui::new().run(&mut app);

    // the worker must stop even if the terminal failed
    quit.store(true, Ordering::Relaxed);
    let summary = app
        .worker
        .join()
        .map_err(|_| anyhow::anyhow!("Training thread panicked"))?;
    ui_result?;
    Ok(summary)
}

/// Everything the view needs from one tick.
#[derive(Debug, Clone)]
struct WatchFrame {
    progress: TrainingProgress,
    playfield: PlayfieldSnapshot,
    network: Option<NetworkSnapshot>,
}

#[derive(Debug)]
struct WatchObserver {
    frames: LatestSlot<WatchFrame>,
    population_size: usize,
    started_at: Option<Instant>,
    last_generation: Option<LastGeneration>,
}

impl WatchObserver {
    fn new(frames: LatestSlot<WatchFrame>, population_size: usize) -> Self {
        Self {
            frames,
            population_size,
            started_at: None,
            last_generation: None,
        }
    }
}

impl TrainingObserver for WatchObserver {
    fn on_tick(&mut self, view: &TickView<'_>) {
        let started_at = *self.started_at.get_or_insert_with(Instant::now);
        let episode = view.episode;
        let leader_score = view.focus().map(|(_, agent)| agent.score());
        let progress = TrainingProgress {
            generation: view.generation,
            population_size: self.population_size,
            alive: episode.alive_count(),
            tick: episode.world().tick_count(),
            leader_score,
            best_score: view.best_score.max(leader_score),
            elapsed: started_at.elapsed(),
            last_generation: self.last_generation.clone(),
        };
        self.frames.publish(WatchFrame {
            progress,
            playfield: PlayfieldSnapshot::capture(episode),
            network: view.network_snapshot(),
        });
    }

    fn on_generation(&mut self, record: &GenerationRecord) {
        self.last_generation = Some(record.into());
    }
}

#[derive(Debug)]
struct WatchApp {
    frames: LatestSlot<WatchFrame>,
    latest: Option<WatchFrame>,
    quit: Arc<AtomicBool>,
    worker: JoinHandle<TrainingSummary>,
}

impl WatchApp {
    fn new(
        frames: LatestSlot<WatchFrame>,
        quit: Arc<AtomicBool>,
        worker: JoinHandle<TrainingSummary>,
    ) -> Self {
        Self {
            frames,
            latest: None,
            quit,
            worker,
        }
    }

    fn request_stop(&self) {
        if !self.quit.swap(true, Ordering::Relaxed) {
            tracing::info!("stop requested from the terminal");
        }
    }

    fn is_stopping(&self) -> bool {
        self.quit.load(Ordering::Relaxed)
    }
}

impl App for WatchApp {
    fn init(&mut self, tui: &mut Tui) {
        tui.set_tick_rate(POLL_RATE);
        tui.set_frame_rate(FPS);
    }

    fn should_exit(&self) -> bool {
        self.worker.is_finished()
    }

    fn handle_event(&mut self, _tui: &mut Tui, event: Event) {
        let Event::Key(key) = event else {
            return;
        };
        if key.kind != KeyEventKind::Press {
            return;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.request_stop(),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.request_stop();
            }
            _ => {}
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let border_style = if self.is_stopping() {
            style::WARNING
        } else {
            style::DEFAULT
        };

        let Some(latest) = &self.latest else {
            let waiting = Paragraph::new("Waiting for the first tick...")
                .style(style::LABEL)
                .block(Block::bordered().border_style(border_style));
            frame.render_widget(waiting, area);
            return;
        };

        let [world_area, stats_area, network_area] = Layout::horizontal([
            Constraint::Min(30),
            Constraint::Length(28),
            Constraint::Length(56),
        ])
        .areas(area);

        let playfield = PlayfieldDisplay::new(&latest.playfield).block(
            Block::bordered()
                .title(Line::from("WORLD").centered())
                .border_style(border_style),
        );
        let stats = TrainingStatsDisplay::new(&latest.progress)
            .stopping(self.is_stopping())
            .block(
                Block::bordered()
                    .title(Line::from("TRAINING").centered())
                    .border_style(border_style),
            );
        let network = NetworkDisplay::new(latest.network.as_ref()).block(
            Block::bordered()
                .title(Line::from("NETWORK").centered())
                .border_style(border_style),
        );

        frame.render_widget(&playfield, world_area);
        frame.render_widget(&stats, stats_area);
        frame.render_widget(&network, network_area);
    }

    fn update(&mut self, _tui: &mut Tui) {
        if let Some(latest) = self.frames.take() {
            self.latest = Some(latest);
        }
    }
}

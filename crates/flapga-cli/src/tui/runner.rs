use std::time::Duration;

use crate::tui::{App, event::TuiEvent, event_loop::EventLoop};

const DEFAULT_TICK_RATE: f64 = 10.0;
const DEFAULT_FRAME_RATE: f64 = 30.0;

#[derive(Debug)]
pub struct Tui {
    events: EventLoop,
}

impl Default for Tui {
    fn default() -> Self {
        Self {
            events: EventLoop::new(period(DEFAULT_TICK_RATE), period(DEFAULT_FRAME_RATE)),
        }
    }
}

/// Interval between events at `rate` per second.
fn period(rate: f64) -> Duration {
    Duration::from_secs_f64(1.0 / rate)
}

impl Tui {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks per second; `rate` must be positive.
    pub fn set_tick_rate(&mut self, rate: f64) {
        self.events.set_tick_interval(period(rate));
    }

    /// Frames per second; `rate` must be positive.
    pub fn set_frame_rate(&mut self, rate: f64) {
        self.events.set_frame_interval(period(rate));
    }

    /// Takes over the terminal and runs `app` until it asks to exit.
    ///
    /// The terminal is restored on return, including on error.
    pub fn run<A>(mut self, app: &mut A) -> anyhow::Result<()>
    where
        A: App,
    {
        app.init(&mut self);

        ratatui::run(|terminal| {
            while !app.should_exit() {
                match self.events.next()? {
                    TuiEvent::Tick => app.update(&mut self),
                    TuiEvent::Render => {
                        terminal.draw(|frame| app.draw(frame))?;
                    }
                    TuiEvent::Crossterm(event) => app.handle_event(&mut self, event),
                }
            }
            Ok(())
        })
    }
}

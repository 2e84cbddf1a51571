use std::time::{Duration, Instant};

use crossterm::event;

use crate::tui::event::TuiEvent;

/// A repeating deadline that never tries to catch up on missed periods.
#[derive(Debug, Clone, Copy)]
struct Timer {
    interval: Duration,
    next_at: Instant,
}

impl Timer {
    fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next_at: now,
        }
    }

    /// Takes effect from the next period on.
    fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Returns `true` and schedules the next period if the deadline has passed.
    fn fire(&mut self, now: Instant) -> bool {
        if now < self.next_at {
            return false;
        }
        self.next_at = now + self.interval;
        true
    }
}

/// Interleaves simulation ticks, frames and terminal input.
///
/// Ticks take priority over frames so a slow terminal cannot stall the
/// simulation; input is only polled while neither deadline has passed.
#[derive(Debug)]
pub(super) struct EventLoop {
    tick: Timer,
    frame: Timer,
}

impl EventLoop {
    pub(super) fn new(tick_interval: Duration, frame_interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            tick: Timer::new(tick_interval, now),
            frame: Timer::new(frame_interval, now),
        }
    }

    pub(super) fn set_tick_interval(&mut self, interval: Duration) {
        self.tick.set_interval(interval);
    }

    pub(super) fn set_frame_interval(&mut self, interval: Duration) {
        self.frame.set_interval(interval);
    }

    /// Blocks until the next tick, frame or terminal event.
    pub(super) fn next(&mut self) -> anyhow::Result<TuiEvent> {
        loop {
            if let Some(event) = self.due(Instant::now()) {
                return Ok(event);
            }
            if event::poll(self.wait(Instant::now()))? {
                return Ok(event::read()?.into());
            }
        }
    }

    fn due(&mut self, now: Instant) -> Option<TuiEvent> {
        if self.tick.fire(now) {
            Some(TuiEvent::Tick)
        } else if self.frame.fire(now) {
            Some(TuiEvent::Render)
        } else {
            None
        }
    }

    fn wait(&self, now: Instant) -> Duration {
        self.tick
            .next_at
            .min(self.frame.next_at)
            .saturating_duration_since(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(10);
    const FRAME: Duration = Duration::from_millis(25);

    #[test]
    fn test_tick_and_frame_are_due_immediately_then_scheduled() {
        let mut events = EventLoop::new(TICK, FRAME);
        let start = events.tick.next_at;

        assert!(matches!(events.due(start), Some(TuiEvent::Tick)));
        assert!(matches!(events.due(start), Some(TuiEvent::Render)));
        assert!(events.due(start).is_none());
        assert_eq!(events.wait(start), TICK);

        assert!(matches!(events.due(start + TICK), Some(TuiEvent::Tick)));
        assert!(events.due(start + TICK).is_none());
        assert!(matches!(events.due(start + TICK * 2), Some(TuiEvent::Tick)));
        assert_eq!(events.wait(start + TICK * 2), FRAME - TICK * 2);
        assert!(matches!(events.due(start + FRAME), Some(TuiEvent::Render)));
    }

    #[test]
    fn test_missed_periods_are_not_replayed() {
        let mut events = EventLoop::new(TICK, FRAME);
        let late = events.tick.next_at + TICK * 10;

        assert!(matches!(events.due(late), Some(TuiEvent::Tick)));
        assert!(matches!(events.due(late), Some(TuiEvent::Render)));
        assert!(events.due(late).is_none());
        assert_eq!(events.wait(late), TICK);

        assert!(matches!(events.due(late + TICK), Some(TuiEvent::Tick)));
        assert!(events.due(late + TICK).is_none());
    }
}

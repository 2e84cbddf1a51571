use crossterm::event::Event;
use ratatui::Frame;

use crate::tui::Tui;

/// A screen driven by [`Tui::run`].
pub trait App {
    /// Called once before the first event; configure rates here.
    fn init(&mut self, tui: &mut Tui);

    fn should_exit(&self) -> bool;

    /// Key presses, resizes and other terminal input.
    fn handle_event(&mut self, tui: &mut Tui, event: Event);

    fn draw(&self, frame: &mut Frame);

    /// Called on every tick; pull fresh state here.
    fn update(&mut self, tui: &mut Tui);
}

use flapga_engine::Rect as WorldRect;
use flapga_training::Episode;
use ratatui::{
    prelude::{Buffer, Rect},
    style::Color,
    symbols::Marker,
    widgets::{
        Block, Widget,
        canvas::{Canvas, Line as CanvasLine, Rectangle},
    },
};

use crate::ui::widgets::color;

/// The rectangles of an episode that the playfield draws.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayfieldSnapshot {
    pub width: f64,
    pub floor_y: f64,
    /// Upper and lower rectangle of every obstacle pair.
    pub obstacles: Vec<WorldRect>,
    /// Living birds other than the leader.
    pub birds: Vec<WorldRect>,
    pub leader: Option<WorldRect>,
}

impl PlayfieldSnapshot {
    pub fn capture(episode: &Episode) -> Self {
        let world = episode.world();
        let leader = episode.leader();
        let leader_index = leader.map(|(index, _)| index);
        Self {
            width: world.config().width,
            floor_y: world.config().floor_y,
            obstacles: world
                .pairs()
                .flat_map(|pair| [*pair.upper(), *pair.lower()])
                .collect(),
            birds: episode
                .agents()
                .iter()
                .enumerate()
                .filter(|(index, agent)| agent.is_alive() && Some(*index) != leader_index)
                .map(|(_, agent)| *agent.bird().rect())
                .collect(),
            leader: leader.map(|(_, agent)| *agent.bird().rect()),
        }
    }
}

/// Obstacles and every living bird of an episode.
///
/// The leading bird is highlighted.
#[derive(Debug)]
pub struct PlayfieldDisplay<'a> {
    snapshot: &'a PlayfieldSnapshot,
    block: Option<Block<'a>>,
}

impl<'a> PlayfieldDisplay<'a> {
    pub fn new(snapshot: &'a PlayfieldSnapshot) -> Self {
        Self {
            snapshot,
            block: None,
        }
    }

    pub fn block(self, block: Block<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }
}

impl Widget for PlayfieldDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &PlayfieldDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let PlayfieldSnapshot {
            width,
            floor_y,
            obstacles,
            birds,
            leader,
        } = self.snapshot;
        let (width, floor_y) = (*width, *floor_y);

        let canvas = Canvas::default()
            .marker(Marker::Braille)
            .background_color(color::BLACK)
            .x_bounds([0.0, width])
            .y_bounds([0.0, floor_y])
            .paint(|ctx| {
                for rect in obstacles {
                    ctx.draw(&shape(rect, floor_y, color::GREEN));
                }
                ctx.draw(&CanvasLine {
                    x1: 0.0,
                    y1: 0.0,
                    x2: width,
                    y2: 0.0,
                    color: color::GRAY,
                });
                ctx.layer();

                for rect in birds {
                    ctx.draw(&shape(rect, floor_y, color::GRAY));
                }
                if let Some(rect) = leader {
                    ctx.draw(&shape(rect, floor_y, color::YELLOW));
                }
            });

        match &self.block {
            Some(block) => canvas.block(block.clone()).render(area, buf),
            None => canvas.render(area, buf),
        }
    }
}

/// Converts a downward-growing playfield rectangle to canvas coordinates.
fn shape(rect: &WorldRect, floor_y: f64, color: Color) -> Rectangle {
    let top = rect.top().max(0.0);
    let bottom = rect.bottom().min(floor_y);
    Rectangle {
        x: rect.left(),
        y: floor_y - bottom,
        width: rect.width,
        height: (bottom - top).max(0.0),
        color,
    }
}

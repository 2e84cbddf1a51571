use std::time::Duration;

use flapga_training::GenerationRecord;
use ratatui::{
    prelude::{Buffer, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Paragraph, Widget},
};

use crate::ui::widgets::style;

/// Counters shown next to the playfield.
#[derive(Debug, Clone, Default)]
pub struct TrainingProgress {
    pub generation: u32,
    pub population_size: usize,
    pub alive: usize,
    pub tick: u64,
    /// Score of the leading living bird.
    pub leader_score: Option<u32>,
    pub best_score: Option<u32>,
    pub elapsed: Duration,
    pub last_generation: Option<LastGeneration>,
}

#[derive(Debug, Clone)]
pub struct LastGeneration {
    pub generation: u32,
    pub max: u32,
    pub mean: f64,
    pub median: f64,
    pub hardstuck_reset: bool,
}

impl From<&GenerationRecord> for LastGeneration {
    fn from(record: &GenerationRecord) -> Self {
        Self {
            generation: record.generation,
            max: record.stats.max,
            mean: record.stats.mean,
            median: record.stats.median,
            hardstuck_reset: record.hardstuck_reset,
        }
    }
}

#[derive(Debug)]
pub struct TrainingStatsDisplay<'a> {
    progress: &'a TrainingProgress,
    stopping: bool,
    block: Option<Block<'a>>,
}

impl<'a> TrainingStatsDisplay<'a> {
    pub fn new(progress: &'a TrainingProgress) -> Self {
        Self {
            progress,
            stopping: false,
            block: None,
        }
    }

    pub fn stopping(self, stopping: bool) -> Self {
        Self { stopping, ..self }
    }

    pub fn block(self, block: Block<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    fn text(&self) -> Text<'static> {
        let p = self.progress;
        let score = |score: Option<u32>| score.map_or_else(|| "-".to_owned(), |s| s.to_string());
        let mut lines = vec![
            row("Generation", p.generation.to_string()),
            row("Alive", format!("{}/{}", p.alive, p.population_size)),
            row("Tick", p.tick.to_string()),
            row("Score", score(p.leader_score)),
            row("Best ever", score(p.best_score)),
            row("Elapsed", format!("{:.0}s", p.elapsed.as_secs_f64())),
        ];
        if let Some(last) = &p.last_generation {
            lines.push(Line::default());
            lines.push(Line::styled(
                format!("Generation {}", last.generation),
                style::HEADING,
            ));
            lines.push(row("Max", last.max.to_string()));
            lines.push(row("Mean", format!("{:.2}", last.mean)));
            lines.push(row("Median", format!("{:.1}", last.median)));
            if last.hardstuck_reset {
                lines.push(Line::styled("population reset", style::WARNING));
            }
        }
        lines.push(Line::default());
        lines.push(if self.stopping {
            Line::styled("stopping, saving best...", style::WARNING)
        } else {
            Line::styled("q: stop and save", style::LABEL)
        });
        Text::from(lines)
    }
}

fn row(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<11}"), style::LABEL),
        Span::styled(value, style::DEFAULT),
    ])
}

impl Widget for TrainingStatsDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &TrainingStatsDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let mut paragraph = Paragraph::new(self.text()).style(style::DEFAULT);
        if let Some(block) = &self.block {
            paragraph = paragraph.block(block.clone());
        }
        paragraph.render(area, buf);
    }
}

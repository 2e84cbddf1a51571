use flapga_training::{JUMP_THRESHOLD, NetworkSnapshot};
use ratatui::{
    prelude::{Buffer, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Paragraph, Widget},
};

use crate::ui::widgets::style;

const INPUT_LABELS: [&str; 5] = ["bird_y", "lower_x", "lower_y", "upper_x", "upper_y"];

/// Weights and latest activations of one policy network.
#[derive(Debug)]
pub struct NetworkDisplay<'a> {
    snapshot: Option<&'a NetworkSnapshot>,
    block: Option<Block<'a>>,
}

impl<'a> NetworkDisplay<'a> {
    pub fn new(snapshot: Option<&'a NetworkSnapshot>) -> Self {
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

    fn text(&self) -> Text<'static> {
        let Some(snapshot) = self.snapshot else {
            return Text::from(Line::styled("no living network", style::LABEL));
        };

        let mut lines = vec![Line::styled("Activations", style::HEADING)];
        if let Some(activations) = &snapshot.activations {
            for (label, value) in INPUT_LABELS.iter().zip(activations.input) {
                lines.push(Line::from(vec![
                    Span::styled(format!("{label:>8} "), style::LABEL),
                    Span::styled(format!("{value:8.1}"), style::DEFAULT),
                ]));
            }
            lines.push(value_row("hidden1", &activations.hidden1));
            lines.push(value_row("hidden2", &activations.hidden2));
            let output = activations.output;
            let decision = if output > JUMP_THRESHOLD {
                Span::styled(" JUMP", style::WARNING)
            } else {
                Span::styled(" -", style::LABEL)
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{:>8} ", "output"), style::LABEL),
                Span::styled(format!("{output:6.3}"), style::DEFAULT),
                decision,
            ]));
        } else {
            lines.push(Line::styled("not evaluated yet", style::LABEL));
        }

        let weights = &snapshot.weights;
        lines.push(Line::default());
        lines.push(Line::styled(
            format!("Weights (max |w| {:.2})", weights.max_abs()),
            style::HEADING,
        ));
        for (name, matrix, bias) in [
            ("w1", &weights.w1, &weights.b1),
            ("w2", &weights.w2, &weights.b2),
            ("w3", &weights.w3, &weights.b3),
        ] {
            for (i, (row, b)) in matrix.iter().zip(bias).enumerate() {
                let mut spans = vec![Span::styled(format!("{name}[{i}] "), style::LABEL)];
                spans.extend(row.iter().map(|w| signed_span(*w)));
                spans.push(Span::styled(" | ", style::LABEL));
                spans.push(signed_span(*b));
                lines.push(Line::from(spans));
            }
        }
        Text::from(lines)
    }
}

fn signed_span(value: f64) -> Span<'static> {
    Span::styled(format!("{value:+6.2}"), style::signed(value))
}

fn value_row(label: &str, values: &[f64]) -> Line<'static> {
    let mut spans = vec![Span::styled(format!("{label:>8} "), style::LABEL)];
    spans.extend(values.iter().map(|v| signed_span(*v)));
    Line::from(spans)
}

impl Widget for NetworkDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &NetworkDisplay<'_> {
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

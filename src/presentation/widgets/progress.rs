//! Compile Progress Widget
//!
//! Progress gauge plus the per-package result log for a running batch.

use crate::device::{CompileRun, StepReport};
use crate::presentation::theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Widget},
};

/// Progress display for a compilation batch
pub struct CompileProgress<'a> {
    run: &'a CompileRun,
    log: &'a [StepReport],
}

impl<'a> CompileProgress<'a> {
    #[must_use]
    pub fn new(run: &'a CompileRun, log: &'a [StepReport]) -> Self {
        Self { run, log }
    }

    fn log_items(&self, capacity: usize) -> Vec<ListItem<'a>> {
        let total = self.run.total();
        // Only the tail fits; older lines scroll away.
        let skip = self.log.len().saturating_sub(capacity);
        self.log[skip..]
            .iter()
            .map(|report| {
                let outcome = if report.success {
                    Span::styled("✓ Done", Style::default().fg(Color::Green))
                } else {
                    Span::styled("✗ Failed", Style::default().fg(Color::Red))
                };
                let line = Line::from(vec![
                    Span::styled(
                        format!("[{}/{}] ", report.index + 1, total),
                        Style::default().fg(Color::Cyan),
                    ),
                    Span::raw(report.package.clone()),
                    Span::raw("  "),
                    outcome,
                ]);
                ListItem::new(line)
            })
            .collect()
    }
}

impl Widget for CompileProgress<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let total = self.run.total();
        let completed = self.run.completed();
        let ratio = if total == 0 {
            1.0
        } else {
            completed as f64 / total as f64
        };

        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(" Progress "))
            .gauge_style(Style::default().fg(theme::ACCENT))
            .ratio(ratio)
            .label(format!("{completed}/{total}"));
        gauge.render(chunks[0], buf);

        let capacity = chunks[1].height.saturating_sub(2) as usize;
        let log = List::new(self.log_items(capacity)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Results ")
                .border_style(theme::dim_style()),
        );
        Widget::render(log, chunks[1], buf);
    }
}

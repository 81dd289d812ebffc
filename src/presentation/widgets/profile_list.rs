//! Profile List Widget
//!
//! The eight selectable compilation profiles with one-line descriptions.

use crate::dexopt::CompileState;
use crate::presentation::theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, List, ListItem, ListState, StatefulWidget},
};

/// The profile list widget
pub struct ProfileList<'a> {
    /// Index of the marked profile, if any
    marked: Option<usize>,
    block: Option<Block<'a>>,
}

impl<'a> ProfileList<'a> {
    #[must_use]
    pub fn new(marked: Option<usize>) -> Self {
        Self {
            marked,
            block: None,
        }
    }

    /// Set the block for borders/title
    #[must_use]
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    fn build_items(&self) -> Vec<ListItem<'a>> {
        CompileState::PROFILES
            .iter()
            .enumerate()
            .map(|(idx, profile)| {
                let marker = if self.marked == Some(idx) { "→" } else { " " };
                let line = Line::from(vec![
                    Span::raw(format!("{marker} ")),
                    Span::styled("● ", Style::default().fg(Color::Cyan)),
                    Span::styled(
                        format!("{:<20}", profile.name()),
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(" - "),
                    Span::raw(profile.description()),
                ]);
                ListItem::new(line)
            })
            .collect()
    }
}

impl StatefulWidget for ProfileList<'_> {
    type State = ListState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let items = self.build_items();
        let list = List::new(items).highlight_style(theme::highlight_style());

        let list = if let Some(block) = self.block {
            list.block(block)
        } else {
            list
        };

        StatefulWidget::render(list, area, buf, state);
    }
}

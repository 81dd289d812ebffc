//! Theme
//!
//! Fixed Flexoki-derived palette. Per-status colors match the dexopt
//! vocabulary: the mapping state -> color is total, like state -> group.

use crate::dexopt::{CompileState, OptGroup};
use ratatui::style::{Color, Modifier, Style};

/// Flexoki dark background
pub const BG_DARK: Color = Color::Rgb(0x1c, 0x1b, 0x19);
/// Secondary text
pub const TEXT_SECONDARY: Color = Color::Rgb(0x6f, 0x6e, 0x69);
/// Accent used for group headers and borders
pub const ACCENT: Color = Color::Rgb(0x06, 0xb6, 0xd4);

/// Display color for a compilation state
pub fn status_color(state: CompileState) -> Color {
    match state {
        CompileState::Everything | CompileState::EverythingProfile => Color::LightGreen,
        CompileState::Speed | CompileState::SpeedProfile => Color::Cyan,
        CompileState::Space | CompileState::SpaceProfile => Color::Magenta,
        CompileState::Verify | CompileState::Quicken => Color::Blue,
        CompileState::Extract => Color::Yellow,
        CompileState::Unknown => Color::Red,
    }
}

/// Style for a severity group header row
pub fn group_header_style(_group: OptGroup) -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

/// Style for screen titles
pub fn title_style() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

/// Style for dim helper text
pub fn dim_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Style for the highlighted list row
pub fn highlight_style() -> Style {
    Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD)
}

/// Border style for focused panes
pub fn border_style() -> Style {
    Style::default().fg(ACCENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_color_table() {
        let cases = [
            (CompileState::Everything, Color::LightGreen),
            (CompileState::EverythingProfile, Color::LightGreen),
            (CompileState::Speed, Color::Cyan),
            (CompileState::SpeedProfile, Color::Cyan),
            (CompileState::Space, Color::Magenta),
            (CompileState::SpaceProfile, Color::Magenta),
            (CompileState::Verify, Color::Blue),
            (CompileState::Quicken, Color::Blue),
            (CompileState::Extract, Color::Yellow),
            (CompileState::Unknown, Color::Red),
        ];
        for (state, color) in cases {
            assert_eq!(status_color(state), color, "color for {:?}", state);
        }
    }

    #[test]
    fn test_profile_pairs_share_color() {
        assert_eq!(
            status_color(CompileState::Speed),
            status_color(CompileState::SpeedProfile)
        );
        assert_eq!(
            status_color(CompileState::Everything),
            status_color(CompileState::EverythingProfile)
        );
    }
}

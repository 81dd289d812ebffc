//! Application screens and event loop
//!
//! The four-screen workflow: select packages, pick a profile, watch the
//! batch run, review the summary. The loop is synchronous: draw, then
//! either step the running batch or poll for input. Compilation commands
//! never overlap: one `execute` at a time, one package per draw cycle.

use crate::config::AppConfig;
use crate::device::{self, CompileRun, StepReport};
use crate::dexopt::{CompileState, PackageRecord};
use crate::error::Result;
use crate::presentation::theme;
use crate::presentation::tui::Tui;
use crate::presentation::widgets::{
    visible_rows, CompileProgress, PackageList, PackageRow, ProfileList, StatusBar,
};
use crate::shell::ShellSession;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, ListState, Paragraph},
    Frame,
};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{error, info};

const REBOOT_NOTICE: &str = "\
The device needs to be REBOOTED to fix the scoped storage
permissions for the optimized apps.

Without rebooting, the apps may have broken storage access.

The optimizations will persist across reboots.";

/// Package selection screen state
struct PackagesScreen {
    filter: String,
    cursor: usize,
    list_state: ListState,
}

impl PackagesScreen {
    fn new() -> Self {
        Self {
            filter: String::new(),
            cursor: 0,
            list_state: ListState::default(),
        }
    }
}

/// Profile selection screen state
struct ProfilesScreen {
    cursor: usize,
    marked: Option<usize>,
    list_state: ListState,
}

impl ProfilesScreen {
    fn new() -> Self {
        Self {
            cursor: 0,
            marked: None,
            list_state: ListState::default(),
        }
    }
}

/// Running batch screen state
struct ProgressScreen {
    run: CompileRun,
    log: Vec<StepReport>,
}

/// End-of-run summary screen state
struct SummaryScreen {
    succeeded: usize,
    failed: usize,
}

enum Screen {
    Packages(PackagesScreen),
    Profiles(ProfilesScreen),
    Progress(ProgressScreen),
    Summary(SummaryScreen),
}

/// Cross-cutting actions a key handler can request
enum AppCommand {
    None,
    Quit,
    Rescan,
    ConfirmSelection,
    BackToPackages,
    StartRun(CompileState),
    OptimizeMore,
    Reboot,
}

/// Main application runner
pub struct App {
    config: AppConfig,
    session: ShellSession,
    screen: Screen,
    records: Vec<PackageRecord>,
    selected: BTreeSet<String>,
    status_message: Option<String>,
    should_quit: bool,
}

impl App {
    #[must_use]
    pub fn new(config: AppConfig, session: ShellSession) -> Self {
        Self {
            config,
            session,
            screen: Screen::Packages(PackagesScreen::new()),
            records: Vec::new(),
            selected: BTreeSet::new(),
            status_message: None,
            should_quit: false,
        }
    }

    /// Give the session back for a graceful close
    #[must_use]
    pub fn into_session(self) -> ShellSession {
        self.session
    }

    /// Run the main event loop
    pub fn run(&mut self, terminal: &mut Tui) -> Result<()> {
        self.rescan();

        while !self.should_quit {
            terminal.draw(|frame| self.render(frame))?;

            // Step the running batch between draws, one package at a time.
            let mut finished = None;
            if let Screen::Progress(progress) = &mut self.screen {
                if progress.run.is_finished() {
                    finished = Some((progress.run.succeeded(), progress.run.failed()));
                } else if let Some(report) = progress.run.step(&mut self.session) {
                    progress.log.push(report);
                }
            }
            if let Some((succeeded, failed)) = finished {
                info!(succeeded, failed, "compilation batch finished");
                self.screen = Screen::Summary(SummaryScreen { succeeded, failed });
            }

            self.handle_events()?;
        }

        info!("exiting");
        Ok(())
    }

    fn rescan(&mut self) {
        self.status_message = None;
        match device::scan_packages(&mut self.session) {
            Ok(records) => {
                self.records = records;
            }
            Err(e) => {
                error!(error = %e, "package scan failed");
                self.records.clear();
                self.status_message = Some(format!("Error fetching packages: {e}"));
            }
        }
        self.selected
            .retain(|package| self.records.iter().any(|r| &r.package == package));
    }

    fn handle_events(&mut self) -> Result<()> {
        // A batch in flight cannot be cancelled; just drain input.
        let poll_timeout = if matches!(&self.screen, Screen::Progress(p) if !p.run.is_finished()) {
            Duration::ZERO
        } else {
            self.config.tui.tick_rate()
        };

        if !event::poll(poll_timeout)? {
            return Ok(());
        }
        let Event::Key(key) = event::read()? else {
            return Ok(());
        };
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        let command = match &mut self.screen {
            Screen::Packages(screen) => {
                Self::packages_key(screen, &mut self.selected, &self.records, key)
            }
            Screen::Profiles(screen) => Self::profiles_key(screen, key),
            Screen::Progress(_) => AppCommand::None,
            Screen::Summary(_) => Self::summary_key(key),
        };
        self.apply(command);
        Ok(())
    }

    fn apply(&mut self, command: AppCommand) {
        match command {
            AppCommand::None => {}
            AppCommand::Quit => self.should_quit = true,
            AppCommand::Rescan => self.rescan(),
            AppCommand::ConfirmSelection => {
                if !self.selected.is_empty() {
                    self.screen = Screen::Profiles(ProfilesScreen::new());
                }
            }
            AppCommand::BackToPackages => {
                self.screen = Screen::Packages(PackagesScreen::new());
            }
            AppCommand::StartRun(profile) => {
                // Batch order follows the display order of the selection.
                let packages: Vec<String> = self
                    .records
                    .iter()
                    .filter(|r| self.selected.contains(&r.package))
                    .map(|r| r.package.clone())
                    .collect();
                info!(
                    profile = profile.name(),
                    count = packages.len(),
                    "starting compilation batch"
                );
                self.screen = Screen::Progress(ProgressScreen {
                    run: CompileRun::new(profile, packages),
                    log: Vec::new(),
                });
            }
            AppCommand::OptimizeMore => {
                self.selected.clear();
                self.rescan();
                self.screen = Screen::Packages(PackagesScreen::new());
            }
            AppCommand::Reboot => {
                device::reboot(&mut self.session);
                self.should_quit = true;
            }
        }
    }

    fn packages_key(
        screen: &mut PackagesScreen,
        selected: &mut BTreeSet<String>,
        records: &[PackageRecord],
        key: KeyEvent,
    ) -> AppCommand {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let rows = visible_rows(records, &screen.filter);

        match key.code {
            KeyCode::Esc => return AppCommand::Quit,
            KeyCode::Enter => return AppCommand::ConfirmSelection,
            KeyCode::Char('a') if ctrl => {
                for row in &rows {
                    if let Some(package) = row.package() {
                        selected.insert(package.to_string());
                    }
                }
            }
            KeyCode::Char('d') if ctrl => selected.clear(),
            KeyCode::Char('r') if ctrl => return AppCommand::Rescan,
            KeyCode::Up => screen.cursor = screen.cursor.saturating_sub(1),
            KeyCode::Down => {
                screen.cursor = (screen.cursor + 1).min(rows.len().saturating_sub(1));
            }
            KeyCode::Char(' ') => {
                if let Some(PackageRow::Package(record)) = rows.get(screen.cursor) {
                    if !selected.remove(&record.package) {
                        selected.insert(record.package.clone());
                    }
                }
            }
            KeyCode::Backspace => {
                screen.filter.pop();
                screen.cursor = 0;
            }
            KeyCode::Char(c) if !ctrl => {
                screen.filter.push(c);
                screen.cursor = 0;
            }
            _ => {}
        }
        AppCommand::None
    }

    fn profiles_key(screen: &mut ProfilesScreen, key: KeyEvent) -> AppCommand {
        let last = CompileState::PROFILES.len() - 1;
        match key.code {
            KeyCode::Esc => return AppCommand::BackToPackages,
            KeyCode::Up => screen.cursor = screen.cursor.saturating_sub(1),
            KeyCode::Down => screen.cursor = (screen.cursor + 1).min(last),
            KeyCode::Char(' ') => screen.marked = Some(screen.cursor),
            KeyCode::Enter => {
                let idx = screen.marked.unwrap_or(screen.cursor);
                return AppCommand::StartRun(CompileState::PROFILES[idx]);
            }
            _ => {}
        }
        AppCommand::None
    }

    fn summary_key(key: KeyEvent) -> AppCommand {
        match key.code {
            KeyCode::Char('o') | KeyCode::Char('O') => AppCommand::OptimizeMore,
            KeyCode::Char('r') | KeyCode::Char('R') => AppCommand::Reboot,
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc | KeyCode::Enter => {
                AppCommand::Quit
            }
            _ => AppCommand::None,
        }
    }

    fn render(&mut self, frame: &mut Frame) {
        match &mut self.screen {
            Screen::Packages(screen) => Self::render_packages(
                frame,
                screen,
                &self.records,
                &self.selected,
                self.status_message.as_deref(),
            ),
            Screen::Profiles(screen) => Self::render_profiles(frame, screen, self.selected.len()),
            Screen::Progress(screen) => Self::render_progress(frame, screen),
            Screen::Summary(screen) => Self::render_summary(frame, screen),
        }
    }

    fn render_packages(
        frame: &mut Frame,
        screen: &mut PackagesScreen,
        records: &[PackageRecord],
        selected: &BTreeSet<String>,
        status_message: Option<&str>,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(frame.area());

        let title = Paragraph::new(vec![
            Line::from(Span::styled("Select Apps to Optimize", theme::title_style())),
            Line::from(Span::styled(
                "Type to filter - Space toggles the highlighted app",
                theme::dim_style(),
            )),
        ]);
        frame.render_widget(title, chunks[0]);

        let search = Paragraph::new(screen.filter.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Search ")
                .border_style(theme::border_style()),
        );
        frame.render_widget(search, chunks[1]);

        let rows = visible_rows(records, &screen.filter);
        screen.cursor = screen.cursor.min(rows.len().saturating_sub(1));
        if rows.is_empty() {
            screen.list_state.select(None);
            let empty = Paragraph::new(Span::styled("No apps found", theme::dim_style()))
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(empty, chunks[2]);
        } else {
            screen.list_state.select(Some(screen.cursor));
            let list = PackageList::new(&rows, selected)
                .block(Block::default().borders(Borders::ALL).title(format!(
                    " Apps ({} selected) ",
                    selected.len()
                )));
            frame.render_stateful_widget(list, chunks[2], &mut screen.list_state);
        }

        let hints = [
            ("Space", "Toggle"),
            ("Enter", "Confirm"),
            ("^A", "All"),
            ("^D", "None"),
            ("^R", "Rescan"),
            ("Esc", "Quit"),
        ];
        let mut status_bar = StatusBar::new(&hints);
        if let Some(message) = status_message {
            status_bar = status_bar.message(message);
        }
        frame.render_widget(status_bar, chunks[3]);
    }

    fn render_profiles(frame: &mut Frame, screen: &mut ProfilesScreen, selected_count: usize) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(frame.area());

        let title = Paragraph::new(vec![
            Line::from(Span::styled(
                "Select Optimization Profile",
                theme::title_style(),
            )),
            Line::from(Span::styled(
                format!("{selected_count} app(s) selected"),
                theme::dim_style(),
            )),
        ]);
        frame.render_widget(title, chunks[0]);

        screen.list_state.select(Some(screen.cursor));
        let list = ProfileList::new(screen.marked).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Profiles ")
                .border_style(theme::border_style()),
        );
        frame.render_stateful_widget(list, chunks[1], &mut screen.list_state);

        let hints = [("Space", "Mark"), ("Enter", "Start"), ("Esc", "Back")];
        frame.render_widget(StatusBar::new(&hints), chunks[2]);
    }

    fn render_progress(frame: &mut Frame, screen: &ProgressScreen) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(frame.area());

        let title = Paragraph::new(vec![
            Line::from(Span::styled(
                format!(
                    "Optimizing {} Apps with Profile: {}",
                    screen.run.total(),
                    screen.run.profile().name()
                ),
                theme::title_style(),
            )),
            Line::from(Span::styled(
                Self::progress_status_line(screen),
                theme::dim_style(),
            )),
        ]);
        frame.render_widget(title, chunks[0]);

        frame.render_widget(CompileProgress::new(&screen.run, &screen.log), chunks[1]);

        frame.render_widget(
            StatusBar::new(&[]).message("Compiling, please wait"),
            chunks[2],
        );
    }

    fn progress_status_line(screen: &ProgressScreen) -> String {
        if screen.run.is_finished() {
            return "Optimization complete! Loading results...".to_string();
        }
        match screen.run.packages().get(screen.run.completed()) {
            Some(package) => format!(
                "Processing {}/{}: {}",
                screen.run.completed() + 1,
                screen.run.total(),
                package
            ),
            None => "Starting optimization...".to_string(),
        }
    }

    fn render_summary(frame: &mut Frame, screen: &SummaryScreen) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(frame.area());

        let title = Paragraph::new(Line::from(Span::styled(
            "Optimization Complete",
            theme::title_style(),
        )));
        frame.render_widget(title, chunks[0]);

        let mut lines = vec![Line::from(Span::styled(
            format!("✓ Successfully optimized: {} app(s)", screen.succeeded),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ))];
        if screen.failed > 0 {
            lines.push(Line::from(Span::styled(
                format!("✗ Failed to optimize: {} app(s)", screen.failed),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )));
        }
        lines.push(Line::from(""));
        for notice_line in REBOOT_NOTICE.lines() {
            lines.push(Line::from(Span::styled(
                notice_line,
                Style::default().fg(Color::Yellow),
            )));
        }

        let summary = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Summary ")
                .border_style(theme::border_style()),
        );
        frame.render_widget(summary, chunks[1]);

        let hints = [
            ("O", "Optimize More"),
            ("R", "Reboot Device"),
            ("Q", "Exit"),
        ];
        frame.render_widget(StatusBar::new(&hints), chunks[2]);
    }
}

/// Render-free helpers exercised by tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reboot_notice_mentions_scoped_storage() {
        assert!(REBOOT_NOTICE.contains("REBOOTED"));
        assert!(REBOOT_NOTICE.contains("scoped storage"));
    }
}

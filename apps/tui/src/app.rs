//! Core TUI application state and event loop.

use std::io;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};
use tokio::runtime::{Handle, Runtime};
use tracing::warn;
use transcoder_shared::{AppConfig, load_config};

use crate::screens::{Screen, ScreenId};
use crate::widgets::status_bar;

/// Application state.
pub(crate) struct App {
    /// Currently active screen tab.
    pub active_tab: usize,
    /// Available screens.
    pub screens: Vec<ScreenId>,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Status message shown in bottom bar.
    pub status: String,
    /// Whether help overlay is visible.
    pub show_help: bool,
    /// Per-screen state.
    pub screen_states: Vec<Screen>,
}

impl App {
    pub(crate) fn new(runtime: &Handle, config: &AppConfig) -> Self {
        let screens = vec![ScreenId::Code, ScreenId::Legend];
        let screen_states = screens
            .iter()
            .map(|s| Screen::new(*s, runtime, config))
            .collect();

        Self {
            active_tab: 0,
            screens,
            should_quit: false,
            status: "Ready. Press ? for help".to_string(),
            show_help: false,
            screen_states,
        }
    }

    fn select_tab(&mut self, idx: usize) {
        self.active_tab = idx;
        self.status = format!("{}", self.screens[idx]);
    }

    fn current_screen(&self) -> &Screen {
        &self.screen_states[self.active_tab]
    }

    fn current_screen_mut(&mut self) -> &mut Screen {
        &mut self.screen_states[self.active_tab]
    }
}

/// Entry point: sets up the worker runtime and terminal, runs the event
/// loop, restores the terminal.
pub(crate) fn run() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let (config, config_error) = match load_config() {
        Ok(config) => (config, None),
        Err(e) => {
            warn!(error = %e, "falling back to default config");
            (AppConfig::default(), Some(e.to_string()))
        }
    };

    // Setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, &runtime, &config, config_error);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    runtime: &Runtime,
    config: &AppConfig,
    config_error: Option<String>,
) -> Result<()> {
    let mut app = App::new(runtime.handle(), config);
    if let Some(message) = config_error {
        app.status = format!("Config error, using defaults: {message}");
    }

    loop {
        for screen in &mut app.screen_states {
            screen.tick();
        }

        terminal.draw(|f| draw(f, &app))?;

        // Poll for events with 100ms timeout for responsive UI
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                handle_key(&mut app, key.code, key.modifiers);
            }
        }

        if app.should_quit {
            break;
        }
    }

    for screen in &mut app.screen_states {
        screen.shutdown();
    }

    Ok(())
}

fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    // Global keybindings (always active)
    match code {
        KeyCode::Char('q') | KeyCode::Char('c')
            if modifiers.contains(KeyModifiers::CONTROL) =>
        {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('q') if !app.current_screen().is_editing() => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('?') if !app.current_screen().is_editing() => {
            app.show_help = !app.show_help;
            return;
        }
        KeyCode::Esc if app.show_help => {
            app.show_help = false;
            return;
        }
        // Screen navigation with number keys and arrows; Tab belongs to
        // the screens' own fields.
        KeyCode::Char(c @ '1'..='9') if !app.current_screen().is_editing() => {
            let idx = (c as usize) - ('1' as usize);
            if idx < app.screens.len() {
                app.select_tab(idx);
            }
            return;
        }
        KeyCode::Right if !app.current_screen().is_editing() => {
            app.select_tab((app.active_tab + 1) % app.screens.len());
            return;
        }
        KeyCode::Left if !app.current_screen().is_editing() => {
            let idx = if app.active_tab == 0 {
                app.screens.len() - 1
            } else {
                app.active_tab - 1
            };
            app.select_tab(idx);
            return;
        }
        _ => {}
    }

    // If help is showing, consume any key to dismiss
    if app.show_help {
        app.show_help = false;
        return;
    }

    // Delegate to current screen
    app.current_screen_mut().handle_key(code, modifiers);
}

fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Tab bar
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    // Tab bar
    let tab_titles: Vec<Line> = app
        .screens
        .iter()
        .map(|s| Line::from(format!("{s}")))
        .collect();

    let tabs = Tabs::new(tab_titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Transcoder "),
        )
        .select(app.active_tab)
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .divider(" │ ");

    f.render_widget(tabs, chunks[0]);

    // Content area, delegated to screen
    app.current_screen().draw(f, chunks[1]);

    // Status bar
    let bar = status_bar(&app.status);
    f.render_widget(bar, chunks[2]);

    // Help overlay
    if app.show_help {
        draw_help_overlay(f);
    }
}

fn draw_help_overlay(f: &mut Frame) {
    let area = centered_rect(60, 60, f.area());

    let help_text = vec![
        Line::from("Keybindings").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from(""),
        Line::from("  1-2          Switch to screen"),
        Line::from("  ←/→          Previous/next screen"),
        Line::from("  ?            Toggle this help"),
        Line::from("  q / Ctrl-C   Quit"),
        Line::from(""),
        Line::from("Code screen:").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from("  Tab / ↑↓     Move between fields"),
        Line::from("  Enter        Edit field / Process"),
        Line::from("  Esc          Stop editing"),
        Line::from("  Ctrl-R       Process transcript"),
        Line::from(""),
        Line::from("Legend screen:").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from("  ↑/↓          Select category"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help (press any key to close) ")
                .style(Style::default().bg(Color::DarkGray)),
        )
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));

    // Clear background
    f.render_widget(ratatui::widgets::Clear, area);
    f.render_widget(help, area);
}

/// Create a centered rectangle with percentage width and height.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(runtime: &Runtime) -> App {
        App::new(runtime.handle(), &AppConfig::default())
    }

    #[test]
    fn number_keys_and_arrows_switch_screens() {
        let rt = Runtime::new().unwrap();
        let mut app = app(&rt);

        handle_key(&mut app, KeyCode::Char('2'), KeyModifiers::NONE);
        assert_eq!(app.screens[app.active_tab], ScreenId::Legend);

        handle_key(&mut app, KeyCode::Right, KeyModifiers::NONE);
        assert_eq!(app.screens[app.active_tab], ScreenId::Code);

        handle_key(&mut app, KeyCode::Left, KeyModifiers::NONE);
        assert_eq!(app.screens[app.active_tab], ScreenId::Legend);
    }

    #[test]
    fn q_types_into_field_while_editing() {
        let rt = Runtime::new().unwrap();
        let mut app = app(&rt);

        handle_key(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert!(app.current_screen().is_editing());
        handle_key(&mut app, KeyCode::Char('q'), KeyModifiers::NONE);
        assert!(!app.should_quit);

        handle_key(&mut app, KeyCode::Esc, KeyModifiers::NONE);
        handle_key(&mut app, KeyCode::Char('q'), KeyModifiers::NONE);
        assert!(app.should_quit);
    }
}

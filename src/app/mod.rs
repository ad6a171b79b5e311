use std::io::Stdout;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::config::AppConfig;
use crate::storage::RecordStore;
use crate::ui;

pub mod form;
pub mod input;
pub mod state;

pub use state::{FormField, IdentityField, SessionState, StatusKind, View};

pub struct App {
    pub config: Arc<AppConfig>,
    pub store: RecordStore,
    state: SessionState,
    should_quit: bool,
    tick_rate: Duration,
}

impl App {
    pub fn new(config: Arc<AppConfig>, store: RecordStore) -> Self {
        let state = SessionState::new(&config);
        let tick_rate = Duration::from_millis(config.tick_rate_ms.max(50));
        Self {
            config,
            store,
            state,
            should_quit: false,
            tick_rate,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let mut terminal = setup_terminal()?;
        let result = self.event_loop(&mut terminal);
        restore_terminal(&mut terminal)?;
        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            terminal
                .draw(|frame| ui::draw_app(frame, &self.state))
                .context("rendering frame")?;

            if self.should_quit {
                break;
            }

            if event::poll(self.tick_rate).context("polling for terminal events")? {
                match event::read().context("reading terminal event")? {
                    Event::Key(key) => self.handle_key(key)?,
                    Event::Resize(_, _) => {
                        // no-op: next draw adapts to the new size
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Maps one key press onto a session-state transition. Storage errors
    /// propagate and end the session; validation stays inline.
    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return Ok(());
        }

        match key.code {
            KeyCode::Tab => {
                match self.state.view {
                    View::Identify => self.state.toggle_identity_focus(),
                    View::Main => self.state.cycle_form_focus(),
                }
                return Ok(());
            }
            KeyCode::Esc => {
                match self.state.view {
                    View::Identify => self.should_quit = true,
                    View::Main => self.state.return_to_identify(),
                }
                return Ok(());
            }
            KeyCode::Enter => {
                return match self.state.view {
                    View::Identify => self.state.submit_identity(&self.store),
                    View::Main if self.state.form_focus == FormField::Notes => {
                        if let Some(input) = self.state.active_input_mut() {
                            input.insert_newline();
                        }
                        Ok(())
                    }
                    View::Main => self.state.submit_record(&self.store),
                };
            }
            KeyCode::Char('s')
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    && self.state.view == View::Main =>
            {
                return self.state.submit_record(&self.store);
            }
            _ => {}
        }

        if self.choice_field_focused() {
            match key.code {
                KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') => {
                    let forward = key.code != KeyCode::Left;
                    match self.state.view {
                        View::Identify => self.state.toggle_sex(),
                        View::Main => self.state.cycle_category(forward),
                    }
                }
                _ => {}
            }
            return Ok(());
        }

        let mut edited = false;
        if let Some(input) = self.state.active_input_mut() {
            match key.code {
                KeyCode::Char(ch)
                    if !key.modifiers.intersects(
                        KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER,
                    ) =>
                {
                    input.insert_char(ch);
                    edited = true;
                }
                KeyCode::Backspace => edited = input.backspace(),
                KeyCode::Delete => edited = input.delete(),
                KeyCode::Left => {
                    input.move_left();
                }
                KeyCode::Right => {
                    input.move_right();
                }
                KeyCode::Home => input.move_home(),
                KeyCode::End => input.move_end(),
                _ => {}
            }
        }
        if edited {
            // typing dismisses any transient validation message
            self.state.clear_status();
        }
        Ok(())
    }

    fn choice_field_focused(&self) -> bool {
        match self.state.view {
            View::Identify => self.state.identity_focus == IdentityField::Sex,
            View::Main => self.state.form_focus == FormField::Category,
        }
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen).context("switching to alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("creating terminal backend")?;
    terminal.hide_cursor().context("hiding cursor")?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    terminal.show_cursor().ok();
    disable_raw_mode().context("disabling raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen).context("restoring screen state")?;
    Ok(())
}

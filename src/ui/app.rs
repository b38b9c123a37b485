//! Main TUI application state and logic

use crate::debugger::{DebugError, Session};
use crate::ui::panes::{self, ListingScrollState, StatusRenderData};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use rustc_hash::FxHashMap;
use std::io;
use std::time::{Duration, Instant};

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Listing,
    Console,
    Registers,
    Memory,
}

impl FocusedPane {
    /// Move focus to the next pane (clockwise: listing -> console -> registers -> memory)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Listing => FocusedPane::Console,
            FocusedPane::Console => FocusedPane::Registers,
            FocusedPane::Registers => FocusedPane::Memory,
            FocusedPane::Memory => FocusedPane::Listing,
        }
    }

    /// Move focus to the previous pane (counter-clockwise)
    pub fn prev(self) -> Self {
        match self {
            FocusedPane::Listing => FocusedPane::Memory,
            FocusedPane::Console => FocusedPane::Listing,
            FocusedPane::Registers => FocusedPane::Console,
            FocusedPane::Memory => FocusedPane::Registers,
        }
    }
}

/// The main application state
pub struct App {
    /// Recorded execution being browsed
    pub session: Session,

    /// Currently focused pane
    pub focused_pane: FocusedPane,

    /// Per-pane scroll state
    pub listing_scroll: ListingScrollState,
    pub memory_scroll: usize,
    pub console_scroll: usize,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,

    /// Whether auto-play mode is active
    pub is_playing: bool,

    /// Last time a step was taken in play mode
    pub last_play_time: Instant,

    /// Last time space was pressed (for debouncing)
    pub last_space_press: Instant,

    /// Whether keystrokes are being collected as program input
    pub input_mode: bool,

    /// Digits typed so far in input mode
    pub input_buffer: String,
}

impl App {
    /// Create a new app browsing `session`
    pub fn new(session: Session) -> Self {
        let status_message = match session.fault() {
            Some(fault) => format!("Program faulted: {}", fault),
            None if session.truncated().is_some() => {
                "History truncated: snapshot memory limit reached".to_string()
            }
            None if session.is_awaiting_input() => {
                "Ready! Program is waiting for input (i)".to_string()
            }
            None => String::from("Ready!"),
        };

        App {
            session,
            focused_pane: FocusedPane::Listing,
            listing_scroll: ListingScrollState::default(),
            memory_scroll: 0,
            console_scroll: 0,
            should_quit: false,
            status_message,
            is_playing: false,
            last_play_time: Instant::now(),
            last_space_press: Instant::now()
                .checked_sub(Duration::from_secs(1))
                .unwrap_or(Instant::now()),
            input_mode: false,
            input_buffer: String::new(),
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if self.is_playing && self.last_play_time.elapsed() >= Duration::from_secs(1) {
                if self.session.step_forward().is_ok() {
                    self.status_message = "Playing...".to_string();
                    self.console_scroll = usize::MAX;
                } else {
                    self.is_playing = false;
                    self.status_message = "Playback complete".to_string();
                }
                self.last_play_time = Instant::now();
            }

            // Use poll with timeout to allow auto-play to work
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // 4 panes in 2 columns, plus status bar at bottom
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(main_chunks[0]);

        // Left column: Listing (top) | Console (bottom)
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(columns[0]);

        // Right column: Registers (top) | Memory (bottom)
        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(14), Constraint::Min(0)])
            .split(columns[1]);

        let Some(snapshot) = self.session.current() else {
            return;
        };
        let changed = self
            .session
            .previous()
            .map(|prev| snapshot.changed_addresses(prev))
            .unwrap_or_else(FxHashMap::default);

        panes::render_listing_pane(
            frame,
            left_rows[0],
            snapshot,
            self.focused_pane == FocusedPane::Listing,
            &mut self.listing_scroll,
        );

        let input_buffer = self.input_mode.then_some(self.input_buffer.as_str());
        panes::render_console_pane(
            frame,
            left_rows[1],
            &snapshot.console,
            input_buffer,
            self.focused_pane == FocusedPane::Console,
            &mut self.console_scroll,
        );

        panes::render_registers_pane(
            frame,
            right_rows[0],
            snapshot,
            self.focused_pane == FocusedPane::Registers,
        );

        panes::render_memory_pane(
            frame,
            right_rows[1],
            snapshot,
            &changed,
            self.focused_pane == FocusedPane::Memory,
            &mut self.memory_scroll,
        );

        panes::render_status_bar(
            frame,
            main_chunks[1],
            StatusRenderData {
                message: &self.status_message,
                current_step: self.session.history_position(),
                total_steps: self.session.total_snapshots(),
                has_fault: snapshot.fault.is_some(),
                is_playing: self.is_playing,
                awaiting_input: self.session.is_awaiting_input(),
                is_input_mode: self.input_mode,
            },
        );
    }

    /// Handle keyboard events
    fn handle_key_event(&mut self, key: KeyEvent) {
        if self.input_mode {
            self.handle_input_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            // Number keys step forward N times directly
            KeyCode::Char(c @ '1'..='9') => {
                self.is_playing = false;
                let n = c.to_digit(10).unwrap_or(1) as usize;
                let mut stepped = 0;
                for _ in 0..n {
                    if self.session.step_forward().is_ok() {
                        stepped += 1;
                    } else {
                        break;
                    }
                }
                self.status_message = format!("Stepped forward {} step(s)", stepped);
                self.console_scroll = usize::MAX;
            }
            KeyCode::Char('i') | KeyCode::Char('I') => {
                self.is_playing = false;
                if self.session.is_awaiting_input() && self.session.is_at_end() {
                    self.input_mode = true;
                    self.input_buffer.clear();
                    self.focused_pane = FocusedPane::Console;
                    self.status_message = "Enter a value".to_string();
                } else if self.session.is_awaiting_input() {
                    self.status_message = "Jump to the end (Enter) to provide input".to_string();
                } else {
                    self.status_message = "Program is not waiting for input".to_string();
                }
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::BackTab => {
                self.focused_pane = self.focused_pane.prev();
            }
            KeyCode::Left => {
                self.is_playing = false;
                self.step_backward();
            }
            KeyCode::Right => {
                self.is_playing = false;
                self.step_forward();
            }
            KeyCode::Up => match self.focused_pane {
                FocusedPane::Listing => {
                    // Scrolling up makes the current line move down visually
                    if let Some(row) = self.listing_scroll.target_line_row {
                        self.listing_scroll.target_line_row = Some(row.saturating_add(1));
                    }
                }
                FocusedPane::Memory => {
                    self.memory_scroll = self.memory_scroll.saturating_sub(1);
                }
                FocusedPane::Console => {
                    self.console_scroll = self.console_scroll.saturating_sub(1);
                }
                FocusedPane::Registers => {}
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Listing => {
                    if let Some(row) = self.listing_scroll.target_line_row {
                        self.listing_scroll.target_line_row = Some(row.saturating_sub(1));
                    }
                }
                FocusedPane::Memory => {
                    self.memory_scroll = self.memory_scroll.saturating_add(1);
                }
                FocusedPane::Console => {
                    self.console_scroll = self.console_scroll.saturating_add(1);
                }
                FocusedPane::Registers => {}
            },
            KeyCode::Char(' ') => {
                // 200ms debounce against key repeat
                if self.last_space_press.elapsed() >= Duration::from_millis(200) {
                    self.last_space_press = Instant::now();
                    self.is_playing = !self.is_playing;
                    if self.is_playing {
                        self.last_play_time = Instant::now()
                            .checked_sub(Duration::from_secs(1))
                            .unwrap_or(Instant::now());
                        self.status_message = "Playing...".to_string();
                    } else {
                        self.status_message = "Paused".to_string();
                    }
                }
            }
            KeyCode::Enter => {
                self.is_playing = false;
                self.session.jump_to_end();
                self.status_message = "Jumped to end".to_string();
                self.console_scroll = usize::MAX;
            }
            KeyCode::Backspace => {
                self.is_playing = false;
                self.session.rewind_to_start();
                self.status_message = "Jumped to start".to_string();
                self.console_scroll = usize::MAX;
            }
            _ => {}
        }
    }

    /// Keys while typing a value for the program
    fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = false;
                self.input_buffer.clear();
                self.status_message = "Input cancelled".to_string();
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            KeyCode::Char(c @ '0'..='9') => self.input_buffer.push(c),
            KeyCode::Char('-') if self.input_buffer.is_empty() => self.input_buffer.push('-'),
            KeyCode::Enter => self.submit_input(),
            _ => {}
        }
    }

    fn submit_input(&mut self) {
        let value = match self.input_buffer.parse::<i64>() {
            Ok(value) => value,
            Err(_) => {
                self.status_message = format!("Not a number: '{}'", self.input_buffer);
                return;
            }
        };

        self.input_mode = false;
        self.input_buffer.clear();
        self.console_scroll = usize::MAX;

        self.status_message = match self.session.provide_input(value) {
            Ok(()) if self.session.is_awaiting_input() => {
                format!("Sent {}; waiting for more input", value)
            }
            Ok(()) => format!("Sent {}; program halted", value),
            Err(DebugError::Fault(fault)) => format!("Program faulted: {}", fault),
            Err(DebugError::SnapshotLimit(_)) => {
                "History truncated: snapshot memory limit reached".to_string()
            }
            Err(err) => format!("Cannot send input: {}", err),
        };
    }

    /// Step forward in history
    fn step_forward(&mut self) {
        match self.session.step_forward() {
            Ok(()) => {
                self.status_message = "Stepped forward".to_string();
                self.console_scroll = usize::MAX;
            }
            Err(DebugError::AtEnd) if self.session.is_awaiting_input() => {
                self.status_message = "Program is waiting for input (i)".to_string();
            }
            Err(e) => {
                self.status_message = format!("Cannot step forward: {}", e);
            }
        }
    }

    /// Step backward in history
    fn step_backward(&mut self) {
        match self.session.step_backward() {
            Ok(()) => {
                self.status_message = "Stepped backward".to_string();
                self.console_scroll = usize::MAX;
            }
            Err(e) => {
                self.status_message = format!("Cannot step backward: {}", e);
            }
        }
    }
}

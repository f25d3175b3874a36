//! Terminal User Interface (TUI) for tempmon
//!
//! Interactive dashboard driven by [`Monitor::run`]: the poll loop hands each
//! snapshot to [`TerminalRenderer`], which draws it with ratatui and handles
//! key presses while waiting for the next tick.

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use crate::config::GeneralConfig;
use crate::error::{Error, Result};
use crate::hwmon::Sensor;
use crate::monitor::{Monitor, Renderer};
use crate::shutdown::ShutdownToken;
use crate::stats::SystemStats;

mod app;
mod ui;

pub use app::{celsius_to_fahrenheit, Action, App};

/// Upper bound on how long input polling blocks, so cancellation from a
/// signal is noticed promptly
const INPUT_POLL: Duration = Duration::from_millis(250);

fn terminal_error(e: io::Error) -> Error {
    Error::Terminal(e.to_string())
}

/// Full-screen renderer. The terminal is restored when it is dropped.
pub struct TerminalRenderer {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    app: App,
}

impl TerminalRenderer {
    /// Enter raw mode and the alternate screen
    pub fn new(general: &GeneralConfig, refresh_interval: Duration) -> Result<Self> {
        enable_raw_mode().map_err(terminal_error)?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(terminal_error(e));
        }

        let backend = CrosstermBackend::new(stdout);
        let terminal = match Terminal::new(backend) {
            Ok(terminal) => terminal,
            Err(e) => {
                let _ = execute!(io::stdout(), LeaveAlternateScreen);
                let _ = disable_raw_mode();
                return Err(terminal_error(e));
            }
        };

        Ok(Self {
            terminal,
            app: App::new(general, refresh_interval),
        })
    }

    fn draw(&mut self) -> Result<()> {
        let app = &self.app;
        self.terminal
            .draw(|f| ui::draw(f, app))
            .map_err(terminal_error)?;
        Ok(())
    }
}

impl Renderer for TerminalRenderer {
    fn render(&mut self, sensors: &[Sensor], stats: &SystemStats) -> Result<()> {
        self.app.update(sensors, stats);
        self.draw()
    }

    fn idle(&mut self, interval: Duration, shutdown: &ShutdownToken) -> Result<()> {
        let deadline = Instant::now() + interval;

        while !shutdown.is_cancelled() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }

            if !event::poll(remaining.min(INPUT_POLL)).map_err(terminal_error)? {
                continue;
            }

            match event::read().map_err(terminal_error)? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    match self.app.handle_key(key) {
                        Action::Quit => shutdown.cancel(),
                        Action::Redraw => self.draw()?,
                        Action::None => {}
                    }
                }
                Event::Resize(_, _) => self.draw()?,
                _ => {}
            }
        }

        Ok(())
    }
}

impl Drop for TerminalRenderer {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Run the TUI application until `shutdown` is cancelled
pub fn run(
    monitor: &mut Monitor,
    general: &GeneralConfig,
    refresh_interval: Duration,
    shutdown: &ShutdownToken,
) -> Result<u64> {
    let mut renderer = TerminalRenderer::new(general, refresh_interval)?;
    monitor.run(&mut renderer, refresh_interval, shutdown)
}

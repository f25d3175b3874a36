//! Application state management

use crate::config::GeneralConfig;
use crate::hwmon::{Sensor, SensorCategory};
use crate::stats::SystemStats;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// How long a status message stays in the footer
const STATUS_TIMEOUT: Duration = Duration::from_secs(5);

/// Convert a Celsius reading for display
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// What the event loop should do after a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Redraw,
    Quit,
}

/// Main application state
pub struct App {
    /// Latest snapshot handed over by the poll loop
    pub sensors: Vec<Sensor>,
    pub stats: SystemStats,
    /// Indices into `sensors`, grouped by category in display order
    pub order: Vec<usize>,
    /// Recent readings per sensor, same indexing as `sensors`
    pub history: Vec<VecDeque<f64>>,
    pub history_length: usize,
    /// Position within `order`
    pub selected: usize,

    pub use_fahrenheit: bool,
    pub show_stats: bool,
    pub show_fans: bool,
    pub show_graph: bool,
    pub compact_mode: bool,

    pub hostname: String,
    pub refresh_interval: Duration,
    pub ticks: u64,
    status_message: Option<(String, Instant)>,
}

impl App {
    pub fn new(general: &GeneralConfig, refresh_interval: Duration) -> Self {
        let hostname = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "unknown".to_string());

        Self {
            sensors: Vec::new(),
            stats: SystemStats::default(),
            order: Vec::new(),
            history: Vec::new(),
            history_length: general.history_length.max(1),
            selected: 0,
            use_fahrenheit: general.use_fahrenheit,
            show_stats: general.show_stats,
            show_fans: general.show_fans,
            show_graph: false,
            compact_mode: general.compact_mode,
            hostname,
            refresh_interval,
            ticks: 0,
            status_message: None,
        }
    }

    /// Take a new snapshot from the poll loop
    pub fn update(&mut self, sensors: &[Sensor], stats: &SystemStats) {
        if self.sensors.len() != sensors.len() {
            self.order = display_order(sensors);
            self.history = vec![VecDeque::with_capacity(self.history_length); sensors.len()];
            self.selected = self.selected.min(sensors.len().saturating_sub(1));
        }

        self.sensors.clear();
        self.sensors.extend_from_slice(sensors);
        self.stats = *stats;
        self.ticks += 1;

        for (sensor, history) in self.sensors.iter().zip(self.history.iter_mut()) {
            let Some(value) = sensor.current().filter(|_| sensor.is_active()) else {
                continue;
            };
            if history.len() >= self.history_length {
                history.pop_front();
            }
            history.push_back(value);
        }
    }

    /// Map a key press to a state change
    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
            KeyCode::Char('f') | KeyCode::Char('F') | KeyCode::Char('c') | KeyCode::Char('C') => {
                self.toggle_units();
                Action::Redraw
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.show_stats = !self.show_stats;
                Action::Redraw
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.show_fans = !self.show_fans;
                Action::Redraw
            }
            KeyCode::Char('g') | KeyCode::Char('G') => {
                self.show_graph = !self.show_graph;
                Action::Redraw
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.reset_history();
                Action::Redraw
            }
            KeyCode::Up => {
                self.scroll_up();
                Action::Redraw
            }
            KeyCode::Down => {
                self.scroll_down();
                Action::Redraw
            }
            _ => Action::None,
        }
    }

    pub fn toggle_units(&mut self) {
        self.use_fahrenheit = !self.use_fahrenheit;
        let unit = if self.use_fahrenheit { "Fahrenheit" } else { "Celsius" };
        self.set_status_message(format!("Showing {}", unit));
    }

    pub fn scroll_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        if self.selected + 1 < self.order.len() {
            self.selected += 1;
        }
    }

    /// Clear the history window of every sensor
    pub fn reset_history(&mut self) {
        for history in &mut self.history {
            history.clear();
        }
        self.set_status_message("History cleared");
    }

    /// Index into `sensors` of the highlighted row
    pub fn selected_index(&self) -> Option<usize> {
        self.order.get(self.selected).copied()
    }

    pub fn selected_sensor(&self) -> Option<&Sensor> {
        self.selected_index().map(|i| &self.sensors[i])
    }

    pub fn selected_history(&self) -> Option<&VecDeque<f64>> {
        self.selected_index().and_then(|i| self.history.get(i))
    }

    /// Sensors of one category, in discovery order
    pub fn group(&self, category: SensorCategory) -> impl Iterator<Item = (usize, &Sensor)> + '_ {
        self.order
            .iter()
            .map(move |&i| (i, &self.sensors[i]))
            .filter(move |(_, s)| s.category() == category)
    }

    /// Convert a °C value into the display unit
    pub fn display_temp(&self, celsius: f64) -> f64 {
        if self.use_fahrenheit {
            celsius_to_fahrenheit(celsius)
        } else {
            celsius
        }
    }

    pub fn unit(&self) -> &'static str {
        if self.use_fahrenheit {
            "°F"
        } else {
            "°C"
        }
    }

    /// Format an optional °C value, `N/A` when absent
    pub fn format_temp(&self, celsius: Option<f64>) -> String {
        match celsius {
            Some(c) => format!("{:.1}{}", self.display_temp(c), self.unit()),
            None => "N/A".to_string(),
        }
    }

    /// Set a temporary status message
    pub fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    /// Get current status message if not expired
    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, timestamp)) if timestamp.elapsed() < STATUS_TIMEOUT => Some(msg.as_str()),
            _ => None,
        }
    }
}

/// Sensor indices sorted by category display order, stable within a category
pub fn display_order(sensors: &[Sensor]) -> Vec<usize> {
    let rank = |c: SensorCategory| SensorCategory::ALL.iter().position(|&x| x == c).unwrap_or(usize::MAX);
    let mut order: Vec<usize> = (0..sensors.len()).collect();
    order.sort_by_key(|&i| rank(sensors[i].category()));
    order
}

//! Application state for the dashboard.
//!
//! [`App`] is the session controller: it owns the refresh driver, the
//! chart table, the current-value cards, and the transient banner queue.
//! Worker events flow in through [`App::handle_event`]; due work flows
//! out of [`App::tick`] as worker commands. Everything lives for one
//! process session; nothing is persisted.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use time::OffsetDateTime;
use tracing::warn;

use tidewatch_core::{
    ConnectionState, Fetch, LatestSnapshot, RefreshDriver, Series, project, project_conductivity,
};
use tidewatch_types::{Channel, Feed, FieldSlot, Reading};

use crate::charts::{ChartId, ChartTable};
use crate::config::Config;
use crate::export;
use crate::messages::{Command, TelemetryEvent};

/// Spinner frames shown while a fetch is in flight.
const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Result-count choices cycled by the time-range key.
const RESULT_CHOICES: [u32; 4] = [50, 100, 200, 500];

/// How long error banners stay up without being dismissed.
const ERROR_BANNER_TTL: Duration = Duration::from_secs(5);

/// How long success banners stay up.
const SUCCESS_BANNER_TTL: Duration = Duration::from_secs(3);

/// Kind of a transient notification banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Error,
    Success,
}

/// A transient dismissible notification.
#[derive(Debug, Clone)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
    created: Instant,
    ttl: Duration,
}

/// Main application state for the dashboard session.
pub struct App {
    /// Whether the application should exit.
    pub should_quit: bool,
    /// Refresh/retry state machine.
    pub driver: RefreshDriver,
    /// Render surface: what each chart currently displays.
    pub charts: ChartTable,
    /// Formatted current value per card.
    current: HashMap<ChartId, String>,
    /// When data last arrived, formatted for the header.
    last_update: Option<String>,
    /// Transient notifications, newest last.
    banners: Vec<Banner>,
    /// Result-count bound for dashboard and history requests.
    pub results: u32,
    /// Whether timer-driven refreshes are paused.
    pub paused: bool,
    /// Spinner animation frame counter.
    spinner_frame: usize,
    /// Directory CSV exports are written to.
    export_dir: PathBuf,
}

impl App {
    /// Create the session controller from configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            should_quit: false,
            driver: RefreshDriver::new(config.driver_config()),
            charts: ChartTable::new(),
            current: HashMap::new(),
            last_update: None,
            banners: Vec::new(),
            results: config.results,
            paused: false,
            spinner_frame: 0,
            export_dir: config
                .export_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    /// Begin the session: returns the initial full-dashboard fetch.
    pub fn start(&mut self, now: Instant) -> Command {
        let fetch = self.driver.start(now);
        self.command_for(fetch)
    }

    /// Advance timers and animations. Returns a worker command when a
    /// refresh is due.
    pub fn tick(&mut self, now: Instant) -> Option<Command> {
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER.len();
        self.expire_banners(now);
        self.driver.poll(now).map(|fetch| self.command_for(fetch))
    }

    /// User-triggered refresh; a no-op while a fetch is in flight.
    pub fn manual_refresh(&mut self) -> Option<Command> {
        self.driver
            .manual_refresh()
            .map(|fetch| self.command_for(fetch))
    }

    /// Pause or resume timer-driven refreshes.
    pub fn toggle_paused(&mut self, now: Instant) {
        self.paused = !self.paused;
        self.driver.set_visible(!self.paused);
        let message = if self.paused {
            "Auto-refresh paused"
        } else {
            "Auto-refresh resumed"
        };
        self.push_banner(BannerKind::Success, message.to_string(), now);
    }

    /// Cycle the result-count bound; takes effect on the next
    /// dashboard or history refresh.
    pub fn cycle_results(&mut self, now: Instant) {
        let next = RESULT_CHOICES
            .iter()
            .position(|&c| c == self.results)
            .map(|i| RESULT_CHOICES[(i + 1) % RESULT_CHOICES.len()])
            .unwrap_or(RESULT_CHOICES[0]);
        self.results = next;
        self.push_banner(
            BannerKind::Success,
            format!("Requesting last {} readings", next),
            now,
        );
    }

    /// Export currently displayed statistics to CSV.
    pub fn export(&mut self, now: Instant) {
        match export::export_stats(&self.charts, &self.export_dir) {
            Ok(path) => {
                self.push_banner(
                    BannerKind::Success,
                    format!("Exported statistics to {}", path.display()),
                    now,
                );
            }
            Err(e) => {
                warn!(error = %e, "CSV export failed");
                self.push_banner(BannerKind::Error, format!("Export failed: {e}"), now);
            }
        }
    }

    /// Apply a worker event to the session state.
    pub fn handle_event(&mut self, event: TelemetryEvent, now: Instant) {
        match event {
            TelemetryEvent::DashboardLoaded { data } => {
                self.driver.on_success(Fetch::Dashboard);
                self.apply_latest(&data.latest);
                if let Some(feed) = &data.history.elevation {
                    self.update_channel_charts(Channel::Elevation, feed);
                }
                if let Some(feed) = &data.history.temperature {
                    self.update_channel_charts(Channel::Temperature, feed);
                }
                if let Some(feed) = &data.history.ec {
                    self.update_channel_charts(Channel::Conductivity, feed);
                }
                self.touch_last_update();
            }
            TelemetryEvent::LatestLoaded { snapshot } => {
                self.driver.on_success(Fetch::Latest);
                self.apply_latest(&snapshot);
                self.touch_last_update();
            }
            TelemetryEvent::HistoryLoaded { channels } => {
                // One reachable channel counts as a working refresh.
                let any_ok = channels.iter().any(|(_, r)| r.is_ok());
                let any_err = channels.iter().any(|(_, r)| r.is_err());
                if any_ok {
                    self.driver.on_success(Fetch::History);
                } else {
                    self.driver.on_failure(Fetch::History, now);
                }

                for (channel, result) in &channels {
                    match result {
                        Ok(feed) => self.update_channel_charts(*channel, feed),
                        Err(error) => {
                            warn!(%channel, %error, "skipping chart update for failed channel");
                        }
                    }
                }

                if any_err {
                    self.push_banner(
                        BannerKind::Error,
                        "Failed to load historical data".to_string(),
                        now,
                    );
                }
            }
            TelemetryEvent::FetchFailed { fetch, error } => {
                // Timeouts and network failures are handled identically;
                // they only differ in the log line.
                if error.is_timeout() {
                    warn!(?fetch, %error, "request deadline exceeded");
                } else {
                    warn!(?fetch, %error, "refresh failed");
                }
                self.driver.on_failure(fetch, now);
                self.push_banner(
                    BannerKind::Error,
                    format!("Failed to refresh data: {error}"),
                    now,
                );
            }
            TelemetryEvent::HealthChecked { healthy, detail } => {
                if healthy {
                    self.push_banner(BannerKind::Success, format!("Backend healthy: {detail}"), now);
                } else {
                    self.push_banner(BannerKind::Error, format!("Backend unhealthy: {detail}"), now);
                }
            }
        }
    }

    /// Update the five current-value cards from a latest snapshot.
    fn apply_latest(&mut self, snapshot: &LatestSnapshot) {
        self.set_card(
            ChartId::Elevation,
            field_of(&snapshot.elevation, FieldSlot::Field1),
        );
        self.set_card(
            ChartId::Temperature,
            field_of(&snapshot.temperature, FieldSlot::Field1),
        );
        self.set_card(ChartId::Salinity, field_of(&snapshot.ec, FieldSlot::Field1));
        self.set_card(ChartId::Tds, field_of(&snapshot.ec, FieldSlot::Field2));
        self.set_card(
            ChartId::Conductivity,
            field_of(&snapshot.ec, FieldSlot::Field3),
        );
    }

    fn set_card(&mut self, id: ChartId, raw: Option<&str>) {
        self.current.insert(id, format_card(raw, id.precision()));
    }

    /// Project a channel's feed onto its chart(s).
    fn update_channel_charts(&mut self, channel: Channel, feed: &Feed) {
        match channel {
            Channel::Elevation => {
                self.render(ChartId::Elevation, project(feed, FieldSlot::Field1));
            }
            Channel::Temperature => {
                self.render(ChartId::Temperature, project(feed, FieldSlot::Field1));
            }
            Channel::Conductivity => {
                let (salinity, tds, conductivity) = project_conductivity(feed);
                self.render(ChartId::Salinity, salinity);
                self.render(ChartId::Tds, tds);
                self.render(ChartId::Conductivity, conductivity);
            }
            _ => {}
        }
    }

    /// Hand a series to the render surface. A rejected update is logged
    /// per chart and must not block sibling charts.
    fn render(&mut self, id: ChartId, series: Series) {
        if let Err(error) = self.charts.update(id, series) {
            warn!(chart = id.key(), %error, "chart update rejected");
        }
    }

    /// Formatted current value for a card (`-` when absent).
    #[must_use]
    pub fn current_value(&self, id: ChartId) -> &str {
        self.current.get(&id).map(String::as_str).unwrap_or("-")
    }

    /// Header connection state.
    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.driver.connection_state()
    }

    /// Last-update header text, if data has arrived at all.
    #[must_use]
    pub fn last_update(&self) -> Option<&str> {
        self.last_update.as_deref()
    }

    fn touch_last_update(&mut self) {
        let format = time::format_description::parse(
            "[day]/[month]/[year] [hour]:[minute]:[second] UTC",
        )
        .unwrap();
        self.last_update = OffsetDateTime::now_utc().format(&format).ok();
    }

    /// Newest banner, if any.
    #[must_use]
    pub fn banner(&self) -> Option<&Banner> {
        self.banners.last()
    }

    /// Dismiss the newest banner.
    pub fn dismiss_banner(&mut self) {
        self.banners.pop();
    }

    /// Queue a transient notification.
    pub fn push_banner(&mut self, kind: BannerKind, message: String, now: Instant) {
        let ttl = match kind {
            BannerKind::Error => ERROR_BANNER_TTL,
            BannerKind::Success => SUCCESS_BANNER_TTL,
        };
        self.banners.push(Banner {
            kind,
            message,
            created: now,
            ttl,
        });
        // Keep at most 5 queued banners
        while self.banners.len() > 5 {
            self.banners.remove(0);
        }
    }

    fn expire_banners(&mut self, now: Instant) {
        self.banners
            .retain(|b| now.duration_since(b.created) < b.ttl);
    }

    /// Current spinner character.
    #[must_use]
    pub fn spinner_char(&self) -> &'static str {
        SPINNER[self.spinner_frame]
    }

    /// Release render-surface state at shutdown.
    pub fn teardown(&mut self) {
        self.charts.clear_all();
    }

    fn command_for(&self, fetch: Fetch) -> Command {
        match fetch {
            Fetch::Dashboard => Command::FetchDashboard {
                results: self.results,
            },
            Fetch::Latest => Command::FetchLatest,
            Fetch::History => Command::FetchHistory {
                results: self.results,
            },
        }
    }
}

/// Raw decimal value of one field of an optional reading.
fn field_of(reading: &Option<Reading>, slot: FieldSlot) -> Option<&str> {
    reading.as_ref().and_then(|r| r.field(slot))
}

/// Format a raw decimal field for a current-value card. Absent or
/// malformed values render as `-`, never as a number.
fn format_card(raw: Option<&str>, precision: usize) -> String {
    match raw
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
    {
        Some(value) => format!("{value:.precision$}"),
        None => "-".to_string(),
    }
}

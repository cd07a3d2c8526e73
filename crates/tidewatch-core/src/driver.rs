//! Refresh scheduling and connection-state tracking.
//!
//! [`RefreshDriver`] decides *when* to fetch and owns the user-visible
//! connection state; it performs no I/O itself. All waiting is expressed
//! as deadlines against caller-supplied instants: the UI loop calls
//! [`RefreshDriver::poll`] each tick and hands any returned fetch to the
//! worker, then reports the outcome back through
//! [`RefreshDriver::on_success`] / [`RefreshDriver::on_failure`]. This
//! keeps the schedule deterministic and lets teardown cancel everything
//! by simply dropping the driver.
//!
//! The driver enforces a single advisory in-flight flag: a tick or
//! manual trigger that lands while a fetch is outstanding is dropped,
//! not queued. Periodic ticks are also dropped while the dashboard is
//! hidden; they consume their slot and the next tick fires on schedule.
//!
//! Reconnect attempts keep their own deadline chain (2s, 4s, 8s, 16s,
//! 30s, then stop). The periodic timers deliberately keep firing after
//! the chain is exhausted, so a recovered backend is picked up by the
//! next tick without user action.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::backoff::{BackoffPolicy, RetryState};

/// Connection health as shown by the status indicator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    /// Initial load in progress.
    #[default]
    Connecting,
    /// Last connection-relevant fetch succeeded.
    Connected,
    /// Last connection-relevant fetch failed.
    Disconnected,
}

impl ConnectionState {
    /// Status-indicator text.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Connecting => "Connecting...",
            Self::Connected => "Connected",
            Self::Disconnected => "Disconnected",
        }
    }
}

/// A fetch the driver wants performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetch {
    /// Combined latest + history snapshot (startup and manual refresh).
    Dashboard,
    /// Latest-only snapshot (periodic tick and reconnect attempts).
    Latest,
    /// Per-channel history refresh (chart series).
    History,
}

/// Cadence and backoff configuration for the driver.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Interval between latest-only refreshes.
    pub latest_interval: Duration,
    /// Interval between history/chart refreshes. Independent of
    /// `latest_interval`, not synchronized to it.
    pub history_interval: Duration,
    /// Reconnect backoff schedule.
    pub backoff: BackoffPolicy,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            latest_interval: Duration::from_secs(2 * 60),
            history_interval: Duration::from_secs(10 * 60),
            backoff: BackoffPolicy::default(),
        }
    }
}

/// Single-flag refresh driver for the dashboard session.
#[derive(Debug)]
pub struct RefreshDriver {
    config: DriverConfig,
    state: ConnectionState,
    retry: RetryState,
    in_flight: Option<Fetch>,
    visible: bool,
    next_latest_at: Option<Instant>,
    next_history_at: Option<Instant>,
    next_retry_at: Option<Instant>,
}

impl RefreshDriver {
    /// Create an idle driver; nothing is scheduled until [`Self::start`].
    #[must_use]
    pub fn new(config: DriverConfig) -> Self {
        Self {
            config,
            state: ConnectionState::Connecting,
            retry: RetryState::default(),
            in_flight: None,
            visible: true,
            next_latest_at: None,
            next_history_at: None,
            next_retry_at: None,
        }
    }

    /// Begin the session: arms both periodic timers and returns the
    /// initial full-dashboard fetch.
    pub fn start(&mut self, now: Instant) -> Fetch {
        info!("starting refresh driver");
        self.state = ConnectionState::Connecting;
        self.in_flight = Some(Fetch::Dashboard);
        self.next_latest_at = Some(now + self.config.latest_interval);
        self.next_history_at = Some(now + self.config.history_interval);
        Fetch::Dashboard
    }

    /// Current connection state.
    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.state
    }

    /// Whether a fetch is currently outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Reconnect attempts recorded in the current sequence.
    #[must_use]
    pub fn retry_attempts(&self) -> u32 {
        self.retry.attempts()
    }

    /// Next scheduled reconnect attempt, if any.
    #[must_use]
    pub fn next_retry_at(&self) -> Option<Instant> {
        self.next_retry_at
    }

    /// Pause or resume timer-driven refreshes (hidden-dashboard guard).
    /// Reconnect attempts are not affected.
    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            info!(visible, "visibility changed");
        }
        self.visible = visible;
    }

    /// Whether timer-driven refreshes are currently allowed.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Advance deadlines to `now` and return the fetch to perform, if
    /// any. Every due deadline consumes its slot whether or not it
    /// fires; a tick that lands while hidden or busy simply does not
    /// happen, and the next one fires on its own schedule.
    pub fn poll(&mut self, now: Instant) -> Option<Fetch> {
        let mut due: Option<Fetch> = None;

        // Reconnect deadline. Fires even while hidden; if something else
        // is in flight its outcome re-arms or clears the sequence.
        if let Some(at) = self.next_retry_at
            && now >= at
        {
            self.next_retry_at = None;
            if self.in_flight.is_none() {
                debug!(attempt = self.retry.attempts(), "reconnect attempt due");
                due = Some(Fetch::Latest);
            }
        }

        // Periodic history tick. Checked before the latest tick: when the
        // cadences land on the same instant the rarer one wins the slot,
        // otherwise a latest interval that divides the history interval
        // would starve history refreshes forever.
        if let Some(at) = self.next_history_at
            && now >= at
        {
            self.next_history_at = Some(advance(at, self.config.history_interval, now));
            if due.is_none() && self.visible && self.in_flight.is_none() {
                due = Some(Fetch::History);
            }
        }

        // Periodic latest tick.
        if let Some(at) = self.next_latest_at
            && now >= at
        {
            self.next_latest_at = Some(advance(at, self.config.latest_interval, now));
            if due.is_none() && self.visible && self.in_flight.is_none() {
                due = Some(Fetch::Latest);
            }
        }

        if let Some(fetch) = due {
            debug!(?fetch, "fetch scheduled");
            self.in_flight = Some(fetch);
        }
        due
    }

    /// User-triggered refresh. Suppressed (a no-op) while any fetch is
    /// in flight.
    pub fn manual_refresh(&mut self) -> Option<Fetch> {
        if self.in_flight.is_some() {
            debug!("manual refresh suppressed: fetch already in flight");
            return None;
        }
        info!("manual refresh");
        self.in_flight = Some(Fetch::Dashboard);
        Some(Fetch::Dashboard)
    }

    /// Record a successful fetch outcome.
    pub fn on_success(&mut self, fetch: Fetch) {
        self.in_flight = None;

        match fetch {
            Fetch::Dashboard | Fetch::Latest => {
                if self.state != ConnectionState::Connected {
                    info!("connected");
                }
                self.state = ConnectionState::Connected;
                self.retry.reset();
                self.next_retry_at = None;
            }
            // Chart refreshes do not carry connection-health meaning.
            Fetch::History => {}
        }
    }

    /// Record a failed fetch outcome and schedule the next reconnect
    /// attempt, if the ceiling allows one.
    pub fn on_failure(&mut self, fetch: Fetch, now: Instant) {
        self.in_flight = None;

        match fetch {
            Fetch::Dashboard | Fetch::Latest => {
                self.state = ConnectionState::Disconnected;
                match self.retry.next_delay(&self.config.backoff) {
                    Some(delay) => {
                        warn!(attempt = self.retry.attempts(), ?delay, "scheduling reconnect");
                        self.next_retry_at = Some(now + delay);
                    }
                    None => {
                        warn!("reconnect attempts exhausted; next periodic or manual refresh restarts the sequence");
                        self.next_retry_at = None;
                    }
                }
            }
            // A failed chart refresh is reported per chart; it does not
            // touch connection state or the reconnect sequence.
            Fetch::History => {}
        }
    }
}

/// Next fixed-rate deadline strictly after `now`. Missed slots are
/// skipped, not replayed.
fn advance(mut next: Instant, interval: Duration, now: Instant) -> Instant {
    while next <= now {
        next += interval;
    }
    next
}

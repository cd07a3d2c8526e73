//! Keyboard handling for the dashboard.

use std::time::Instant;

use crossterm::event::KeyCode;

use crate::app::App;
use crate::messages::Command;

/// High-level UI actions triggered by keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Refresh,
    Export,
    TogglePause,
    CycleResults,
    CheckHealth,
    DismissBanner,
}

/// Map a key press to an action.
#[must_use]
pub fn handle_key(code: KeyCode) -> Action {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('r') => Action::Refresh,
        KeyCode::Char('e') => Action::Export,
        KeyCode::Char('p') => Action::TogglePause,
        KeyCode::Char('t') => Action::CycleResults,
        KeyCode::Char('h') => Action::CheckHealth,
        KeyCode::Char('d') => Action::DismissBanner,
        _ => Action::None,
    }
}

/// Apply an action to the app state. Returns a worker command when the
/// action needs a fetch.
pub fn apply_action(app: &mut App, action: Action, now: Instant) -> Option<Command> {
    match action {
        Action::Quit => {
            app.should_quit = true;
            None
        }
        Action::Refresh => app.manual_refresh(),
        Action::Export => {
            app.export(now);
            None
        }
        Action::TogglePause => {
            app.toggle_paused(now);
            None
        }
        Action::CycleResults => {
            app.cycle_results(now);
            None
        }
        // Health probes are diagnostics, not data fetches; they bypass
        // the in-flight guard.
        Action::CheckHealth => Some(Command::CheckHealth),
        Action::DismissBanner => {
            app.dismiss_banner();
            None
        }
        Action::None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_key_mapping() {
        assert_eq!(handle_key(KeyCode::Char('q')), Action::Quit);
        assert_eq!(handle_key(KeyCode::Esc), Action::Quit);
        assert_eq!(handle_key(KeyCode::Char('r')), Action::Refresh);
        assert_eq!(handle_key(KeyCode::Char('e')), Action::Export);
        assert_eq!(handle_key(KeyCode::Char('p')), Action::TogglePause);
        assert_eq!(handle_key(KeyCode::Char('t')), Action::CycleResults);
        assert_eq!(handle_key(KeyCode::Char('h')), Action::CheckHealth);
        assert_eq!(handle_key(KeyCode::Char('x')), Action::None);
    }

    #[test]
    fn test_quit_action() {
        let mut app = App::new(&Config::default());
        assert!(apply_action(&mut app, Action::Quit, Instant::now()).is_none());
        assert!(app.should_quit);
    }

    #[test]
    fn test_refresh_action_is_guarded() {
        let mut app = App::new(&Config::default());
        let now = Instant::now();

        // Nothing in flight: refresh produces a dashboard fetch.
        let cmd = apply_action(&mut app, Action::Refresh, now);
        assert!(matches!(cmd, Some(Command::FetchDashboard { .. })));

        // In flight: suppressed.
        assert!(apply_action(&mut app, Action::Refresh, now).is_none());
    }

    #[test]
    fn test_health_action_bypasses_guard() {
        let mut app = App::new(&Config::default());
        let now = Instant::now();

        let _ = apply_action(&mut app, Action::Refresh, now);
        let cmd = apply_action(&mut app, Action::CheckHealth, now);
        assert!(matches!(cmd, Some(Command::CheckHealth)));
    }
}

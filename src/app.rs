use std::sync::Arc;
use std::time::SystemTime;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::info;

use crate::error::ConfigError;
use crate::language::WordPool;
use crate::session::{SessionConfig, TypingSession};
use crate::timer::{SessionTimers, TimerEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Typing,
    Results,
}

/// What the event loop should do after a key was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Continue,
    Restart,
    Quit,
}

/// Holds the one live session together with the timers bound to it.
#[derive(Debug)]
pub struct App {
    pool: Arc<WordPool>,
    config: SessionConfig,
    pub session: TypingSession,
    pub timers: SessionTimers,
    pub state: AppState,
}

impl App {
    pub fn new(config: SessionConfig, pool: Arc<WordPool>) -> Result<Self, ConfigError> {
        let session = TypingSession::new(config, pool.clone())?;
        Ok(Self {
            pool,
            config,
            session,
            timers: SessionTimers::new(),
            state: AppState::Typing,
        })
    }

    /// Drop the current session and start over with a fresh one.
    pub fn reset(&mut self) -> Result<(), ConfigError> {
        self.teardown();
        self.session = TypingSession::new(self.config, self.pool.clone())?;
        self.state = AppState::Typing;
        info!("session reset");
        Ok(())
    }

    /// Cancel anything scheduled for the current session.
    pub fn teardown(&mut self) {
        self.timers.disarm();
    }

    pub fn type_char(&mut self, c: char, now: SystemTime) {
        if self.state != AppState::Typing {
            return;
        }
        let mut raw = self.session.current_input().to_string();
        raw.push(c);
        self.input(&raw, now);
    }

    pub fn backspace(&mut self, now: SystemTime) {
        if self.state != AppState::Typing || self.session.current_input().is_empty() {
            return;
        }
        let mut raw = self.session.current_input().to_string();
        raw.pop();
        self.input(&raw, now);
    }

    fn input(&mut self, raw: &str, now: SystemTime) {
        let was_started = self.session.has_started();
        self.session.on_input(raw, now);

        if !was_started {
            if let Some(started_at) = self.session.started_at() {
                self.timers.arm(&self.config, started_at);
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: SystemTime) -> AppAction {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return AppAction::Quit;
        }

        match self.state {
            AppState::Typing => match key.code {
                KeyCode::Tab => return AppAction::Restart,
                KeyCode::Enter => self.type_char(' ', now),
                KeyCode::Backspace => self.backspace(now),
                KeyCode::Char(c) => self.type_char(c, now),
                _ => {}
            },
            AppState::Results => match key.code {
                KeyCode::Char('r') | KeyCode::Tab => return AppAction::Restart,
                KeyCode::Char('q') => return AppAction::Quit,
                _ => {}
            },
        }
        AppAction::Continue
    }

    /// Fire whatever timers came due since the last call.
    pub fn on_tick(&mut self, now: SystemTime) {
        let deadline = self.timers.finish_at();

        while let Some(event) = self.timers.poll(now) {
            match event {
                // end exactly at the limit even when the tick arrives late
                TimerEvent::Finish => self.finish(deadline.unwrap_or(now)),
                TimerEvent::Refill => {
                    self.session.tick(now);
                }
            }
        }
    }

    pub fn finish(&mut self, now: SystemTime) {
        self.session.finish(now);
        if self.session.has_finished() {
            self.teardown();
            self.state = AppState::Results;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionPhase;
    use std::time::{Duration, UNIX_EPOCH};

    fn at_ms(ms: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_millis(ms)
    }

    fn app() -> App {
        let pool = Arc::new(WordPool::new(["ankara"]).unwrap());
        App::new(SessionConfig::default(), pool).unwrap()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_first_key_arms_timers() {
        let mut app = app();
        assert!(!app.timers.is_armed());

        app.handle_key(key(KeyCode::Char('a')), at_ms(500));

        assert!(app.timers.is_armed());
        assert_eq!(app.timers.finish_at(), Some(at_ms(60_500)));
        assert_eq!(app.session.phase(), SessionPhase::Running);
    }

    #[test]
    fn test_keys_build_and_submit_words() {
        let mut app = app();

        for c in "ankx".chars() {
            app.handle_key(key(KeyCode::Char(c)), at_ms(0));
        }
        assert_eq!(app.session.current_input(), "ankx");
        app.handle_key(key(KeyCode::Backspace), at_ms(0));
        for c in "ara ".chars() {
            app.handle_key(key(KeyCode::Char(c)), at_ms(0));
        }
        app.handle_key(key(KeyCode::Char('x')), at_ms(0));
        app.handle_key(key(KeyCode::Enter), at_ms(0));

        assert_eq!(app.session.correct_count(), 1);
        assert_eq!(app.session.wrong_count(), 1);
        assert_eq!(app.session.current_input(), "");
    }

    #[test]
    fn test_backspace_on_empty_input_does_not_start() {
        let mut app = app();

        app.handle_key(key(KeyCode::Backspace), at_ms(0));

        assert!(!app.session.has_started());
        assert!(!app.timers.is_armed());
    }

    #[test]
    fn test_timeout_finishes_at_deadline() {
        let mut app = app();
        for c in "ankara ".chars() {
            app.type_char(c, at_ms(0));
        }

        app.on_tick(at_ms(59_900));
        assert_eq!(app.state, AppState::Typing);

        app.on_tick(at_ms(60_100));
        assert_eq!(app.state, AppState::Results);
        assert!(!app.timers.is_armed());
        assert_eq!(app.session.ended_at(), Some(at_ms(60_000)));
        assert_eq!(app.session.wpm(), Some(1));
    }

    #[test]
    fn test_refill_timer_replaces_stale_batch() {
        let mut app = app();
        app.type_char('a', at_ms(0));
        app.backspace(at_ms(0));
        app.session.leave_batch_exhausted();

        app.on_tick(at_ms(4_900));
        assert_eq!(app.session.batch(), 0);

        app.on_tick(at_ms(5_100));
        assert_eq!(app.session.batch(), 1);
        assert_eq!(app.session.current_index(), 0);
        assert_eq!(app.state, AppState::Typing);
    }

    #[test]
    fn test_typing_after_finish_is_ignored() {
        let mut app = app();
        app.type_char('a', at_ms(0));
        app.finish(at_ms(10_000));

        assert_eq!(app.handle_key(key(KeyCode::Char(' ')), at_ms(11_000)), AppAction::Continue);
        assert_eq!(app.session.completed_words(), 0);
        assert_eq!(app.session.current_input(), "a");
    }

    #[test]
    fn test_finish_before_start_keeps_typing() {
        let mut app = app();

        app.finish(at_ms(10_000));

        assert_eq!(app.state, AppState::Typing);
        assert!(!app.session.has_finished());
    }

    #[test]
    fn test_reset_tears_down_previous_session() {
        let mut app = app();
        app.type_char('a', at_ms(0));
        assert!(app.timers.is_armed());

        app.reset().unwrap();

        assert!(!app.timers.is_armed());
        assert!(!app.session.has_started());
        assert_eq!(app.state, AppState::Typing);
        // stale deadline of the old session must not end the new one
        app.on_tick(at_ms(120_000));
        assert_eq!(app.state, AppState::Typing);
    }

    #[test]
    fn test_navigation_keys() {
        let mut app = app();

        assert_eq!(app.handle_key(key(KeyCode::Tab), at_ms(0)), AppAction::Restart);
        assert_eq!(app.handle_key(key(KeyCode::Esc), at_ms(0)), AppAction::Quit);
        assert_eq!(
            app.handle_key(
                KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
                at_ms(0)
            ),
            AppAction::Quit
        );

        app.type_char('a', at_ms(0));
        app.finish(at_ms(1_000));
        assert_eq!(app.handle_key(key(KeyCode::Char('r')), at_ms(0)), AppAction::Restart);
        assert_eq!(app.handle_key(key(KeyCode::Char('q')), at_ms(0)), AppAction::Quit);
        assert_eq!(app.handle_key(key(KeyCode::Char('x')), at_ms(0)), AppAction::Continue);
    }
}

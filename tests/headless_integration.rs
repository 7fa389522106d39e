use std::sync::{mpsc, Arc};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use klavye::runtime::{ChannelEvents, Runner, SessionEvent};
use klavye::{App, AppAction, AppState, SessionConfig, WordDisplayState, WordPool};

fn key(c: char) -> SessionEvent {
    SessionEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

fn send_word(tx: &mpsc::Sender<SessionEvent>, word: &str) {
    for c in word.chars() {
        tx.send(key(c)).unwrap();
    }
    tx.send(key(' ')).unwrap();
}

// Headless integration using the runtime + App without a TTY
#[test]
fn headless_two_word_batches_refill() {
    let pool = Arc::new(WordPool::new(["ankara", "istanbul"]).unwrap());
    let config = SessionConfig {
        sequence_length: 2,
        ..SessionConfig::default()
    };
    let mut app = App::new(config, pool).unwrap();
    let first_batch: Vec<String> = app.session.sequence().to_vec();

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(ChannelEvents::new(rx), Duration::from_millis(5));
    for word in &first_batch {
        send_word(&tx, word);
    }
    drop(tx);

    let now = UNIX_EPOCH + Duration::from_secs(1);
    for _ in 0..100u32 {
        match runner.next_event() {
            SessionEvent::Key(k) => {
                assert_eq!(app.handle_key(k, now), AppAction::Continue);
            }
            SessionEvent::Tick => break,
            SessionEvent::Resize => {}
        }
    }

    assert_eq!(app.session.correct_count(), 2);
    assert_eq!(app.session.wrong_count(), 0);
    assert_eq!(app.session.current_index(), 0);
    assert_eq!(app.session.sequence().len(), 2);
    assert_eq!(app.session.batch(), 1);
    assert_eq!(
        app.session.word_display_state(0),
        WordDisplayState::InProgressMatching
    );
}

#[test]
fn headless_timed_session_finishes_by_time() {
    let pool = Arc::new(WordPool::builtin().unwrap());
    let config = SessionConfig {
        session_duration: Duration::from_millis(200),
        refill_poll_interval: Duration::from_millis(50),
        ..SessionConfig::default()
    };
    let mut app = App::new(config, pool).unwrap();
    let target = app.session.sequence()[0].clone();

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(ChannelEvents::new(rx), Duration::from_millis(10));
    send_word(&tx, &target);

    for _ in 0..100u32 {
        // up to ~1s
        match runner.next_event() {
            SessionEvent::Key(k) => {
                app.handle_key(k, SystemTime::now());
            }
            SessionEvent::Tick | SessionEvent::Resize => {}
        }
        app.on_tick(SystemTime::now());
        if app.state == AppState::Results {
            break;
        }
    }

    assert_eq!(app.state, AppState::Results, "timed session should finish by timeout");
    assert!(!app.timers.is_armed());
    let summary = app.session.summary().expect("finished session has a summary");
    assert_eq!(summary.correct, 1);
    assert_eq!(summary.total, 1);
    assert!(summary.wpm > 0);
    assert_eq!(summary.duration, Duration::from_millis(200));
}

#[test]
fn headless_idle_session_never_finishes() {
    let pool = Arc::new(WordPool::builtin().unwrap());
    let mut app = App::new(SessionConfig::default(), pool).unwrap();

    app.on_tick(UNIX_EPOCH + Duration::from_secs(3_600));
    app.finish(UNIX_EPOCH + Duration::from_secs(3_600));

    assert_eq!(app.state, AppState::Typing);
    assert_eq!(app.session.wpm(), None);
    assert!(app.session.summary().is_none());
}

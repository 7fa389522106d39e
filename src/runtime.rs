use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use log::warn;

/// What the typing loop reacts to.
#[derive(Clone, Debug)]
pub enum SessionEvent {
    Key(KeyEvent),
    Resize,
    /// Nothing arrived within the poll interval.
    Tick,
}

pub trait EventSource: Send + 'static {
    fn recv_timeout(&self, timeout: Duration) -> Result<SessionEvent, RecvTimeoutError>;
}

/// Terminal input read on a background thread and forwarded over a channel.
pub struct TerminalEvents {
    rx: Receiver<SessionEvent>,
}

impl TerminalEvents {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || loop {
            let forwarded = match event::read() {
                // release/repeat events are only reported on some platforms
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => SessionEvent::Key(key),
                Ok(Event::Resize(..)) => SessionEvent::Resize,
                Ok(_) => continue,
                Err(e) => {
                    warn!("terminal event reader stopped: {e}");
                    return;
                }
            };
            if tx.send(forwarded).is_err() {
                return;
            }
        });

        Self { rx }
    }
}

impl EventSource for TerminalEvents {
    fn recv_timeout(&self, timeout: Duration) -> Result<SessionEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Events fed by hand through a channel, for driving the app without a TTY.
pub struct ChannelEvents {
    rx: Receiver<SessionEvent>,
}

impl ChannelEvents {
    pub fn new(rx: Receiver<SessionEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for ChannelEvents {
    fn recv_timeout(&self, timeout: Duration) -> Result<SessionEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Waits on an event source, turning every quiet interval into a tick so
/// session timers keep being polled while the user is idle.
pub struct Runner<E: EventSource> {
    events: E,
    poll_interval: Duration,
}

impl<E: EventSource> Runner<E> {
    pub fn new(events: E, poll_interval: Duration) -> Self {
        Self {
            events,
            poll_interval,
        }
    }

    pub fn next_event(&self) -> SessionEvent {
        // a closed source degrades to ticking so timers still fire
        self.events
            .recv_timeout(self.poll_interval)
            .unwrap_or(SessionEvent::Tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn runner(rx: Receiver<SessionEvent>) -> Runner<ChannelEvents> {
        Runner::new(ChannelEvents::new(rx), Duration::from_millis(1))
    }

    #[test]
    fn test_quiet_interval_is_a_tick() {
        let (_tx, rx) = mpsc::channel();

        assert!(matches!(runner(rx).next_event(), SessionEvent::Tick));
    }

    #[test]
    fn test_closed_source_keeps_ticking() {
        let (tx, rx) = mpsc::channel::<SessionEvent>();
        drop(tx);
        let runner = runner(rx);

        assert!(matches!(runner.next_event(), SessionEvent::Tick));
        assert!(matches!(runner.next_event(), SessionEvent::Tick));
    }

    #[test]
    fn test_events_arrive_in_order() {
        let (tx, rx) = mpsc::channel();
        tx.send(SessionEvent::Key(KeyEvent::new(
            KeyCode::Char('a'),
            KeyModifiers::NONE,
        )))
        .unwrap();
        tx.send(SessionEvent::Resize).unwrap();
        let runner = runner(rx);

        match runner.next_event() {
            SessionEvent::Key(key) => assert_eq!(key.code, KeyCode::Char('a')),
            other => panic!("expected a key, got {other:?}"),
        }
        assert!(matches!(runner.next_event(), SessionEvent::Resize));
        assert!(matches!(runner.next_event(), SessionEvent::Tick));
    }
}

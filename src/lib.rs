// Library surface for the binary and for headless/integration tests.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod language;
pub mod runtime;
pub mod session;
pub mod timer;
pub mod ui;

pub use app::{App, AppAction, AppState};
pub use error::ConfigError;
pub use language::WordPool;
pub use session::{SessionConfig, SessionSummary, TypingSession, WordDisplayState};

/// How often the event loop wakes up to redraw and fire due timers.
pub const TICK_RATE_MS: u64 = 100;

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use log::{debug, info};
use serde::Serialize;

use crate::error::ConfigError;
use crate::language::{normalize, WordPool};

pub const DEFAULT_SEQUENCE_LENGTH: usize = 10;
pub const DEFAULT_SESSION_SECS: u64 = 60;
pub const DEFAULT_REFILL_POLL_SECS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub sequence_length: usize,
    pub session_duration: Duration,
    pub refill_poll_interval: Duration,
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sequence_length == 0 {
            return Err(ConfigError::ZeroSequenceLength);
        }
        if self.session_duration.is_zero() {
            return Err(ConfigError::ZeroSessionDuration);
        }
        if self.refill_poll_interval.is_zero() {
            return Err(ConfigError::ZeroRefillInterval);
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sequence_length: DEFAULT_SEQUENCE_LENGTH,
            session_duration: Duration::from_secs(DEFAULT_SESSION_SECS),
            refill_poll_interval: Duration::from_secs(DEFAULT_REFILL_POLL_SECS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SessionPhase {
    Idle,
    Running,
    Finished,
}

/// How a word in the current sequence should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordDisplayState {
    Untyped,
    InProgressMatching,
    InProgressMismatching,
    CorrectFinal,
    WrongFinal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Elapsed {
    NotStarted,
    InProgress { so_far: Duration },
    Finished(Duration),
}

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Elapsed::NotStarted => write!(f, "not started"),
            Elapsed::InProgress { .. } => write!(f, "in progress"),
            Elapsed::Finished(d) => write!(f, "{} seconds", d.as_secs()),
        }
    }
}

/// Final numbers of a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub correct: usize,
    pub wrong: usize,
    pub total: usize,
    pub wpm: u32,
    #[serde(rename = "duration_secs", serialize_with = "serialize_secs")]
    pub duration: Duration,
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_secs())
}

impl SessionSummary {
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        ((self.correct as f64 / self.total as f64) * 100.0).round()
    }
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "correct words: {}", self.correct)?;
        writeln!(f, "wrong words: {}", self.wrong)?;
        writeln!(f, "total words: {}", self.total)?;
        writeln!(f, "wpm: {}", self.wpm)?;
        write!(f, "duration: {} seconds", self.duration.as_secs())
    }
}

/// One run of the typing test.
///
/// Words are submitted by typing a trailing whitespace character. Once a
/// batch of `sequence_length` words is exhausted a new batch is sampled from
/// the pool and the per-batch history starts over; the counters keep
/// accumulating for the whole run.
#[derive(Debug)]
pub struct TypingSession {
    config: SessionConfig,
    pool: Arc<WordPool>,
    sequence: Vec<String>,
    typed_words: Vec<String>,
    current_input: String,
    current_index: usize,
    batch: usize,
    started_at: Option<SystemTime>,
    ended_at: Option<SystemTime>,
    correct_count: usize,
    wrong_count: usize,
    wpm: Option<u32>,
    finished: bool,
}

impl TypingSession {
    pub fn new(config: SessionConfig, pool: Arc<WordPool>) -> Result<Self, ConfigError> {
        config.validate()?;
        if pool.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }

        let sequence = pool.sample(config.sequence_length);
        Ok(Self {
            config,
            pool,
            sequence,
            typed_words: Vec::new(),
            current_input: String::new(),
            current_index: 0,
            batch: 0,
            started_at: None,
            ended_at: None,
            correct_count: 0,
            wrong_count: 0,
            wpm: None,
            finished: false,
        })
    }

    pub fn phase(&self) -> SessionPhase {
        match (self.started_at, self.finished) {
            (_, true) => SessionPhase::Finished,
            (Some(_), false) => SessionPhase::Running,
            (None, false) => SessionPhase::Idle,
        }
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn has_finished(&self) -> bool {
        self.finished
    }

    pub fn sequence(&self) -> &[String] {
        &self.sequence
    }

    pub fn typed_words(&self) -> &[String] {
        &self.typed_words
    }

    pub fn current_input(&self) -> &str {
        &self.current_input
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Number of batches sampled after the initial one.
    pub fn batch(&self) -> usize {
        self.batch
    }

    pub fn started_at(&self) -> Option<SystemTime> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<SystemTime> {
        self.ended_at
    }

    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    pub fn wrong_count(&self) -> usize {
        self.wrong_count
    }

    pub fn completed_words(&self) -> usize {
        self.correct_count + self.wrong_count
    }

    pub fn wpm(&self) -> Option<u32> {
        self.wpm
    }

    /// Feed the full contents of the input field.
    pub fn on_input(&mut self, raw: &str, now: SystemTime) {
        if self.finished {
            debug!("input ignored, session is {}", self.phase());
            return;
        }

        if self.started_at.is_none() {
            info!(
                "session started: {} words per batch, {}s limit",
                self.config.sequence_length,
                self.config.session_duration.as_secs()
            );
            self.started_at = Some(now);
        }

        self.current_input = raw.to_string();

        if raw.chars().next_back().is_some_and(char::is_whitespace) {
            self.submit_word();
            self.current_input.clear();
        }
    }

    fn submit_word(&mut self) {
        let typed = normalize(self.current_input.trim());
        let target = &self.sequence[self.current_index];

        if typed == *target {
            self.correct_count += 1;
        } else {
            self.wrong_count += 1;
        }
        debug!(
            "word {} submitted: typed {:?}, expected {:?}",
            self.completed_words(),
            typed,
            target
        );

        self.typed_words.push(typed);
        self.current_index += 1;

        if self.current_index >= self.sequence.len() {
            self.refill();
        }
    }

    #[cfg(test)]
    pub(crate) fn leave_batch_exhausted(&mut self) {
        self.current_index = self.config.sequence_length;
        self.current_input.clear();
    }

    fn refill(&mut self) {
        self.sequence = self.pool.sample(self.config.sequence_length);
        self.typed_words.clear();
        self.current_index = 0;
        self.batch += 1;
        info!("sampled word batch {}", self.batch);
    }

    /// Periodic check that replaces a sequence left exhausted while the
    /// input is idle. Returns whether a refill happened.
    pub fn tick(&mut self, _now: SystemTime) -> bool {
        if self.phase() != SessionPhase::Running {
            return false;
        }

        if self.current_index >= self.config.sequence_length && self.current_input.is_empty() {
            self.refill();
            return true;
        }
        false
    }

    pub fn finish(&mut self, now: SystemTime) {
        let Some(started_at) = self.started_at else {
            debug!("finish ignored, session is {}", self.phase());
            return;
        };
        if self.finished {
            debug!("finish ignored, session is {}", self.phase());
            return;
        }

        self.ended_at = Some(now);
        let elapsed = now.duration_since(started_at).unwrap_or_default();
        self.wpm = Some(words_per_minute(self.correct_count, elapsed));
        self.finished = true;

        info!(
            "session finished: {} correct, {} wrong, {} wpm in {}s",
            self.correct_count,
            self.wrong_count,
            self.wpm.unwrap_or_default(),
            elapsed.as_secs()
        );
    }

    pub fn word_display_state(&self, index: usize) -> WordDisplayState {
        use std::cmp::Ordering;

        let Some(target) = self.sequence.get(index) else {
            return WordDisplayState::Untyped;
        };

        match index.cmp(&self.current_index) {
            Ordering::Greater => WordDisplayState::Untyped,
            Ordering::Equal => {
                if target.starts_with(&normalize(&self.current_input)) {
                    WordDisplayState::InProgressMatching
                } else {
                    WordDisplayState::InProgressMismatching
                }
            }
            Ordering::Less => match self.typed_words.get(index) {
                Some(typed) if typed == target => WordDisplayState::CorrectFinal,
                _ => WordDisplayState::WrongFinal,
            },
        }
    }

    /// Words of the current batch paired with how they should be shown.
    pub fn word_states(&self) -> impl Iterator<Item = (&str, WordDisplayState)> + '_ {
        self.sequence
            .iter()
            .enumerate()
            .map(|(idx, word)| (word.as_str(), self.word_display_state(idx)))
    }

    pub fn elapsed_description(&self, now: SystemTime) -> Elapsed {
        match (self.started_at, self.ended_at) {
            (None, _) => Elapsed::NotStarted,
            (Some(start), None) => Elapsed::InProgress {
                so_far: now.duration_since(start).unwrap_or_default(),
            },
            (Some(start), Some(end)) => Elapsed::Finished(end.duration_since(start).unwrap_or_default()),
        }
    }

    /// Time left before the session limit; frozen once finished.
    pub fn remaining(&self, now: SystemTime) -> Option<Duration> {
        let start = self.started_at?;
        let until = self.ended_at.unwrap_or(now);
        let elapsed = until.duration_since(start).unwrap_or_default();
        Some(self.config.session_duration.saturating_sub(elapsed))
    }

    pub fn remaining_description(&self, now: SystemTime) -> String {
        match self.remaining(now) {
            None => format!("{} seconds left", self.config.session_duration.as_secs()),
            Some(left) if left.is_zero() => "time is up".to_string(),
            Some(left) => format!("{} seconds left", left.as_secs()),
        }
    }

    pub fn summary(&self) -> Option<SessionSummary> {
        if !self.finished {
            return None;
        }
        let duration = match (self.started_at, self.ended_at) {
            (Some(start), Some(end)) => end.duration_since(start).unwrap_or_default(),
            _ => Duration::ZERO,
        };

        Some(SessionSummary {
            correct: self.correct_count,
            wrong: self.wrong_count,
            total: self.completed_words(),
            wpm: self.wpm.unwrap_or_default(),
            duration,
        })
    }
}

pub fn words_per_minute(correct: usize, elapsed: Duration) -> u32 {
    let minutes = elapsed.as_secs_f64() / 60.0;
    if minutes <= 0.0 {
        return 0;
    }
    (correct as f64 / minutes).round() as u32
}

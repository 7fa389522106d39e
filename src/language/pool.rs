use rand::seq::SliceRandom;
use rand::Rng;

use super::core::Catalog;
use crate::error::ConfigError;

/// Fold a word to the form used for comparisons. Turkish dotted capital
/// `İ` becomes plain `i` instead of `i` followed by a combining dot.
pub fn normalize(word: &str) -> String {
    word.chars()
        .map(|c| if c == 'İ' { 'i' } else { c })
        .collect::<String>()
        .to_lowercase()
}

/// Read-only set of candidate words that sequences are drawn from.
#[derive(Debug, Clone, PartialEq)]
pub struct WordPool {
    words: Vec<String>,
}

impl WordPool {
    /// Build a pool from raw words. Words are normalized so comparisons
    /// against user input only ever see one case.
    pub fn new<I, S>(words: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: Vec<String> = words
            .into_iter()
            .map(|w| normalize(w.as_ref().trim()))
            .filter(|w| !w.is_empty())
            .collect();

        if words.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }

        Ok(Self { words })
    }

    pub fn builtin() -> Result<Self, ConfigError> {
        Catalog::builtin().and_then(Self::try_from)
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.iter().any(|w| w == word)
    }

    /// Draw `count` words uniformly, with replacement.
    pub fn sample(&self, count: usize) -> Vec<String> {
        self.sample_with(count, &mut rand::thread_rng())
    }

    pub fn sample_with<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<String> {
        (0..count)
            .filter_map(|_| self.words.choose(rng).cloned())
            .collect()
    }
}

impl TryFrom<Catalog> for WordPool {
    type Error = ConfigError;

    fn try_from(catalog: Catalog) -> Result<Self, Self::Error> {
        Self::new(catalog.words)
    }
}

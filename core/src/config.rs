//! Configuration for the type system.
//!
//! The configuration is usually provided by the host application as a small TOML document:
//!
//! ```toml
//! [suggestions]
//! min_similarity = 0.7
//! max_suggestions = 3
//! builtin_aliases = true
//! ```
//!
//! Every field is optional and falls back to its default value.
use serde::Deserialize;

use crate::error::suggest::{MAX_SUGGESTIONS, MIN_SIMILARITY};

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// How replacements are suggested for unknown type and unit names.
    pub suggestions: SuggestConfig,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SuggestConfig {
    /// The minimum normalized edit-distance similarity, between `0` and `1`, for a name to be
    /// suggested. Names containing the user input (or contained in it) are always suggested.
    pub min_similarity: f64,
    /// The maximum number of suggestions attached to an error.
    pub max_suggestions: usize,
    /// If true, common names of other languages such as `int` or `string` are recognized and
    /// the corresponding builtin type is suggested.
    pub builtin_aliases: bool,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        SuggestConfig {
            min_similarity: MIN_SIMILARITY,
            max_suggestions: MAX_SUGGESTIONS,
            builtin_aliases: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("`min_similarity` must be between 0 and 1, got {0}")]
    MinSimilarity(f64),
}

impl Config {
    /// Parse a configuration from a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(s)?;
        let min_similarity = config.suggestions.min_similarity;

        if !(0.0..=1.0).contains(&min_similarity) {
            return Err(ConfigError::MinSimilarity(min_similarity));
        }

        Ok(config)
    }
}

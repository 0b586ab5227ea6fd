use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

pub const DEFAULT_OUTPUT: &str = "games.csv";
pub const DEFAULT_TAGS_FILE: &str = "tags";
const DEFAULT_DELAY_MS: u64 = 1000;
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Run settings: built-in defaults, then `ITCH_*` environment variables.
/// Command-line flags are applied on top by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub output: PathBuf,
    pub tags_file: PathBuf,
    pub delay_ms: u64,
    pub with_tags: bool,
    pub user_agent: String,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_env(Environment::with_prefix("ITCH").try_parsing(true))
    }

    fn from_env(env: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("output", DEFAULT_OUTPUT)?
            .set_default("tags_file", DEFAULT_TAGS_FILE)?
            .set_default("delay_ms", DEFAULT_DELAY_MS)?
            .set_default("with_tags", true)?
            .set_default("user_agent", DEFAULT_USER_AGENT)?
            .add_source(env)
            .build()?
            .try_deserialize()
    }

    /// Pause applied after every detail page.
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT),
            tags_file: PathBuf::from(DEFAULT_TAGS_FILE),
            delay_ms: DEFAULT_DELAY_MS,
            with_tags: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix("ITCH")
            .try_parsing(true)
            .source(Some(source))
    }

    #[test]
    fn defaults_without_environment() {
        let s = Settings::from_env(env(&[])).unwrap();
        assert_eq!(s.output, PathBuf::from("games.csv"));
        assert_eq!(s.tags_file, PathBuf::from("tags"));
        assert_eq!(s.delay(), Duration::from_secs(1));
        assert!(s.with_tags);
    }

    #[test]
    fn environment_overrides_defaults() {
        let s = Settings::from_env(env(&[
            ("ITCH_OUTPUT", "top.csv"),
            ("ITCH_DELAY_MS", "250"),
            ("ITCH_WITH_TAGS", "false"),
        ]))
        .unwrap();
        assert_eq!(s.output, PathBuf::from("top.csv"));
        assert_eq!(s.delay_ms, 250);
        assert!(!s.with_tags);
    }
}

use anyhow::{bail, Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails fast if required variables are missing or inconsistent.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    pub token_secret: String,
    pub port: u16,
    pub rust_log: String,
    pub default_target_questions: i32,
    pub default_difficulty_start: i32,
    pub difficulty_min: i32,
    pub difficulty_max: i32,
    pub max_consecutive_failures: i32,
    pub chain_timeout_secs: u64,
    pub fast_answer_threshold_ms: i64,
    pub token_ttl_hours: i64,
    pub cache_enabled: bool,
    pub cache_ttl_secs: u64,
    pub cache_max_entries: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            token_secret: require_env("TOKEN_SECRET")?,
            port: optional_env("PORT", "8080")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            default_target_questions: optional_env("DEFAULT_TARGET_QUESTIONS", "8")?,
            default_difficulty_start: optional_env("DEFAULT_DIFFICULTY_START", "5")?,
            difficulty_min: optional_env("DIFFICULTY_MIN", "3")?,
            difficulty_max: optional_env("DIFFICULTY_MAX", "10")?,
            max_consecutive_failures: optional_env("MAX_CONSECUTIVE_FAILURES", "3")?,
            chain_timeout_secs: optional_env("CHAIN_TIMEOUT_SECS", "60")?,
            fast_answer_threshold_ms: optional_env("FAST_ANSWER_THRESHOLD_MS", "10000")?,
            token_ttl_hours: optional_env("TOKEN_TTL_HOURS", "168")?,
            cache_enabled: optional_env("CACHE_ENABLED", "true")?,
            cache_ttl_secs: optional_env("CACHE_TTL_SECS", "3600")?,
            cache_max_entries: optional_env("CACHE_MAX_ENTRIES", "1000")?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.difficulty_min >= self.difficulty_max {
            bail!(
                "DIFFICULTY_MIN ({}) must be below DIFFICULTY_MAX ({})",
                self.difficulty_min,
                self.difficulty_max
            );
        }
        if self.default_difficulty_start < self.difficulty_min
            || self.default_difficulty_start > self.difficulty_max
        {
            bail!(
                "DEFAULT_DIFFICULTY_START ({}) must lie within [{}, {}]",
                self.default_difficulty_start,
                self.difficulty_min,
                self.difficulty_max
            );
        }
        if self.default_target_questions < 1 {
            bail!("DEFAULT_TARGET_QUESTIONS must be at least 1");
        }
        if self.max_consecutive_failures < 1 {
            bail!("MAX_CONSECUTIVE_FAILURES must be at least 1");
        }
        Ok(())
    }

    /// Interview-shaping knobs handed to the engine at startup.
    pub fn tuning(&self) -> InterviewTuning {
        InterviewTuning {
            default_target_questions: self.default_target_questions,
            default_difficulty_start: self.default_difficulty_start,
            difficulty_min: self.difficulty_min,
            difficulty_max: self.difficulty_max,
            max_consecutive_failures: self.max_consecutive_failures,
            fast_answer_threshold_ms: self.fast_answer_threshold_ms,
        }
    }
}

/// Knobs that shape every interview the engine runs.
/// Interviews copy `default_target_questions` and `default_difficulty_start`
/// onto their own row at creation; the rest apply live.
#[derive(Debug, Clone)]
pub struct InterviewTuning {
    pub default_target_questions: i32,
    pub default_difficulty_start: i32,
    pub difficulty_min: i32,
    pub difficulty_max: i32,
    pub max_consecutive_failures: i32,
    pub fast_answer_threshold_ms: i64,
}

impl Default for InterviewTuning {
    fn default() -> Self {
        InterviewTuning {
            default_target_questions: 8,
            default_difficulty_start: 5,
            difficulty_min: 3,
            difficulty_max: 10,
            max_consecutive_failures: 3,
            fast_answer_threshold_ms: 10_000,
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env<T: std::str::FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<T>()
        .with_context(|| format!("Environment variable '{key}' has an invalid value"))
}

#[cfg(test)]
mod tests {
    use super::*;

    // The one test that touches process env; keeping it alone in this
    // module avoids set_var races between parallel tests.
    #[test]
    fn test_cache_env_vars_are_honored() {
        std::env::set_var("DATABASE_URL", "postgres://localhost/inquisitor_test");
        std::env::set_var("ANTHROPIC_API_KEY", "test-key");
        std::env::set_var("TOKEN_SECRET", "test-secret");
        std::env::set_var("CACHE_ENABLED", "false");
        std::env::set_var("CACHE_TTL_SECS", "120");
        std::env::set_var("CACHE_MAX_ENTRIES", "7");

        let config = Config::from_env().unwrap();

        assert!(!config.cache_enabled);
        assert_eq!(config.cache_ttl_secs, 120);
        assert_eq!(config.cache_max_entries, 7);
    }
}

//! Configuration types.
//!
//! `RelayConfig` is built once at startup (see `main.rs`) and handed to each
//! component constructor. Nothing below `main` reads the environment.

use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::cms::duplicate::DuplicatePolicy;
use crate::error::ConfigError;
use crate::pipeline::orchestrator::ScriptPolicy;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";
const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_OPENROUTER_API_BASE: &str = "https://openrouter.ai";
const DEFAULT_APP_TITLE: &str = "Telegram News Bot";

/// Complete relay configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Address the webhook server binds to.
    pub bind_addr: String,
    pub telegram: TelegramConfig,
    pub generation: GenerationConfig,
    /// Gemini provider, absent when no API key is configured.
    pub gemini: Option<GeminiConfig>,
    /// OpenRouter provider, absent when no API key is configured.
    pub openrouter: Option<OpenRouterConfig>,
    pub wordpress: WordPressConfig,
}

/// Chat platform settings.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: SecretString,
    /// The only chat whose messages are processed.
    pub allowed_chat_id: String,
    /// Submitter ids whose posts skip draft review.
    pub trusted_submitters: Vec<String>,
    pub api_base: String,
}

/// Parameters shared by every rewrite provider.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub script_policy: ScriptPolicy,
    /// Per-call timeout for provider HTTP requests.
    pub timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            max_output_tokens: 900,
            script_policy: ScriptPolicy::RequireNonLatin,
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: SecretString,
    pub model: String,
    pub api_base: String,
    pub max_attempts: u32,
}

#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    pub api_key: SecretString,
    pub model: String,
    pub api_base: String,
    /// Sent as `HTTP-Referer`; OpenRouter uses it for app attribution.
    pub site_url: String,
    pub app_title: String,
    pub max_attempts: u32,
}

/// WordPress REST API settings.
#[derive(Debug, Clone)]
pub struct WordPressConfig {
    pub site_url: String,
    pub username: String,
    pub app_password: SecretString,
    pub timeout: Duration,
    pub duplicate_policy: DuplicatePolicy,
}

impl RelayConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(&lookup);

        let telegram = TelegramConfig {
            bot_token: SecretString::from(vars.required("TELEGRAM_BOT_TOKEN")?),
            allowed_chat_id: vars.required("ALLOWED_CHAT_ID")?,
            trusted_submitters: vars.list("TRUSTED_SUBMITTERS"),
            api_base: vars.or("TELEGRAM_API_BASE", DEFAULT_TELEGRAM_API_BASE),
        };

        let defaults = GenerationConfig::default();
        let generation = GenerationConfig {
            temperature: vars.parsed("SEO_TEMPERATURE", defaults.temperature)?,
            max_output_tokens: vars.parsed("SEO_MAX_OUTPUT_TOKENS", defaults.max_output_tokens)?,
            script_policy: vars.parsed("SEO_SCRIPT_POLICY", defaults.script_policy)?,
            timeout: Duration::from_secs(vars.parsed("PROVIDER_TIMEOUT_SECS", 10u64)?),
        };

        let site_url = vars
            .required("WP_SITE")?
            .trim_end_matches('/')
            .to_string();

        let gemini = match vars.optional("GEMINI_API_KEY") {
            Some(key) => Some(GeminiConfig {
                api_key: SecretString::from(key),
                model: vars.or("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
                api_base: vars.or("GEMINI_API_BASE", DEFAULT_GEMINI_API_BASE),
                max_attempts: vars.attempts("GEMINI_MAX_ATTEMPTS", 1)?,
            }),
            None => None,
        };

        let openrouter = match vars.optional("OPENROUTER_API_KEY") {
            Some(key) => Some(OpenRouterConfig {
                api_key: SecretString::from(key),
                model: vars.required("OPENROUTER_MODEL")?,
                api_base: vars.or("OPENROUTER_API_BASE", DEFAULT_OPENROUTER_API_BASE),
                site_url: site_url.clone(),
                app_title: DEFAULT_APP_TITLE.to_string(),
                max_attempts: vars.attempts("OPENROUTER_MAX_ATTEMPTS", 2)?,
            }),
            None => None,
        };

        let wordpress = WordPressConfig {
            site_url,
            username: vars.required("WP_USERNAME")?,
            app_password: SecretString::from(vars.required("WP_APP_PASSWORD")?),
            timeout: Duration::from_secs(vars.parsed("CMS_TIMEOUT_SECS", 10u64)?),
            duplicate_policy: vars.parsed("DUPLICATE_POLICY", DuplicatePolicy::AnyMatch)?,
        };

        Ok(Self {
            bind_addr: vars.or("RELAY_BIND_ADDR", DEFAULT_BIND_ADDR),
            telegram,
            generation,
            gemini,
            openrouter,
            wordpress,
        })
    }

    /// Names of the enabled rewrite providers, in priority order.
    pub fn provider_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.gemini.is_some() {
            names.push("gemini");
        }
        if self.openrouter.is_some() {
            names.push("openrouter");
        }
        names
    }
}

struct Vars<'a, F>(&'a F);

impl<F> Vars<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn list(&self, key: &str) -> Vec<String> {
        self.optional(key)
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    fn parsed<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(key) {
            Some(raw) => raw.parse::<T>().map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            }),
            None => Ok(default),
        }
    }

    fn attempts(&self, key: &str, default: u32) -> Result<u32, ConfigError> {
        let attempts = self.parsed(key, default)?;
        if attempts == 0 {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: "must be at least 1".into(),
            });
        }
        Ok(attempts)
    }
}

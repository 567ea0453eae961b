use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use validator::Validate;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub line: LineSettings,
    pub classifier: ClassifierSettings,
    #[serde(default)]
    pub reply: ReplySettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 10000 }
fn default_max_body_bytes() -> usize { 10 * 1024 * 1024 }

/// LINE Messaging API credentials and endpoints
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LineSettings {
    #[validate(length(min = 1))]
    pub channel_access_token: String,
    /// Channel secret used to verify `x-line-signature`. Verification is
    /// skipped entirely when this is unset or blank.
    #[serde(default)]
    pub channel_secret: Option<String>,
    #[serde(default = "default_content_api_base")]
    #[validate(url)]
    pub content_api_base: String,
    #[serde(default = "default_reply_url")]
    #[validate(url)]
    pub reply_url: String,
    #[serde(default = "default_line_timeout_secs")]
    #[validate(range(min = 1))]
    pub timeout_secs: u64,
}

impl LineSettings {
    pub fn signing_secret(&self) -> Option<&str> {
        self.channel_secret
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

fn default_content_api_base() -> String { "https://api-data.line.me/v2/bot/message".to_string() }
fn default_reply_url() -> String { "https://api.line.me/v2/bot/message/reply".to_string() }
fn default_line_timeout_secs() -> u64 { 10 }

/// External BMI classifier service
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ClassifierSettings {
    /// Service root. A trailing `/predict` is accepted and stripped.
    #[validate(url)]
    pub base_url: String,
    #[serde(default = "default_min_confidence")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub min_confidence: f64,
    #[serde(default = "default_classifier_timeout_secs")]
    #[validate(range(min = 1))]
    pub timeout_secs: u64,
    #[serde(default = "default_history_limit")]
    #[validate(range(min = 1, max = 50))]
    pub history_limit: u32,
}

impl ClassifierSettings {
    /// Base URL with any trailing slash and `/predict` suffix removed
    pub fn root_url(&self) -> &str {
        let trimmed = self.base_url.trim_end_matches('/');
        trimmed
            .strip_suffix("/predict")
            .unwrap_or(trimmed)
            .trim_end_matches('/')
    }

    pub fn predict_url(&self) -> String {
        format!("{}/predict", self.root_url())
    }

    pub fn history_url(&self) -> String {
        format!("{}/history", self.root_url())
    }
}

fn default_min_confidence() -> f64 { 0.45 }
fn default_classifier_timeout_secs() -> u64 { 30 }
fn default_history_limit() -> u32 { 5 }

/// Reply template assets
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReplySettings {
    #[serde(default = "default_image_base_url")]
    #[validate(url)]
    pub image_base_url: String,
}

impl Default for ReplySettings {
    fn default() -> Self {
        Self {
            image_base_url: default_image_base_url(),
        }
    }
}

fn default_image_base_url() -> String { "https://bmi-face-assets.onrender.com/line".to_string() }

/// Plain environment variable names accepted on top of the `BMIBOT__` keys.
/// These are the names the hosting dashboards were set up with.
const ENV_ALIASES: &[(&str, &str)] = &[
    ("LINE_CHANNEL_ACCESS_TOKEN", "line.channel_access_token"),
    ("LINE_CHANNEL_SECRET", "line.channel_secret"),
    ("AI_BACKEND_URL", "classifier.base_url"),
    ("MIN_CONFIDENCE", "classifier.min_confidence"),
    ("BMI_IMAGE_BASE_URL", "reply.image_base_url"),
    ("PORT", "server.port"),
];

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration files (config/default.toml, config/local.toml)
    /// 3. Environment variables prefixed with BMIBOT, e.g. BMIBOT__SERVER__PORT
    /// 4. Plain aliases such as LINE_CHANNEL_ACCESS_TOKEN or PORT
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(prefixed_env());

        Self::finish(builder, env_aliases(|name| std::env::var(name).ok()))
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(prefixed_env());

        Self::finish(builder, env_aliases(|name| std::env::var(name).ok()))
    }

    fn finish(
        mut builder: ConfigBuilder<DefaultState>,
        overrides: Vec<(&'static str, String)>,
    ) -> Result<Self, ConfigError> {
        for (key, value) in overrides {
            builder = builder.set_override(key, value)?;
        }

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.ensure_valid()?;
        Ok(settings)
    }

    /// Check field constraints that serde cannot express
    pub fn ensure_valid(&self) -> Result<(), ConfigError> {
        self.line.validate().map_err(|e| invalid("line", e))?;
        self.classifier.validate().map_err(|e| invalid("classifier", e))?;
        if !self.classifier.min_confidence.is_finite() {
            return Err(ConfigError::Message(format!(
                "invalid [classifier] settings: min_confidence must be a finite number, got {}",
                self.classifier.min_confidence
            )));
        }
        self.reply.validate().map_err(|e| invalid("reply", e))?;
        Ok(())
    }
}

fn prefixed_env() -> Environment {
    Environment::with_prefix("BMIBOT")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

fn env_aliases<F>(lookup: F) -> Vec<(&'static str, String)>
where
    F: Fn(&str) -> Option<String>,
{
    ENV_ALIASES
        .iter()
        .filter_map(|(name, key)| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .map(|value| (*key, value))
        })
        .collect()
}

fn invalid(section: &str, errors: validator::ValidationErrors) -> ConfigError {
    ConfigError::Message(format!("invalid [{}] settings: {}", section, errors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_builder() -> ConfigBuilder<DefaultState> {
        Config::builder()
            .set_override("line.channel_access_token", "token")
            .unwrap()
            .set_override("classifier.base_url", "https://classifier.test")
            .unwrap()
    }

    #[test]
    fn test_defaults_applied() {
        let settings = Settings::finish(base_builder(), vec![]).unwrap();

        assert_eq!(settings.server.port, 10000);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.classifier.min_confidence, 0.45);
        assert_eq!(settings.classifier.history_limit, 5);
        assert_eq!(settings.line.timeout_secs, 10);
        assert!(settings.line.signing_secret().is_none());
    }

    #[test]
    fn test_missing_token_fails() {
        let builder = Config::builder()
            .set_override("classifier.base_url", "https://classifier.test")
            .unwrap();

        assert!(Settings::finish(builder, vec![]).is_err());
    }

    #[test]
    fn test_missing_classifier_url_fails() {
        let builder = Config::builder()
            .set_override("line.channel_access_token", "token")
            .unwrap();

        assert!(Settings::finish(builder, vec![]).is_err());
    }

    #[test]
    fn test_out_of_range_confidence_rejected() {
        let overrides = vec![("classifier.min_confidence", "1.5".to_string())];
        let err = Settings::finish(base_builder(), overrides).unwrap_err();
        assert!(err.to_string().contains("classifier"));
    }

    #[test]
    fn test_nan_confidence_rejected() {
        let overrides = vec![("classifier.min_confidence", "NaN".to_string())];
        let err = Settings::finish(base_builder(), overrides).unwrap_err();
        assert!(err.to_string().contains("min_confidence"), "{}", err);
    }

    #[test]
    fn test_plain_aliases_override() {
        let env: HashMap<&str, &str> = [
            ("PORT", "8080"),
            ("MIN_CONFIDENCE", "0.6"),
            ("LINE_CHANNEL_SECRET", "   "),
        ]
        .into_iter()
        .collect();

        let overrides = env_aliases(|name| env.get(name).map(|v| v.to_string()));
        assert_eq!(overrides.len(), 2);

        let settings = Settings::finish(base_builder(), overrides).unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.classifier.min_confidence, 0.6);
        assert!(settings.line.signing_secret().is_none());
    }

    #[test]
    fn test_classifier_urls_accept_predict_suffix() {
        for base in [
            "https://ai.test",
            "https://ai.test/",
            "https://ai.test/predict",
            "https://ai.test/predict/",
        ] {
            let settings = ClassifierSettings {
                base_url: base.to_string(),
                min_confidence: default_min_confidence(),
                timeout_secs: 30,
                history_limit: 5,
            };
            assert_eq!(settings.predict_url(), "https://ai.test/predict", "base: {}", base);
            assert_eq!(settings.history_url(), "https://ai.test/history", "base: {}", base);
        }
    }
}

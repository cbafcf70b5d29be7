//! Configuration management for the trip planner
//!
//! Handles loading configuration from files, the `.keys` secrets file and
//! environment variables, and validates all settings once at startup. The
//! resulting value is immutable and handed to every component that needs it.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Deserializer, Serialize};

use crate::PlannerError;

/// How the agents obtain their results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AppMode {
    /// Local synthetic data, no network
    #[default]
    LocalDummy,
    /// Suggestions generated by the language model
    LlmSuggestions,
    /// Third-party service backends over HTTP
    LiveApi,
}

impl AppMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AppMode::LocalDummy => "local_dummy",
            AppMode::LlmSuggestions => "llm_suggestions",
            AppMode::LiveApi => "live_api",
        }
    }
}

impl std::fmt::Display for AppMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppMode {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "1" | "local_dummy" | "dummy" => Ok(AppMode::LocalDummy),
            "2" | "llm_suggestions" | "azure_suggestions" | "llm" => Ok(AppMode::LlmSuggestions),
            "3" | "live_api" | "live" => Ok(AppMode::LiveApi),
            other => Err(PlannerError::configuration(format!(
                "Invalid mode '{other}'. Must be one of: local_dummy (1), llm_suggestions (2), live_api (3)"
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for AppMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawMode {
            Number(u64),
            Text(String),
        }

        let raw = match RawMode::deserialize(deserializer)? {
            RawMode::Number(n) => n.to_string(),
            RawMode::Text(s) => s,
        };
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Strategy used by every agent
    pub mode: AppMode,
    /// Language model credentials
    pub llm: LlmConfig,
    /// Service backend settings for live mode
    pub services: ServicesConfig,
    pub orchestration: OrchestrationConfig,
    /// Synthetic backend behaviour
    pub mock: MockConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// Azure OpenAI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub deployment: Option<String>,
    pub endpoint: Option<String>,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub api_version: String,
    pub temperature: f32,
    pub timeout_seconds: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    /// Base URL of the weather/hotel/restaurant/route backend
    pub base_url: String,
    pub timeout_seconds: u32,
    /// Retries for transient failures (connection errors, 5xx)
    pub max_retries: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestrationConfig {
    pub destination: String,
    /// A stage running longer than this is treated as failed
    pub stage_timeout_seconds: u32,
    /// Offset from the window start used when the calendar stage fails
    pub default_start_offset_days: u32,
    pub include_hotels: bool,
    /// Attempts per reservation before reporting a failed booking
    pub reservation_attempts: u32,
}

/// Failure probabilities of the synthetic backends, each in [0, 1]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FailureRates {
    pub weather: f64,
    pub route: f64,
    pub hotel_search: f64,
    pub restaurant_search: f64,
    pub hotel_reservation: f64,
    pub restaurant_reservation: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MockConfig {
    /// Seed for reproducible synthetic data; entropy when absent
    pub seed: Option<u64>,
    pub failure_rates: FailureRates,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Port of the synthetic service backend
    pub mock_port: u16,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
    /// OTLP/HTTP collector endpoint for span export
    pub otlp_endpoint: Option<String>,
}

// Default value functions
fn default_api_version() -> String {
    "2024-02-15-preview".to_string()
}

fn default_services_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_destination() -> String {
    "Yellowstone National Park".to_string()
}

fn default_stage_timeout() -> u32 {
    30
}

fn default_start_offset() -> u32 {
    7
}

fn default_reservation_attempts() -> u32 {
    3
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            deployment: None,
            endpoint: None,
            api_key: None,
            api_version: default_api_version(),
            temperature: 0.1,
            timeout_seconds: 60,
        }
    }
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            base_url: default_services_base_url(),
            timeout_seconds: 10,
            max_retries: 2,
        }
    }
}

impl Default for OrchestrationConfig {
    fn default() -> Self {
        Self {
            destination: default_destination(),
            stage_timeout_seconds: default_stage_timeout(),
            default_start_offset_days: default_start_offset(),
            include_hotels: true,
            reservation_attempts: default_reservation_attempts(),
        }
    }
}

impl Default for FailureRates {
    fn default() -> Self {
        Self {
            weather: 0.0,
            route: 0.0,
            hotel_search: 0.0,
            restaurant_search: 0.0,
            hotel_reservation: 0.10,
            restaurant_reservation: 0.15,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            mock_port: 8000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            otlp_endpoint: None,
        }
    }
}

impl PlannerConfig {
    /// Load configuration from file, secrets file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.or_else(Self::find_config_file);

        if let Some(config_file) = config_file.filter(|path| path.exists()) {
            builder = builder.add_source(
                File::from(config_file)
                    .required(false)
                    .format(FileFormat::Toml),
            );
        }

        // Add environment variable overrides, e.g. PARKPLANNER__SERVER__PORT=9000
        builder = builder.add_source(
            Environment::with_prefix("PARKPLANNER")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: PlannerConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        // Secrets file first, then the plain variables the deployment sets
        let keys_path = Path::new(".keys");
        if keys_path.exists() {
            let contents = fs::read_to_string(keys_path)
                .with_context(|| format!("Failed to read {}", keys_path.display()))?;
            config.apply_overrides(parse_keys_file(&contents))?;
        }
        config.apply_overrides(unicode_vars(std::env::vars_os()))?;

        // Apply defaults for missing values
        config.apply_defaults();

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// `./parkplanner.toml` if present, otherwise the user config directory
    #[must_use]
    pub fn find_config_file() -> Option<PathBuf> {
        let local = PathBuf::from("parkplanner.toml");
        if local.exists() {
            return Some(local);
        }
        Self::get_config_path()
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("parkplanner").join("config.toml"))
    }

    /// Apply `KEY=VALUE` settings using the variable names of the deployment
    /// environment. Unknown keys are ignored.
    pub fn apply_overrides<I, K, V>(&mut self, vars: I) -> Result<(), PlannerError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (key, value) in vars {
            let value: String = value.into();
            let value = value.trim().to_string();
            if value.is_empty() {
                continue;
            }
            match key.as_ref().trim() {
                "APP_MODE" => self.mode = value.parse()?,
                "AZURE_OPENAI_DEPLOYMENT" => self.llm.deployment = Some(value),
                "AZURE_OPENAI_ENDPOINT" => self.llm.endpoint = Some(value),
                "AZURE_OPENAI_API_KEY" => self.llm.api_key = Some(value),
                "OPENAI_API_VERSION" => self.llm.api_version = value,
                _ => {}
            }
        }
        Ok(())
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.llm.api_version.is_empty() {
            self.llm.api_version = default_api_version();
        }
        if self.services.base_url.is_empty() {
            self.services.base_url = default_services_base_url();
        }
        if self.orchestration.destination.trim().is_empty() {
            self.orchestration.destination = default_destination();
        }
        if self.orchestration.stage_timeout_seconds == 0 {
            self.orchestration.stage_timeout_seconds = default_stage_timeout();
        }
        if self.orchestration.reservation_attempts == 0 {
            self.orchestration.reservation_attempts = default_reservation_attempts();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Check that the selected mode has everything it needs. Runs when the
    /// orchestrator is built, so a misconfigured server still starts and
    /// reports the problem per request.
    pub fn validate_for_mode(&self) -> crate::Result<()> {
        if self.mode != AppMode::LlmSuggestions {
            return Ok(());
        }

        let missing: Vec<&str> = [
            ("AZURE_OPENAI_DEPLOYMENT", &self.llm.deployment),
            ("AZURE_OPENAI_ENDPOINT", &self.llm.endpoint),
            ("AZURE_OPENAI_API_KEY", &self.llm.api_key),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().is_none_or(|v| v.trim().is_empty()))
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(PlannerError::configuration(format!(
                "Missing required Azure OpenAI configuration: {}",
                missing.join(", ")
            )))
        }
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.orchestration.stage_timeout_seconds > 600 {
            return Err(
                PlannerError::configuration("Stage timeout cannot exceed 600 seconds").into(),
            );
        }

        if self.orchestration.default_start_offset_days > 365 {
            return Err(PlannerError::configuration(
                "Default start offset cannot exceed 365 days",
            )
            .into());
        }

        if self.orchestration.reservation_attempts > 10 {
            return Err(
                PlannerError::configuration("Reservation attempts cannot exceed 10").into(),
            );
        }

        if self.services.timeout_seconds == 0 || self.services.timeout_seconds > 300 {
            return Err(PlannerError::configuration(
                "Service timeout must be between 1 and 300 seconds",
            )
            .into());
        }

        if self.services.max_retries > 10 {
            return Err(
                PlannerError::configuration("Service max retries cannot exceed 10").into(),
            );
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(
                PlannerError::configuration("LLM temperature must be between 0 and 2").into(),
            );
        }

        let rates = &self.mock.failure_rates;
        for (name, rate) in [
            ("weather", rates.weather),
            ("route", rates.route),
            ("hotel_search", rates.hotel_search),
            ("restaurant_search", rates.restaurant_search),
            ("hotel_reservation", rates.hotel_reservation),
            ("restaurant_reservation", rates.restaurant_reservation),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(PlannerError::configuration(format!(
                    "Failure rate '{name}' must be between 0 and 1, got {rate}"
                ))
                .into());
            }
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(PlannerError::configuration(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(PlannerError::configuration(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Service base URL", Some(&self.services.base_url)),
            ("Azure OpenAI endpoint", self.llm.endpoint.as_ref()),
            ("OTLP endpoint", self.logging.otlp_endpoint.as_ref()),
        ] {
            if let Some(url) = url {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(PlannerError::configuration(format!(
                        "{name} must be a valid HTTP or HTTPS URL"
                    ))
                    .into());
                }
            }
        }

        Ok(())
    }
}

/// Environment entries whose name and value are valid Unicode; others are
/// skipped rather than aborting startup
fn unicode_vars<I>(vars: I) -> impl Iterator<Item = (String, String)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
}

/// Parse `KEY=VALUE` lines; blank lines and `#` comments are skipped
#[must_use]
pub fn parse_keys_file(contents: &str) -> Vec<(String, String)> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            (key.trim().to_string(), value.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[cfg(unix)]
    #[test]
    fn test_non_unicode_environment_is_skipped() {
        use std::os::unix::ffi::OsStringExt;

        let vars = vec![
            (OsString::from("APP_MODE"), OsString::from("2")),
            (OsString::from("LANG_BROKEN"), OsString::from_vec(vec![0x66, 0x6f, 0xff])),
            (OsString::from_vec(vec![0xfe, 0x41]), OsString::from("x")),
        ];
        let kept: Vec<(String, String)> = unicode_vars(vars).collect();
        assert_eq!(kept, vec![("APP_MODE".to_string(), "2".to_string())]);

        let mut config = PlannerConfig::default();
        config.apply_overrides(kept).unwrap();
        assert_eq!(config.mode, AppMode::LlmSuggestions);
    }

    #[test]
    fn test_default_config() {
        let config = PlannerConfig::default();
        assert_eq!(config.mode, AppMode::LocalDummy);
        assert_eq!(config.services.base_url, "http://localhost:8000");
        assert_eq!(config.orchestration.destination, "Yellowstone National Park");
        assert_eq!(config.orchestration.stage_timeout_seconds, 30);
        assert_eq!(config.mock.failure_rates.hotel_reservation, 0.10);
        assert_eq!(config.mock.failure_rates.restaurant_reservation, 0.15);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[rstest]
    #[case("1", AppMode::LocalDummy)]
    #[case("local_dummy", AppMode::LocalDummy)]
    #[case("2", AppMode::LlmSuggestions)]
    #[case("AZURE_SUGGESTIONS", AppMode::LlmSuggestions)]
    #[case("3", AppMode::LiveApi)]
    #[case("live-api", AppMode::LiveApi)]
    fn test_mode_parsing(#[case] input: &str, #[case] expected: AppMode) {
        assert_eq!(input.parse::<AppMode>().unwrap(), expected);
    }

    #[test]
    fn test_mode_deserializes_from_number() {
        let mode: AppMode = serde_json::from_str("3").unwrap();
        assert_eq!(mode, AppMode::LiveApi);
        let mode: AppMode = serde_json::from_str("\"llm_suggestions\"").unwrap();
        assert_eq!(mode, AppMode::LlmSuggestions);
        assert!(serde_json::from_str::<AppMode>("7").is_err());
    }

    #[test]
    fn test_llm_mode_requires_credentials() {
        let mut config = PlannerConfig {
            mode: AppMode::LlmSuggestions,
            ..PlannerConfig::default()
        };
        let err = config.validate_for_mode().unwrap_err();
        assert!(matches!(err, PlannerError::Configuration { .. }));
        assert!(err.to_string().contains("AZURE_OPENAI_API_KEY"));

        config.llm.deployment = Some("gpt-4o".to_string());
        config.llm.endpoint = Some("https://example.openai.azure.com".to_string());
        config.llm.api_key = Some("secret".to_string());
        assert!(config.validate_for_mode().is_ok());
    }

    #[test]
    fn test_dummy_mode_needs_no_credentials() {
        assert!(PlannerConfig::default().validate_for_mode().is_ok());
    }

    #[test]
    fn test_keys_file_overrides() {
        let contents = "# local secrets\nAPP_MODE=2\nAZURE_OPENAI_DEPLOYMENT = gpt-4o\nAZURE_OPENAI_API_KEY=\"abc123\"\n\nUNRELATED=1\n";
        let mut config = PlannerConfig::default();
        config.apply_overrides(parse_keys_file(contents)).unwrap();
        assert_eq!(config.mode, AppMode::LlmSuggestions);
        assert_eq!(config.llm.deployment.as_deref(), Some("gpt-4o"));
        assert_eq!(config.llm.api_key.as_deref(), Some("abc123"));
        assert_eq!(config.llm.api_version, "2024-02-15-preview");
    }

    #[test]
    fn test_invalid_app_mode_rejected() {
        let mut config = PlannerConfig::default();
        let result = config.apply_overrides([("APP_MODE", "9")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = PlannerConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_failure_rate_range() {
        let mut config = PlannerConfig::default();
        config.mock.failure_rates.route = 1.5;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("route"));
    }

    #[test]
    fn test_config_validation_base_url() {
        let mut config = PlannerConfig::default();
        config.services.base_url = "localhost:8000".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = PlannerConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("parkplanner"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }
}

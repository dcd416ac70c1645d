use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub(super) server: ServerSettings,
    pub(super) runtime: RuntimeSettings,
    pub(super) api: ApiSettings,
    pub(super) security: SecuritySettings,
    pub(super) cors: CorsSettings,
    pub(super) practice: PracticeSettings,
    pub(super) upload: UploadSettings,
    pub(super) telemetry: TelemetrySettings,
}

#[derive(Debug, Clone)]
pub(crate) struct ServerSettings {
    pub(super) host: ServerHost,
    pub(super) port: ServerPort,
}

#[derive(Debug, Clone)]
pub(crate) struct ApiSettings {
    pub(crate) project_name: String,
    pub(crate) version: String,
    pub(crate) api_v1_str: String,
}

#[derive(Debug, Clone)]
pub(crate) struct SecuritySettings {
    pub(crate) secret_key: String,
    pub(crate) access_token_expire_minutes: u64,
    pub(crate) algorithm: String,
}

#[derive(Debug, Clone)]
pub(crate) struct CorsSettings {
    pub(crate) origins: Vec<String>,
}

/// Practice-test sessions: sample size and the simulated evaluation delay.
#[derive(Debug, Clone)]
pub(crate) struct PracticeSettings {
    pub(crate) questions_per_session: usize,
    pub(crate) evaluation_delay_min: Duration,
    pub(crate) evaluation_delay_max: Duration,
    pub(crate) rng_seed: Option<u64>,
}

/// Upload pipeline timings and file acceptance rules.
#[derive(Debug, Clone)]
pub(crate) struct UploadSettings {
    pub(crate) tick: Duration,
    pub(crate) step_min: u8,
    pub(crate) step_max: u8,
    pub(crate) analysis_start_delay: Duration,
    pub(crate) analysis_duration: Duration,
    pub(crate) result_clear_delay: Duration,
    pub(crate) max_upload_size_mb: u64,
    pub(crate) max_files_per_batch: usize,
    pub(crate) allowed_extensions: Vec<String>,
    pub(crate) rng_seed: Option<u64>,
}

#[derive(Debug, Clone)]
pub(crate) struct TelemetrySettings {
    pub(crate) log_level: String,
    pub(crate) json: bool,
    pub(crate) prometheus_enabled: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct RuntimeSettings {
    pub(crate) environment: Environment,
    pub(crate) strict_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Environment {
    Development,
    Production,
    Staging,
    Test,
}

impl Environment {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Staging => "staging",
            Self::Test => "test",
        }
    }

    pub(super) fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ServerHost(pub(super) String);

#[derive(Debug, Clone, Copy)]
pub(crate) struct ServerPort(pub(super) u16);

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("invalid server host: {0}")]
    InvalidHost(String),
    #[error("invalid server port: {0}")]
    InvalidPort(String),
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
    #[error("invalid cors origins: {0}")]
    InvalidCors(String),
    #[error("missing required secret for {0}")]
    MissingSecret(&'static str),
}

impl UploadSettings {
    pub(crate) fn max_upload_bytes(&self) -> u64 {
        self.max_upload_size_mb * 1024 * 1024
    }

    /// Whole multipart body: every allowed file at full size plus 1 MiB for
    /// the text parts and framing.
    pub(crate) fn max_request_bytes(&self) -> u64 {
        self.max_upload_bytes() * self.max_files_per_batch as u64 + 1024 * 1024
    }
}

impl Default for PracticeSettings {
    fn default() -> Self {
        Self {
            questions_per_session: 2,
            evaluation_delay_min: Duration::from_millis(5_000),
            evaluation_delay_max: Duration::from_millis(8_000),
            rng_seed: None,
        }
    }
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(800),
            step_min: 2,
            step_max: 10,
            analysis_start_delay: Duration::from_millis(1_000),
            analysis_duration: Duration::from_millis(60_000),
            result_clear_delay: Duration::from_millis(1_000),
            max_upload_size_mb: 10,
            max_files_per_batch: 10,
            allowed_extensions: ["pdf", "doc", "docx", "jpg", "jpeg", "png"]
                .iter()
                .map(|item| item.to_string())
                .collect(),
            rng_seed: None,
        }
    }
}

impl ServerHost {
    pub(super) fn parse(value: String) -> Result<Self, ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::InvalidHost(value));
        }

        Ok(Self(value))
    }
}

impl ServerPort {
    pub(super) fn parse(value: String) -> Result<Self, ConfigError> {
        let parsed: u16 = value.parse().map_err(|_| ConfigError::InvalidPort(value.clone()))?;
        if parsed == 0 {
            return Err(ConfigError::InvalidPort(value));
        }

        Ok(Self(parsed))
    }
}

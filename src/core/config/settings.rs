use super::parsing::{
    env_optional, env_or_default, is_supported_upload_extension, parse_bool, parse_cors_origins,
    parse_environment, parse_millis, parse_seed, parse_string_list, parse_u64, parse_u8,
    parse_usize,
};
use super::secret::load_or_create_secret_key;
use super::types::{
    ApiSettings, ConfigError, CorsSettings, PracticeSettings, RuntimeSettings, SecuritySettings,
    ServerHost, ServerPort, ServerSettings, Settings, TelemetrySettings, UploadSettings,
};

const DEFAULT_UPLOAD_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "jpg", "jpeg", "png"];

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let host = env_or_default("EXAMEVAL_HOST", "0.0.0.0");
        let port = env_or_default("EXAMEVAL_PORT", "5001");

        let environment = parse_environment(
            env_optional("EXAMEVAL_ENV").or_else(|| env_optional("ENVIRONMENT")),
        );
        let strict_config = env_optional("EXAMEVAL_STRICT_CONFIG")
            .map(|value| parse_bool(&value))
            .unwrap_or(false)
            || environment.is_production();

        let project_name = env_or_default("PROJECT_NAME", "ExamEval API");
        let version = env_or_default("VERSION", env!("CARGO_PKG_VERSION"));
        let api_v1_str = env_or_default("API_V1_STR", "/api/v1");

        let explicit_secret = env_optional("SECRET_KEY");
        if strict_config && explicit_secret.is_none() {
            return Err(ConfigError::MissingSecret("SECRET_KEY"));
        }
        let secret_key = match explicit_secret {
            Some(value) => value,
            None => load_or_create_secret_key(),
        };

        let access_token_expire_minutes = parse_u64(
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            env_or_default("ACCESS_TOKEN_EXPIRE_MINUTES", "10080"),
        )?;
        let algorithm = env_or_default("ALGORITHM", "HS256");

        let cors_origins = parse_cors_origins(env_optional("BACKEND_CORS_ORIGINS"))?;

        let rng_seed = parse_seed(env_optional("EXAMEVAL_RNG_SEED"))?;

        let questions_per_session = parse_usize(
            "PRACTICE_QUESTIONS_PER_SESSION",
            env_or_default("PRACTICE_QUESTIONS_PER_SESSION", "2"),
        )?;
        let evaluation_delay_min = parse_millis(
            "EVALUATION_DELAY_MIN_MS",
            env_or_default("EVALUATION_DELAY_MIN_MS", "5000"),
        )?;
        let evaluation_delay_max = parse_millis(
            "EVALUATION_DELAY_MAX_MS",
            env_or_default("EVALUATION_DELAY_MAX_MS", "8000"),
        )?;

        let tick = parse_millis("UPLOAD_TICK_MS", env_or_default("UPLOAD_TICK_MS", "800"))?;
        let step_min = parse_u8("UPLOAD_STEP_MIN", env_or_default("UPLOAD_STEP_MIN", "2"))?;
        let step_max = parse_u8("UPLOAD_STEP_MAX", env_or_default("UPLOAD_STEP_MAX", "10"))?;
        let analysis_start_delay = parse_millis(
            "ANALYSIS_START_DELAY_MS",
            env_or_default("ANALYSIS_START_DELAY_MS", "1000"),
        )?;
        let analysis_duration = parse_millis(
            "ANALYSIS_DURATION_MS",
            env_or_default("ANALYSIS_DURATION_MS", "60000"),
        )?;
        let result_clear_delay = parse_millis(
            "RESULT_CLEAR_DELAY_MS",
            env_or_default("RESULT_CLEAR_DELAY_MS", "1000"),
        )?;
        let max_upload_size_mb =
            parse_u64("MAX_UPLOAD_SIZE_MB", env_or_default("MAX_UPLOAD_SIZE_MB", "10"))?;
        let max_files_per_batch =
            parse_usize("MAX_UPLOAD_FILES", env_or_default("MAX_UPLOAD_FILES", "10"))?;
        let allowed_extensions = parse_string_list(
            env_optional("ALLOWED_UPLOAD_EXTENSIONS"),
            DEFAULT_UPLOAD_EXTENSIONS,
        );

        let log_level = env_or_default("EXAMEVAL_LOG_LEVEL", "info");
        let json = env_optional("EXAMEVAL_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);
        let prometheus_enabled =
            env_optional("PROMETHEUS_ENABLED").map(|value| parse_bool(&value)).unwrap_or(false);

        let settings = Self {
            server: ServerSettings { host: ServerHost::parse(host)?, port: ServerPort::parse(port)? },
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings { project_name, version, api_v1_str },
            security: SecuritySettings { secret_key, access_token_expire_minutes, algorithm },
            cors: CorsSettings { origins: cors_origins },
            practice: PracticeSettings {
                questions_per_session,
                evaluation_delay_min,
                evaluation_delay_max,
                rng_seed,
            },
            upload: UploadSettings {
                tick,
                step_min,
                step_max,
                analysis_start_delay,
                analysis_duration,
                result_clear_delay,
                max_upload_size_mb,
                max_files_per_batch,
                allowed_extensions,
                rng_seed,
            },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
        };

        settings.validate()?;

        Ok(settings)
    }

    pub(crate) fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host.0, self.server.port.0)
    }

    pub(crate) fn server_host(&self) -> &str {
        &self.server.host.0
    }

    pub(crate) fn server_port(&self) -> u16 {
        self.server.port.0
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn security(&self) -> &SecuritySettings {
        &self.security
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn practice(&self) -> &PracticeSettings {
        &self.practice
    }

    pub(crate) fn upload(&self) -> &UploadSettings {
        &self.upload
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.practice.questions_per_session == 0 {
            return Err(ConfigError::InvalidValue {
                field: "PRACTICE_QUESTIONS_PER_SESSION",
                value: String::from("0"),
            });
        }
        if self.practice.evaluation_delay_min > self.practice.evaluation_delay_max {
            return Err(ConfigError::InvalidValue {
                field: "EVALUATION_DELAY_MIN_MS",
                value: self.practice.evaluation_delay_min.as_millis().to_string(),
            });
        }

        if self.upload.tick.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "UPLOAD_TICK_MS",
                value: String::from("0"),
            });
        }
        if self.upload.step_min == 0 || self.upload.step_min > self.upload.step_max {
            return Err(ConfigError::InvalidValue {
                field: "UPLOAD_STEP_MIN",
                value: self.upload.step_min.to_string(),
            });
        }
        if self.upload.max_files_per_batch == 0 {
            return Err(ConfigError::InvalidValue {
                field: "MAX_UPLOAD_FILES",
                value: String::from("0"),
            });
        }
        if self.upload.allowed_extensions.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "ALLOWED_UPLOAD_EXTENSIONS",
                value: String::from("<empty>"),
            });
        }
        for extension in &self.upload.allowed_extensions {
            if !is_supported_upload_extension(extension) {
                return Err(ConfigError::InvalidValue {
                    field: "ALLOWED_UPLOAD_EXTENSIONS",
                    value: extension.clone(),
                });
            }
        }

        Ok(())
    }
}

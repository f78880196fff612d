use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use giclass_common::{Error, Result};

/// Default location of the trained classifier artifact
pub const DEFAULT_MODEL_PATH: &str = "model/final_gi_model.h5";

/// Named configuration profile, selected by `GICLASS_ENV`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Development,
    Production,
    Testing,
}

impl Variant {
    /// Resolve a profile by name; unset or unrecognized names select the
    /// default (development) profile.
    pub fn resolve(name: Option<&str>) -> Self {
        match name {
            Some("production") => Variant::Production,
            Some("testing") => Variant::Testing,
            _ => Variant::Development,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Development => "development",
            Variant::Production => "production",
            Variant::Testing => "testing",
        }
    }
}

/// Environment inputs captured once at startup.
///
/// Empty values count as unset. Tests construct this directly instead of
/// mutating the process environment.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub environment: Option<String>,
    pub secret_key: Option<String>,
    pub mail_server: Option<String>,
    pub mail_port: Option<String>,
    pub mail_use_tls: Option<String>,
    pub mail_username: Option<String>,
    pub mail_password: Option<String>,
    pub log_level: Option<String>,
}

impl EnvOverrides {
    /// Capture the configuration-relevant environment variables
    pub fn capture() -> Self {
        Self {
            environment: env_var("GICLASS_ENV"),
            secret_key: env_var("SECRET_KEY"),
            mail_server: env_var("MAIL_SERVER"),
            mail_port: env_var("MAIL_PORT"),
            mail_use_tls: env_var("MAIL_USE_TLS"),
            mail_username: env_var("MAIL_USERNAME"),
            mail_password: env_var("MAIL_PASSWORD"),
            log_level: env_var("LOG_LEVEL"),
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

/// Prediction confidence thresholds, ordered high > medium > low
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceThresholds {
    pub high: f32,
    pub medium: f32,
    pub low: f32,
}

/// Outbound mail configuration (notifications)
#[derive(Debug, Clone, PartialEq)]
pub struct MailSettings {
    pub server: Option<String>,
    pub port: u16,
    pub use_tls: bool,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Session cookie attributes applied by the server
#[derive(Debug, Clone, PartialEq)]
pub struct SessionCookie {
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<String>,
}

/// Runtime settings, immutable after construction
#[derive(Debug, Clone)]
pub struct Settings {
    pub variant: Variant,
    pub debug: bool,
    pub testing: bool,
    pub secret_key: String,
    pub host: String,
    pub port: u16,
    pub max_content_length: usize,
    pub upload_dir: PathBuf,
    pub allowed_extensions: HashSet<String>,
    pub model_path: PathBuf,
    pub model_input_size: [usize; 3],
    pub thresholds: ConfidenceThresholds,
    pub max_batch_size: usize,
    pub batch_timeout: Duration,
    pub app_name: String,
    pub app_version: String,
    pub app_description: String,
    pub send_file_max_age: Duration,
    pub mail: MailSettings,
    pub log_level: String,
    pub log_file: PathBuf,
    pub security_headers: Vec<(String, String)>,
    pub session_cookie: SessionCookie,
    pub csrf_enabled: bool,
}

impl Settings {
    /// Base defaults shared by every profile
    fn base(env: &EnvOverrides) -> Result<Self> {
        let mail_port = match &env.mail_port {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| Error::Config(format!("invalid MAIL_PORT value: {value}")))?,
            None => 587,
        };

        Ok(Self {
            variant: Variant::Development,
            debug: false,
            testing: false,
            secret_key: env
                .secret_key
                .clone()
                .unwrap_or_else(|| "dev-secret-key-change-in-production".to_string()),
            host: "127.0.0.1".to_string(),
            port: 5000,
            max_content_length: 10 * 1024 * 1024,
            upload_dir: PathBuf::from("static/uploads"),
            allowed_extensions: ["png", "jpg", "jpeg", "gif", "bmp", "webp"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            model_input_size: [224, 224, 3],
            thresholds: ConfidenceThresholds {
                high: 0.8,
                medium: 0.6,
                low: 0.4,
            },
            max_batch_size: 10,
            batch_timeout: Duration::from_secs(300),
            app_name: "GI Disease AI Classifier".to_string(),
            app_version: "2.0".to_string(),
            app_description: "Advanced machine learning for gastrointestinal condition analysis"
                .to_string(),
            send_file_max_age: Duration::from_secs(3600),
            mail: MailSettings {
                server: env.mail_server.clone(),
                port: mail_port,
                use_tls: env.mail_use_tls.as_deref().map_or(true, parse_bool),
                username: env.mail_username.clone(),
                password: env.mail_password.clone(),
            },
            log_level: env.log_level.clone().unwrap_or_else(|| "INFO".to_string()),
            log_file: PathBuf::from("logs/gi_classifier.log"),
            security_headers: default_security_headers(),
            session_cookie: SessionCookie {
                secure: false,
                http_only: true,
                same_site: None,
            },
            csrf_enabled: true,
        })
    }

    /// Build the settings for a profile: base defaults plus the profile's
    /// overrides, applied functionally.
    pub fn for_variant(variant: Variant, env: &EnvOverrides) -> Result<Self> {
        let mut settings = Self::base(env)?;
        settings.variant = variant;

        match variant {
            Variant::Development => {
                settings.debug = true;
                settings.secret_key = "dev-secret-key".to_string();
                // Relaxed security for development
                settings.security_headers.clear();
            }
            Variant::Production => {
                settings.secret_key = env
                    .secret_key
                    .clone()
                    .filter(|key| !key.is_empty())
                    .ok_or_else(|| {
                        Error::Config("no SECRET_KEY set for production environment".to_string())
                    })?;
                settings.session_cookie = SessionCookie {
                    secure: true,
                    http_only: true,
                    same_site: Some("Lax".to_string()),
                };
            }
            Variant::Testing => {
                settings.debug = true;
                settings.testing = true;
                settings.csrf_enabled = false;
                settings.upload_dir = PathBuf::from("tests/uploads");
            }
        }

        Ok(settings)
    }
}

/// Resolve settings for the named profile, falling back to the profile
/// selected by `GICLASS_ENV` when no name is given.
///
/// The production profile fails here, before anything is returned, when no
/// secret key is available from the environment.
pub fn get_settings(name: Option<&str>) -> Result<Settings> {
    let env = EnvOverrides::capture();
    let variant = Variant::resolve(name.or(env.environment.as_deref()));
    Settings::for_variant(variant, &env)
}

fn parse_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "on" | "1")
}

fn default_security_headers() -> Vec<(String, String)> {
    [
        ("X-Content-Type-Options", "nosniff"),
        ("X-Frame-Options", "DENY"),
        ("X-XSS-Protection", "1; mode=block"),
        (
            "Strict-Transport-Security",
            "max-age=31536000; includeSubDomains",
        ),
    ]
    .iter()
    .map(|(name, value)| (name.to_string(), value.to_string()))
    .collect()
}

mod artifact;
mod conditions;
mod logging;
mod paths;
mod settings;

#[cfg(test)]
mod tests;

pub use artifact::{InputShape, ModelArtifact};
pub use conditions::{format_label, ConditionInfo, ConditionRegistry, Severity, KNOWN_LABELS};
pub use logging::{init_logging, LogLineFormat, RotatingFileAppender, LOG_BACKUP_COUNT, LOG_MAX_BYTES};
pub use paths::{ensure_directory, model_artifact_exists};
pub use settings::{
    get_settings, ConfidenceThresholds, EnvOverrides, MailSettings, SessionCookie, Settings,
    Variant, DEFAULT_MODEL_PATH,
};

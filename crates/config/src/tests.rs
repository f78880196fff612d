#[cfg(test)]
mod tests {
    use crate::conditions::*;
    use crate::settings::*;
    use giclass_common::{Error, Result};

    #[test]
    fn test_load_default_conditions() -> Result<()> {
        let registry = ConditionRegistry::load_defaults()?;

        assert_eq!(registry.len(), KNOWN_LABELS.len());
        assert!(!registry.is_empty());
        for label in KNOWN_LABELS {
            assert!(registry.contains(label), "missing record for {label}");
        }

        Ok(())
    }

    #[test]
    fn test_labels_are_sorted() -> Result<()> {
        let registry = ConditionRegistry::load_defaults()?;

        let labels = registry.labels();
        assert_eq!(labels.len(), 8);
        assert_eq!(labels[0], "dyed-lifted-polyps");
        assert_eq!(labels[7], "ulcerative-colitis");

        Ok(())
    }

    #[test]
    fn test_known_condition_lookup() -> Result<()> {
        let registry = ConditionRegistry::load_defaults()?;

        let polyps = registry.get("polyps");
        assert_eq!(polyps.name, "Intestinal Polyps");
        assert_eq!(polyps.severity, Severity::MediumRisk);
        assert_eq!(polyps.color, "#f59e0b");
        assert_eq!(polyps.icon, "fa-exclamation-triangle");
        assert_eq!(polyps.treatment_needed, Some(true));
        assert_eq!(polyps.urgency, "Schedule within 2-4 weeks");
        assert_eq!(polyps.treatment_options.len(), 3);
        assert_eq!(polyps.lifestyle_recommendations.len(), 4);

        let colitis = registry.get("ulcerative-colitis");
        assert_eq!(colitis.severity, Severity::HighRisk);
        assert_eq!(colitis.urgency, "Consult immediately");

        let margins = registry.get("dyed-resection-margins");
        assert_eq!(margins.severity, Severity::PostSurgical);

        Ok(())
    }

    #[test]
    fn test_unknown_labels_get_sentinel() -> Result<()> {
        let registry = ConditionRegistry::load_defaults()?;

        for label in ["", "POLYPS", "unknown-thing", "polyps "] {
            let info = registry.get(label);
            assert_eq!(info.severity, Severity::Unknown, "label {label:?}");
            assert_eq!(info.name, "Unknown Condition");
            assert_eq!(info.color, "#6b7280");
            assert_eq!(info.icon, "fa-question-circle");
            assert_eq!(info.treatment_needed, None);
            assert_eq!(info.urgency, "Consult healthcare provider");
            assert_eq!(
                info.treatment_options,
                vec!["Medical evaluation recommended"]
            );
            assert_eq!(info, registry.unknown());
        }

        Ok(())
    }

    #[test]
    fn test_treatment_needed_flags() -> Result<()> {
        let registry = ConditionRegistry::load_defaults()?;

        for label in KNOWN_LABELS {
            let expected = !label.starts_with("normal-");
            assert_eq!(
                registry.get(label).treatment_needed,
                Some(expected),
                "label {label}"
            );
        }

        Ok(())
    }

    #[test]
    fn test_severity_tiers() -> Result<()> {
        let registry = ConditionRegistry::load_defaults()?;

        let normal = KNOWN_LABELS
            .iter()
            .filter(|label| registry.get(label).severity == Severity::Normal)
            .count();
        let medium = KNOWN_LABELS
            .iter()
            .filter(|label| registry.get(label).severity == Severity::MediumRisk)
            .count();
        assert_eq!(normal, 3);
        assert_eq!(medium, 3);

        Ok(())
    }

    #[test]
    fn test_severity_display_strings() {
        assert_eq!(Severity::Normal.to_string(), "Normal");
        assert_eq!(Severity::MediumRisk.to_string(), "Medium Risk");
        assert_eq!(Severity::HighRisk.to_string(), "High Risk");
        assert_eq!(Severity::PostSurgical.to_string(), "Post-Surgical");
        assert_eq!(Severity::Unknown.to_string(), "Unknown");

        // serde uses the same display strings
        let json = serde_json::to_value(Severity::PostSurgical).unwrap();
        assert_eq!(json, "Post-Surgical");
    }

    #[test]
    fn test_duplicate_label_rejected() {
        let json = r##"{
            "version": "1.0",
            "conditions": [
                {"label": "polyps", "name": "A", "description": "", "severity": "Normal",
                 "color": "#fff", "icon": "fa-x", "treatment_needed": false, "urgency": "",
                 "treatment_options": [], "lifestyle_recommendations": []},
                {"label": "polyps", "name": "B", "description": "", "severity": "Normal",
                 "color": "#fff", "icon": "fa-x", "treatment_needed": false, "urgency": "",
                 "treatment_options": [], "lifestyle_recommendations": []}
            ],
            "unknown": {"name": "Unknown Condition", "description": "", "severity": "Unknown",
                 "color": "#6b7280", "icon": "fa-question-circle", "treatment_needed": null,
                 "urgency": "", "treatment_options": [], "lifestyle_recommendations": []}
        }"##;

        let result = ConditionRegistry::load_from_json(json);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_sentinel_severity_validated() {
        let json = r##"{
            "version": "1.0",
            "conditions": [],
            "unknown": {"name": "Unknown Condition", "description": "", "severity": "Normal",
                 "color": "#6b7280", "icon": "fa-question-circle", "treatment_needed": null,
                 "urgency": "", "treatment_options": [], "lifestyle_recommendations": []}
        }"##;

        let result = ConditionRegistry::load_from_json(json);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_format_label() {
        assert_eq!(format_label("dyed-lifted-polyps"), "Dyed Lifted Polyps");
        assert_eq!(format_label("normal_z_line"), "Normal Z Line");
        assert_eq!(format_label("esophagitis"), "Esophagitis");
        assert_eq!(format_label(""), "");
        assert_eq!(format_label("POLYPS"), "Polyps");
        assert_eq!(format_label("mixed-case_INPUT"), "Mixed Case Input");
    }

    #[test]
    fn test_format_label_idempotent_on_formatted_input() {
        let formatted = format_label("ulcerative-colitis");
        assert_eq!(format_label(&formatted), formatted);
    }

    #[test]
    fn test_variant_resolution() {
        assert_eq!(Variant::resolve(Some("production")), Variant::Production);
        assert_eq!(Variant::resolve(Some("testing")), Variant::Testing);
        assert_eq!(Variant::resolve(Some("development")), Variant::Development);
        // unset or unrecognized fall back to the default profile
        assert_eq!(Variant::resolve(None), Variant::Development);
        assert_eq!(Variant::resolve(Some("staging")), Variant::Development);
        assert_eq!(Variant::resolve(Some("")), Variant::Development);
    }

    #[test]
    fn test_get_settings_with_explicit_name() -> Result<()> {
        // an explicit name wins over whatever GICLASS_ENV says
        let settings = get_settings(Some("development"))?;
        assert_eq!(settings.variant, Variant::Development);
        assert!(settings.debug);

        Ok(())
    }

    #[test]
    fn test_base_defaults() -> Result<()> {
        let settings = Settings::for_variant(Variant::Development, &EnvOverrides::default())?;

        assert_eq!(settings.max_content_length, 10 * 1024 * 1024);
        assert_eq!(settings.model_path.to_str().unwrap(), DEFAULT_MODEL_PATH);
        assert_eq!(settings.model_input_size, [224, 224, 3]);
        assert_eq!(settings.max_batch_size, 10);
        assert_eq!(settings.batch_timeout.as_secs(), 300);
        assert_eq!(settings.send_file_max_age.as_secs(), 3600);
        assert_eq!(settings.app_name, "GI Disease AI Classifier");
        assert_eq!(settings.app_version, "2.0");
        assert_eq!(settings.log_level, "INFO");
        assert_eq!(
            settings.log_file.to_str().unwrap(),
            "logs/gi_classifier.log"
        );

        for ext in ["png", "jpg", "jpeg", "gif", "bmp", "webp"] {
            assert!(settings.allowed_extensions.contains(ext));
        }
        assert_eq!(settings.allowed_extensions.len(), 6);

        Ok(())
    }

    #[test]
    fn test_development_settings() -> Result<()> {
        let settings = Settings::for_variant(Variant::Development, &EnvOverrides::default())?;

        assert_eq!(settings.variant, Variant::Development);
        assert!(settings.debug);
        assert!(!settings.testing);
        assert_eq!(settings.secret_key, "dev-secret-key");
        assert!(settings.security_headers.is_empty());
        assert!(!settings.session_cookie.secure);

        Ok(())
    }

    #[test]
    fn test_testing_settings() -> Result<()> {
        let settings = Settings::for_variant(Variant::Testing, &EnvOverrides::default())?;

        assert!(settings.debug);
        assert!(settings.testing);
        assert!(!settings.csrf_enabled);
        assert_eq!(settings.upload_dir.to_str().unwrap(), "tests/uploads");
        // only development relaxes the security headers
        assert_eq!(settings.security_headers.len(), 4);

        Ok(())
    }

    #[test]
    fn test_production_requires_secret_key() {
        let result = Settings::for_variant(Variant::Production, &EnvOverrides::default());
        assert!(matches!(result, Err(Error::Config(_))));

        let empty = EnvOverrides {
            secret_key: Some(String::new()),
            ..EnvOverrides::default()
        };
        let result = Settings::for_variant(Variant::Production, &empty);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_production_settings_with_secret_key() -> Result<()> {
        let env = EnvOverrides {
            secret_key: Some("s3cr3t".to_string()),
            ..EnvOverrides::default()
        };
        let settings = Settings::for_variant(Variant::Production, &env)?;

        assert!(!settings.debug);
        assert_eq!(settings.secret_key, "s3cr3t");
        assert!(settings.session_cookie.secure);
        assert!(settings.session_cookie.http_only);
        assert_eq!(settings.session_cookie.same_site.as_deref(), Some("Lax"));
        assert_eq!(settings.security_headers.len(), 4);
        assert!(settings
            .security_headers
            .iter()
            .any(|(name, value)| name == "X-Frame-Options" && value == "DENY"));

        Ok(())
    }

    #[test]
    fn test_mail_defaults() -> Result<()> {
        let settings = Settings::for_variant(Variant::Development, &EnvOverrides::default())?;

        assert_eq!(settings.mail.server, None);
        assert_eq!(settings.mail.port, 587);
        assert!(settings.mail.use_tls);
        assert_eq!(settings.mail.username, None);

        Ok(())
    }

    #[test]
    fn test_mail_overrides() -> Result<()> {
        let env = EnvOverrides {
            mail_server: Some("smtp.example.org".to_string()),
            mail_port: Some("2525".to_string()),
            mail_use_tls: Some("off".to_string()),
            mail_username: Some("notifier".to_string()),
            ..EnvOverrides::default()
        };
        let settings = Settings::for_variant(Variant::Development, &env)?;

        assert_eq!(settings.mail.server.as_deref(), Some("smtp.example.org"));
        assert_eq!(settings.mail.port, 2525);
        assert!(!settings.mail.use_tls);
        assert_eq!(settings.mail.username.as_deref(), Some("notifier"));

        Ok(())
    }

    #[test]
    fn test_mail_use_tls_parsing() -> Result<()> {
        for (value, expected) in [
            ("true", true),
            ("TRUE", true),
            ("on", true),
            ("1", true),
            ("false", false),
            ("0", false),
            ("yes", false),
        ] {
            let env = EnvOverrides {
                mail_use_tls: Some(value.to_string()),
                ..EnvOverrides::default()
            };
            let settings = Settings::for_variant(Variant::Development, &env)?;
            assert_eq!(settings.mail.use_tls, expected, "value {value:?}");
        }

        Ok(())
    }

    #[test]
    fn test_invalid_mail_port_rejected() {
        let env = EnvOverrides {
            mail_port: Some("smtp".to_string()),
            ..EnvOverrides::default()
        };
        let result = Settings::for_variant(Variant::Development, &env);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_log_level_override() -> Result<()> {
        let env = EnvOverrides {
            log_level: Some("DEBUG".to_string()),
            ..EnvOverrides::default()
        };
        let settings = Settings::for_variant(Variant::Development, &env)?;
        assert_eq!(settings.log_level, "DEBUG");

        Ok(())
    }

    #[test]
    fn test_confidence_thresholds_ordered() -> Result<()> {
        let settings = Settings::for_variant(Variant::Development, &EnvOverrides::default())?;
        let thresholds = settings.thresholds;

        assert!(thresholds.high > thresholds.medium);
        assert!(thresholds.medium > thresholds.low);
        assert!(thresholds.low > 0.0 && thresholds.high <= 1.0);

        Ok(())
    }
}

//! INI parsing: the single place where key names map to struct fields.

use ini::{Ini, Properties};

use super::file::{expand_tilde, ConfigFileError};
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [session] section
    if let Some(section) = ini.section(Some("session")) {
        if let Some(v) = section.get("desired_accuracy") {
            config.session.desired_accuracy = parse_meters("session", "desired_accuracy", v)?;
            if config.session.desired_accuracy == 0.0 {
                return Err(invalid(
                    "session",
                    "desired_accuracy",
                    v,
                    "must be greater than zero",
                ));
            }
        }
        if let Some(v) = section.get("max_sample_age") {
            config.session.max_sample_age = parse_seconds("session", "max_sample_age", v)?;
        }
        if let Some(v) = section.get("stall_distance") {
            config.session.stall_distance = parse_meters("session", "stall_distance", v)?;
        }
        if let Some(v) = section.get("stall_interval") {
            config.session.stall_interval = parse_seconds("session", "stall_interval", v)?;
        }
        if let Some(v) = section.get("timeout") {
            config.session.timeout = parse_seconds("session", "timeout", v)?;
        }
    }

    // [geocoder] section
    if let Some(section) = ini.section(Some("geocoder")) {
        if let Some(v) = section.get("url") {
            let v = v.trim();
            if !(v.starts_with("http://") || v.starts_with("https://")) {
                return Err(invalid("geocoder", "url", v, "must be an http(s) URL"));
            }
            config.geocoder.url = v.to_string();
        }
        if let Some(v) = section.get("timeout") {
            config.geocoder.timeout = parse_seconds("geocoder", "timeout", v)?;
        }
        if let Some(v) = section.get("user_agent") {
            let v = v.trim();
            if v.is_empty() {
                return Err(invalid(
                    "geocoder",
                    "user_agent",
                    v,
                    "must not be empty (Nominatim rejects anonymous clients)",
                ));
            }
            config.geocoder.user_agent = v.to_string();
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = non_empty(section, "directory") {
            config.logging.directory = expand_tilde(v);
        }
        if let Some(v) = non_empty(section, "file") {
            config.logging.file = v.to_string();
        }
    }

    // [store] section
    if let Some(section) = ini.section(Some("store")) {
        if let Some(v) = non_empty(section, "path") {
            config.store.path = expand_tilde(v);
        }
    }

    Ok(config)
}

fn non_empty<'a>(section: &'a Properties, key: &str) -> Option<&'a str> {
    section.get(key).map(str::trim).filter(|v| !v.is_empty())
}

fn parse_meters(section: &str, key: &str, value: &str) -> Result<f64, ConfigFileError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .ok_or_else(|| invalid(section, key, value, "must be a non-negative number (meters)"))
}

fn parse_seconds(section: &str, key: &str, value: &str) -> Result<u64, ConfigFileError> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| invalid(section, key, value, "must be a positive integer (seconds)"))
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn parse(content: &str) -> Result<ConfigFile, ConfigFileError> {
        ConfigFile::from_ini_str(content)
    }

    #[test]
    fn test_empty_is_default() {
        assert_eq!(parse("").unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_full_config() {
        let config = parse(
            r#"
[session]
desired_accuracy = 15.5
max_sample_age = 3
stall_distance = 2
stall_interval = 20
timeout = 120

[geocoder]
url = http://localhost:8080/reverse
timeout = 4
user_agent = geofix-test/1.0

[logging]
directory = /tmp/geofix-logs
file = run.log

[store]
path = /tmp/geofix/locations.jsonl
"#,
        )
        .unwrap();

        assert_eq!(config.session.desired_accuracy, 15.5);
        assert_eq!(config.session.max_sample_age, 3);
        assert_eq!(config.session.stall_distance, 2.0);
        assert_eq!(config.session.stall_interval, 20);
        assert_eq!(config.session.timeout, 120);
        assert_eq!(config.geocoder.url, "http://localhost:8080/reverse");
        assert_eq!(config.geocoder.timeout, 4);
        assert_eq!(config.geocoder.user_agent, "geofix-test/1.0");
        assert_eq!(config.logging.directory, PathBuf::from("/tmp/geofix-logs"));
        assert_eq!(config.logging.file, "run.log");
        assert_eq!(config.store.path, PathBuf::from("/tmp/geofix/locations.jsonl"));
    }

    #[test]
    fn test_session_config_conversion() {
        let config = parse("[session]\ntimeout = 30\nstall_interval = 4").unwrap();
        let session = config.session.to_session_config();
        assert_eq!(session.timeout.as_secs(), 30);
        assert_eq!(session.stall_interval.as_secs(), 4);
        assert_eq!(session.desired_accuracy_m, 10.0);
    }

    #[test]
    fn test_invalid_timeout() {
        let err = parse("[session]\ntimeout = soon").unwrap_err();
        match err {
            ConfigFileError::InvalidValue { section, key, .. } => {
                assert_eq!(section, "session");
                assert_eq!(key, "timeout");
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(parse("[session]\ntimeout = 0").is_err());
    }

    #[test]
    fn test_invalid_accuracy() {
        assert!(parse("[session]\ndesired_accuracy = -3").is_err());
        assert!(parse("[session]\ndesired_accuracy = 0").is_err());
        assert!(parse("[session]\ndesired_accuracy = NaN").is_err());
    }

    #[test]
    fn test_invalid_geocoder_values() {
        assert!(parse("[geocoder]\nurl = ftp://example.com").is_err());
        assert!(parse("[geocoder]\ntimeout = -1").is_err());
    }

    #[test]
    fn test_blank_paths_keep_defaults() {
        let config = parse("[store]\npath =\n[logging]\nfile = ").unwrap();
        assert_eq!(config.store, ConfigFile::default().store);
        assert_eq!(config.logging.file, "geofix.log");
    }

    #[test]
    fn test_error_message() {
        let err = parse("[geocoder]\ntimeout = x").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid configuration: geocoder.timeout = 'x' - must be a positive integer (seconds)"
        );
    }

    #[test]
    fn test_distance_error_names_its_key() {
        let err = parse("[session]\nstall_distance = far").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid configuration: session.stall_distance = 'far' - must be a non-negative number (meters)"
        );
    }
}

//! Layered settings: defaults, then a TOML file, then environment, then flags.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context};
use postfeed_core::{OverlapPolicy, DEFAULT_ENDPOINT};
use serde::Deserialize;

/// File read from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "postfeed.toml";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub endpoint: String,
    pub timeout: Duration,
    pub overlap: OverlapPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            overlap: OverlapPolicy::default(),
        }
    }
}

/// Shape of `postfeed.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    endpoint: Option<String>,
    timeout_secs: Option<u64>,
    overlap: Option<OverlapPolicy>,
}

/// Values given on the command line; they win over everything else.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
    pub overlap: Option<OverlapPolicy>,
}

impl Settings {
    pub fn load(config_path: Option<&Path>, overrides: &Overrides) -> anyhow::Result<Self> {
        let file = read_config_file(config_path)?;
        Self::layered(file, |key| std::env::var(key).ok(), overrides)
    }

    fn layered(
        file: Option<FileSettings>,
        env: impl Fn(&str) -> Option<String>,
        overrides: &Overrides,
    ) -> anyhow::Result<Self> {
        let mut settings = Settings::default();

        if let Some(file) = file {
            if let Some(v) = file.endpoint {
                settings.endpoint = v;
            }
            if let Some(v) = file.timeout_secs {
                settings.timeout = Duration::from_secs(v);
            }
            if let Some(v) = file.overlap {
                settings.overlap = v;
            }
        }

        if let Some(v) = env("POSTFEED_ENDPOINT") {
            settings.endpoint = v;
        }
        if let Some(v) = env("POSTFEED_TIMEOUT_SECS") {
            let secs: u64 = v
                .parse()
                .with_context(|| format!("POSTFEED_TIMEOUT_SECS is not a number: {v}"))?;
            settings.timeout = Duration::from_secs(secs);
        }
        if let Some(v) = env("POSTFEED_OVERLAP") {
            settings.overlap = v.parse().map_err(anyhow::Error::msg)?;
        }

        if let Some(v) = &overrides.endpoint {
            settings.endpoint = v.clone();
        }
        if let Some(v) = overrides.timeout_secs {
            settings.timeout = Duration::from_secs(v);
        }
        if let Some(v) = overrides.overlap {
            settings.overlap = v;
        }

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            bail!("endpoint must be an http(s) URL, got `{}`", self.endpoint);
        }
        if self.timeout.is_zero() {
            bail!("timeout must be at least one second");
        }
        Ok(())
    }
}

/// An explicit path must exist; the default file is optional.
fn read_config_file(path: Option<&Path>) -> anyhow::Result<Option<FileSettings>> {
    let (path, required) = match path {
        Some(p) => (p, true),
        None => (Path::new(DEFAULT_CONFIG_FILE), false),
    };

    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read {}", path.display()));
        }
    };
    let file = toml::from_str(&raw).with_context(|| format!("invalid config in {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config file");
    Ok(Some(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn file(raw: &str) -> FileSettings {
        toml::from_str(raw).unwrap()
    }

    #[test]
    fn defaults_point_at_public_api() {
        let settings = Settings::layered(None, no_env, &Overrides::default()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert_eq!(settings.overlap, OverlapPolicy::NewestIssued);
    }

    #[test]
    fn file_values_apply() {
        let f = file(
            r#"
            endpoint = "http://localhost:3000/posts"
            timeout_secs = 5
            overlap = "last-completed"
            "#,
        );
        let settings = Settings::layered(Some(f), no_env, &Overrides::default()).unwrap();
        assert_eq!(settings.endpoint, "http://localhost:3000/posts");
        assert_eq!(settings.timeout, Duration::from_secs(5));
        assert_eq!(settings.overlap, OverlapPolicy::LastCompleted);
    }

    #[test]
    fn unknown_file_key_is_rejected() {
        let result: Result<FileSettings, _> = toml::from_str("retries = 3");
        assert!(result.is_err());
    }

    #[test]
    fn env_beats_file_and_flags_beat_env() {
        let f = file(r#"endpoint = "http://file/posts""#);
        let env = |key: &str| match key {
            "POSTFEED_ENDPOINT" => Some("http://env/posts".to_string()),
            "POSTFEED_TIMEOUT_SECS" => Some("7".to_string()),
            _ => None,
        };

        let settings = Settings::layered(Some(f), env, &Overrides::default()).unwrap();
        assert_eq!(settings.endpoint, "http://env/posts");
        assert_eq!(settings.timeout, Duration::from_secs(7));

        let overrides = Overrides {
            endpoint: Some("http://flag/posts".to_string()),
            ..Overrides::default()
        };
        let f = file(r#"endpoint = "http://file/posts""#);
        let settings = Settings::layered(Some(f), env, &overrides).unwrap();
        assert_eq!(settings.endpoint, "http://flag/posts");
        assert_eq!(settings.timeout, Duration::from_secs(7));
    }

    #[test]
    fn bad_env_timeout_is_an_error() {
        let env = |key: &str| (key == "POSTFEED_TIMEOUT_SECS").then(|| "soon".to_string());
        let err = Settings::layered(None, env, &Overrides::default()).unwrap_err();
        assert!(err.to_string().contains("POSTFEED_TIMEOUT_SECS"));
    }

    #[test]
    fn bad_env_overlap_is_an_error() {
        let env = |key: &str| (key == "POSTFEED_OVERLAP").then(|| "random".to_string());
        assert!(Settings::layered(None, env, &Overrides::default()).is_err());
    }

    #[test]
    fn non_http_endpoint_is_rejected() {
        let overrides = Overrides {
            endpoint: Some("ftp://example.com/posts".to_string()),
            ..Overrides::default()
        };
        assert!(Settings::layered(None, no_env, &overrides).is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let overrides = Overrides {
            timeout_secs: Some(0),
            ..Overrides::default()
        };
        assert!(Settings::layered(None, no_env, &overrides).is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let path = std::env::temp_dir().join("postfeed-does-not-exist.toml");
        assert!(read_config_file(Some(&path)).is_err());
    }

    #[test]
    fn explicit_file_is_read() {
        let path = std::env::temp_dir().join(format!("postfeed-test-{}.toml", std::process::id()));
        fs::write(&path, "timeout_secs = 12\n").unwrap();
        let f = read_config_file(Some(&path)).unwrap().unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(f.timeout_secs, Some(12));
    }
}

use anyhow::{Context as _, anyhow};
use parsec_domain::paths;
use std::path::PathBuf;
use std::time::Duration;

use crate::env::{home_dir, optional_trimmed_path_from_env, optional_trimmed_string_from_env};
use crate::time::unix_epoch_nanos_now;

/// Runtime settings for the storage and query backends, read from `PARSEC_*` variables.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BackendConfig {
    pub parsec_root: PathBuf,
    pub api_url: String,
    pub http_timeout: Duration,
}

impl BackendConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let parsec_root = resolve_parsec_root()?;

        let api_url = optional_trimmed_string_from_env(paths::PARSEC_API_URL_ENV)?
            .unwrap_or_else(|| paths::DEFAULT_API_URL.to_owned());

        let http_timeout = match optional_trimmed_string_from_env(
            paths::PARSEC_HTTP_TIMEOUT_SECS_ENV,
        )? {
            Some(raw) => parse_timeout_secs(&raw).with_context(|| {
                format!("invalid {}", paths::PARSEC_HTTP_TIMEOUT_SECS_ENV)
            })?,
            None => Duration::from_secs(paths::DEFAULT_HTTP_TIMEOUT_SECS),
        };

        Ok(Self {
            parsec_root,
            api_url,
            http_timeout,
        })
    }

    pub fn sqlite_path(&self) -> PathBuf {
        paths::sqlite_path(&self.parsec_root)
    }
}

fn parse_timeout_secs(raw: &str) -> anyhow::Result<Duration> {
    let secs: u64 = raw
        .parse()
        .with_context(|| format!("'{raw}' is not a whole number of seconds"))?;
    if secs == 0 {
        return Err(anyhow!("timeout must be at least one second"));
    }
    Ok(Duration::from_secs(secs))
}

fn resolve_parsec_root() -> anyhow::Result<PathBuf> {
    if let Some(root) = optional_trimmed_path_from_env(paths::PARSEC_ROOT_ENV)? {
        return Ok(root);
    }

    if cfg!(test) {
        let nanos = unix_epoch_nanos_now();
        let pid = std::process::id();
        return Ok(std::env::temp_dir().join(format!("parsec-test-{pid}-{nanos}")));
    }

    Ok(home_dir()?.join(".parsec"))
}

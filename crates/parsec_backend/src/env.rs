use anyhow::anyhow;
use std::path::PathBuf;

pub(crate) fn optional_trimmed_string_from_env(name: &str) -> anyhow::Result<Option<String>> {
    let value = match std::env::var_os(name) {
        Some(value) => value,
        None => return Ok(None),
    };

    let value = value.to_string_lossy();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("{name} is set but empty"));
    }

    Ok(Some(trimmed.to_owned()))
}

pub(crate) fn optional_trimmed_path_from_env(name: &str) -> anyhow::Result<Option<PathBuf>> {
    Ok(optional_trimmed_string_from_env(name)?.map(PathBuf::from))
}

pub(crate) fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var_os("HOME").ok_or_else(|| anyhow!("HOME is not set"))?;
    Ok(PathBuf::from(home))
}

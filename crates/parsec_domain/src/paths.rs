use std::path::{Path, PathBuf};

pub const PARSEC_ROOT_ENV: &str = "PARSEC_ROOT";
pub const PARSEC_API_URL_ENV: &str = "PARSEC_API_URL";
pub const PARSEC_HTTP_TIMEOUT_SECS_ENV: &str = "PARSEC_HTTP_TIMEOUT_SECS";

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080/api/";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

pub fn sqlite_path(parsec_root: &Path) -> PathBuf {
    parsec_root.join("parsec.db")
}

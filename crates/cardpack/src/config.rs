use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::cli::GlobalArgs;

pub const BASE_URL_ENV: &str = "CARDPACK_BASE_URL";
pub const TOKEN_ENV: &str = "CARDPACK_TOKEN";

/// On-disk configuration. Every field is optional; flags and environment
/// variables take precedence.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub output_dir: Option<PathBuf>,
}

impl FileConfig {
    fn parse(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("invalid config file {}", path.display()))
    }
}

/// Effective configuration after merging file, environment and flags.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub token: String,
    pub output_dir: PathBuf,
}

pub fn default_path() -> Option<PathBuf> {
    home::home_dir().map(|home| home.join(".config").join("cardpack").join("config.toml"))
}

fn load_file(explicit: Option<&Path>) -> Result<FileConfig> {
    match explicit {
        // An explicitly requested file must exist.
        Some(path) => FileConfig::parse(path),
        None => match default_path() {
            Some(path) if path.is_file() => FileConfig::parse(&path),
            _ => Ok(FileConfig::default()),
        },
    }
}

/// Resolve the effective configuration: flags over environment over file.
///
/// A missing base URL or token is a configuration error, reported before
/// any network call is attempted.
pub fn resolve(globals: &GlobalArgs) -> Result<Config> {
    let file = load_file(globals.config.as_deref())?;

    let base_url = globals
        .base_url
        .clone()
        .or_else(|| std::env::var(BASE_URL_ENV).ok())
        .or(file.base_url)
        .with_context(|| {
            format!("no portal base URL configured; pass --base-url, set {BASE_URL_ENV}, or add base_url to the config file")
        })?;

    let token = globals
        .token
        .clone()
        .or_else(|| std::env::var(TOKEN_ENV).ok())
        .or(file.token)
        .with_context(|| {
            format!("no bearer token configured; pass --token, set {TOKEN_ENV}, or add token to the config file")
        })?;

    let output_dir = file.output_dir.unwrap_or_else(|| PathBuf::from("."));

    Ok(Config {
        base_url,
        token,
        output_dir,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "base_url = \"https://portal.example.org/api\"\ntoken = \"tok\"\noutput_dir = \"/tmp/cards\"\n",
        )
        .unwrap();

        let config = FileConfig::parse(&path).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("https://portal.example.org/api"));
        assert_eq!(config.token.as_deref(), Some("tok"));
        assert_eq!(config.output_dir, Some(PathBuf::from("/tmp/cards")));
    }

    #[test]
    fn flags_override_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "base_url = \"https://file.example.org\"\ntoken = \"file-tok\"\n").unwrap();

        let globals = GlobalArgs {
            config: Some(path),
            base_url: Some("https://flag.example.org".to_string()),
            token: None,
        };
        let config = resolve(&globals).unwrap();
        assert_eq!(config.base_url, "https://flag.example.org");
        assert_eq!(config.token, "file-tok");
        assert_eq!(config.output_dir, PathBuf::from("."));
    }

    #[test]
    fn explicit_missing_config_file_is_an_error() {
        let globals = GlobalArgs {
            config: Some(PathBuf::from("/nonexistent/cardpack.toml")),
            base_url: None,
            token: None,
        };
        assert!(resolve(&globals).is_err());
    }
}

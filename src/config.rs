//! Configuration for denuncias.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (DENUNCIAS_HOME, DENUNCIAS_LEGAL_TABLE,
//!    DENUNCIAS_STORE, DENUNCIAS_DETECTOR_ENDPOINT, DENUNCIAS_DETECTOR_TOKEN)
//! 2. Config file (.denuncias/config.yaml)
//! 3. Defaults (~/.denuncias)
//!
//! Config file discovery:
//! - Searches current directory and parents for .denuncias/config.yaml
//! - `home` is relative to the .denuncias/ directory, other paths are
//!   relative to its parent (the project root)

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::DEFAULT_DETECTION_TIMEOUT;
use crate::domain::MAX_CONTENT_CHARS;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

const CONFIG_DIR: &str = ".denuncias";
const LEGAL_TABLE_FILE: &str = "delitos_y_penas.csv";
const STORE_FILE: &str = "data/denuncias_registradas.csv";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub detector: Option<DetectorConfig>,
    #[serde(default)]
    pub limits: Option<LimitsConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// State directory (relative to .denuncias/)
    pub home: Option<String>,
    /// Legal reference table (relative to project root)
    pub legal_table: Option<String>,
    /// Complaint store file (relative to project root)
    pub store: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetectorConfig {
    /// Remote detection endpoint; the fixed detector is used when absent
    pub endpoint: Option<String>,
    /// Labels for the fixed detector
    pub labels: Option<Vec<String>>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    pub max_content_chars: Option<usize>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// State directory
    pub home: PathBuf,
    /// Legal reference table path
    pub legal_table: PathBuf,
    /// Complaint store path
    pub store: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    /// Detector settings
    pub detector: DetectorSettings,
    /// Maximum complaint content length in characters
    pub max_content_chars: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectorSettings {
    pub endpoint: Option<String>,
    pub token: Option<String>,
    pub labels: Option<Vec<String>>,
    pub timeout: Duration,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            token: None,
            labels: None,
            timeout: DEFAULT_DETECTION_TIMEOUT,
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(CONFIG_DIR).join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to `base`
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(CONFIG_DIR);

    resolve_config(find_config_file(), default_home, |key| std::env::var(key).ok())
}

/// Combine an optional config file, a default home and an environment lookup
fn resolve_config(
    config_file: Option<PathBuf>,
    default_home: PathBuf,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ResolvedConfig> {
    let config = match config_file {
        Some(ref path) => Some(load_config_file(path)?),
        None => None,
    };

    // .denuncias/ and the project root above it
    let config_dir = config_file
        .as_deref()
        .and_then(Path::parent)
        .unwrap_or(Path::new("."));
    let project_root = config_dir.parent().unwrap_or(Path::new("."));

    let paths = config.as_ref().map(|c| c.paths.clone()).unwrap_or_default();

    let home = if let Some(env_home) = env("DENUNCIAS_HOME") {
        PathBuf::from(env_home)
    } else if let Some(ref home_path) = paths.home {
        resolve_path(config_dir, home_path)
    } else {
        default_home
    };

    let legal_table = if let Some(env_table) = env("DENUNCIAS_LEGAL_TABLE") {
        PathBuf::from(env_table)
    } else if let Some(ref table_path) = paths.legal_table {
        resolve_path(project_root, table_path)
    } else {
        home.join(LEGAL_TABLE_FILE)
    };

    let store = if let Some(env_store) = env("DENUNCIAS_STORE") {
        PathBuf::from(env_store)
    } else if let Some(ref store_path) = paths.store {
        resolve_path(project_root, store_path)
    } else {
        home.join(STORE_FILE)
    };

    let detector_config = config.as_ref().and_then(|c| c.detector.clone());
    let detector = DetectorSettings {
        endpoint: env("DENUNCIAS_DETECTOR_ENDPOINT")
            .or_else(|| detector_config.as_ref().and_then(|d| d.endpoint.clone())),
        token: env("DENUNCIAS_DETECTOR_TOKEN"),
        labels: detector_config.as_ref().and_then(|d| d.labels.clone()),
        timeout: detector_config
            .as_ref()
            .and_then(|d| d.timeout_seconds)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_DETECTION_TIMEOUT),
    };

    let max_content_chars = config
        .as_ref()
        .and_then(|c| c.limits.as_ref())
        .and_then(|l| l.max_content_chars)
        .unwrap_or(MAX_CONTENT_CHARS);
    if max_content_chars == 0 || max_content_chars > MAX_CONTENT_CHARS {
        anyhow::bail!(
            "limits.max_content_chars must be between 1 and {}, got {}",
            MAX_CONTENT_CHARS,
            max_content_chars
        );
    }

    Ok(ResolvedConfig {
        home,
        legal_table,
        store,
        config_file,
        detector,
        max_content_chars,
    })
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write_config(temp: &TempDir, yaml: &str) -> PathBuf {
        let dir = temp.path().join(CONFIG_DIR);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.yaml");
        std::fs::write(&path, yaml).unwrap();
        path
    }

    #[test]
    fn test_defaults_without_file() {
        let home = PathBuf::from("/home/test/.denuncias");
        let config = resolve_config(None, home.clone(), no_env).unwrap();

        assert_eq!(config.home, home);
        assert_eq!(config.legal_table, home.join("delitos_y_penas.csv"));
        assert_eq!(config.store, home.join("data/denuncias_registradas.csv"));
        assert_eq!(config.detector, DetectorSettings::default());
        assert_eq!(config.max_content_chars, 2000);
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let path = write_config(
            &temp,
            r#"
version: "1.0"
paths:
  home: ./state
  legal_table: DELITOS.csv
  store: data/registro.csv
detector:
  labels: ["Hurto"]
  timeout_seconds: 5
limits:
  max_content_chars: 500
"#,
        );

        let config = resolve_config(Some(path.clone()), PathBuf::from("/unused"), no_env).unwrap();

        assert_eq!(config.home, temp.path().join(CONFIG_DIR).join("state"));
        assert_eq!(config.legal_table, temp.path().join("DELITOS.csv"));
        assert_eq!(config.store, temp.path().join("data/registro.csv"));
        assert_eq!(config.detector.labels, Some(vec!["Hurto".to_string()]));
        assert_eq!(config.detector.timeout, Duration::from_secs(5));
        assert_eq!(config.max_content_chars, 500);
        assert_eq!(config.config_file, Some(path));
    }

    #[test]
    fn test_content_limit_above_maximum_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = write_config(&temp, "version: \"1.0\"\nlimits:\n  max_content_chars: 5000\n");

        let err = resolve_config(Some(path), PathBuf::from("/unused"), no_env).unwrap_err();
        assert!(err.to_string().contains("max_content_chars"));
    }

    #[test]
    fn test_env_overrides_config_file() {
        let temp = TempDir::new().unwrap();
        let path = write_config(
            &temp,
            "version: \"1.0\"\npaths:\n  store: data/registro.csv\ndetector:\n  endpoint: http://file\n",
        );
        let env: HashMap<&str, &str> = [
            ("DENUNCIAS_STORE", "/srv/denuncias.csv"),
            ("DENUNCIAS_DETECTOR_ENDPOINT", "http://env/detect"),
            ("DENUNCIAS_DETECTOR_TOKEN", "secret"),
        ]
        .into_iter()
        .collect();

        let config = resolve_config(Some(path), PathBuf::from("/unused"), |key| {
            env.get(key).map(|v| v.to_string())
        })
        .unwrap();

        assert_eq!(config.store, PathBuf::from("/srv/denuncias.csv"));
        assert_eq!(config.detector.endpoint.as_deref(), Some("http://env/detect"));
        assert_eq!(config.detector.token.as_deref(), Some("secret"));
    }

    #[test]
    fn test_invalid_config_file_fails() {
        let temp = TempDir::new().unwrap();
        let path = write_config(&temp, "paths: [not, a, map]\n");
        assert!(resolve_config(Some(path), PathBuf::from("/unused"), no_env).is_err());
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/project");

        assert_eq!(
            resolve_path(&base, "./subdir"),
            PathBuf::from("/home/user/project/./subdir")
        );
        assert_eq!(
            resolve_path(&base, "/absolute/path"),
            PathBuf::from("/absolute/path")
        );
    }
}

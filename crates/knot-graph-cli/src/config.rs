//! CLI configuration management.
//!
//! Precedence, lowest first: built-in defaults, the JSON config file,
//! environment variables (a `.env` file is loaded into the environment).

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use knot_graph_layout::LayoutConfig;
use serde::{Deserialize, Serialize};

/// Application-wide configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Physics and loop cadence of every layout the CLI runs.
    pub layout: LayoutConfig,

    /// Neighbors requested per movie when expanding recommendations.
    pub neighbors: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            neighbors: 10,
        }
    }
}

impl Config {
    /// Load configuration from `.env`, the config file and the environment.
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        // Load .env file if present (silently ignore if missing)
        let _ = dotenvy::dotenv();
        Self::load_from(path, |key| std::env::var(key).ok())
    }

    /// Same as [`load`](Self::load) with an injectable environment.
    pub fn load_from(path: Option<&Path>, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let file = match path {
            Some(path) => Some(path.to_path_buf()),
            None => Self::config_file_path().filter(|p| p.exists()),
        };

        let mut config = match file {
            Some(path) => {
                let contents = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config from {}", path.display()))?;
                serde_json::from_str(&contents)
                    .with_context(|| format!("Failed to parse config file {}", path.display()))?
            }
            None => Self::default(),
        };

        let layout = &mut config.layout;
        override_from(&env, "KNOT_REPULSION", &mut layout.repulsion)?;
        override_from(&env, "KNOT_ATTRACTION", &mut layout.attraction)?;
        override_from(&env, "KNOT_DAMPING", &mut layout.damping)?;
        override_from(&env, "KNOT_BATCH_WIDTH", &mut layout.batch_width)?;
        override_from(&env, "KNOT_SIMULATION_INTERVAL_MS", &mut layout.simulation_interval_ms)?;
        override_from(
            &env,
            "KNOT_PRESENTATION_INTERVAL_MS",
            &mut layout.presentation_interval_ms,
        )?;

        config
            .layout
            .validate()
            .context("Invalid layout configuration")?;
        Ok(config)
    }

    /// Get the path to the default config file.
    pub fn config_file_path() -> Option<PathBuf> {
        ProjectDirs::from("dev", "knot-graph", "knot")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }
}

fn override_from<T>(env: impl Fn(&str) -> Option<String>, key: &str, target: &mut T) -> Result<()>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    if let Some(raw) = env(key) {
        *target = raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {key}: {raw:?}"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_file_then_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"layout": {"damping": 0.5, "batch_width": 16}, "neighbors": 4}"#,
        )
        .unwrap();

        let config = Config::load_from(
            Some(&path),
            env_of(&[("KNOT_BATCH_WIDTH", "32"), ("KNOT_SIMULATION_INTERVAL_MS", "5")]),
        )
        .unwrap();

        assert_eq!(config.layout.damping, 0.5);
        assert_eq!(config.layout.batch_width, 32);
        assert_eq!(config.layout.simulation_interval_ms, 5);
        assert_eq!(config.layout.repulsion, 1000.0);
        assert_eq!(config.neighbors, 4);
    }

    #[test]
    fn test_bad_env_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{}").unwrap();

        let err = Config::load_from(Some(&path), env_of(&[("KNOT_DAMPING", "lots")])).unwrap_err();
        assert!(err.to_string().contains("KNOT_DAMPING"));
    }

    #[test]
    fn test_invalid_physics_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{}").unwrap();

        assert!(Config::load_from(Some(&path), env_of(&[("KNOT_DAMPING", "1.5")])).is_err());
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert!(Config::load_from(Some(&path), env_of(&[])).is_err());
    }
}

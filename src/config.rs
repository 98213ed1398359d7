use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.json";

/// Where a run reads its settings and keeps its blobs.
#[derive(Debug, Clone)]
pub struct Home {
    pub config_file: PathBuf,
    pub data_dir: PathBuf,
}

impl Home {
    /// `--home`/`PURSEKEEP_HOME` wins; otherwise the platform's per-user dirs.
    pub fn resolve(override_home: Option<PathBuf>) -> Result<Self> {
        let (config_dir, data_dir) = match override_home {
            Some(root) => (root.join("config"), root.join("data")),
            None => {
                let proj = ProjectDirs::from("com", "pursekeep", "pursekeep")
                    .context("No home directory to keep pursekeep data in")?;
                (proj.config_dir().to_path_buf(), proj.data_dir().to_path_buf())
            }
        };
        Ok(Self {
            config_file: config_dir.join(CONFIG_FILE),
            data_dir,
        })
    }
}

/// User-editable settings. Unknown or missing keys fall back to defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// ISO currency code used when rendering amounts.
    pub currency: String,
    /// Name of the blob holding the transaction list (`<data_dir>/<key>.json`).
    pub storage_key: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            storage_key: "transactions".to_string(),
        }
    }
}

impl Settings {
    /// Reads the settings file, creating it on first run. Blank values are
    /// replaced by defaults and written back.
    pub fn load_or_create(home: &Home) -> Result<Self> {
        let path = &home.config_file;
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let settings = Self::default();
                settings.write(path)?;
                return Ok(settings);
            }
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to read {}", path.display()));
            }
        };

        let parsed: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        let settings = parsed.clone().fill_blanks();
        if settings != parsed {
            settings.write(path)?;
        }
        Ok(settings)
    }

    fn fill_blanks(mut self) -> Self {
        let defaults = Self::default();
        self.currency = self.currency.trim().to_ascii_uppercase();
        if self.currency.is_empty() {
            self.currency = defaults.currency;
        }
        if self.storage_key.trim().is_empty() {
            self.storage_key = defaults.storage_key;
        }
        self
    }

    fn write(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config dir {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
    }
}

pub fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_home() -> (tempfile::TempDir, Home) {
        let dir = tempfile::tempdir().expect("tempdir");
        let home = Home::resolve(Some(dir.path().to_path_buf())).expect("home");
        (dir, home)
    }

    #[test]
    fn override_home_splits_config_and_data() {
        let (dir, home) = temp_home();
        assert_eq!(home.config_file, dir.path().join("config").join("config.json"));
        assert_eq!(home.data_dir, dir.path().join("data"));
    }

    #[test]
    fn first_run_writes_defaults() {
        let (_dir, home) = temp_home();
        let settings = Settings::load_or_create(&home).expect("settings");
        assert_eq!(settings, Settings::default());

        let on_disk: Settings =
            serde_json::from_str(&fs::read_to_string(&home.config_file).unwrap()).unwrap();
        assert_eq!(on_disk, settings);
    }

    #[test]
    fn blank_and_missing_values_are_repaired_on_disk() {
        let (_dir, home) = temp_home();
        fs::create_dir_all(home.config_file.parent().unwrap()).unwrap();
        fs::write(&home.config_file, r#"{"currency": " eur "}"#).unwrap();

        let settings = Settings::load_or_create(&home).expect("settings");
        assert_eq!(settings.currency, "EUR");
        assert_eq!(settings.storage_key, "transactions");

        let rewritten = fs::read_to_string(&home.config_file).unwrap();
        assert!(rewritten.contains("\"storage_key\": \"transactions\""));
    }

    #[test]
    fn unparseable_settings_are_an_error() {
        let (_dir, home) = temp_home();
        fs::create_dir_all(home.config_file.parent().unwrap()).unwrap();
        fs::write(&home.config_file, "currency = USD").unwrap();

        let err = Settings::load_or_create(&home).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse"));
    }
}

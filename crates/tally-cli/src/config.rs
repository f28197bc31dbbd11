// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tally_app::IdStrategy;
use tally_tui::UiOptions;
use tracing_subscriber::EnvFilter;

pub const APP_NAME: &str = "tally";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_ID_WIDTH: usize = 8;
const MIN_ID_WIDTH: usize = 4;
const DEFAULT_STATUS_CLEAR: &str = "4s";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub ids: Ids,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            ids: Ids::default(),
            ui: Ui::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ids {
    pub generator: Option<IdStrategy>,
}

impl Default for Ids {
    fn default() -> Self {
        Self {
            generator: Some(IdStrategy::Uuid),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub id_width: Option<usize>,
    pub status_clear: Option<String>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            id_width: Some(DEFAULT_ID_WIDTH),
            status_clear: Some(DEFAULT_STATUS_CLEAR.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub enabled: Option<bool>,
    pub level: Option<String>,
    pub path: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            enabled: Some(true),
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
            path: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("TALLY_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set TALLY_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} has no version; add `version = 1` above the [ids], [ui], and [log] sections",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(width) = self.ui.id_width
            && width < MIN_ID_WIDTH
        {
            bail!(
                "ui.id_width in {} must be at least {}, got {}",
                path.display(),
                MIN_ID_WIDTH,
                width
            );
        }

        if let Some(status_clear) = &self.ui.status_clear {
            let parsed = parse_duration(status_clear)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "ui.status_clear in {} must be positive, got {}",
                    path.display(),
                    status_clear
                );
            }
        }

        if let Some(level) = &self.log.level {
            EnvFilter::try_new(level).with_context(|| {
                format!(
                    "log.level in {} is not a valid filter directive: {level:?}",
                    path.display()
                )
            })?;
        }

        if let Some(log_path) = &self.log.path
            && log_path.trim().is_empty()
        {
            bail!(
                "log.path in {} is empty; remove it to use the default location",
                path.display()
            );
        }

        Ok(())
    }

    pub fn id_strategy(&self) -> IdStrategy {
        self.ids.generator.unwrap_or(IdStrategy::Uuid)
    }

    pub fn id_width(&self) -> usize {
        self.ui.id_width.unwrap_or(DEFAULT_ID_WIDTH)
    }

    pub fn status_clear(&self) -> Result<Duration> {
        parse_duration(self.ui.status_clear.as_deref().unwrap_or(DEFAULT_STATUS_CLEAR))
    }

    pub fn ui_options(&self) -> Result<UiOptions> {
        Ok(UiOptions {
            id_width: self.id_width(),
            status_clear_after: self.status_clear()?,
        })
    }

    pub fn log_enabled(&self) -> bool {
        self.log.enabled.unwrap_or(true)
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.log.path {
            return Ok(PathBuf::from(path));
        }
        if let Some(path) = env::var_os("TALLY_LOG_PATH") {
            return Ok(PathBuf::from(path));
        }
        let data_root = dirs::data_local_dir().ok_or_else(|| {
            anyhow!("cannot resolve data directory; set [log].path or TALLY_LOG_PATH")
        })?;
        Ok(data_root.join(APP_NAME).join("tally.log"))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# tally config\n# Place this file at: {}\n\nversion = 1\n\n[ids]\n# \"uuid\" (random v4) or \"sequential\" (item-1, item-2, ...)\ngenerator = \"uuid\"\n\n[ui]\n# Characters of each id shown in the invoices table\nid_width = {}\n# How long status messages stay visible: <N>ms, <N>s or <N>m\nstatus_clear = \"{}\"\n\n[log]\nenabled = true\n# tracing filter directive; RUST_LOG overrides it\nlevel = \"{}\"\n# Optional. Default is platform data dir (for example ~/.local/share/tally/tally.log)\n# path = \"/absolute/path/to/tally.log\"\n",
            path.display(),
            DEFAULT_ID_WIDTH,
            DEFAULT_STATUS_CLEAR,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        let secs = mins
            .checked_mul(60)
            .ok_or_else(|| anyhow!("duration {raw:?} is too large"))?;
        return Ok(Duration::from_secs(secs));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 4s)")
}

#[cfg(test)]
mod tests {
    use super::{Config, parse_duration};
    use anyhow::Result;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};
    use std::time::Duration;
    use tally_app::IdStrategy;

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        assert_eq!(config.id_strategy(), IdStrategy::Uuid);
        assert_eq!(config.id_width(), 8);
        assert_eq!(config.status_clear()?, Duration::from_secs(4));
        assert!(config.log_enabled());
        assert_eq!(config.log_level(), "info");
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[ui]\nid_width = 10\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        let message = error.to_string();
        assert!(message.contains("version = 1"));
        assert!(message.contains("[ids], [ui], and [log]"));
        Ok(())
    }

    #[test]
    fn full_config_parses() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[ids]\ngenerator = \"sequential\"\n[ui]\nid_width = 12\nstatus_clear = \"1500ms\"\n[log]\nenabled = false\nlevel = \"tally_app=debug\"\npath = \"/tmp/tally-test.log\"\n",
        )?;

        let config = Config::load(&path)?;
        assert_eq!(config.id_strategy(), IdStrategy::Sequential);
        let options = config.ui_options()?;
        assert_eq!(options.id_width, 12);
        assert_eq!(options.status_clear_after, Duration::from_millis(1500));
        assert!(!config.log_enabled());
        assert_eq!(config.log_level(), "tally_app=debug");
        assert_eq!(config.log_path()?, PathBuf::from("/tmp/tally-test.log"));
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = Config::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn unsupported_config_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 2\n")?;
        let error = Config::load(&path).expect_err("v2 config should fail");
        assert!(error.to_string().contains("unsupported config version 2"));
        Ok(())
    }

    #[test]
    fn unknown_id_generator_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[ids]\ngenerator = \"ulid\"\n")?;
        let error = Config::load(&path).expect_err("unknown generator should fail");
        let message = format!("{error:#}");
        assert!(message.contains("decode config"));
        assert!(message.contains("ulid"));
        assert!(message.contains("uuid"));
        assert!(message.contains("sequential"));
        Ok(())
    }

    #[test]
    fn narrow_id_width_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[ui]\nid_width = 2\n")?;
        let error = Config::load(&path).expect_err("narrow id width should fail");
        assert!(error.to_string().contains("at least 4"));
        Ok(())
    }

    #[test]
    fn zero_status_clear_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[ui]\nstatus_clear = \"0s\"\n")?;
        let error = Config::load(&path).expect_err("zero duration should fail");
        assert!(error.to_string().contains("must be positive"));
        Ok(())
    }

    #[test]
    fn invalid_log_level_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[log]\nlevel = \"tally=loud\"\n")?;
        let error = Config::load(&path).expect_err("bad filter should fail");
        assert!(error.to_string().contains("log.level"));
        Ok(())
    }

    #[test]
    fn durations_parse_ms_seconds_and_minutes() -> Result<()> {
        assert_eq!(parse_duration("500ms")?, Duration::from_millis(500));
        assert_eq!(parse_duration("5s")?, Duration::from_secs(5));
        assert_eq!(parse_duration("2m")?, Duration::from_secs(120));
        Ok(())
    }

    #[test]
    fn oversized_minutes_fail_instead_of_overflowing() -> Result<()> {
        let error = parse_duration("307445734561825861m").expect_err("overflow should fail");
        assert!(error.to_string().contains("too large"));

        let (_temp, path) =
            write_config("version = 1\n[ui]\nstatus_clear = \"307445734561825861m\"\n")?;
        let error = Config::load(&path).expect_err("oversized status_clear should fail");
        assert!(error.to_string().contains("too large"));
        Ok(())
    }

    #[test]
    fn duration_rejects_unknown_units() {
        let error = parse_duration("oops").expect_err("invalid duration should fail");
        assert!(error.to_string().contains("invalid duration"));
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let override_path = temp.path().join("custom-config.toml");
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("TALLY_CONFIG_PATH", &override_path);
        }
        let resolved = Config::default_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("TALLY_CONFIG_PATH");
        }
        assert_eq!(resolved, override_path);
        Ok(())
    }

    #[test]
    fn log_path_prefers_config_over_env_override() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) = write_config("version = 1\n[log]\npath = \"/explicit/tally.log\"\n")?;
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("TALLY_LOG_PATH", "/from/env.log");
        }
        let config = Config::load(&path)?;
        let resolved = config.log_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("TALLY_LOG_PATH");
        }
        assert_eq!(resolved, PathBuf::from("/explicit/tally.log"));
        Ok(())
    }

    #[test]
    fn log_path_uses_env_override_when_unset_in_config() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) = write_config("version = 1\n")?;
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("TALLY_LOG_PATH", "/from/env-only.log");
        }
        let config = Config::load(&path)?;
        let resolved = config.log_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("TALLY_LOG_PATH");
        }
        assert_eq!(resolved, PathBuf::from("/from/env-only.log"));
        Ok(())
    }

    #[test]
    fn example_config_round_trips_through_loader() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        let example = Config::example_config(&path);
        assert!(example.contains("version = 1"));
        assert!(example.contains("[ids]"));
        assert!(example.contains("[ui]"));
        assert!(example.contains("[log]"));

        std::fs::write(&path, example)?;
        let config = Config::load(&path)?;
        assert_eq!(config.id_strategy(), IdStrategy::Uuid);
        Ok(())
    }
}

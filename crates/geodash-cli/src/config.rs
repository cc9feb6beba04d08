// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use geodash_app::{
    CENTROID_SAMPLE, DEFAULT_OVERSCAN, DEFAULT_SCROLL_ANIMATION, DashboardConfig, FLY_DURATION,
    MARKER_LIMIT, SEARCH_DEBOUNCE, SpatialConfig,
};
use geodash_data::{DEMO_COUNT, DEMO_SEED, DataSource};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_VERSION: i64 = 1;
const CONFIG_PATH_ENV: &str = "GEODASH_CONFIG_PATH";
const DEFAULT_LOAD_DELAY: &str = "200ms";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Terminal rows are one line tall.
const TERMINAL_ROW_HEIGHT: u32 = 1;
const INITIAL_VIEWPORT_ROWS: u32 = 20;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub data: Data,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub map: Map,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            data: Data::default(),
            ui: Ui::default(),
            map: Map::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Data {
    pub path: Option<String>,
    pub demo_count: Option<i64>,
    pub demo_seed: Option<u64>,
    pub load_delay: Option<String>,
}

impl Default for Data {
    fn default() -> Self {
        Self {
            path: None,
            demo_count: Some(DEMO_COUNT as i64),
            demo_seed: Some(DEMO_SEED),
            load_delay: Some(DEFAULT_LOAD_DELAY.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ui {
    pub overscan: Option<i64>,
    pub search_debounce: Option<String>,
    pub scroll_animation: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Map {
    pub marker_limit: Option<i64>,
    pub centroid_sample: Option<i64>,
    pub fly_duration: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub path: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set GEODASH_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(geodash_data::APP_NAME);
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
                    "config file {} has no version. Add `version = 1` and put values under [data], [ui], [map] and [log]",
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
        if let Some(data_path) = &self.data.path {
            geodash_data::validate_data_path(data_path)?;
        }

        for (key, value) in [
            ("data.demo_count", self.data.demo_count),
            ("map.marker_limit", self.map.marker_limit),
            ("map.centroid_sample", self.map.centroid_sample),
        ] {
            if let Some(value) = value
                && value <= 0
            {
                bail!(
                    "{key} in {} must be positive, got {value}",
                    path.display()
                );
            }
        }

        if let Some(overscan) = self.ui.overscan
            && overscan < 0
        {
            bail!(
                "ui.overscan in {} must be non-negative, got {overscan}",
                path.display()
            );
        }

        for (key, value) in [
            ("ui.search_debounce", &self.ui.search_debounce),
            ("map.fly_duration", &self.map.fly_duration),
        ] {
            if let Some(raw) = value
                && parse_duration(raw)? <= Duration::ZERO
            {
                bail!("{key} in {} must be positive, got {raw}", path.display());
            }
        }

        // Zero is allowed here: no artificial load latency, instant scrolling.
        for raw in [&self.data.load_delay, &self.ui.scroll_animation]
            .into_iter()
            .flatten()
        {
            parse_duration(raw)?;
        }

        if let Some(level) = &self.log.level
            && level.trim().is_empty()
        {
            bail!("log.level in {} must not be empty", path.display());
        }

        Ok(())
    }

    /// Resolves the record source. `--demo` wins, then `--data`, then
    /// `[data].path`, then `$GEODASH_DATA_PATH`, else generated demo data.
    pub fn data_source(&self, data_flag: Option<&Path>, demo_flag: bool) -> Result<DataSource> {
        if demo_flag {
            return Ok(self.demo_source());
        }
        if let Some(path) = data_flag {
            geodash_data::validate_data_path(&path.to_string_lossy())?;
            return Ok(DataSource::File(path.to_path_buf()));
        }
        if let Some(path) = &self.data.path {
            return Ok(DataSource::File(PathBuf::from(path)));
        }
        if let Some(path) = geodash_data::data_path_override() {
            geodash_data::validate_data_path(&path.to_string_lossy())?;
            return Ok(DataSource::File(path));
        }
        Ok(self.demo_source())
    }

    fn demo_source(&self) -> DataSource {
        DataSource::Demo {
            count: self.demo_count(),
            seed: self.data.demo_seed.unwrap_or(DEMO_SEED),
        }
    }

    pub fn demo_count(&self) -> usize {
        self.data
            .demo_count
            .and_then(|count| usize::try_from(count).ok())
            .unwrap_or(DEMO_COUNT)
    }

    pub fn load_delay(&self) -> Result<Duration> {
        parse_duration(self.data.load_delay.as_deref().unwrap_or(DEFAULT_LOAD_DELAY))
    }

    pub fn dashboard_config(&self) -> Result<DashboardConfig> {
        Ok(DashboardConfig {
            row_height: TERMINAL_ROW_HEIGHT,
            viewport_height: INITIAL_VIEWPORT_ROWS,
            overscan: self
                .ui
                .overscan
                .and_then(|overscan| usize::try_from(overscan).ok())
                .unwrap_or(DEFAULT_OVERSCAN),
            search_debounce: optional_duration(&self.ui.search_debounce, SEARCH_DEBOUNCE)?,
            scroll_animation: optional_duration(
                &self.ui.scroll_animation,
                DEFAULT_SCROLL_ANIMATION,
            )?,
            fly_duration: optional_duration(&self.map.fly_duration, FLY_DURATION)?,
            spatial: SpatialConfig {
                marker_limit: positive_or(self.map.marker_limit, MARKER_LIMIT),
                centroid_sample: positive_or(self.map.centroid_sample, CENTROID_SAMPLE),
            },
        })
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        match &self.log.path {
            Some(path) => Ok(PathBuf::from(path)),
            None => geodash_data::default_log_path(),
        }
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# geodash config\n# Place this file at: {}\n\nversion = 1\n\n[data]\n# Optional. Without a path geodash generates demo projects.\n# path = \"/absolute/path/to/projects.json\"\ndemo_count = {}\ndemo_seed = {}\nload_delay = \"{}\"\n\n[ui]\noverscan = {}\nsearch_debounce = \"300ms\"\nscroll_animation = \"200ms\"\n\n[map]\nmarker_limit = {}\ncentroid_sample = {}\nfly_duration = \"500ms\"\n\n[log]\nlevel = \"{}\"\n# path = \"/absolute/path/to/geodash.log\"\n",
            path.display(),
            DEMO_COUNT,
            DEMO_SEED,
            DEFAULT_LOAD_DELAY,
            DEFAULT_OVERSCAN,
            MARKER_LIMIT,
            CENTROID_SAMPLE,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn optional_duration(raw: &Option<String>, default: Duration) -> Result<Duration> {
    match raw {
        Some(raw) => parse_duration(raw),
        None => Ok(default),
    }
}

fn positive_or(value: Option<i64>, default: usize) -> usize {
    value
        .and_then(|value| usize::try_from(value).ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
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
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 300ms or 2s)")
}

#[cfg(test)]
mod tests {
    use super::{Config, parse_duration};
    use anyhow::Result;
    use geodash_data::DataSource;
    use std::path::{Path, PathBuf};
    use std::sync::{Mutex, OnceLock};
    use std::time::Duration;

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
        assert_eq!(config.demo_count(), 5_500);
        assert_eq!(config.load_delay()?, Duration::from_millis(200));
        assert_eq!(config.log_level(), "info");

        let dashboard = config.dashboard_config()?;
        assert_eq!(dashboard.row_height, 1);
        assert_eq!(dashboard.overscan, 10);
        assert_eq!(dashboard.search_debounce, Duration::from_millis(300));
        assert_eq!(dashboard.spatial.marker_limit, 1_000);
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[data]\ndemo_count = 10\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        let message = error.to_string();
        assert!(message.contains("version = 1"));
        assert!(message.contains("[data], [ui], [map] and [log]"));
        Ok(())
    }

    #[test]
    fn unsupported_config_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 7\n")?;
        let error = Config::load(&path).expect_err("v7 config should fail");
        assert!(error.to_string().contains("unsupported config version 7"));
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
    fn full_config_feeds_dashboard_settings() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[data]\ndemo_count = 42\ndemo_seed = 9\nload_delay = \"0ms\"\n[ui]\noverscan = 3\nsearch_debounce = \"150ms\"\nscroll_animation = \"0ms\"\n[map]\nmarker_limit = 250\ncentroid_sample = 20\nfly_duration = \"1s\"\n[log]\nlevel = \"debug\"\npath = \"/var/log/geodash.log\"\n",
        )?;
        let config = Config::load(&path)?;
        assert_eq!(config.load_delay()?, Duration::ZERO);
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.log_path()?, PathBuf::from("/var/log/geodash.log"));
        assert_eq!(
            config.data_source(None, false)?,
            DataSource::Demo { count: 42, seed: 9 }
        );

        let dashboard = config.dashboard_config()?;
        assert_eq!(dashboard.overscan, 3);
        assert_eq!(dashboard.search_debounce, Duration::from_millis(150));
        assert_eq!(dashboard.scroll_animation, Duration::ZERO);
        assert_eq!(dashboard.fly_duration, Duration::from_secs(1));
        assert_eq!(dashboard.spatial.marker_limit, 250);
        assert_eq!(dashboard.spatial.centroid_sample, 20);
        Ok(())
    }

    #[test]
    fn non_positive_limits_are_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[map]\nmarker_limit = 0\n")?;
        let error = Config::load(&path).expect_err("zero marker limit should fail");
        assert!(error.to_string().contains("map.marker_limit"));
        assert!(error.to_string().contains("must be positive"));

        let (_temp, path) = write_config("version = 1\n[ui]\nsearch_debounce = \"0ms\"\n")?;
        let error = Config::load(&path).expect_err("zero debounce should fail");
        assert!(error.to_string().contains("ui.search_debounce"));
        Ok(())
    }

    #[test]
    fn uri_style_data_path_is_rejected() -> Result<()> {
        let (_temp, path) =
            write_config("version = 1\n[data]\npath = \"https://example.com/projects.json\"\n")?;
        let error = Config::load(&path).expect_err("URI data path should fail validation");
        assert!(error.to_string().contains("looks like a URI"));
        Ok(())
    }

    #[test]
    fn data_source_precedence() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) =
            write_config("version = 1\n[data]\npath = \"/srv/from-config.json\"\n")?;
        let config = Config::load(&path)?;

        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("GEODASH_DATA_PATH", "/srv/from-env.json");
        }
        let from_config = config.data_source(None, false)?;
        let from_flag = config.data_source(Some(Path::new("/srv/from-flag.json")), false)?;
        let demo = config.data_source(Some(Path::new("/srv/from-flag.json")), true)?;
        let from_env = Config::default().data_source(None, false)?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("GEODASH_DATA_PATH");
        }

        assert_eq!(
            from_config,
            DataSource::File(PathBuf::from("/srv/from-config.json"))
        );
        assert_eq!(
            from_flag,
            DataSource::File(PathBuf::from("/srv/from-flag.json"))
        );
        assert!(matches!(demo, DataSource::Demo { .. }));
        assert_eq!(
            from_env,
            DataSource::File(PathBuf::from("/srv/from-env.json"))
        );
        Ok(())
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let override_path = temp.path().join("custom-config.toml");
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("GEODASH_CONFIG_PATH", &override_path);
        }
        let resolved = Config::default_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("GEODASH_CONFIG_PATH");
        }
        assert_eq!(resolved, override_path);
        Ok(())
    }

    #[test]
    fn durations_parse_ms_seconds_and_minutes() -> Result<()> {
        assert_eq!(parse_duration("300ms")?, Duration::from_millis(300));
        assert_eq!(parse_duration("2s")?, Duration::from_secs(2));
        assert_eq!(parse_duration("1m")?, Duration::from_secs(60));
        let error = parse_duration("soon").expect_err("invalid duration should fail");
        assert!(error.to_string().contains("invalid duration"));
        Ok(())
    }

    #[test]
    fn example_config_round_trips_through_load() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, Config::example_config(&path))?;
        let config = Config::load(&path)?;
        assert_eq!(config.demo_count(), 5_500);
        assert!(matches!(
            config.data_source(None, true)?,
            DataSource::Demo { count: 5_500, .. }
        ));
        Ok(())
    }
}

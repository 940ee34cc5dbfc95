// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use swanform_app::DEFAULT_STACK;

pub const APP_NAME: &str = "swanform";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub form: Form,
    #[serde(default)]
    pub catalogue: CatalogueSection,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            form: Form::default(),
            catalogue: CatalogueSection::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Form {
    pub default_stack: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogueSection {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub filter: Option<String>,
    pub dir: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            filter: Some(DEFAULT_LOG_FILTER.to_owned()),
            dir: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("SWANFORM_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set SWANFORM_CONFIG_PATH to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
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
                    "config file {} is not versioned. Add `version = 1` and keep values under [form], [catalogue], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1. Run `swanform --print-example-config` for the current schema",
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
        if let Some(stack) = &self.form.default_stack
            && stack.trim().is_empty()
        {
            bail!(
                "form.default_stack in {} is blank; remove it or name a catalogue stack",
                path.display()
            );
        }

        if let Some(catalogue) = &self.catalogue.path
            && catalogue.trim().is_empty()
        {
            bail!(
                "catalogue.path in {} is blank; remove it to use the built-in catalogue",
                path.display()
            );
        }

        if let Some(filter) = &self.log.filter
            && filter.trim().is_empty()
        {
            bail!(
                "log.filter in {} is blank; use a level such as \"info\" or \"swanform_app=debug\"",
                path.display()
            );
        }

        Ok(())
    }

    pub fn default_stack(&self) -> &str {
        self.form.default_stack.as_deref().unwrap_or(DEFAULT_STACK)
    }

    pub fn catalogue_path(&self) -> Option<PathBuf> {
        self.catalogue.path.as_deref().map(PathBuf::from)
    }

    pub fn log_filter(&self) -> &str {
        self.log.filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    pub fn log_dir(&self) -> Result<PathBuf> {
        match &self.log.dir {
            Some(dir) => Ok(PathBuf::from(dir)),
            None => default_log_dir(),
        }
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# swanform config\n# Place this file at: {}\n\nversion = 1\n\n[form]\n# Stack selected when --stack is not given\ndefault_stack = \"{}\"\n\n[catalogue]\n# Optional. JSON object of stack -> release -> [platform]. Default is the built-in catalogue\n# path = \"/absolute/path/to/stacks.json\"\n\n[log]\n# Overridden by SWANFORM_LOG\nfilter = \"{}\"\n# Optional. Default is the platform data dir (for example ~/.local/share/swanform/logs)\n# dir = \"/absolute/path/to/logs\"\n",
            path.display(),
            DEFAULT_STACK,
            DEFAULT_LOG_FILTER,
        )
    }
}

pub fn default_log_dir() -> Result<PathBuf> {
    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set [log].dir in the config file")
    })?;
    Ok(data_root.join(APP_NAME).join("logs"))
}

#[cfg(test)]
mod tests {
    use super::Config;
    use anyhow::Result;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};

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
        assert_eq!(config.default_stack(), "LCG");
        assert_eq!(config.catalogue_path(), None);
        assert_eq!(config.log_filter(), "info");
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[form]\ndefault_stack = \"CMSSW\"\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        let message = error.to_string();
        assert!(message.contains("version = 1"));
        assert!(message.contains("[form], [catalogue], and [log]"));
        Ok(())
    }

    #[test]
    fn v1_config_parses() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[form]\ndefault_stack = \"CMSSW\"\n[catalogue]\npath = \"/srv/swan/stacks.json\"\n[log]\nfilter = \"debug\"\ndir = \"/var/log/swanform\"\n",
        )?;

        let config = Config::load(&path)?;
        assert_eq!(config.default_stack(), "CMSSW");
        assert_eq!(
            config.catalogue_path(),
            Some(PathBuf::from("/srv/swan/stacks.json"))
        );
        assert_eq!(config.log_filter(), "debug");
        assert_eq!(config.log_dir()?, PathBuf::from("/var/log/swanform"));
        Ok(())
    }

    #[test]
    fn omitted_sections_fall_back_to_defaults() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n")?;
        let config = Config::load(&path)?;
        assert_eq!(config.default_stack(), "LCG");
        assert_eq!(config.log_filter(), "info");
        assert!(config.log_dir()?.ends_with("swanform/logs"));
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
        let message = error.to_string();
        assert!(message.contains("unsupported config version 2"));
        assert!(message.contains("--print-example-config"));
        Ok(())
    }

    #[test]
    fn blank_values_are_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[form]\ndefault_stack = \"  \"\n")?;
        let error = Config::load(&path).expect_err("blank stack should fail");
        assert!(error.to_string().contains("form.default_stack"));

        let (_temp, path) = write_config("version = 1\n[log]\nfilter = \"\"\n")?;
        let error = Config::load(&path).expect_err("blank filter should fail");
        assert!(error.to_string().contains("log.filter"));
        Ok(())
    }

    #[test]
    fn wrong_value_type_reports_decode_error() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[catalogue]\npath = 3\n")?;
        let error = Config::load(&path).expect_err("numeric path should fail");
        assert!(format!("{error:#}").contains("decode config"));
        Ok(())
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let override_path = temp.path().join("custom-config.toml");
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("SWANFORM_CONFIG_PATH", &override_path);
        }
        let resolved = Config::default_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("SWANFORM_CONFIG_PATH");
        }
        assert_eq!(resolved, override_path);
        Ok(())
    }

    #[test]
    fn default_path_uses_config_toml_suffix_when_no_env_override() -> Result<()> {
        let _guard = env_lock();
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::remove_var("SWANFORM_CONFIG_PATH");
        }
        let path = Config::default_path()?;
        assert!(path.ends_with("swanform/config.toml"));
        Ok(())
    }

    #[test]
    fn example_config_includes_required_sections() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        let example = Config::example_config(&path);
        assert!(example.contains("version = 1"));
        assert!(example.contains("[form]"));
        assert!(example.contains("[catalogue]"));
        assert!(example.contains("[log]"));

        let example_path = temp.path().join("example.toml");
        std::fs::write(&example_path, &example)?;
        let parsed = Config::load(&example_path)?;
        assert_eq!(parsed.default_stack(), "LCG");
        Ok(())
    }
}

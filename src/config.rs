// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use config::{Config as Cfg, Environment, File};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("org.charityledger", "Charityledger", "charityledger"));

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Sqlite,
    Json,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Backend::Sqlite => "sqlite",
            Backend::Json => "json",
        })
    }
}

impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" => Ok(Backend::Sqlite),
            "json" => Ok(Backend::Json),
            other => Err(anyhow::anyhow!(
                "Unknown backend '{}' (use sqlite|json)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: Backend,
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backend: Backend::default(),
            data_dir: None,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// `charityledger.toml` (optional), then `CHARITY_*` environment
    /// variables, with `.env` loaded first.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let cfg = Cfg::builder()
            .add_source(File::with_name("charityledger").required(false))
            .add_source(Environment::with_prefix("CHARITY"))
            .build()
            .context("Failed to read configuration")?;

        cfg.try_deserialize().context("Invalid configuration")
    }

    /// Applies command-line overrides.
    pub fn with_overrides(mut self, m: &clap::ArgMatches) -> Result<Self> {
        if let Some(b) = m.get_one::<String>("backend") {
            self.backend = b.parse()?;
        }
        if let Some(d) = m.get_one::<String>("data-dir") {
            self.data_dir = Some(PathBuf::from(d.trim()));
        }
        Ok(self)
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        let dir = match &self.data_dir {
            Some(d) => d.clone(),
            None => ProjectDirs::from(APP.0, APP.1, APP.2)
                .context("Could not determine platform-specific data dir")?
                .data_dir()
                .to_path_buf(),
        };
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create data dir {}", dir.display()))?;
        Ok(dir)
    }
}

use anyhow::{Context, Result};
use forecast_core::DEFAULT_ANNUAL_RATE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::ensure_forecaster_home;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub llm: LlmSection,
    pub chat: ChatSection,
    pub projection: ProjectionSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmSection {
    pub provider: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    /// Whole-request timeout for the completion call
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChatSection {
    pub max_turns_context: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProjectionSection {
    /// Nominal annual return for the invested timeline
    pub annual_rate: f64,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o".to_string(),
            base_url: "https://api.openai.com".to_string(),
            temperature: 0.4,
            timeout_secs: 60,
        }
    }
}

impl Default for ChatSection {
    fn default() -> Self {
        Self {
            max_turns_context: 12,
        }
    }
}

impl Default for ProjectionSection {
    fn default() -> Self {
        Self {
            annual_rate: DEFAULT_ANNUAL_RATE,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_forecaster_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        tracing::debug!(path = %p.display(), "no config file, using defaults");
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn show_config() -> Result<()> {
    let cfg = load_config()?;
    print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.llm.model, "gpt-4o");
        assert_eq!(cfg.projection.annual_rate, 0.099);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(&p, "[projection]\nannual_rate = 0.07\n\n[llm]\nmodel = \"gpt-4o-mini\"\n").unwrap();

        let cfg = load_config_from(&p).unwrap();
        assert_eq!(cfg.projection.annual_rate, 0.07);
        assert_eq!(cfg.llm.model, "gpt-4o-mini");
        assert_eq!(cfg.llm.base_url, "https://api.openai.com");
        assert_eq!(cfg.chat.max_turns_context, 12);
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(&p, "[llm\nmodel = ").unwrap();
        assert!(load_config_from(&p).is_err());
    }
}

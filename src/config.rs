use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Revision to diff against when --base is not given.
    pub base: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            base: "origin/master".into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct RunnerConfig {
    /// Extra arguments appended to every cargo test invocation.
    #[serde(default)]
    pub args: Vec<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }
}

fn config_path() -> PathBuf {
    let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config_dir.join("ripple").join("config.toml")
}

pub fn show() -> Result<()> {
    let path = config_path();
    println!("Config: {}", path.display());
    println!();

    if path.exists() {
        let config = Config::load()?;
        println!("{}", toml::to_string_pretty(&config)?);
    } else {
        println!("(default config, file not created)");
        println!();
        let config = Config::default();
        println!("{}", toml::to_string_pretty(&config)?);
    }

    Ok(())
}

/// Config file loading and creation for the fafmats CLI.
///
/// Config lives at ~/.config/fafmats/config.toml.
/// All fields are optional. CLI args override config values.
use fafmats_core::EloConfig;
use fafmats_core::constants::DEFAULT_FUN_FRIENDSHIP_RATIO;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::bail;

#[derive(Deserialize, Default)]
pub struct FafmatsConfig {
    pub club_path: Option<String>,
    pub starting_rating: Option<f64>,
    pub k_factor: Option<f64>,
    pub tenfold_advantage: Option<f64>,
    pub fun_friendship_ratio: Option<f64>,
}

impl FafmatsConfig {
    pub fn elo(&self) -> EloConfig {
        let defaults = EloConfig::default();
        EloConfig {
            k_factor: self.k_factor.unwrap_or(defaults.k_factor),
            tenfold_advantage: self.tenfold_advantage.unwrap_or(defaults.tenfold_advantage),
            starting_rating: self.starting_rating.unwrap_or(defaults.starting_rating),
        }
    }

    pub fn fun_friendship_ratio(&self) -> f64 {
        self.fun_friendship_ratio.unwrap_or(DEFAULT_FUN_FRIENDSHIP_RATIO)
    }

    /// Club file from the config, or `club.json` next to the config file.
    pub fn club_path(&self, config_path: &Path) -> PathBuf {
        match &self.club_path {
            Some(path) => PathBuf::from(path),
            None => config_path.with_file_name("club.json"),
        }
    }
}

const DEFAULT_CONFIG_TEMPLATE: &str = "\
# fafmats configuration
# All values here can be overridden by CLI flags.

# Club file (players, matches, rating history, drafts).
# Defaults to club.json next to this file.
# club_path = \"/path/to/club.json\"

# Rating for newly added players
# starting_rating = 1000

# Maximum rating change from one match
# k_factor = 32

# Rating gap at which the stronger player is expected to score 10x as much
# tenfold_advantage = 400

# Pairing blend: 1.0 = pair by closest skill, 0.0 = pair by fewest past matches
# fun_friendship_ratio = 0.5
";

/// Returns the default config path: ~/.config/fafmats/config.toml
pub fn config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| bail("HOME environment variable not set"));
    PathBuf::from(home).join(".config").join("fafmats").join("config.toml")
}

/// Load config from a file path. Returns default (all None) if file doesn't exist.
pub fn load_config(path: &Path) -> FafmatsConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_config(&content)
            .unwrap_or_else(|e| bail(format!("Failed to parse config at {}: {e}", path.display()))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => FafmatsConfig::default(),
        Err(e) => bail(format!("Failed to read config at {}: {e}", path.display())),
    }
}

fn parse_config(content: &str) -> Result<FafmatsConfig, toml::de::Error> {
    toml::from_str(content)
}

/// Create the default config file. Errors if it already exists.
pub fn create_default_config(path: &Path) {
    if path.exists() {
        bail(format!("Config file already exists at {}", path.display()));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .unwrap_or_else(|e| bail(format!("Failed to create directory {}: {e}", parent.display())));
    }

    std::fs::write(path, DEFAULT_CONFIG_TEMPLATE)
        .unwrap_or_else(|e| bail(format!("Failed to write config to {}: {e}", path.display())));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_parses_to_defaults() {
        let cfg = parse_config(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert_eq!(cfg.elo(), EloConfig::default());
        assert_eq!(cfg.fun_friendship_ratio(), DEFAULT_FUN_FRIENDSHIP_RATIO);
    }

    #[test]
    fn test_overrides() {
        let cfg = parse_config("k_factor = 16.0\nfun_friendship_ratio = 0.8\nclub_path = \"/tmp/c.json\"").unwrap();
        assert_eq!(cfg.elo().k_factor, 16.0);
        assert_eq!(cfg.elo().tenfold_advantage, 400.0);
        assert_eq!(cfg.fun_friendship_ratio(), 0.8);
        assert_eq!(cfg.club_path(Path::new("/x/config.toml")), PathBuf::from("/tmp/c.json"));
    }

    #[test]
    fn test_club_path_defaults_next_to_config() {
        let cfg = FafmatsConfig::default();
        assert_eq!(
            cfg.club_path(Path::new("/home/a/.config/fafmats/config.toml")),
            PathBuf::from("/home/a/.config/fafmats/club.json")
        );
    }
}

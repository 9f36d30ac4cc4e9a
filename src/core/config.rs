use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Name and team lists the classifier treats as fixed configuration.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ReferenceLists {
    pub legends: Vec<String>,
    pub elite_defense: Vec<String>,
    pub core_defense: Vec<String>,
    pub top_markets: Vec<String>,
}

impl Default for ReferenceLists {
    fn default() -> Self {
        ReferenceLists {
            legends: names(&[
                "Connor McDavid",
                "Connor Bedard",
                "Sidney Crosby",
                "Alex Ovechkin",
                "Cale Makar",
            ]),
            elite_defense: names(&["Quinn Hughes", "Adam Fox", "Evan Bouchard", "Miro Heiskanen"]),
            core_defense: names(&[
                "Roman Josi",
                "Rasmus Dahlin",
                "Josh Morrissey",
                "Victor Hedman",
                "Noah Dobson",
                "Drew Doughty",
                "Erik Karlsson",
            ]),
            top_markets: names(&["TOR", "MTL", "NYR", "CHI", "DET", "BOS"]),
        }
    }
}

/// Delta bounds for the performance signal.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct SignalThresholds {
    /// Buy when the season runs this far below the career baseline.
    pub buy: i32,
    /// Sell when the season runs this far above the career baseline.
    pub sell: i32,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        SignalThresholds { buy: -10, sell: 14 }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    pub time_budget_secs: u64,
    pub batch_size: usize,
}

impl RunConfig {
    pub fn time_budget(&self) -> Duration {
        Duration::from_secs(self.time_budget_secs)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            time_budget_secs: 280,
            batch_size: 50,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ProvidersConfig {
    pub stats: ProviderConfig,
    pub players: ProviderConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            stats: ProviderConfig {
                base_url: "https://api.nhle.com/stats/rest/en".to_string(),
            },
            players: ProviderConfig {
                base_url: "https://api-web.nhle.com/v1".to_string(),
            },
        }
    }
}

pub fn default_league_factors() -> HashMap<String, f64> {
    [
        ("KHL", 0.76),
        ("SHL", 0.55),
        ("AHL", 0.45),
        ("NCAA", 0.41),
        ("NLA", 0.38),
        ("LIIGA", 0.38),
        ("OHL", 0.30),
        ("WHL", 0.30),
        ("QMJHL", 0.28),
        ("USHL", 0.25),
        ("MHL", 0.20),
    ]
    .into_iter()
    .map(|(league, factor)| (league.to_string(), factor))
    .collect()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Season identifier in the feed's format, e.g. "20252026".
    pub season: String,
    pub rookie_draft_year: u32,
    pub signal: SignalThresholds,
    pub run: RunConfig,
    pub providers: ProvidersConfig,
    pub reference: ReferenceLists,
    /// Feeder league abbreviation to NHL-equivalency factor.
    pub leagues: HashMap<String, f64>,
    pub data_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            season: "20252026".to_string(),
            rookie_draft_year: 2025,
            signal: SignalThresholds::default(),
            run: RunConfig::default(),
            providers: ProvidersConfig::default(),
            reference: ReferenceLists::default(),
            leagues: default_league_factors(),
            data_path: None,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "rinkscout", "rinkscout")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "rinkscout", "rinkscout")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
season: "20242025"
rookie_draft_year: 2024
signal:
  buy: -8
run:
  batch_size: 25
providers:
  stats:
    base_url: "http://example.com/stats"
reference:
  legends:
    - "Wayne Gretzky"
  top_markets: ["TOR"]
leagues:
  KHL: 0.8
data_path: "/tmp/rinkscout"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.season, "20242025");
        assert_eq!(config.rookie_draft_year, 2024);
        assert_eq!(config.signal.buy, -8);
        assert_eq!(config.signal.sell, 14);
        assert_eq!(config.run.batch_size, 25);
        assert_eq!(config.run.time_budget_secs, 280);
        assert_eq!(config.providers.stats.base_url, "http://example.com/stats");
        assert_eq!(
            config.providers.players.base_url,
            "https://api-web.nhle.com/v1"
        );
        assert_eq!(config.reference.legends, vec!["Wayne Gretzky".to_string()]);
        assert_eq!(config.reference.top_markets, vec!["TOR".to_string()]);
        assert!(config.reference.elite_defense.contains(&"Adam Fox".to_string()));
        assert_eq!(config.leagues.len(), 1);
        assert_eq!(config.leagues.get("KHL"), Some(&0.8));
        assert_eq!(
            config.default_data_path().unwrap(),
            PathBuf::from("/tmp/rinkscout")
        );
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.leagues.get("AHL"), Some(&0.45));
        assert_eq!(config.run.time_budget(), Duration::from_secs(280));
    }
}

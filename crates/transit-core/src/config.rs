use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "transit.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitConfig {
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub robustness: RobustnessConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub flow: FlowConfig,
}

/// How repeated edges between the same station pair are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateEdgePolicy {
    /// The last row read for a pair replaces earlier ones.
    #[default]
    LastWins,
    /// Weights of repeated rows are added together.
    Sum,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphConfig {
    #[serde(default)]
    pub duplicate_edges: DuplicateEdgePolicy,
    /// Weight column of the origin–destination edge table.
    #[serde(default)]
    pub od_weight_column: Option<String>,
    /// Weight column of the physical-network edge table.
    #[serde(default)]
    pub pn_weight_column: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobustnessConfig {
    #[serde(default = "default_attack_fraction")]
    pub attack_fraction: f64,
    /// Seed for the random attack; a fresh seed is drawn when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for RobustnessConfig {
    fn default() -> Self {
        Self {
            attack_fraction: default_attack_fraction(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Rank degree by incident ridership instead of track count.
    #[serde(default = "default_true")]
    pub weighted_degree: bool,
    /// Use edge weights as distances when ranking by betweenness.
    #[serde(default = "default_true")]
    pub weighted_betweenness: bool,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            weighted_degree: default_true(),
            weighted_betweenness: default_true(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Maximum inflow residual, relative to `max(1, largest target)`.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Load configuration.
///
/// An explicit `path` must exist. Without one, `transit.toml` in `dir` is
/// used when present, and defaults otherwise.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid TOML for
/// [`TransitConfig`].
pub fn load_config(path: Option<&Path>, dir: &Path) -> Result<TransitConfig> {
    let path = match path {
        Some(explicit) => explicit.to_path_buf(),
        None => {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if !candidate.exists() {
                return Ok(TransitConfig::default());
            }
            candidate
        }
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let config = toml::from_str::<TransitConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded configuration");
    Ok(config)
}

const fn default_true() -> bool {
    true
}

const fn default_attack_fraction() -> f64 {
    0.99
}

const fn default_top_k() -> usize {
    10
}

const fn default_tolerance() -> f64 {
    1e-6
}

const fn default_max_iterations() -> usize {
    200
}

const fn default_timeout_secs() -> u64 {
    300
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load_config(None, dir.path()).expect("defaults");
        assert_eq!(config, TransitConfig::default());
        assert!((config.robustness.attack_fraction - 0.99).abs() < f64::EPSILON);
        assert_eq!(config.ranking.top_k, 10);
        assert_eq!(config.graph.duplicate_edges, DuplicateEdgePolicy::LastWins);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nope.toml");
        assert!(load_config(Some(&missing), dir.path()).is_err());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[robustness]\nseed = 7\n\n[graph]\nduplicate_edges = \"sum\"\n",
        )
        .expect("write config");

        let config = load_config(None, dir.path()).expect("config");
        assert_eq!(config.robustness.seed, Some(7));
        assert!(config.ranking.weighted_betweenness);
        assert!(config.ranking.weighted_degree);
        assert_eq!(config.graph.duplicate_edges, DuplicateEdgePolicy::Sum);
        assert_eq!(config.flow.max_iterations, 200);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[flow\n").expect("write");
        let err = load_config(None, dir.path()).expect_err("parse failure");
        assert!(err.to_string().contains("Failed to parse"), "{err:#}");
    }
}

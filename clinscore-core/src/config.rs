//! Configuration file support for clinscore
//!
//! Loads scoring configuration from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.clinscorerc.json` in the working directory
//! 3. `clinscore.config.json` in the working directory
//!
//! All fields are optional. CLI flags take precedence over config file values.

use crate::scores::{ScoreKind, ScoreOptions, DEFAULT_AST_UPPER_LIMIT};
use crate::units::{UnitOverrides, UnitSelection};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const RC_FILE: &str = ".clinscorerc.json";
const CONFIG_FILE: &str = "clinscore.config.json";
const MAX_AST_UPPER_LIMIT: f64 = 500.0;

/// clinscore configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClinscoreConfig {
    /// Default units for records that do not declare their own
    #[serde(default)]
    pub units: Option<UnitOverrides>,

    /// Score ids to compute (default: all)
    #[serde(default)]
    pub include: Vec<String>,

    /// Score ids to skip
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Upper limit of normal for AST, used by APRI (default: 40 U/L)
    #[serde(default)]
    pub ast_upper_limit: Option<f64>,
}

/// Resolved configuration ready for scoring
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Base units; records and CLI flags layer over these
    pub units: UnitSelection,
    /// Units forced regardless of what a record declares (CLI flags)
    pub unit_overrides: UnitOverrides,
    /// Enabled scores, in report order
    pub scores: Vec<ScoreKind>,
    pub options: ScoreOptions,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

fn parse_ids(field: &str, ids: &[String]) -> Result<Vec<ScoreKind>> {
    ids.iter()
        .map(|id| {
            id.parse::<ScoreKind>()
                .with_context(|| format!("invalid {} entry", field))
        })
        .collect()
}

impl ClinscoreConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        let include = parse_ids("include", &self.include)?;
        let exclude = parse_ids("exclude", &self.exclude)?;

        let remaining = ScoreKind::ALL
            .iter()
            .filter(|k| include.is_empty() || include.contains(k))
            .filter(|k| !exclude.contains(k))
            .count();
        if remaining == 0 {
            anyhow::bail!("include/exclude leave no scores to compute");
        }

        if let Some(uln) = self.ast_upper_limit {
            if uln <= 0.0 {
                anyhow::bail!("ast_upper_limit must be positive (got {})", uln);
            }
            if uln > MAX_AST_UPPER_LIMIT {
                anyhow::bail!(
                    "ast_upper_limit must be at most {} (got {})",
                    MAX_AST_UPPER_LIMIT,
                    uln
                );
            }
        }

        Ok(())
    }

    /// Resolve config into the form used for scoring
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.validate()?;

        let include = parse_ids("include", &self.include)?;
        let exclude = parse_ids("exclude", &self.exclude)?;
        let scores = ScoreKind::ALL
            .iter()
            .copied()
            .filter(|k| include.is_empty() || include.contains(k))
            .filter(|k| !exclude.contains(k))
            .collect();

        let units = self
            .units
            .unwrap_or_default()
            .apply_to(UnitSelection::default());

        Ok(ResolvedConfig {
            units,
            unit_overrides: UnitOverrides::default(),
            scores,
            options: ScoreOptions {
                ast_upper_limit: self.ast_upper_limit.unwrap_or(DEFAULT_AST_UPPER_LIMIT),
            },
            config_path: None,
        })
    }
}

impl ResolvedConfig {
    /// Build a ResolvedConfig with all defaults (no config file)
    pub fn defaults() -> Self {
        ResolvedConfig {
            units: UnitSelection::default(),
            unit_overrides: UnitOverrides::default(),
            scores: ScoreKind::ALL.to_vec(),
            options: ScoreOptions::default(),
            config_path: None,
        }
    }

    pub fn is_enabled(&self, kind: ScoreKind) -> bool {
        self.scores.contains(&kind)
    }

    /// Units for a record: CLI flags > record declaration > config defaults
    pub fn units_for(&self, declared: Option<&UnitOverrides>) -> UnitSelection {
        let base = match declared {
            Some(d) => d.apply_to(self.units),
            None => self.units,
        };
        self.unit_overrides.apply_to(base)
    }
}

/// Discover and load a config file from the project root
///
/// Search order:
/// 1. `.clinscorerc.json`
/// 2. `clinscore.config.json`
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(project_root: &Path) -> Result<Option<(ClinscoreConfig, PathBuf)>> {
    for name in [RC_FILE, CONFIG_FILE] {
        let path = project_root.join(name);
        if path.exists() {
            let config = load_config_file(&path)?;
            return Ok(Some((config, path)));
        }
    }
    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<ClinscoreConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: ClinscoreConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;

    Ok(config)
}

/// Load and resolve config for a working directory
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config from the project root.
/// Returns default config if nothing is found.
pub fn load_and_resolve(project_root: &Path, config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let (config, source_path) = if let Some(path) = config_path {
        let config = load_config_file(path)?;
        (config, Some(path.to_path_buf()))
    } else {
        match discover_config(project_root)? {
            Some((config, path)) => (config, Some(path)),
            None => (ClinscoreConfig::default(), None),
        }
    };

    let mut resolved = config.resolve()?;
    resolved.config_path = source_path;
    Ok(resolved)
}

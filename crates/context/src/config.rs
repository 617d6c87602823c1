//! Condenser configuration.
//!
//! Loaded from a TOML table (typically a `[condenser]` section of the host
//! runtime's config file), validated at startup. The policy choice is
//! deployment-wide: the two canonical policies give different size and
//! pairing guarantees, so their invariants are never mixed within one
//! deployment.

use serde::{Deserialize, Serialize};
use std::path::Path;

use alembic_core::error::{Error, Result};
use alembic_core::event::SUMMARY_MAX_CHARS;

use crate::condenser::Condenser;
use crate::redact::InPlaceRedactionCondenser;
use crate::relevance::RelevanceCondenser;

/// Which canonical condensation policy to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    /// Policy A: drop forgotten events from the projection, keep a summary.
    #[default]
    ForgetWithSummary,
    /// Policy B: replace observation content, keep turn count stable.
    RedactInPlace,
}

/// Configuration for the condensation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CondenserConfig {
    /// Active policy.
    #[serde(default)]
    pub policy: Policy,

    /// Maximum accepted directive summary length, in characters.
    #[serde(default = "default_summary_max_chars")]
    pub summary_max_chars: usize,
}

fn default_summary_max_chars() -> usize {
    SUMMARY_MAX_CHARS
}

impl Default for CondenserConfig {
    fn default() -> Self {
        Self {
            policy: Policy::default(),
            summary_max_chars: default_summary_max_chars(),
        }
    }
}

impl CondenserConfig {
    /// Parse from a TOML string.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str).map_err(|e| Error::Config {
            message: format!("Failed to parse condenser config: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file on disk.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Validate all settings.
    pub fn validate(&self) -> Result<()> {
        if self.summary_max_chars == 0 {
            return Err(Error::Config {
                message: "summary_max_chars must be at least 1".into(),
            });
        }
        if self.summary_max_chars > SUMMARY_MAX_CHARS {
            return Err(Error::Config {
                message: format!("summary_max_chars cannot exceed {SUMMARY_MAX_CHARS}"),
            });
        }
        Ok(())
    }

    /// Build the configured condenser.
    pub fn condenser(&self) -> Box<dyn Condenser> {
        match self.policy {
            Policy::ForgetWithSummary => Box::new(RelevanceCondenser),
            Policy::RedactInPlace => Box::new(InPlaceRedactionCondenser),
        }
    }
}

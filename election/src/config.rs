//! Election configuration with TOML file support.

use std::path::Path;

use elect_fees::FeeConfig;
use elect_registry::VotingPeriod;
use elect_types::{Amount, Principal, Timestamp};
use serde::{Deserialize, Serialize};

use crate::ElectionError;

/// Candidate seeded at construction with id 1.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialCandidate {
    pub name: String,
    pub address: Principal,
}

/// Configuration for one election.
///
/// Can be loaded from a TOML file via [`ElectionConfig::from_toml_file`] or
/// built programmatically with [`ElectionConfig::new`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionConfig {
    /// Deployer. Owns both components unless overridden below.
    pub owner: Principal,

    #[serde(default)]
    pub registry_owner: Option<Principal>,

    #[serde(default)]
    pub fee_owner: Option<Principal>,

    /// Unix seconds.
    #[serde(default)]
    pub voting_start: u64,

    /// Used when `voting_end` is absent.
    #[serde(default = "default_voting_duration")]
    pub voting_duration_secs: u64,

    #[serde(default)]
    pub voting_end: Option<u64>,

    /// Fee per paid vote in whole units, decimals allowed (`"0.5"`).
    #[serde(default = "default_fee")]
    pub fee: String,

    #[serde(default = "default_free_vote_limit")]
    pub free_vote_limit: u32,

    #[serde(default = "default_max_paid_votes")]
    pub max_paid_votes: u32,

    #[serde(default)]
    pub initial_candidate: Option<InitialCandidate>,

    /// "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_voting_duration() -> u64 {
    7 * 24 * 60 * 60
}

fn default_fee() -> String {
    "1".to_string()
}

fn default_free_vote_limit() -> u32 {
    5
}

fn default_max_paid_votes() -> u32 {
    10
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ElectionConfig {
    /// Defaults for everything but the owner.
    pub fn new(owner: Principal) -> Self {
        Self {
            owner,
            registry_owner: None,
            fee_owner: None,
            voting_start: 0,
            voting_duration_secs: default_voting_duration(),
            voting_end: None,
            fee: default_fee(),
            free_vote_limit: default_free_vote_limit(),
            max_paid_votes: default_max_paid_votes(),
            initial_candidate: None,
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ElectionError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ElectionError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ElectionError> {
        toml::from_str(s).map_err(|e| ElectionError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ElectionError> {
        toml::to_string_pretty(self).map_err(|e| ElectionError::Config(e.to_string()))
    }

    pub fn registry_owner(&self) -> &Principal {
        self.registry_owner.as_ref().unwrap_or(&self.owner)
    }

    pub fn fee_owner(&self) -> &Principal {
        self.fee_owner.as_ref().unwrap_or(&self.owner)
    }

    pub fn voting_period(&self) -> Result<VotingPeriod, ElectionError> {
        let end = match self.voting_end {
            Some(end) => end,
            None => self
                .voting_start
                .checked_add(self.voting_duration_secs)
                .ok_or_else(|| ElectionError::Config("voting period end overflows".into()))?,
        };
        Ok(VotingPeriod::new(
            Timestamp::new(self.voting_start),
            Timestamp::new(end),
        )?)
    }

    pub fn fee_config(&self) -> Result<FeeConfig, ElectionError> {
        let fee = Amount::parse_units(&self.fee)
            .map_err(|e| ElectionError::Config(format!("fee: {e}")))?;
        Ok(FeeConfig::new(fee, self.free_vote_limit, self.max_paid_votes))
    }

    /// Check everything [`ElectionController::from_config`](crate::ElectionController::from_config)
    /// would reject, without building anything.
    pub fn validate(&self) -> Result<(), ElectionError> {
        self.voting_period()?;
        self.fee_config()?;
        if let Some(initial) = &self.initial_candidate {
            if initial.name.trim().is_empty() {
                return Err(ElectionError::Config(
                    "initial candidate name is empty".into(),
                ));
            }
        }
        match self.log_format.as_str() {
            "human" | "json" => Ok(()),
            other => Err(ElectionError::Config(format!(
                "unknown log format {other:?}"
            ))),
        }
    }
}

use thiserror::Error;

use crate::balance::attributes::{Attribute, WeightGroup};
use crate::balance::slots::MAX_TEAM_SIZE;

/// Rejections raised at the engine boundary, before any search begins.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BalanceError {
    #[error("roster must contain at least 2 players, found {found}")]
    RosterTooSmall { found: usize },

    #[error("team size must be between 1 and {max}, got {team_size}", max = MAX_TEAM_SIZE)]
    InvalidTeamSize { team_size: usize },

    #[error("template places {total} players per team but team size is {team_size}")]
    InvalidTemplate { team_size: usize, total: usize },

    #[error("weight for {group}/{attribute} must be finite and positive, got {weight}")]
    InvalidWeight {
        group: WeightGroup,
        attribute: Attribute,
        weight: f64,
    },

    #[error("player at roster index {index} has an empty id")]
    MissingPlayerId { index: usize },

    #[error("player '{0}' appears more than once in the roster")]
    DuplicatePlayer(String),

    #[error("player '{player}' has a non-finite {attribute} rating")]
    NonFiniteRating { player: String, attribute: Attribute },

    #[error("assignment references unknown player '{0}'")]
    UnknownPlayer(String),

    #[error("invalid assignment: {0}")]
    InvalidAssignment(String),
}

impl BalanceError {
    /// Name of the request field the rejection is about, for structured API errors.
    pub fn field(&self) -> &'static str {
        match self {
            Self::RosterTooSmall { .. }
            | Self::MissingPlayerId { .. }
            | Self::DuplicatePlayer(_)
            | Self::NonFiniteRating { .. } => "roster",
            Self::InvalidTeamSize { .. } => "team_size",
            Self::InvalidTemplate { .. } => "template",
            Self::InvalidWeight { .. } => "weights",
            Self::UnknownPlayer(_) | Self::InvalidAssignment(_) => "slot_assignments",
        }
    }
}

/// Failures while reading rosters or configuration from disk.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("unable to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to parse json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unable to parse yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unable to parse csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: column '{column}' has unparsable value '{value}'")]
    InvalidField {
        row: usize,
        column: String,
        value: String,
    },

    #[error("roster csv needs an 'id' column")]
    MissingIdColumn,

    #[error("unsupported roster format '{0}' (expected .json or .csv)")]
    UnsupportedFormat(String),
}

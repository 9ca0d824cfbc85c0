//! Per-team position quotas for a given team size.

use serde::{Deserialize, Serialize};

use crate::balance::attributes::PositionGroup;
use crate::error::BalanceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionTemplate {
    #[serde(alias = "defendersPerTeam")]
    pub defenders: usize,
    #[serde(alias = "midfieldersPerTeam")]
    pub midfielders: usize,
    #[serde(alias = "attackersPerTeam")]
    pub attackers: usize,
}

impl PositionTemplate {
    pub fn new(defenders: usize, midfielders: usize, attackers: usize) -> Self {
        Self {
            defenders,
            midfielders,
            attackers,
        }
    }

    /// Heuristic used when no template is configured: a third each at the back and the front
    /// (at least one), the rest in midfield. Sizes too small for that are clamped.
    pub fn fallback(team_size: usize) -> Self {
        let outer = (team_size / 3).max(1);
        let defenders = outer.min(team_size);
        let attackers = outer.min(team_size - defenders);
        Self {
            defenders,
            midfielders: team_size - defenders - attackers,
            attackers,
        }
    }

    pub fn per_team(&self) -> usize {
        self.defenders
            .saturating_add(self.midfielders)
            .saturating_add(self.attackers)
    }

    pub fn count(&self, group: PositionGroup) -> usize {
        match group {
            PositionGroup::Defense => self.defenders,
            PositionGroup::Midfield => self.midfielders,
            PositionGroup::Attack => self.attackers,
        }
    }

    /// Offset of the group's first slot within a team. Slot order is always
    /// defense, midfield, attack regardless of selection order.
    pub fn offset(&self, group: PositionGroup) -> usize {
        match group {
            PositionGroup::Defense => 0,
            PositionGroup::Midfield => self.defenders,
            PositionGroup::Attack => self.defenders.saturating_add(self.midfielders),
        }
    }

    pub fn validate(&self, team_size: usize) -> Result<(), BalanceError> {
        if self.per_team() != team_size {
            return Err(BalanceError::InvalidTemplate {
                team_size,
                total: self.per_team(),
            });
        }
        Ok(())
    }
}

/// Configured template for one team size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateEntry {
    #[serde(alias = "teamSize")]
    pub team_size: usize,
    #[serde(flatten)]
    pub template: PositionTemplate,
}

/// Lookup of configured templates keyed by team size.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateCatalog {
    entries: Vec<TemplateEntry>,
}

impl TemplateCatalog {
    pub fn new(entries: Vec<TemplateEntry>) -> Self {
        Self { entries }
    }

    pub fn configured(&self, team_size: usize) -> Option<PositionTemplate> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.team_size == team_size)
            .map(|entry| entry.template)
    }

    /// Configured template for `team_size`, or [PositionTemplate::fallback].
    pub fn resolve(&self, team_size: usize) -> PositionTemplate {
        self.configured(team_size)
            .unwrap_or_else(|| PositionTemplate::fallback(team_size))
    }
}

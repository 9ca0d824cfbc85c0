//! Shared vocabulary for the balancing engine: skill attributes, players, position groups and
//! the weight table. Every rating read goes through [Player::attr] so the neutral default lives
//! in exactly one place.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Rating assumed for any attribute a player has no value for.
pub const DEFAULT_RATING: f64 = 3.0;

/// Weight assumed for any (group, attribute) pair without a configured weight.
pub const DEFAULT_WEIGHT: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Defending,
    Goalscoring,
    #[serde(alias = "staminaPace")]
    StaminaPace,
    Control,
    Teamwork,
    Resilience,
}

impl Attribute {
    pub const ALL: [Attribute; 6] = [
        Attribute::Defending,
        Attribute::Goalscoring,
        Attribute::StaminaPace,
        Attribute::Control,
        Attribute::Teamwork,
        Attribute::Resilience,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Defending => "defending",
            Self::Goalscoring => "goalscoring",
            Self::StaminaPace => "stamina_pace",
            Self::Control => "control",
            Self::Teamwork => "teamwork",
            Self::Resilience => "resilience",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Attribute {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let key: String = raw
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "defending" => Ok(Self::Defending),
            "goalscoring" => Ok(Self::Goalscoring),
            "staminapace" => Ok(Self::StaminaPace),
            "control" => Ok(Self::Control),
            "teamwork" => Ok(Self::Teamwork),
            "resilience" => Ok(Self::Resilience),
            _ => Err(format!("unknown attribute '{raw}'")),
        }
    }
}

/// Raw skill ratings. Absent values are `None` and read back as [DEFAULT_RATING].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerRatings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defending: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goalscoring: Option<f64>,
    #[serde(default, alias = "staminaPace", skip_serializing_if = "Option::is_none")]
    pub stamina_pace: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teamwork: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resilience: Option<f64>,
}

impl PlayerRatings {
    /// Uniform ratings, handy for fixtures and for "all neutral" rosters.
    pub fn uniform(value: f64) -> Self {
        Self {
            defending: Some(value),
            goalscoring: Some(value),
            stamina_pace: Some(value),
            control: Some(value),
            teamwork: Some(value),
            resilience: Some(value),
        }
    }

    pub fn get(&self, attribute: Attribute) -> Option<f64> {
        match attribute {
            Attribute::Defending => self.defending,
            Attribute::Goalscoring => self.goalscoring,
            Attribute::StaminaPace => self.stamina_pace,
            Attribute::Control => self.control,
            Attribute::Teamwork => self.teamwork,
            Attribute::Resilience => self.resilience,
        }
    }

    pub fn set(&mut self, attribute: Attribute, value: Option<f64>) {
        let slot = match attribute {
            Attribute::Defending => &mut self.defending,
            Attribute::Goalscoring => &mut self.goalscoring,
            Attribute::StaminaPace => &mut self.stamina_pace,
            Attribute::Control => &mut self.control,
            Attribute::Teamwork => &mut self.teamwork,
            Attribute::Resilience => &mut self.resilience,
        };
        *slot = value;
    }

    pub fn with(mut self, attribute: Attribute, value: f64) -> Self {
        self.set(attribute, Some(value));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    #[serde(alias = "playerId", alias = "player_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub ratings: PlayerRatings,
    #[serde(default, alias = "slotNumber", skip_serializing_if = "Option::is_none")]
    pub slot_number: Option<u32>,
}

impl Player {
    pub fn new(id: impl Into<String>, name: impl Into<String>, ratings: PlayerRatings) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ratings,
            slot_number: None,
        }
    }

    /// The one accessor for ratings: configured value, or [DEFAULT_RATING] when absent.
    #[inline]
    pub fn attr(&self, attribute: Attribute) -> f64 {
        self.ratings.get(attribute).unwrap_or(DEFAULT_RATING)
    }
}

/// On-field position groups that receive per-team quotas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionGroup {
    Defense,
    Midfield,
    Attack,
}

impl PositionGroup {
    pub const ALL: [PositionGroup; 3] = [
        PositionGroup::Defense,
        PositionGroup::Midfield,
        PositionGroup::Attack,
    ];

    /// Attributes averaged for this group in [crate::balance::scorer::TeamStats].
    pub fn tracked_attributes(&self) -> &'static [Attribute] {
        match self {
            Self::Defense => &[
                Attribute::Defending,
                Attribute::Control,
                Attribute::StaminaPace,
            ],
            Self::Midfield => &[
                Attribute::Control,
                Attribute::StaminaPace,
                Attribute::Teamwork,
                Attribute::Defending,
                Attribute::Goalscoring,
            ],
            Self::Attack => &[
                Attribute::Goalscoring,
                Attribute::StaminaPace,
                Attribute::Control,
            ],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Defense => "defense",
            Self::Midfield => "midfield",
            Self::Attack => "attack",
        }
    }
}

impl fmt::Display for PositionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Key of the weight table: a position group, or `Team` for the team-wide attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightGroup {
    Defense,
    Midfield,
    Attack,
    Team,
}

impl WeightGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Defense => "defense",
            Self::Midfield => "midfield",
            Self::Attack => "attack",
            Self::Team => "team",
        }
    }
}

impl From<PositionGroup> for WeightGroup {
    fn from(group: PositionGroup) -> Self {
        match group {
            PositionGroup::Defense => Self::Defense,
            PositionGroup::Midfield => Self::Midfield,
            PositionGroup::Attack => Self::Attack,
        }
    }
}

impl fmt::Display for WeightGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceWeight {
    #[serde(alias = "positionGroup")]
    pub position_group: WeightGroup,
    pub attribute: Attribute,
    pub weight: f64,
}

/// Weights grouped by [WeightGroup]. Later entries for the same pair override earlier ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightTable {
    groups: HashMap<WeightGroup, HashMap<Attribute, f64>>,
}

impl WeightTable {
    pub fn from_weights(weights: &[BalanceWeight]) -> Self {
        let mut groups: HashMap<WeightGroup, HashMap<Attribute, f64>> = HashMap::new();
        for entry in weights {
            groups
                .entry(entry.position_group)
                .or_default()
                .insert(entry.attribute, entry.weight);
        }
        Self { groups }
    }

    pub fn weight(&self, group: WeightGroup, attribute: Attribute) -> f64 {
        self.groups
            .get(&group)
            .and_then(|attrs| attrs.get(&attribute))
            .copied()
            .unwrap_or(DEFAULT_WEIGHT)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.values().all(HashMap::is_empty)
    }
}

//! Slot numbering and alternating team assignment.
//!
//! Team A occupies slots `1..=team_size`, team B `team_size+1..=2*team_size`. Inside a team the
//! slots run defense, midfield, attack. Slot numbers are identifiers and ordering only: the
//! position a player actually fills is carried separately in [SlotAssignment::position], so a
//! leftover player sitting in a nominal defender slot is not treated as a defender.

use std::collections::HashSet;
use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::balance::attributes::{Player, PositionGroup};
use crate::balance::template::PositionTemplate;
use crate::error::BalanceError;

/// Largest team size a layout accepts.
pub const MAX_TEAM_SIZE: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Team {
    A,
    B,
}

impl Team {
    pub fn other(&self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    /// Team receiving the `index`-th pick of an alternating pass.
    #[inline]
    pub fn for_pick(index: usize) -> Self {
        if index % 2 == 0 {
            Self::A
        } else {
            Self::B
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAssignment {
    #[serde(alias = "playerId")]
    pub player_id: String,
    pub team: Team,
    #[serde(alias = "slotNumber")]
    pub slot_number: u32,
    /// Position filled, or `None` for players placed by leftover distribution.
    #[serde(default)]
    pub position: Option<PositionGroup>,
}

/// Slot geometry for one balancing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotLayout {
    pub team_size: usize,
    pub template: PositionTemplate,
}

impl SlotLayout {
    pub fn new(team_size: usize, template: PositionTemplate) -> Self {
        Self {
            team_size,
            template,
        }
    }

    /// Team size as a slot count, clamped to [MAX_TEAM_SIZE]. Larger sizes never pass validation.
    fn size(&self) -> u32 {
        u32::try_from(self.team_size.min(MAX_TEAM_SIZE)).unwrap_or(u32::MAX / 2)
    }

    pub fn team_range(&self, team: Team) -> RangeInclusive<u32> {
        let size = self.size();
        match team {
            Team::A => 1..=size,
            Team::B => size + 1..=2 * size,
        }
    }

    /// First slot of `group` for `team`.
    pub fn base_slot(&self, team: Team, group: PositionGroup) -> u32 {
        let offset = u32::try_from(self.template.offset(group)).unwrap_or(u32::MAX);
        self.team_range(team).start().saturating_add(offset)
    }

    /// First slot number past both teams' regular ranges.
    pub fn first_overflow_slot(&self) -> u32 {
        2 * self.size() + 1
    }

    /// Position a regular slot stands for under this layout's template; `None` for overflow
    /// slots and slots past the template's counts.
    pub fn position_of(&self, slot: u32) -> Option<PositionGroup> {
        let team = self.team_of(slot)?;
        PositionGroup::ALL.into_iter().find(|group| {
            let base = self.base_slot(team, *group);
            let count = u32::try_from(self.template.count(*group)).unwrap_or(u32::MAX);
            slot >= base && slot - base < count
        })
    }

    /// Copies of `assignments` where a missing position is read from the slot number.
    pub fn with_slot_positions(&self, assignments: &[SlotAssignment]) -> Vec<SlotAssignment> {
        assignments
            .iter()
            .map(|assignment| SlotAssignment {
                position: assignment
                    .position
                    .or_else(|| self.position_of(assignment.slot_number)),
                ..assignment.clone()
            })
            .collect()
    }

    /// Unused slots of `team` in ascending order.
    pub fn open_slots(&self, team: Team, used: &HashSet<u32>) -> Vec<u32> {
        self.team_range(team)
            .filter(|slot| !used.contains(slot))
            .collect()
    }

    /// Team owning `slot`, counting overflow slots as unowned.
    pub fn team_of(&self, slot: u32) -> Option<Team> {
        if self.team_range(Team::A).contains(&slot) {
            Some(Team::A)
        } else if self.team_range(Team::B).contains(&slot) {
            Some(Team::B)
        } else {
            None
        }
    }

    /// Same placement seen from the other side: teams swap and regular slots move by one
    /// team length. Overflow slots keep their number.
    pub fn mirror(&self, assignment: &SlotAssignment) -> SlotAssignment {
        let size = self.size();
        let slot_number = match self.team_of(assignment.slot_number) {
            Some(Team::A) => assignment.slot_number + size,
            Some(Team::B) => assignment.slot_number - size,
            None => assignment.slot_number,
        };
        SlotAssignment {
            team: assignment.team.other(),
            slot_number,
            ..assignment.clone()
        }
    }

    /// Regular slots must sit on the side they are listed under; overflow slots may be either.
    pub fn check_sides(&self, assignments: &[SlotAssignment]) -> Result<(), BalanceError> {
        for assignment in assignments {
            if assignment.slot_number == 0 {
                return Err(BalanceError::InvalidAssignment(format!(
                    "player '{}' has slot 0; slots start at 1",
                    assignment.player_id
                )));
            }
            if let Some(team) = self.team_of(assignment.slot_number) {
                if team != assignment.team {
                    return Err(BalanceError::InvalidAssignment(format!(
                        "slot {} belongs to team {team}, not team {}",
                        assignment.slot_number, assignment.team
                    )));
                }
            }
        }
        Ok(())
    }

    /// Alternating assignment of one position pass using this layout's base offsets.
    pub fn assign_group(&self, selected: &[&Player], group: PositionGroup) -> Vec<SlotAssignment> {
        assign_alternating(
            selected,
            Some(group),
            self.base_slot(Team::A, group),
            self.base_slot(Team::B, group),
        )
    }
}

/// Even picks go to team A, odd picks to team B; the `k`-th player a team receives here sits
/// on `base + k`.
pub fn assign_alternating(
    selected: &[&Player],
    position: Option<PositionGroup>,
    base_slot_a: u32,
    base_slot_b: u32,
) -> Vec<SlotAssignment> {
    selected
        .iter()
        .enumerate()
        .map(|(index, player)| {
            let team = Team::for_pick(index);
            let within_team = (index / 2) as u32;
            let base = match team {
                Team::A => base_slot_a,
                Team::B => base_slot_b,
            };
            SlotAssignment {
                player_id: player.id.clone(),
                team,
                slot_number: base + within_team,
                position,
            }
        })
        .collect()
}

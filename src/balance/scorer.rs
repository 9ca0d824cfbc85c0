//! Weighted multi-attribute balance score. Lower is better; `0.0` means the two teams have
//! identical per-group averages and identical team-wide averages.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::balance::attributes::{
    Attribute, Player, PositionGroup, WeightGroup, WeightTable, DEFAULT_RATING,
};
use crate::balance::slots::{SlotAssignment, Team};
use crate::error::BalanceError;

/// A player as placed on a team for one attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeamMember<'a> {
    pub player: &'a Player,
    pub position: Option<PositionGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub players: usize,
    pub averages: BTreeMap<Attribute, f64>,
}

impl GroupStats {
    fn from_members(group: PositionGroup, members: &[TeamMember<'_>]) -> Self {
        let in_group: Vec<&Player> = members
            .iter()
            .filter(|member| member.position == Some(group))
            .map(|member| member.player)
            .collect();
        let averages = group
            .tracked_attributes()
            .iter()
            .map(|attribute| (*attribute, average(&in_group, *attribute)))
            .collect();
        Self {
            players: in_group.len(),
            averages,
        }
    }

    pub fn average(&self, attribute: Attribute) -> f64 {
        self.averages
            .get(&attribute)
            .copied()
            .unwrap_or(DEFAULT_RATING)
    }
}

/// Derived per-team figures the score compares.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamStats {
    pub players: usize,
    pub defense: GroupStats,
    pub midfield: GroupStats,
    pub attack: GroupStats,
    pub resilience: f64,
    pub teamwork: f64,
}

impl TeamStats {
    pub fn from_members(members: &[TeamMember<'_>]) -> Self {
        let everyone: Vec<&Player> = members.iter().map(|member| member.player).collect();
        Self {
            players: members.len(),
            defense: GroupStats::from_members(PositionGroup::Defense, members),
            midfield: GroupStats::from_members(PositionGroup::Midfield, members),
            attack: GroupStats::from_members(PositionGroup::Attack, members),
            resilience: average(&everyone, Attribute::Resilience),
            teamwork: average(&everyone, Attribute::Teamwork),
        }
    }

    pub fn group(&self, group: PositionGroup) -> &GroupStats {
        match group {
            PositionGroup::Defense => &self.defense,
            PositionGroup::Midfield => &self.midfield,
            PositionGroup::Attack => &self.attack,
        }
    }
}

/// Mean rating; an empty group reads as the neutral default.
fn average(players: &[&Player], attribute: Attribute) -> f64 {
    if players.is_empty() {
        return DEFAULT_RATING;
    }
    players.iter().map(|player| player.attr(attribute)).sum::<f64>() / players.len() as f64
}

/// Contribution of each component to the final score.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ScoreBreakdown {
    pub defense: f64,
    pub midfield: f64,
    pub attack: f64,
    pub resilience: f64,
    pub teamwork: f64,
    pub total: f64,
}

/// Weighted mean absolute difference over the group's tracked attributes.
fn group_difference(
    group: PositionGroup,
    stats_a: &GroupStats,
    stats_b: &GroupStats,
    weights: &WeightTable,
) -> f64 {
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for attribute in group.tracked_attributes() {
        let weight = weights.weight(WeightGroup::from(group), *attribute);
        weighted_sum += (stats_a.average(*attribute) - stats_b.average(*attribute)).abs() * weight;
        weight_total += weight;
    }
    if weight_total > 0.0 {
        weighted_sum / weight_total
    } else {
        0.0
    }
}

pub fn score_stats(stats_a: &TeamStats, stats_b: &TeamStats, weights: &WeightTable) -> ScoreBreakdown {
    let defense = group_difference(PositionGroup::Defense, &stats_a.defense, &stats_b.defense, weights);
    let midfield = group_difference(
        PositionGroup::Midfield,
        &stats_a.midfield,
        &stats_b.midfield,
        weights,
    );
    let attack = group_difference(PositionGroup::Attack, &stats_a.attack, &stats_b.attack, weights);
    let resilience = (stats_a.resilience - stats_b.resilience).abs()
        * weights.weight(WeightGroup::Team, Attribute::Resilience);
    let teamwork = (stats_a.teamwork - stats_b.teamwork).abs()
        * weights.weight(WeightGroup::Team, Attribute::Teamwork);

    ScoreBreakdown {
        defense,
        midfield,
        attack,
        resilience,
        teamwork,
        total: defense + midfield + attack + resilience + teamwork,
    }
}

/// Score of two teams as placed; see [score_stats].
pub fn score_teams(
    team_a: &[TeamMember<'_>],
    team_b: &[TeamMember<'_>],
    weights: &WeightTable,
) -> f64 {
    score_stats(
        &TeamStats::from_members(team_a),
        &TeamStats::from_members(team_b),
        weights,
    )
    .total
}

/// Splits an assignment into team member lists. Ids missing from `by_id` are skipped.
pub fn members_by_team<'a>(
    assignments: &[SlotAssignment],
    by_id: &HashMap<&str, &'a Player>,
) -> (Vec<TeamMember<'a>>, Vec<TeamMember<'a>>) {
    let mut team_a = Vec::new();
    let mut team_b = Vec::new();
    for assignment in assignments {
        let Some(&player) = by_id.get(assignment.player_id.as_str()) else {
            continue;
        };
        let member = TeamMember {
            player,
            position: assignment.position,
        };
        match assignment.team {
            Team::A => team_a.push(member),
            Team::B => team_b.push(member),
        }
    }
    (team_a, team_b)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentScore {
    pub breakdown: ScoreBreakdown,
    pub team_a: TeamStats,
    pub team_b: TeamStats,
}

/// Scores an externally supplied assignment, e.g. a lineup edited by hand.
pub fn score_assignment(
    roster: &[Player],
    assignments: &[SlotAssignment],
    weights: &WeightTable,
) -> Result<AssignmentScore, BalanceError> {
    let by_id: HashMap<&str, &Player> = roster.iter().map(|p| (p.id.as_str(), p)).collect();
    let mut seen_players = HashSet::new();
    let mut seen_slots = HashSet::new();
    for assignment in assignments {
        if !by_id.contains_key(assignment.player_id.as_str()) {
            return Err(BalanceError::UnknownPlayer(assignment.player_id.clone()));
        }
        if !seen_players.insert(assignment.player_id.as_str()) {
            return Err(BalanceError::InvalidAssignment(format!(
                "player '{}' is assigned more than once",
                assignment.player_id
            )));
        }
        if !seen_slots.insert(assignment.slot_number) {
            return Err(BalanceError::InvalidAssignment(format!(
                "slot {} is used more than once",
                assignment.slot_number
            )));
        }
    }

    let (team_a, team_b) = members_by_team(assignments, &by_id);
    let stats_a = TeamStats::from_members(&team_a);
    let stats_b = TeamStats::from_members(&team_b);
    Ok(AssignmentScore {
        breakdown: score_stats(&stats_a, &stats_b, weights),
        team_a: stats_a,
        team_b: stats_b,
    })
}

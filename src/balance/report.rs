use std::collections::HashMap;

use serde::Serialize;

use crate::balance::attributes::{Player, WeightTable};
use crate::balance::optimizer::SearchOutcome;
use crate::balance::scorer::{members_by_team, score_stats, ScoreBreakdown, TeamStats};
use crate::balance::slots::{SlotAssignment, SlotLayout, Team};
use crate::balance::template::PositionTemplate;

/// How far the roster is from filling exactly two teams. Not an error: the split is still
/// valid, only potentially less balanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub expected_players: usize,
    pub actual_players: usize,
    /// Regular slots left empty in the winning split.
    pub open_slots: usize,
    /// Players placed beyond `2 * team_size`.
    pub overflow_players: usize,
    pub degraded: bool,
}

impl Diagnostics {
    pub fn for_split(layout: &SlotLayout, roster_len: usize, assignments: &[SlotAssignment]) -> Self {
        let expected_players = layout.team_size * 2;
        let overflow_players = assignments
            .iter()
            .filter(|a| layout.team_of(a.slot_number).is_none())
            .count();
        let regular = assignments.len() - overflow_players;
        Self {
            expected_players,
            actual_players: roster_len,
            open_slots: expected_players.saturating_sub(regular),
            overflow_players,
            degraded: roster_len != expected_players,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSummary {
    pub team: Team,
    /// Player ids in slot order.
    pub player_ids: Vec<String>,
    pub stats: TeamStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceReport {
    pub run_id: String,
    pub balanced_at: String,
    pub seed: u64,
    pub team_size: usize,
    pub template: PositionTemplate,
    pub slot_assignments: Vec<SlotAssignment>,
    pub balance_score: f64,
    /// `1 - score`, clamped to `[0, 1]`, as a percentage.
    pub balance_percent: f64,
    pub breakdown: ScoreBreakdown,
    pub attempts: usize,
    pub early_exit: bool,
    pub timed_out: bool,
    pub duration_ms: u64,
    pub teams: Vec<TeamSummary>,
    pub diagnostics: Diagnostics,
}

pub fn balance_percent(score: f64) -> f64 {
    if !score.is_finite() {
        return 0.0;
    }
    (1.0 - score).clamp(0.0, 1.0) * 100.0
}

pub fn build_report(
    roster: &[Player],
    layout: &SlotLayout,
    weights: &WeightTable,
    seed: u64,
    outcome: SearchOutcome,
) -> BalanceReport {
    let by_id: HashMap<&str, &Player> = roster.iter().map(|p| (p.id.as_str(), p)).collect();
    let (team_a, team_b) = members_by_team(&outcome.assignments, &by_id);
    let stats_a = TeamStats::from_members(&team_a);
    let stats_b = TeamStats::from_members(&team_b);
    let breakdown = score_stats(&stats_a, &stats_b, weights);

    let ids_for = |team: Team| -> Vec<String> {
        outcome
            .assignments
            .iter()
            .filter(|a| a.team == team)
            .map(|a| a.player_id.clone())
            .collect()
    };
    let teams = vec![
        TeamSummary {
            team: Team::A,
            player_ids: ids_for(Team::A),
            stats: stats_a,
        },
        TeamSummary {
            team: Team::B,
            player_ids: ids_for(Team::B),
            stats: stats_b,
        },
    ];

    BalanceReport {
        run_id: uuid::Uuid::new_v4().to_string(),
        balanced_at: chrono::Utc::now().to_rfc3339(),
        seed,
        team_size: layout.team_size,
        template: layout.template,
        diagnostics: Diagnostics::for_split(layout, roster.len(), &outcome.assignments),
        balance_percent: balance_percent(outcome.score),
        balance_score: outcome.score,
        breakdown,
        attempts: outcome.attempts,
        early_exit: outcome.early_exit,
        timed_out: outcome.timed_out,
        duration_ms: outcome.elapsed.as_millis() as u64,
        slot_assignments: outcome.assignments,
        teams,
    }
}

pub mod attributes;
pub mod leftover;
pub mod optimizer;
pub mod report;
pub mod scorer;
pub mod selector;
pub mod slots;
pub mod template;

use std::collections::HashSet;

use tracing::{info, warn};

use crate::balance::attributes::{Attribute, BalanceWeight, Player, WeightTable};
use crate::balance::optimizer::{SearchLimits, StochasticOptimizer};
use crate::balance::report::{build_report, BalanceReport};
use crate::balance::slots::{SlotLayout, MAX_TEAM_SIZE};
use crate::balance::template::PositionTemplate;
use crate::error::BalanceError;
use crate::parallel::{search_in_batches, WorkerPool};

/// How attempts are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchStrategy {
    /// One generator, one loop.
    #[default]
    Sequential,
    /// Attempt budget split across independent per-worker searches. `workers = 0` uses every core.
    Parallel { workers: usize },
}

#[derive(Debug, Clone)]
pub struct BalanceScenario<'a> {
    pub roster: &'a [Player],
    pub team_size: usize,
    /// When None, [PositionTemplate::fallback] applies.
    pub template: Option<PositionTemplate>,
    pub weights: &'a [BalanceWeight],
    pub limits: SearchLimits,
    /// When None a fresh seed is drawn; the seed used is echoed in the report.
    pub seed: Option<u64>,
    pub strategy: SearchStrategy,
}

impl Default for BalanceScenario<'_> {
    fn default() -> Self {
        Self {
            roster: &[],
            team_size: 0,
            template: None,
            weights: &[],
            limits: SearchLimits::default(),
            seed: None,
            strategy: SearchStrategy::Sequential,
        }
    }
}

/// Team sizes outside `1..=MAX_TEAM_SIZE` are rejected.
pub fn check_team_size(team_size: usize) -> Result<(), BalanceError> {
    if (1..=MAX_TEAM_SIZE).contains(&team_size) {
        Ok(())
    } else {
        Err(BalanceError::InvalidTeamSize { team_size })
    }
}

/// Checks every precondition and returns the slot layout the search will use.
pub fn validate_scenario(scenario: &BalanceScenario<'_>) -> Result<SlotLayout, BalanceError> {
    check_team_size(scenario.team_size)?;
    if scenario.roster.len() < 2 {
        return Err(BalanceError::RosterTooSmall {
            found: scenario.roster.len(),
        });
    }

    let mut seen = HashSet::with_capacity(scenario.roster.len());
    for (index, player) in scenario.roster.iter().enumerate() {
        if player.id.trim().is_empty() {
            return Err(BalanceError::MissingPlayerId { index });
        }
        if !seen.insert(player.id.as_str()) {
            return Err(BalanceError::DuplicatePlayer(player.id.clone()));
        }
        for attribute in Attribute::ALL {
            if player.ratings.get(attribute).is_some_and(|value| !value.is_finite()) {
                return Err(BalanceError::NonFiniteRating {
                    player: player.id.clone(),
                    attribute,
                });
            }
        }
    }

    for entry in scenario.weights {
        if !entry.weight.is_finite() || entry.weight <= 0.0 {
            return Err(BalanceError::InvalidWeight {
                group: entry.position_group,
                attribute: entry.attribute,
                weight: entry.weight,
            });
        }
    }

    let template = scenario
        .template
        .unwrap_or_else(|| PositionTemplate::fallback(scenario.team_size));
    template.validate(scenario.team_size)?;

    Ok(SlotLayout::new(scenario.team_size, template))
}

pub fn balance_scenario(scenario: &BalanceScenario<'_>) -> Result<BalanceReport, BalanceError> {
    balance_scenario_with_progress(scenario, |_, _| {})
}

/// Like [balance_scenario], invoking `on_progress(attempts_done, best_score)`. Sequential
/// searches report every attempt; parallel searches report once, after the reduction.
pub fn balance_scenario_with_progress<F>(
    scenario: &BalanceScenario<'_>,
    mut on_progress: F,
) -> Result<BalanceReport, BalanceError>
where
    F: FnMut(usize, f64),
{
    let layout = validate_scenario(scenario)?;
    let weights = WeightTable::from_weights(scenario.weights);
    let seed = scenario.seed.unwrap_or_else(rand::random);

    let expected = layout.team_size * 2;
    if scenario.roster.len() != expected {
        warn!(
            expected,
            actual = scenario.roster.len(),
            "roster does not fill two teams exactly; result may be less balanced"
        );
    }
    info!(
        players = scenario.roster.len(),
        team_size = layout.team_size,
        seed,
        strategy = ?scenario.strategy,
        "balancing roster"
    );

    let outcome = match scenario.strategy {
        SearchStrategy::Sequential => StochasticOptimizer::seeded(seed, scenario.limits)
            .optimize_with_progress(scenario.roster, &layout, &weights, None, &mut on_progress),
        SearchStrategy::Parallel { workers } => {
            let pool = WorkerPool::with_workers(workers);
            let batches = pool.effective_workers();
            let outcome = pool.install(|| {
                search_in_batches(scenario.roster, &layout, &weights, scenario.limits, seed, batches)
            });
            on_progress(outcome.attempts, outcome.score);
            outcome
        }
    };

    Ok(build_report(scenario.roster, &layout, &weights, seed, outcome))
}

/// Balance with default limits and the fallback template.
pub fn balance_roster(
    roster: &[Player],
    team_size: usize,
    weights: &[BalanceWeight],
) -> Result<BalanceReport, BalanceError> {
    balance_scenario(&BalanceScenario {
        roster,
        team_size,
        weights,
        ..BalanceScenario::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balance::attributes::{PlayerRatings, WeightGroup};

    fn roster(count: usize) -> Vec<Player> {
        (0..count)
            .map(|i| Player::new(format!("p{i}"), "", PlayerRatings::uniform(3.0)))
            .collect()
    }

    #[test]
    fn rejects_small_rosters_and_zero_team_size() {
        let one = roster(1);
        let scenario = BalanceScenario {
            roster: &one,
            team_size: 5,
            ..BalanceScenario::default()
        };
        assert_eq!(
            validate_scenario(&scenario),
            Err(BalanceError::RosterTooSmall { found: 1 })
        );

        let two = roster(2);
        let scenario = BalanceScenario {
            roster: &two,
            team_size: 0,
            ..BalanceScenario::default()
        };
        assert_eq!(
            validate_scenario(&scenario),
            Err(BalanceError::InvalidTeamSize { team_size: 0 })
        );
    }

    #[test]
    fn rejects_team_sizes_past_the_cap() {
        let players = roster(4);
        for team_size in [MAX_TEAM_SIZE + 1, 1 << 31, (1 << 32) + 1, usize::MAX] {
            let scenario = BalanceScenario {
                roster: &players,
                team_size,
                ..BalanceScenario::default()
            };
            assert_eq!(
                validate_scenario(&scenario),
                Err(BalanceError::InvalidTeamSize { team_size })
            );
        }
        assert!(check_team_size(MAX_TEAM_SIZE).is_ok());
    }

    #[test]
    fn rejects_blank_player_ids() {
        let mut players = roster(4);
        players[2].id = "   ".to_string();
        let scenario = BalanceScenario {
            roster: &players,
            team_size: 2,
            ..BalanceScenario::default()
        };
        assert_eq!(
            validate_scenario(&scenario),
            Err(BalanceError::MissingPlayerId { index: 2 })
        );

        players[2].id = String::new();
        let err = validate_scenario(&BalanceScenario {
            roster: &players,
            team_size: 2,
            ..BalanceScenario::default()
        })
        .unwrap_err();
        assert_eq!(err.field(), "roster");
    }

    #[test]
    fn rejects_duplicates_bad_weights_and_bad_templates() {
        let mut players = roster(4);
        players[3].id = "p0".to_string();
        let scenario = BalanceScenario {
            roster: &players,
            team_size: 2,
            ..BalanceScenario::default()
        };
        assert_eq!(
            validate_scenario(&scenario),
            Err(BalanceError::DuplicatePlayer("p0".to_string()))
        );

        let players = roster(4);
        let weights = vec![BalanceWeight {
            position_group: WeightGroup::Team,
            attribute: Attribute::Teamwork,
            weight: 0.0,
        }];
        let scenario = BalanceScenario {
            roster: &players,
            team_size: 2,
            weights: &weights,
            ..BalanceScenario::default()
        };
        assert!(matches!(
            validate_scenario(&scenario),
            Err(BalanceError::InvalidWeight { .. })
        ));

        let scenario = BalanceScenario {
            roster: &players,
            team_size: 2,
            template: Some(PositionTemplate::new(1, 1, 1)),
            ..BalanceScenario::default()
        };
        assert_eq!(
            validate_scenario(&scenario),
            Err(BalanceError::InvalidTemplate {
                team_size: 2,
                total: 3
            })
        );
    }

    #[test]
    fn rejects_non_finite_ratings() {
        let mut players = roster(2);
        players[1].ratings.control = Some(f64::NAN);
        let scenario = BalanceScenario {
            roster: &players,
            team_size: 1,
            ..BalanceScenario::default()
        };
        assert_eq!(
            validate_scenario(&scenario),
            Err(BalanceError::NonFiniteRating {
                player: "p1".to_string(),
                attribute: Attribute::Control
            })
        );
    }

    #[test]
    fn parallel_and_sequential_both_produce_complete_reports() {
        let players = roster(10);
        for strategy in [SearchStrategy::Sequential, SearchStrategy::Parallel { workers: 2 }] {
            let report = balance_scenario(&BalanceScenario {
                roster: &players,
                team_size: 5,
                seed: Some(3),
                strategy,
                ..BalanceScenario::default()
            })
            .unwrap();
            assert_eq!(report.slot_assignments.len(), 10);
            assert_eq!(report.balance_score, 0.0);
            assert_eq!(report.seed, 3);
            assert!(!report.diagnostics.degraded);
        }
    }
}

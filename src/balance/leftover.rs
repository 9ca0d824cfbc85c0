//! Placement of players no position pass picked up.

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::balance::attributes::Player;
use crate::balance::slots::{SlotAssignment, Team};

/// Open slots left after the position passes, plus what is needed to place players once
/// both teams are full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenSlots {
    pub team_a: Vec<u32>,
    pub team_b: Vec<u32>,
    /// Players already placed on each team, used to pick the side for overflow players.
    pub placed_a: usize,
    pub placed_b: usize,
    pub first_overflow_slot: u32,
}

/// Shuffles `unassigned` and places them alternately (A first), consuming each team's open
/// slots in ascending order. When the preferred team is full the other team takes the player;
/// when both are full the player lands on an overflow slot on the smaller side. Leftover
/// players carry no position.
pub fn distribute_leftovers<R: Rng + ?Sized>(
    unassigned: &[&Player],
    open: &OpenSlots,
    rng: &mut R,
) -> Vec<SlotAssignment> {
    if unassigned.is_empty() {
        return Vec::new();
    }

    let mut order: Vec<&Player> = unassigned.to_vec();
    order.shuffle(rng);

    let mut queue_a: VecDeque<u32> = open.team_a.iter().copied().collect();
    let mut queue_b: VecDeque<u32> = open.team_b.iter().copied().collect();
    let mut placed_a = open.placed_a;
    let mut placed_b = open.placed_b;
    let mut next_overflow = open.first_overflow_slot;

    let mut assignments = Vec::with_capacity(order.len());
    for (index, player) in order.into_iter().enumerate() {
        let preferred = Team::for_pick(index);
        let (team, slot) = match take_slot(preferred, &mut queue_a, &mut queue_b)
            .or_else(|| take_slot(preferred.other(), &mut queue_a, &mut queue_b))
        {
            Some(found) => found,
            None => {
                let team = if placed_b < placed_a { Team::B } else { Team::A };
                let slot = next_overflow;
                next_overflow += 1;
                (team, slot)
            }
        };
        match team {
            Team::A => placed_a += 1,
            Team::B => placed_b += 1,
        }
        assignments.push(SlotAssignment {
            player_id: player.id.clone(),
            team,
            slot_number: slot,
            position: None,
        });
    }
    assignments
}

fn take_slot(
    team: Team,
    queue_a: &mut VecDeque<u32>,
    queue_b: &mut VecDeque<u32>,
) -> Option<(Team, u32)> {
    let queue = match team {
        Team::A => queue_a,
        Team::B => queue_b,
    };
    queue.pop_front().map(|slot| (team, slot))
}

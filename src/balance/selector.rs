//! Position-priority player selection.
//!
//! Each pass ranks the remaining pool by a position's primary attribute, falling back to the
//! secondary and tertiary attributes when values are within [TIE_EPSILON], and takes the top
//! picks for both teams. Passes run in [SELECTION_ORDER]; each consumes its picks from the pool
//! handed to the next.

use std::cmp::Ordering;

use crate::balance::attributes::{Attribute, Player, PositionGroup};

/// Ratings closer than this are treated as equal and handed to the next sort key.
pub const TIE_EPSILON: f64 = 0.1;

/// Sort keys of one position pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionKeys {
    pub primary: Attribute,
    pub secondary: Attribute,
    pub tertiary: Attribute,
}

impl SelectionKeys {
    pub fn for_group(group: PositionGroup) -> Self {
        match group {
            PositionGroup::Defense => Self {
                primary: Attribute::Defending,
                secondary: Attribute::Control,
                tertiary: Attribute::StaminaPace,
            },
            PositionGroup::Attack => Self {
                primary: Attribute::Goalscoring,
                secondary: Attribute::StaminaPace,
                tertiary: Attribute::Control,
            },
            PositionGroup::Midfield => Self {
                primary: Attribute::Control,
                secondary: Attribute::StaminaPace,
                tertiary: Attribute::Teamwork,
            },
        }
    }

    fn as_array(&self) -> [Attribute; 3] {
        [self.primary, self.secondary, self.tertiary]
    }
}

/// Defenders are locked in first, then attackers, and midfield takes what remains.
pub const SELECTION_ORDER: [PositionGroup; 3] = [
    PositionGroup::Defense,
    PositionGroup::Attack,
    PositionGroup::Midfield,
];

/// Descending comparison on the keys in order; `Equal` when every key is within epsilon.
pub fn compare_for_selection(left: &Player, right: &Player, keys: &SelectionKeys) -> Ordering {
    for attribute in keys.as_array() {
        let diff = left.attr(attribute) - right.attr(attribute);
        if diff.abs() >= TIE_EPSILON {
            return if diff > 0.0 {
                Ordering::Less
            } else {
                Ordering::Greater
            };
        }
    }
    Ordering::Equal
}

/// Stable insertion sort. The epsilon comparator is not transitive, which `slice::sort_by`
/// is allowed to reject with a panic; pools are small enough that quadratic time is fine.
fn stable_sort_by<T, F>(items: &mut [T], mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    for index in 1..items.len() {
        let mut cursor = index;
        while cursor > 0 && compare(&items[cursor - 1], &items[cursor]) == Ordering::Greater {
            items.swap(cursor - 1, cursor);
            cursor -= 1;
        }
    }
}

/// Result of one selection pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection<'a> {
    /// Picks in ranking order; alternate entries go to team A and team B.
    pub selected: Vec<&'a Player>,
    /// Players not picked, in their original relative order.
    pub remaining: Vec<&'a Player>,
}

/// Picks the best `quota` players of `pool` for a position. The input pool is left untouched;
/// a pool smaller than the quota yields every player and an empty remainder.
pub fn select_for_position<'a>(
    pool: &[&'a Player],
    quota: usize,
    keys: &SelectionKeys,
) -> Selection<'a> {
    let mut ranked: Vec<(usize, &'a Player)> = pool.iter().copied().enumerate().collect();
    stable_sort_by(&mut ranked, |left, right| {
        compare_for_selection(left.1, right.1, keys)
    });

    let take = quota.min(ranked.len());
    let mut picked_indices: Vec<usize> = ranked[..take].iter().map(|(index, _)| *index).collect();
    let selected = ranked[..take].iter().map(|(_, player)| *player).collect();

    picked_indices.sort_unstable();
    let remaining = pool
        .iter()
        .enumerate()
        .filter(|(index, _)| picked_indices.binary_search(index).is_err())
        .map(|(_, player)| *player)
        .collect();

    Selection {
        selected,
        remaining,
    }
}

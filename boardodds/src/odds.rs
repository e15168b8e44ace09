//! Landing odds for a single two-dice roll.
//!
//! Every query works on the exact numerator of the hit probability (out of
//! the 36 two-dice outcomes) and only converts to a rounded percentage at the
//! very end, so [`chance_from`] and [`breakdown_from`] always agree.

use crate::{
    board::{Tile, NUM_TILES},
    dice::{self, NUM_OUTCOMES},
    good_set::GoodSet,
    is_total_order_by,
};
use claim::debug_assert_le;
use log::debug;
use serde::Serialize;

/// Round `x` to two decimal places, half away from zero.
#[inline]
pub fn round_2dp(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Convert a count of two-dice outcomes into a percentage rounded to two
/// decimals.
#[inline]
fn outcomes_to_percentage(outcomes: u8) -> f64 {
    debug_assert_le!(outcomes, NUM_OUTCOMES);
    round_2dp((outcomes as f64) * 100.0 / (NUM_OUTCOMES as f64))
}

/// The rolls from `start` that land on a good tile, as `(roll, target)` pairs
/// in increasing roll order.
///
/// For a fixed `start`, `roll -> target` is injective: the 11 possible rolls
/// cover 11 distinct consecutive tiles out of 40.
fn good_hits(start: Tile, good: &GoodSet) -> impl Iterator<Item = (u8, Tile)> + '_ {
    dice::sums()
        .map(move |roll| (roll, start.advance(roll)))
        .filter(move |&(_, target)| good.is_good(target))
}

/// The number of the 36 outcomes that land on a good tile from `start`.
fn good_outcomes_from(start: Tile, good: &GoodSet) -> u8 {
    good_hits(start, good)
        .map(|(roll, _)| dice::count_of(roll))
        .sum()
}

/// The percentage chance (0.00 to 100.00) that one roll from `start` lands on
/// a good tile.
pub fn chance_from(start: Tile, good: &GoodSet) -> f64 {
    let chance = outcomes_to_percentage(good_outcomes_from(start, good));
    debug!("chance_from: start: {}, good: {}, chance: {:.2}", start, good, chance);
    chance
}

///////////////
// Breakdown //
///////////////

/// One roll from the start tile that lands on a good tile.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BreakdownRow {
    pub roll: u8,
    /// Squares travelled. Always equal to `roll`.
    pub distance: u8,
    pub tile: Tile,
    pub name: &'static str,
    pub probability_mass: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Breakdown {
    pub start: Tile,
    pub rows: Vec<BreakdownRow>,
    pub total_percentage: f64,
}

/// Like [`chance_from`], but also lists every roll that contributes to the
/// total, in increasing roll order.
pub fn breakdown_from(start: Tile, good: &GoodSet) -> Breakdown {
    let rows = good_hits(start, good)
        .map(|(roll, target)| BreakdownRow {
            roll,
            distance: roll,
            tile: target,
            name: target.name(),
            probability_mass: dice::mass_of(roll),
        })
        .collect::<Vec<_>>();

    debug_assert!(is_total_order_by(rows.iter(), |r1, r2| Some(
        r1.roll.cmp(&r2.roll)
    )));

    let outcomes = rows.iter().map(|row| dice::count_of(row.roll)).sum();
    let total_percentage = outcomes_to_percentage(outcomes);

    debug!(
        "breakdown_from: start: {}, good: {}, rows: {}, total: {:.2}",
        start,
        good,
        rows.len(),
        total_percentage
    );

    Breakdown {
        start,
        rows,
        total_percentage,
    }
}

/////////////
// Heatmap //
/////////////

/// `chance_from` evaluated for every start tile, indexed by tile.
pub fn heatmap(good: &GoodSet) -> [f64; NUM_TILES as usize] {
    let mut out = [0.0; NUM_TILES as usize];
    for start in Tile::all() {
        out[start.index() as usize] = outcomes_to_percentage(good_outcomes_from(start, good));
    }
    out
}

/// The start tile with the highest chance, breaking ties toward the lower
/// index. `None` if no start can reach a good tile.
pub fn best_start(heatmap: &[f64; NUM_TILES as usize]) -> Option<Tile> {
    let (idx, &best) = heatmap
        .iter()
        .enumerate()
        .rev()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))?;

    if best > 0.0 {
        Some(Tile::new(idx as u8))
    } else {
        None
    }
}

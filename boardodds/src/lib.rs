//! # boardodds
//!
//! How likely is a single roll of two dice to land you on a tile you care
//! about?
//!
//! ## Explanation
//!
//! The board is the classic 40-tile loop. You mark some tiles as "good" (one at
//! a time, or a whole group like the railroads at once), and for every tile
//! this tool computes the probability that one roll of two six-sided dice
//! (sum 2 to 12) from that tile lands on a good tile, along with a per-roll
//! breakdown of where that probability comes from.
//!
//! Only a single roll is modeled: no doubles, no jail, no cards.

pub mod board;
pub mod cli;
pub mod dice;
pub mod good_set;
pub mod odds;
pub mod parse;
pub mod stats;

use std::cmp;

pub(crate) const DEFAULT_NUM_SAMPLES: usize = 10_000;
pub(crate) const DEFAULT_SEED: u64 = 0xb0a2d;

/// Returns `true` if the iterator `iter` is totally ordered, according to the
/// comparator function `compare`, i.e., `x_1 < x2 < ... < x_n`.
pub(crate) fn is_total_order_by<T, F>(mut iter: impl Iterator<Item = T>, mut compare: F) -> bool
where
    F: FnMut(&T, &T) -> Option<cmp::Ordering>,
{
    let mut prev = match iter.next() {
        Some(first) => first,
        None => return true,
    };

    for next in iter {
        if let Some(cmp::Ordering::Greater) | Some(cmp::Ordering::Equal) | None =
            compare(&prev, &next)
        {
            return false;
        }
        prev = next;
    }

    true
}

///////////
// Tests //
///////////

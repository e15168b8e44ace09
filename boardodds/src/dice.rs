use claim::debug_assert_le;
use rand::{
    distributions::{Distribution, Uniform},
    Rng,
};
use std::ops::RangeInclusive;

/// The number of equally likely outcomes when rolling two six-sided dice.
pub const NUM_OUTCOMES: u8 = 36;

pub const MIN_SUM: u8 = 2;
pub const MAX_SUM: u8 = 12;

/// `SUM_COUNTS[s]` is the number of ordered pairs `(d1, d2)` with
/// `d1, d2 ∈ [1, 6]` and `d1 + d2 = s`. Indices 0 and 1 are unreachable and
/// stay zero.
const SUM_COUNTS: [u8; MAX_SUM as usize + 1] = precompute_sum_counts();

const fn precompute_sum_counts() -> [u8; MAX_SUM as usize + 1] {
    let mut counts = [0_u8; MAX_SUM as usize + 1];

    let mut d1 = 1;
    while d1 <= 6 {
        let mut d2 = 1;
        while d2 <= 6 {
            counts[d1 + d2] += 1;
            d2 += 1;
        }
        d1 += 1;
    }

    counts
}

/// All reachable two-dice sums, `2..=12`.
#[inline]
pub const fn sums() -> RangeInclusive<u8> {
    MIN_SUM..=MAX_SUM
}

/// The number of the 36 outcomes that produce `sum`. Zero for unreachable sums.
#[inline]
pub const fn count_of(sum: u8) -> u8 {
    if sum > MAX_SUM {
        0
    } else {
        SUM_COUNTS[sum as usize]
    }
}

/// `Pr[d1 + d2 = sum]`. Zero for sums outside `2..=12`.
#[inline]
pub fn mass_of(sum: u8) -> f64 {
    count_of(sum) as f64 / NUM_OUTCOMES as f64
}

/// The full PMF as `(sum, mass)` pairs, in increasing sum order.
pub fn pmf() -> impl Iterator<Item = (u8, f64)> {
    sums().map(|sum| (sum, mass_of(sum)))
}

////////////////
// TwoDiceSum //
////////////////

/// Samples the sum of two independent fair six-sided dice.
#[derive(Clone, Debug)]
pub struct TwoDiceSum {
    die: Uniform<u8>,
}

impl TwoDiceSum {
    pub fn new() -> Self {
        Self {
            die: Uniform::new_inclusive(1, 6),
        }
    }
}

impl Default for TwoDiceSum {
    fn default() -> Self {
        Self::new()
    }
}

impl Distribution<u8> for TwoDiceSum {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u8 {
        let sum = self.die.sample(rng) + self.die.sample(rng);
        debug_assert_le!(sum, MAX_SUM);
        sum
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use claim::assert_gt;
    use rand::SeedableRng;
    use rand_xoshiro::Xoroshiro64Star;

    fn count_of_ref(sum: u8) -> u8 {
        let mut count = 0;
        for d1 in 1..=6 {
            for d2 in 1..=6 {
                if d1 + d2 == sum {
                    count += 1;
                }
            }
        }
        count
    }

    #[test]
    fn test_sum_counts() {
        for sum in 0..=20 {
            assert_eq!(count_of_ref(sum), count_of(sum));
        }
        assert_eq!(
            [0, 0, 1, 2, 3, 4, 5, 6, 5, 4, 3, 2, 1],
            SUM_COUNTS,
        );
    }

    #[test]
    fn test_mass_of() {
        for sum in sums() {
            assert_relative_eq!(count_of_ref(sum) as f64 / 36.0, mass_of(sum));
        }

        assert_eq!(0.0, mass_of(0));
        assert_eq!(0.0, mass_of(1));
        assert_eq!(0.0, mass_of(13));

        let total: f64 = pmf().map(|(_, p)| p).sum();
        assert_relative_eq!(1.0, total);

        let total_count: u8 = sums().map(count_of).sum();
        assert_eq!(NUM_OUTCOMES, total_count);
    }

    #[test]
    fn test_mass_of_extremes() {
        assert_relative_eq!(6.0 / 36.0, mass_of(7));
        assert_relative_eq!(1.0 / 36.0, mass_of(2));
        assert_relative_eq!(1.0 / 36.0, mass_of(12));

        for sum in sums() {
            assert!(mass_of(sum) <= mass_of(7));
            assert!(mass_of(sum) >= mass_of(2));
        }
    }

    #[test]
    fn test_two_dice_sum_support() {
        let mut rng = Xoroshiro64Star::seed_from_u64(0xd1ce);
        let distr = TwoDiceSum::new();

        let mut counts = [0_usize; MAX_SUM as usize + 1];
        for sum in distr.sample_iter(&mut rng).take(10_000) {
            assert!(sums().contains(&sum));
            counts[sum as usize] += 1;
        }

        // every reachable sum shows up, and 7 is the mode.
        for sum in sums() {
            assert_gt!(counts[sum as usize], 0);
            assert!(counts[sum as usize] <= counts[7]);
        }
    }
}

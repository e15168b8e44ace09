use crate::dice;
use claim::{debug_assert_ge, debug_assert_le};
use log::debug;
use ndarray::{Array1, ArrayView1, Zip};
use statrs::distribution::{ChiSquared, ContinuousCDF};

const EPS: f64 = 1e-10;

/// The two-dice sum PMF as a dense array over sums `2..=12`.
pub fn sum_pmf() -> Array1<f64> {
    dice::sums().map(dice::mass_of).collect()
}

/// Normalize dense observed counts into an empirical PMF.
pub fn counts_to_pmf(counts: ArrayView1<usize>) -> Array1<f64> {
    let n = counts.sum();
    if n == 0 {
        return Array1::zeros(counts.len());
    }
    counts.mapv(|count| (count as f64) / (n as f64))
}

/// Whether every sum seen in `p` is possible under `q`.
pub(crate) fn is_pmf_subset(p: ArrayView1<f64>, q: ArrayView1<f64>) -> bool {
    Zip::from(p).and(q).all(|&p_i, &q_i| q_i > 0.0 || p_i <= 0.0)
}

/// `D_KL(p || q)` over the dense sum PMFs. `p` must not put mass on a sum that
/// `q` rules out.
pub(crate) fn kl_divergence(p: ArrayView1<f64>, q: ArrayView1<f64>) -> f64 {
    debug_assert!(is_pmf_subset(p, q));

    Zip::from(p)
        .and(q)
        .fold(0.0, |sum, &p_i, &q_i| sum + kl_div_term(p_i, q_i))
}

#[inline]
fn kl_div_term(p_i: f64, q_i: f64) -> f64 {
    match (p_i > EPS, q_i > EPS) {
        (false, _) => 0.0,
        (true, true) => p_i * (p_i / q_i).ln(),
        (true, false) => f64::INFINITY,
    }
}

/// G statistic for `n` sampled rolls with empirical sum PMF `p_hat` against
/// the exact sum PMF `p`: `G = 2n * D_KL(p_hat || p)`.
fn g_test(n: usize, p: ArrayView1<f64>, p_hat: ArrayView1<f64>) -> f64 {
    2.0 * (n as f64) * kl_divergence(p_hat, p)
}

fn chisq_cdf(dof: f64, x: f64) -> Result<f64, String> {
    ChiSquared::new(dof)
        .map(|distr| distr.cdf(x))
        .map_err(|err| format!("invalid chi^2 degrees of freedom: {dof}: {err}"))
}

/// How plausible it is that `n` sampled rolls with empirical sum PMF `p_hat`
/// came from `p`. Returns the G-test p-value against a chi^2 distribution with
/// one degree of freedom fewer than the number of possible sums.
pub fn multinomial_test(n: usize, p: ArrayView1<f64>, p_hat: ArrayView1<f64>) -> Result<f64, String> {
    let nnz = p.fold(0.0, |nnz, &x| nnz + if x > 0.0 { 1.0 } else { 0.0 });
    let dof = nnz - 1.0;

    debug_assert_le!(nnz, p.dim() as f64);
    debug_assert_ge!(dof, 1.0);

    // a sampled sum that p rules out
    if !is_pmf_subset(p_hat, p) {
        return Ok(0.0);
    }

    let g = g_test(n, p, p_hat);
    let pvalue = 1.0 - chisq_cdf(dof, g)?;

    debug!(
        "multinomial_test: n: {n}, |p|: {}, dof: {dof}, g: {g}, p-value: {pvalue}",
        p.dim()
    );

    Ok(pvalue)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dice::TwoDiceSum;
    use approx::assert_relative_eq;
    use claim::{assert_gt, assert_lt};
    use ndarray::array;
    use rand::{distributions::Distribution, SeedableRng};
    use rand_xoshiro::Xoroshiro64Star;

    #[test]
    fn test_sum_pmf() {
        let p = sum_pmf();
        assert_eq!(11, p.len());
        assert_relative_eq!(1.0, p.sum());
        assert_relative_eq!(6.0 / 36.0, p[5]);
    }

    #[test]
    fn test_counts_to_pmf() {
        let counts = array![1_usize, 3, 0];
        assert_eq!(array![0.25, 0.75, 0.0], counts_to_pmf(counts.view()));

        let counts = array![0_usize, 0];
        assert_eq!(array![0.0, 0.0], counts_to_pmf(counts.view()));
    }

    #[test]
    fn test_is_pmf_subset() {
        let p = array![0.0, 0.0, 1.0];
        let q = array![0.0, 1.0, 1.0];

        assert!(is_pmf_subset(p.view(), p.view()));
        assert!(is_pmf_subset(q.view(), q.view()));
        assert!(is_pmf_subset(p.view(), q.view()));
        assert!(!is_pmf_subset(q.view(), p.view()));
    }

    #[test]
    fn test_kl_divergence() {
        let p = array![0.1, 0.3, 0.6];
        let q = array![0.3, 0.3, 0.4];

        assert_relative_eq!(0.0_f64, kl_divergence(p.view(), p.view()));
        assert_relative_eq!(0.0_f64, kl_divergence(q.view(), q.view()));

        // D_KL(p || q) = (0.1 * ln(0.1 / 0.3))
        //              + (0.3 * ln(0.3 / 0.3))
        //              + (0.6 * ln(0.6 / 0.4))
        //              = 0.13341783599808757
        assert_relative_eq!(0.13341783599808757_f64, kl_divergence(p.view(), q.view()));
    }

    #[test]
    fn test_multinomial_test_two_dice() {
        let mut rng = Xoroshiro64Star::seed_from_u64(0xd15c0);
        let distr = TwoDiceSum::new();
        let p = sum_pmf();

        // a fair single d6 spread over 2..=12 doesn't look like two dice
        let mut p_wrong = Array1::zeros(11);
        for idx in 0..6 {
            p_wrong[idx] = 1.0 / 6.0;
        }

        for n in [1_000, 10_000] {
            let mut counts = Array1::<usize>::zeros(11);
            for sum in distr.clone().sample_iter(&mut rng).take(n) {
                counts[(sum - dice::MIN_SUM) as usize] += 1;
            }
            let p_hat = counts_to_pmf(counts.view());

            let pvalue = multinomial_test(n, p.view(), p_hat.view()).unwrap();
            assert_gt!(pvalue, 0.001);

            let pvalue_wrong = multinomial_test(n, p_wrong.view(), p_hat.view()).unwrap();
            assert_lt!(pvalue_wrong, 0.01);
        }
    }
}

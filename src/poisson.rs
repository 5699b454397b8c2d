//! Poisson probability mass.

/// Natural log of the probability of exactly `k` events when events occur at the mean rate
/// `lambda`. The `lambda^k / k!` term is accumulated as a sum of `ln(lambda / i)`, so it stays
/// finite for any rate. A zero rate gives `0` at `k = 0`.
#[inline]
pub fn ln_univariate(k: usize, lambda: f64) -> f64 {
    let mut ln_prob = -lambda;
    for i in 1..=k {
        ln_prob += f64::ln(lambda / i as f64);
    }
    ln_prob
}

/// The most probable count for `lambda`, capped at `max_k`.
pub fn mode(lambda: f64, max_k: usize) -> usize {
    usize::min(lambda as usize, max_k)
}

/// Fills `weights` with the mass for `k = 0, 1, …, weights.len() - 1` relative to the mode
/// within that range, which gets a weight of exactly one. Neighbours are derived outward from
/// the mode with `p(k) = p(k - 1) * lambda / k`, so no weight exceeds one and the modal weight
/// never underflows.
///
/// Returns the natural log of the modal probability, such that `weights[k] * exp(ln_scale)`
/// is the probability of `k`.
pub fn fill_scaled(lambda: f64, weights: &mut [f64]) -> f64 {
    if weights.is_empty() {
        return 0.0;
    }
    let mode = mode(lambda, weights.len() - 1);
    weights[mode] = 1.0;
    for k in (0..mode).rev() {
        weights[k] = weights[k + 1] * (k + 1) as f64 / lambda;
    }
    for k in mode + 1..weights.len() {
        weights[k] = weights[k - 1] * lambda / k as f64;
    }
    ln_univariate(mode, lambda)
}

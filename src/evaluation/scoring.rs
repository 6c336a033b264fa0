//! Score normalization helpers

/// Round to 2 decimals; non-finite values become 0.0
pub fn round2(value: f64) -> f64 {
    round_to(value, 100.0)
}

/// Round to 3 decimals; non-finite values become 0.0
pub fn round3(value: f64) -> f64 {
    round_to(value, 1000.0)
}

fn round_to(value: f64, factor: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * factor).round() / factor
}

/// Clamp into [0, 1]; non-finite values become 0.0
pub fn clamp_unit(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    value.max(0.0).min(1.0)
}

/// Clamp into [0, 1] then round to 2 decimals
pub fn normalize_score(score: f64) -> f64 {
    round2(clamp_unit(score))
}

/// Arithmetic mean; 0.0 for no values
pub fn mean<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Σ score·weight / Σ weight, dividing by 1 when the weights sum to 0
pub fn weighted_average<I>(pairs: I) -> f64
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let (total_score, total_weight) = pairs
        .into_iter()
        .fold((0.0, 0.0), |(score_sum, weight_sum), (score, weight)| {
            (score_sum + score * weight, weight_sum + weight)
        });
    let divisor = if total_weight == 0.0 { 1.0 } else { total_weight };
    total_score / divisor
}

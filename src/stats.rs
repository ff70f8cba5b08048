//! Numeric reductions over plain `f64` slices.
//!
//! Everything here is deterministic: values are summed in input order and
//! quantiles sort a copy with `total_cmp`, so the same input always gives
//! bit-identical output.

/// Lower clamp of [`exact_percentile`].
pub const PERCENTILE_FLOOR: f64 = 0.1;
/// Upper clamp of [`exact_percentile`].
pub const PERCENTILE_CEILING: f64 = 99.9;

/// Keep present, finite observations.
pub fn valid_values<I>(values: I) -> Vec<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    values
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .collect()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (ddof = 0).
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(var.sqrt())
}

pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Quantile `q` in [0, 1] with linear interpolation between closest ranks.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sorted = sorted_copy(values);
    Some(quantile_sorted(&sorted, q))
}

/// Same as [`quantile`] for an already ascending slice. Panics on empty input.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let frac = pos - lower as f64;
    let (a, b) = (sorted[lower], sorted[upper]);
    (a + (b - a) * frac).max(a).min(b)
}

pub fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Inclusive-rank percentile of `value` within `distribution`.
///
/// `count(x <= value) / len * 100`, clamped to [0.1, 99.9]. A value tied with
/// the sample maximum therefore reports 99.9, never 100. An empty
/// distribution reports the median (50.0).
pub fn exact_percentile(value: f64, distribution: &[f64]) -> f64 {
    if distribution.is_empty() {
        return 50.0;
    }
    let at_or_below = distribution.iter().filter(|&&x| x <= value).count();
    let percentile = at_or_below as f64 / distribution.len() as f64 * 100.0;
    percentile.clamp(PERCENTILE_FLOOR, PERCENTILE_CEILING)
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn valid_values_drops_nulls_and_nan() {
        let v = valid_values(vec![Some(1.0), None, Some(f64::NAN), Some(2.0)]);
        assert_eq!(v, vec![1.0, 2.0]);
    }

    #[test]
    fn quantile_interpolates_linearly() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&v, 0.0), Some(1.0));
        assert_eq!(quantile(&v, 1.0), Some(4.0));
        assert_eq!(quantile(&v, 0.5), Some(2.5));
        assert_eq!(quantile(&v, 0.75), Some(3.25));
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn std_dev_is_population_based() {
        let sd = std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((sd - 2.0).abs() < 1e-12);
    }

    #[test]
    fn exact_percentile_counts_ties_as_below() {
        let d = [1.0, 2.0, 2.0, 3.0];
        assert_eq!(exact_percentile(2.0, &d), 75.0);
        assert_eq!(exact_percentile(1.5, &d), 25.0);
    }

    #[test]
    fn exact_percentile_clamps_extremes() {
        let d = [1.0, 2.0, 3.0];
        assert_eq!(exact_percentile(3.0, &d), 99.9);
        assert_eq!(exact_percentile(0.0, &d), 0.1);
        assert_eq!(exact_percentile(10.0, &[]), 50.0);
    }

    #[test]
    fn exact_percentile_between_quartiles() {
        // 120 strikers, goals/90 spread evenly from 0.0 to 1.19
        let d: Vec<f64> = (0..120).map(|i| i as f64 / 100.0).collect();
        let p75 = quantile(&d, 0.75).unwrap();
        let p90 = quantile(&d, 0.90).unwrap();
        let value = (p75 + p90) / 2.0;
        let pct = exact_percentile(value, &d);
        assert!(pct > 75.0 && pct < 90.0, "got {pct}");
    }

    proptest! {
        #[test]
        fn exact_percentile_stays_in_bounds(
            value in -1e6f64..1e6,
            dist in prop::collection::vec(-1e6f64..1e6, 0..200),
        ) {
            let p = exact_percentile(value, &dist);
            prop_assert!((PERCENTILE_FLOOR..=PERCENTILE_CEILING).contains(&p));
        }

        #[test]
        fn quantiles_are_monotone(values in prop::collection::vec(-1e4f64..1e4, 1..200)) {
            let sorted = sorted_copy(&values);
            let qs = [0.0, 0.1, 0.25, 0.5, 0.75, 0.9, 1.0];
            let results: Vec<f64> = qs.iter().map(|q| quantile_sorted(&sorted, *q)).collect();
            for pair in results.windows(2) {
                prop_assert!(pair[0] <= pair[1]);
            }
        }
    }
}

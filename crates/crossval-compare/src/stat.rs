use std::f64::consts::PI;

/// Sample mean.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// n−1 sample variance.
pub fn sample_variance(values: &[f64]) -> f64 {
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (values.len() - 1) as f64
}

/// Empirical quantile of unsorted draws, linear interpolation between
/// order statistics.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let h = (sorted.len() - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    let frac = h - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}

/// Standard normal quantile (inverse CDF), Acklam's rational approximation.
/// Relative error below 1.15e-9 over the full open interval.
pub fn normal_quantile(p: f64) -> f64 {
    debug_assert!(p > 0.0 && p < 1.0);

    const A: [f64; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];

    const P_LOW: f64 = 0.02425;

    if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    }
}

/// Student-t quantile for a two-tailed probability `p` and `df` degrees of
/// freedom (Hill's expansion; exact closed forms for df 1 and 2).
///
/// Returns the positive critical value `t` with `P(|T| > t) = p`.
pub fn t_quantile_two_tailed(p: f64, df: usize) -> f64 {
    debug_assert!(p > 0.0 && p < 1.0);
    debug_assert!(df >= 1);

    let ndf = df as f64;
    if df == 1 {
        let half = p * PI / 2.0;
        return half.cos() / half.sin();
    }
    if df == 2 {
        return (2.0 / (p * (2.0 - p)) - 2.0).sqrt();
    }

    let a = 1.0 / (ndf - 0.5);
    let b = 48.0 / (a * a);
    let mut c = ((20700.0 * a / b - 98.0) * a - 16.0) * a + 96.36;
    let d = ((94.5 / (b + c) - 3.0) / b + 1.0) * (a * PI / 2.0).sqrt() * ndf;
    let mut x = d * p;
    let mut y = x.powf(2.0 / ndf);

    if y > 0.05 + a {
        x = normal_quantile(p * 0.5);
        y = x * x;
        if df < 5 {
            c += 0.3 * (ndf - 4.5) * (x + 0.6);
        }
        c = (((0.05 * d * x - 5.0) * x - 7.0) * x - 2.0) * x + b + c;
        y = (((((0.4 * y + 6.3) * y + 36.0) * y + 94.5) / c - y - 3.0) / b + 1.0) * x;
        y = a * y * y;
        y = if y > 0.002 { y.exp() - 1.0 } else { 0.5 * y * y + y };
    } else {
        y = ((1.0 / (((ndf + 6.0) / (ndf * y) - 0.089 * d - 0.822) * (ndf + 2.0) * 3.0)
            + 0.5 / (ndf + 4.0))
            * y
            - 1.0)
            * (ndf + 1.0)
            / (ndf + 2.0)
            + 1.0 / y;
    }

    (ndf * y).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_normal_quantile_known_values() {
        assert_abs_diff_eq!(normal_quantile(0.5), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(normal_quantile(0.975), 1.959964, epsilon = 1e-5);
        assert_abs_diff_eq!(normal_quantile(0.025), -1.959964, epsilon = 1e-5);
        assert_abs_diff_eq!(normal_quantile(0.9995), 3.290527, epsilon = 1e-4);
    }

    #[test]
    fn test_t_quantile_known_values() {
        // Reference values from standard t tables, alpha = 0.05 two-tailed.
        assert_abs_diff_eq!(t_quantile_two_tailed(0.05, 1), 12.7062, epsilon = 1e-3);
        assert_abs_diff_eq!(t_quantile_two_tailed(0.05, 2), 4.30265, epsilon = 1e-4);
        assert_abs_diff_eq!(t_quantile_two_tailed(0.05, 4), 2.77645, epsilon = 1e-2);
        assert_abs_diff_eq!(t_quantile_two_tailed(0.05, 10), 2.22814, epsilon = 1e-2);
        assert_abs_diff_eq!(t_quantile_two_tailed(0.05, 30), 2.04227, epsilon = 1e-2);
        assert_abs_diff_eq!(t_quantile_two_tailed(0.01, 10), 3.16927, epsilon = 1e-2);
    }

    #[test]
    fn test_t_approaches_normal_for_large_df() {
        let t = t_quantile_two_tailed(0.05, 1000);
        assert_abs_diff_eq!(t, 1.962, epsilon = 5e-3);
    }

    #[test]
    fn test_quantile_interpolation() {
        let draws = vec![4.0, 1.0, 3.0, 2.0];
        assert_abs_diff_eq!(quantile(&draws, 0.0), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(quantile(&draws, 0.5), 2.5, epsilon = 1e-12);
        assert_abs_diff_eq!(quantile(&draws, 1.0), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_sample_variance() {
        assert_abs_diff_eq!(
            sample_variance(&[1.0, 2.0, 3.0, 4.0]),
            5.0 / 3.0,
            epsilon = 1e-12
        );
    }
}

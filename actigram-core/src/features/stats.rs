//! Time-domain statistics over window series
//!
//! All helpers are pure functions over equal-length slices taken from one
//! window. Degenerate inputs (empty series, zero variance) return 0 rather
//! than NaN so downstream feature vectors stay finite.

/// Arithmetic mean; 0 for an empty series
pub fn mean(series: &[f64]) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    let sum: f64 = series.iter().sum();
    sum / series.len() as f64
}

/// Unbiased sample variance (n-1 denominator); 0 below two samples
pub fn variance(series: &[f64]) -> f64 {
    let n = series.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(series);
    let sum_sq: f64 = series.iter().map(|x| (x - m) * (x - m)).sum();
    sum_sq / (n - 1) as f64
}

/// Sample standard deviation (n-1 denominator)
pub fn std_dev(series: &[f64]) -> f64 {
    libm::sqrt(variance(series))
}

/// Pearson correlation coefficient between two series
///
/// Defined as 0 when either series has zero variance or the lengths
/// disagree. The result is clamped to [-1, 1] against rounding overshoot.
pub fn correlation(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.len() != ys.len() || xs.len() < 2 {
        return 0.0;
    }
    let mx = mean(xs);
    let my = mean(ys);

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in xs.iter().zip(ys.iter()) {
        let dx = x - mx;
        let dy = y - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx <= 0.0 || syy <= 0.0 {
        return 0.0;
    }
    (sxy / libm::sqrt(sxx * syy)).clamp(-1.0, 1.0)
}

/// Signal Magnitude Area over three axes
///
/// Mean over the window of (|a| + |b| + |c|) / 3, an orientation-free
/// motion-intensity measure.
pub fn signal_magnitude_area(a: &[f64], b: &[f64], c: &[f64]) -> f64 {
    let n = a.len().min(b.len()).min(c.len());
    if n == 0 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        sum += (libm::fabs(a[i]) + libm::fabs(b[i]) + libm::fabs(c[i])) / 3.0;
    }
    sum / n as f64
}

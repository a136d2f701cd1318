//! Descriptive statistics over numeric columns

use serde::Serialize;
use std::cmp::Ordering;

/// Sorted copy of the finite values
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}

/// Quantile of already sorted values, linear interpolation between closest ranks
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Standard deviation with `ddof` delta degrees of freedom (1 = sample, 0 = population)
pub fn std_dev(values: &[f64], ddof: usize) -> Option<f64> {
    if values.len() <= ddof {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() - ddof) as f64).sqrt())
}

/// Pearson correlation; `None` when either column is constant or lengths differ
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let mx = mean(xs)?;
    let my = mean(ys)?;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let (dx, dy) = (x - mx, y - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/// Mean, spread and range of a column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Moments {
    pub mean: f64,
    /// Sample standard deviation
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl Moments {
    pub fn of(values: &[f64]) -> Option<Self> {
        let sorted = sorted(values);
        Some(Self {
            mean: mean(&sorted)?,
            std: std_dev(&sorted, 1).unwrap_or(0.0),
            min: *sorted.first()?,
            max: *sorted.last()?,
        })
    }
}

/// Five-number summary behind a box plot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl BoxStats {
    pub fn of(values: &[f64]) -> Option<Self> {
        let sorted = sorted(values);
        Some(Self {
            count: sorted.len(),
            min: *sorted.first()?,
            q1: quantile(&sorted, 0.25)?,
            median: quantile(&sorted, 0.5)?,
            q3: quantile(&sorted, 0.75)?,
            max: *sorted.last()?,
        })
    }
}

/// Outliers by the 1.5 IQR rule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierReport {
    pub column: String,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub count: usize,
    /// Share of the column's values, in percent
    pub pct: f64,
}

impl OutlierReport {
    pub fn of(column: &str, values: &[f64]) -> Option<Self> {
        let sorted = sorted(values);
        let q1 = quantile(&sorted, 0.25)?;
        let q3 = quantile(&sorted, 0.75)?;
        let iqr = q3 - q1;
        let lower_bound = q1 - 1.5 * iqr;
        let upper_bound = q3 + 1.5 * iqr;
        let count = sorted
            .iter()
            .filter(|&&v| v < lower_bound || v > upper_bound)
            .count();

        Some(Self {
            column: column.to_string(),
            q1,
            q3,
            iqr,
            lower_bound,
            upper_bound,
            count,
            pct: count as f64 / sorted.len() as f64 * 100.0,
        })
    }
}

/// One bin of an equal-width histogram, `[start, end)` except the last bin
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width histogram over the value range
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let sorted = sorted(values);
    let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }
    if min == max {
        return vec![HistogramBin {
            start: min,
            end: max,
            count: sorted.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in &sorted {
        let index = (((v - min) / width) as usize).min(bins - 1);
        counts[index] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: min + width * i as f64,
            end: min + width * (i + 1) as f64,
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_quantile_interpolates() {
        let values = sorted(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(quantile(&values, 0.0), Some(1.0));
        assert_eq!(quantile(&values, 1.0), Some(4.0));
        assert!(close(quantile(&values, 0.25).unwrap(), 1.75));
        assert!(close(quantile(&values, 0.5).unwrap(), 2.5));
        assert!(close(quantile(&values, 0.75).unwrap(), 3.25));
        assert_eq!(quantile(&[], 0.5), None);
        assert_eq!(quantile(&values, 1.5), None);
    }

    #[test]
    fn test_std_dev() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!(close(std_dev(&values, 0).unwrap(), 2.0));
        assert!(close(std_dev(&values, 1).unwrap(), (32.0f64 / 7.0).sqrt()));
        assert_eq!(std_dev(&[1.0], 1), None);
    }

    #[test]
    fn test_pearson() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        assert!(close(pearson(&xs, &[2.0, 4.0, 6.0, 8.0]).unwrap(), 1.0));
        assert!(close(pearson(&xs, &[8.0, 6.0, 4.0, 2.0]).unwrap(), -1.0));
        assert_eq!(pearson(&xs, &[1.0, 1.0, 1.0, 1.0]), None);
        assert_eq!(pearson(&xs, &[1.0]), None);
    }

    #[test]
    fn test_outliers() {
        let values = [10.0, 12.0, 11.0, 13.0, 12.0, 11.0, 14.0, 95.0];
        let report = OutlierReport::of("amt", &values).unwrap();

        assert!(close(report.q1, 11.0));
        assert!(close(report.q3, 13.25));
        assert!(close(report.iqr, 2.25));
        assert!(close(report.upper_bound, 16.625));
        assert_eq!(report.count, 1);
        assert!(close(report.pct, 12.5));
        assert!(OutlierReport::of("amt", &[]).is_none());
    }

    #[test]
    fn test_box_stats_and_moments() {
        let stats = BoxStats::of(&[5.0, 1.0, 3.0]).unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!((stats.min, stats.median, stats.max), (1.0, 3.0, 5.0));
        assert!(close(stats.q1, 2.0));

        let moments = Moments::of(&[1.0, 3.0]).unwrap();
        assert!(close(moments.mean, 2.0));
        assert!(close(moments.std, 2.0f64.sqrt()));
        assert!(Moments::of(&[]).is_none());
    }

    #[test]
    fn test_histogram() {
        let bins = histogram(&[0.0, 1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0].count, 2);
        assert_eq!(bins[1].count, 3);
        assert_eq!(bins[1].end, 4.0);

        let flat = histogram(&[7.0, 7.0], 10);
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].count, 2);
        assert!(histogram(&[], 5).is_empty());
    }
}

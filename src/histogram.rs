//! Fixed-bin histograms for figure rendering
//!
//! Bins are equal width over `[lo, hi]` (or equal width in log10 space for
//! [`Histogram::log_spaced`]). The last bin is closed on the right; values
//! outside the range are dropped.

use crate::error::{Result, VetoError};

/// Binned counts with their edges
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// `counts.len() + 1` monotonically increasing bin edges
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Equal-width bins over `[lo, hi]`
    pub fn linear(values: &[f64], lo: f64, hi: f64, bins: usize) -> Result<Self> {
        check_range(lo, hi, bins)?;
        let width = (hi - lo) / bins as f64;
        let edges = (0..=bins).map(|i| lo + width * i as f64).collect();
        let mut counts = vec![0usize; bins];

        for &v in values {
            if let Some(idx) = bin_index(v, lo, hi, bins) {
                counts[idx] += 1;
            }
        }

        Ok(Self { edges, counts })
    }

    /// Bins equal width in log10 over `[lo, hi]`; non-positive values are dropped
    pub fn log_spaced(values: &[f64], lo: f64, hi: f64, bins: usize) -> Result<Self> {
        if lo <= 0.0 {
            return Err(VetoError::invalid(format!(
                "log-spaced histogram needs lo > 0, got {lo}"
            )));
        }
        check_range(lo, hi, bins)?;

        let logs: Vec<f64> = values
            .iter()
            .filter(|&&v| v > 0.0)
            .map(|v| v.log10())
            .collect();
        let linear = Self::linear(&logs, lo.log10(), hi.log10(), bins)?;

        Ok(Self {
            edges: linear.edges.iter().map(|e| 10f64.powf(*e)).collect(),
            counts: linear.counts,
        })
    }

    /// Single empty bin spanning `[lo, hi]`
    pub fn empty(lo: f64, hi: f64) -> Self {
        Self {
            edges: vec![lo, hi],
            counts: vec![0],
        }
    }

    /// Number of counted values
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Largest bin count
    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// `(left, right, count)` for each bin
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        self.edges
            .windows(2)
            .zip(&self.counts)
            .map(|(edge, &count)| (edge[0], edge[1], count))
    }
}

/// Smallest and largest finite value
pub fn finite_extent(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

fn check_range(lo: f64, hi: f64, bins: usize) -> Result<()> {
    if bins == 0 {
        return Err(VetoError::invalid("histogram needs at least one bin"));
    }
    if !(lo.is_finite() && hi.is_finite() && lo < hi) {
        return Err(VetoError::invalid(format!(
            "histogram range must satisfy lo < hi, got [{lo}, {hi}]"
        )));
    }
    Ok(())
}

fn bin_index(v: f64, lo: f64, hi: f64, bins: usize) -> Option<usize> {
    if !(v >= lo && v <= hi) {
        return None;
    }
    let idx = ((v - lo) / (hi - lo) * bins as f64) as usize;
    Some(idx.min(bins - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_edges_and_counts() {
        let hist = Histogram::linear(&[0.0, 0.5, 1.0, 1.5, 2.0], 0.0, 2.0, 2).unwrap();
        assert_eq!(hist.edges, vec![0.0, 1.0, 2.0]);
        // 2.0 lands in the closed last bin
        assert_eq!(hist.counts, vec![2, 3]);
    }

    #[test]
    fn test_out_of_range_values_dropped() {
        let hist = Histogram::linear(&[-1.0, 0.5, 3.0, f64::NAN], 0.0, 2.0, 4).unwrap();
        assert_eq!(hist.total(), 1);
    }

    #[test]
    fn test_log_spaced_edges() {
        let hist = Histogram::log_spaced(&[1.0, 10.0, 100.0, -5.0], 1.0, 100.0, 2).unwrap();
        assert!((hist.edges[1] - 10.0).abs() < 1e-9);
        assert_eq!(hist.total(), 3);
    }

    #[test]
    fn test_log_spaced_rejects_non_positive_lo() {
        assert!(Histogram::log_spaced(&[1.0], 0.0, 10.0, 4).is_err());
    }

    #[test]
    fn test_zero_bins_rejected() {
        assert!(Histogram::linear(&[1.0], 0.0, 1.0, 0).is_err());
    }

    #[test]
    fn test_empty_has_one_zero_bin() {
        let hist = Histogram::empty(-1.0, 1.0);
        assert_eq!(hist.total(), 0);
        assert_eq!(hist.max_count(), 0);
        assert_eq!(hist.bins().count(), 1);
    }

    #[test]
    fn test_bins_iterator() {
        let hist = Histogram::linear(&[0.25, 0.75], 0.0, 1.0, 2).unwrap();
        let bins: Vec<_> = hist.bins().collect();
        assert_eq!(bins, vec![(0.0, 0.5, 1), (0.5, 1.0, 1)]);
    }
}

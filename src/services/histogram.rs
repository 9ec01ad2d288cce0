//! Equal-width binning for the daily return distribution

/// Bin count used by the dashboard
pub const RETURN_BINS: usize = 30;

/// Counts of values falling into equal-width bins
///
/// `edges` has one more entry than `counts`. Every bin is half-open
/// `[lo, hi)` except the last, which also includes its right edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<u32>,
}

impl Histogram {
    /// Bin `values` into `bins` equal-width buckets spanning their range
    ///
    /// When every value is identical the range is widened by 0.5 on each
    /// side so the bars still have width. Non-finite values are skipped.
    pub fn from_values(values: &[f64], bins: usize) -> Self {
        let bins = bins.max(1);
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();

        let (mut lo, mut hi) = finite
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        if finite.is_empty() {
            lo = 0.0;
            hi = 1.0;
        } else if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins)
            .map(|i| if i == bins { hi } else { lo + width * i as f64 })
            .collect();

        let mut counts = vec![0u32; bins];
        for v in finite {
            let mut idx = (((v - lo) / width) as usize).min(bins - 1);
            // Division rounding can land a value one bin off its edges
            while idx > 0 && v < edges[idx] {
                idx -= 1;
            }
            while idx < bins - 1 && v >= edges[idx + 1] {
                idx += 1;
            }
            counts[idx] += 1;
        }

        Self { edges, counts }
    }

    /// (left edge, right edge, count) for each bar
    pub fn bars(&self) -> impl Iterator<Item = (f64, f64, u32)> + '_ {
        self.edges
            .windows(2)
            .zip(self.counts.iter())
            .map(|(edge, &count)| (edge[0], edge[1], count))
    }

    pub fn max_count(&self) -> u32 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    pub fn range(&self) -> (f64, f64) {
        (self.edges[0], self.edges[self.edges.len() - 1])
    }

    #[cfg(test)]
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }
}

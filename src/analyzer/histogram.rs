//! A fixed-size error histogram with an overflow bucket, mirroring the
//! analyzer's `Histogram` type: every operation contributes one sample
//! (its semantic-error cost, its age, ...) and the histogram reports
//! aggregate statistics without ever growing past its construction size.

const DEFAULT_SIZE: usize = 100 * 1024;

pub struct Histogram {
    buckets: Vec<u64>,
    overflowed: bool,
}

impl Histogram {
    pub fn new() -> Self {
        Self::with_size(DEFAULT_SIZE)
    }

    pub fn with_size(size: usize) -> Self {
        Histogram {
            buckets: vec![0; size.max(1)],
            overflowed: false,
        }
    }

    /// Records one sample. Values at or beyond the histogram's size fall
    /// into the top bucket rather than being dropped, so the total sample
    /// count is always exact even when individual values are clipped.
    pub fn add(&mut self, value: u64) {
        let last = self.buckets.len() - 1;
        if value as usize >= self.buckets.len() {
            self.overflowed = true;
            self.buckets[last] += 1;
        } else {
            self.buckets[value as usize] += 1;
        }
    }

    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    pub fn num_samples(&self) -> u64 {
        self.buckets.iter().sum()
    }

    /// Sum of `index * count` across every bucket; the numerator of the
    /// mean error.
    pub fn cumulative_error(&self) -> u64 {
        self.buckets
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, &count)| i as u64 * count)
            .sum()
    }

    /// The number of distinct bucket values that received at least one
    /// sample.
    pub fn errors(&self) -> usize {
        self.buckets.iter().filter(|&&c| c != 0).count()
    }

    /// The highest bucket index with at least one sample, or `None` if the
    /// histogram is empty.
    pub fn max(&self) -> Option<u64> {
        self.buckets
            .iter()
            .enumerate()
            .rev()
            .find(|&(_, &count)| count != 0)
            .map(|(i, _)| i as u64)
    }

    pub fn mean(&self) -> f64 {
        let n = self.num_samples();
        if n == 0 {
            0.0
        } else {
            self.cumulative_error() as f64 / n as f64
        }
    }

    pub fn stdv(&self) -> f64 {
        let n = self.num_samples();
        if n == 0 {
            return 0.0;
        }
        let mean = self.mean();
        let variance: f64 = self
            .buckets
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count != 0)
            .map(|(i, &count)| (i as f64 - mean).powi(2) * count as f64)
            .sum::<f64>()
            / n as f64;
        variance.sqrt()
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_basic_aggregates() {
        let mut h = Histogram::with_size(16);
        h.add(1);
        h.add(2);
        h.add(2);
        assert_eq!(h.num_samples(), 3);
        assert_eq!(h.cumulative_error(), 1 + 2 + 2);
        assert_eq!(h.max(), Some(2));
        assert_eq!(h.errors(), 2);
        assert!((h.mean() - (5.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn overflow_goes_into_last_bucket() {
        let mut h = Histogram::with_size(4);
        h.add(100);
        assert!(h.overflowed());
        assert_eq!(h.max(), Some(3));
    }

    #[test]
    fn empty_histogram_has_zero_mean() {
        let h = Histogram::with_size(8);
        assert_eq!(h.num_samples(), 0);
        assert_eq!(h.mean(), 0.0);
        assert_eq!(h.max(), None);
    }
}

/// Collects integer samples for one molecule statistic and reports their median.
#[derive(Debug, Clone, Default)]
pub struct MedianAccumulator {
    samples: Vec<i64>,
}

impl MedianAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulator seeded with one optional sample.
    pub fn seeded(sample: Option<i64>) -> Self {
        let mut acc = Self::new();
        acc.push_opt(sample);
        acc
    }

    pub fn push(&mut self, sample: i64) {
        self.samples.push(sample);
    }

    pub fn push_opt(&mut self, sample: Option<i64>) {
        if let Some(sample) = sample {
            self.push(sample);
        }
    }

    /// Median of the collected samples, `None` when nothing was collected.
    ///
    /// Even-sized collections report the mean of the two central values.
    pub fn median(mut self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        self.samples.sort_unstable();
        let n = self.samples.len();
        let mid = n / 2;
        if n % 2 == 1 {
            Some(self.samples[mid] as f64)
        } else {
            Some((self.samples[mid - 1] as f64 + self.samples[mid] as f64) / 2.0)
        }
    }
}

use serde::Serialize;

/// Summary of one generation's scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreStats {
    pub min: u32,
    pub max: u32,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
}

impl ScoreStats {
    /// Computes statistics over unsorted scores.
    ///
    /// Returns `None` if `scores` is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// # use flapga_training::ScoreStats;
    /// let stats = ScoreStats::new([3, 0, 1, 4]).unwrap();
    /// assert_eq!(stats.min, 0);
    /// assert_eq!(stats.max, 4);
    /// assert_eq!(stats.mean, 2.0);
    /// assert_eq!(stats.median, 2.0);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new<I>(scores: I) -> Option<Self>
    where
        I: IntoIterator<Item = u32>,
    {
        let mut sorted = scores.into_iter().collect::<Vec<_>>();
        sorted.sort_unstable();

        let min = *sorted.first()?;
        let max = *sorted.last()?;
        let n = sorted.len() as f64;
        let mean = sorted.iter().copied().map(f64::from).sum::<f64>() / n;
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            f64::midpoint(f64::from(sorted[mid - 1]), f64::from(sorted[mid]))
        } else {
            f64::from(sorted[mid])
        };
        let variance = sorted
            .iter()
            .map(|v| (f64::from(*v) - mean).powi(2))
            .sum::<f64>()
            / n;

        Some(Self {
            min,
            max,
            mean,
            median,
            std_dev: variance.sqrt(),
        })
    }
}

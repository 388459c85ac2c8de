use crate::config::SupervisorConfig;

/// Coarse progress from marker lines: `min(completed / estimated_total, 1.0)`.
///
/// The estimate is fixed for the whole run; the raw ratio overshoots 1.0 whenever the tool
/// exports more than expected, hence the clamp.
#[derive(Debug, Clone)]
pub struct ProgressEstimator {
    marker: String,
    estimated_total: u32,
    completed: u32,
}

impl ProgressEstimator {
    /// An empty marker never matches.
    pub fn new(marker: &str, estimated_total_units: u32) -> Self {
        Self {
            marker: marker.to_lowercase(),
            estimated_total: estimated_total_units,
            completed: 0,
        }
    }

    pub fn from_config(cfg: &SupervisorConfig) -> Self {
        Self::new(&cfg.marker, cfg.estimated_total_units)
    }

    pub fn is_marker(&self, line: &str) -> bool {
        !self.marker.is_empty() && line.to_lowercase().contains(&self.marker)
    }

    /// Counts `line` if it carries the marker and returns the updated fraction.
    pub fn observe(&mut self, line: &str) -> f64 {
        if self.is_marker(line) {
            self.completed = self.completed.saturating_add(1);
        }
        self.fraction()
    }

    pub fn fraction(&self) -> f64 {
        if self.estimated_total == 0 {
            return if self.completed > 0 { 1.0 } else { 0.0 };
        }
        (self.completed as f64 / self.estimated_total as f64).min(1.0)
    }

    pub fn completed(&self) -> u32 {
        self.completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_match_ignores_case() {
        let mut est = ProgressEstimator::new("Exporting", 4);
        est.observe("EXPORTING Texture2D #1");
        est.observe("exporting mesh");
        est.observe("Loading bundle");
        assert_eq!(est.completed(), 2);
        assert_eq!(est.fraction(), 0.5);
    }

    #[test]
    fn fraction_clamps_at_one() {
        let mut est = ProgressEstimator::new("exporting", 2);
        for _ in 0..5 {
            est.observe("Exporting asset");
        }
        assert_eq!(est.completed(), 5);
        assert_eq!(est.fraction(), 1.0);
    }

    #[test]
    fn empty_marker_and_zero_estimate() {
        let mut est = ProgressEstimator::new("", 10);
        est.observe("anything");
        assert_eq!(est.completed(), 0);

        let mut zero = ProgressEstimator::new("x", 0);
        assert_eq!(zero.fraction(), 0.0);
        assert_eq!(zero.observe("x"), 1.0);
    }
}

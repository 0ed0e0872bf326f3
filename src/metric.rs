//! Pluggable scoring strategies over a [`Grid`] snapshot.
//!
//! A metric is a pure function of a grid; the solver evaluates every explored
//! grid through the active metric and prunes branches that fall too far below
//! the best completed solution. New strategies are added by implementing
//! [`Metric`], not by branching inside the solver.

use crate::errors::ConfigError;
use crate::grid::Grid;

/// Scoring strategy consuming a grid snapshot and producing a scalar quality
/// value. `Send + Sync` so one metric instance can be shared by parallel
/// search workers.
pub trait Metric: Send + Sync {
    fn evaluate(&self, grid: &Grid) -> f64;
}

/// Fill density of the bounding box, in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DensityMetric;

impl Metric for DensityMetric {
    fn evaluate(&self, grid: &Grid) -> f64 {
        grid.density()
    }
}

/// Weighted average of density and intersections-per-area, scaled to a 0-100
/// quality value.
#[derive(Debug, Clone, Copy)]
pub struct DensityAndIntersectionMetric {
    density_weight: f64,
    intersection_weight: f64,
}

impl DensityAndIntersectionMetric {
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidMetricWeights`] if either weight is
    /// negative or not finite, or if the weights sum to zero. Weights are
    /// validated here, never clamped.
    pub fn new(density_weight: f64, intersection_weight: f64) -> Result<Self, ConfigError> {
        let valid = density_weight.is_finite()
            && intersection_weight.is_finite()
            && density_weight >= 0.0
            && intersection_weight >= 0.0
            && density_weight + intersection_weight > 0.0;

        if !valid {
            return Err(ConfigError::InvalidMetricWeights { density_weight, intersection_weight });
        }

        Ok(Self { density_weight, intersection_weight })
    }
}

impl Metric for DensityAndIntersectionMetric {
    fn evaluate(&self, grid: &Grid) -> f64 {
        // An empty grid has area 0; score it 0 rather than dividing by it.
        if grid.area() == 0 {
            return 0.0;
        }

        let density = grid.density();
        let intersection_ratio = grid.intersections() as f64 / grid.area() as f64;

        let raw = self.density_weight * density + self.intersection_weight * intersection_ratio;
        raw / (self.density_weight + self.intersection_weight) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Direction, Placement, Point};

    fn crossed_grid() -> Grid {
        let mut g = Grid::new();
        assert!(g.place_word(&Placement::new("ROOM", Point::new(0, 0), Direction::Horizontal)));
        assert!(g.place_word(&Placement::new("OMEGA", Point::new(1, 0), Direction::Vertical)));
        g
    }

    #[test]
    fn test_density_metric_matches_grid_density() {
        let g = crossed_grid();
        assert!((DensityMetric.evaluate(&g) - g.density()).abs() < f64::EPSILON);
    }

    #[test]
    fn test_density_metric_empty_grid() {
        assert_eq!(DensityMetric.evaluate(&Grid::new()), 0.0);
    }

    #[test]
    fn test_blend_metric_weighted_average() {
        // 8 occupied cells in a 4x5 box with one intersection:
        // (0.4 + 0.05) / 2 * 100
        let g = crossed_grid();
        let metric = DensityAndIntersectionMetric::new(100.0, 100.0).unwrap();
        assert!((metric.evaluate(&g) - 22.5).abs() < 1e-9);
    }

    #[test]
    fn test_blend_metric_empty_grid_scores_zero() {
        let metric = DensityAndIntersectionMetric::new(100.0, 100.0).unwrap();
        assert_eq!(metric.evaluate(&Grid::new()), 0.0);
    }

    #[test]
    fn test_blend_metric_ignores_intersections_at_zero_weight() {
        let g = crossed_grid();
        let metric = DensityAndIntersectionMetric::new(1.0, 0.0).unwrap();
        assert!((metric.evaluate(&g) - g.density() * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_blend_metric_rejects_negative_weight() {
        assert!(matches!(
            DensityAndIntersectionMetric::new(-1.0, 100.0),
            Err(ConfigError::InvalidMetricWeights { .. })
        ));
    }

    #[test]
    fn test_blend_metric_rejects_zero_weight_sum() {
        assert!(matches!(
            DensityAndIntersectionMetric::new(0.0, 0.0),
            Err(ConfigError::InvalidMetricWeights { .. })
        ));
    }

    #[test]
    fn test_blend_metric_rejects_non_finite_weight() {
        assert!(DensityAndIntersectionMetric::new(f64::NAN, 1.0).is_err());
        assert!(DensityAndIntersectionMetric::new(1.0, f64::INFINITY).is_err());
    }
}

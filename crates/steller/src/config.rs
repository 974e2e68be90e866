//! Layout configuration.
//!
//! Keys follow the camelCase convention used by diagram configs upstream, and every field is
//! optional when deserializing: missing keys fall back to [`LayoutConfig::default`].

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub default_node_width: f64,
    pub default_node_height: f64,
    /// Minimum gap between two node boxes for them to count as non-overlapping.
    pub margin: f64,
    /// Empty border kept by the deterministic placements. Resolution may use the whole canvas.
    pub padding: f64,
    pub max_iterations: usize,
    /// Total displacement (summed over all nodes since the previous check) under which the
    /// resolver considers itself settled.
    pub convergence_epsilon: f64,
    pub convergence_check_period: usize,
    /// Composite quality score (0..=100) a layout needs to be accepted without a warning.
    pub quality_threshold: f64,
    /// Seed for tie-breaking jitter. Runs with the same seed are reproducible.
    pub seed: u64,
    /// Above this node count overlap detection goes through the spatial index.
    pub spatial_index_threshold: usize,
    pub ideal_edge_length: f64,
    pub enhance: bool,
    pub history_capacity: usize,
    pub tuning: TuningConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1920.0,
            canvas_height: 1080.0,
            default_node_width: 160.0,
            default_node_height: 60.0,
            margin: 20.0,
            padding: 40.0,
            max_iterations: 500,
            convergence_epsilon: 0.5,
            convergence_check_period: 10,
            quality_threshold: 60.0,
            seed: 0x5EED,
            spatial_index_threshold: 20,
            ideal_edge_length: 220.0,
            enhance: true,
            history_capacity: 32,
            tuning: TuningConfig::default(),
        }
    }
}

impl LayoutConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        let cfg = Self::deserialize(value)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let canvas_ok = self.canvas_width.is_finite()
            && self.canvas_height.is_finite()
            && self.canvas_width > 0.0
            && self.canvas_height > 0.0;
        if !canvas_ok {
            return Err(Error::InvalidCanvas {
                width: self.canvas_width,
                height: self.canvas_height,
            });
        }

        let node_ok = self.default_node_width.is_finite()
            && self.default_node_height.is_finite()
            && self.default_node_width > 0.0
            && self.default_node_height > 0.0;
        if !node_ok {
            return Err(invalid(format!(
                "default node size must be positive, got {}x{}",
                self.default_node_width, self.default_node_height
            )));
        }

        for (name, v) in [
            ("margin", self.margin),
            ("padding", self.padding),
            ("convergenceEpsilon", self.convergence_epsilon),
            ("idealEdgeLength", self.ideal_edge_length),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(invalid(format!("{name} must be a finite non-negative number")));
            }
        }
        if !(0.0..=100.0).contains(&self.quality_threshold) {
            return Err(invalid(format!(
                "qualityThreshold must be within 0..=100, got {}",
                self.quality_threshold
            )));
        }
        if self.convergence_check_period == 0 {
            return Err(invalid("convergenceCheckPeriod must be at least 1".to_string()));
        }

        self.tuning.validate()
    }

    /// Canvas area minus the placement padding on each side, never negative.
    pub(crate) fn inner_extent(&self) -> (f64, f64, f64, f64) {
        let pad_x = self.padding.min(self.canvas_width / 4.0);
        let pad_y = self.padding.min(self.canvas_height / 4.0);
        (
            pad_x,
            pad_y,
            (self.canvas_width - 2.0 * pad_x).max(0.0),
            (self.canvas_height - 2.0 * pad_y).max(0.0),
        )
    }
}

fn invalid(message: String) -> Error {
    Error::InvalidConfig { message }
}

/// Thresholds and force constants. None of these are load-bearing for the zero-overlap contract;
/// they only shape how quickly and how nicely a layout settles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TuningConfig {
    /// Node count at which the node-count factor saturates.
    pub large_graph_threshold: usize,
    /// Average degree treated as "dense" for the edge-density factor.
    pub dense_degree: f64,
    pub moderate_threshold: f64,
    pub complex_threshold: f64,
    pub very_complex_threshold: f64,
    pub complexity_weights: ComplexityWeights,

    /// Budget multipliers per complexity category.
    pub simple_effort: f64,
    pub moderate_effort: f64,
    pub complex_effort: f64,
    pub very_complex_effort: f64,

    pub separation: PhaseForces,
    pub structure_formation: PhaseForces,
    pub fine_adjustment: PhaseForces,
    /// Fraction of the phased budget held back for separation-only cleanup after the last phase.
    pub cleanup_share: f64,
    /// Base repulsion constant (scaled by each phase's `repulsion`).
    pub repulsion_constant: f64,
    /// Repulsion applies to pairs whose gap is below `repulsion_range_factor * idealEdgeLength`.
    pub repulsion_range_factor: f64,
    pub gravity: f64,

    pub quality_weights: QualityWeights,
    pub utilization_target: f64,

    /// Number of history samples per (category, strategy) before the history may steer choices.
    pub history_min_samples: usize,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            large_graph_threshold: 50,
            dense_degree: 4.0,
            moderate_threshold: 25.0,
            complex_threshold: 50.0,
            very_complex_threshold: 75.0,
            complexity_weights: ComplexityWeights::default(),
            simple_effort: 0.25,
            moderate_effort: 0.5,
            complex_effort: 1.0,
            very_complex_effort: 1.0,
            separation: PhaseForces {
                budget_share: 0.5,
                repulsion: 1.0,
                attraction: 0.0,
                max_step: 60.0,
            },
            structure_formation: PhaseForces {
                budget_share: 0.3,
                repulsion: 0.5,
                attraction: 0.08,
                max_step: 30.0,
            },
            fine_adjustment: PhaseForces {
                budget_share: 0.2,
                repulsion: 0.2,
                attraction: 0.03,
                max_step: 8.0,
            },
            cleanup_share: 0.2,
            repulsion_constant: 4500.0,
            repulsion_range_factor: 1.0,
            gravity: 0.01,
            quality_weights: QualityWeights::default(),
            utilization_target: 0.75,
            history_min_samples: 2,
        }
    }
}

impl TuningConfig {
    fn validate(&self) -> Result<()> {
        let ordered = 0.0 <= self.moderate_threshold
            && self.moderate_threshold <= self.complex_threshold
            && self.complex_threshold <= self.very_complex_threshold
            && self.very_complex_threshold <= 100.0;
        if !ordered {
            return Err(invalid(
                "complexity thresholds must be ordered within 0..=100".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.cleanup_share) {
            return Err(invalid(format!(
                "cleanupShare must be within [0, 1), got {}",
                self.cleanup_share
            )));
        }
        if !(self.utilization_target > 0.0 && self.utilization_target <= 1.0) {
            return Err(invalid("utilizationTarget must be within (0, 1]".to_string()));
        }
        for phase in [
            &self.separation,
            &self.structure_formation,
            &self.fine_adjustment,
        ] {
            let finite = [
                phase.budget_share,
                phase.repulsion,
                phase.attraction,
                phase.max_step,
            ]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0);
            if !finite {
                return Err(invalid(
                    "phase force constants must be finite and non-negative".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub(crate) fn phase_share_total(&self) -> f64 {
        let total = self.separation.budget_share
            + self.structure_formation.budget_share
            + self.fine_adjustment.budget_share;
        if total > 0.0 { total } else { 1.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhaseForces {
    /// Share of the iteration budget given to the phase (normalized across phases).
    pub budget_share: f64,
    pub repulsion: f64,
    pub attraction: f64,
    /// Cap on a single node's displacement per iteration, before cooling.
    pub max_step: f64,
}

impl Default for PhaseForces {
    fn default() -> Self {
        Self {
            budget_share: 1.0,
            repulsion: 1.0,
            attraction: 0.0,
            max_step: 30.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComplexityWeights {
    pub node_count: f64,
    pub edge_density: f64,
    pub overlap_severity: f64,
    pub spatial_spread: f64,
    pub size_variance: f64,
}

impl Default for ComplexityWeights {
    fn default() -> Self {
        Self {
            node_count: 0.25,
            edge_density: 0.25,
            overlap_severity: 0.25,
            spatial_spread: 0.15,
            size_variance: 0.10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QualityWeights {
    pub overlap_freedom: f64,
    pub utilization: f64,
    pub balance: f64,
    pub readability: f64,
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            overlap_freedom: 0.50,
            utilization: 0.20,
            balance: 0.15,
            readability: 0.15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = LayoutConfig::from_json_str(r#"{"canvasWidth": 800, "margin": 8}"#)
            .expect("config");
        assert_eq!(cfg.canvas_width, 800.0);
        assert_eq!(cfg.margin, 8.0);
        assert_eq!(cfg.canvas_height, LayoutConfig::default().canvas_height);
        assert_eq!(cfg.tuning, TuningConfig::default());
    }

    #[test]
    fn nested_tuning_overrides_are_read() {
        let value = serde_json::json!({
            "tuning": { "moderateThreshold": 10.0, "separation": { "maxStep": 12.0 } }
        });
        let cfg = LayoutConfig::from_value(&value).expect("config");
        assert_eq!(cfg.tuning.moderate_threshold, 10.0);
        assert_eq!(cfg.tuning.separation.max_step, 12.0);
        assert_eq!(cfg.tuning.separation.attraction, 0.0);
    }

    #[test]
    fn rejects_non_positive_canvas() {
        let err = LayoutConfig::from_json_str(r#"{"canvasHeight": 0}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidCanvas { .. }), "got {err:?}");
    }

    #[test]
    fn rejects_negative_margin() {
        let err = LayoutConfig::from_json_str(r#"{"margin": -1}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }), "got {err:?}");
    }

    #[test]
    fn rejects_unordered_thresholds() {
        let mut cfg = LayoutConfig::default();
        cfg.tuning.complex_threshold = 90.0;
        cfg.tuning.very_complex_threshold = 80.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn cleanup_share_must_leave_room_for_the_phases() {
        let mut cfg = LayoutConfig::default();
        cfg.tuning.cleanup_share = 1.0;
        assert!(matches!(cfg.validate(), Err(Error::InvalidConfig { .. })));
        cfg.tuning.cleanup_share = f64::NAN;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let err = LayoutConfig::from_json_str("{").unwrap_err();
        assert!(matches!(err, Error::Json(_)), "got {err:?}");
    }
}

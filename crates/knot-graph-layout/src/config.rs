//! Layout configuration, fixed for the lifetime of an engine.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{LayoutError, LayoutResult};

/// Tuning constants of a layout engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Repulsion strength between every pair of nodes.
    pub repulsion: f64,
    /// Base spring constant of an edge, multiplied by its shared-role count.
    pub attraction: f64,
    /// Velocity retained per tick, in (0, 1].
    pub damping: f64,
    /// Width of the node-slot chunks the buffers are padded to.
    pub batch_width: usize,
    /// Sleep between simulation ticks.
    pub simulation_interval_ms: u64,
    /// Sleep between presentation ticks.
    pub presentation_interval_ms: u64,
    /// Initial positions are drawn from `[-passive_bound, passive_bound]`;
    /// also the default viewport edge length.
    pub passive_bound: f64,
    /// Floor applied to inter-node distances before dividing.
    pub min_distance: f64,
    /// Place nodes on a static circle instead of simulating.
    pub circular: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            repulsion: 1000.0,
            attraction: 0.001,
            damping: 0.85,
            batch_width: 64,
            simulation_interval_ms: 20,
            presentation_interval_ms: 10,
            passive_bound: 100.0,
            min_distance: 1.0,
            circular: false,
        }
    }
}

impl LayoutConfig {
    pub fn simulation_interval(&self) -> Duration {
        Duration::from_millis(self.simulation_interval_ms)
    }

    pub fn presentation_interval(&self) -> Duration {
        Duration::from_millis(self.presentation_interval_ms)
    }

    pub fn with_circular(mut self, circular: bool) -> Self {
        self.circular = circular;
        self
    }

    pub fn with_intervals(mut self, simulation_ms: u64, presentation_ms: u64) -> Self {
        self.simulation_interval_ms = simulation_ms;
        self.presentation_interval_ms = presentation_ms;
        self
    }

    /// Reject values the physics cannot run with.
    pub fn validate(&self) -> LayoutResult<()> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> LayoutResult<()> {
            Err(LayoutError::InvalidConfig {
                field,
                reason: reason.into(),
            })
        }

        if !self.repulsion.is_finite() || self.repulsion < 0.0 {
            return invalid("repulsion", format!("must be finite and >= 0, got {}", self.repulsion));
        }
        if !self.attraction.is_finite() || self.attraction < 0.0 {
            return invalid(
                "attraction",
                format!("must be finite and >= 0, got {}", self.attraction),
            );
        }
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return invalid("damping", format!("must be in (0, 1], got {}", self.damping));
        }
        if self.batch_width == 0 {
            return invalid("batch_width", "must be >= 1");
        }
        if self.simulation_interval_ms == 0 {
            return invalid("simulation_interval_ms", "must be >= 1");
        }
        if self.presentation_interval_ms == 0 {
            return invalid("presentation_interval_ms", "must be >= 1");
        }
        if !self.passive_bound.is_finite() || self.passive_bound <= 0.0 {
            return invalid(
                "passive_bound",
                format!("must be finite and > 0, got {}", self.passive_bound),
            );
        }
        if !self.min_distance.is_finite() || self.min_distance <= 0.0 {
            return invalid(
                "min_distance",
                format!("must be finite and > 0, got {}", self.min_distance),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(LayoutConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_damping() {
        for damping in [0.0, -0.5, 1.5, f64::NAN] {
            let config = LayoutConfig {
                damping,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(LayoutError::InvalidConfig { field: "damping", .. })
            ));
        }
    }

    #[test]
    fn test_rejects_zero_batch_width_and_interval() {
        let config = LayoutConfig {
            batch_width: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = LayoutConfig::default().with_intervals(0, 10);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: LayoutConfig =
            serde_json::from_str(r#"{"damping": 0.5, "circular": true}"#).unwrap();
        assert_eq!(config.damping, 0.5);
        assert!(config.circular);
        assert_eq!(config.batch_width, 64);
        assert_eq!(config.simulation_interval(), Duration::from_millis(20));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_min_distance_rejected() {
        let config: LayoutConfig = serde_json::from_str(r#"{"min_distance": 0.0}"#).unwrap();
        assert!(matches!(
            config.validate(),
            Err(LayoutError::InvalidConfig { field: "min_distance", .. })
        ));
    }
}

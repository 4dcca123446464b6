//! Engine configuration.

use std::f64::consts::{FRAC_PI_4, FRAC_PI_6, PI, TAU};

use crate::error::{MeshError, Result};

/// Options for the Q-Morph engine.
///
/// The angle and ratio thresholds are the empirical values the method was
/// published with; they are exposed here rather than baked in.
#[derive(Debug, Clone)]
pub struct QMorphOptions {
    /// A front neighbour is accepted as a quad side when the angle swept
    /// between it and the edge is below this (radians). Default: 3π/4.
    pub side_angle_threshold: f64,

    /// Quads with an interior angle at or above this are chevrons
    /// (radians). Default: 200°.
    pub chevron_angle: f64,

    /// Length ratio between neighbouring front edges above which the shorter
    /// one is consumed first. Default: 2.5.
    pub transition_ratio: f64,

    /// A side edge within this angle of the wedge bisector is used without
    /// trying a swap (radians). Default: π/6.
    pub side_edge_tolerance: f64,

    /// Smooth the corners of every new quad. Default: true.
    pub smooth: bool,

    /// How many times a rejected smoothing move is halved before the node
    /// is put back. Default: 4.
    pub smoothing_step_backs: usize,

    /// Upper bound on diagonal swaps while recovering one top edge.
    /// Default: 64.
    pub max_recovery_swaps: usize,

    /// Stop after this many steps, if set.
    pub max_steps: Option<usize>,
}

impl Default for QMorphOptions {
    fn default() -> Self {
        Self {
            side_angle_threshold: 3.0 * FRAC_PI_4,
            chevron_angle: 200.0_f64.to_radians(),
            transition_ratio: 2.5,
            side_edge_tolerance: FRAC_PI_6,
            smooth: true,
            smoothing_step_backs: 4,
            max_recovery_swaps: 64,
            max_steps: None,
        }
    }
}

impl QMorphOptions {
    /// Set the side acceptance threshold (radians).
    pub fn with_side_angle_threshold(mut self, angle: f64) -> Self {
        self.side_angle_threshold = angle;
        self
    }

    /// Set the chevron threshold (radians).
    pub fn with_chevron_angle(mut self, angle: f64) -> Self {
        self.chevron_angle = angle;
        self
    }

    /// Set the large-transition length ratio.
    pub fn with_transition_ratio(mut self, ratio: f64) -> Self {
        self.transition_ratio = ratio;
        self
    }

    /// Set the side edge tolerance (radians).
    pub fn with_side_edge_tolerance(mut self, angle: f64) -> Self {
        self.side_edge_tolerance = angle;
        self
    }

    /// Enable or disable local smoothing.
    pub fn with_smoothing(mut self, smooth: bool) -> Self {
        self.smooth = smooth;
        self
    }

    /// Create options that leave node positions untouched.
    pub fn without_smoothing(mut self) -> Self {
        self.smooth = false;
        self
    }

    /// Set how many times a smoothing move is halved.
    pub fn with_smoothing_step_backs(mut self, step_backs: usize) -> Self {
        self.smoothing_step_backs = step_backs;
        self
    }

    /// Set the swap budget for top edge recovery.
    pub fn with_max_recovery_swaps(mut self, swaps: usize) -> Self {
        self.max_recovery_swaps = swaps;
        self
    }

    /// Stop after `steps` steps.
    pub fn with_max_steps(mut self, steps: usize) -> Self {
        self.max_steps = Some(steps);
        self
    }

    /// Check every value is in range.
    pub fn validate(&self) -> Result<()> {
        if !(self.side_angle_threshold > 0.0 && self.side_angle_threshold < TAU) {
            return Err(MeshError::invalid_param(
                "side_angle_threshold",
                self.side_angle_threshold,
                "must be in (0, 2π)",
            ));
        }
        if !(self.chevron_angle > PI && self.chevron_angle < TAU) {
            return Err(MeshError::invalid_param(
                "chevron_angle",
                self.chevron_angle,
                "must be in (π, 2π)",
            ));
        }
        if !(self.transition_ratio > 1.0) {
            return Err(MeshError::invalid_param(
                "transition_ratio",
                self.transition_ratio,
                "must be greater than 1",
            ));
        }
        if !(self.side_edge_tolerance > 0.0 && self.side_edge_tolerance <= PI / 2.0) {
            return Err(MeshError::invalid_param(
                "side_edge_tolerance",
                self.side_edge_tolerance,
                "must be in (0, π/2]",
            ));
        }
        if self.max_recovery_swaps == 0 {
            return Err(MeshError::invalid_param(
                "max_recovery_swaps",
                self.max_recovery_swaps,
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

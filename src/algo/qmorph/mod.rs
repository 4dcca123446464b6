//! The Q-Morph advancing-front engine.
//!
//! Starting from a valid triangulation, the boundary becomes the initial
//! front. Each step picks a front edge (see [`Mesh::next_front`]), builds a
//! quad on it by choosing or creating its sides, recovering the top edge and
//! absorbing the triangles in between, then advances the front across the
//! new quad. Steps repeat until no front edge can be consumed; triangles
//! that could not be paired remain in the mesh.
//!
//! # Example
//!
//! ```
//! use qmorph::algo::qmorph::{QMorph, QMorphOptions};
//! use qmorph::mesh::build_from_triangles;
//!
//! let mesh = build_from_triangles(&[
//!     [0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
//!     [1.0, 0.0, 1.0, 1.0, 0.0, 1.0],
//! ])
//! .unwrap();
//!
//! let mut engine = QMorph::new(mesh, QMorphOptions::default()).unwrap();
//! let stats = engine.run().unwrap();
//!
//! assert_eq!(stats.quads, 1);
//! assert_eq!(engine.mesh().num_triangles(), 0);
//! assert_eq!(engine.mesh().num_front_edges(), 0);
//! ```
//!
//! # References
//!
//! - Owen, Staten, Canann, Saigal: "Q-Morph: An Indirect Approach to
//!   Advancing Front Quad Meshing" (1999)

mod local_smooth;
mod options;
mod quad;

pub use options::QMorphOptions;

use crate::algo::progress::Progress;
use crate::algo::stages::PostProcess;
use crate::error::{MeshError, Result};
use crate::mesh::{EdgeId, ElementId, Mesh, NodeId};

use quad::make_quad;

/// Where the engine is in its life cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// The front has not been built yet.
    Initializing,
    /// Front edges remain to be consumed.
    Running,
    /// No front edge can be consumed any more.
    Finished,
}

/// The result of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A quad was built.
    Quad(ElementId),
    /// No quad could be built on this front edge; it is skipped until the
    /// next success.
    Rejected(EdgeId),
    /// Nothing left to do.
    Finished,
}

/// Counters collected during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Steps taken.
    pub steps: usize,
    /// Quads built.
    pub quads: usize,
    /// Attempts that were rolled back.
    pub rejected: usize,
    /// Diagonal swaps kept in successful attempts.
    pub swaps: usize,
    /// Quads whose largest angle reached the chevron threshold.
    pub chevrons: usize,
    /// Triangles left when the engine finished.
    pub residual_triangles: usize,
}

/// The engine.
#[derive(Debug)]
pub struct QMorph {
    mesh: Mesh,
    options: QMorphOptions,
    state: EngineState,
    /// Lowest level on the front.
    level: usize,
    /// Front edges at `level`.
    level_count: usize,
    initial_front: usize,
    stats: RunStats,
}

impl QMorph {
    /// Wrap a triangulation.
    ///
    /// # Errors
    /// Returns an error if the options are out of range.
    pub fn new(mesh: Mesh, options: QMorphOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            mesh,
            options,
            state: EngineState::Initializing,
            level: 0,
            level_count: 0,
            initial_front: 0,
            stats: RunStats::default(),
        })
    }

    /// The mesh in its current state.
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Take the mesh out of the engine.
    pub fn into_mesh(self) -> Mesh {
        self.mesh
    }

    /// The options in use.
    pub fn options(&self) -> &QMorphOptions {
        &self.options
    }

    /// Life cycle state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Lowest level currently on the front.
    pub fn level(&self) -> usize {
        self.level
    }

    /// Whether the lowest front level has an even number of edges.
    ///
    /// An all-quad mesh needs an even number of edges on every closed
    /// front; an odd count means at least one triangle will remain.
    pub fn front_parity_is_even(&self) -> bool {
        self.level_count % 2 == 0
    }

    /// Counters so far.
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    // ==================== Initialization ====================

    /// Build the initial front from the boundary.
    ///
    /// Boundary nodes are fixed, every edge with a single triangle joins the
    /// front at level 0, and each front edge is classified.
    ///
    /// # Errors
    /// - [`MeshError::InvalidState`] if called twice.
    /// - [`MeshError::EmptyMesh`] if there are no elements.
    /// - [`MeshError::NotTriangulated`] if the mesh already holds quads.
    pub fn init(&mut self) -> Result<()> {
        if self.state != EngineState::Initializing {
            return Err(MeshError::InvalidState(
                "the engine is already initialised".to_string(),
            ));
        }
        if self.mesh.is_empty() {
            return Err(MeshError::EmptyMesh);
        }
        if let Some(el) = self
            .mesh
            .element_ids()
            .find(|&el| !self.mesh.element(el).is_triangle())
        {
            return Err(MeshError::NotTriangulated {
                element: el.index(),
            });
        }

        for e in self.mesh.front_edges() {
            self.mesh.demote_front(e);
        }

        let boundary: Vec<EdgeId> = self
            .mesh
            .edge_ids()
            .filter(|&e| self.mesh.edge(e).element_count() == 1)
            .collect();
        let mut fixed: Vec<NodeId> = Vec::new();
        for &e in &boundary {
            fixed.extend(self.mesh.edge(e).nodes());
            self.mesh.promote_to_front(e, 0);
        }
        for n in fixed {
            self.mesh.node_mut(n).fixed = true;
        }
        for &e in &boundary {
            self.mesh
                .classify_state_of_front_edge(e, self.options.side_angle_threshold);
        }

        self.initial_front = boundary.len();
        self.update_level();
        self.state = EngineState::Running;

        let front = self.mesh.front();
        log::info!(
            "initial front: {} edges (states 0/1/2: {}/{}/{}), {} triangles",
            front.len(),
            front.bucket(0).len(),
            front.bucket(1).len(),
            front.bucket(2).len(),
            self.mesh.num_triangles()
        );
        if !self.front_parity_is_even() {
            log::warn!("odd number of boundary edges; at least one triangle will remain");
        }
        Ok(())
    }

    // ==================== Stepping ====================

    /// Consume one front edge.
    ///
    /// Initialises the front on first use.
    pub fn step(&mut self) -> Result<StepOutcome> {
        match self.state {
            EngineState::Initializing => self.init()?,
            EngineState::Finished => return Ok(StepOutcome::Finished),
            EngineState::Running => {}
        }

        let Some(e) = self.mesh.next_front(self.options.transition_ratio) else {
            self.finish();
            return Ok(StepOutcome::Finished);
        };
        self.stats.steps += 1;

        match make_quad(&mut self.mesh, &self.options, e) {
            Some(built) => {
                log::debug!(
                    "quad {} on {e}: absorbed {} triangles, {} swaps, +{} -{} front edges",
                    built.quad,
                    built.absorbed,
                    built.swaps,
                    built.promoted.len(),
                    built.retired.len()
                );
                self.mesh.restore_selectable();
                self.stats.quads += 1;
                self.stats.swaps += built.swaps;
                if let Some(q) = self.mesh.element(built.quad).as_quad() {
                    if q.is_chevron(self.options.chevron_angle) {
                        self.stats.chevrons += 1;
                        log::debug!(
                            "quad {} is a chevron ({:.1}°)",
                            built.quad,
                            q.largest_angle().to_degrees()
                        );
                    }
                }
                self.update_level();
                Ok(StepOutcome::Quad(built.quad))
            }
            None => {
                log::debug!("no quad on {e}, skipping it");
                self.mesh.set_unselectable(e);
                self.stats.rejected += 1;
                Ok(StepOutcome::Rejected(e))
            }
        }
    }

    /// Step until finished.
    pub fn run(&mut self) -> Result<RunStats> {
        self.run_with_progress(&Progress::none())
    }

    /// Step until finished, reporting how much of the initial front is gone.
    pub fn run_with_progress(&mut self, progress: &Progress) -> Result<RunStats> {
        loop {
            if let Some(max) = self.options.max_steps {
                if self.stats.steps >= max {
                    log::warn!("stopping after {max} steps");
                    break;
                }
            }
            let outcome = self.step()?;
            progress.report_front(self.initial_front, self.mesh.num_front_edges());
            if outcome == StepOutcome::Finished {
                break;
            }
        }
        Ok(self.stats.clone())
    }

    /// Run to completion, then apply each post-processing stage in order.
    pub fn run_with(&mut self, stages: &mut [&mut dyn PostProcess]) -> Result<RunStats> {
        let stats = self.run()?;
        self.post_process(stages)?;
        Ok(stats)
    }

    /// Apply post-processing stages to the mesh in order.
    pub fn post_process(&mut self, stages: &mut [&mut dyn PostProcess]) -> Result<()> {
        for stage in stages.iter_mut() {
            log::info!("applying {}", stage.name());
            stage.apply(&mut self.mesh)?;
        }
        Ok(())
    }

    fn finish(&mut self) {
        self.state = EngineState::Finished;
        self.stats.residual_triangles = self.mesh.num_triangles();
        log::info!(
            "finished after {} steps: {} quads, {} rejected attempts, {} swaps",
            self.stats.steps,
            self.stats.quads,
            self.stats.rejected,
            self.stats.swaps
        );
        if self.stats.residual_triangles > 0 {
            log::warn!("{} triangles remain", self.stats.residual_triangles);
        }
    }

    /// Recompute the lowest front level and its edge count.
    fn update_level(&mut self) {
        let lowest = self
            .mesh
            .front()
            .iter()
            .map(|e| self.mesh.edge(e).level())
            .min();
        let Some(lowest) = lowest else {
            self.level_count = 0;
            return;
        };
        if lowest != self.level {
            log::debug!("front advanced to level {lowest}");
        }
        self.level = lowest;
        self.level_count = self
            .mesh
            .front()
            .iter()
            .filter(|&e| self.mesh.edge(e).level() == lowest)
            .count();
    }
}

//! Bolt generators — five independent algorithms that each synthesize a
//! branching line-segment structure for one lightning strike.
//!
//! A generator call is synchronous and self-contained: it takes an immutable
//! parameter set and a seedable [`Rng`], appends [`Segment`]s to a
//! caller-owned vector, and returns. No generator fails; a bolt that never
//! reaches the ground is a valid (if less dramatic) outcome.

mod lsystem;
mod midpoint;
mod physical;
mod rrt;
mod rrt3d;

pub use lsystem::LSystemParams;
pub use midpoint::MidpointParams;
pub use physical::PhysicalParams;
pub use rrt::RrtParams;
pub use rrt3d::{Bounds3, Rrt3dParams};

use crate::segment::Segment;
use crate::util::Rng;
use serde::{Deserialize, Serialize};

/// The closed set of bolt algorithms, each with its own parameter space.
/// Adding an algorithm means adding a variant here and letting the compiler
/// point at every match that needs a new arm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "algorithm", content = "params")]
pub enum BoltParams {
    /// Grammar rewriting with turtle interpretation
    LSystem(LSystemParams),
    /// Recursive fractal subdivision with branch injection
    Midpoint(MidpointParams),
    /// Rapidly-exploring random tree in the raster plane
    Rrt(RrtParams),
    /// Rapidly-exploring random tree in a world-space volume
    Rrt3d(Rrt3dParams),
    /// Stepped-leader / return-stroke simulation
    Physical(PhysicalParams),
}

impl BoltParams {
    /// Generate one bolt, appending its segments to `segments`.
    pub fn generate(&self, rng: &mut Rng, segments: &mut Vec<Segment>) {
        match self {
            Self::LSystem(p) => lsystem::generate(p, rng, segments),
            Self::Midpoint(p) => midpoint::generate(p, rng, segments),
            Self::Rrt(p) => rrt::generate(p, rng, segments),
            Self::Rrt3d(p) => rrt3d::generate(p, rng, segments),
            Self::Physical(p) => physical::generate(p, rng, segments),
        }
    }

    /// Display name for host UI drop-downs
    pub fn name(&self) -> &'static str {
        match self {
            Self::LSystem(_) => "L-System",
            Self::Midpoint(_) => "Midpoint",
            Self::Rrt(_) => "RRT",
            Self::Rrt3d(_) => "RRT 3D",
            Self::Physical(_) => "Physical",
        }
    }
}

/// The render collaborator implemented by the host. This crate only produces
/// geometry; stroking, fading, and glow belong to the fixture pipeline.
pub trait RenderBolt {
    /// Stroke `segments` at the given envelope values. `fade` and `intensity`
    /// are in [0, 1]; `thickness` is a base stroke width in pixels;
    /// `bleeding` scales the optional glow.
    fn render(&mut self, segments: &[Segment], fade: f32, intensity: f32, thickness: f32, bleeding: f32);
}

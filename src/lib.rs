//! arclight — procedural lightning-bolt geometry for LED fixture hosts.
//!
//! Five generation algorithms (grammar rewriting, midpoint displacement,
//! planar and volumetric random trees, and a stepped-leader simulation) each
//! turn an immutable parameter set plus a seedable RNG into a connected,
//! bounds-checked sequence of [`Segment`]s. Rasterizing those segments into
//! pixel colors is the host's job — see [`RenderBolt`].
//!
//! ```
//! use arclight::{BoltParams, MidpointParams, Rng};
//!
//! let params = BoltParams::Midpoint(MidpointParams::default());
//! let mut rng = Rng::new(0xB017);
//! let mut segments = Vec::new();
//! params.generate(&mut rng, &mut segments);
//! assert!(!segments.is_empty());
//! ```

mod bolt;
mod geometry;
mod math3d;
mod presets;
mod segment;
mod util;

pub use bolt::{
    BoltParams, Bounds3, LSystemParams, MidpointParams, PhysicalParams, RenderBolt, Rrt3dParams, RrtParams,
};
pub use math3d::Vec3;
pub use presets::{Preset, PresetBank};
pub use segment::{Raster, Segment};
pub use util::Rng;
